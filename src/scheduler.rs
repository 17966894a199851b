//! Cooperative single-threaded scheduler for deferred timers and
//! next-frame callbacks.
//!
//! Scheduled work is plain data ([`Task`]) rather than closures, so every
//! pending callback is visible, cancellable through its [`TaskHandle`], and
//! dispatched by whoever drives the scheduler (the [`Site`](crate::site::Site)
//! runtime). Time is virtual: the driver advances it, either from a real
//! clock in the browser or step by step in tests.

use std::collections::BTreeMap;
use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::dom::ElementId;

/// Handle to a pending timer or frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

/// Deferred work owned by one of the motion controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Evaluate the reveal observer's registered elements.
    RevealCheck,
    /// Second half of a reveal reset: re-partition elements once the
    /// hidden state has been committed for a frame.
    RevealRepartition,
    /// Drop the transition override from instantly revealed elements.
    RevealRelease,
    /// Sync a card's `display` with its filter visibility.
    FilterDisplay {
        /// Card to update.
        card: ElementId,
        /// Whether the card is shown under the active filter.
        show: bool,
    },
    /// Filter transition finished; emit the change signal.
    FilterSettled,
    /// One parallax interpolation step for a hovered card.
    ParallaxStep {
        /// Hovered card.
        card: ElementId,
    },
    /// Trailing edge of the resize debounce.
    ResizeSettled,
    /// Recompute which card is nearest the viewport center.
    FlipRecenter,
    /// Toggle the centered card's flipped state.
    FlipTick,
}

/// Host callback a driver has requested on behalf of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// Next display refresh.
    Frame,
    /// Timer firing at this scheduler time.
    At(Duration),
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Timer(Duration),
    Frame,
}

/// Pending timers (ordered by deadline, then scheduling order) and the
/// batch of callbacks waiting for the next frame.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<(Duration, u64), Task>,
    frame: BTreeMap<u64, Task>,
    slots: FxHashMap<u64, Slot>,
}

impl Scheduler {
    /// Empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `task` once `delay` has elapsed.
    pub fn set_timeout(&mut self, delay: Duration, task: Task) -> TaskHandle {
        let id = self.alloc();
        let deadline = self.now.saturating_add(delay);
        let _ = self.timers.insert((deadline, id), task);
        let _ = self.slots.insert(id, Slot::Timer(deadline));
        TaskHandle(id)
    }

    /// Run `task` on the next frame.
    pub fn request_frame(&mut self, task: Task) -> TaskHandle {
        let id = self.alloc();
        let _ = self.frame.insert(id, task);
        let _ = self.slots.insert(id, Slot::Frame);
        TaskHandle(id)
    }

    /// Cancel a pending task. Returns `false` if it already ran or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.slots.remove(&handle.0) {
            Some(Slot::Timer(deadline)) => {
                self.timers.remove(&(deadline, handle.0)).is_some()
            }
            Some(Slot::Frame) => self.frame.remove(&handle.0).is_some(),
            None => false,
        }
    }

    /// Whether `handle` is still waiting to run.
    #[must_use]
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.slots.contains_key(&handle.0)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Number of callbacks waiting for the next frame.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frame.len()
    }

    /// Whether nothing at all is scheduled.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether any callback waits for the next frame.
    #[must_use]
    pub fn has_frame_work(&self) -> bool {
        !self.frame.is_empty()
    }

    /// Deadline of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Callback a driver should request given the one it already holds.
    ///
    /// `None` keeps `armed` as is. `Some` means `armed` must be cancelled
    /// and replaced: frame work always wins over a timer, and a timer is
    /// replaced when an earlier deadline was scheduled after it was armed.
    #[must_use]
    pub fn rearm(&self, armed: Option<Wakeup>) -> Option<Wakeup> {
        if armed == Some(Wakeup::Frame) {
            return None;
        }
        if self.has_frame_work() {
            return Some(Wakeup::Frame);
        }
        let deadline = self.next_deadline()?;
        match armed {
            Some(Wakeup::At(at)) if at <= deadline => None,
            _ => Some(Wakeup::At(deadline)),
        }
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<Task> {
        let (&(deadline, id), _) = self.timers.first_key_value()?;
        if deadline > until {
            return None;
        }
        let task = self.timers.remove(&(deadline, id))?;
        let _ = self.slots.remove(&id);
        self.now = self.now.max(deadline);
        Some(task)
    }

    /// Move the clock forward to `to` (never backwards).
    pub fn advance_clock(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }

    /// Take the current frame batch in request order. Callbacks requested
    /// while the batch runs land in the next frame.
    pub fn take_frame(&mut self) -> Vec<Task> {
        let batch = std::mem::take(&mut self.frame);
        for id in batch.keys() {
            let _ = self.slots.remove(id);
        }
        batch.into_values().collect()
    }

    /// Cancel everything. Returns how many tasks were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.slots.len();
        self.timers.clear();
        self.frame.clear();
        self.slots.clear();
        dropped
    }

    fn alloc(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn timers_pop_in_deadline_order() {
        let mut sched = Scheduler::new();
        let _ = sched.set_timeout(ms(300), Task::FilterSettled);
        let _ = sched.set_timeout(ms(150), Task::ResizeSettled);
        let _ = sched.set_timeout(ms(150), Task::FlipTick);

        assert_eq!(sched.next_deadline(), Some(ms(150)));
        assert_eq!(sched.pop_due(ms(100)), None);
        assert_eq!(sched.pop_due(ms(400)), Some(Task::ResizeSettled));
        assert_eq!(sched.pop_due(ms(400)), Some(Task::FlipTick));
        assert_eq!(sched.now(), ms(150));
        assert_eq!(sched.pop_due(ms(400)), Some(Task::FilterSettled));
        assert_eq!(sched.now(), ms(300));
        assert!(sched.is_idle());
    }

    #[test]
    fn delays_are_relative_to_the_clock() {
        let mut sched = Scheduler::new();
        sched.advance_clock(ms(1000));
        let _ = sched.set_timeout(ms(50), Task::FlipTick);
        assert_eq!(sched.next_deadline(), Some(ms(1050)));
    }

    #[test]
    fn cancel_removes_pending_work() {
        let mut sched = Scheduler::new();
        let timer = sched.set_timeout(ms(10), Task::ResizeSettled);
        let frame = sched.request_frame(Task::RevealCheck);

        assert!(sched.cancel(timer));
        assert!(!sched.cancel(timer));
        assert!(sched.cancel(frame));
        assert!(!sched.is_pending(frame));
        assert!(sched.is_idle());
        assert_eq!(sched.pop_due(ms(100)), None);
        assert!(sched.take_frame().is_empty());
    }

    #[test]
    fn frame_requests_during_a_batch_wait_for_the_next_frame() {
        let mut sched = Scheduler::new();
        let card = ElementId(3);
        let handle = sched.request_frame(Task::ParallaxStep { card });

        let batch = sched.take_frame();
        assert_eq!(batch, vec![Task::ParallaxStep { card }]);
        assert!(!sched.is_pending(handle));

        let _ = sched.request_frame(Task::ParallaxStep { card });
        assert_eq!(sched.pending_frames(), 1);
    }

    #[test]
    fn earlier_timer_replaces_armed_timeout() {
        let mut sched = Scheduler::new();
        let _ = sched.set_timeout(ms(1000), Task::FlipTick);
        let armed = sched.rearm(None);
        assert_eq!(armed, Some(Wakeup::At(ms(1000))));

        sched.advance_clock(ms(50));
        let _ = sched.set_timeout(ms(300), Task::FilterSettled);
        assert_eq!(sched.rearm(armed), Some(Wakeup::At(ms(350))));
    }

    #[test]
    fn later_timer_keeps_armed_timeout() {
        let mut sched = Scheduler::new();
        let _ = sched.set_timeout(ms(300), Task::FilterSettled);
        let armed = sched.rearm(None);
        let _ = sched.set_timeout(ms(1000), Task::FlipTick);
        assert_eq!(sched.rearm(armed), None);
    }

    #[test]
    fn frame_work_preempts_timeout() {
        let mut sched = Scheduler::new();
        let _ = sched.set_timeout(ms(1000), Task::FlipTick);
        let armed = sched.rearm(None);
        let _ = sched.request_frame(Task::RevealCheck);
        assert_eq!(sched.rearm(armed), Some(Wakeup::Frame));
        assert_eq!(sched.rearm(Some(Wakeup::Frame)), None);
    }

    #[test]
    fn idle_scheduler_requests_nothing() {
        let sched = Scheduler::new();
        assert_eq!(sched.rearm(None), None);
    }

    #[test]
    fn clear_drops_everything() {
        let mut sched = Scheduler::new();
        let _ = sched.set_timeout(ms(10), Task::FlipTick);
        let _ = sched.request_frame(Task::FlipRecenter);
        assert_eq!(sched.clear(), 2);
        assert!(sched.is_idle());
    }
}
