//! Browser host: a `web-sys` backed [`Dom`] and the pump that drives a
//! [`Site`] from real events, `requestAnimationFrame` and `setTimeout`.
//!
//! Options are read from a JSON `<script type="application/json">` block
//! with id [`OPTIONS_ELEMENT_ID`]; without it the defaults apply.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AddEventListenerOptions, CustomEvent, CustomEventInit, Document, Element,
    Event, EventTarget, HtmlElement, HtmlMediaElement, MouseEvent,
    PageTransitionEvent, Window,
};
use web_time::Instant;

use crate::dom::{Dom, ElementId, PlaybackRejected, Query, Rect, Viewport};
use crate::error::SiteError;
use crate::options::SiteOptions;
use crate::scheduler::Wakeup;
use crate::site::{Site, SiteEvent, SiteSignal};

/// Id of the `<script>` element carrying JSON options.
pub const OPTIONS_ELEMENT_ID: &str = "folio-motion-options";

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

fn js_error(value: &JsValue) -> SiteError {
    SiteError::Platform(
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}")),
    )
}

fn report(what: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::debug!("{what}: {}", js_error(&e));
    }
}

/// Live document behind an element arena.
///
/// Every element handed to a controller is registered once and keeps its
/// [`ElementId`]. The body is indexed up front, so ids follow document
/// order for everything present at load. A JS `Map` keyed by node
/// identity resolves elements back to their ids.
#[derive(Debug)]
pub struct WebDom {
    window: Window,
    document: Document,
    elements: Vec<Element>,
    ids: js_sys::Map,
}

impl WebDom {
    /// Bind to the current window and index the body.
    pub fn new() -> Result<Self, SiteError> {
        let window = web_sys::window()
            .ok_or_else(|| SiteError::Platform("no global window".to_owned()))?;
        let document = window
            .document()
            .ok_or_else(|| SiteError::Platform("no document".to_owned()))?;
        let mut dom = Self {
            window,
            document,
            elements: Vec::new(),
            ids: js_sys::Map::new(),
        };
        let all = dom
            .document
            .query_selector_all("body *")
            .map_err(|e| js_error(&e))?;
        for i in 0..all.length() {
            if let Some(el) = all.item(i).and_then(|n| n.dyn_into::<Element>().ok())
            {
                let _ = dom.register(el);
            }
        }
        log::debug!("indexed {} elements", dom.elements.len());
        Ok(dom)
    }

    /// Element behind `id`.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0 as usize)
    }

    /// The document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn register(&mut self, element: Element) -> ElementId {
        if let Some(i) = self.ids.get(&element).as_f64() {
            return ElementId(i as u32);
        }
        let id = self.elements.len() as u32;
        let _ = self.ids.set(&element, &JsValue::from(id));
        self.elements.push(element);
        ElementId(id)
    }

    fn html(&self, id: ElementId) -> Option<&HtmlElement> {
        self.element(id).and_then(|e| e.dyn_ref::<HtmlElement>())
    }

    fn media(&self, id: ElementId) -> Option<&HtmlMediaElement> {
        self.element(id).and_then(|e| e.dyn_ref::<HtmlMediaElement>())
    }

    fn dimension(value: Result<JsValue, JsValue>) -> f32 {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    }
}

impl Dom for WebDom {
    fn query_all(&mut self, query: Query<'_>) -> Vec<ElementId> {
        let Ok(list) = self.document.query_selector_all(&query.to_selector())
        else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .map(|el| self.register(el))
            .collect()
    }

    fn query_within(
        &mut self,
        root: ElementId,
        query: Query<'_>,
    ) -> Option<ElementId> {
        let found = self
            .element(root)?
            .query_selector(&query.to_selector())
            .ok()
            .flatten()?;
        Some(self.register(found))
    }

    fn children(&mut self, parent: ElementId) -> Vec<ElementId> {
        let Some(children) = self.element(parent).map(Element::children) else {
            return Vec::new();
        };
        (0..children.length())
            .filter_map(|i| children.item(i))
            .map(|el| self.register(el))
            .collect()
    }

    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool {
        match (self.element(ancestor), self.element(element)) {
            (Some(a), Some(e)) => a.contains(Some(e.as_ref())),
            _ => false,
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.element(element)
            .is_some_and(|e| e.class_list().contains(class))
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if let Some(e) = self.element(element) {
            report("add class", e.class_list().add_1(class));
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(e) = self.element(element) {
            report("remove class", e.class_list().remove_1(class));
        }
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.element(element)?.get_attribute(name)
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(e) = self.element(element) {
            report("set attribute", e.set_attribute(name, value));
        }
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.html(element)?
            .style()
            .get_property_value(property)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        if let Some(e) = self.html(element) {
            report("set style", e.style().set_property(property, value));
        }
    }

    fn remove_style(&mut self, element: ElementId, property: &str) {
        if let Some(e) = self.html(element) {
            report("remove style", e.style().remove_property(property).map(drop));
        }
    }

    fn is_displayed(&self, element: ElementId) -> bool {
        let Some(e) = self.element(element) else {
            return false;
        };
        self.window
            .get_computed_style(e)
            .ok()
            .flatten()
            .and_then(|s| s.get_property_value("display").ok())
            .is_none_or(|d| d != "none")
    }

    fn bounding_rect(&self, element: ElementId) -> Rect {
        self.element(element).map_or_else(Rect::default, |e| {
            let r = e.get_bounding_client_rect();
            Rect::new(r.x() as f32, r.y() as f32, r.width() as f32, r.height() as f32)
        })
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(
            Self::dimension(self.window.inner_width()),
            Self::dimension(self.window.inner_height()),
        )
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .is_some_and(|q| q.matches())
    }

    fn supports_intersection(&self) -> bool {
        js_sys::Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false)
    }

    fn play_inline_loop(
        &mut self,
        video: ElementId,
    ) -> Result<(), PlaybackRejected> {
        let Some(media) = self.media(video) else {
            return Err(PlaybackRejected(format!("{video} is not a media element")));
        };
        media.set_muted(true);
        media.set_loop(true);
        report("playsinline", media.set_attribute("playsinline", ""));
        let promise = media
            .play()
            .map_err(|e| PlaybackRejected(js_error(&e).to_string()))?;
        // Autoplay policy rejects asynchronously.
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::debug!("{video}: playback rejected: {}", js_error(&e));
            }
        });
        Ok(())
    }

    fn is_playing(&self, video: ElementId) -> bool {
        self.media(video).is_some_and(|m| !m.paused())
    }

    fn pause(&mut self, video: ElementId) {
        if let Some(media) = self.media(video) {
            report("pause", media.pause());
        }
    }

    fn rewind(&mut self, video: ElementId) {
        if let Some(media) = self.media(video) {
            media.set_current_time(0.0);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Armed {
    Frame(i32),
    Timeout(i32, Duration),
}

impl Armed {
    const fn wakeup(self) -> Wakeup {
        match self {
            Self::Frame(_) => Wakeup::Frame,
            Self::Timeout(_, deadline) => Wakeup::At(deadline),
        }
    }
}

/// Drives a [`Site`] from browser callbacks.
struct Pump {
    site: Site<WebDom>,
    epoch: Instant,
    armed: Option<Armed>,
    tick: Option<Closure<dyn FnMut()>>,
}

type SharedPump = Rc<RefCell<Pump>>;

impl Pump {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn window(&self) -> Window {
        self.site.dom().window.clone()
    }

    fn disarm(&mut self) {
        let window = self.window();
        match self.armed.take() {
            Some(Armed::Frame(id)) => report("cancel frame", window.cancel_animation_frame(id)),
            Some(Armed::Timeout(id, _)) => window.clear_timeout_with_handle(id),
            None => {}
        }
    }

    /// Make sure the next callback the scheduler needs is requested.
    fn arm(&mut self) {
        let held = self.armed.map(Armed::wakeup);
        let Some(wakeup) = self.site.scheduler().rearm(held) else {
            return;
        };
        self.disarm();
        let window = self.window();
        let now = self.now();
        let Some(tick) = self.tick.as_ref() else {
            return;
        };
        let callback = tick.as_ref().unchecked_ref();
        self.armed = match wakeup {
            Wakeup::Frame => {
                window.request_animation_frame(callback).ok().map(Armed::Frame)
            }
            Wakeup::At(deadline) => {
                let delay = deadline.saturating_sub(now).as_millis() as i32;
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        callback, delay,
                    )
                    .ok()
                    .map(|id| Armed::Timeout(id, deadline))
            }
        };
    }
}

fn tick(pump: &SharedPump) {
    let (signals, document) = {
        let mut p = pump.borrow_mut();
        p.armed = None;
        let _ = p.site.run_frame();
        let now = p.now();
        p.site.advance_to(now);
        (p.site.take_signals(), p.site.dom().document.clone())
    };
    for signal in signals {
        emit(&document, signal);
    }
    pump.borrow_mut().arm();
}

fn feed(pump: &SharedPump, event: SiteEvent) {
    let mut p = pump.borrow_mut();
    let now = p.now();
    p.site.advance_to(now);
    p.site.handle_event(event);
    p.arm();
}

/// Re-dispatch a signal as a document `CustomEvent` for other scripts.
fn emit(document: &Document, signal: SiteSignal) {
    let init = CustomEventInit::new();
    init.set_bubbles(false);
    match CustomEvent::new_with_event_init_dict(signal.event_name(), &init) {
        Ok(event) => report("dispatch", document.dispatch_event(&event).map(drop)),
        Err(e) => log::warn!("cannot create {signal}: {}", js_error(&e)),
    }
}

fn listen<F>(target: &EventTarget, kind: &str, passive: bool, handler: F)
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    report(
        kind,
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &options,
        ),
    );
    // Listeners live as long as the page.
    closure.forget();
}

fn load_options(document: &Document) -> SiteOptions {
    let Some(text) = document
        .get_element_by_id(OPTIONS_ELEMENT_ID)
        .and_then(|e| e.text_content())
    else {
        return SiteOptions::default();
    };
    SiteOptions::from_json(&text).unwrap_or_else(|e| {
        log::warn!("{e}; using default options");
        SiteOptions::default()
    })
}

fn wire(pump: &SharedPump) {
    let (window, targets) = {
        let mut p = pump.borrow_mut();
        let video_class = p.site.options().markers.card_video_class.clone();
        let controls = p.site.filter().controls().to_vec();
        let cards = p.site.parallax().cards().to_vec();
        let videos: Vec<ElementId> = cards
            .iter()
            .filter_map(|c| p.site.dom_mut().query_within(*c, Query::Class(&video_class)))
            .collect();
        let dom = p.site.dom();
        let lookup = |ids: &[ElementId]| -> Vec<(ElementId, EventTarget)> {
            ids.iter()
                .filter_map(|id| dom.element(*id).map(|e| (*id, EventTarget::from(e.clone()))))
                .collect()
        };
        (
            p.window(),
            (lookup(&controls), lookup(&cards), lookup(&videos)),
        )
    };
    let (controls, cards, videos) = targets;

    for (kind, event) in [("scroll", SiteEvent::Scroll), ("resize", SiteEvent::Resize)] {
        let pump = Rc::clone(pump);
        listen(&window, kind, true, move |_| feed(&pump, event));
    }
    for (control, target) in controls {
        let pump = Rc::clone(pump);
        listen(&target, "click", false, move |_| {
            feed(&pump, SiteEvent::FilterClick { control });
        });
    }
    for (card, target) in cards {
        let p = Rc::clone(pump);
        listen(&target, "mouseenter", true, move |_| {
            feed(&p, SiteEvent::PointerEnter { card });
        });
        let p = Rc::clone(pump);
        listen(&target, "mousemove", true, move |e| {
            if let Some(m) = e.dyn_ref::<MouseEvent>() {
                let pointer = Vec2::new(m.client_x() as f32, m.client_y() as f32);
                feed(&p, SiteEvent::PointerMove { card, pointer });
            }
        });
        let p = Rc::clone(pump);
        listen(&target, "mouseleave", true, move |_| {
            feed(&p, SiteEvent::PointerLeave { card });
        });
    }
    for (video, target) in videos {
        let p = Rc::clone(pump);
        listen(&target, "pause", true, move |_| {
            feed(&p, SiteEvent::VideoPaused { video });
        });
    }

    let p = Rc::clone(pump);
    listen(&window, "pagehide", false, move |e| {
        let persisted = e
            .dyn_ref::<PageTransitionEvent>()
            .is_some_and(PageTransitionEvent::persisted);
        feed(&p, SiteEvent::PageHide { persisted });
        let mut p = p.borrow_mut();
        // Timers are frozen with the cached page; `pageshow` re-arms.
        p.disarm();
        if !p.site.is_started() {
            // Break the pump <-> tick cycle.
            p.tick = None;
        }
    });
    let p = Rc::clone(pump);
    listen(&window, "pageshow", false, move |e| {
        let persisted = e
            .dyn_ref::<PageTransitionEvent>()
            .is_some_and(PageTransitionEvent::persisted);
        feed(&p, SiteEvent::PageShow { persisted });
    });
}

/// Build the motion core for the current page and start it.
pub fn run() -> Result<(), SiteError> {
    let dom = WebDom::new()?;
    let options = load_options(dom.document());
    let mut site = Site::new(dom, options);
    site.start();

    let pump: SharedPump = Rc::new(RefCell::new(Pump {
        site,
        epoch: Instant::now(),
        armed: None,
        tick: None,
    }));
    let weak = Rc::downgrade(&pump);
    pump.borrow_mut().tick = Some(Closure::<dyn FnMut()>::new(move || {
        if let Some(pump) = weak.upgrade() {
            tick(&pump);
        }
    }));
    wire(&pump);
    pump.borrow_mut().arm();
    // The pump lives for the page.
    std::mem::forget(pump);
    Ok(())
}

/// Wasm entry point: install logging and start once the document is
/// parsed.
#[wasm_bindgen(start)]
pub fn boot() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    // Fails only if the embedding page installed a logger already.
    let _ = console_log::init_with_level(log::Level::Info);

    let start = || {
        if let Err(e) = run() {
            log::error!("folio-motion: {e}");
        }
    };

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    if document.ready_state() == "loading" {
        listen(&document, "DOMContentLoaded", false, move |_| start());
    } else {
        start();
    }
    Ok(())
}
