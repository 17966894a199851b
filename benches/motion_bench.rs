#![allow(missing_docs)]

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use folio_motion::dom::{CardFixture, MemoryDom, PageFixture};
use folio_motion::options::SiteOptions;
use folio_motion::parallax::{ParallaxSession, ParallaxTuning};
use folio_motion::site::{Site, SiteEvent};
use folio_motion::stagger::StaggerScheduler;
use glam::Vec2;

fn fixture(cards: usize) -> PageFixture {
    let tags = ["web", "design", "web design", "mobile"];
    PageFixture {
        cards: (0..cards)
            .map(|i| CardFixture {
                categories: tags[i % tags.len()].to_owned(),
                ..CardFixture::default()
            })
            .collect(),
        ..PageFixture::default()
    }
}

fn parallax_step_benchmark(c: &mut Criterion) {
    let tuning = ParallaxTuning::default();
    c.bench_function("parallax_converge", |b| {
        b.iter(|| {
            let mut session = ParallaxSession::new();
            session.target = black_box(Vec2::new(-5.0, 3.5));
            while session.step(&tuning) {}
            black_box(session.current)
        });
    });
}

fn stagger_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("stagger_apply");
    let options = SiteOptions::default();
    let stagger = StaggerScheduler::from_options(&options);

    for count in [12, 48, 192] {
        let (mut dom, page) = fixture(count).build(&options);
        group.bench_function(format!("{count}_cards"), |b| {
            b.iter(|| black_box(stagger.apply(&mut dom, page.grid)));
        });
    }
    group.finish();
}

fn filter_cycle_benchmark(c: &mut Criterion) {
    let options = SiteOptions::default();
    let (dom, page) = fixture(48).build(&options);
    let mut site: Site<MemoryDom> = Site::new(dom, options);
    site.start();
    let controls = page.controls.clone();

    c.bench_function("filter_cycle_48_cards", |b| {
        let mut i = 0;
        b.iter(|| {
            let control = controls[i % controls.len()];
            i += 1;
            site.handle_event(SiteEvent::FilterClick { control });
            site.run_for(Duration::from_millis(700));
            black_box(site.take_signals())
        });
    });
}

criterion_group!(
    benches,
    parallax_step_benchmark,
    stagger_benchmark,
    filter_cycle_benchmark
);
criterion_main!(benches);
