use divan::{Bencher, black_box};
use facet::Facet;
use std::sync::LazyLock;

#[derive(Facet, Debug, Clone, Default, PartialEq)]
struct SampleStruct {
    pub id: u32,
    pub name: String,
    pub ok: bool,
    pub tags: Vec<String>,
}

ditto::members! {
    SampleStruct {
        accessors { label -> String }
    }
}

impl SampleStruct {
    fn label(&self) -> String {
        format!("{}:{}", self.id, self.name)
    }
}

#[derive(Facet, Debug, Clone, Default, PartialEq)]
struct SampleView {
    pub id: u32,
    pub name: String,
    pub ok: bool,
    pub tags: Vec<String>,
    pub label: String,
}

const BATCH_SIZE: usize = 512;

fn make_samples() -> Vec<SampleStruct> {
    (0..BATCH_SIZE)
        .map(|i| SampleStruct {
            id: (i as u32) * 17 + 3,
            name: format!("name-{i:04}-{}", "xyz".repeat((i % 5) + 1)),
            ok: i % 3 != 0,
            tags: (0..i % 4).map(|t| format!("t{t}")).collect(),
        })
        .collect()
}

static SAMPLES: LazyLock<Vec<SampleStruct>> = LazyLock::new(make_samples);

#[divan::bench]
fn ditto_struct_copy(bencher: Bencher) {
    let sample = &SAMPLES[7];
    bencher.bench(|| {
        let mut view = SampleView::default();
        ditto::copy(&mut view, black_box(sample)).expect("copy should succeed");
        black_box(view)
    });
}

#[divan::bench]
fn ditto_vec_copy(bencher: Bencher) {
    let samples = &*SAMPLES;
    bencher.bench(|| {
        let mut views: Vec<SampleView> = Vec::new();
        ditto::copy(&mut views, black_box(samples)).expect("copy should succeed");
        black_box(views)
    });
}

#[divan::bench]
fn ditto_reused_copier_vec_copy(bencher: Bencher) {
    let samples = &*SAMPLES;
    let mut copier = ditto::Copier::new();
    bencher.bench_local(|| {
        let mut views: Vec<SampleView> = Vec::new();
        copier
            .copy(&mut views, black_box(samples))
            .expect("copy should succeed");
        black_box(views)
    });
}

#[divan::bench]
fn handwritten_vec_copy(bencher: Bencher) {
    let samples = &*SAMPLES;
    bencher.bench(|| {
        black_box(samples)
            .iter()
            .map(|s| SampleView {
                id: s.id,
                name: s.name.clone(),
                ok: s.ok,
                tags: s.tags.clone(),
                label: s.label(),
            })
            .collect::<Vec<_>>()
    });
}

fn main() {
    ditto::register::<SampleStruct>();

    // Sanity check: the reflected copy matches the handwritten one.
    let mut views: Vec<SampleView> = Vec::new();
    ditto::copy(&mut views, &*SAMPLES).expect("copy should succeed");
    assert_eq!(views.len(), BATCH_SIZE);
    assert_eq!(views[9].label, SAMPLES[9].label());

    divan::main();
}
