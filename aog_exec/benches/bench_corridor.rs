//! # Corridor Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use aog_lib::{
    obstacle::{classify, BBox, Detection},
    zone_ctrl::{compute_corridor, point_in_quad, CorridorConfig, Params},
};

fn corridor_benchmark(c: &mut Criterion) {
    let config = CorridorConfig::new(&Params::default(), 640, 480).unwrap();

    // A busy frame: a grid of recognised and unrecognised detections
    let detections: Vec<Detection> = (0..64)
        .map(|i| Detection {
            class_id: [0, 2, 5, 19][i % 4],
            bbox: BBox {
                x: (i as i32 % 8) * 80,
                y: (i as i32 / 8) * 60,
                w: 40,
                h: 50,
            },
            score: 0.7,
        })
        .collect();

    c.bench_function("compute_corridor", |b| {
        b.iter(|| compute_corridor(&config, black_box(17.5), 640, 480))
    });

    let quad = config.corridor(-8.0).quad();
    c.bench_function("point_in_quad", |b| {
        b.iter(|| point_in_quad(black_box(300), black_box(250), &quad))
    });

    c.bench_function("classify_64_detections", |b| {
        b.iter(|| {
            let corridor = config.corridor(black_box(5.0));
            classify(&detections, &corridor, true)
        })
    });
}

criterion_group!(benches, corridor_benchmark);
criterion_main!(benches);
