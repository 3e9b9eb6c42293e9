use criterion::{criterion_group, criterion_main, Criterion};
use ssddecode::{
    nms, AnchorPrior, BatchInput, BoundingBox, Candidate, DecodeConfig, Decoder, LabelTable,
    ModelSpec, NmsParams, PriorTable, BOX_DIM,
};
use std::hint::black_box;

fn make_decoder() -> Decoder {
    let spec = ModelSpec::default();
    let priors = (0..spec.anchor_count)
        .map(|i| {
            let cell = (i % 361) as f32;
            AnchorPrior::new(
                ((cell / 19.0).floor() + 0.5) / 19.0,
                (cell % 19.0 + 0.5) / 19.0,
                0.1 + 0.05 * (i % 6) as f32,
                0.1 + 0.05 * (i % 5) as f32,
            )
        })
        .collect();
    let labels = (0..spec.label_count).map(|i| format!("class_{i}"));
    Decoder::with_tables(
        DecodeConfig::default(),
        LabelTable::from_labels(labels),
        PriorTable::from_priors(priors),
    )
    .unwrap()
}

fn make_frame(spec: &ModelSpec, hot_every: usize) -> (Vec<f32>, Vec<f32>) {
    let boxes = (0..spec.anchor_count * BOX_DIM)
        .map(|i| ((i * 31) % 17) as f32 / 17.0 - 0.5)
        .collect();
    let predictions = (0..spec.anchor_count * spec.label_count)
        .map(|i| if i % hot_every == 0 { 1.5 } else { -6.0 })
        .collect();
    (boxes, predictions)
}

fn bench_decode(c: &mut Criterion) {
    let decoder = make_decoder();
    let spec = decoder.config().model;

    let (boxes, sparse) = make_frame(&spec, 997);
    c.bench_function("decode_sparse_frame", |b| {
        b.iter(|| black_box(decoder.decode(&boxes, &sparse).unwrap()));
    });

    let (_, dense) = make_frame(&spec, 13);
    c.bench_function("decode_dense_frame", |b| {
        b.iter(|| black_box(decoder.decode(&boxes, &dense).unwrap()));
    });

    let batch_boxes = boxes.repeat(4);
    let batch_preds = dense.repeat(4);
    c.bench_function("decode_batch_4", |b| {
        b.iter(|| {
            black_box(
                decoder
                    .decode_batch(&BatchInput {
                        boxes: &batch_boxes,
                        predictions: &batch_preds,
                        batch_size: 4,
                        frame_sizes: &[],
                    })
                    .unwrap(),
            )
        });
    });
}

fn bench_nms(c: &mut Criterion) {
    let candidates: Vec<Candidate> = (0..2000)
        .map(|i| Candidate {
            class_id: 1 + i % 5,
            label: "obj".into(),
            bbox: BoundingBox::new((i % 50) as f32 * 6.0, (i / 50) as f32 * 6.0, 20.0, 20.0),
            score: 0.5 + ((i * 7) % 100) as f32 / 200.0,
            anchor: i,
        })
        .collect();
    for cap in [100usize, 0] {
        let params = NmsParams {
            max_candidates: cap,
            ..NmsParams::default()
        };
        c.bench_function(&format!("nms_2000_cap_{cap}"), |b| {
            b.iter(|| black_box(nms(candidates.clone(), params)));
        });
    }
}

criterion_group!(benches, bench_decode, bench_nms);
criterion_main!(benches);
