use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ssddecode::{nms, BoundingBox, Candidate, NmsParams};
use std::collections::HashMap;

fn candidate(anchor: usize, class_id: usize, bbox: BoundingBox, score: f32) -> Candidate {
    Candidate {
        class_id,
        label: format!("class_{class_id}").into(),
        bbox,
        score,
        anchor,
    }
}

fn random_candidates(rng: &mut StdRng, count: usize) -> Vec<Candidate> {
    (0..count)
        .map(|anchor| {
            let bbox = BoundingBox::new(
                rng.random_range(0.0..100.0),
                rng.random_range(0.0..100.0),
                rng.random_range(5.0..40.0),
                rng.random_range(5.0..40.0),
            );
            // Coarse scores force plenty of ties.
            let score = 0.5 + (rng.random_range(0..10) as f32) / 20.0;
            candidate(anchor, rng.random_range(1..4), bbox, score)
        })
        .collect()
}

fn uncapped() -> NmsParams {
    NmsParams {
        iou_threshold: 0.3,
        max_candidates: 0,
    }
}

#[test]
fn same_class_overlap_keeps_higher_score() {
    let a = candidate(0, 5, BoundingBox::new(0.0, 0.0, 10.0, 10.0), 0.9);
    let b = candidate(1, 5, BoundingBox::new(0.0, 0.0, 10.0, 8.0), 0.7);
    assert!((a.bbox.iou(&b.bbox) - 0.8).abs() < 1e-6);

    for threshold in [0.0, 0.5] {
        let kept = nms(
            vec![b.clone(), a.clone()],
            NmsParams {
                iou_threshold: threshold,
                max_candidates: 100,
            },
        );
        assert_eq!(kept, vec![a.clone()]);
    }
}

#[test]
fn nms_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(3);
    for params in [uncapped(), NmsParams::default()] {
        for _ in 0..20 {
            let once = nms(random_candidates(&mut rng, 150), params);
            let twice = nms(once.clone(), params);
            assert_eq!(once, twice);
        }
    }
}

#[test]
fn nms_never_grows_the_list() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..20 {
        let input = random_candidates(&mut rng, 80);
        let len = input.len();
        assert!(nms(input, NmsParams::default()).len() <= len);
    }
}

#[test]
fn nms_keeps_best_candidate_of_every_class() {
    let mut rng = StdRng::seed_from_u64(9);
    for _ in 0..20 {
        let input = random_candidates(&mut rng, 120);
        let mut best: HashMap<usize, (f32, usize)> = HashMap::new();
        for c in &input {
            let entry = best.entry(c.class_id).or_insert((c.score, c.anchor));
            if c.score > entry.0 || (c.score == entry.0 && c.anchor < entry.1) {
                *entry = (c.score, c.anchor);
            }
        }
        let kept = nms(input, uncapped());
        for (class_id, (_, anchor)) in best {
            assert!(
                kept.iter().any(|k| k.class_id == class_id && k.anchor == anchor),
                "best candidate of class {class_id} was suppressed"
            );
        }
    }
}

#[test]
fn output_is_score_descending_with_stable_ties() {
    let mut rng = StdRng::seed_from_u64(21);
    let kept = nms(random_candidates(&mut rng, 200), uncapped());
    for pair in kept.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.score > b.score || (a.score == b.score && a.anchor < b.anchor));
    }
}

#[test]
fn empty_input_yields_empty_output() {
    assert!(nms(Vec::new(), NmsParams::default()).is_empty());
}
