use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ssddecode::lowlevel::decode_box;
use ssddecode::{AnchorPrior, BoundingBox, BoxScales, FrameSize, ScoreFilter};

fn random_box(rng: &mut StdRng) -> BoundingBox {
    BoundingBox::new(
        rng.random_range(0.0..200.0),
        rng.random_range(0.0..200.0),
        rng.random_range(1.0..100.0),
        rng.random_range(1.0..100.0),
    )
}

#[test]
fn unit_prior_with_zero_offset_decodes_to_centered_unit_box() {
    let prior = AnchorPrior::new(0.0, 0.0, 1.0, 1.0);
    let b = decode_box(&prior, &[0.0; 4], &BoxScales::default());
    assert_eq!(b.ymin, -0.5);
    assert_eq!(b.xmin, -0.5);
    assert_eq!(b.ymax, 0.5);
    assert_eq!(b.xmax, 0.5);

    let projected = b.project(FrameSize::new(300, 300));
    assert_eq!(projected, BoundingBox::new(-150.0, -150.0, 300.0, 300.0));
}

#[test]
fn custom_scales_change_decoding() {
    let prior = AnchorPrior::new(0.5, 0.5, 0.2, 0.2);
    let scales = BoxScales {
        y: 1.0,
        x: 1.0,
        h: 1.0,
        w: 1.0,
    };
    let b = decode_box(&prior, &[1.0, 0.0, 0.0, 0.0], &scales);
    assert!(((b.ymin + b.ymax) / 2.0 - 0.7).abs() < 1e-6);
}

#[test]
fn nan_encodings_propagate() {
    let prior = AnchorPrior::new(0.5, 0.5, 0.2, 0.2);
    let b = decode_box(&prior, &[f32::NAN, 0.0, 0.0, 0.0], &BoxScales::default());
    assert!(b.ymin.is_nan() && b.ymax.is_nan());
    assert!(!b.xmin.is_nan());
}

#[test]
fn score_is_monotonic_in_logit() {
    let filter = ScoreFilter::default();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1000 {
        let a: f32 = rng.random_range(-30.0..30.0);
        let b: f32 = a + rng.random_range(0.0..5.0);
        assert!(filter.score(b) >= filter.score(a), "sigmoid({b}) < sigmoid({a})");
    }
}

#[test]
fn score_filter_threshold_is_configurable() {
    let strict = ScoreFilter::new(0.9).unwrap();
    assert!(strict.apply(2.0).is_none());
    assert!(strict.apply(3.0).is_some());
    let open = ScoreFilter::new(0.0).unwrap();
    assert!(open.apply(-50.0).is_some());
}

#[test]
fn iou_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..500 {
        let a = random_box(&mut rng);
        let b = random_box(&mut rng);
        assert_eq!(a.iou(&b), b.iou(&a));
    }
}

#[test]
fn iou_with_self_is_one() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..500 {
        let a = random_box(&mut rng);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }
}

#[test]
fn iou_of_disjoint_boxes_is_zero() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..500 {
        let a = random_box(&mut rng);
        let mut b = random_box(&mut rng);
        b.x = a.x + a.width + rng.random_range(0.0..50.0);
        assert_eq!(a.iou(&b), 0.0);
    }
}

#[test]
fn iou_matches_hand_computed_value() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(0.0, 0.0, 10.0, 8.0);
    assert!((a.iou(&b) - 0.8).abs() < 1e-6);
}
