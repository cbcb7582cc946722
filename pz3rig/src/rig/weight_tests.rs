use crate::{
    Axis, Bone, DEFAULT_MIN_WEIGHT, Error, RotationOrder, TableMap, TransformMap,
    UNBOUNDED_DOMAIN_END, WeightMap, clip_domain, collect_weights, plane_angle,
};
use glam::{DMat4, DVec3};

fn assert_approx(actual: f64, expected: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-9,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

struct Constant(f32);

impl WeightMap for Constant {
    fn weight(&self, _index: usize) -> f32 {
        self.0
    }
}

#[test]
fn default_domain_is_unbounded_and_clipped_to_the_mesh() {
    assert_eq!(Constant(1.0).domain(), (0, UNBOUNDED_DOMAIN_END));
    assert_eq!(clip_domain((0, UNBOUNDED_DOMAIN_END), 4), (0, 4));
    assert_eq!(clip_domain((2, 3), 10), (2, 3));
    assert_eq!(collect_weights(&Constant(0.5), 3, DEFAULT_MIN_WEIGHT).len(), 3);
}

#[test]
fn weights_at_or_below_the_threshold_are_dropped() {
    let map = TableMap::new(&[3, 5, 7, 9], &[0.5, 0.01, 0.0, 1.0]).unwrap();
    assert_eq!(map.domain(), (3, 10));
    assert_eq!(
        collect_weights(&map, 100, DEFAULT_MIN_WEIGHT),
        vec![(3, 0.5), (9, 1.0)]
    );
    assert_eq!(collect_weights(&map, 8, DEFAULT_MIN_WEIGHT), vec![(3, 0.5)]);
    assert_eq!(map.weight(4), 0.0);
}

#[test]
fn table_needs_one_weight_per_index() {
    assert!(matches!(
        TableMap::new(&[1, 2], &[0.5]),
        Err(Error::WeightTableMismatch {
            indices: 2,
            weights: 1
        })
    ));
    let empty = TableMap::new(&[], &[]).unwrap();
    assert_eq!(empty.domain(), (0, 0));
    assert!(collect_weights(&empty, 10, 0.0).is_empty());
}

#[test]
fn plane_angle_covers_full_circle() {
    assert_approx(plane_angle(DVec3::new(1.0, 0.0, 5.0)), 0.0);
    assert_approx(plane_angle(DVec3::new(0.0, 1.0, 0.0)), 90.0);
    assert_approx(plane_angle(DVec3::new(-1.0, 0.0, 0.0)), 180.0);
    assert_approx(plane_angle(DVec3::new(1.0, -1.0, 0.0)), 315.0);
}

#[test]
fn transform_map_weighs_transformed_positions() {
    let positions = [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(0.0, 0.0, 1.0),
        DVec3::new(0.0, 0.0, 2.0),
    ];
    let map = TransformMap::new(
        |i: usize| positions[i],
        DMat4::from_translation(DVec3::new(0.0, 0.0, -1.0)),
        |local: DVec3| (1.0 - local.z.abs()).max(0.0) as f32,
    );
    assert_eq!(map.local_coords(2), DVec3::new(0.0, 0.0, 1.0));
    assert_eq!(
        collect_weights(&map, positions.len(), DEFAULT_MIN_WEIGHT),
        vec![(1, 1.0)]
    );

    let limited = map.with_domain(2, 3);
    assert_eq!(limited.domain(), (2, 3));
    assert!(collect_weights(&limited, positions.len(), 0.0).is_empty());
}

#[test]
fn bone_map_evaluates_in_the_falloff_frame() {
    let bone = Bone::new("lForeArm:1", DVec3::new(1.0, 1.0, 0.0), DVec3::ZERO, RotationOrder::Xzy);
    let positions = [DVec3::new(1.0, 2.0, 0.0), DVec3::new(2.0, 1.0, 0.0)];
    let upper_half = |local: DVec3| {
        if plane_angle(local) < 180.0 { 1.0_f32 } else { 0.0 }
    };
    let map = TransformMap::for_bone(&bone, Axis::Z, |i: usize| positions[i], upper_half);
    assert!(map.local_coords(0).abs_diff_eq(DVec3::Y, 1.0e-12));
    assert_eq!(collect_weights(&map, 2, DEFAULT_MIN_WEIGHT), vec![(0, 1.0), (1, 1.0)]);

    let below = [DVec3::new(1.0, 0.0, 0.0)];
    let map = TransformMap::for_bone(&bone, Axis::Z, |i: usize| below[i], upper_half);
    assert!(collect_weights(&map, 1, DEFAULT_MIN_WEIGHT).is_empty());
}
