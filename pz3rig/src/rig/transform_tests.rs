use crate::{Armature, Axis, AxisRemap, Bone, RotationOrder};
use glam::DVec3;

fn assert_approx(actual: f64, expected: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-9,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

fn assert_vec_approx(actual: DVec3, expected: DVec3) {
    assert!(
        actual.abs_diff_eq(expected, 1.0e-9),
        "expected {expected}, got {actual}"
    );
}

fn bone(name: &str, origin: DVec3, order: RotationOrder) -> Bone {
    Bone::new(name, origin, DVec3::ZERO, order)
}

/// `parent` first, then one child per origin, all linked to the parent.
fn family(parent: Bone, children: &[DVec3]) -> Armature {
    let mut bones = vec![parent];
    let names: Vec<String> = (0..children.len()).map(|i| format!("child{i}")).collect();
    for (name, &origin) in names.iter().zip(children) {
        bones.push(bone(name, origin, RotationOrder::Yzx));
    }
    let parent_id = bones[0].id.clone();
    let links: Vec<(&str, &str)> = names
        .iter()
        .map(|n| (n.as_str(), parent_id.as_str()))
        .collect();
    Armature::from_bones(bones, &links, None).unwrap()
}

#[test]
fn orientation_applies_x_then_y_then_z() {
    let b = Bone::new("a", DVec3::ZERO, DVec3::new(90.0, 90.0, 0.0), RotationOrder::Xyz);
    assert_vec_approx(b.local_to_global_rotation() * DVec3::Y, DVec3::X);

    let b = Bone::new("a", DVec3::ZERO, DVec3::new(0.0, 0.0, 90.0), RotationOrder::Xyz);
    assert_vec_approx(b.local_to_global_rotation() * DVec3::X, DVec3::Y);
}

#[test]
fn local_and_global_transforms_are_inverse() {
    let b = Bone::new(
        "a",
        DVec3::new(1.0, 2.0, 3.0),
        DVec3::new(0.0, 0.0, 90.0),
        RotationOrder::Xyz,
    );
    let global = b.local_to_global().transform_point3(DVec3::Y);
    assert_vec_approx(global, DVec3::new(0.0, 2.0, 3.0));
    assert_vec_approx(b.global_to_local().transform_point3(global), DVec3::Y);
    assert_vec_approx(b.local_to_global().transform_point3(DVec3::ZERO), b.origin);
}

#[test]
fn twist_direction_follows_orientation() {
    let b = Bone::new("a", DVec3::ZERO, DVec3::new(0.0, 0.0, 90.0), RotationOrder::Xyz);
    assert_vec_approx(b.twist_direction(), DVec3::Y);
    let b = bone("b", DVec3::ZERO, RotationOrder::Zxy);
    assert_vec_approx(b.twist_direction(), DVec3::Z);
}

#[test]
fn collinear_check_uses_one_degree_either_way() {
    let b = bone("a", DVec3::new(0.0, 1.0, 0.0), RotationOrder::Yzx);
    let near = DVec3::new(0.5_f64.to_radians().tan(), 2.0, 0.0);
    let far = DVec3::new(2.0_f64.to_radians().tan(), 2.0, 0.0);
    assert!(b.is_collinear(near));
    assert!(!b.is_collinear(far));
    assert!(b.is_collinear(DVec3::new(0.0, -3.0, 0.0)));
    assert!(b.is_collinear(b.origin));
}

#[test]
fn order_rotation_carries_host_axes_onto_declared_axes() {
    for order in RotationOrder::ALL {
        let m = bone("a", DVec3::ZERO, order).order_rotation();
        let [twist, second, third] = order.axes();
        let sign = AxisRemap::for_order(order).sign;
        assert_vec_approx(m * DVec3::Y, twist.unit());
        assert_vec_approx(m * DVec3::Z, second.unit());
        assert_vec_approx(m * DVec3::X, third.unit() * sign);
    }
}

#[test]
fn remap_sign_marks_odd_permutations() {
    assert_eq!(AxisRemap::for_order(RotationOrder::Yzx).sign, 1.0);
    assert_eq!(AxisRemap::for_order(RotationOrder::Yxz).sign, -1.0);
    assert_eq!(AxisRemap::for_order(RotationOrder::Zyx).sign, -1.0);
}

#[test]
fn single_child_ahead_gives_positive_length() {
    let a = family(bone("a", DVec3::ZERO, RotationOrder::Yzx), &[DVec3::new(0.0, 2.0, 0.0)]);
    assert_approx(a.descendant_length(0).unwrap(), 2.0);
}

#[test]
fn single_child_behind_gives_negative_length() {
    let a = family(bone("a", DVec3::ZERO, RotationOrder::Yzx), &[DVec3::new(0.0, -2.0, 0.0)]);
    assert_approx(a.descendant_length(0).unwrap(), -2.0);
}

#[test]
fn leaf_uses_endpoint_and_falls_back_to_unit_length() {
    let tip = bone("a", DVec3::ZERO, RotationOrder::Zxy).with_endpoint(DVec3::new(0.0, 0.0, 0.5));
    let a = family(tip, &[]);
    assert_approx(a.descendant_length(0).unwrap(), 0.5);

    let a = family(bone("a", DVec3::ONE, RotationOrder::Zxy), &[]);
    assert_approx(a.descendant_length(0).unwrap(), 1.0);
}

#[test]
fn child_at_same_origin_falls_back_to_endpoint() {
    let parent = bone("a", DVec3::ZERO, RotationOrder::Xyz).with_endpoint(DVec3::new(-0.3, 0.0, 0.0));
    let a = family(parent, &[DVec3::ZERO]);
    assert_approx(a.descendant_length(0).unwrap(), -0.3);
}

#[test]
fn nearest_collinear_child_wins() {
    let a = family(
        bone("a", DVec3::ZERO, RotationOrder::Yzx),
        &[
            DVec3::new(0.0, 3.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ],
    );
    assert_eq!(a.best_collinear_child(0), Some(3));
    assert_approx(a.descendant_length(0).unwrap(), 1.0);

    let a = family(
        bone("a", DVec3::ZERO, RotationOrder::Yzx),
        &[DVec3::new(0.0, 3.0, 0.0), DVec3::new(0.0, -0.5, 0.0)],
    );
    assert_approx(a.descendant_length(0).unwrap(), -0.5);
}

#[test]
fn first_of_equally_near_collinear_children_wins() {
    let a = family(
        bone("a", DVec3::ZERO, RotationOrder::Yzx),
        &[DVec3::new(0.0, -1.0, 0.0), DVec3::new(0.0, 1.0, 0.0)],
    );
    assert_eq!(a.best_collinear_child(0), Some(1));
    assert_approx(a.descendant_length(0).unwrap(), -1.0);
}

#[test]
fn children_off_axis_use_their_centroid() {
    let a = family(
        bone("a", DVec3::ZERO, RotationOrder::Yzx),
        &[DVec3::new(1.0, 1.0, 0.0), DVec3::new(-1.0, 1.0, 0.0)],
    );
    assert_eq!(a.best_collinear_child(0), None);
    assert_approx(a.descendant_length(0).unwrap(), 1.0);
}

#[test]
fn centroid_at_origin_falls_back_to_endpoint() {
    let parent = bone("a", DVec3::ZERO, RotationOrder::Yzx).with_endpoint(DVec3::new(0.0, 0.7, 0.0));
    let a = family(parent, &[DVec3::new(1.0, 0.0, 0.0), DVec3::new(-1.0, 0.0, 0.0)]);
    assert_approx(a.descendant_length(0).unwrap(), 0.7);
}

#[test]
fn pre_transform_scales_unit_bone_along_twist_axis() {
    for order in RotationOrder::ALL {
        let twist = order.twist_axis().unit();
        let a = family(bone("a", DVec3::ZERO, order), &[twist * 2.0]);
        assert_vec_approx(a.pre_transform(0).unwrap() * DVec3::Y, twist * 2.0);

        let a = family(bone("a", DVec3::ZERO, order), &[twist * -1.5]);
        assert_vec_approx(a.pre_transform(0).unwrap() * DVec3::Y, twist * -1.5);
    }
}

#[test]
fn bone_matrix_puts_the_tail_on_the_child() {
    let origin = DVec3::new(1.0, 0.0, 0.0);
    let a = family(bone("a", origin, RotationOrder::Yzx), &[DVec3::new(1.0, 2.0, 0.0)]);
    assert_vec_approx(a.bone_matrix(0).unwrap().transform_point3(DVec3::ZERO), origin);
    assert_vec_approx(a.bone_matrix(0).unwrap().transform_point3(DVec3::Y), DVec3::new(1.0, 2.0, 0.0));

    let turned = Bone::new("a", origin, DVec3::new(0.0, 0.0, 90.0), RotationOrder::Xyz);
    let a = family(turned, &[DVec3::new(1.0, 2.0, 0.0)]);
    assert_approx(a.descendant_length(0).unwrap(), 2.0);
    assert_vec_approx(a.bone_matrix(0).unwrap().transform_point3(DVec3::Y), DVec3::new(1.0, 2.0, 0.0));
}

#[test]
fn weight_frame_puts_zero_angle_on_each_axis_convention() {
    let b = bone("a", DVec3::new(1.0, 1.0, 0.0), RotationOrder::Yzx);

    assert_approx(b.angle_at(Axis::Z, DVec3::new(2.0, 1.0, 0.0)), 0.0);
    assert_approx(b.angle_at(Axis::Z, DVec3::new(1.0, 2.0, 0.0)), 90.0);
    assert_approx(b.angle_at(Axis::Z, DVec3::new(1.0, 0.0, 0.0)), 270.0);

    assert_approx(b.angle_at(Axis::Y, DVec3::new(2.0, 1.0, 0.0)), 0.0);
    assert_approx(b.angle_at(Axis::Y, DVec3::new(1.0, 1.0, 1.0)), 90.0);

    assert_approx(b.angle_at(Axis::X, DVec3::new(1.0, 1.0, -1.0)), 0.0);
    assert_approx(b.angle_at(Axis::X, DVec3::new(1.0, 2.0, 0.0)), 90.0);

    assert_approx(b.twist_at(Axis::X, DVec3::new(3.0, 1.0, 0.0)), 2.0);
    assert_approx(b.twist_at(Axis::Z, DVec3::new(1.0, 1.0, 4.0)), 4.0);
}

#[test]
fn index_past_the_last_bone_gives_none() {
    let empty = Armature::from_bones(Vec::new(), &[], None).unwrap();
    assert_eq!(empty.descendant_length(0), None);
    assert_eq!(empty.best_collinear_child(0), None);
    assert!(empty.pre_transform(0).is_none());
    assert!(empty.bone_matrix(0).is_none());

    let a = family(bone("a", DVec3::ZERO, RotationOrder::Yzx), &[DVec3::Y]);
    assert!(a.descendant_length(1).is_some());
    assert!(a.bone_matrix(2).is_none());
}
