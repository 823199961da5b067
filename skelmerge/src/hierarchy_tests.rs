use crate::{AddBoneOutcome, Error, MergedBoneHierarchy, PathKey, Transform};
use glam::{Quat, Vec3};

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-4,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

fn at(x: f32, y: f32, z: f32) -> Transform {
    Transform::from_translation(Vec3::new(x, y, z))
}

#[test]
fn populate_emits_parents_before_children() {
    let mut h = MergedBoneHierarchy::default();
    let root = h.add_bone("Root", at(0.0, 0.0, 0.0), PathKey::root_parent(), "A").path();
    let spine = h.add_bone("Spine", at(0.0, 0.0, 10.0), root, "A").path();
    h.add_bone("Head", at(0.0, 0.0, 5.0), spine, "A");
    h.add_bone("Tail", at(0.0, -3.0, 0.0), root, "A");
    h.add_bone("Neck", at(0.0, 0.0, 2.0), spine, "A");

    let populated = h.populate().unwrap();
    let names: Vec<&str> = populated.bones.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Root", "Spine", "Head", "Neck", "Tail"]);
    assert!(populated.unreachable.is_empty());

    assert_eq!(populated.bones[0].parent, None);
    for (index, bone) in populated.bones.iter().enumerate().skip(1) {
        let parent = bone.parent.expect("non-root bone has a parent");
        assert!(parent < index, "{} listed before its parent", bone.name);
    }
    assert_eq!(populated.bones[2].parent, Some(1));
    assert_eq!(populated.bones[4].parent, Some(0));
}

#[test]
fn populate_keeps_first_insertion_order_of_siblings() {
    let mut h = MergedBoneHierarchy::default();
    let root = h.add_bone("Root", Transform::IDENTITY, PathKey::root_parent(), "A").path();
    for name in ["C", "A", "B"] {
        h.add_bone(name, Transform::IDENTITY, root, "A");
    }
    h.add_bone("A", at(1.0, 0.0, 0.0), root, "B");

    let populated = h.populate().unwrap();
    let names: Vec<&str> = populated.bones.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Root", "C", "A", "B"]);
}

#[test]
fn populate_without_root_fails() {
    let h = MergedBoneHierarchy::default();
    assert!(matches!(h.populate(), Err(Error::NoRoot)));
}

#[test]
fn populate_with_two_roots_fails() {
    let mut h = MergedBoneHierarchy::default();
    h.add_bone("Root", Transform::IDENTITY, PathKey::root_parent(), "A");
    h.add_bone("Pelvis", Transform::IDENTITY, PathKey::root_parent(), "B");

    match h.populate() {
        Err(Error::AmbiguousRoot { roots }) => assert_eq!(roots, ["Root", "Pelvis"]),
        other => panic!("expected AmbiguousRoot, got {other:?}"),
    }
}

#[test]
fn same_path_overwrites_pose() {
    let mut h = MergedBoneHierarchy::default();
    let first = h.add_bone("Root", at(1.0, 0.0, 0.0), PathKey::root_parent(), "A");
    assert!(matches!(first, AddBoneOutcome::Inserted { .. }));

    let second = h.add_bone("Root", at(2.0, 0.0, 0.0), PathKey::root_parent(), "B");
    match second {
        AddBoneOutcome::Merged {
            path,
            name,
            previous_pose,
        } => {
            assert_eq!(path, first.path());
            assert_eq!(name, "Root");
            assert_approx(previous_pose.translation.x, 1.0);
        }
        other => panic!("expected Merged, got {other:?}"),
    }
    assert_eq!(h.len(), 1);
    assert_approx(h.pose_at(first.path()).unwrap().translation.x, 2.0);
}

#[test]
fn same_name_at_different_path_is_renamed() {
    let mut h = MergedBoneHierarchy::default();
    let root = h.add_bone("Root", Transform::IDENTITY, PathKey::root_parent(), "A").path();
    let spine = h.add_bone("Spine", Transform::IDENTITY, root, "A").path();
    let spine2 = h.add_bone("Spine2", Transform::IDENTITY, root, "B").path();

    let outcome = h.add_bone("Spine", Transform::IDENTITY, spine2, "B");
    match &outcome {
        AddBoneOutcome::Renamed { name, .. } => assert_eq!(name, "Spine_B"),
        other => panic!("expected Renamed, got {other:?}"),
    }
    assert_eq!(h.path_of("Spine"), Some(spine));
    assert_eq!(h.path_of("Spine_B"), Some(outcome.path()));
    assert_eq!(h.name_at(outcome.path()), Some("Spine_B"));

    let third = h.add_bone("Spine", Transform::IDENTITY, spine, "B");
    match third {
        AddBoneOutcome::Renamed { name, .. } => assert_eq!(name, "Spine_B_1"),
        other => panic!("expected Renamed, got {other:?}"),
    }
}

#[test]
fn bones_under_a_missing_parent_are_unreachable() {
    let mut h = MergedBoneHierarchy::default();
    h.add_bone("Root", Transform::IDENTITY, PathKey::root_parent(), "A");
    let nowhere = PathKey::root_parent().child("Missing");
    h.add_bone("Orphan", Transform::IDENTITY, nowhere, "A");

    let populated = h.populate().unwrap();
    assert_eq!(populated.bones.len(), 1);
    assert_eq!(populated.unreachable, ["Orphan"]);
}

#[test]
fn component_space_pose_composes_ancestors() {
    let mut h = MergedBoneHierarchy::default();
    let rotated = Transform::from_rotation_translation(
        Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
        Vec3::new(0.0, 0.0, 10.0),
    );
    let root = h.add_bone("Root", rotated, PathKey::root_parent(), "A").path();
    let hand = h.add_bone("Hand", at(1.0, 0.0, 0.0), root, "A").path();

    let pose = h.component_space_pose(hand).unwrap();
    assert_approx(pose.translation.x, 0.0);
    assert_approx(pose.translation.y, 1.0);
    assert_approx(pose.translation.z, 10.0);
    assert!(h.component_space_pose(PathKey::root_parent().child("Nope")).is_none());
}
