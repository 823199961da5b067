use crate::{
    AttachmentGraph, BlendProfileMode, ComponentTree, Error, MergeFlags, SkeletonData,
    SkeletonMergeParams, merge_skeletons,
};

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-4,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

const BODY: &str = r#"
{
  "name": "Body",
  "bones": [
    { "name": "Root" },
    { "name": "Spine", "parent": "Root", "translation": [0, 0, 10] },
    { "name": "Weapon_Socket", "parent": "Spine", "translation": [10, 0, 0], "scale": [2, 2, 2] }
  ],
  "sockets": [
    { "name": "Muzzle", "bone": "Weapon_Socket", "translation": [1, 0, 0], "forceAlwaysAnimated": true }
  ],
  "virtualBones": [ { "name": "VB Spine", "source": "Root", "target": "Spine" } ],
  "curves": [
    { "name": "Blink", "metadata": { "morphTarget": true, "linkedBones": ["Spine"] } },
    { "name": "Jaw" }
  ],
  "blendProfiles": [
    { "name": "Upper", "mode": "weightFactor", "entries": [ { "bone": "Spine", "scale": 0.25 } ] }
  ],
  "slotGroups": [ { "name": "DefaultGroup", "slots": ["DefaultSlot"] } ]
}
"#;

const SWORD: &str = r#"
{
  "name": "Sword",
  "bones": [
    { "name": "Grip" },
    { "name": "Blade", "parent": "Grip", "translation": [0, 0, 3] }
  ]
}
"#;

const SCENE: &str = r#"
{
  "components": [
    { "name": "BodyMesh", "skeleton": "Body", "children": ["SwordMesh"] },
    {
      "name": "SwordMesh",
      "skeleton": "Sword",
      "attachTo": "Weapon_Socket",
      "relativeTransform": { "translation": [0, 1, 0] }
    }
  ]
}
"#;

#[test]
fn skeleton_json_loads_bones_and_ancillary_data() {
    let body = SkeletonData::from_json_str(BODY).unwrap();

    assert_eq!(body.name, "Body");
    assert_eq!(body.bones.len(), 3);
    assert_eq!(body.bones[0].parent, None);
    assert_eq!(body.bones[2].parent, Some(1));
    assert_approx(body.bones[1].pose.translation.z, 10.0);
    assert_approx(body.bones[2].pose.scale.y, 2.0);
    assert_approx(body.bones[0].pose.scale.x, 1.0);

    let muzzle = body.socket("Muzzle").unwrap();
    assert_eq!(muzzle.bone, "Weapon_Socket");
    assert!(muzzle.force_always_animated);
    assert_approx(muzzle.relative.translation.x, 1.0);

    assert_eq!(body.virtual_bones[0].target_bone, "Spine");

    let blink = body.curve("Blink").unwrap().metadata.as_ref().unwrap();
    assert!(blink.morph_target);
    assert!(!blink.material);
    assert_eq!(blink.linked_bones, ["Spine"]);
    assert_eq!(blink.max_lod, u8::MAX);
    assert!(body.curve("Jaw").unwrap().metadata.is_none());

    let upper = body.blend_profile("Upper").unwrap();
    assert_eq!(upper.mode, BlendProfileMode::WeightFactor);
    assert_approx(upper.entries[0].blend_scale, 0.25);

    assert_eq!(body.slot_group("DefaultGroup").unwrap().slots, ["DefaultSlot"]);
}

#[test]
fn skeleton_json_rejects_parent_listed_later() {
    let json = r#"{ "name": "Bad", "bones": [ { "name": "Child", "parent": "Root" }, { "name": "Root" } ] }"#;
    assert!(matches!(
        SkeletonData::from_json_str(json),
        Err(Error::JsonUnknownBoneParent { ref parent, .. }) if parent == "Root"
    ));
}

#[test]
fn skeleton_json_rejects_duplicate_bones() {
    let json = r#"{ "name": "Bad", "bones": [ { "name": "Root" }, { "name": "Root", "parent": "Root" } ] }"#;
    assert!(matches!(
        SkeletonData::from_json_str(json),
        Err(Error::JsonDuplicateBone { .. })
    ));
}

#[test]
fn skeleton_json_rejects_unknown_blend_mode() {
    let json = r#"{ "name": "Bad", "blendProfiles": [ { "name": "Upper", "mode": "additive" } ] }"#;
    assert!(matches!(
        SkeletonData::from_json_str(json),
        Err(Error::JsonUnsupportedBlendProfileMode { ref value, .. }) if value == "additive"
    ));
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(
        SkeletonData::from_json_str("{ \"name\": "),
        Err(Error::JsonParse { .. })
    ));
}

#[test]
fn component_tree_json_links_children_by_name() {
    let tree = ComponentTree::from_json_str(SCENE).unwrap();
    let body = tree.find("BodyMesh").unwrap();
    let sword = tree.find("SwordMesh").unwrap();

    assert_eq!(tree.len(), 2);
    assert_eq!(tree.parent_component(sword), Some(body));
    assert_eq!(tree.attach_target(sword), Some("Weapon_Socket"));
    assert_eq!(tree.skeleton_of(body), Some("Body"));
    assert_approx(tree.relative_transform(sword).translation.y, 1.0);
}

#[test]
fn component_tree_json_rejects_unknown_child() {
    let json = r#"{ "components": [ { "name": "A", "children": ["B"] } ] }"#;
    assert!(matches!(
        ComponentTree::from_json_str(json),
        Err(Error::JsonUnknownChildComponent { .. })
    ));
}

#[test]
fn component_tree_json_rejects_duplicate_names() {
    let json = r#"{ "components": [ { "name": "A" }, { "name": "A" } ] }"#;
    assert!(matches!(
        ComponentTree::from_json_str(json),
        Err(Error::JsonDuplicateComponent { .. })
    ));
}

#[test]
fn merge_flags_json_defaults_to_enabled() {
    let flags = MergeFlags::from_json_str(r#"{ "checkCompatibility": false }"#).unwrap();
    assert!(!flags.check_compatibility);
    assert!(flags.merge_sockets);
    assert!(flags.merge_anim_slot_groups);
    assert_eq!(MergeFlags::from_json_str("{}").unwrap(), MergeFlags::default());
}

#[test]
fn loaded_skeletons_merge_through_loaded_scene() {
    let body = SkeletonData::from_json_str(BODY).unwrap();
    let sword = SkeletonData::from_json_str(SWORD).unwrap();
    let tree = ComponentTree::from_json_str(SCENE).unwrap();

    let params = SkeletonMergeParams::new(vec![body, sword]);
    let outcome = merge_skeletons(&params, Some(&tree)).unwrap();
    let merged = &outcome.skeleton;

    let names: Vec<&str> = merged.bones.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Root", "Spine", "Weapon_Socket", "Grip", "Blade"]);
    assert_eq!(merged.bones[3].parent, Some(2));

    let grip = merged.bones[3].pose;
    assert_approx(grip.translation.x, 10.0);
    assert_approx(grip.translation.y, 1.0);
    assert_approx(grip.translation.z, 10.0);
    assert_eq!(merged.sockets.len(), 1);
}
