use crate::{
    AncillaryDataMerger, BlendProfileData, BlendProfileEntry, BlendProfileMode, CurveData,
    CurveMetaData, Error, MergeFlags, SkeletonData, SlotGroupData, SocketData, Transform,
    VirtualBoneData,
};

fn socket(name: &str, bone: &str) -> SocketData {
    SocketData {
        name: name.to_string(),
        bone: bone.to_string(),
        relative: Transform::IDENTITY,
        force_always_animated: false,
    }
}

fn curve(name: &str, max_lod: u8) -> CurveData {
    CurveData {
        name: name.to_string(),
        metadata: Some(CurveMetaData {
            max_lod,
            ..CurveMetaData::default()
        }),
    }
}

fn profile(name: &str, mode: BlendProfileMode, bones: &[&str]) -> BlendProfileData {
    BlendProfileData {
        name: name.to_string(),
        mode,
        entries: bones
            .iter()
            .map(|bone| BlendProfileEntry {
                bone: bone.to_string(),
                blend_scale: 0.5,
            })
            .collect(),
    }
}

fn slots(name: &str, slots: &[&str]) -> SlotGroupData {
    SlotGroupData {
        name: name.to_string(),
        slots: slots.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn identical_sockets_are_merged_once() {
    let mut a = SkeletonData::new("A");
    a.sockets = vec![socket("Muzzle", "Hand_R"), socket("Back", "Spine")];
    let mut b = SkeletonData::new("B");
    b.sockets = vec![socket("Muzzle", "Hand_R"), socket("Muzzle", "Hand_L")];

    let mut merger = AncillaryDataMerger::new(MergeFlags::default());
    merger.add_source(&a);
    merger.add_source(&b);
    let merged = merger.finish(|_| true).unwrap();

    let pairs: Vec<(&str, &str)> = merged
        .sockets
        .iter()
        .map(|s| (s.name.as_str(), s.bone.as_str()))
        .collect();
    assert_eq!(
        pairs,
        [("Muzzle", "Hand_R"), ("Back", "Spine"), ("Muzzle", "Hand_L")]
    );
}

#[test]
fn virtual_bones_are_keyed_by_source_and_target() {
    let vb = |name: &str, source: &str, target: &str| VirtualBoneData {
        name: name.to_string(),
        source_bone: source.to_string(),
        target_bone: target.to_string(),
    };
    let mut a = SkeletonData::new("A");
    a.virtual_bones = vec![vb("VB Hand", "Hand_R", "Spine")];
    let mut b = SkeletonData::new("B");
    b.virtual_bones = vec![vb("VB Other", "Hand_R", "Spine"), vb("VB Foot", "Foot", "Root")];

    let mut merger = AncillaryDataMerger::new(MergeFlags::default());
    merger.add_source(&a);
    merger.add_source(&b);
    let merged = merger.finish(|_| true).unwrap();

    let names: Vec<&str> = merged.virtual_bones.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["VB Hand", "VB Foot"]);
}

#[test]
fn curves_keep_first_order_and_last_metadata() {
    let mut a = SkeletonData::new("A");
    a.curves = vec![curve("Blink", 1), curve("Smile", 2)];
    let mut b = SkeletonData::new("B");
    b.curves = vec![curve("Jaw", 3), curve("Blink", 7)];

    let mut merger = AncillaryDataMerger::new(MergeFlags::default());
    merger.add_source(&a);
    merger.add_source(&b);
    let merged = merger.finish(|_| true).unwrap();

    let names: Vec<&str> = merged.curves.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Blink", "Smile", "Jaw"]);
    assert_eq!(merged.curves[0].metadata.as_ref().unwrap().max_lod, 7);
}

#[test]
fn slot_groups_are_unioned() {
    let mut a = SkeletonData::new("A");
    a.slot_groups = vec![slots("DefaultGroup", &["DefaultSlot", "UpperBody"])];
    let mut b = SkeletonData::new("B");
    b.slot_groups = vec![
        slots("DefaultGroup", &["UpperBody", "Face"]),
        slots("Weapon", &["Reload"]),
    ];

    let mut merger = AncillaryDataMerger::new(MergeFlags::default());
    merger.add_source(&a);
    merger.add_source(&b);
    let merged = merger.finish(|_| true).unwrap();

    assert_eq!(merged.slot_groups.len(), 2);
    assert_eq!(
        merged.slot_groups[0].slots,
        ["DefaultSlot", "UpperBody", "Face"]
    );
    assert_eq!(merged.slot_groups[1].slots, ["Reload"]);
}

#[test]
fn blend_profiles_combine_entries_for_present_bones() {
    let mut a = SkeletonData::new("A");
    a.blend_profiles = vec![profile("Upper", BlendProfileMode::WeightFactor, &["Spine"])];
    let mut b = SkeletonData::new("B");
    b.blend_profiles = vec![profile(
        "Upper",
        BlendProfileMode::WeightFactor,
        &["Head", "Ghost"],
    )];

    let mut merger = AncillaryDataMerger::new(MergeFlags::default());
    merger.add_source(&a);
    merger.add_source(&b);
    let merged = merger.finish(|bone| bone != "Ghost").unwrap();

    assert_eq!(merged.blend_profiles.len(), 1);
    let upper = &merged.blend_profiles[0];
    assert_eq!(upper.mode, BlendProfileMode::WeightFactor);
    let bones: Vec<&str> = upper.entries.iter().map(|e| e.bone.as_str()).collect();
    assert_eq!(bones, ["Spine", "Head"]);
}

#[test]
fn blend_profile_mode_mismatch_fails() {
    let mut a = SkeletonData::new("A");
    a.blend_profiles = vec![profile("Upper", BlendProfileMode::TimeFactor, &["Spine"])];
    let mut b = SkeletonData::new("B");
    b.blend_profiles = vec![profile("Upper", BlendProfileMode::BlendMask, &["Head"])];

    let mut merger = AncillaryDataMerger::new(MergeFlags::default());
    merger.add_source(&a);
    merger.add_source(&b);

    match merger.finish(|_| true) {
        Err(Error::BlendProfileModeMismatch {
            profile,
            skeleton,
            expected,
            found,
        }) => {
            assert_eq!(profile, "Upper");
            assert_eq!(skeleton, "B");
            assert_eq!(expected, BlendProfileMode::TimeFactor);
            assert_eq!(found, BlendProfileMode::BlendMask);
        }
        other => panic!("expected BlendProfileModeMismatch, got {other:?}"),
    }
}

#[test]
fn blend_profile_duplicate_bone_entry_fails() {
    let mut a = SkeletonData::new("A");
    a.blend_profiles = vec![profile("Upper", BlendProfileMode::TimeFactor, &["Spine"])];
    let mut b = SkeletonData::new("B");
    b.blend_profiles = vec![profile("Upper", BlendProfileMode::TimeFactor, &["Spine"])];

    let mut merger = AncillaryDataMerger::new(MergeFlags::default());
    merger.add_source(&a);
    merger.add_source(&b);

    assert!(matches!(
        merger.finish(|_| true),
        Err(Error::DuplicateBoneEntry { ref bone, .. }) if bone == "Spine"
    ));
}

#[test]
fn disabled_flags_skip_ancillary_data() {
    let mut a = SkeletonData::new("A");
    a.sockets = vec![socket("Muzzle", "Hand_R")];
    a.curves = vec![curve("Blink", 1)];
    a.slot_groups = vec![slots("DefaultGroup", &["DefaultSlot"])];
    a.blend_profiles = vec![profile("Upper", BlendProfileMode::TimeFactor, &["Spine"])];

    let mut merger = AncillaryDataMerger::new(MergeFlags::bones_only());
    merger.add_source(&a);
    let merged = merger.finish(|_| true).unwrap();

    assert!(merged.sockets.is_empty());
    assert!(merged.curves.is_empty());
    assert!(merged.slot_groups.is_empty());
    assert!(merged.blend_profiles.is_empty());
}
