use crate::hash::{socket_key, virtual_bone_key};
use crate::{
    BlendProfileData, CurveData, Error, MergeFlags, SkeletonData, SlotGroupData, SocketData,
    VirtualBoneData,
};
use std::collections::{HashMap, HashSet};

/// Ancillary data folded from every accepted source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergedAncillary {
    pub sockets: Vec<SocketData>,
    pub virtual_bones: Vec<VirtualBoneData>,
    pub curves: Vec<CurveData>,
    pub blend_profiles: Vec<BlendProfileData>,
    pub slot_groups: Vec<SlotGroupData>,
}

#[derive(Clone, Debug)]
struct PendingBlendProfile {
    name: String,
    /// (source skeleton name, profile) in merge order.
    profiles: Vec<(String, BlendProfileData)>,
}

/// Accumulates sockets, virtual bones, curves, blend profiles and slot groups.
///
/// Sources must be added in merge order: curve metadata is last-wins and blend profile
/// modes are taken from the first profile of each name.
#[derive(Clone, Debug)]
pub struct AncillaryDataMerger {
    flags: MergeFlags,
    sockets: Vec<SocketData>,
    socket_keys: HashSet<u64>,
    virtual_bones: Vec<VirtualBoneData>,
    virtual_bone_keys: HashSet<u64>,
    curves: Vec<CurveData>,
    curve_index: HashMap<String, usize>,
    blend_profiles: Vec<PendingBlendProfile>,
    blend_profile_index: HashMap<String, usize>,
    slot_groups: Vec<SlotGroupData>,
    slot_group_index: HashMap<String, usize>,
}

impl AncillaryDataMerger {
    pub fn new(flags: MergeFlags) -> Self {
        Self {
            flags,
            sockets: Vec::new(),
            socket_keys: HashSet::new(),
            virtual_bones: Vec::new(),
            virtual_bone_keys: HashSet::new(),
            curves: Vec::new(),
            curve_index: HashMap::new(),
            blend_profiles: Vec::new(),
            blend_profile_index: HashMap::new(),
            slot_groups: Vec::new(),
            slot_group_index: HashMap::new(),
        }
    }

    pub fn add_source(&mut self, skeleton: &SkeletonData) {
        if self.flags.merge_sockets {
            for socket in &skeleton.sockets {
                if self.socket_keys.insert(socket_key(&socket.name, &socket.bone)) {
                    self.sockets.push(socket.clone());
                }
            }
        }

        if self.flags.merge_virtual_bones {
            for vb in &skeleton.virtual_bones {
                let key = virtual_bone_key(&vb.source_bone, &vb.target_bone);
                if self.virtual_bone_keys.insert(key) {
                    self.virtual_bones.push(vb.clone());
                }
            }
        }

        if self.flags.merge_curve_names {
            for curve in &skeleton.curves {
                match self.curve_index.get(&curve.name) {
                    Some(&i) => self.curves[i].metadata = curve.metadata.clone(),
                    None => {
                        self.curve_index.insert(curve.name.clone(), self.curves.len());
                        self.curves.push(curve.clone());
                    }
                }
            }
        }

        if self.flags.merge_anim_slot_groups {
            for group in &skeleton.slot_groups {
                let index = *self
                    .slot_group_index
                    .entry(group.name.clone())
                    .or_insert_with(|| {
                        self.slot_groups.push(SlotGroupData {
                            name: group.name.clone(),
                            slots: Vec::new(),
                        });
                        self.slot_groups.len() - 1
                    });
                let merged = &mut self.slot_groups[index];
                for slot in &group.slots {
                    if !merged.slots.contains(slot) {
                        merged.slots.push(slot.clone());
                    }
                }
            }
        }

        if self.flags.merge_blend_profiles {
            for profile in &skeleton.blend_profiles {
                let index = *self
                    .blend_profile_index
                    .entry(profile.name.clone())
                    .or_insert_with(|| {
                        self.blend_profiles.push(PendingBlendProfile {
                            name: profile.name.clone(),
                            profiles: Vec::new(),
                        });
                        self.blend_profiles.len() - 1
                    });
                self.blend_profiles[index]
                    .profiles
                    .push((skeleton.name.clone(), profile.clone()));
            }
        }
    }

    /// Produces the merged ancillary data. `has_bone` reports whether the merged skeleton
    /// contains a bone; blend profile entries for other bones are dropped.
    pub fn finish(self, has_bone: impl Fn(&str) -> bool) -> Result<MergedAncillary, Error> {
        let mut blend_profiles = Vec::with_capacity(self.blend_profiles.len());
        for pending in self.blend_profiles {
            blend_profiles.push(merge_blend_profile(pending, &has_bone)?);
        }

        Ok(MergedAncillary {
            sockets: self.sockets,
            virtual_bones: self.virtual_bones,
            curves: self.curves,
            blend_profiles,
            slot_groups: self.slot_groups,
        })
    }
}

fn merge_blend_profile(
    pending: PendingBlendProfile,
    has_bone: &impl Fn(&str) -> bool,
) -> Result<BlendProfileData, Error> {
    let mode = pending
        .profiles
        .first()
        .map(|(_, p)| p.mode)
        .unwrap_or_default();
    let mut merged = BlendProfileData {
        name: pending.name,
        mode,
        entries: Vec::new(),
    };

    for (skeleton, profile) in pending.profiles {
        if profile.mode != merged.mode {
            return Err(Error::BlendProfileModeMismatch {
                profile: merged.name,
                skeleton,
                expected: merged.mode,
                found: profile.mode,
            });
        }
        for entry in profile.entries {
            if merged.entry(&entry.bone).is_some() {
                return Err(Error::DuplicateBoneEntry {
                    profile: merged.name,
                    skeleton,
                    bone: entry.bone,
                });
            }
            if has_bone(&entry.bone) {
                merged.entries.push(entry);
            }
        }
    }

    Ok(merged)
}
