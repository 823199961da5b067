use crate::Transform;

#[derive(Clone, Debug, PartialEq)]
pub struct BoneData {
    pub name: String,
    pub parent: Option<usize>,
    /// Reference pose relative to the parent bone.
    pub pose: Transform,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SocketData {
    pub name: String,
    pub bone: String,
    pub relative: Transform,
    pub force_always_animated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualBoneData {
    pub name: String,
    pub source_bone: String,
    pub target_bone: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CurveMetaData {
    pub material: bool,
    pub morph_target: bool,
    pub linked_bones: Vec<String>,
    pub max_lod: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurveData {
    pub name: String,
    pub metadata: Option<CurveMetaData>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum BlendProfileMode {
    #[default]
    TimeFactor,
    WeightFactor,
    BlendMask,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlendProfileEntry {
    pub bone: String,
    pub blend_scale: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlendProfileData {
    pub name: String,
    pub mode: BlendProfileMode,
    pub entries: Vec<BlendProfileEntry>,
}

impl BlendProfileData {
    pub fn entry(&self, bone: &str) -> Option<&BlendProfileEntry> {
        self.entries.iter().find(|e| e.bone == bone)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotGroupData {
    pub name: String,
    pub slots: Vec<String>,
}

/// A skeleton asset: bone hierarchy with reference pose plus ancillary metadata.
///
/// Bones are stored parent-first; `BoneData::parent` indexes into `bones`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkeletonData {
    pub name: String,
    pub bones: Vec<BoneData>,
    pub sockets: Vec<SocketData>,
    pub virtual_bones: Vec<VirtualBoneData>,
    pub curves: Vec<CurveData>,
    pub blend_profiles: Vec<BlendProfileData>,
    pub slot_groups: Vec<SlotGroupData>,
}

impl SkeletonData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    pub fn bone(&self, name: &str) -> Option<&BoneData> {
        self.bones.iter().find(|b| b.name == name)
    }

    pub fn root_bone(&self) -> Option<&BoneData> {
        self.bones.first()
    }

    pub fn socket(&self, name: &str) -> Option<&SocketData> {
        self.sockets.iter().find(|s| s.name == name)
    }

    pub fn curve(&self, name: &str) -> Option<&CurveData> {
        self.curves.iter().find(|c| c.name == name)
    }

    pub fn blend_profile(&self, name: &str) -> Option<&BlendProfileData> {
        self.blend_profiles.iter().find(|p| p.name == name)
    }

    pub fn slot_group(&self, name: &str) -> Option<&SlotGroupData> {
        self.slot_groups.iter().find(|g| g.name == name)
    }

    /// True when every bone's parent precedes it, the order merging walks bones in.
    pub fn is_parent_first(&self) -> bool {
        self.bones
            .iter()
            .enumerate()
            .all(|(i, b)| b.parent.is_none_or(|p| p < i))
    }

    /// Reference pose of `index` composed up to the skeleton root.
    pub fn component_space_pose(&self, index: usize) -> Option<Transform> {
        let mut bone = self.bones.get(index)?;
        let mut pose = bone.pose;
        // One step per bone at most; a longer walk means the parent links form a cycle.
        for _ in 0..self.bones.len() {
            let Some(parent) = bone.parent else {
                return Some(pose);
            };
            bone = self.bones.get(parent)?;
            pose = bone.pose.mul_transform(&pose);
        }
        None
    }
}
