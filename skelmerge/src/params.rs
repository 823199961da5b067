use crate::SkeletonData;
use std::sync::Arc;

/// Switches controlling what a skeleton merge checks and carries over.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MergeFlags {
    /// Reject a source whose bone chain disagrees with an already merged bone of the same
    /// name.
    pub check_compatibility: bool,
    pub merge_sockets: bool,
    pub merge_virtual_bones: bool,
    pub merge_curve_names: bool,
    pub merge_blend_profiles: bool,
    pub merge_anim_slot_groups: bool,
}

impl Default for MergeFlags {
    fn default() -> Self {
        Self {
            check_compatibility: true,
            merge_sockets: true,
            merge_virtual_bones: true,
            merge_curve_names: true,
            merge_blend_profiles: true,
            merge_anim_slot_groups: true,
        }
    }
}

impl MergeFlags {
    /// Bones only: no compatibility check and no ancillary data.
    pub fn bones_only() -> Self {
        Self {
            check_compatibility: false,
            merge_sockets: false,
            merge_virtual_bones: false,
            merge_curve_names: false,
            merge_blend_profiles: false,
            merge_anim_slot_groups: false,
        }
    }
}

pub const DEFAULT_MERGED_SKELETON_NAME: &str = "MergedSkeleton";

#[derive(Clone, Debug)]
pub struct SkeletonMergeParams {
    /// Sources in merge order. The first one provides the merged root.
    pub skeletons: Vec<Arc<SkeletonData>>,
    pub flags: MergeFlags,
    /// Name given to the merged skeleton.
    pub output_name: String,
}

impl Default for SkeletonMergeParams {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SkeletonMergeParams {
    pub fn new(skeletons: Vec<Arc<SkeletonData>>) -> Self {
        Self {
            skeletons,
            flags: MergeFlags::default(),
            output_name: DEFAULT_MERGED_SKELETON_NAME.to_string(),
        }
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    pub fn with_flags(mut self, flags: MergeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_check_compatibility(mut self, enabled: bool) -> Self {
        self.flags.check_compatibility = enabled;
        self
    }

    pub fn with_merge_sockets(mut self, enabled: bool) -> Self {
        self.flags.merge_sockets = enabled;
        self
    }

    pub fn with_merge_virtual_bones(mut self, enabled: bool) -> Self {
        self.flags.merge_virtual_bones = enabled;
        self
    }

    pub fn with_merge_curve_names(mut self, enabled: bool) -> Self {
        self.flags.merge_curve_names = enabled;
        self
    }

    pub fn with_merge_blend_profiles(mut self, enabled: bool) -> Self {
        self.flags.merge_blend_profiles = enabled;
        self
    }

    pub fn with_merge_anim_slot_groups(mut self, enabled: bool) -> Self {
        self.flags.merge_anim_slot_groups = enabled;
        self
    }
}

/// One mesh taking part in a mesh merge.
#[derive(Clone, Debug)]
pub struct MeshToMerge<M> {
    pub mesh: M,
    pub skeleton: Arc<SkeletonData>,
    /// Material slot in the combined mesh for each section of this mesh.
    pub section_materials: Vec<usize>,
    /// Per UV channel transform applied while copying this mesh.
    pub uv_transforms: Vec<glam::Affine2>,
}

impl<M> MeshToMerge<M> {
    pub fn new(mesh: M, skeleton: Arc<SkeletonData>) -> Self {
        Self {
            mesh,
            skeleton,
            section_materials: Vec::new(),
            uv_transforms: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MeshMergeParams<M> {
    pub meshes: Vec<MeshToMerge<M>>,
    pub flags: MergeFlags,
    /// Skeleton to bind the combined mesh to instead of merging the meshes' skeletons.
    pub skeleton: Option<Arc<SkeletonData>>,
    /// Bind to `skeleton` before combining so bone remaps target it; otherwise it is only
    /// attached to the result.
    pub skeleton_before: bool,
    /// Number of highest-detail LODs the combiner should drop.
    pub strip_top_lods: usize,
    pub needs_cpu_access: bool,
}

impl<M> MeshMergeParams<M> {
    pub fn new(meshes: Vec<MeshToMerge<M>>) -> Self {
        Self {
            meshes,
            flags: MergeFlags::default(),
            skeleton: None,
            skeleton_before: false,
            strip_top_lods: 0,
            needs_cpu_access: false,
        }
    }

    pub fn with_flags(mut self, flags: MergeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_skeleton(mut self, skeleton: Arc<SkeletonData>, before: bool) -> Self {
        self.skeleton = Some(skeleton);
        self.skeleton_before = before;
        self
    }
}
