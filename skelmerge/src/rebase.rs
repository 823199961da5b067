use crate::{MergedBoneHierarchy, PathKey, Transform};

/// Placement of a grafted skeleton: the bone it hangs off and the mesh instance's own
/// transform relative to that bone.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Graft {
    pub parent_path: PathKey,
    pub relative_transform: Transform,
}

impl Graft {
    /// Reference pose for the grafted skeleton's root bone.
    ///
    /// Location and rotation are the graft parent's component-space rest transform placed by
    /// the instance's relative transform; scale stays the bone's own.
    pub fn rebase_root(&self, merged: &MergedBoneHierarchy, pose: Transform) -> Transform {
        let Some(parent) = merged.component_space_pose(self.parent_path) else {
            return pose;
        };
        Transform {
            translation: self.relative_transform.transform_point(parent.translation),
            rotation: self.relative_transform.transform_rotation(parent.rotation),
            scale: pose.scale,
        }
    }

    /// Reference pose for a non-root bone of the grafted skeleton.
    ///
    /// A bone already placed at `path` keeps its location and rotation.
    pub fn rebase_descendant(
        &self,
        merged: &MergedBoneHierarchy,
        path: PathKey,
        pose: Transform,
    ) -> Transform {
        match merged.pose_at(path) {
            Some(existing) => Transform {
                translation: existing.translation,
                rotation: existing.rotation,
                scale: pose.scale,
            },
            None => pose,
        }
    }
}
