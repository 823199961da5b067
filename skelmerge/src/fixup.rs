use crate::{Error, SkeletonData};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A bone emitted under a different name than its source used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoneRename {
    pub skeleton: String,
    pub from: String,
    pub to: String,
}

/// Host service that updates assets referencing renamed bones.
///
/// Called once, after a merge succeeded, with every rename the merge performed.
pub trait ReferenceFixup {
    fn apply_renames(&mut self, renames: &[BoneRename]) -> Result<(), Error>;
}

/// Fixup that does nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoFixup;

impl ReferenceFixup for NoFixup {
    fn apply_renames(&mut self, _renames: &[BoneRename]) -> Result<(), Error> {
        Ok(())
    }
}

/// Renames every bone whose name already appears in an earlier skeleton to
/// `<bone>_<skeleton>`.
///
/// The first skeleton is never renamed. Nothing is modified; apply the returned map with
/// [`apply_renames`] or hand it to a [`ReferenceFixup`].
pub fn find_bone_name_collisions(skeletons: &[Arc<SkeletonData>]) -> Vec<BoneRename> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut renames = Vec::new();
    for skeleton in skeletons {
        let mut own: Vec<&str> = Vec::with_capacity(skeleton.bones.len());
        for bone in &skeleton.bones {
            if seen.contains(bone.name.as_str()) {
                renames.push(BoneRename {
                    skeleton: skeleton.name.clone(),
                    from: bone.name.clone(),
                    to: format!("{}_{}", bone.name, skeleton.name),
                });
            }
            own.push(&bone.name);
        }
        seen.extend(own);
    }
    renames
}

/// Copy of `skeleton` with the renames addressed to it applied to bones and to every
/// ancillary reference to those bones.
pub fn apply_renames(skeleton: &SkeletonData, renames: &[BoneRename]) -> SkeletonData {
    let map: HashMap<&str, &str> = renames
        .iter()
        .filter(|r| r.skeleton == skeleton.name)
        .map(|r| (r.from.as_str(), r.to.as_str()))
        .collect();
    let rename = |name: &mut String| {
        if let Some(to) = map.get(name.as_str()) {
            *name = (*to).to_string();
        }
    };

    let mut out = skeleton.clone();
    for bone in &mut out.bones {
        rename(&mut bone.name);
    }
    for socket in &mut out.sockets {
        rename(&mut socket.bone);
    }
    for vb in &mut out.virtual_bones {
        rename(&mut vb.source_bone);
        rename(&mut vb.target_bone);
    }
    for curve in &mut out.curves {
        if let Some(meta) = &mut curve.metadata {
            for bone in &mut meta.linked_bones {
                rename(bone);
            }
        }
    }
    for profile in &mut out.blend_profiles {
        for entry in &mut profile.entries {
            rename(&mut entry.bone);
        }
    }
    out
}
