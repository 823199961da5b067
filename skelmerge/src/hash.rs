//! Stable structural hashing of bone hierarchies.
//!
//! A bone's [`PathKey`] is `hash(parent_key, hash(bone_name))`, so two bones share a key
//! exactly when their ancestor-name chains from the root are identical. Hashes are BLAKE3
//! truncated to 64 bits, which keeps keys identical across runs, processes and platforms.

use crate::SkeletonData;

/// Structural identity of a bone, derived from its full ancestor-name chain.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PathKey(u64);

impl PathKey {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Parent key shared by every root bone, `hash(0, 0)`.
    pub fn root_parent() -> Self {
        Self(hash_combine(0, 0))
    }

    /// Key of the bone named `bone_name` parented under the bone keyed by `self`.
    pub fn child(self, bone_name: &str) -> Self {
        Self(hash_combine(self.0, name_hash(bone_name)))
    }

    pub fn is_root_parent(self) -> bool {
        self == Self::root_parent()
    }
}

fn truncate_u64(hash: blake3::Hash) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

pub fn name_hash(name: &str) -> u64 {
    truncate_u64(blake3::hash(name.as_bytes()))
}

/// Order-sensitive combination of two hashes.
pub fn hash_combine(a: u64, b: u64) -> u64 {
    let mut input = [0u8; 16];
    input[..8].copy_from_slice(&a.to_le_bytes());
    input[8..].copy_from_slice(&b.to_le_bytes());
    truncate_u64(blake3::hash(&input))
}

/// Dedup key of a socket: its own name plus the bone it hangs off.
pub fn socket_key(socket_name: &str, bone_name: &str) -> u64 {
    hash_combine(name_hash(socket_name), name_hash(bone_name))
}

/// Dedup key of a virtual bone: its source and target bones.
pub fn virtual_bone_key(source_bone: &str, target_bone: &str) -> u64 {
    hash_combine(name_hash(source_bone), name_hash(target_bone))
}

/// Path keys for every bone of `skeleton`, indexed like `skeleton.bones`.
///
/// `root_parent` is the key the root bone hangs off; pass [`PathKey::root_parent`] for a
/// free-standing skeleton or the key of a graft bone to re-home the whole tree. Bones whose
/// parent does not precede them get `None`.
pub fn skeleton_path_keys(skeleton: &SkeletonData, root_parent: PathKey) -> Vec<Option<PathKey>> {
    let mut keys: Vec<Option<PathKey>> = Vec::with_capacity(skeleton.bones.len());
    for (index, bone) in skeleton.bones.iter().enumerate() {
        let parent_key = match bone.parent {
            None => Some(root_parent),
            Some(parent) if parent < index => keys[parent],
            Some(_) => None,
        };
        keys.push(parent_key.map(|k| k.child(&bone.name)));
    }
    keys
}
