//! Merging of skeletal bone hierarchies (unofficial engine-agnostic port).
//!
//! Several skeletons are folded into one by structural path: bones with identical
//! ancestor-name chains become one bone, everything else is unioned. Secondary skeletons
//! can be grafted under a bone of an earlier one through an [`AttachmentGraph`].
//! Sockets, virtual bones, curves, blend profiles and slot groups are merged alongside.
//!
//! Mesh geometry, asset storage and reference fixup are host concerns, reached through the
//! [`MeshCombiner`], [`SkeletonSink`] and [`ReferenceFixup`] traits.

#![forbid(unsafe_code)]

mod ancillary;
mod attachment;
mod error;
mod fixup;
pub mod hash;
mod hierarchy;
mod merge;
mod mesh;
mod model;
mod params;
mod persist;
mod rebase;
mod scene;
mod transform;

#[cfg(feature = "json")]
pub mod json;

pub use ancillary::*;
pub use attachment::*;
pub use error::*;
pub use fixup::*;
pub use hash::PathKey;
pub use hierarchy::*;
pub use merge::*;
pub use mesh::*;
pub use model::*;
pub use params::*;
pub use persist::*;
pub use rebase::*;
pub use scene::*;
pub use transform::*;


#[cfg(test)]
mod hierarchy_tests;


#[cfg(test)]
mod ancillary_tests;





#[cfg(all(test, feature = "json"))]
mod json_tests;
