use crate::{AttachmentGraph, ComponentId, MergedBoneHierarchy, PathKey, SkeletonData};
use std::sync::Arc;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AttachSource {
    /// The component named its attach bone.
    Explicit,
    /// Fallback: the root bone of the component that lists this one as a child.
    ParentRoot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    pub component: ComponentId,
    pub parent_bone: String,
    pub parent_path: PathKey,
    pub source: AttachSource,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// The skeleton is not instanced by any component; its root stays a root.
    NotInstanced,
    Attached(Attachment),
    /// The skeleton is instanced but no attach bone could be found among merged bones.
    Unresolved {
        component: ComponentId,
        wanted: Option<String>,
    },
}

impl Resolution {
    /// Parent key to hash the skeleton's root bone with.
    pub fn parent_path(&self) -> PathKey {
        match self {
            Self::Attached(a) => a.parent_path,
            Self::NotInstanced | Self::Unresolved { .. } => PathKey::root_parent(),
        }
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        match self {
            Self::Attached(a) => Some(a),
            Self::NotInstanced | Self::Unresolved { .. } => None,
        }
    }

    pub fn component(&self) -> Option<ComponentId> {
        match self {
            Self::Attached(a) => Some(a.component),
            Self::Unresolved { component, .. } => Some(*component),
            Self::NotInstanced => None,
        }
    }
}

/// Finds where a secondary skeleton's root bone is grafted into the merged hierarchy.
pub struct AttachmentResolver<'a> {
    graph: &'a dyn AttachmentGraph,
    sources: &'a [Arc<SkeletonData>],
}

impl<'a> AttachmentResolver<'a> {
    pub fn new(graph: &'a dyn AttachmentGraph, sources: &'a [Arc<SkeletonData>]) -> Self {
        Self { graph, sources }
    }

    pub fn resolve(&self, skeleton: &SkeletonData, merged: &MergedBoneHierarchy) -> Resolution {
        let Some(component) = self.graph.component_for_skeleton(&skeleton.name) else {
            return Resolution::NotInstanced;
        };

        let (wanted, source) = match self.graph.attach_target(component) {
            Some(bone) => (Some(bone.to_string()), AttachSource::Explicit),
            None => (self.parent_root_bone(component), AttachSource::ParentRoot),
        };

        let Some(parent_bone) = wanted else {
            return Resolution::Unresolved {
                component,
                wanted: None,
            };
        };
        match merged.path_of(&parent_bone) {
            Some(parent_path) => Resolution::Attached(Attachment {
                component,
                parent_bone,
                parent_path,
                source,
            }),
            None => Resolution::Unresolved {
                component,
                wanted: Some(parent_bone),
            },
        }
    }

    fn parent_root_bone(&self, component: ComponentId) -> Option<String> {
        let parent = self.graph.parent_component(component)?;
        let skeleton_name = self.graph.skeleton_of(parent)?;
        let skeleton = self.sources.iter().find(|s| s.name == skeleton_name)?;
        skeleton.root_bone().map(|b| b.name.clone())
    }
}
