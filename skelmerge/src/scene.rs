use crate::Transform;

pub type ComponentId = usize;

#[derive(Clone, Debug, PartialEq)]
pub enum ComponentKind {
    /// Plain transform node.
    Scene,
    /// Instance of a skeletal mesh bound to the skeleton named `skeleton`.
    SkeletalMesh { skeleton: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneComponent {
    pub name: String,
    pub kind: ComponentKind,
    /// Bone on the parent component's skeleton this component is attached to.
    pub attach_to: Option<String>,
    /// Placement relative to the attach point.
    pub relative_transform: Transform,
    pub children: Vec<ComponentId>,
}

impl SceneComponent {
    pub fn new(name: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attach_to: None,
            relative_transform: Transform::IDENTITY,
            children: Vec::new(),
        }
    }

    pub fn skeletal_mesh(name: impl Into<String>, skeleton: impl Into<String>) -> Self {
        Self::new(
            name,
            ComponentKind::SkeletalMesh {
                skeleton: skeleton.into(),
            },
        )
    }

    pub fn with_attach_to(mut self, bone: impl Into<String>) -> Self {
        self.attach_to = Some(bone.into());
        self
    }

    pub fn with_relative_transform(mut self, transform: Transform) -> Self {
        self.relative_transform = transform;
        self
    }

    pub fn is_skeletal_mesh_component(&self) -> bool {
        matches!(self.kind, ComponentKind::SkeletalMesh { .. })
    }

    pub fn skeleton(&self) -> Option<&str> {
        match &self.kind {
            ComponentKind::SkeletalMesh { skeleton } => Some(skeleton),
            ComponentKind::Scene => None,
        }
    }
}

/// Scene/component description the merge reads attachment points from.
pub trait AttachmentGraph {
    /// First skeletal mesh component instancing the skeleton named `skeleton`.
    fn component_for_skeleton(&self, skeleton: &str) -> Option<ComponentId>;

    /// Bone explicitly named as this component's attach point.
    fn attach_target(&self, component: ComponentId) -> Option<&str>;

    /// Component whose direct children include `component`.
    fn parent_component(&self, component: ComponentId) -> Option<ComponentId>;

    /// Skeleton instanced by `component`, if it is a skeletal mesh component.
    fn skeleton_of(&self, component: ComponentId) -> Option<&str>;

    fn relative_transform(&self, component: ComponentId) -> Transform;
}

#[derive(Clone, Debug, Default)]
pub struct ComponentTree {
    components: Vec<SceneComponent>,
}

impl ComponentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component(&mut self, component: SceneComponent) -> ComponentId {
        let id = self.components.len();
        self.components.push(component);
        id
    }

    /// Adds `child` to `parent`'s children. Returns false if either id is unknown.
    pub fn add_child(&mut self, parent: ComponentId, child: ComponentId) -> bool {
        if child >= self.components.len() {
            return false;
        }
        let Some(parent) = self.components.get_mut(parent) else {
            return false;
        };
        if !parent.children.contains(&child) {
            parent.children.push(child);
        }
        true
    }

    pub fn component(&self, id: ComponentId) -> Option<&SceneComponent> {
        self.components.get(id)
    }

    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.components.iter().position(|c| c.name == name)
    }

    pub fn components(&self) -> &[SceneComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl AttachmentGraph for ComponentTree {
    fn component_for_skeleton(&self, skeleton: &str) -> Option<ComponentId> {
        self.components
            .iter()
            .position(|c| c.skeleton() == Some(skeleton))
    }

    fn attach_target(&self, component: ComponentId) -> Option<&str> {
        self.components
            .get(component)?
            .attach_to
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    fn parent_component(&self, component: ComponentId) -> Option<ComponentId> {
        self.components
            .iter()
            .position(|c| c.children.contains(&component))
    }

    fn skeleton_of(&self, component: ComponentId) -> Option<&str> {
        self.components.get(component)?.skeleton()
    }

    fn relative_transform(&self, component: ComponentId) -> Transform {
        self.components
            .get(component)
            .map(|c| c.relative_transform)
            .unwrap_or_default()
    }
}
