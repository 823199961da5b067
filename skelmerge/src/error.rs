use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("must provide at least two distinct skeletons to merge, got {count}")]
    InsufficientSources { count: usize },

    #[error("skeletons to merge contain no bones")]
    EmptyBoneSet,

    #[error("skeleton '{skeleton}' has an invalid bone chain at bone '{bone}'")]
    IncompatibleHierarchy { skeleton: String, bone: String },

    #[error("merged hierarchy has more than one root bone: {}", roots.join(", "))]
    AmbiguousRoot { roots: Vec<String> },

    #[error("merged hierarchy has no root bone")]
    NoRoot,

    #[error(
        "blend profile '{profile}' from skeleton '{skeleton}' uses mode {found:?}, expected {expected:?}"
    )]
    BlendProfileModeMismatch {
        profile: String,
        skeleton: String,
        expected: crate::BlendProfileMode,
        found: crate::BlendProfileMode,
    },

    #[error("blend profile '{profile}' from skeleton '{skeleton}' repeats entry for bone '{bone}'")]
    DuplicateBoneEntry {
        profile: String,
        skeleton: String,
        bone: String,
    },

    #[error("invalid export path: '{path}'")]
    InvalidExportPath { path: String },

    #[error("failed to save '{path}': {message}")]
    Persistence { path: String, message: String },

    #[error("mesh combine failed: {message}")]
    MeshCombine { message: String },

    #[cfg(feature = "json")]
    #[error("failed to parse JSON: {message}")]
    JsonParse { message: String },

    #[cfg(feature = "json")]
    #[error("unknown parent bone '{parent}' for bone '{bone}' in skeleton '{skeleton}'")]
    JsonUnknownBoneParent {
        skeleton: String,
        bone: String,
        parent: String,
    },

    #[cfg(feature = "json")]
    #[error("duplicate bone '{bone}' in skeleton '{skeleton}'")]
    JsonDuplicateBone { skeleton: String, bone: String },

    #[cfg(feature = "json")]
    #[error("unsupported blend profile mode '{value}' for profile '{profile}'")]
    JsonUnsupportedBlendProfileMode { profile: String, value: String },

    #[cfg(feature = "json")]
    #[error("unknown child component '{child}' referenced by component '{component}'")]
    JsonUnknownChildComponent { component: String, child: String },

    #[cfg(feature = "json")]
    #[error("duplicate component '{component}'")]
    JsonDuplicateComponent { component: String },
}
