use crate::{
    AttachmentGraph, Error, MergeOutcome, ReferenceFixup, SkeletonData, SkeletonMergeParams,
    SkeletonMerger,
};

/// Host storage for merged skeletons.
pub trait SkeletonSink {
    fn save(&mut self, skeleton: &SkeletonData, path: &str) -> Result<(), Error>;
}

/// Accepts non-empty asset paths that name an asset rather than a directory.
pub fn validate_export_path(path: &str) -> Result<(), Error> {
    let invalid = path.trim().is_empty()
        || path.ends_with('/')
        || path.ends_with('\\')
        || path.chars().any(char::is_control);
    if invalid {
        return Err(Error::InvalidExportPath {
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Merges `params` and saves the result to `path`.
///
/// The path is checked before any merging. `sink` is called exactly once, after the merge
/// and the rename fixup succeeded, and never on failure.
pub fn merge_and_save(
    params: &SkeletonMergeParams,
    graph: Option<&dyn AttachmentGraph>,
    fixup: &mut dyn ReferenceFixup,
    sink: &mut dyn SkeletonSink,
    path: &str,
) -> Result<MergeOutcome, Error> {
    validate_export_path(path)?;

    let mut merger = SkeletonMerger::new(params);
    if let Some(graph) = graph {
        merger = merger.with_attachment_graph(graph);
    }
    let outcome = merger.merge_with_fixup(fixup)?;

    sink.save(&outcome.skeleton, path)?;
    log::info!(
        "saved merged skeleton '{}' ({} bones) to '{path}'",
        outcome.skeleton.name,
        outcome.skeleton.bones.len()
    );
    Ok(outcome)
}
