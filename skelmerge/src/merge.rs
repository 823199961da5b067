use crate::{
    AddBoneOutcome, AncillaryDataMerger, AttachmentGraph, AttachmentResolver, BoneData,
    BoneRename, Error, Graft, MergedBoneHierarchy, POSE_TOLERANCE, PathKey, ReferenceFixup,
    Resolution, SkeletonData, SkeletonMergeParams, Transform, apply_renames,
};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MergeState {
    Idle,
    Validating,
    Accumulating,
    Populating,
    MergingAncillary,
    Done,
    Failed,
}

/// Same bone path reached twice with different reference poses; the later pose was kept.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseConflict {
    pub skeleton: String,
    pub bone: String,
    pub previous: Transform,
    pub replacement: Transform,
}

/// A source whose bone chain disagreed with the merged hierarchy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub skeleton: String,
    pub bone: String,
    /// Bones of this source merged before the mismatch; they stay in the result.
    pub bones_kept: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SourceAttachment {
    pub skeleton: String,
    pub resolution: Resolution,
}

/// Non-fatal findings of a merge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeReport {
    /// Sources dropped during validation: duplicates and malformed hierarchies.
    pub skipped_sources: Vec<String>,
    pub rejected: Vec<Rejection>,
    pub pose_conflicts: Vec<PoseConflict>,
    pub renames: Vec<BoneRename>,
    pub attachments: Vec<SourceAttachment>,
    /// Bones whose parent never made it into the merged hierarchy.
    pub unreachable_bones: Vec<String>,
}

/// Maps a source skeleton's bone indices to indices in the merged skeleton.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoneRemap {
    pub skeleton: String,
    pub bones: Vec<Option<usize>>,
}

impl BoneRemap {
    /// Remap by bone name, for meshes bound to a skeleton that was not produced by merging
    /// their own.
    pub fn by_name(source: &SkeletonData, target: &SkeletonData) -> Self {
        let index: HashMap<&str, usize> = target
            .bones
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.as_str(), i))
            .collect();
        Self {
            skeleton: source.name.clone(),
            bones: source
                .bones
                .iter()
                .map(|b| index.get(b.name.as_str()).copied())
                .collect(),
        }
    }

    pub fn merged_index(&self, source_index: usize) -> Option<usize> {
        self.bones.get(source_index).copied().flatten()
    }

    pub fn merged_name<'a>(&self, merged: &'a SkeletonData, source_index: usize) -> Option<&'a str> {
        let index = self.merged_index(source_index)?;
        merged.bones.get(index).map(|b| b.name.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct MergeOutcome {
    pub skeleton: Arc<SkeletonData>,
    pub report: MergeReport,
    /// Indexed like `SkeletonMergeParams::skeletons`; `None` for skipped sources.
    pub remaps: Vec<Option<BoneRemap>>,
}

impl MergeOutcome {
    /// Remap of the first contributing source named `skeleton`.
    pub fn remap_for(&self, skeleton: &str) -> Option<&BoneRemap> {
        self.remaps.iter().flatten().find(|r| r.skeleton == skeleton)
    }

    /// Remap of the source at `index` in `SkeletonMergeParams::skeletons`.
    pub fn remap_at(&self, index: usize) -> Option<&BoneRemap> {
        self.remaps.get(index)?.as_ref()
    }
}

struct Source {
    /// Position in `SkeletonMergeParams::skeletons`.
    index: usize,
    skeleton: Arc<SkeletonData>,
}

struct Accumulated {
    hierarchy: MergedBoneHierarchy,
    ancillary: AncillaryDataMerger,
    source_paths: Vec<(usize, String, Vec<Option<PathKey>>)>,
}

/// Drives a skeleton merge from validation to the finished skeleton.
///
/// The merged skeleton is only built once every step succeeded; a failed merge produces
/// nothing.
pub struct SkeletonMerger<'a> {
    params: &'a SkeletonMergeParams,
    graph: Option<&'a dyn AttachmentGraph>,
    state: MergeState,
    report: MergeReport,
}

impl<'a> SkeletonMerger<'a> {
    pub fn new(params: &'a SkeletonMergeParams) -> Self {
        Self {
            params,
            graph: None,
            state: MergeState::Idle,
            report: MergeReport::default(),
        }
    }

    pub fn with_attachment_graph(mut self, graph: &'a dyn AttachmentGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn state(&self) -> MergeState {
        self.state
    }

    /// Findings collected so far; still readable after a failed merge.
    pub fn report(&self) -> &MergeReport {
        &self.report
    }

    pub fn merge(&mut self) -> Result<MergeOutcome, Error> {
        self.report = MergeReport::default();
        let result = self.run();
        if let Err(e) = &result {
            self.transition(MergeState::Failed);
            log::error!("failed to merge skeletons: {e}");
        }
        result
    }

    /// Merges, then hands the performed bone renames to `fixup`.
    pub fn merge_with_fixup(
        &mut self,
        fixup: &mut dyn ReferenceFixup,
    ) -> Result<MergeOutcome, Error> {
        let outcome = self.merge()?;
        if !outcome.report.renames.is_empty() {
            fixup.apply_renames(&outcome.report.renames)?;
        }
        Ok(outcome)
    }

    fn transition(&mut self, state: MergeState) {
        log::debug!("skeleton merge: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn run(&mut self) -> Result<MergeOutcome, Error> {
        self.transition(MergeState::Validating);
        let sources = self.validate()?;

        self.transition(MergeState::Accumulating);
        let accumulated = self.accumulate(&sources)?;

        self.transition(MergeState::Populating);
        let populated = accumulated.hierarchy.populate()?;
        for name in &populated.unreachable {
            log::warn!("bone '{name}' is not connected to the merged root and was dropped");
        }
        self.report.unreachable_bones = populated.unreachable;

        let merged_index: HashMap<PathKey, usize> = populated
            .bones
            .iter()
            .enumerate()
            .map(|(i, b)| (b.path, i))
            .collect();
        let mut remaps: Vec<Option<BoneRemap>> = vec![None; self.params.skeletons.len()];
        for (index, skeleton, paths) in accumulated.source_paths {
            remaps[index] = Some(BoneRemap {
                skeleton,
                bones: paths
                    .iter()
                    .map(|p| p.and_then(|p| merged_index.get(&p).copied()))
                    .collect(),
            });
        }
        let bones: Vec<BoneData> = populated
            .bones
            .into_iter()
            .map(|b| BoneData {
                name: b.name,
                parent: b.parent,
                pose: b.pose,
            })
            .collect();

        self.transition(MergeState::MergingAncillary);
        let ancillary = accumulated
            .ancillary
            .finish(|name| bones.iter().any(|b| b.name == name))?;

        let skeleton = SkeletonData {
            name: self.params.output_name.clone(),
            bones,
            sockets: ancillary.sockets,
            virtual_bones: ancillary.virtual_bones,
            curves: ancillary.curves,
            blend_profiles: ancillary.blend_profiles,
            slot_groups: ancillary.slot_groups,
        };

        self.transition(MergeState::Done);
        Ok(MergeOutcome {
            skeleton: Arc::new(skeleton),
            report: self.report.clone(),
            remaps,
        })
    }

    fn validate(&mut self) -> Result<Vec<Source>, Error> {
        let mut sources: Vec<Source> = Vec::with_capacity(self.params.skeletons.len());
        for (index, skeleton) in self.params.skeletons.iter().enumerate() {
            if sources.iter().any(|s| Arc::ptr_eq(&s.skeleton, skeleton)) {
                log::debug!("skeleton '{}' listed more than once", skeleton.name);
                self.report.skipped_sources.push(skeleton.name.clone());
                continue;
            }
            if !skeleton.is_parent_first() {
                log::warn!(
                    "skeleton '{}' lists a bone before its parent, skipping it",
                    skeleton.name
                );
                self.report.skipped_sources.push(skeleton.name.clone());
                continue;
            }
            sources.push(Source {
                index,
                skeleton: skeleton.clone(),
            });
        }

        if sources.len() < 2 {
            return Err(Error::InsufficientSources {
                count: sources.len(),
            });
        }
        if sources.iter().all(|s| s.skeleton.bones.is_empty()) {
            return Err(Error::EmptyBoneSet);
        }
        Ok(sources)
    }

    fn accumulate(&mut self, sources: &[Source]) -> Result<Accumulated, Error> {
        let flags = self.params.flags;
        let skeletons: Vec<Arc<SkeletonData>> =
            sources.iter().map(|s| s.skeleton.clone()).collect();
        let total_bones = skeletons.iter().map(|s| s.bones.len()).sum();
        let mut hierarchy = MergedBoneHierarchy::with_capacity(total_bones);
        let mut ancillary = AncillaryDataMerger::new(flags);
        let mut source_paths = Vec::with_capacity(sources.len());
        let resolver = self.graph.map(|g| AttachmentResolver::new(g, &skeletons));
        let mut accepted = 0usize;

        for (source_index, source) in sources.iter().enumerate() {
            let skeleton = &source.skeleton;
            let resolution = match &resolver {
                Some(resolver) if source_index > 0 => resolver.resolve(skeleton, &hierarchy),
                _ => Resolution::NotInstanced,
            };
            if let Resolution::Unresolved { wanted, .. } = &resolution {
                log::warn!(
                    "skeleton '{}' has no resolvable attach bone ({}); its root stays a separate root",
                    skeleton.name,
                    wanted.as_deref().unwrap_or("none declared"),
                );
            }
            let graft = match (resolution.attachment(), self.graph) {
                (Some(a), Some(graph)) => Some(Graft {
                    parent_path: a.parent_path,
                    relative_transform: graph.relative_transform(a.component),
                }),
                _ => None,
            };
            let root_parent = resolution.parent_path();
            if source_index > 0 {
                self.report.attachments.push(SourceAttachment {
                    skeleton: skeleton.name.clone(),
                    resolution,
                });
            }

            let mut paths: Vec<Option<PathKey>> = Vec::with_capacity(skeleton.bones.len());
            let mut mismatch: Option<String> = None;
            let mut pose_conflict_logged = false;
            let mut source_renames: Vec<BoneRename> = Vec::new();

            for bone in &skeleton.bones {
                let parent_path = match bone.parent {
                    None => Some(root_parent),
                    Some(parent) => paths[parent],
                };
                let Some(parent_path) = parent_path else {
                    paths.push(None);
                    continue;
                };
                let path = parent_path.child(&bone.name);

                if flags.check_compatibility
                    && hierarchy.path_of(&bone.name).is_some_and(|p| p != path)
                {
                    mismatch = Some(bone.name.clone());
                    break;
                }

                let pose = match &graft {
                    Some(g) if bone.parent.is_none() => g.rebase_root(&hierarchy, bone.pose),
                    Some(g) => g.rebase_descendant(&hierarchy, path, bone.pose),
                    None => bone.pose,
                };

                match hierarchy.add_bone(&bone.name, pose, parent_path, &skeleton.name) {
                    AddBoneOutcome::Inserted { .. } => {}
                    AddBoneOutcome::Merged {
                        name,
                        previous_pose,
                        ..
                    } => {
                        if !previous_pose.equals(&pose, POSE_TOLERANCE) {
                            if !pose_conflict_logged {
                                log::warn!(
                                    "skeleton '{}' has a different reference pose, reference pose will be overwritten",
                                    skeleton.name
                                );
                                pose_conflict_logged = true;
                            }
                            self.report.pose_conflicts.push(PoseConflict {
                                skeleton: skeleton.name.clone(),
                                bone: name,
                                previous: previous_pose,
                                replacement: pose,
                            });
                        }
                    }
                    AddBoneOutcome::Renamed { name, .. } => {
                        log::warn!(
                            "bone '{}' of skeleton '{}' collides with a different bone, merged as '{name}'",
                            bone.name,
                            skeleton.name
                        );
                        source_renames.push(BoneRename {
                            skeleton: skeleton.name.clone(),
                            from: bone.name.clone(),
                            to: name,
                        });
                    }
                }
                paths.push(Some(path));
            }

            let bones_kept = paths.len();
            paths.resize(skeleton.bones.len(), None);
            source_paths.push((source.index, skeleton.name.clone(), paths));
            self.report.renames.extend(source_renames.iter().cloned());

            if let Some(bone) = mismatch {
                log::error!(
                    "skeleton '{}' has an invalid bone chain at bone '{bone}', skipping the rest of it",
                    skeleton.name
                );
                self.report.rejected.push(Rejection {
                    skeleton: skeleton.name.clone(),
                    bone,
                    bones_kept,
                });
                continue;
            }

            accepted += 1;
            if source_renames.is_empty() {
                ancillary.add_source(skeleton);
            } else {
                ancillary.add_source(&apply_renames(skeleton, &source_renames));
            }
        }

        if accepted == 0 {
            let (skeleton, bone) = self
                .report
                .rejected
                .last()
                .map(|r| (r.skeleton.clone(), r.bone.clone()))
                .unwrap_or_default();
            return Err(Error::IncompatibleHierarchy { skeleton, bone });
        }

        Ok(Accumulated {
            hierarchy,
            ancillary,
            source_paths,
        })
    }
}

/// Merges `params.skeletons` into one skeleton, grafting secondary skeletons where `graph`
/// says they attach.
pub fn merge_skeletons(
    params: &SkeletonMergeParams,
    graph: Option<&dyn AttachmentGraph>,
) -> Result<MergeOutcome, Error> {
    let mut merger = SkeletonMerger::new(params);
    if let Some(graph) = graph {
        merger = merger.with_attachment_graph(graph);
    }
    merger.merge()
}
