use crate::{
    AttachmentGraph, BoneRemap, Error, MergeReport, MeshMergeParams, SkeletonData,
    SkeletonMergeParams, SkeletonMerger, SocketData,
};
use std::collections::HashSet;
use std::sync::Arc;

/// What the mesh combiner receives for one source mesh.
#[derive(Debug)]
pub struct MeshCombineInput<'a, M> {
    pub mesh: &'a M,
    pub bone_remap: &'a BoneRemap,
    pub section_materials: &'a [usize],
    pub uv_transforms: &'a [glam::Affine2],
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CombineSettings {
    pub strip_top_lods: usize,
    pub needs_cpu_access: bool,
}

/// External geometry merger: concatenates vertex buffers and remaps bone influences,
/// sections and UVs into one renderable mesh.
pub trait MeshCombiner<M> {
    type Output;

    fn combine(
        &mut self,
        skeleton: &SkeletonData,
        inputs: &[MeshCombineInput<'_, M>],
        settings: &CombineSettings,
    ) -> Result<Self::Output, Error>;

    /// Sockets stored on the combined mesh itself rather than on its skeleton.
    fn mesh_sockets(&self, _output: &Self::Output) -> Vec<SocketData> {
        Vec::new()
    }
}

/// Socket name counts across a combined mesh and its skeleton.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SocketAudit {
    pub mesh_sockets: usize,
    pub skeleton_sockets: usize,
    pub unique_mesh_sockets: usize,
    pub unique_skeleton_sockets: usize,
}

impl SocketAudit {
    pub fn total(&self) -> usize {
        self.mesh_sockets + self.skeleton_sockets
    }

    pub fn unique_total(&self) -> usize {
        self.unique_mesh_sockets + self.unique_skeleton_sockets
    }

    pub fn has_duplicates(&self) -> bool {
        self.total() != self.unique_total()
    }
}

pub fn socket_duplicate_audit(mesh: &[SocketData], skeleton: &[SocketData]) -> SocketAudit {
    let unique = |sockets: &[SocketData]| {
        sockets
            .iter()
            .map(|s| s.name.as_str())
            .collect::<HashSet<_>>()
            .len()
    };
    SocketAudit {
        mesh_sockets: mesh.len(),
        skeleton_sockets: skeleton.len(),
        unique_mesh_sockets: unique(mesh),
        unique_skeleton_sockets: unique(skeleton),
    }
}

#[derive(Debug)]
pub struct MeshMergeOutcome<O> {
    pub mesh: O,
    /// Skeleton the combined mesh is bound to.
    pub skeleton: Arc<SkeletonData>,
    pub report: MergeReport,
    pub socket_audit: Option<SocketAudit>,
}

/// Merges skeletal meshes through `combiner`, building the skeleton they bind to first.
///
/// Meshes sharing one skeleton need no skeleton merge. Meshes over several distinct
/// skeletons are merged with [`SkeletonMerger`], grafting secondary skeletons per `graph`,
/// unless `params.skeleton_before` supplies the target skeleton up front.
pub fn merge_meshes<M, C: MeshCombiner<M>>(
    params: &MeshMergeParams<M>,
    graph: Option<&dyn AttachmentGraph>,
    combiner: &mut C,
) -> Result<MeshMergeOutcome<C::Output>, Error> {
    if params.meshes.len() < 2 {
        log::warn!("must provide multiple meshes in order to perform a merge");
        return Err(Error::InsufficientSources {
            count: params.meshes.len(),
        });
    }

    let mut distinct: Vec<Arc<SkeletonData>> = Vec::new();
    for mesh in &params.meshes {
        if !distinct.iter().any(|s| Arc::ptr_eq(s, &mesh.skeleton)) {
            distinct.push(mesh.skeleton.clone());
        }
    }

    let (target, report, remaps) = match (&params.skeleton, params.skeleton_before) {
        (Some(skeleton), true) => {
            let remaps = params
                .meshes
                .iter()
                .map(|m| BoneRemap::by_name(&m.skeleton, skeleton))
                .collect::<Vec<_>>();
            (skeleton.clone(), MergeReport::default(), remaps)
        }
        _ if distinct.len() == 1 => {
            let skeleton = distinct[0].clone();
            let remaps = params
                .meshes
                .iter()
                .map(|m| BoneRemap::by_name(&m.skeleton, &skeleton))
                .collect::<Vec<_>>();
            (skeleton, MergeReport::default(), remaps)
        }
        _ => {
            let skeleton_params = SkeletonMergeParams::new(distinct.clone()).with_flags(params.flags);
            let mut merger = SkeletonMerger::new(&skeleton_params);
            if let Some(graph) = graph {
                merger = merger.with_attachment_graph(graph);
            }
            let outcome = merger.merge()?;
            let remaps = params
                .meshes
                .iter()
                .map(|m| {
                    distinct
                        .iter()
                        .position(|s| Arc::ptr_eq(s, &m.skeleton))
                        .and_then(|index| outcome.remap_at(index))
                        .cloned()
                        .unwrap_or_else(|| BoneRemap::by_name(&m.skeleton, &outcome.skeleton))
                })
                .collect::<Vec<_>>();
            (outcome.skeleton, outcome.report, remaps)
        }
    };

    let inputs: Vec<MeshCombineInput<'_, M>> = params
        .meshes
        .iter()
        .zip(&remaps)
        .map(|(m, remap)| MeshCombineInput {
            mesh: &m.mesh,
            bone_remap: remap,
            section_materials: &m.section_materials,
            uv_transforms: &m.uv_transforms,
        })
        .collect();
    let settings = CombineSettings {
        strip_top_lods: params.strip_top_lods,
        needs_cpu_access: params.needs_cpu_access,
    };
    let mesh = combiner.combine(&target, &inputs, &settings)?;

    let socket_audit = if params.skeleton_before && params.skeleton.is_some() {
        let audit = socket_duplicate_audit(&combiner.mesh_sockets(&mesh), &target.sockets);
        log::info!(
            "mesh sockets: {} | skeleton sockets: {} | combined: {} | unique combined: {} | duplicates: {}",
            audit.mesh_sockets,
            audit.skeleton_sockets,
            audit.total(),
            audit.unique_total(),
            audit.has_duplicates()
        );
        Some(audit)
    } else {
        None
    };

    let skeleton = match (&params.skeleton, params.skeleton_before) {
        (Some(skeleton), false) => skeleton.clone(),
        _ => target,
    };

    Ok(MeshMergeOutcome {
        mesh,
        skeleton,
        report,
        socket_audit,
    })
}
