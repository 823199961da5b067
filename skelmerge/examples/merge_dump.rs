use serde_json::json;
use skelmerge::{
    AttachmentGraph, ComponentTree, MergeFlags, Resolution, SkeletonData, SkeletonMergeParams,
    merge_skeletons,
};
use std::path::PathBuf;
use std::sync::Arc;

fn load_skeleton_data(path: &PathBuf) -> Arc<SkeletonData> {
    let json = std::fs::read_to_string(path).expect("read skeleton json");
    SkeletonData::from_json_str(&json).expect("parse skeleton json")
}

fn main() {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut positional = Vec::<String>::new();
    let mut scene_path: Option<String> = None;
    let mut flags_path: Option<String> = None;
    let mut output_name: Option<String> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--scene" => {
                scene_path = args.get(i + 1).cloned();
                i += 2;
            }
            "--flags" => {
                flags_path = args.get(i + 1).cloned();
                i += 2;
            }
            "--name" => {
                output_name = args.get(i + 1).cloned();
                i += 2;
            }
            other => {
                positional.push(other.to_string());
                i += 1;
            }
        }
    }

    if positional.len() < 2 {
        eprintln!(
            "usage: merge_dump <skeleton.json> <skeleton.json>... [--scene scene.json] [--flags flags.json] [--name NAME]"
        );
        std::process::exit(2);
    }

    let skeletons: Vec<Arc<SkeletonData>> = positional
        .iter()
        .map(PathBuf::from)
        .map(|p| load_skeleton_data(&p))
        .collect();

    let flags = flags_path
        .map(|p| {
            let json = std::fs::read_to_string(p).expect("read flags json");
            MergeFlags::from_json_str(&json).expect("parse flags json")
        })
        .unwrap_or_default();

    let tree = scene_path.map(|p| {
        let json = std::fs::read_to_string(p).expect("read scene json");
        ComponentTree::from_json_str(&json).expect("parse scene json")
    });

    let mut params = SkeletonMergeParams::new(skeletons).with_flags(flags);
    if let Some(name) = output_name {
        params = params.with_output_name(name);
    }

    let graph = tree.as_ref().map(|t| t as &dyn AttachmentGraph);
    let outcome = merge_skeletons(&params, graph).expect("merge skeletons");
    let skeleton = &outcome.skeleton;

    let bones: Vec<_> = skeleton
        .bones
        .iter()
        .enumerate()
        .map(|(i, bone)| {
            let parent = bone
                .parent
                .and_then(|p| skeleton.bones.get(p))
                .map(|p| p.name.as_str());
            json!({
                "i": i,
                "name": bone.name,
                "parent": parent,
                "translation": bone.pose.translation.to_array(),
                "rotation": bone.pose.rotation.to_array(),
                "scale": bone.pose.scale.to_array(),
            })
        })
        .collect();

    let sockets: Vec<_> = skeleton
        .sockets
        .iter()
        .map(|s| json!({"name": s.name, "bone": s.bone}))
        .collect();

    let attachments: Vec<_> = outcome
        .report
        .attachments
        .iter()
        .map(|a| {
            let (status, bone) = match &a.resolution {
                Resolution::NotInstanced => ("notInstanced", None),
                Resolution::Attached(attachment) => {
                    ("attached", Some(attachment.parent_bone.as_str()))
                }
                Resolution::Unresolved { wanted, .. } => ("unresolved", wanted.as_deref()),
            };
            json!({"skeleton": a.skeleton, "status": status, "bone": bone})
        })
        .collect();

    let report = &outcome.report;
    let out = json!({
        "name": skeleton.name,
        "bones": bones,
        "sockets": sockets,
        "virtualBones": skeleton.virtual_bones.iter().map(|v| &v.name).collect::<Vec<_>>(),
        "curves": skeleton.curves.iter().map(|c| &c.name).collect::<Vec<_>>(),
        "blendProfiles": skeleton.blend_profiles.iter().map(|p| &p.name).collect::<Vec<_>>(),
        "slotGroups": skeleton.slot_groups.iter().map(|g| json!({"name": g.name, "slots": g.slots})).collect::<Vec<_>>(),
        "report": {
            "skipped": report.skipped_sources,
            "rejected": report.rejected.iter().map(|r| json!({"skeleton": r.skeleton, "bone": r.bone, "bonesKept": r.bones_kept})).collect::<Vec<_>>(),
            "poseConflicts": report.pose_conflicts.iter().map(|c| json!({"skeleton": c.skeleton, "bone": c.bone})).collect::<Vec<_>>(),
            "renames": report.renames.iter().map(|r| json!({"skeleton": r.skeleton, "from": r.from, "to": r.to})).collect::<Vec<_>>(),
            "attachments": attachments,
            "unreachable": report.unreachable_bones,
        },
    });

    println!(
        "{}",
        serde_json::to_string_pretty(&out).expect("serialize dump")
    );
}
