use crate::{
    BlendProfileData, BlendProfileEntry, BlendProfileMode, BoneData, ComponentKind,
    ComponentTree, CurveData, CurveMetaData, Error, MergeFlags, SceneComponent, SkeletonData,
    SlotGroupData, SocketData, Transform, VirtualBoneData,
};
use glam::{Quat, Vec3};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SkeletonDef {
    name: String,
    #[serde(default)]
    bones: Vec<BoneDef>,
    #[serde(default)]
    sockets: Vec<SocketDef>,
    #[serde(default, rename = "virtualBones")]
    virtual_bones: Vec<VirtualBoneDef>,
    #[serde(default)]
    curves: Vec<CurveDef>,
    #[serde(default, rename = "blendProfiles")]
    blend_profiles: Vec<BlendProfileDef>,
    #[serde(default, rename = "slotGroups")]
    slot_groups: Vec<SlotGroupDef>,
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct TransformDef {
    #[serde(default)]
    translation: [f32; 3],
    /// Quaternion as `[x, y, z, w]`.
    #[serde(default = "default_rotation")]
    rotation: [f32; 4],
    #[serde(default = "default_scale")]
    scale: [f32; 3],
}

impl Default for TransformDef {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: default_rotation(),
            scale: default_scale(),
        }
    }
}

impl TransformDef {
    fn to_transform(&self) -> Transform {
        let rotation = Quat::from_array(self.rotation);
        let rotation = if rotation.length_squared() > 0.0 {
            rotation.normalize()
        } else {
            Quat::IDENTITY
        };
        Transform::new(
            Vec3::from_array(self.translation),
            rotation,
            Vec3::from_array(self.scale),
        )
    }
}

#[derive(Debug, Deserialize)]
struct BoneDef {
    name: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(flatten)]
    pose: TransformDef,
}

#[derive(Debug, Deserialize)]
struct SocketDef {
    name: String,
    bone: String,
    #[serde(flatten)]
    relative: TransformDef,
    #[serde(default, rename = "forceAlwaysAnimated")]
    force_always_animated: bool,
}

#[derive(Debug, Deserialize)]
struct VirtualBoneDef {
    name: String,
    source: String,
    target: String,
}

#[derive(Debug, Deserialize)]
struct CurveDef {
    name: String,
    #[serde(default)]
    metadata: Option<CurveMetaDataDef>,
}

#[derive(Debug, Deserialize)]
struct CurveMetaDataDef {
    #[serde(default)]
    material: bool,
    #[serde(default, rename = "morphTarget")]
    morph_target: bool,
    #[serde(default, rename = "linkedBones")]
    linked_bones: Vec<String>,
    #[serde(default = "default_max_lod", rename = "maxLod")]
    max_lod: u8,
}

fn default_max_lod() -> u8 {
    u8::MAX
}

#[derive(Debug, Deserialize)]
struct BlendProfileDef {
    name: String,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    entries: Vec<BlendProfileEntryDef>,
}

#[derive(Debug, Deserialize)]
struct BlendProfileEntryDef {
    bone: String,
    #[serde(default = "default_blend_scale")]
    scale: f32,
}

fn default_blend_scale() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct SlotGroupDef {
    name: String,
    #[serde(default)]
    slots: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ComponentTreeDef {
    #[serde(default)]
    components: Vec<ComponentDef>,
}

#[derive(Debug, Deserialize)]
struct ComponentDef {
    name: String,
    #[serde(default)]
    skeleton: Option<String>,
    #[serde(default, rename = "attachTo")]
    attach_to: Option<String>,
    #[serde(default, rename = "relativeTransform")]
    relative_transform: TransformDef,
    #[serde(default)]
    children: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MergeFlagsDef {
    #[serde(default = "default_true", rename = "checkCompatibility")]
    check_compatibility: bool,
    #[serde(default = "default_true", rename = "mergeSockets")]
    merge_sockets: bool,
    #[serde(default = "default_true", rename = "mergeVirtualBones")]
    merge_virtual_bones: bool,
    #[serde(default = "default_true", rename = "mergeCurveNames")]
    merge_curve_names: bool,
    #[serde(default = "default_true", rename = "mergeBlendProfiles")]
    merge_blend_profiles: bool,
    #[serde(default = "default_true", rename = "mergeAnimSlotGroups")]
    merge_anim_slot_groups: bool,
}

fn parse<'de, T: Deserialize<'de>>(input: &'de str) -> Result<T, Error> {
    serde_json::from_str(input).map_err(|e| Error::JsonParse {
        message: e.to_string(),
    })
}

fn parse_blend_profile_mode(value: Option<&str>, profile: &str) -> Result<BlendProfileMode, Error> {
    let Some(value) = value else {
        return Ok(BlendProfileMode::default());
    };
    match value {
        "timeFactor" => Ok(BlendProfileMode::TimeFactor),
        "weightFactor" => Ok(BlendProfileMode::WeightFactor),
        "blendMask" => Ok(BlendProfileMode::BlendMask),
        other => Err(Error::JsonUnsupportedBlendProfileMode {
            profile: profile.to_string(),
            value: other.to_string(),
        }),
    }
}

impl SkeletonData {
    /// Parses a skeleton description. Bones must be listed after their parent.
    pub fn from_json_str(input: &str) -> Result<Arc<Self>, Error> {
        let def: SkeletonDef = parse(input)?;

        let mut bones = Vec::with_capacity(def.bones.len());
        let mut bone_index = HashMap::<String, usize>::new();
        for bone in def.bones {
            let parent = match bone.parent.as_deref() {
                None => None,
                Some(parent_name) => {
                    Some(bone_index.get(parent_name).copied().ok_or_else(|| {
                        Error::JsonUnknownBoneParent {
                            skeleton: def.name.clone(),
                            bone: bone.name.clone(),
                            parent: parent_name.to_string(),
                        }
                    })?)
                }
            };
            if bone_index.contains_key(&bone.name) {
                return Err(Error::JsonDuplicateBone {
                    skeleton: def.name,
                    bone: bone.name,
                });
            }

            bone_index.insert(bone.name.clone(), bones.len());
            bones.push(BoneData {
                name: bone.name,
                parent,
                pose: bone.pose.to_transform(),
            });
        }

        let sockets = def
            .sockets
            .into_iter()
            .map(|s| SocketData {
                relative: s.relative.to_transform(),
                name: s.name,
                bone: s.bone,
                force_always_animated: s.force_always_animated,
            })
            .collect();

        let virtual_bones = def
            .virtual_bones
            .into_iter()
            .map(|vb| VirtualBoneData {
                name: vb.name,
                source_bone: vb.source,
                target_bone: vb.target,
            })
            .collect();

        let curves = def
            .curves
            .into_iter()
            .map(|c| CurveData {
                name: c.name,
                metadata: c.metadata.map(|m| CurveMetaData {
                    material: m.material,
                    morph_target: m.morph_target,
                    linked_bones: m.linked_bones,
                    max_lod: m.max_lod,
                }),
            })
            .collect();

        let mut blend_profiles = Vec::with_capacity(def.blend_profiles.len());
        for profile in def.blend_profiles {
            let mode = parse_blend_profile_mode(profile.mode.as_deref(), &profile.name)?;
            blend_profiles.push(BlendProfileData {
                name: profile.name,
                mode,
                entries: profile
                    .entries
                    .into_iter()
                    .map(|e| BlendProfileEntry {
                        bone: e.bone,
                        blend_scale: e.scale,
                    })
                    .collect(),
            });
        }

        let slot_groups = def
            .slot_groups
            .into_iter()
            .map(|g| SlotGroupData {
                name: g.name,
                slots: g.slots,
            })
            .collect();

        Ok(Arc::new(Self {
            name: def.name,
            bones,
            sockets,
            virtual_bones,
            curves,
            blend_profiles,
            slot_groups,
        }))
    }
}

impl ComponentTree {
    /// Parses a component tree. Children are referenced by component name.
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let def: ComponentTreeDef = parse(input)?;

        let mut index = HashMap::<String, usize>::new();
        for (i, component) in def.components.iter().enumerate() {
            if index.insert(component.name.clone(), i).is_some() {
                return Err(Error::JsonDuplicateComponent {
                    component: component.name.clone(),
                });
            }
        }

        let mut tree = ComponentTree::new();
        let mut children = Vec::with_capacity(def.components.len());
        for component in def.components {
            let kind = match component.skeleton {
                Some(skeleton) => ComponentKind::SkeletalMesh { skeleton },
                None => ComponentKind::Scene,
            };
            let mut scene = SceneComponent::new(component.name.clone(), kind)
                .with_relative_transform(component.relative_transform.to_transform());
            scene.attach_to = component.attach_to;
            let id = tree.add_component(scene);
            children.push((id, component.name, component.children));
        }

        for (id, name, child_names) in children {
            for child in child_names {
                let child_id = *index.get(&child).ok_or_else(|| Error::JsonUnknownChildComponent {
                    component: name.clone(),
                    child: child.clone(),
                })?;
                tree.add_child(id, child_id);
            }
        }

        Ok(tree)
    }
}

impl MergeFlags {
    /// Parses merge flags; omitted flags are enabled.
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let def: MergeFlagsDef = parse(input)?;
        Ok(Self {
            check_compatibility: def.check_compatibility,
            merge_sockets: def.merge_sockets,
            merge_virtual_bones: def.merge_virtual_bones,
            merge_curve_names: def.merge_curve_names,
            merge_blend_profiles: def.merge_blend_profiles,
            merge_anim_slot_groups: def.merge_anim_slot_groups,
        })
    }
}
