use crate::{Error, PathKey, Transform};
use std::collections::HashMap;

#[derive(Clone, Debug)]
struct MergedBone {
    name: String,
    path: PathKey,
    parent_path: PathKey,
    pose: Transform,
}

/// Result of inserting a bone into a [`MergedBoneHierarchy`].
#[derive(Clone, Debug, PartialEq)]
pub enum AddBoneOutcome {
    /// First bone seen at this path.
    Inserted { path: PathKey },
    /// A bone already sat at this path; its pose was overwritten.
    Merged {
        path: PathKey,
        name: String,
        previous_pose: Transform,
    },
    /// The requested name was taken by a bone at a different path, so the bone was inserted
    /// under `name` instead.
    Renamed { path: PathKey, name: String },
}

impl AddBoneOutcome {
    pub fn path(&self) -> PathKey {
        match self {
            Self::Inserted { path } | Self::Merged { path, .. } | Self::Renamed { path, .. } => {
                *path
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PopulatedBone {
    pub name: String,
    pub parent: Option<usize>,
    pub pose: Transform,
    pub path: PathKey,
}

/// Root-first flattened hierarchy produced by [`MergedBoneHierarchy::populate`].
#[derive(Clone, Debug, Default)]
pub struct PopulatedHierarchy {
    pub bones: Vec<PopulatedBone>,
    /// Bones whose parent path never received a bone; they are left out of `bones`.
    pub unreachable: Vec<String>,
}

/// Bones from every source, keyed by structural path.
///
/// Children of a path keep the order they were first inserted in, so populating the same
/// inputs always yields the same bone order.
#[derive(Clone, Debug, Default)]
pub struct MergedBoneHierarchy {
    bones: Vec<MergedBone>,
    by_path: HashMap<PathKey, usize>,
    by_name: HashMap<String, usize>,
    children: HashMap<PathKey, Vec<usize>>,
}

impl MergedBoneHierarchy {
    pub fn with_capacity(expected_bones: usize) -> Self {
        Self {
            bones: Vec::with_capacity(expected_bones),
            by_path: HashMap::with_capacity(expected_bones),
            by_name: HashMap::with_capacity(expected_bones),
            children: HashMap::with_capacity(expected_bones),
        }
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Path recorded for the bone emitted as `name`.
    pub fn path_of(&self, name: &str) -> Option<PathKey> {
        self.by_name.get(name).map(|&i| self.bones[i].path)
    }

    pub fn contains_path(&self, path: PathKey) -> bool {
        self.by_path.contains_key(&path)
    }

    pub fn name_at(&self, path: PathKey) -> Option<&str> {
        self.by_path.get(&path).map(|&i| self.bones[i].name.as_str())
    }

    pub fn pose_at(&self, path: PathKey) -> Option<Transform> {
        self.by_path.get(&path).map(|&i| self.bones[i].pose)
    }

    /// Rest pose of the bone at `path` composed up through its recorded ancestors.
    pub fn component_space_pose(&self, path: PathKey) -> Option<Transform> {
        let mut bone = &self.bones[*self.by_path.get(&path)?];
        let mut pose = bone.pose;
        for _ in 0..self.bones.len() {
            let Some(&parent) = self.by_path.get(&bone.parent_path) else {
                return Some(pose);
            };
            bone = &self.bones[parent];
            pose = bone.pose.mul_transform(&pose);
        }
        None
    }

    /// Inserts `name` under the bone keyed `parent_path`.
    ///
    /// A bone already at the resulting path gets its pose overwritten. A different bone
    /// already using `name` forces a rename to `<name>_<source>`.
    pub fn add_bone(
        &mut self,
        name: &str,
        pose: Transform,
        parent_path: PathKey,
        source: &str,
    ) -> AddBoneOutcome {
        let path = parent_path.child(name);

        if let Some(&index) = self.by_path.get(&path) {
            let bone = &mut self.bones[index];
            let previous_pose = std::mem::replace(&mut bone.pose, pose);
            return AddBoneOutcome::Merged {
                path,
                name: bone.name.clone(),
                previous_pose,
            };
        }

        let renamed = self.by_name.contains_key(name);
        let emitted_name = if renamed {
            self.unique_name(name, source)
        } else {
            name.to_string()
        };

        let index = self.bones.len();
        self.bones.push(MergedBone {
            name: emitted_name.clone(),
            path,
            parent_path,
            pose,
        });
        self.by_path.insert(path, index);
        self.by_name.insert(emitted_name.clone(), index);
        self.children.entry(parent_path).or_default().push(index);

        if renamed {
            AddBoneOutcome::Renamed {
                path,
                name: emitted_name,
            }
        } else {
            AddBoneOutcome::Inserted { path }
        }
    }

    fn unique_name(&self, name: &str, source: &str) -> String {
        let base = format!("{name}_{source}");
        if !self.by_name.contains_key(&base) {
            return base;
        }
        let mut n = 1usize;
        loop {
            let candidate = format!("{base}_{n}");
            if !self.by_name.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Flattens the hierarchy root-first: every bone follows its parent, siblings keep
    /// insertion order.
    ///
    /// Exactly one bone may hang off [`PathKey::root_parent`].
    pub fn populate(&self) -> Result<PopulatedHierarchy, Error> {
        let roots = self
            .children
            .get(&PathKey::root_parent())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let root = match roots {
            [] => return Err(Error::NoRoot),
            [root] => *root,
            _ => {
                return Err(Error::AmbiguousRoot {
                    roots: roots.iter().map(|&i| self.bones[i].name.clone()).collect(),
                });
            }
        };

        let mut out = Vec::with_capacity(self.bones.len());
        let mut emitted = vec![false; self.bones.len()];
        let mut stack: Vec<(usize, Option<usize>)> = vec![(root, None)];
        while let Some((index, parent)) = stack.pop() {
            if emitted[index] {
                continue;
            }
            emitted[index] = true;

            let bone = &self.bones[index];
            let out_index = out.len();
            out.push(PopulatedBone {
                name: bone.name.clone(),
                parent,
                pose: bone.pose,
                path: bone.path,
            });

            if let Some(children) = self.children.get(&bone.path) {
                stack.extend(children.iter().rev().map(|&c| (c, Some(out_index))));
            }
        }

        let unreachable = self
            .bones
            .iter()
            .zip(&emitted)
            .filter(|(_, emitted)| !**emitted)
            .map(|(bone, _)| bone.name.clone())
            .collect();

        Ok(PopulatedHierarchy {
            bones: out,
            unreachable,
        })
    }
}
