use super::bone::{Bone, strip_suffix};
use crate::{Attribute, Container, Document, Error};
use std::collections::HashMap;

/// The bones of one figure and their hierarchy.
#[derive(Clone, Debug)]
pub struct Armature {
    bones: Vec<Bone>,
    index: HashMap<String, usize>,
    root: Option<usize>,
}

impl Armature {
    /// Builds the armature of the first object in `document` that has a `figure` block.
    pub fn from_document(document: &Document) -> Result<Self, Error> {
        let object = document
            .objects
            .iter()
            .find(|o| o.contains("figure"))
            .ok_or_else(|| Error::MissingKey {
                key: "figure".to_string(),
            })?;
        Self::from_object(object)
    }

    /// Builds the armature from a parsed top-level object holding the `actor` blocks and
    /// exactly one `figure` block.
    pub fn from_object(object: &Container) -> Result<Self, Error> {
        let figure_attr = object.unique_attribute("figure")?;
        let figure = figure_attr.child().ok_or_else(|| Error::MissingChild {
            key: figure_attr.key.clone(),
        })?;
        // Actors are declared once without a body and defined later with one; only the
        // definitions carry a `name`.
        let actors = object.all_attributes("actor").filter(|a| a.contains("name"));
        Self::build(figure, actors)
    }

    pub(crate) fn build<'a>(
        figure: &Container,
        actors: impl IntoIterator<Item = &'a Attribute>,
    ) -> Result<Self, Error> {
        let bones = actors
            .into_iter()
            .map(Bone::from_actor)
            .collect::<Result<Vec<_>, _>>()?;

        let mut links = Vec::new();
        for add_child in figure.all_attributes("addChild") {
            match (
                add_child.arg(0).and_then(|v| v.as_str()),
                add_child.arg(1).and_then(|v| v.as_str()),
            ) {
                (Some(child), Some(parent)) => links.push((child, parent)),
                _ => log::debug!("skipping malformed addChild: {:?}", add_child.args),
            }
        }

        let root = if figure.contains("root") {
            Some(figure.unique_attribute("root")?.text(0)?)
        } else {
            None
        };

        Self::from_bones(bones, &links, root)
    }

    /// Links `bones` with `(child, parent)` pairs as found in `addChild` statements.
    ///
    /// Pairs naming anything that is not one of `bones` are skipped. Bones that never
    /// appear as a child fall back to their declared `parent_id`.
    pub fn from_bones(
        bones: Vec<Bone>,
        links: &[(&str, &str)],
        root: Option<&str>,
    ) -> Result<Self, Error> {
        let mut index = HashMap::with_capacity(bones.len());
        for (i, bone) in bones.iter().enumerate() {
            if index.insert(bone.id.clone(), i).is_some() {
                return Err(Error::DuplicateBone {
                    id: bone.id.clone(),
                });
            }
        }

        let mut armature = Self {
            bones,
            index,
            root: None,
        };
        let mut linked = vec![false; armature.bones.len()];

        for &(child, parent) in links {
            let child_id = strip_suffix(child);
            let parent_id = strip_suffix(parent);
            let (Some(c), Some(p)) = (armature.index_of(child_id), armature.index_of(parent_id))
            else {
                log::debug!("skipping addChild {child} {parent}: not a bone");
                continue;
            };
            if c == p {
                log::debug!("skipping addChild {child} {parent}: bone added to itself");
                continue;
            }
            match armature.bones[c].parent {
                None => armature.link(c, p),
                Some(existing) if existing == p => {}
                Some(existing) => {
                    return Err(Error::ConflictingParent {
                        bone: child_id.to_string(),
                        first: armature.bones[existing].id.clone(),
                        second: parent_id.to_string(),
                    });
                }
            }
            linked[c] = true;
        }

        for c in 0..armature.bones.len() {
            if linked[c] {
                continue;
            }
            let Some(p) = armature.bones[c]
                .parent_id
                .as_deref()
                .and_then(|id| armature.index_of(id))
            else {
                continue;
            };
            if p != c {
                log::debug!(
                    "bone '{}' has no addChild, using declared parent '{}'",
                    armature.bones[c].id,
                    armature.bones[p].id
                );
                armature.link(c, p);
            }
        }

        if let Some(root) = root {
            let id = strip_suffix(root);
            armature.root = Some(armature.index_of(id).ok_or_else(|| Error::UnknownBone {
                id: id.to_string(),
            })?);
        }

        log::debug!(
            "armature with {} bones, root {:?}",
            armature.bones.len(),
            armature.root().map(|b| b.id.as_str())
        );
        Ok(armature)
    }

    fn link(&mut self, child: usize, parent: usize) {
        self.bones[child].parent = Some(parent);
        self.bones[parent].children.push(child);
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Looks a bone up by id; a `:<digits>` suffix is ignored.
    pub fn bone(&self, id: &str) -> Option<&Bone> {
        self.index_of(strip_suffix(id)).map(|i| &self.bones[i])
    }

    pub fn bone_at(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// The figure's designated root bone.
    pub fn root(&self) -> Option<&Bone> {
        self.root.map(|i| &self.bones[i])
    }

    pub fn root_index(&self) -> Option<usize> {
        self.root
    }

    pub fn parent(&self, bone: &Bone) -> Option<&Bone> {
        bone.parent.map(|i| &self.bones[i])
    }

    /// Children of the bone with id `parent`, in link order. With `None`, the bones that
    /// have no parent among this armature's bones.
    pub fn children_of(&self, parent: Option<&str>) -> Vec<&Bone> {
        match parent {
            None => self.bones.iter().filter(|b| b.parent.is_none()).collect(),
            Some(id) => self
                .bone(id)
                .map(|b| b.children.iter().map(|&i| &self.bones[i]).collect())
                .unwrap_or_default(),
        }
    }

    /// Bone indices with every parent before its children.
    pub fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.bones.len());
        let mut stack: Vec<usize> = (0..self.bones.len())
            .filter(|&i| self.bones[i].parent.is_none())
            .rev()
            .collect();
        while let Some(i) = stack.pop() {
            order.push(i);
            stack.extend(self.bones[i].children.iter().rev().copied());
        }
        order
    }
}
