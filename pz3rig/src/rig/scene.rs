use super::armature::Armature;
use crate::{Attribute, Container, Document, Error, Value};
use std::collections::HashMap;

/// Index over the figures and actor definitions of a parsed file.
///
/// A `.pz3` scene may hold several figures whose actors only differ by their `:<n>`
/// suffix, so armatures built here take the figure's root and `addChild` children by
/// full reference name instead of every actor in the file.
#[derive(Clone, Debug)]
pub struct Scene<'a> {
    figures: Vec<(String, &'a Container)>,
    actors: HashMap<&'a str, &'a Attribute>,
}

impl<'a> Scene<'a> {
    pub fn new(document: &'a Document) -> Result<Self, Error> {
        let mut figures = Vec::new();
        let mut actors = HashMap::new();
        for object in &document.objects {
            for figure in object.all_attributes("figure") {
                let Some(block) = figure.child() else {
                    continue;
                };
                let name = if block.contains("name") {
                    joined_args(block.unique_attribute("name")?)
                } else {
                    format!("figure {}", figures.len() + 1)
                };
                figures.push((name, block));
            }
            for actor in object.all_attributes("actor") {
                if actor.contains("name") {
                    actors.insert(actor.text(0)?, actor);
                }
            }
        }
        Ok(Self { figures, actors })
    }

    pub fn figure_names(&self) -> impl Iterator<Item = &str> {
        self.figures.iter().map(|(name, _)| name.as_str())
    }

    pub fn figure(&self, name: &str) -> Option<&'a Container> {
        self.figures
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, block)| block)
    }

    /// Actor definition by full reference name (`lShldr:1`).
    pub fn actor(&self, ref_name: &str) -> Option<&'a Attribute> {
        self.actors.get(ref_name).copied()
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Builds the armature of the named figure from its root and `addChild` children.
    pub fn armature(&self, figure_name: &str) -> Result<Armature, Error> {
        let figure = self.figure(figure_name).ok_or_else(|| Error::UnknownFigure {
            name: figure_name.to_string(),
        })?;

        let mut members: Vec<&str> = Vec::new();
        if figure.contains("root") {
            members.push(figure.unique_attribute("root")?.text(0)?);
        }
        for add_child in figure.all_attributes("addChild") {
            if let Some(child) = add_child.arg(0).and_then(Value::as_str) {
                if !members.contains(&child) {
                    members.push(child);
                }
            }
        }
        let actors = members.into_iter().filter_map(|name| self.actor(name));
        Armature::build(figure, actors)
    }
}

fn joined_args(attribute: &Attribute) -> String {
    attribute
        .args
        .iter()
        .filter_map(|v| match v {
            Value::Number(n) => Some(n.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Object(_) => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}
