use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;

/// A typed, named reference extracted from article text.
///
/// Entities are values: two entities are equal when their type, name and
/// links (in order) are equal. Fields are read-only once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "EntityDocument")]
pub struct Entity {
    #[serde(rename = "type")]
    entity_type: String,
    name: String,
    links: Vec<String>,
}

/// Wire shape of an entity. Missing or null fields read as empty values.
#[derive(Deserialize)]
struct EntityDocument {
    #[serde(rename = "type", default)]
    entity_type: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    links: Option<Vec<String>>,
}

impl From<EntityDocument> for Entity {
    fn from(doc: EntityDocument) -> Self {
        Self {
            entity_type: doc.entity_type.unwrap_or_default(),
            name: doc.name.unwrap_or_default(),
            links: doc.links.unwrap_or_default(),
        }
    }
}

impl Entity {
    pub fn new(
        entity_type: impl Into<String>,
        name: impl Into<String>,
        links: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            name: name.into(),
            links: links.into_iter().map(Into::into).collect(),
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    /// Field-by-field identity used by [`EntityCollection::remove_duplicates`].
    fn canonical_key(&self) -> (&str, &str, &[String]) {
        (&self.entity_type, &self.name, &self.links)
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entity(type={}, name={}, links={:?})",
            self.entity_type, self.name, self.links
        )
    }
}

/// Ordered collection of entities without structural duplicates.
///
/// Insertion goes through [`EntityCollection::add`], which skips values that
/// are already present. A persisted document is read verbatim, so a
/// collection loaded from disk may hold duplicates until
/// [`EntityCollection::remove_duplicates`] runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityCollection {
    entities: Vec<Entity>,
}

impl EntityCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entity` unless an equal one is already present.
    /// Returns whether the entity was inserted.
    pub fn add(&mut self, entity: Entity) -> bool {
        if self.entities.contains(&entity) {
            return false;
        }
        self.entities.push(entity);
        true
    }

    pub fn get_by_type(&self, entity_type: &str) -> Vec<&Entity> {
        self.entities
            .iter()
            .filter(|e| e.entity_type == entity_type)
            .collect()
    }

    /// Distinct entity types present in the collection.
    pub fn types(&self) -> BTreeSet<&str> {
        self.entities.iter().map(|e| e.entity_type()).collect()
    }

    /// Collapses structurally equal entities, keeping the first of each in
    /// its original position.
    pub fn remove_duplicates(&mut self) {
        let before = self.entities.len();
        let keep: Vec<bool> = {
            let mut seen = HashSet::with_capacity(before);
            self.entities
                .iter()
                .map(|e| seen.insert(e.canonical_key()))
                .collect()
        };
        let mut keep = keep.into_iter();
        self.entities.retain(|_| keep.next().unwrap_or(true));

        if self.entities.len() != before {
            debug!(
                "Removed {} duplicate entities ({} remain)",
                before - self.entities.len(),
                self.entities.len()
            );
        }
    }

    /// Appends every entity of `other` and canonicalizes the result.
    pub fn merge(&mut self, other: EntityCollection) {
        self.entities.extend(other.entities);
        self.remove_duplicates();
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FromIterator<Entity> for EntityCollection {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.extend(iter);
        collection
    }
}

impl Extend<Entity> for EntityCollection {
    fn extend<I: IntoIterator<Item = Entity>>(&mut self, iter: I) {
        for entity in iter {
            self.add(entity);
        }
    }
}

impl IntoIterator for EntityCollection {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl<'a> IntoIterator for &'a EntityCollection {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
