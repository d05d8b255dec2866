use std::sync::Arc;

use textdoc_common::{Result, error::Error};

use crate::tags::{TagBuilder, TagBuilderRegistry};

/// Ordered list of tag type names used by a document.
///
/// Position `i` in the vocabulary is "slot `i`": every compact term stores its tag codes
/// per slot, and the slot's type name selects the tag builder that decodes them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagVocabulary {
    type_names: Vec<String>,
}

impl TagVocabulary {
    pub fn new() -> TagVocabulary {
        Default::default()
    }

    /// Builds a vocabulary from type names in slot order.
    ///
    /// # Errors
    /// Fails with a corrupt document error if a type name repeats.
    pub fn from_type_names<I, S>(type_names: I) -> Result<TagVocabulary>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocabulary = TagVocabulary::new();
        for name in type_names {
            let name = name.into();
            if vocabulary.slot_of(&name).is_some() {
                return Err(Error::corrupt_document(
                    "tag vocabulary",
                    format!("duplicate tag type '{name}'"),
                ));
            }
            vocabulary.type_names.push(name);
        }
        Ok(vocabulary)
    }

    /// Returns the slot of `type_name`, adding it if it is not present yet.
    pub(crate) fn slot_or_insert(&mut self, type_name: &str) -> usize {
        match self.slot_of(type_name) {
            Some(slot) => slot,
            None => {
                self.type_names.push(type_name.to_string());
                self.type_names.len() - 1
            }
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.type_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.type_names.is_empty()
    }

    pub fn slot_of(&self, type_name: &str) -> Option<usize> {
        self.type_names.iter().position(|n| n == type_name)
    }

    pub fn get(&self, slot: usize) -> Option<&str> {
        self.type_names.get(slot).map(String::as_str)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.type_names.iter().map(String::as_str)
    }

    /// Resolves the builder of every slot, in slot order.
    ///
    /// # Errors
    /// Returns an unknown tag type error naming the first unregistered type.
    pub fn resolve(&self, registry: &TagBuilderRegistry) -> Result<Vec<Arc<dyn TagBuilder>>> {
        self.iter().map(|name| registry.resolve(name)).collect()
    }
}
