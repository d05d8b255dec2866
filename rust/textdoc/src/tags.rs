//! Tags, tag builders and the tag-builder registry.
//!
//! A tag is a typed annotation attached to a term (a part-of-speech class, a named-entity
//! class, ...). Inside a compact document a tag is stored as a small integer code in the
//! vocabulary slot of its type; a [`TagBuilder`] turns the code back into a [`Tag`] and a
//! value into a code.
//!
//! Builders are looked up by type name through a [`TagBuilderRegistry`]. The registry is an
//! ordinary value handed to the document builder, the materialization view and the codec;
//! there is no process-wide registry.

use std::sync::Arc;

use ahash::AHashMap;
use textdoc_common::{Result, error::Error};

/// A domain tag: a value of a given tag type, e.g. `NE:PERSON` or `POS:NN`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    tag_type: String,
    value: String,
}

impl Tag {
    pub fn new(tag_type: impl Into<String>, value: impl Into<String>) -> Tag {
        Tag {
            tag_type: tag_type.into(),
            value: value.into(),
        }
    }

    /// The type name of the builder that produced this tag.
    pub fn tag_type(&self) -> &str {
        &self.tag_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tag_type, self.value)
    }
}

/// Converts between stored integer codes and domain tags for a single tag type.
///
/// Implementations must be pure: `build(code)` always yields an equal tag for the same
/// code. The materialization cache relies on this when two readers race on the same term.
pub trait TagBuilder: Send + Sync + 'static {
    /// The type name under which this builder is registered and stored in documents.
    fn type_name(&self) -> &str;

    /// Reconstructs the tag stored under `code`.
    ///
    /// # Errors
    /// Fails if `code` does not denote a value of this tag type.
    fn build(&self, code: u32) -> Result<Tag>;

    /// Returns the code for a tag value of this type, if the value is known.
    fn code_of(&self, value: &str) -> Option<u32>;
}

/// A tag builder over a fixed, ordered set of values; the code of a value is its position.
pub struct EnumTagBuilder {
    type_name: String,
    values: Vec<String>,
    codes: AHashMap<String, u32>,
}

impl EnumTagBuilder {
    /// Creates a builder for `type_name` over `values`.
    ///
    /// # Errors
    /// Returns an invalid argument error if `values` contains duplicates.
    pub fn new<I, S>(type_name: impl Into<String>, values: I) -> Result<EnumTagBuilder>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let type_name = type_name.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let mut codes = AHashMap::with_capacity(values.len());
        for (code, value) in values.iter().enumerate() {
            if codes.insert(value.clone(), code as u32).is_some() {
                return Err(Error::invalid_arg(
                    "values",
                    format!("duplicate value '{value}' in tag type '{type_name}'"),
                ));
            }
        }
        Ok(EnumTagBuilder {
            type_name,
            values,
            codes,
        })
    }

    /// Returns the values of this tag type in code order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl TagBuilder for EnumTagBuilder {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn build(&self, code: u32) -> Result<Tag> {
        let value = self.values.get(code as usize).ok_or_else(|| {
            Error::corrupt_document(
                format!("{} tag code", self.type_name),
                format!("code {code} is out of range (len {})", self.values.len()),
            )
        })?;
        Ok(Tag::new(self.type_name.clone(), value.clone()))
    }

    fn code_of(&self, value: &str) -> Option<u32> {
        self.codes.get(value).copied()
    }
}

/// Penn Treebank part-of-speech tags.
pub const PART_OF_SPEECH_TAGS: &[&str] = &[
    "UNKNOWN", "CC", "CD", "DT", "EX", "FW", "IN", "JJ", "JJR", "JJS", "LS", "MD", "NN", "NNS",
    "NNP", "NNPS", "PDT", "POS", "PRP", "PRP$", "RB", "RBR", "RBS", "RP", "SYM", "TO", "UH",
    "VB", "VBD", "VBG", "VBN", "VBP", "VBZ", "WDT", "WP", "WP$", "WRB", "#", "$", ".", ",",
    ":", "(", ")", "\"", "'", "``", "''",
];

/// Named-entity classes.
pub const NAMED_ENTITY_TAGS: &[&str] = &[
    "UNKNOWN",
    "PERSON",
    "ORGANIZATION",
    "LOCATION",
    "DATE",
    "TIME",
    "MONEY",
    "PERCENT",
];

/// Maps tag type names to their builders.
#[derive(Clone, Default)]
pub struct TagBuilderRegistry {
    builders: AHashMap<String, Arc<dyn TagBuilder>>,
}

impl TagBuilderRegistry {
    /// Creates an empty registry.
    pub fn new() -> TagBuilderRegistry {
        Default::default()
    }

    /// Creates a registry holding the `"POS"` (Penn Treebank) and `"NE"` (named-entity)
    /// tag types.
    pub fn standard() -> TagBuilderRegistry {
        let mut registry = TagBuilderRegistry::new();
        for (name, values) in [("POS", PART_OF_SPEECH_TAGS), ("NE", NAMED_ENTITY_TAGS)] {
            let builder = EnumTagBuilder::new(name, values.iter().copied())
                .expect("standard tag sets have no duplicates");
            registry.register(builder);
        }
        registry
    }

    /// Registers a tag builder under its type name, replacing any builder previously
    /// registered under the same name.
    pub fn register(&mut self, builder: impl TagBuilder) -> &mut Self {
        self.register_shared(Arc::new(builder))
    }

    /// Registers an already shared tag builder under its type name.
    pub fn register_shared(&mut self, builder: Arc<dyn TagBuilder>) -> &mut Self {
        let name = builder.type_name().to_string();
        if self.builders.insert(name.clone(), builder).is_some() {
            log::debug!("replaced tag builder '{name}'");
        }
        self
    }

    /// Retrieves the builder registered under `type_name`.
    ///
    /// # Errors
    /// Returns an unknown tag type error if nothing is registered under that name.
    pub fn resolve(&self, type_name: &str) -> Result<Arc<dyn TagBuilder>> {
        self.builders
            .get(type_name)
            .cloned()
            .ok_or_else(|| Error::unknown_tag_type(type_name))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.builders.contains_key(type_name)
    }

    /// Returns the registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for TagBuilderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagBuilderRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
