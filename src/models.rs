//! Data structures passed between the image step, the resolver and the collection builder.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ModelError;

fn attribute_name_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"^[^\s\x00-\x1F\x7F"'>/=]+$"#).expect("invalid attribute name regex")
  })
}

/// Determine whether `name` can be emitted as a bare HTML attribute name.
pub fn is_valid_attribute_name(name: &str) -> bool {
  attribute_name_pattern().is_match(name)
}

/// Value of a single image attribute.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
  /// Boolean attribute; `true` renders the bare name, `false` omits it.
  Flag(bool),
  /// Integral value such as `width` or `height`.
  Integer(i64),
  /// Fractional value.
  Float(f64),
  /// Free-form text such as a resolved URL.
  Text(String),
}

impl fmt::Display for AttributeValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Flag(value) => write!(f, "{value}"),
      Self::Integer(value) => write!(f, "{value}"),
      Self::Float(value) => write!(f, "{value}"),
      Self::Text(value) => f.write_str(value),
    }
  }
}

impl From<&str> for AttributeValue {
  fn from(value: &str) -> Self {
    Self::Text(value.to_string())
  }
}

impl From<String> for AttributeValue {
  fn from(value: String) -> Self {
    Self::Text(value)
  }
}

impl From<i64> for AttributeValue {
  fn from(value: i64) -> Self {
    Self::Integer(value)
  }
}

impl From<u32> for AttributeValue {
  fn from(value: u32) -> Self {
    Self::Integer(i64::from(value))
  }
}

impl From<f64> for AttributeValue {
  fn from(value: f64) -> Self {
    Self::Float(value)
  }
}

impl From<bool> for AttributeValue {
  fn from(value: bool) -> Self {
    Self::Flag(value)
  }
}

/// Attribute list that keeps insertion order.
///
/// Setting a name that is already present replaces the value in place, so the attribute keeps
/// the position it was first inserted at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
  entries: Vec<(String, AttributeValue)>,
}

impl Attributes {
  /// Create an empty attribute list.
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert or replace an attribute, returning the previous value.
  pub fn set(
    &mut self,
    name: impl Into<String>,
    value: impl Into<AttributeValue>,
  ) -> Option<AttributeValue> {
    let name = name.into();
    let value = value.into();
    match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
      Some((_, slot)) => Some(std::mem::replace(slot, value)),
      None => {
        self.entries.push((name, value));
        None
      }
    }
  }

  /// Look up an attribute by name.
  pub fn get(&self, name: &str) -> Option<&AttributeValue> {
    self
      .entries
      .iter()
      .find(|(existing, _)| existing == name)
      .map(|(_, value)| value)
  }

  /// Iterate over the attributes in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
    self
      .entries
      .iter()
      .map(|(name, value)| (name.as_str(), value))
  }

  /// Number of attributes.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when no attributes are set.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl<N, V> FromIterator<(N, V)> for Attributes
where
  N: Into<String>,
  V: Into<AttributeValue>,
{
  fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
    let mut attributes = Self::new();
    for (name, value) in iter {
      attributes.set(name, value);
    }
    attributes
  }
}

impl Serialize for Attributes {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (name, value) in &self.entries {
      map.serialize_entry(name, value)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for Attributes {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct AttributesVisitor;

    impl<'de> Visitor<'de> for AttributesVisitor {
      type Value = Attributes;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of attribute names to strings, numbers or booleans")
      }

      fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Attributes, A::Error> {
        let mut attributes = Attributes::new();
        while let Some((name, value)) = access.next_entry::<String, AttributeValue>()? {
          attributes.set(name, value);
        }
        Ok(attributes)
      }
    }

    deserializer.deserialize_map(AttributesVisitor)
  }
}

/// Final attributes for one authored image reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
  source_path: String,
  attributes: Attributes,
}

impl ImageRecord {
  /// Create a record whose first attribute is the resolved `src`.
  pub fn new(source_path: impl Into<String>, src: impl Into<String>) -> Self {
    let src: String = src.into();
    let mut attributes = Attributes::new();
    attributes.set("src", src);
    Self {
      source_path: source_path.into(),
      attributes,
    }
  }

  /// Create a record from a prepared attribute list, validating every name and number.
  pub fn from_attributes(
    source_path: impl Into<String>,
    attributes: Attributes,
  ) -> Result<Self, ModelError> {
    let source_path = source_path.into();
    for (name, value) in attributes.iter() {
      check_attribute(&source_path, name, value)?;
    }

    Ok(Self {
      source_path,
      attributes,
    })
  }

  /// Builder-style attribute setter used by the image step.
  pub fn with_attribute(
    mut self,
    name: impl Into<String>,
    value: impl Into<AttributeValue>,
  ) -> Result<Self, ModelError> {
    let name = name.into();
    let value = value.into();
    check_attribute(&self.source_path, &name, &value)?;
    self.attributes.set(name, value);
    Ok(self)
  }

  /// Path of the image as authored in the document.
  pub fn source_path(&self) -> &str {
    &self.source_path
  }

  /// Attributes in serialization order.
  pub fn attributes(&self) -> &Attributes {
    &self.attributes
  }
}

fn check_attribute(source_path: &str, name: &str, value: &AttributeValue) -> Result<(), ModelError> {
  if !is_valid_attribute_name(name) {
    return Err(ModelError::InvalidAttributeName {
      source_path: source_path.to_string(),
      name: name.to_string(),
    });
  }
  if matches!(value, AttributeValue::Float(number) if !number.is_finite()) {
    return Err(ModelError::NonFiniteValue {
      source_path: source_path.to_string(),
      name: name.to_string(),
    });
  }
  Ok(())
}

/// Per-document lookup from authored image path to its final attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageTable {
  records: BTreeMap<String, ImageRecord>,
}

impl ImageTable {
  /// Create an empty table.
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a record under its source path, returning any record it replaced.
  pub fn register(&mut self, record: ImageRecord) -> Option<ImageRecord> {
    let previous = self.records.insert(record.source_path.clone(), record);
    if let Some(previous) = &previous {
      log::debug!("replaced image record for '{}'", previous.source_path);
    }
    previous
  }

  /// Exact-string lookup.
  pub fn get(&self, source_path: &str) -> Option<&ImageRecord> {
    self.records.get(source_path)
  }

  /// Returns `true` when a record exists for the path.
  pub fn contains(&self, source_path: &str) -> bool {
    self.records.contains_key(source_path)
  }

  /// Number of registered records.
  pub fn len(&self) -> usize {
    self.records.len()
  }

  /// Returns `true` when nothing has been registered.
  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Registered source paths, sorted.
  pub fn source_paths(&self) -> impl Iterator<Item = &str> {
    self.records.keys().map(String::as_str)
  }
}

impl FromIterator<ImageRecord> for ImageTable {
  fn from_iter<I: IntoIterator<Item = ImageRecord>>(iter: I) -> Self {
    let mut table = Self::new();
    for record in iter {
      table.register(record);
    }
    table
  }
}

/// Frontmatter every collection entry must carry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntryFrontmatter {
  /// Entry title.
  pub title: String,
  /// Short description shown in listings.
  pub description: String,
  /// Thumbnail image URL or path.
  pub thumbnail: String,
  /// Keys outside the schema, such as `contributors`, kept as authored.
  #[serde(flatten)]
  pub extra: BTreeMap<String, serde_json::Value>,
}

/// Section heading found in a compiled body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Heading {
  /// Heading level, 1 through 6.
  pub depth: u8,
  /// Anchor id assigned by the markdown compiler.
  pub slug: String,
  /// Plain text content.
  pub text: String,
}

/// Entry after frontmatter validation and image resolution.
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
  /// Stable identifier derived from the file stem.
  pub id: String,
  /// Validated frontmatter.
  pub frontmatter: EntryFrontmatter,
  /// Compiled body with every placeholder resolved.
  pub html: String,
  /// Headings in document order.
  pub headings: Vec<Heading>,
  /// Number of placeholder tokens that were replaced.
  pub image_count: usize,
  /// File the entry was read from, relative to the collection directory.
  pub source: String,
}

/// Serializable listing record for a resolved entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
  /// Entry identifier.
  pub id: String,
  /// Entry title.
  pub title: String,
  /// Entry description.
  pub description: String,
  /// Entry thumbnail.
  pub thumbnail: String,
  /// Source file relative to the collection directory.
  pub source: String,
  /// Number of images resolved in the entry.
  pub image_count: usize,
  /// Entry headings.
  #[serde(default)]
  pub headings: Vec<Heading>,
  /// Additional frontmatter keys.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub extra: BTreeMap<String, serde_json::Value>,
}

impl From<&ResolvedEntry> for CatalogRecord {
  fn from(entry: &ResolvedEntry) -> Self {
    Self {
      id: entry.id.clone(),
      title: entry.frontmatter.title.clone(),
      description: entry.frontmatter.description.clone(),
      thumbnail: entry.frontmatter.thumbnail.clone(),
      source: entry.source.clone(),
      image_count: entry.image_count,
      headings: entry.headings.clone(),
      extra: entry.frontmatter.extra.clone(),
    }
  }
}
