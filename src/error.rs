//! Error types shared by the resolver, the attribute model and the entry schema.

use thiserror::Error;

/// Failures raised while resolving placeholder tokens in a compiled document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
  /// A token references an image path that was never registered in the table.
  #[error("no image record registered for '{source_path}' (token at byte {offset})")]
  MissingImageRecord {
    /// Path captured from the token payload.
    source_path: String,
    /// Byte offset of the token within the input document.
    offset: usize,
  },

  /// The marker attribute name cannot be used to delimit tokens.
  #[error("invalid placeholder marker '{0}'")]
  InvalidMarker(String),
}

impl ResolveError {
  /// Source path of the missing record, when this is a lookup failure.
  pub fn source_path(&self) -> Option<&str> {
    match self {
      Self::MissingImageRecord { source_path, .. } => Some(source_path),
      Self::InvalidMarker(_) => None,
    }
  }
}

/// Failures raised while building image records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
  /// Attribute names must be serializable as a bare HTML attribute name.
  #[error("invalid attribute name '{name}' on image '{source_path}'")]
  InvalidAttributeName {
    /// Image the attribute was attached to.
    source_path: String,
    /// Offending attribute name.
    name: String,
  },

  /// Numeric attributes must be finite to serialize as HTML.
  #[error("attribute '{name}' on image '{source_path}' is not a finite number")]
  NonFiniteValue {
    /// Image the attribute was attached to.
    source_path: String,
    /// Attribute carrying the value.
    name: String,
  },
}

/// Frontmatter failures for a content entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntrySchemaError {
  /// The entry has no frontmatter block at all.
  #[error("entry has no frontmatter")]
  MissingFrontmatter,

  /// A required field is absent.
  #[error("missing required field `{0}`")]
  MissingField(&'static str),

  /// A required field is present but not a string.
  #[error("field `{field}` must be a string, found {found}")]
  InvalidFieldType {
    /// Name of the field.
    field: &'static str,
    /// YAML kind that was found instead.
    found: &'static str,
  },

  /// The frontmatter block could not be parsed as YAML.
  #[error("failed to parse frontmatter: {0}")]
  Parse(String),
}
