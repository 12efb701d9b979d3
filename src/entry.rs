//! Frontmatter extraction and schema validation for collection entries.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gray_matter::{Matter, engine::YAML};
use serde_yaml::{Mapping, Value};

use crate::error::EntrySchemaError;
use crate::models::EntryFrontmatter;

/// Fields every entry must provide as strings.
pub const REQUIRED_FIELDS: [&str; 3] = ["title", "description", "thumbnail"];

const FENCE: &str = "---";

/// Validate parsed frontmatter against the collection schema.
///
/// Keys outside the schema are carried over into [`EntryFrontmatter::extra`].
pub fn validate_frontmatter(data: &Value) -> Result<EntryFrontmatter, EntrySchemaError> {
  let Some(mapping) = data.as_mapping() else {
    return Err(EntrySchemaError::Parse(format!(
      "frontmatter must be a mapping, found {}",
      yaml_kind(data)
    )));
  };

  let [title, description, thumbnail] = REQUIRED_FIELDS.map(|field| required_string(data, field));

  Ok(EntryFrontmatter {
    title: title?,
    description: description?,
    thumbnail: thumbnail?,
    extra: extra_fields(mapping)?,
  })
}

fn extra_fields(
  mapping: &Mapping,
) -> Result<BTreeMap<String, serde_json::Value>, EntrySchemaError> {
  let mut extra = BTreeMap::new();
  for (key, value) in mapping {
    let Some(key) = key.as_str() else {
      return Err(EntrySchemaError::Parse(format!(
        "frontmatter keys must be strings, found {}",
        yaml_kind(key)
      )));
    };
    if REQUIRED_FIELDS.contains(&key) {
      continue;
    }

    let value = serde_json::to_value(value)
      .map_err(|err| EntrySchemaError::Parse(format!("field `{key}`: {err}")))?;
    extra.insert(key.to_string(), value);
  }
  Ok(extra)
}

fn required_string(data: &Value, field: &'static str) -> Result<String, EntrySchemaError> {
  match data.get(field) {
    None => Err(EntrySchemaError::MissingField(field)),
    Some(Value::String(value)) => Ok(value.clone()),
    Some(other) => Err(EntrySchemaError::InvalidFieldType {
      field,
      found: yaml_kind(other),
    }),
  }
}

fn yaml_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Sequence(_) => "sequence",
    Value::Mapping(_) => "mapping",
    Value::Tagged(_) => "tagged value",
  }
}

/// Byte offset where the body starts, just past the closing fence line and its line ending.
fn body_offset(content: &str) -> Option<usize> {
  let mut lines = content.split_inclusive('\n');
  let opening = lines.next()?;
  if opening.trim_end() != FENCE || !opening.ends_with('\n') {
    return None;
  }

  let mut offset = opening.len();
  for line in lines {
    offset += line.len();
    if line.trim_end() == FENCE {
      return Some(offset);
    }
  }
  None
}

/// Split an entry into validated frontmatter and its compiled body.
///
/// The body is returned byte for byte as it follows the closing `---` line.
pub fn parse_entry_str(content: &str) -> Result<(EntryFrontmatter, String), EntrySchemaError> {
  let offset = body_offset(content).ok_or(EntrySchemaError::MissingFrontmatter)?;
  let (block, body) = content.split_at(offset);

  let matter = Matter::<YAML>::new();
  let parsed = matter
    .parse(block)
    .map_err(|err| EntrySchemaError::Parse(err.to_string()))?;

  let data: Option<Value> = parsed.data;
  let data = data.ok_or(EntrySchemaError::MissingFrontmatter)?;
  let frontmatter = validate_frontmatter(&data)?;

  Ok((frontmatter, body.to_string()))
}

/// Read an entry file and validate its frontmatter.
pub fn parse_entry(path: &Path) -> Result<(EntryFrontmatter, String)> {
  let content =
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  parse_entry_str(&content).with_context(|| format!("invalid entry {}", path.display()))
}
