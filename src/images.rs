//! Loading the per-document image tables written by the upstream image step.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::{Attributes, ImageRecord, ImageTable};

/// On-disk form of one image record.
#[derive(Debug, Deserialize)]
struct ImageRecordFile {
  src: String,
  #[serde(default)]
  attributes: Attributes,
}

impl ImageTable {
  /// Parse a table from its JSON form.
  ///
  /// The JSON is an object keyed by authored image path. Each value carries the resolved `src`
  /// and an optional `attributes` object whose key order is kept. An attribute named `src`
  /// overrides the resolved value but stays in first position.
  pub fn from_json_str(json: &str) -> Result<Self> {
    let records: BTreeMap<String, ImageRecordFile> =
      serde_json::from_str(json).context("failed to parse image table JSON")?;

    let mut table = ImageTable::new();
    for (source_path, file) in records {
      let mut attributes = Attributes::new();
      attributes.set("src", file.src);
      for (name, value) in file.attributes.iter() {
        attributes.set(name, value.clone());
      }
      let record = ImageRecord::from_attributes(source_path, attributes)?;
      table.register(record);
    }
    Ok(table)
  }
}

/// Load an image table from disk.
pub fn load_image_table(path: &Path) -> Result<ImageTable> {
  let content = fs::read_to_string(path)
    .with_context(|| format!("image table not found at {}", path.display()))?;
  ImageTable::from_json_str(&content)
    .with_context(|| format!("invalid image table {}", path.display()))
}

/// Load the table at `path` when it exists, otherwise return an empty table.
pub fn load_optional_image_table(path: &Path) -> Result<ImageTable> {
  if path.is_file() {
    load_image_table(path)
  } else {
    Ok(ImageTable::new())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::AttributeValue;
  use crate::resolver::render_attributes;
  use tempfile::tempdir;

  #[test]
  fn parses_records_with_src_first() {
    let table = ImageTable::from_json_str(
      r#"{
        "./cover.png": { "src": "/_astro/cover.webp", "attributes": { "width": 800, "height": 600 } },
        "/plain.png": { "src": "/plain.png" }
      }"#,
    )
    .unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(
      render_attributes(table.get("./cover.png").unwrap().attributes()),
      r#"src="/_astro/cover.webp" width="800" height="600""#
    );
    assert_eq!(table.get("/plain.png").unwrap().attributes().len(), 1);
  }

  #[test]
  fn attribute_src_overrides_resolved_src_in_place() {
    let table = ImageTable::from_json_str(
      r#"{ "a.png": { "src": "/old.png", "attributes": { "alt": "A", "src": "/new.png" } } }"#,
    )
    .unwrap();

    let attributes = table.get("a.png").unwrap().attributes();
    let names: Vec<&str> = attributes.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["src", "alt"]);
    assert_eq!(attributes.get("src"), Some(&AttributeValue::from("/new.png")));
  }

  #[test]
  fn rejects_invalid_attribute_names() {
    let err = ImageTable::from_json_str(
      r#"{ "a.png": { "src": "/a.png", "attributes": { "bad name": 1 } } }"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("bad name"));
  }

  #[test]
  fn rejects_records_without_src() {
    assert!(ImageTable::from_json_str(r#"{ "a.png": { "attributes": {} } }"#).is_err());
  }

  #[test]
  fn missing_optional_table_is_empty() {
    let dir = tempdir().unwrap();
    let table = load_optional_image_table(&dir.path().join("none.images.json")).unwrap();
    assert!(table.is_empty());
  }

  #[test]
  fn load_errors_name_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.images.json");
    fs::write(&path, "{ not json").unwrap();

    let err = load_image_table(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.images.json"));
  }
}
