//! Project configuration describing where entries, tables and outputs live.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::resolver::DEFAULT_MARKER;

/// File name searched for in the project root.
pub const DEFAULT_CONFIG_FILE: &str = "image_refs.config.json";

/// Discoverable project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
  /// Directory holding the compiled collection entries, relative to the project root.
  pub collection_dir: String,
  /// File extension identifying entry files.
  pub entry_extension: String,
  /// Suffix appended to an entry id to locate its image table.
  pub image_table_suffix: String,
  /// Optional JSON selection file inside the collection directory.
  pub selection_file: String,
  /// Directory receiving resolved entries, relative to the project root.
  pub output_dir: String,
  /// Name of the catalog JSON written into the output directory.
  pub catalog_json: String,
  /// Placeholder marker attribute emitted by the markdown compiler.
  pub marker: String,
}

impl Default for ProjectConfig {
  fn default() -> Self {
    Self {
      collection_dir: "src/content/workshops".into(),
      entry_extension: "html".into(),
      image_table_suffix: ".images.json".into(),
      selection_file: "workshops.local.json".into(),
      output_dir: "dist/workshops".into(),
      catalog_json: "catalog.json".into(),
      marker: DEFAULT_MARKER.into(),
    }
  }
}

impl ProjectConfig {
  /// Load configuration from `project_root`, falling back to defaults.
  ///
  /// A missing or unparsable file yields the defaults so a bare project still builds.
  pub fn discover(project_root: &Path) -> Self {
    let candidate = project_root.join(DEFAULT_CONFIG_FILE);
    match Self::from_path(&candidate) {
      Some(config) => config,
      None => {
        if candidate.exists() {
          log::warn!(
            "ignoring unparsable {}, using default configuration",
            candidate.display()
          );
        }
        Self::default()
      }
    }
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Absolute collection directory.
  pub fn collection_dir_path(&self, project_root: &Path) -> PathBuf {
    project_root.join(&self.collection_dir)
  }

  /// Absolute path of the selection file.
  pub fn selection_file_path(&self, project_root: &Path) -> PathBuf {
    self
      .collection_dir_path(project_root)
      .join(&self.selection_file)
  }

  /// Absolute output directory.
  pub fn output_dir_path(&self, project_root: &Path) -> PathBuf {
    project_root.join(&self.output_dir)
  }

  /// Image table file name for an entry id.
  pub fn image_table_file_name(&self, entry_id: &str) -> String {
    format!("{entry_id}{}", self.image_table_suffix)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn falls_back_to_defaults_without_a_file() {
    let dir = tempdir().unwrap();
    assert_eq!(ProjectConfig::discover(dir.path()), ProjectConfig::default());
  }

  #[test]
  fn partial_files_keep_remaining_defaults() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join(DEFAULT_CONFIG_FILE),
      r#"{"collection_dir": "guides", "marker": "__IMG_"}"#,
    )
    .unwrap();

    let config = ProjectConfig::discover(dir.path());
    assert_eq!(config.collection_dir, "guides");
    assert_eq!(config.marker, "__IMG_");
    assert_eq!(config.entry_extension, "html");
    assert_eq!(config.collection_dir_path(dir.path()), dir.path().join("guides"));
  }

  #[test]
  fn unparsable_file_yields_defaults() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "not json").unwrap();
    assert_eq!(ProjectConfig::discover(dir.path()), ProjectConfig::default());
  }

  #[test]
  fn derives_table_and_selection_paths() {
    let config = ProjectConfig::default();
    assert_eq!(config.image_table_file_name("10PRINT"), "10PRINT.images.json");
    assert_eq!(
      config.selection_file_path(Path::new("/site")),
      Path::new("/site/src/content/workshops/workshops.local.json")
    );
  }
}
