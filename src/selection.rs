//! Include/exclude lists deciding which entries a build resolves.
//!
//! Entry ids are flat file stems, so every rule names exactly one entry.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Selection filter consulted for every discovered entry.
pub trait EntryInclusion: Sync {
  /// Returns `true` when the entry should be resolved and written.
  fn is_included(&self, entry_id: &str) -> bool;

  /// Rules naming ids that are not among `entry_ids`.
  fn unmatched_rules(&self, _entry_ids: &BTreeSet<&str>) -> Vec<String> {
    Vec::new()
  }
}

/// Accepts every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllEntries;

impl EntryInclusion for AllEntries {
  fn is_included(&self, _entry_id: &str) -> bool {
    true
  }
}

/// Entry ids to build (`include`) and to skip (`exclude`).
///
/// An empty `include` list admits every entry. `exclude` always wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntrySelection {
  #[serde(deserialize_with = "entry_ids")]
  include: BTreeSet<String>,
  #[serde(deserialize_with = "entry_ids")]
  exclude: BTreeSet<String>,
}

/// Errors raised while loading a selection file.
#[derive(Error, Debug)]
pub enum SelectionError {
  /// The file exists but could not be read.
  #[error("failed to read {}: {source}", .path.display())]
  Io {
    /// Selection file path.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
  /// The file is not valid selection JSON.
  #[error("failed to parse {}: {source}", .path.display())]
  Parse {
    /// Selection file path.
    path: PathBuf,
    /// Underlying parse error.
    #[source]
    source: serde_json::Error,
  },
}

fn entry_ids<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let ids = Vec::<String>::deserialize(deserializer)?;
  Ok(clean_ids(ids))
}

fn clean_ids(ids: impl IntoIterator<Item = String>) -> BTreeSet<String> {
  ids
    .into_iter()
    .filter_map(|id| {
      let id = id.trim();
      (!id.is_empty()).then(|| id.to_string())
    })
    .collect()
}

impl EntrySelection {
  /// Read the selection file. A missing file selects every entry.
  pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SelectionError> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
      Ok(json) => serde_json::from_str(&json).map_err(|source| SelectionError::Parse {
        path: path.to_path_buf(),
        source,
      }),
      Err(err) if err.kind() == ErrorKind::NotFound => {
        log::debug!("no selection file at {}, building every entry", path.display());
        Ok(Self::default())
      }
      Err(source) => Err(SelectionError::Io {
        path: path.to_path_buf(),
        source,
      }),
    }
  }

  /// Selection from explicit id lists.
  pub fn from_rules<I, E>(include: I, exclude: E) -> Self
  where
    I: IntoIterator<Item = String>,
    E: IntoIterator<Item = String>,
  {
    Self {
      include: clean_ids(include),
      exclude: clean_ids(exclude),
    }
  }
}

impl EntryInclusion for EntrySelection {
  fn is_included(&self, entry_id: &str) -> bool {
    !self.exclude.contains(entry_id) && (self.include.is_empty() || self.include.contains(entry_id))
  }

  fn unmatched_rules(&self, entry_ids: &BTreeSet<&str>) -> Vec<String> {
    self
      .include
      .iter()
      .chain(&self.exclude)
      .filter(|rule| !entry_ids.contains(rule.as_str()))
      .cloned()
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
  }

  #[test]
  fn empty_selection_includes_everything() {
    let selection = EntrySelection::default();
    assert!(selection.is_included("10PRINT"));
    assert!(selection.is_included("landscape"));
  }

  #[test]
  fn exclude_wins_over_include() {
    let selection = EntrySelection::from_rules(ids(&["10PRINT", "landscape"]), ids(&["landscape"]));
    assert!(selection.is_included("10PRINT"));
    assert!(!selection.is_included("landscape"));
    assert!(!selection.is_included("other"));
  }

  #[test]
  fn ids_match_exactly() {
    let selection = EntrySelection::from_rules(ids(&[" 10PRINT "]), Vec::new());
    assert!(selection.is_included("10PRINT"));
    assert!(!selection.is_included("10PRINT-2"));
    assert!(!selection.is_included("10print"));
  }

  #[test]
  fn blank_ids_are_dropped() {
    let selection = EntrySelection::from_rules(ids(&["", "  "]), ids(&[""]));
    assert_eq!(selection, EntrySelection::default());
  }

  #[test]
  fn reports_rules_naming_unknown_entries() {
    let selection = EntrySelection::from_rules(ids(&["10PRINT", "typo"]), ids(&["gone"]));
    let known = BTreeSet::from(["10PRINT", "landscape"]);
    assert_eq!(selection.unmatched_rules(&known), ids(&["typo", "gone"]));
    assert!(AllEntries.unmatched_rules(&known).is_empty());
  }

  #[test]
  fn missing_file_selects_everything() {
    let dir = tempdir().unwrap();
    let selection = EntrySelection::load_from_path(dir.path().join("workshops.local.json")).unwrap();
    assert_eq!(selection, EntrySelection::default());
  }

  #[test]
  fn loads_ids_from_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("workshops.local.json");
    fs::write(&path, r#"{"exclude": ["landscape", " "]}"#).unwrap();

    let selection = EntrySelection::load_from_path(&path).unwrap();
    assert_eq!(selection, EntrySelection::from_rules(Vec::new(), ids(&["landscape"])));
    assert!(!selection.is_included("landscape"));
    assert!(selection.is_included("10PRINT"));
  }

  #[test]
  fn unknown_keys_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("workshops.local.json");
    fs::write(&path, r#"{"exclud": ["landscape"]}"#).unwrap();

    let err = EntrySelection::load_from_path(&path).unwrap_err();
    assert!(matches!(err, SelectionError::Parse { .. }));
  }

  #[test]
  fn parse_errors_carry_the_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("workshops.local.json");
    fs::write(&path, "[").unwrap();

    let err = EntrySelection::load_from_path(&path).unwrap_err();
    assert!(matches!(err, SelectionError::Parse { .. }));
    assert!(err.to_string().contains("workshops.local.json"));
  }
}
