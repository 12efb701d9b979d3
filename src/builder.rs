//! Collection pass: validate every entry, resolve its image placeholders and write the results.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use same_file::is_same_file;

use crate::config::ProjectConfig;
use crate::entry::parse_entry;
use crate::headings::extract_headings;
use crate::images::load_optional_image_table;
use crate::models::{CatalogRecord, ImageTable, ResolvedEntry};
use crate::resolver::ImageReferenceResolver;
use crate::selection::EntryInclusion;

/// An entry file discovered in the collection directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySource {
  /// Identifier taken from the file stem.
  pub id: String,
  /// Entry file.
  pub path: PathBuf,
  /// Image table registered for the entry, which may not exist.
  pub table_path: PathBuf,
}

/// Result of resolving a collection.
#[derive(Debug, Default)]
pub struct BuildOutput {
  /// Resolved entries sorted by id.
  pub entries: Vec<ResolvedEntry>,
}

impl BuildOutput {
  /// Listing records for the catalog file.
  pub fn catalog(&self) -> Vec<CatalogRecord> {
    self.entries.iter().map(CatalogRecord::from).collect()
  }

  /// Catalog serialized as prettified JSON.
  pub fn catalog_json(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(&self.catalog())?)
  }
}

/// Files written by [`CollectionBuilder::write`].
#[derive(Debug)]
pub struct WrittenArtifacts {
  /// Resolved HTML files, one per entry.
  pub documents: Vec<PathBuf>,
  /// Catalog JSON path.
  pub catalog: PathBuf,
}

/// Resolves every entry of a content collection.
pub struct CollectionBuilder<'a> {
  project_root: &'a Path,
  config: &'a ProjectConfig,
  resolver: ImageReferenceResolver,
}

impl<'a> CollectionBuilder<'a> {
  /// Create a builder for the project rooted at `project_root`.
  pub fn new(project_root: &'a Path, config: &'a ProjectConfig) -> Result<Self> {
    let resolver = ImageReferenceResolver::new(&config.marker)
      .with_context(|| format!("invalid marker in configuration: '{}'", config.marker))?;
    Ok(Self {
      project_root,
      config,
      resolver,
    })
  }

  /// List entry files in the collection directory, sorted by id.
  pub fn discover_entries(&self) -> Result<Vec<EntrySource>> {
    let collection_dir = self.config.collection_dir_path(self.project_root);
    let read_dir = fs::read_dir(&collection_dir)
      .with_context(|| format!("failed to read collection {}", collection_dir.display()))?;

    let mut sources = Vec::new();
    for entry in read_dir {
      let entry = entry?;
      if !entry.file_type()?.is_file() {
        continue;
      }

      let path = entry.path();
      let is_entry = path
        .extension()
        .is_some_and(|ext| ext == self.config.entry_extension.as_str());
      if !is_entry {
        continue;
      }

      let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
        log::warn!("skipping entry with non UTF-8 name: {}", path.display());
        continue;
      };
      if id.starts_with('.') {
        continue;
      }

      sources.push(EntrySource {
        id: id.to_string(),
        table_path: collection_dir.join(self.config.image_table_file_name(id)),
        path,
      });
    }

    sources.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(sources)
  }

  /// Resolve all selected entries.
  ///
  /// Entries are resolved in parallel. The first failing entry aborts the build with an error
  /// naming the entry.
  pub fn build<S: EntryInclusion>(&self, selection: &S) -> Result<BuildOutput> {
    let discovered = self.discover_entries()?;
    let ids: BTreeSet<&str> = discovered.iter().map(|source| source.id.as_str()).collect();
    for rule in selection.unmatched_rules(&ids) {
      log::warn!("selection names '{rule}' but no such entry exists");
    }

    let sources: Vec<EntrySource> = discovered
      .into_iter()
      .filter(|source| {
        let included = selection.is_included(&source.id);
        if !included {
          log::debug!("entry '{}' excluded by selection", source.id);
        }
        included
      })
      .collect();

    let entries = sources
      .par_iter()
      .map(|source| self.resolve_entry(source))
      .collect::<Result<Vec<_>>>()?;

    log::info!("resolved {} entries", entries.len());
    Ok(BuildOutput { entries })
  }

  /// Validate and resolve a single entry.
  pub fn resolve_entry(&self, source: &EntrySource) -> Result<ResolvedEntry> {
    let (frontmatter, body) = parse_entry(&source.path)?;
    let table = load_optional_image_table(&source.table_path)?;

    let references = self.resolver.references(&body);
    let html = self.resolver.resolve(&body, &table).with_context(|| {
      format!(
        "failed to resolve images in entry '{}' ({})",
        source.id,
        source.path.display()
      )
    })?;

    warn_unused_records(&source.id, &table, &references);
    log::debug!(
      "entry '{}': resolved {} image references",
      source.id,
      references.len()
    );

    let file_name = source
      .path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| source.id.clone());

    Ok(ResolvedEntry {
      id: source.id.clone(),
      frontmatter,
      headings: extract_headings(&html),
      html,
      image_count: references.len(),
      source: file_name,
    })
  }

  /// Write resolved documents and the catalog into the output directory.
  pub fn write(&self, output: &BuildOutput) -> Result<WrittenArtifacts> {
    let output_dir = self.config.output_dir_path(self.project_root);
    fs::create_dir_all(&output_dir)
      .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let collection_dir = self.config.collection_dir_path(self.project_root);
    let mut documents = Vec::with_capacity(output.entries.len());

    for entry in &output.entries {
      let destination = output_dir.join(format!("{}.{}", entry.id, self.config.entry_extension));
      let source = collection_dir.join(&entry.source);
      if destination.exists() && is_same_file(&source, &destination)? {
        bail!(
          "refusing to overwrite entry source {} with its resolved output",
          source.display()
        );
      }

      fs::write(&destination, &entry.html)
        .with_context(|| format!("failed to write {}", destination.display()))?;
      documents.push(destination);
    }

    let catalog = output_dir.join(&self.config.catalog_json);
    fs::write(&catalog, output.catalog_json()?)
      .with_context(|| format!("failed to write {}", catalog.display()))?;

    Ok(WrittenArtifacts { documents, catalog })
  }
}

fn warn_unused_records(entry_id: &str, table: &ImageTable, references: &[&str]) {
  let referenced: BTreeSet<&str> = references.iter().copied().collect();
  for unused in table.source_paths().filter(|path| !referenced.contains(path)) {
    log::warn!("image record '{unused}' is never referenced by entry '{entry_id}'");
  }
}
