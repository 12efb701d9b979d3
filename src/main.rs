//! Command line entry point for resolving compiled documents and collections.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use compiled_image_refs::images::load_image_table;
use compiled_image_refs::{CollectionBuilder, EntrySelection, ImageReferenceResolver, ProjectConfig};

#[derive(Parser, Debug)]
#[command(name = "image-refs", version, about = "Resolve image placeholders in compiled HTML")]
struct Cli {
  /// Increase log verbosity (repeat for more)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Resolve a single compiled document
  Resolve {
    /// Compiled HTML document
    input: PathBuf,

    /// Image table JSON for the document
    #[arg(long)]
    images: PathBuf,

    /// Placeholder marker attribute
    #[arg(long)]
    marker: Option<String>,

    /// Output file (prints to stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Resolve every entry of the configured collection
  Build {
    /// Project root containing the configuration file
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Override the configured output directory (a relative path is resolved against --root)
    #[arg(long)]
    out: Option<PathBuf>,
  },
}

fn init_logging(verbose: u8) {
  let default_level = match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
    .format_timestamp(None)
    .init();
}

fn run_resolve(
  input: &Path,
  images: &Path,
  marker: Option<&str>,
  output: Option<&Path>,
) -> Result<()> {
  let resolver = match marker {
    Some(marker) => ImageReferenceResolver::new(marker)?,
    None => ImageReferenceResolver::default(),
  };
  let html =
    fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;
  let table = load_image_table(images)?;

  let resolved = resolver
    .resolve(&html, &table)
    .with_context(|| format!("failed to resolve images in {}", input.display()))?;

  match output {
    Some(path) => {
      fs::write(path, resolved).with_context(|| format!("failed to write {}", path.display()))?;
      log::info!("wrote {}", path.display());
    }
    None => print!("{resolved}"),
  }
  Ok(())
}

fn run_build(root: &Path, out: Option<PathBuf>) -> Result<()> {
  let mut config = ProjectConfig::discover(root);
  if let Some(out) = out {
    config.output_dir = out.to_string_lossy().into_owned();
  }

  let selection = EntrySelection::load_from_path(config.selection_file_path(root))?;
  let builder = CollectionBuilder::new(root, &config)?;
  let output = builder.build(&selection)?;
  let written = builder.write(&output)?;

  println!(
    "Resolved {} entries into {}",
    written.documents.len(),
    config.output_dir_path(root).display()
  );
  Ok(())
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  match cli.command {
    Command::Resolve {
      input,
      images,
      marker,
      output,
    } => run_resolve(&input, &images, marker.as_deref(), output.as_deref()),
    Command::Build { root, out } => run_build(&root, out),
  }
}
