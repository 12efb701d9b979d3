#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod builder;
pub mod config;
pub mod entry;
pub mod error;
pub mod headings;
pub mod images;
pub mod models;
pub mod resolver;
pub mod selection;

pub use builder::{BuildOutput, CollectionBuilder, EntrySource, WrittenArtifacts};
pub use config::ProjectConfig;
pub use error::{EntrySchemaError, ModelError, ResolveError};
pub use headings::extract_headings;
pub use models::{AttributeValue, Attributes, EntryFrontmatter, Heading, ImageRecord, ImageTable};
pub use resolver::{DEFAULT_MARKER, ImageReferenceResolver, resolve};
pub use selection::{AllEntries, EntryInclusion, EntrySelection};
