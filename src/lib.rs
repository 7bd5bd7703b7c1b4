//! Abstract feed generation for wiki dumps.
//!
//! Pages and revisions flow through a chain of [`output::DumpOutput`]s. The
//! [`filters::AbstractFilter`] replaces the page XML with a `<doc>` summary
//! made of a plain-text abstract and a list of section or category links.

pub mod categories;
pub mod error;
pub mod extractors;
pub mod filters;
pub mod output;
pub mod progress;
pub mod wiki;
pub mod wikitext_parser;
pub mod xml_parser;

pub use error::{Error, Result};
