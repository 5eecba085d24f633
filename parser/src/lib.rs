//! @ai:module:intent Library for finding TODO annotations in source comments
//! @ai:module:layer infrastructure
//! @ai:module:public_api annotation, grammar, language, source, extractor, scan, config, output, error
//! @ai:module:stateless true
//!
//! # todoscan
//!
//! Finds `TODO` annotations inside comments and parses their optional
//! attribute list, e.g. `TODO(owner=ana, due="2025-04-01"): fix this`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use todoscan_parser::{output, parse_line, scan_paths, ScanConfig};
//! use std::path::PathBuf;
//!
//! // Parse a single line
//! let annotation = parse_line("// TODO(owner=ana): fix this").unwrap();
//! assert_eq!(annotation.attribute("owner"), Some("ana"));
//!
//! // Scan a directory
//! let config = ScanConfig::default();
//! let registry = config.registry().unwrap();
//! let report = scan_paths(&[PathBuf::from("src")], &registry, &config, &config.extract_options()).unwrap();
//! println!("{}", output::format_report(&report, output::OutputFormat::JsonPretty));
//! ```

pub mod annotation;
pub mod config;
pub mod error;
pub mod extractor;
pub mod grammar;
pub mod language;
pub mod output;
pub mod scan;
pub mod source;

pub use annotation::{Annotation, Attribute, Location, ScannedFile, Todo};
pub use config::ScanConfig;
pub use error::{Error, Result};
pub use extractor::{extract_file, extract_source, ExtractOptions};
pub use grammar::parse_line;
pub use language::{Language, LanguageRegistry};
pub use output::{format_annotation, format_report, to_json, OutputFormat, TodoRecord};
pub use scan::{scan_paths, ScanFailure, ScanReport};
