//! @ai:module:intent Configuration for scanning, loaded from TOML
//! @ai:module:layer infrastructure
//! @ai:module:public_api ScanConfig
//! @ai:module:depends_on language, extractor, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::extractor::{ExtractOptions, DEFAULT_MAX_FILE_SIZE};
use crate::language::{Language, LanguageRegistry};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// @ai:intent Main configuration for a scan
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    #[serde(default = "default_prefilter")]
    pub prefilter: bool,
    /// In directory walks, also read files with no registered language as plain text
    #[serde(default)]
    pub include_plain_text: bool,
    #[serde(default)]
    pub include_hidden: bool,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Regexes matched against each walked path
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Extra extension to language-name mappings
    #[serde(default)]
    pub languages: BTreeMap<String, String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            prefilter: default_prefilter(),
            include_plain_text: false,
            include_hidden: false,
            max_file_size: default_max_file_size(),
            exclude: Vec::new(),
            languages: BTreeMap::new(),
        }
    }
}

fn default_prefilter() -> bool {
    true
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

impl ScanConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// @ai:intent Parse configuration from TOML text
    /// @ai:effects pure
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// @ai:intent Build the language registry: built-ins plus configured mappings
    /// @ai:post Err(UnknownLanguage) if a mapping names a language that does not exist
    pub fn registry(&self) -> Result<LanguageRegistry> {
        let mut registry = LanguageRegistry::builtin();
        for (ext, name) in &self.languages {
            registry.register(ext, Language::from_name(name)?);
        }
        Ok(registry)
    }

    /// @ai:intent Compile the exclude patterns
    pub fn exclude_patterns(&self) -> Result<Vec<Regex>> {
        self.exclude
            .iter()
            .map(|p| Regex::new(p).map_err(Error::from))
            .collect()
    }

    /// @ai:intent Per-file extraction settings derived from this config
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            prefilter: self.prefilter,
            language: None,
            max_file_size: self.max_file_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(ScanConfig::from_toml("").unwrap(), ScanConfig::default());
        assert!(ScanConfig::default().prefilter);
    }

    #[test]
    fn test_load_config_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"prefilter = false
include_plain_text = true
max_file_size = 1024
exclude = ["^target/", "\\.min\\.js$"]

[languages]
tpl = "html"
"#
        )
        .unwrap();

        let config = ScanConfig::load(file.path()).unwrap();
        assert!(!config.prefilter);
        assert!(config.include_plain_text);
        assert_eq!(config.max_file_size, 1024);
        assert_eq!(config.exclude_patterns().unwrap().len(), 2);

        let registry = config.registry().unwrap();
        assert_eq!(registry.lookup(Path::new("a.tpl")), Some(Language::Html));
        assert_eq!(registry.lookup(Path::new("a.rs")), Some(Language::Rust));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(matches!(
            ScanConfig::from_toml("prefiltr = true"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_unknown_language_mapping() {
        let config = ScanConfig::from_toml("[languages]\nx = \"klingon\"").unwrap();
        assert!(matches!(config.registry(), Err(Error::UnknownLanguage(_))));
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let config = ScanConfig {
            exclude: vec!["(".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.exclude_patterns(),
            Err(Error::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_extract_options() {
        let config = ScanConfig {
            prefilter: false,
            max_file_size: 7,
            ..Default::default()
        };
        let options = config.extract_options();
        assert!(!options.prefilter);
        assert_eq!(options.max_file_size, 7);
        assert_eq!(options.language, None);
    }
}
