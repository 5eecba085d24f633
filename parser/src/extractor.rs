//! @ai:module:intent Assemble located todos from comment lines and the annotation grammar
//! @ai:module:layer application
//! @ai:module:public_api ExtractOptions, extract_source, extract_file
//! @ai:module:depends_on annotation, grammar, language, source, error
//! @ai:module:stateless true

use crate::annotation::{Location, ScannedFile, Todo};
use crate::error::{Error, Result};
use crate::grammar::parse_line;
use crate::language::{Language, LanguageRegistry};
use crate::source::{comment_lines, plain_lines};
use std::path::Path;
use tracing::debug;

/// 10 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// @ai:intent Knobs for turning one file into todos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Only look inside comments that contain the marker
    pub prefilter: bool,
    /// Use this language regardless of the file's extension
    pub language: Option<Language>,
    pub max_file_size: u64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            prefilter: true,
            language: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// @ai:intent Extract todos from in-memory source text
/// @ai:pre language is None for files that should be read as plain text
/// @ai:post todos are in order of appearance; each location line is 1-based
/// @ai:example ("test.go", "// TODO: fix this\n", Some(Go)) -> [Todo { line: "// TODO: fix this", location: test.go:1 }]
/// @ai:effects pure
pub fn extract_source(
    file: &Path,
    source: &str,
    language: Option<Language>,
    options: &ExtractOptions,
) -> Vec<Todo> {
    let lines = match language {
        Some(lang) => comment_lines(source, &lang.comment_syntax(), options.prefilter),
        None => plain_lines(source),
    };

    lines
        .into_iter()
        .filter_map(|line| {
            let annotation = parse_line(&line.text)?;
            let location = Location::new(file, line.row + 1);
            Some(Todo::new(line.text, location, annotation))
        })
        .collect()
}

/// @ai:intent Read a file and extract all of its todos
/// @ai:pre path exists and is readable
/// @ai:post files with no registered language are scanned line by line as plain text
/// @ai:effects fs:read
pub fn extract_file(
    path: &Path,
    registry: &LanguageRegistry,
    options: &ExtractOptions,
) -> Result<ScannedFile> {
    let read_error = |source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    };

    let size = std::fs::metadata(path).map_err(read_error)?.len();
    if size > options.max_file_size {
        return Err(Error::FileTooLarge {
            path: path.to_path_buf(),
            size,
            limit: options.max_file_size,
        });
    }

    let bytes = std::fs::read(path).map_err(read_error)?;
    let source = String::from_utf8_lossy(&bytes);

    let language = options.language.or_else(|| registry.lookup(path));
    debug!(
        path = %path.display(),
        language = language.map_or("plain text", |l| l.name()),
        "extracting todos"
    );

    Ok(ScannedFile {
        path: path.to_path_buf(),
        language: language.map(|l| l.name().to_string()),
        todos: extract_source(path, &source, language, options),
    })
}
