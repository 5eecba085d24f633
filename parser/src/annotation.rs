//! @ai:module:intent Define data structures for TODO annotations
//! @ai:module:layer domain
//! @ai:module:public_api Attribute, Annotation, Location, Todo, ScannedFile
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// @ai:intent Represents a source code location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Location {
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
}

/// @ai:intent One key, with an optional value, from an annotation's attribute list
/// @ai:invariant quoted == false && value.is_empty() means the key had no `=value` part
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Attribute {
    pub key: String,
    pub value: String,
    pub quoted: bool,
}

/// @ai:intent What the grammar recovers from one line: attributes plus description
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Annotation {
    pub description: String,
    pub attributes: Vec<Attribute>,
}

/// @ai:intent A located TODO annotation found in a file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    /// The raw line the annotation was parsed from
    pub line: String,
    pub location: Location,
    pub description: String,
    pub attributes: Vec<Attribute>,
}

/// @ai:intent All todos found in one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub language: Option<String>,
    pub todos: Vec<Todo>,
}

impl Location {
    /// @ai:intent Create a new Location
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    /// @ai:example (Location { file: "test.go", line: 10 }) -> "test.go:10"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

impl Attribute {
    /// @ai:intent Create an attribute with a bare (unquoted) value
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            quoted: false,
        }
    }

    /// @ai:intent Create an attribute whose value was written in double quotes
    pub fn quoted(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            quoted: true,
        }
    }

    /// @ai:intent Create a key-only attribute such as `TODO(urgent): ...`
    pub fn bare(key: impl Into<String>) -> Self {
        Self::new(key, "")
    }

    /// @ai:intent Check if the attribute was written without any `=value` part
    pub fn is_bare(&self) -> bool {
        !self.quoted && self.value.is_empty()
    }
}

impl fmt::Display for Attribute {
    /// @ai:example (quoted("path", "C:\\App")) -> "path=\"C:\\\\App\""
    /// @ai:effects pure
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            f.write_str(&self.key)?;
            f.write_str("=\"")?;
            for c in self.value.chars() {
                if c == '\\' || c == '"' {
                    f.write_str("\\")?;
                }
                write!(f, "{}", c)?;
            }
            f.write_str("\"")
        } else if self.value.is_empty() {
            f.write_str(&self.key)
        } else {
            write!(f, "{}={}", self.key, self.value)
        }
    }
}

/// Writes `TODO(k=v, ...): description`, or `TODO: description` without attributes.
fn write_annotation(
    f: &mut fmt::Formatter<'_>,
    attributes: &[Attribute],
    description: &str,
) -> fmt::Result {
    f.write_str("TODO")?;
    if !attributes.is_empty() {
        f.write_str("(")?;
        for (i, attr) in attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", attr)?;
        }
        // `TODO(a, )` would lose a trailing empty key; `TODO(a, ,)` keeps it
        if attributes.last().is_some_and(|a| a.is_bare() && a.key.is_empty()) {
            f.write_str(",")?;
        }
        f.write_str(")")?;
    }
    write!(f, ": {}", description)
}

/// First attribute value for `key`; duplicates are legal and the earliest wins.
fn find_attribute<'a>(attributes: &'a [Attribute], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.key == key)
        .map(|a| a.value.as_str())
}

impl Annotation {
    /// @ai:intent Look up the value of the first attribute named `key`
    /// @ai:effects pure
    pub fn attribute(&self, key: &str) -> Option<&str> {
        find_attribute(&self.attributes, key)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_annotation(f, &self.attributes, &self.description)
    }
}

impl Todo {
    /// @ai:intent Attach a raw line and location to a parsed annotation
    pub fn new(line: impl Into<String>, location: Location, annotation: Annotation) -> Self {
        Self {
            line: line.into(),
            location,
            description: annotation.description,
            attributes: annotation.attributes,
        }
    }

    /// @ai:intent Look up the value of the first attribute named `key`
    /// @ai:example ("assigned") -> Some("john")
    /// @ai:example ("unknown") -> None
    /// @ai:effects pure
    pub fn attribute(&self, key: &str) -> Option<&str> {
        find_attribute(&self.attributes, key)
    }
}

impl fmt::Display for Todo {
    /// @ai:intent Re-serialize the todo in canonical annotation syntax
    /// @ai:post re-parsing the output yields the same attributes and description
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_annotation(f, &self.attributes, &self.description)
    }
}
