//! @ai:module:intent Define language-specific comment syntax and the extension registry
//! @ai:module:layer domain
//! @ai:module:public_api Language, CommentSyntax, StringDelimiter, LanguageRegistry
//! @ai:module:stateless true

use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// @ai:intent Represents a supported programming language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Rust,
    Go,
    C,
    Cpp,
    CSharp,
    Java,
    Kotlin,
    Scala,
    Swift,
    JavaScript,
    TypeScript,
    Php,
    Python,
    Ruby,
    Shell,
    Elixir,
    OCaml,
    Elm,
    Hcl,
    Sql,
    Lua,
    Protobuf,
    Html,
    Css,
    Toml,
    Yaml,
    Dockerfile,
}

/// @ai:intent How a string literal opens and closes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringDelimiter {
    pub quote: &'static str,
    /// Whether the literal may continue past a newline
    pub multiline: bool,
    /// Whether a backslash escapes the next character
    pub escapes: bool,
}

/// @ai:intent Comment syntax configuration for a language
#[derive(Debug, Clone, Copy)]
pub struct CommentSyntax {
    pub line: &'static [&'static str],
    pub block: &'static [(&'static str, &'static str)],
    pub nested_blocks: bool,
    /// Checked in order, so longer quotes (`"""`) must come first
    pub strings: &'static [StringDelimiter],
    /// `'x'` and `'\n'` are literals; any other `'` is left alone (lifetimes, labels)
    pub char_literals: bool,
    /// Rust `r"..."` / `r#"..."#`
    pub raw_strings: bool,
    /// Line comments only open at the start of a shell word, so `$#` and `${#x}` are code
    pub word_start_comments: bool,
}

const fn string(quote: &'static str) -> StringDelimiter {
    StringDelimiter {
        quote,
        multiline: false,
        escapes: true,
    }
}

const fn multiline(quote: &'static str) -> StringDelimiter {
    StringDelimiter {
        quote,
        multiline: true,
        escapes: true,
    }
}

const fn raw(quote: &'static str) -> StringDelimiter {
    StringDelimiter {
        quote,
        multiline: true,
        escapes: false,
    }
}

const C_BLOCK: &[(&str, &str)] = &[("/*", "*/")];

const C_FAMILY: CommentSyntax = CommentSyntax {
    line: &["//"],
    block: C_BLOCK,
    nested_blocks: false,
    strings: &[string("\"")],
    char_literals: true,
    raw_strings: false,
    word_start_comments: false,
};

const HASH: CommentSyntax = CommentSyntax {
    line: &["#"],
    block: &[],
    nested_blocks: false,
    strings: &[string("\""), string("'")],
    char_literals: false,
    raw_strings: false,
    word_start_comments: false,
};

const RUST: CommentSyntax = CommentSyntax {
    nested_blocks: true,
    strings: &[multiline("\"")],
    raw_strings: true,
    ..C_FAMILY
};

const GO: CommentSyntax = CommentSyntax {
    strings: &[string("\""), raw("`")],
    ..C_FAMILY
};

const CSHARP: CommentSyntax = CommentSyntax {
    strings: &[raw("\"\"\""), string("\"")],
    ..C_FAMILY
};

const JVM_LIKE: CommentSyntax = CommentSyntax {
    nested_blocks: true,
    strings: &[multiline("\"\"\""), string("\"")],
    ..C_FAMILY
};

const JAVASCRIPT: CommentSyntax = CommentSyntax {
    strings: &[string("\""), string("'"), multiline("`")],
    char_literals: false,
    ..C_FAMILY
};

const PHP: CommentSyntax = CommentSyntax {
    line: &["//", "#"],
    strings: &[multiline("\""), multiline("'")],
    char_literals: false,
    ..C_FAMILY
};

const HCL: CommentSyntax = CommentSyntax {
    line: &["#", "//"],
    char_literals: false,
    ..C_FAMILY
};

const CSS: CommentSyntax = CommentSyntax {
    line: &[],
    strings: &[string("\""), string("'")],
    char_literals: false,
    ..C_FAMILY
};

const SQL: CommentSyntax = CommentSyntax {
    line: &["--"],
    strings: &[multiline("'"), string("\"")],
    char_literals: false,
    ..C_FAMILY
};

const PYTHON: CommentSyntax = CommentSyntax {
    strings: &[
        multiline("\"\"\""),
        multiline("'''"),
        string("\""),
        string("'"),
    ],
    ..HASH
};

const RUBY: CommentSyntax = CommentSyntax {
    block: &[("=begin", "=end")],
    strings: &[multiline("\""), multiline("'")],
    ..HASH
};

const SHELL: CommentSyntax = CommentSyntax {
    strings: &[multiline("\""), raw("'")],
    word_start_comments: true,
    ..HASH
};

const ELIXIR: CommentSyntax = CommentSyntax {
    strings: &[multiline("\"\"\""), multiline("\""), string("'")],
    ..HASH
};

const TOML: CommentSyntax = CommentSyntax {
    strings: &[multiline("\"\"\""), raw("'''"), string("\""), raw("'")],
    ..HASH
};

// plain scalars are full of apostrophes
const YAML: CommentSyntax = CommentSyntax {
    strings: &[string("\"")],
    ..HASH
};

const DOCKERFILE: CommentSyntax = CommentSyntax {
    strings: &[],
    ..HASH
};

const OCAML: CommentSyntax = CommentSyntax {
    line: &[],
    block: &[("(*", "*)")],
    nested_blocks: true,
    strings: &[multiline("\"")],
    char_literals: true,
    raw_strings: false,
    word_start_comments: false,
};

const ELM: CommentSyntax = CommentSyntax {
    line: &["--"],
    block: &[("{-", "-}")],
    nested_blocks: true,
    strings: &[multiline("\"\"\""), string("\"")],
    char_literals: true,
    raw_strings: false,
    word_start_comments: false,
};

// `--[[` must win over `--`, so blocks are tried before line prefixes
const LUA: CommentSyntax = CommentSyntax {
    line: &["--"],
    block: &[("--[[", "]]")],
    nested_blocks: false,
    strings: &[string("\""), string("'")],
    char_literals: false,
    raw_strings: false,
    word_start_comments: false,
};

const HTML: CommentSyntax = CommentSyntax {
    line: &[],
    block: &[("<!--", "-->")],
    nested_blocks: false,
    strings: &[],
    char_literals: false,
    raw_strings: false,
    word_start_comments: false,
};

impl Language {
    pub const ALL: [Language; 27] = [
        Language::Rust,
        Language::Go,
        Language::C,
        Language::Cpp,
        Language::CSharp,
        Language::Java,
        Language::Kotlin,
        Language::Scala,
        Language::Swift,
        Language::JavaScript,
        Language::TypeScript,
        Language::Php,
        Language::Python,
        Language::Ruby,
        Language::Shell,
        Language::Elixir,
        Language::OCaml,
        Language::Elm,
        Language::Hcl,
        Language::Sql,
        Language::Lua,
        Language::Protobuf,
        Language::Html,
        Language::Css,
        Language::Toml,
        Language::Yaml,
        Language::Dockerfile,
    ];

    /// @ai:intent Get the comment syntax for this language
    /// @ai:effects pure
    pub fn comment_syntax(&self) -> CommentSyntax {
        match self {
            Language::Rust => RUST,
            Language::Go => GO,
            Language::C | Language::Cpp | Language::Java | Language::Protobuf => C_FAMILY,
            Language::CSharp => CSHARP,
            Language::Kotlin | Language::Scala | Language::Swift => JVM_LIKE,
            Language::JavaScript | Language::TypeScript => JAVASCRIPT,
            Language::Php => PHP,
            Language::Hcl => HCL,
            Language::Css => CSS,
            Language::Python => PYTHON,
            Language::Ruby => RUBY,
            Language::Shell => SHELL,
            Language::Elixir => ELIXIR,
            Language::Toml => TOML,
            Language::Yaml => YAML,
            Language::Dockerfile => DOCKERFILE,
            Language::OCaml => OCAML,
            Language::Elm => ELM,
            Language::Sql => SQL,
            Language::Lua => LUA,
            Language::Html => HTML,
        }
    }

    /// @ai:intent Get file extensions for this language
    /// @ai:effects pure
    pub fn extensions(&self) -> &[&str] {
        match self {
            Language::Rust => &["rs"],
            Language::Go => &["go"],
            Language::C => &["c", "h"],
            Language::Cpp => &["cpp", "cc", "cxx", "hpp", "hh", "hxx"],
            Language::CSharp => &["cs"],
            Language::Java => &["java"],
            Language::Kotlin => &["kt", "kts"],
            Language::Scala => &["scala", "sc"],
            Language::Swift => &["swift"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::TypeScript => &["ts", "tsx"],
            Language::Php => &["php"],
            Language::Python => &["py", "pyi"],
            Language::Ruby => &["rb"],
            Language::Shell => &["sh", "bash"],
            Language::Elixir => &["ex", "exs"],
            Language::OCaml => &["ml", "mli"],
            Language::Elm => &["elm"],
            Language::Hcl => &["tf", "hcl"],
            Language::Sql => &["sql"],
            Language::Lua => &["lua"],
            Language::Protobuf => &["proto"],
            Language::Html => &["html", "htm", "svelte"],
            Language::Css => &["css"],
            Language::Toml => &["toml"],
            Language::Yaml => &["yaml", "yml"],
            Language::Dockerfile => &["dockerfile"],
        }
    }

    /// @ai:intent Get language name as string
    /// @ai:effects pure
    pub fn name(&self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Go => "go",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::Scala => "scala",
            Language::Swift => "swift",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Php => "php",
            Language::Python => "python",
            Language::Ruby => "ruby",
            Language::Shell => "shell",
            Language::Elixir => "elixir",
            Language::OCaml => "ocaml",
            Language::Elm => "elm",
            Language::Hcl => "hcl",
            Language::Sql => "sql",
            Language::Lua => "lua",
            Language::Protobuf => "protobuf",
            Language::Html => "html",
            Language::Css => "css",
            Language::Toml => "toml",
            Language::Yaml => "yaml",
            Language::Dockerfile => "dockerfile",
        }
    }

    /// @ai:intent Resolve a language from its name
    /// @ai:example ("rust") -> Ok(Rust)
    /// @ai:example ("klingon") -> Err(UnknownLanguage)
    pub fn from_name(name: &str) -> Result<Language> {
        let wanted = name.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.name() == wanted)
            .ok_or_else(|| Error::UnknownLanguage(name.to_string()))
    }
}

/// @ai:intent Map file paths to the language used to find their comments
/// @ai:invariant extension keys are lowercase and carry no leading dot
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    extensions: HashMap<String, Language>,
    file_names: HashMap<String, Language>,
}

impl LanguageRegistry {
    /// @ai:intent Create a registry with no languages at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// @ai:intent Create a registry with every built-in language registered
    /// @ai:post every extension of every Language::ALL entry resolves
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for lang in Language::ALL {
            for ext in lang.extensions() {
                registry.register(ext, lang);
            }
        }
        registry
            .file_names
            .insert("dockerfile".to_string(), Language::Dockerfile);
        registry
    }

    /// @ai:intent Add or replace the language for an extension
    /// @ai:example (".JSX", JavaScript) -> registers "jsx"
    pub fn register(&mut self, extension: &str, language: Language) {
        let key = extension.trim_start_matches('.').to_ascii_lowercase();
        self.extensions.insert(key, language);
    }

    /// @ai:intent Detect the language of a file from its name or extension
    /// @ai:example ("src/main.rs") -> Some(Rust)
    /// @ai:example ("build/Dockerfile") -> Some(Dockerfile)
    /// @ai:example ("notes.txt") -> None
    /// @ai:effects pure
    pub fn lookup(&self, path: &Path) -> Option<Language> {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if let Some(lang) = self.file_names.get(&name.to_ascii_lowercase()) {
                return Some(*lang);
            }
        }
        let ext = path.extension()?.to_str()?;
        self.extensions.get(&ext.to_ascii_lowercase()).copied()
    }

    /// @ai:intent Check if a file has a registered language
    pub fn is_supported_file(&self, path: &Path) -> bool {
        self.lookup(path).is_some()
    }

    /// @ai:intent List registered extensions in sorted order
    pub fn extensions(&self) -> BTreeMap<&str, Language> {
        self.extensions
            .iter()
            .map(|(ext, lang)| (ext.as_str(), *lang))
            .collect()
    }
}
