//! @ai:module:intent Find comments in source text and split them into candidate lines
//! @ai:module:layer application
//! @ai:module:public_api Comment, SourceLine, comments, comment_lines, plain_lines
//! @ai:module:depends_on language, grammar
//! @ai:module:stateless true
//!
//! The scanner is lexical: it knows each language's comment delimiters and
//! string literals, which is enough to tell a `//` in code from one inside a
//! string. It does not build a syntax tree.

use crate::grammar::MARKER;
use crate::language::{CommentSyntax, StringDelimiter};

/// @ai:intent One comment as written, delimiters included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment<'a> {
    pub text: &'a str,
    /// 0-based row of the comment's first line
    pub start_row: usize,
}

/// @ai:intent One physical line handed to the annotation grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub text: String,
    /// 0-based row in the file
    pub row: usize,
}

/// @ai:intent Locate every comment in a source file, in order of appearance
/// @ai:post unterminated block comments run to end of input
/// @ai:effects pure
pub fn comments<'a>(source: &'a str, syntax: &CommentSyntax) -> Vec<Comment<'a>> {
    let mut scanner = Scanner::new(source, syntax);
    let mut found = Vec::new();
    while let Some(comment) = scanner.next_comment() {
        found.push(comment);
    }
    found
}

/// @ai:intent Split comments into individual lines with their file rows
/// @ai:pre syntax matches the language source is written in
/// @ai:post lines are ordered comment-by-comment, top to bottom
/// @ai:example ("/* a\n b */", C) -> [("/* a", 0), (" b */", 1)]
/// @ai:effects pure
pub fn comment_lines(source: &str, syntax: &CommentSyntax, prefilter: bool) -> Vec<SourceLine> {
    comments(source, syntax)
        .into_iter()
        .filter(|c| !prefilter || c.text.contains(MARKER))
        .flat_map(|c| {
            c.text.split('\n').enumerate().map(move |(i, line)| SourceLine {
                text: line.strip_suffix('\r').unwrap_or(line).to_string(),
                row: c.start_row + i,
            })
        })
        .collect()
}

/// @ai:intent Treat the whole file as text, one candidate per line
/// @ai:effects pure
pub fn plain_lines(source: &str) -> Vec<SourceLine> {
    source
        .lines()
        .enumerate()
        .map(|(row, text)| SourceLine {
            text: text.to_string(),
            row,
        })
        .collect()
}

struct Scanner<'a, 's> {
    source: &'a str,
    syntax: &'s CommentSyntax,
    pos: usize,
    row: usize,
}

impl<'a, 's> Scanner<'a, 's> {
    fn new(source: &'a str, syntax: &'s CommentSyntax) -> Self {
        Self {
            source,
            syntax,
            pos: 0,
            row: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn prev_char(&self) -> Option<char> {
        self.source[..self.pos].chars().next_back()
    }

    /// Moves forward `len` bytes, counting newlines.
    fn advance(&mut self, len: usize) {
        let end = (self.pos + len).min(self.source.len());
        self.row += self.source[self.pos..end].matches('\n').count();
        self.pos = end;
    }

    fn advance_char(&mut self) {
        if let Some(c) = self.rest().chars().next() {
            self.advance(c.len_utf8());
        }
    }

    fn next_comment(&mut self) -> Option<Comment<'a>> {
        while !self.rest().is_empty() {
            if let Some(&(open, close)) = self
                .syntax
                .block
                .iter()
                .find(|(open, _)| self.block_opens_here(open))
            {
                return Some(self.block_comment(open, close));
            }
            if self.line_comment_opens_here() {
                return Some(self.line_comment());
            }
            if self.syntax.raw_strings && self.skip_raw_string() {
                continue;
            }
            if let Some(&delim) = self
                .syntax
                .strings
                .iter()
                .find(|d| self.rest().starts_with(d.quote))
            {
                self.skip_string(&delim);
                continue;
            }
            if self.syntax.char_literals && self.rest().starts_with('\'') {
                self.skip_char_literal();
                continue;
            }
            self.advance_char();
        }
        None
    }

    fn block_opens_here(&self, open: &str) -> bool {
        self.rest().starts_with(open) && self.delimiter_allowed_here(open)
    }

    /// `=begin` and `=end` only count at the start of a line.
    fn delimiter_allowed_here(&self, delimiter: &str) -> bool {
        !delimiter.starts_with('=') || matches!(self.prev_char(), None | Some('\n'))
    }

    fn line_comment_opens_here(&self) -> bool {
        if !self.syntax.line.iter().any(|p| self.rest().starts_with(p)) {
            return false;
        }
        !self.syntax.word_start_comments
            || matches!(
                self.prev_char(),
                None | Some(';' | '&' | '|' | '(' | ')' | '<' | '>')
            )
            || self.prev_char().is_some_and(char::is_whitespace)
    }

    fn block_comment(&mut self, open: &str, close: &str) -> Comment<'a> {
        let start = self.pos;
        let start_row = self.row;
        self.advance(open.len());

        let mut depth = 1;
        while !self.rest().is_empty() {
            if self.syntax.nested_blocks && self.block_opens_here(open) {
                depth += 1;
                self.advance(open.len());
            } else if self.rest().starts_with(close) && self.delimiter_allowed_here(close) {
                depth -= 1;
                self.advance(close.len());
                if depth == 0 {
                    break;
                }
            } else {
                self.advance_char();
            }
        }

        Comment {
            text: &self.source[start..self.pos],
            start_row,
        }
    }

    fn line_comment(&mut self) -> Comment<'a> {
        let start = self.pos;
        let len = self.rest().find('\n').unwrap_or(self.rest().len());
        let text = &self.source[start..start + len];
        // stop short of the newline so the row stays on this line
        self.pos = start + len;
        Comment {
            text: text.strip_suffix('\r').unwrap_or(text),
            start_row: self.row,
        }
    }

    fn skip_string(&mut self, delim: &StringDelimiter) {
        self.advance(delim.quote.len());
        while let Some(c) = self.rest().chars().next() {
            if delim.escapes && c == '\\' {
                self.advance(1);
                self.advance_char();
            } else if self.rest().starts_with(delim.quote) {
                self.advance(delim.quote.len());
                return;
            } else if c == '\n' && !delim.multiline {
                return;
            } else {
                self.advance_char();
            }
        }
    }

    /// Skips `r"..."`, `r#"..."#`, `br##"..."##` and friends.
    fn skip_raw_string(&mut self) -> bool {
        let rest = self.rest();
        let Some(after_r) = rest.strip_prefix('r') else {
            return false;
        };
        if matches!(self.prev_char(), Some(c) if c != 'b' && (c.is_alphanumeric() || c == '_')) {
            return false;
        }
        let hashes = after_r.len() - after_r.trim_start_matches('#').len();
        if !after_r[hashes..].starts_with('"') {
            return false;
        }

        let opener = 1 + hashes + 1;
        let closer = format!("\"{}", "#".repeat(hashes));
        let body = &rest[opener..];
        let len = body
            .find(closer.as_str())
            .map_or(body.len(), |i| i + closer.len());
        self.advance(opener + len);
        true
    }

    /// `'x'`, `'\n'`, `'\u{1F600}'`; a lone `'` (lifetime, label) is stepped over.
    fn skip_char_literal(&mut self) {
        let mut chars = self.rest()[1..].char_indices();
        let literal_len = match chars.next() {
            Some((_, '\\')) => self.rest()[1..]
                .char_indices()
                .skip(2)
                .take(10)
                .find(|&(_, c)| c == '\'' || c == '\n')
                .filter(|&(_, c)| c == '\'')
                .map(|(i, _)| i + 2),
            Some((_, c)) if c != '\n' => match chars.next() {
                Some((i, '\'')) => Some(i + 2),
                _ => None,
            },
            _ => None,
        };
        self.advance(literal_len.unwrap_or(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use pretty_assertions::assert_eq;

    fn texts<'a>(source: &'a str, lang: Language) -> Vec<(&'a str, usize)> {
        comments(source, &lang.comment_syntax())
            .into_iter()
            .map(|c| (c.text, c.start_row))
            .collect()
    }

    fn line(text: &str, row: usize) -> SourceLine {
        SourceLine {
            text: text.to_string(),
            row,
        }
    }

    #[test]
    fn test_line_comments() {
        assert_eq!(
            texts("let a = 1; // one\n// two\r\nfn f() {}\n", Language::Rust),
            vec![("// one", 0), ("// two", 1)]
        );
    }

    #[test]
    fn test_block_comment_split_into_lines() {
        let source = "/* \n TODO: does this work ?\n */";
        assert_eq!(
            comment_lines(source, &Language::TypeScript.comment_syntax(), true),
            vec![line("/* ", 0), line(" TODO: does this work ?", 1), line(" */", 2)]
        );
    }

    #[test]
    fn test_prefilter_drops_comments_without_marker() {
        let source = "// nothing here\n// TODO: keep\n";
        let syntax = Language::Go.comment_syntax();
        assert_eq!(
            comment_lines(source, &syntax, true),
            vec![line("// TODO: keep", 1)]
        );
        assert_eq!(comment_lines(source, &syntax, false).len(), 2);
    }

    #[test]
    fn test_comment_markers_inside_strings_are_ignored() {
        let source = r#"let url = "http://example.com"; // real
let s = "/* not a comment */";
let c = '"'; // after char
"#;
        assert_eq!(
            texts(source, Language::Rust),
            vec![("// real", 0), ("// after char", 2)]
        );
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let source = "x = \"a \\\" // b\" # real\n";
        assert_eq!(texts(source, Language::Python), vec![("# real", 0)]);
    }

    #[test]
    fn test_rust_raw_strings_and_lifetimes() {
        let source = "fn f<'a>(x: &'a str) { let s = r#\"a \" // b\"#; } // tail\n";
        assert_eq!(texts(source, Language::Rust), vec![("// tail", 0)]);
    }

    #[test]
    fn test_nested_block_comments() {
        let source = "/* outer /* inner */ still */ code // after";
        assert_eq!(
            texts(source, Language::Rust),
            vec![("/* outer /* inner */ still */", 0), ("// after", 0)]
        );
        assert_eq!(
            texts("/* a /* b */ c */", Language::C),
            vec![("/* a /* b */", 0)]
        );
    }

    #[test]
    fn test_unterminated_block_runs_to_end() {
        assert_eq!(
            texts("int x;\n/* open\nTODO: x", Language::C),
            vec![("/* open\nTODO: x", 1)]
        );
    }

    #[test]
    fn test_python_docstring_is_not_a_comment() {
        let source = "def f():\n    \"\"\"# TODO: no\"\"\"\n    # TODO: yes\n";
        assert_eq!(texts(source, Language::Python), vec![("# TODO: yes", 2)]);
    }

    #[test]
    fn test_ruby_begin_end() {
        let source = "x = 1\n=begin\nTODO: doc\n=end\n";
        assert_eq!(texts(source, Language::Ruby), vec![("=begin\nTODO: doc\n=end", 1)]);
    }

    #[test]
    fn test_ruby_end_must_start_a_line() {
        let source = "=begin\nx = 1 =end\nTODO: still in block\n=end\n# TODO: real\n";
        assert_eq!(
            texts(source, Language::Ruby),
            vec![
                ("=begin\nx = 1 =end\nTODO: still in block\n=end", 0),
                ("# TODO: real", 4),
            ]
        );
    }

    #[test]
    fn test_shell_hash_inside_a_word_is_code() {
        let source = "n=${#TODO_items[@]}: count
args=$# # TODO: real
echo hi;# TODO: after semicolon
";
        assert_eq!(
            texts(source, Language::Shell),
            vec![("# TODO: real", 1), ("# TODO: after semicolon", 2)]
        );
        assert_eq!(texts("x=a#b # c", Language::Python), vec![("#b # c", 0)]);
    }

    #[test]
    fn test_html_and_lua_comments() {
        assert_eq!(
            texts("<p>it's</p><!-- TODO: fix -->", Language::Html),
            vec![("<!-- TODO: fix -->", 0)]
        );
        assert_eq!(
            texts("--[[ TODO: a\n]] x = 1 -- b", Language::Lua),
            vec![("--[[ TODO: a\n]]", 0), ("-- b", 1)]
        );
    }

    #[test]
    fn test_unterminated_string_stops_at_newline() {
        let source = "s = \"oops\n# TODO: found\n";
        assert_eq!(texts(source, Language::Python), vec![("# TODO: found", 1)]);
    }

    #[test]
    fn test_plain_lines() {
        assert_eq!(
            plain_lines("// TODO(): fix this\r\nTODO: fix this again"),
            vec![line("// TODO(): fix this", 0), line("TODO: fix this again", 1)]
        );
    }
}
