//! @ai:module:intent Parse a single line of text into a TODO annotation
//! @ai:module:layer domain
//! @ai:module:public_api parse_line, MARKER
//! @ai:module:stateless true
//! @ai:module:thread_safe true
//!
//! Grammar, after discarding everything up to and including the first `TODO`:
//!
//! ```text
//! annotation := ws* ( "(" attributes ")" )? ws* ":" ws* description
//! attributes := ws* ( attribute ws* ","? ws* )*
//! attribute  := key ( ws* "=" ws* value )?
//! value      := '"' ( '\\' any | [^"\\] )* '"' | [^,)\s]*
//! ```
//!
//! Any violation rejects the whole line. There is no partial result.

use crate::annotation::{Annotation, Attribute};
use thiserror::Error;
use tracing::trace;

/// The literal token that starts an annotation. Matched as a plain,
/// case-sensitive substring with no word-boundary check.
pub const MARKER: &str = "TODO";

/// Why a line containing the marker was not accepted.
#[derive(Debug, Error, PartialEq, Eq)]
enum Rejection {
    #[error("attribute list is missing its closing ')'")]
    UnterminatedList,

    #[error("quoted value is missing its closing '\"'")]
    UnterminatedQuote,

    #[error("unexpected {0:?} after attribute key")]
    UnexpectedChar(char),

    #[error("expected ':' after the marker")]
    MissingColon,
}

/// @ai:intent Recognize a TODO annotation in one line and split it into attributes and description
/// @ai:pre line is a single physical line without its trailing newline
/// @ai:post None when the line has no marker or the text after it breaks the grammar
/// @ai:example ("// TODO: fix this") -> Some(description = "fix this", attributes = [])
/// @ai:example ("TODO(k=v x): d") -> Some(attributes = [k=v, x])
/// @ai:example ("TODO fix this") -> None
/// @ai:edge_cases "ATODO: x" matches; lowercase "todo:" never does
/// @ai:effects pure
pub fn parse_line(line: &str) -> Option<Annotation> {
    let (_, rest) = line.split_once(MARKER)?;
    match parse_after_marker(rest) {
        Ok(annotation) => Some(annotation),
        Err(rejection) => {
            trace!(%rejection, line, "not a TODO annotation");
            None
        }
    }
}

fn parse_after_marker(rest: &str) -> Result<Annotation, Rejection> {
    let mut cursor = Cursor::new(rest);

    cursor.skip_whitespace();
    let attributes = if cursor.peek() == Some('(') {
        parse_attributes(&mut cursor)?
    } else {
        Vec::new()
    };

    cursor.skip_whitespace();
    if !cursor.eat(':') {
        return Err(Rejection::MissingColon);
    }
    cursor.skip_whitespace();

    Ok(Annotation {
        description: cursor.rest().trim().to_string(),
        attributes,
    })
}

/// @ai:intent Consume `( ... )` and return the attributes inside, in order
/// @ai:pre cursor is positioned on '('
/// @ai:post the closing ')' has been consumed
fn parse_attributes(cursor: &mut Cursor<'_>) -> Result<Vec<Attribute>, Rejection> {
    cursor.bump();
    let mut attributes = Vec::new();

    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            None => return Err(Rejection::UnterminatedList),
            Some(')') => {
                cursor.bump();
                return Ok(attributes);
            }
            Some(_) => {}
        }

        attributes.push(parse_attribute(cursor)?);

        cursor.skip_whitespace();
        // A missing comma is tolerated: the next pass either closes the
        // list or starts another attribute.
        cursor.eat(',');
    }
}

/// @ai:intent Parse `key`, `key=value` or `key="value"`
/// @ai:pre cursor is not at end of input
/// @ai:post the delimiter that ended a bare key (',' or ')') is left unconsumed
fn parse_attribute(cursor: &mut Cursor<'_>) -> Result<Attribute, Rejection> {
    let key = cursor
        .take_while(|c| !matches!(c, '=' | ',' | ')') && !c.is_whitespace())
        .trim()
        .to_string();

    match cursor.peek() {
        None | Some(',') | Some(')') => Ok(Attribute::bare(key)),
        Some('=') => {
            cursor.bump();
            parse_assignment(cursor, key)
        }
        Some(c) if c.is_whitespace() => {
            cursor.skip_whitespace();
            if cursor.eat('=') {
                parse_assignment(cursor, key)
            } else {
                // trailing padding, as in `key , next`
                Ok(Attribute::bare(key))
            }
        }
        // unreachable while the key stops at every delimiter and whitespace;
        // widening the key predicate makes this arm live again
        Some(c) => Err(Rejection::UnexpectedChar(c)),
    }
}

/// Parses the value following an already consumed `=`.
fn parse_assignment(cursor: &mut Cursor<'_>, key: String) -> Result<Attribute, Rejection> {
    cursor.skip_whitespace();
    if cursor.peek() == Some('"') {
        let value = parse_quoted_value(cursor)?;
        Ok(Attribute {
            key,
            value,
            quoted: true,
        })
    } else {
        let value = cursor
            .take_while(|c| c != ',' && c != ')' && !c.is_whitespace())
            .trim()
            .to_string();
        Ok(Attribute {
            key,
            value,
            quoted: false,
        })
    }
}

/// @ai:intent Read a double-quoted value, resolving `\\` and `\"`
/// @ai:pre cursor is positioned on the opening quote
/// @ai:edge_cases unknown escapes such as `\n` are kept as the two characters `\` and `n`
fn parse_quoted_value(cursor: &mut Cursor<'_>) -> Result<String, Rejection> {
    cursor.bump();
    let mut value = String::new();

    loop {
        match cursor.bump() {
            None => return Err(Rejection::UnterminatedQuote),
            Some('"') => return Ok(value),
            Some('\\') => match cursor.bump() {
                None => return Err(Rejection::UnterminatedQuote),
                Some(c @ ('\\' | '"')) => value.push(c),
                Some(c) => {
                    value.push('\\');
                    value.push(c);
                }
            },
            Some(c) => value.push(c),
        }
    }
}

/// One-code-point lookahead over the text following the marker.
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(c)
    }

    /// Consumes `expected` if it is the next code point.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consumes code points while `pred` holds and returns them.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let end = self
            .rest
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(self.rest.len(), |(i, _)| i);
        let (taken, rest) = self.rest.split_at(end);
        self.rest = rest;
        taken
    }

    /// Unicode-aware: NBSP, ideographic space and friends count.
    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn rest(&self) -> &'a str {
        self.rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn annotation(description: &str, attributes: Vec<Attribute>) -> Option<Annotation> {
        Some(Annotation {
            description: description.to_string(),
            attributes,
        })
    }

    #[test]
    fn test_simple() {
        assert_eq!(parse_line("TODO: fix this"), annotation("fix this", vec![]));
    }

    #[test]
    fn test_not_a_todo() {
        assert_eq!(parse_line("This is just a comment"), None);
    }

    #[test]
    fn test_requires_colon() {
        assert_eq!(parse_line("TODO fix this"), None);
        assert_eq!(parse_line("TODO"), None);
        assert_eq!(parse_line("TODO(owner=me) fix this"), None);
    }

    #[test]
    fn test_empty_attribute_list() {
        assert_eq!(parse_line("TODO(): fix this"), annotation("fix this", vec![]));
    }

    #[test]
    fn test_with_attributes() {
        assert_eq!(
            parse_line("TODO(created=2025-03-09,assigned=john): fix this"),
            annotation(
                "fix this",
                vec![
                    Attribute::new("created", "2025-03-09"),
                    Attribute::new("assigned", "john"),
                ]
            )
        );
    }

    #[test]
    fn test_quoted_value_keeps_delimiters() {
        assert_eq!(
            parse_line(r#"TODO(created=2023-01-01,message="complex, value)"): do something"#),
            annotation(
                "do something",
                vec![
                    Attribute::new("created", "2023-01-01"),
                    Attribute::quoted("message", "complex, value)"),
                ]
            )
        );
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(
            parse_line(r#"TODO(message="value with \"escaped\" quotes"): task"#),
            annotation(
                "task",
                vec![Attribute::quoted("message", r#"value with "escaped" quotes"#)]
            )
        );
    }

    #[test]
    fn test_escaped_backslashes() {
        assert_eq!(
            parse_line(r#"TODO(path="C:\\Program Files\\App"): update path"#),
            annotation(
                "update path",
                vec![Attribute::quoted("path", r"C:\Program Files\App")]
            )
        );
    }

    #[test]
    fn test_unknown_escape_is_preserved() {
        assert_eq!(
            parse_line(r#"TODO(fmt="a\nb"): d"#),
            annotation("d", vec![Attribute::quoted("fmt", r"a\nb")])
        );
    }

    #[test]
    fn test_empty_quoted_value() {
        assert_eq!(
            parse_line(r#"TODO(key=""): d"#),
            annotation("d", vec![Attribute::quoted("key", "")])
        );
    }

    #[test]
    fn test_attributes_without_values() {
        assert_eq!(
            parse_line("TODO(key, 2025-03-06, author=icholy): description"),
            annotation(
                "description",
                vec![
                    Attribute::bare("key"),
                    Attribute::bare("2025-03-06"),
                    Attribute::new("author", "icholy"),
                ]
            )
        );
    }

    #[test]
    fn test_extra_whitespace() {
        assert_eq!(
            parse_line(r#"   TODO (key = value, key2 =  "val,ue" ) : description"#),
            annotation(
                "description",
                vec![
                    Attribute::new("key", "value"),
                    Attribute::quoted("key2", "val,ue"),
                ]
            )
        );
    }

    #[test]
    fn test_ignores_everything_before_marker() {
        assert_eq!(
            parse_line("# // * --- TODO: fix this"),
            annotation("fix this", vec![])
        );
    }

    #[test]
    fn test_marker_is_a_plain_substring() {
        assert_eq!(parse_line("ATODO: x"), annotation("x", vec![]));
        assert_eq!(parse_line("todo: x"), None);
        assert_eq!(parse_line("MASTODON: x"), None);
    }

    #[test]
    fn test_only_first_marker_counts() {
        assert_eq!(
            parse_line("TODO: see TODO(a=b): there"),
            annotation("see TODO(a=b): there", vec![])
        );
        assert_eq!(parse_line("TODO and TODO: later"), None);
    }

    #[test]
    fn test_unquoted_value_stops_at_whitespace() {
        assert_eq!(
            parse_line("TODO(k=v x): d"),
            annotation("d", vec![Attribute::new("k", "v"), Attribute::bare("x")])
        );
    }

    #[test]
    fn test_keys_separated_by_whitespace() {
        assert_eq!(
            parse_line("TODO(a b): d"),
            annotation("d", vec![Attribute::bare("a"), Attribute::bare("b")])
        );
    }

    #[test]
    fn test_padded_bare_key() {
        assert_eq!(
            parse_line("TODO(key , next): d"),
            annotation("d", vec![Attribute::bare("key"), Attribute::bare("next")])
        );
    }

    #[test]
    fn test_duplicate_keys_are_kept() {
        assert_eq!(
            parse_line("TODO(a=1, a=2): d"),
            annotation("d", vec![Attribute::new("a", "1"), Attribute::new("a", "2")])
        );
    }

    #[test]
    fn test_empty_description() {
        assert_eq!(parse_line("TODO:"), annotation("", vec![]));
        assert_eq!(parse_line("TODO(x):   "), annotation("", vec![Attribute::bare("x")]));
    }

    #[test]
    fn test_unterminated_attribute_list() {
        assert_eq!(parse_line("TODO(abc: d"), None);
        assert_eq!(parse_line("TODO(a=b, c"), None);
        assert_eq!(parse_line("TODO("), None);
        assert_eq!(parse_line("TODO(k="), None);
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(parse_line(r#"TODO(k="abc): d"#), None);
        assert_eq!(parse_line(r#"TODO(k="abc\"): d"#), None);
        assert_eq!(parse_line(r#"TODO(k="abc\"#), None);
    }

    #[test]
    fn test_unicode_whitespace() {
        assert_eq!(
            parse_line("TODO\u{a0}(k\u{3000}=\u{2003}v)\u{a0}:\u{a0}d\u{a0}"),
            annotation("d", vec![Attribute::new("k", "v")])
        );
    }

    #[test]
    fn test_multibyte_values() {
        assert_eq!(
            parse_line(r#"TODO(owner=José, note="ça, marche"): ünïcode"#),
            annotation(
                "ünïcode",
                vec![
                    Attribute::new("owner", "José"),
                    Attribute::quoted("note", "ça, marche"),
                ]
            )
        );
    }

    #[test]
    fn test_rejection_reasons() {
        assert_eq!(parse_after_marker("(a"), Err(Rejection::UnterminatedList));
        assert_eq!(parse_after_marker(r#"(a="b"#), Err(Rejection::UnterminatedQuote));
        assert_eq!(parse_after_marker(" fix"), Err(Rejection::MissingColon));
    }

    fn attribute_strategy() -> impl Strategy<Value = Attribute> {
        let key = "[a-zA-Z0-9_.-]{1,8}";
        prop_oneof![
            key.prop_map(Attribute::bare),
            (key, "[a-zA-Z0-9_./:-]{1,8}").prop_map(|(k, v)| Attribute::new(k, v)),
            (key, "\\PC{0,12}").prop_map(|(k, v)| Attribute::quoted(k, v)),
        ]
    }

    proptest! {
        #[test]
        fn test_lines_without_marker_never_match(line in any::<String>()) {
            prop_assume!(!line.contains(MARKER));
            prop_assert_eq!(parse_line(&line), None);
        }

        #[test]
        fn test_plain_todo_takes_trimmed_rest(rest in "\\PC*") {
            let line = format!("TODO:{}", rest);
            prop_assert_eq!(parse_line(&line), annotation(rest.trim(), vec![]));
            let spaced = format!("TODO \t:{}", rest);
            prop_assert_eq!(parse_line(&spaced), annotation(rest.trim(), vec![]));
        }

        #[test]
        fn test_attribute_key_never_hits_unexpected_char(list in "\\(\\PC{0,24}") {
            prop_assert!(!matches!(
                parse_after_marker(&list),
                Err(Rejection::UnexpectedChar(_))
            ));
        }

        #[test]
        fn test_reserialized_annotation_parses_back(
            attributes in prop::collection::vec(attribute_strategy(), 0..5),
            description in "[a-zA-Z0-9 ,.()=\"]{0,24}",
        ) {
            let original = Annotation {
                description: description.trim().to_string(),
                attributes,
            };
            prop_assert_eq!(parse_line(&original.to_string()), Some(original));
        }
    }
}
