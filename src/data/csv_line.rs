/// Splits one line of forecast CSV into its raw fields.
///
/// Commas only separate fields at the top level: never inside `[...]`, `{...}` or a
/// quoted run. A quoted run opens only when `"` is the first non-blank character of
/// a field, and closes at the next lone `"`. Inside it `""` and `\"` stand for a
/// literal quote. A `"` anywhere else in a field is plain text. Brackets are only
/// counted outside quoted runs and the depth never drops below 0. Unbalanced input
/// still splits, with whatever is left over as the final field. Fields are returned
/// as written; quotes and escapes are left for the consumer.
pub fn tokenize(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut depth: usize = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut at_field_start = true;
    let mut start = 0;
    let mut chars = line.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        let after_backslash = std::mem::replace(&mut escaped, false);

        if in_quotes {
            match ch {
                '\\' if !after_backslash => escaped = true,
                '"' if after_backslash => {}
                '"' => {
                    if matches!(chars.peek(), Some((_, '"'))) {
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                }
                _ => {}
            }
            continue;
        }

        match ch {
            '"' if at_field_start => in_quotes = true,
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                fields.push(&line[start..i]);
                start = i + 1;
                at_field_start = true;
                continue;
            }
            _ => {}
        }

        if !ch.is_whitespace() {
            at_field_start = false;
        }
    }

    fields.push(&line[start..]);
    fields
}

/// Trims a raw field and removes one pair of enclosing double quotes
pub fn unquote(field: &str) -> &str {
    let trimmed = field.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_plain() {
        assert_eq!(tokenize("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(tokenize(""), vec![""]);
        assert_eq!(tokenize("a,,"), vec!["a", "", ""]);
    }

    #[test]
    fn test_tokenize_nesting() {
        assert_eq!(tokenize("a,[1,2,3],b"), vec!["a", "[1,2,3]", "b"]);
        assert_eq!(
            tokenize("x,[{'height': 0.8, 'period': 9},{'height': 1}],y"),
            vec!["x", "[{'height': 0.8, 'period': 9},{'height': 1}]", "y"]
        );
    }

    #[test]
    fn test_tokenize_quoted() {
        let line = r#"2025-10-07 03:00:00,"Rain, heavy","[{""height"":1.05,""period"":11.2}]""#;
        assert_eq!(
            tokenize(line),
            vec![
                "2025-10-07 03:00:00",
                r#""Rain, heavy""#,
                r#""[{""height"":1.05,""period"":11.2}]""#,
            ]
        );
    }

    #[test]
    fn test_tokenize_backslash_escaped_quotes() {
        let line = r#"a,"[{\"height\":1.2,\"period\":10}]",b"#;
        assert_eq!(
            tokenize(line),
            vec!["a", r#""[{\"height\":1.2,\"period\":10}]""#, "b"]
        );
    }

    #[test]
    fn test_tokenize_unbalanced() {
        assert_eq!(tokenize("a],b,c"), vec!["a]", "b", "c"]);
        assert_eq!(tokenize("a,[1,2"), vec!["a", "[1,2"]);
        assert_eq!(tokenize("a,\"b,c"), vec!["a", "\"b,c"]);
    }

    #[test]
    fn test_tokenize_backslash_outside_quotes() {
        assert_eq!(tokenize(r"a\,b,c"), vec![r"a\", "b", "c"]);
        assert_eq!(tokenize(r"a\],b"), vec![r"a\]", "b"]);
        assert_eq!(tokenize(r"x,[1\,2],y"), vec!["x", r"[1\,2]", "y"]);
    }

    #[test]
    fn test_tokenize_stray_quote_is_plain_text() {
        let line = r#"2025-10-07 03:00:00,6" surf,36,[{"height":1.2}]"#;
        assert_eq!(
            tokenize(line),
            vec!["2025-10-07 03:00:00", r#"6" surf"#, "36", r#"[{"height":1.2}]"#]
        );
    }

    #[test]
    fn test_tokenize_quoted_after_leading_space() {
        assert_eq!(tokenize(r#"a, "b,c",d"#), vec!["a", r#" "b,c""#, "d"]);
        assert_eq!(tokenize(r#""say ""hi"", ok",x"#), vec![r#""say ""hi"", ok""#, "x"]);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(" \"CLEAR\" "), "CLEAR");
        assert_eq!(unquote("offshore "), "offshore");
        assert_eq!(unquote("\""), "\"");
    }
}
