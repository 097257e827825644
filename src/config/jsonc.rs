// src/config/jsonc.rs

//! Normalisation of "JSON with comments" into strict JSON.
//!
//! Project files in the TypeScript ecosystem tolerate `//` line comments,
//! `/* */` block comments and trailing commas before `}` / `]`. None of these
//! are honoured inside string literals. [`normalize`] removes them so the
//! result can be handed to `serde_json`.

/// Strip comments and trailing commas, leaving string literals untouched.
///
/// Line comments keep their terminating newline so line numbers in parse
/// errors still point at the right place.
pub fn normalize(input: &str) -> String {
    remove_trailing_commas(&strip_comments(input))
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                chars.next();
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

fn remove_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(&escaped) = chars.get(i + 1) {
                    out.push(escaped);
                    i += 1;
                }
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn comments_and_trailing_commas_parse_like_strict_json() {
        let loose = r#"{
            // x
            "include": ["src/**/*.ts", /* y */ "lib",],
            "compilerOptions": { "strict": true, },
        }"#;
        let strict = r#"{
            "include": ["src/**/*.ts", "lib"],
            "compilerOptions": { "strict": true }
        }"#;

        let a: Value = serde_json::from_str(&normalize(loose)).unwrap();
        let b: Value = serde_json::from_str(strict).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn comment_markers_inside_strings_are_kept() {
        let input = r#"{ "url": "http://example.com/*x*/", "glob": "src/**/*" }"#;
        let v: Value = serde_json::from_str(&normalize(input)).unwrap();
        assert_eq!(v["url"], "http://example.com/*x*/");
        assert_eq!(v["glob"], "src/**/*");
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let input = r#"{ "a": "say \"// hi\",]" , }"#;
        let v: Value = serde_json::from_str(&normalize(input)).unwrap();
        assert_eq!(v["a"], r#"say "// hi",]"#);
    }

    #[test]
    fn line_comment_keeps_newline() {
        assert_eq!(strip_comments("1 // c\n2"), "1 \n2");
    }
}
