//! Source text to token strings.
//!
//! A single left-to-right scan with no backtracking. Parentheses are always
//! standalone tokens, whitespace (space, carriage return, newline) ends an
//! atom, and an atom starting with `"` runs until an unescaped `"`, spaces
//! included. Escape backslashes stay in the token text; unescaping happens in
//! the parser.
//!
//! An atom still in progress when the input ends is dropped, so a REPL line
//! needs its trailing newline:
//!
//! ```
//! use lisg::lexer::lex;
//!
//! assert_eq!(lex("x\n"), vec!["x"]);
//! assert!(lex("x").is_empty());
//! ```

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\r' | '\n')
}

/// In-progress atom state
#[derive(Debug, Default)]
struct Atom {
    text: String,
    /// Previous character was an unconsumed backslash inside a string literal
    escaped: bool,
}

impl Atom {
    fn is_string(&self) -> bool {
        self.text.starts_with('"')
    }
}

/// Split `source` into tokens. Never fails.
pub fn lex(source: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut atom: Option<Atom> = None;

    for c in source.chars() {
        match c {
            '(' => {
                // Emitted immediately; an in-progress atom keeps going around it.
                tokens.push("(".to_owned());
            }
            ')' => {
                if let Some(done) = atom.take() {
                    tokens.push(done.text);
                }
                tokens.push(")".to_owned());
            }
            _ => match atom.as_mut() {
                None if is_space(c) => {}
                None => {
                    atom = Some(Atom {
                        text: c.to_string(),
                        escaped: false,
                    });
                }
                Some(current) if current.is_string() => {
                    current.text.push(c);
                    if current.escaped {
                        current.escaped = false;
                    } else if c == '\\' {
                        current.escaped = true;
                    } else if c == '"' {
                        if let Some(done) = atom.take() {
                            tokens.push(done.text);
                        }
                    }
                }
                Some(_) if is_space(c) => {
                    if let Some(done) = atom.take() {
                        tokens.push(done.text);
                    }
                }
                Some(current) => current.text.push(c),
            },
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIB_CODE: &str = r#"
(define fib (n)
  (let loop ((n n)
             (a 1)
             (b 2))
    (loop (- n 1)
          b
          (+ a b))))"#;

    const STRING_CODE: &str = r#"
(define prepend-hello (s)
  (string-append "hello " s))"#;

    fn run_lex_tests(test_cases: Vec<(&str, Vec<&str>)>) {
        for (i, (input, expected)) in test_cases.into_iter().enumerate() {
            assert_eq!(lex(input), expected, "Lex test #{}: {input:?}", i + 1);
        }
    }

    #[test]
    fn test_lex_basic_forms() {
        run_lex_tests(vec![
            ("(+ 1 2)", vec!["(", "+", "1", "2", ")"]),
            ("", vec![]),
            ("   \r\n ", vec![]),
            ("()", vec!["(", ")"]),
            ("(())", vec!["(", "(", ")", ")"]),
            ("(defvar x 5)", vec!["(", "defvar", "x", "5", ")"]),
            ("(a\r\nb\nc )", vec!["(", "a", "b", "c", ")"]),
            // Closing paren flushes the atom before it
            ("(foo)", vec!["(", "foo", ")"]),
            ("1234.5 ", vec!["1234.5"]),
            // Tabs are not separators
            ("(a\tb)", vec!["(", "a\tb", ")"]),
        ]);
    }

    #[test]
    fn test_lex_trailing_atom_is_dropped() {
        run_lex_tests(vec![
            ("x", vec![]),
            ("(+ 1 2) x", vec!["(", "+", "1", "2", ")"]),
            ("x y", vec!["x"]),
            ("x\n", vec!["x"]),
            // Unterminated string literal never completes
            ("\"abc", vec![]),
        ]);
    }

    #[test]
    fn test_lex_strings() {
        run_lex_tests(vec![
            ("\"hi\"", vec!["\"hi\""]),
            ("\"hello world\" ", vec!["\"hello world\""]),
            ("(f \"a b\" c)", vec!["(", "f", "\"a b\"", "c", ")"]),
            // Escaped quote does not terminate, and the backslash is kept
            (r#""hello \" world""#, vec![r#""hello \" world""#]),
            // Escaped backslash does not escape the closing quote
            (r#""a\\" b "#, vec![r#""a\\""#, "b"]),
            ("\"\"", vec!["\"\""]),
            // A closing paren inside a string flushes the partial literal
            ("(\"a) b\" ", vec!["(", "\"a", ")", "b\""]),
        ]);
    }

    #[test]
    fn test_lex_open_paren_inside_atom() {
        // The paren is emitted on its own and never becomes part of the atom
        run_lex_tests(vec![("ab(cd ", vec!["(", "abcd"])]);
    }

    #[test]
    fn test_lex_fib_code() {
        assert_eq!(
            lex(FIB_CODE),
            vec![
                "(", "define", "fib", "(", "n", ")", "(", "let", "loop", "(", "(", "n", "n", ")",
                "(", "a", "1", ")", "(", "b", "2", ")", ")", "(", "loop", "(", "-", "n", "1", ")",
                "b", "(", "+", "a", "b", ")", ")", ")", ")",
            ]
        );
    }

    #[test]
    fn test_lex_string_code() {
        assert_eq!(
            lex(STRING_CODE),
            vec![
                "(",
                "define",
                "prepend-hello",
                "(",
                "s",
                ")",
                "(",
                "string-append",
                "\"hello \"",
                "s",
                ")",
                ")",
            ]
        );
    }
}
