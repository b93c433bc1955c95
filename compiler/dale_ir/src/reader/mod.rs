//! Minimal reader for test fixtures and module sources.
//!
//! Turns source text into top-level nodes. The reader is deliberately
//! small: it recognises parentheses, string literals (kept as atoms with
//! their quotes), `;` line comments and bare atoms. Numeric atoms are
//! validated so malformed numbers are reported with a location.

use crate::{Loc, Name, NodeArena, NodeId, StringInterner};

/// What went wrong while reading.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReadErrorKind {
    UnterminatedStringLiteral,
    /// An atom at top level; top-level forms must be lists.
    ExpectedLeftParen,
    /// End of input with an open list.
    MissingRightParen,
    /// A `)` with no matching `(`.
    MissingLeftParen,
    InvalidInteger,
    InvalidFloatingPointNumber,
}

/// Reader failure with the location it was detected at.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReadError {
    pub kind: ReadErrorKind,
    pub loc: Loc,
    /// Offending token text, when there is one.
    pub text: String,
}

struct Cursor<'s> {
    chars: std::iter::Peekable<std::str::Chars<'s>>,
    file: Name,
    line: u32,
    column: u32,
}

impl Cursor<'_> {
    fn loc(&self) -> Loc {
        Loc::new(self.file, self.line, self.column)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == ';' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }
}

/// Read every top-level form in `source`.
pub fn read_forms(
    source: &str,
    file: Name,
    interner: &StringInterner,
    arena: &mut NodeArena,
) -> Result<Vec<NodeId>, ReadError> {
    let mut cursor = Cursor {
        chars: source.chars().peekable(),
        file,
        line: 1,
        column: 1,
    };
    let mut forms = Vec::new();
    // Open lists: start location and collected children.
    let mut stack: Vec<(Loc, Vec<NodeId>)> = Vec::new();

    loop {
        cursor.skip_trivia();
        let loc = cursor.loc();
        let Some(c) = cursor.peek() else { break };

        let node = match c {
            '(' => {
                cursor.bump();
                stack.push((loc, Vec::new()));
                continue;
            }
            ')' => {
                cursor.bump();
                let Some((start, items)) = stack.pop() else {
                    return Err(ReadError {
                        kind: ReadErrorKind::MissingLeftParen,
                        loc,
                        text: ")".to_owned(),
                    });
                };
                arena.alloc_list(&items, start)
            }
            '"' if stack.is_empty() => {
                return Err(ReadError {
                    kind: ReadErrorKind::ExpectedLeftParen,
                    loc,
                    text: "\"".to_owned(),
                });
            }
            '"' => {
                let text = read_string(&mut cursor, loc)?;
                arena.alloc_atom(interner.intern(&text), loc)
            }
            _ => {
                let text = read_atom(&mut cursor);
                if stack.is_empty() {
                    return Err(ReadError {
                        kind: ReadErrorKind::ExpectedLeftParen,
                        loc,
                        text,
                    });
                }
                validate_number(&text, loc)?;
                arena.alloc_atom(interner.intern(&text), loc)
            }
        };

        match stack.last_mut() {
            Some((_, items)) => items.push(node),
            None => forms.push(node),
        }
    }

    if let Some((start, _)) = stack.pop() {
        return Err(ReadError {
            kind: ReadErrorKind::MissingRightParen,
            loc: start,
            text: String::new(),
        });
    }
    Ok(forms)
}

fn read_string(cursor: &mut Cursor<'_>, start: Loc) -> Result<String, ReadError> {
    let mut text = String::from('"');
    cursor.bump();
    loop {
        match cursor.bump() {
            None => {
                return Err(ReadError {
                    kind: ReadErrorKind::UnterminatedStringLiteral,
                    loc: start,
                    text,
                })
            }
            Some('\\') => {
                text.push('\\');
                if let Some(escaped) = cursor.bump() {
                    text.push(escaped);
                }
            }
            Some('"') => {
                text.push('"');
                return Ok(text);
            }
            Some(c) => text.push(c),
        }
    }
}

fn read_atom(cursor: &mut Cursor<'_>) -> String {
    let mut text = String::new();
    while let Some(c) = cursor.peek() {
        if c.is_whitespace() || c == '(' || c == ')' || c == ';' || c == '"' {
            break;
        }
        text.push(c);
        cursor.bump();
    }
    text
}

/// Atoms that start like a number must be one.
fn validate_number(text: &str, loc: Loc) -> Result<(), ReadError> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(());
    }
    let error = |kind| ReadError {
        kind,
        loc,
        text: text.to_owned(),
    };
    if digits.contains('.') {
        if digits.parse::<f64>().is_err() {
            return Err(error(ReadErrorKind::InvalidFloatingPointNumber));
        }
    } else if let Some(hex) = digits.strip_prefix("0x") {
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(error(ReadErrorKind::InvalidInteger));
        }
    } else if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(error(ReadErrorKind::InvalidInteger));
    }
    Ok(())
}
