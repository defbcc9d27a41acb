//! Shell-style word splitting
//!
//! Follows POSIX shell quoting: single quotes are literal, inside double
//! quotes a backslash only escapes `"` and `\`, and a backslash outside
//! quotes escapes the next character.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WordsError {
    #[error("No closing quotation")]
    UnclosedQuote,

    #[error("No escaped character")]
    TrailingEscape,
}

/// Splits a line into shell words
pub fn split_words(line: &str) -> Result<Vec<String>, WordsError> {
    let mut words = Vec::new();
    let mut current: Option<String> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if let Some(word) = current.take() {
                    words.push(word);
                }
            }
            '\'' => {
                let word = current.get_or_insert_with(String::new);
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => word.push(c),
                        None => return Err(WordsError::UnclosedQuote),
                    }
                }
            }
            '"' => {
                let word = current.get_or_insert_with(String::new);
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(e @ ('"' | '\\')) => word.push(e),
                            Some(other) => {
                                word.push('\\');
                                word.push(other);
                            }
                            None => return Err(WordsError::UnclosedQuote),
                        },
                        Some(c) => word.push(c),
                        None => return Err(WordsError::UnclosedQuote),
                    }
                }
            }
            '\\' => match chars.next() {
                Some(escaped) => current.get_or_insert_with(String::new).push(escaped),
                None => return Err(WordsError::TrailingEscape),
            },
            c => current.get_or_insert_with(String::new).push(c),
        }
    }

    if let Some(word) = current {
        words.push(word);
    }
    Ok(words)
}

/// Splits shell words, falling back to plain whitespace splitting when
/// the quoting is unbalanced
pub fn split_words_lenient(line: &str) -> Vec<String> {
    split_words(line)
        .unwrap_or_else(|_| line.split_whitespace().map(str::to_string).collect())
}
