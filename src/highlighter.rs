// ABOUTME: Syntax highlighter for the REPL -- implements rustyline's
// Highlighter trait, colorizing strings, numbers, comments, control sigils,
// and punctuation while preserving the line's exact display width.

use rustyline::Helper;
use rustyline::completion::Completer;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use std::borrow::Cow;
use std::collections::HashSet;

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_PUNCTUATION: &str = "\x1b[1;34m"; // Bold blue
const COLOR_SIGIL: &str = "\x1b[1;35m"; // Bold magenta
const COLOR_BUILTIN: &str = "\x1b[36m"; // Cyan
const COLOR_NUMBER: &str = "\x1b[33m"; // Yellow
const COLOR_STRING: &str = "\x1b[32m"; // Green
const COLOR_BOOLEAN: &str = "\x1b[33m"; // Yellow
const COLOR_COMMENT: &str = "\x1b[90m"; // Bright black (gray)

/// Rustyline helper providing syntax-aware color highlighting for Zox source
/// typed at the REPL prompt.
pub struct ZoxHelper;

impl ZoxHelper {
    pub fn new() -> Self {
        ZoxHelper
    }
}

impl Default for ZoxHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Helper for ZoxHelper {}

impl Completer for ZoxHelper {
    type Candidate = String;
}

impl Hinter for ZoxHelper {
    type Hint = String;
}

impl Validator for ZoxHelper {}

impl Highlighter for ZoxHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let builtins = get_builtins();
        let highlighted = highlight_line(line, &builtins);
        if highlighted == line {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(highlighted)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn highlight_line(line: &str, builtins: &HashSet<&'static str>) -> String {
    let mut result = String::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            // Comments: -# to end of line.
            '-' if i + 1 < chars.len() && chars[i + 1] == '#' => {
                result.push_str(COLOR_COMMENT);
                while i < chars.len() {
                    result.push(chars[i]);
                    i += 1;
                }
                result.push_str(COLOR_RESET);
            }

            '"' => {
                result.push_str(COLOR_STRING);
                result.push('"');
                i += 1;
                while i < chars.len() {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        result.push(chars[i]);
                        result.push(chars[i + 1]);
                        i += 2;
                    } else if chars[i] == '"' {
                        result.push('"');
                        i += 1;
                        break;
                    } else {
                        result.push(chars[i]);
                        i += 1;
                    }
                }
                result.push_str(COLOR_RESET);
            }

            '0'..='9' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let number: String = chars[start..i].iter().collect();
                result.push_str(COLOR_NUMBER);
                result.push_str(&number);
                result.push_str(COLOR_RESET);
            }

            // Control sigils: if/while/for/func-def/import.
            '?' | '#' | '@' | '$' => {
                result.push_str(COLOR_SIGIL);
                result.push(chars[i]);
                i += 1;
                result.push_str(COLOR_RESET);
            }
            '~' if i + 1 < chars.len() && chars[i + 1] == '>' => {
                result.push_str(COLOR_SIGIL);
                result.push('~');
                result.push('>');
                i += 2;
                result.push_str(COLOR_RESET);
            }

            '(' | ')' | '[' | ']' | '{' | '}' | '|' | '<' | '>' => {
                result.push_str(COLOR_PUNCTUATION);
                result.push(chars[i]);
                i += 1;
                result.push_str(COLOR_RESET);
            }

            ' ' | '\t' | '\n' | '\r' => {
                result.push(chars[i]);
                i += 1;
            }

            _ => {
                let start = i;
                while i < chars.len() && is_identifier_char(chars[i]) {
                    i += 1;
                }
                if i == start {
                    result.push(chars[i]);
                    i += 1;
                    continue;
                }
                let word: String = chars[start..i].iter().collect();
                if word == "true" || word == "false" || word == "nil" {
                    result.push_str(COLOR_BOOLEAN);
                    result.push_str(&word);
                    result.push_str(COLOR_RESET);
                } else if word == "as" {
                    result.push_str(COLOR_SIGIL);
                    result.push_str(&word);
                    result.push_str(COLOR_RESET);
                } else if builtins.contains(word.as_str()) {
                    result.push_str(COLOR_BUILTIN);
                    result.push_str(&word);
                    result.push_str(COLOR_RESET);
                } else {
                    result.push_str(&word);
                }
            }
        }
    }

    result
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

fn get_builtins() -> HashSet<&'static str> {
    ["print", "println", "len", "type", "math", "abs", "sqrt", "let"].iter().copied().collect()
}
