// ABOUTME: Error types for lexing, parsing, and evaluation failures

use thiserror::Error;

/// The six error kinds Zox distinguishes. Every lex/parse/eval function
/// returns `Result<T, ZoxError>`; drivers install the single top-level
/// catch point described by the language's error handling design.
#[derive(Error, Debug, Clone)]
pub enum ZoxError {
    #[error("Lexical error at {line}:{column}: {message}")]
    Lexical {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Parse error at {line}:{column}: {message} (got {lexeme:?})")]
    Parse {
        message: String,
        lexeme: String,
        line: usize,
        column: usize,
    },

    #[error("Name error: {message}")]
    Name { message: String },

    #[error("Type error: {message}")]
    Type { message: String },

    #[error("Value error: {message}")]
    Value { message: String },

    #[error("Module error: {message}")]
    Module { message: String },
}

impl ZoxError {
    pub fn lexical(message: impl Into<String>, line: usize, column: usize) -> Self {
        ZoxError::Lexical {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn parse(message: impl Into<String>, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        ZoxError::Parse {
            message: message.into(),
            lexeme: lexeme.into(),
            line,
            column,
        }
    }

    pub fn name(message: impl Into<String>) -> Self {
        ZoxError::Name {
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        ZoxError::Type {
            message: message.into(),
        }
    }

    pub fn value(message: impl Into<String>) -> Self {
        ZoxError::Value {
            message: message.into(),
        }
    }

    pub fn module(message: impl Into<String>) -> Self {
        ZoxError::Module {
            message: message.into(),
        }
    }
}
