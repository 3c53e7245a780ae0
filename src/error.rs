use std::io;

use thiserror::Error;

/// Errors raised while reading or writing configuration text.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read or write configuration data")]
    Io(#[from] io::Error),

    /// The line matched none of the recognized shapes.
    #[error("could not parse line: {line}")]
    Parse { line: String },

    /// Writing this text would produce a line that reads back differently.
    #[error("cannot write {text:?} without changing its meaning")]
    Unrepresentable { text: String },
}

/// Errors raised by the lookup helpers on [`Config`](crate::Config).
#[derive(Debug, Error)]
pub enum GetError {
    #[error("section not found: {section}")]
    SectionNotFound { section: String },

    #[error("option not found: {section}.{option}")]
    OptionNotFound { section: String, option: String },

    #[error("could not parse {kind} value: {value:?}")]
    InvalidValue { value: String, kind: &'static str },

    #[error(transparent)]
    Expand(#[from] ExpandError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("referenced option not found: {name}")]
    NotFound { name: String },

    #[error("possible cycle while expanding values")]
    TooDeep,
}
