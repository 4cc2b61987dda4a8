//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `relayer` library. It uses the `thiserror` library to create a single
//! `Error` enum that covers every way an edit invocation can fail, with
//! messages that name the offending key and the dotted scope it was found at.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors. The
//!   tree-mutation variants carry the key and scope, the syntax variants carry
//!   the raw text that could not be understood.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the library.
//!
//! Every error is fatal to the current invocation. The only place an error is
//! downgraded is the `ignore_not_found` switch of the removal batches, which
//! consults [`Error::is_not_found`].

use thiserror::Error;

/// Main error type for relayer operations
#[derive(Error, Debug)]
pub enum Error {
    /// The terminal key of a path does not exist and the operation may not
    /// create it.
    #[error("Key not found in dict: '{key}' at '{at}'")]
    KeyNotFound { key: String, at: String },

    /// An intermediate path segment does not exist and the operation may not
    /// create it.
    #[error("Subsection not found in dict: '{key}' at '{at}'")]
    SubsectionNotFound { key: String, at: String },

    /// The path continues past a scalar value.
    #[error("Leaf was found where subsection expected: '{key}' at '{at}' (use --add to overwrite)")]
    LeafWhereSubsectionExpected { key: String, at: String },

    /// An index, extend or insert request targets something that is not a list.
    #[error("Key is not a list: '{key}' at '{at}'")]
    NotAList { key: String, at: String },

    /// An index was given for a key that does not exist yet.
    #[error("List doesn't exist: '{key}' at '{at}'")]
    ListNotFound { key: String, at: String },

    /// A list position lies outside the list.
    #[error("Index out of range: '{key}[{index}]' (list length {len})")]
    IndexOutOfRange {
        key: String,
        index: usize,
        len: usize,
    },

    /// A symbolic index did not match any element of the list.
    #[error("List element not found: '{key}[{element}]'")]
    ListElementNotFound { key: String, element: String },

    /// A list element removal did not say which element to remove.
    #[error("No list element given for '{key}' (expected '{key}[element]')")]
    MissingListElement { key: String },

    /// An inline list or dictionary literal is malformed.
    #[error("Wrong value syntax in '{value}': {message}")]
    ValueSyntax { value: String, message: String },

    /// A raw request could not be split into a key and a value.
    #[error("Malformed request '{request}': {message}")]
    MalformedRequest { request: String, message: String },

    /// Neither the given configuration path nor its extension variant exists.
    #[error("Failed to find configuration file in provided path: {path}")]
    ConfigNotFound { path: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing or serialization error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether this error means "the thing to remove isn't there".
    ///
    /// These are the failures `ignore_not_found` turns into a silent no-op in
    /// the removal batches. Structural errors such as [`Error::NotAList`] are
    /// never included.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::KeyNotFound { .. }
                | Error::IndexOutOfRange { .. }
                | Error::ListElementNotFound { .. }
        )
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
