//! Error types for archive operations.
//!
//! Every recoverable failure carries the slash-joined path of the blocks that
//! were open when it happened and the name of the offending element, so a
//! top-level caller can report a single useful message.

use thiserror::Error;

/// Field-less discriminant of [`Error`], convenient for matching in callers
/// and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    IoFailure,
    DuplicateElement,
    ElementNotFound,
    UnexpectedElementValue,
    UnexpectedEof,
}

/// Main error type for archive operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The underlying stream or tree failed at the byte level.
    #[error("I/O failure in block '{block_path}' at element '{element}': {message}")]
    IoFailure {
        block_path: String,
        element: String,
        message: String,
    },

    /// A name was used twice in one Unordered or Map scope.
    #[error("Duplicate element '{element}' in block '{block_path}'")]
    DuplicateElement { block_path: String, element: String },

    /// A required child is absent.
    #[error("Element '{element}'{} not found in block '{block_path}'", format_index(.index))]
    ElementNotFound {
        block_path: String,
        element: String,
        index: Option<usize>,
    },

    /// The element exists but has the wrong shape or type.
    #[error("Unexpected value of element '{element}' in block '{block_path}': {message}")]
    UnexpectedElementValue {
        block_path: String,
        element: String,
        message: String,
    },

    /// Access attempted after the root block was closed.
    #[error("Unexpected end of archive at element '{element}' (block '{block_path}')")]
    UnexpectedEof { block_path: String, element: String },
}

fn format_index(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" (index {})", i),
        None => String::new(),
    }
}

impl Error {
    /// Create an I/O failure.
    pub fn io(block_path: impl Into<String>, element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IoFailure {
            block_path: block_path.into(),
            element: element.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate element error.
    pub fn duplicate(block_path: impl Into<String>, element: impl Into<String>) -> Self {
        Self::DuplicateElement {
            block_path: block_path.into(),
            element: element.into(),
        }
    }

    /// Create an element-not-found error, optionally with the item index.
    pub fn not_found(
        block_path: impl Into<String>,
        element: impl Into<String>,
        index: Option<usize>,
    ) -> Self {
        Self::ElementNotFound {
            block_path: block_path.into(),
            element: element.into(),
            index,
        }
    }

    /// Create an unexpected-value error.
    pub fn unexpected(
        block_path: impl Into<String>,
        element: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::UnexpectedElementValue {
            block_path: block_path.into(),
            element: element.into(),
            message: message.into(),
        }
    }

    /// Create an unexpected end-of-archive error.
    pub fn eof(block_path: impl Into<String>, element: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            block_path: block_path.into(),
            element: element.into(),
        }
    }

    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IoFailure { .. } => ErrorKind::IoFailure,
            Self::DuplicateElement { .. } => ErrorKind::DuplicateElement,
            Self::ElementNotFound { .. } => ErrorKind::ElementNotFound,
            Self::UnexpectedElementValue { .. } => ErrorKind::UnexpectedElementValue,
            Self::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
        }
    }

    /// Block path at which the error was raised.
    pub fn block_path(&self) -> &str {
        match self {
            Self::IoFailure { block_path, .. }
            | Self::DuplicateElement { block_path, .. }
            | Self::ElementNotFound { block_path, .. }
            | Self::UnexpectedElementValue { block_path, .. }
            | Self::UnexpectedEof { block_path, .. } => block_path,
        }
    }

    /// Name of the offending element.
    pub fn element(&self) -> &str {
        match self {
            Self::IoFailure { element, .. }
            | Self::DuplicateElement { element, .. }
            | Self::ElementNotFound { element, .. }
            | Self::UnexpectedElementValue { element, .. }
            | Self::UnexpectedEof { element, .. } => element,
        }
    }
}

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::not_found("Root/Settings", "width", Some(3));
        let text = e.to_string();
        assert!(text.contains("width"));
        assert!(text.contains("index 3"));
        assert!(text.contains("Root/Settings"));

        let e = Error::duplicate("Root", "x");
        assert_eq!(e.kind(), ErrorKind::DuplicateElement);
        assert_eq!(e.block_path(), "Root");
        assert_eq!(e.element(), "x");
    }

    #[test]
    fn test_error_without_index() {
        let e = Error::not_found("Root", "name", None);
        assert!(!e.to_string().contains("index"));
    }
}
