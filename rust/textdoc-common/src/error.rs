use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn empty_input(context: impl Into<String>) -> Error {
        Error(
            ErrorKind::EmptyInput {
                context: context.into(),
            }
            .into(),
        )
    }

    pub fn tokenization<E>(tokenizer: impl Into<String>, source: E) -> Error
    where
        E: Into<StdErrorBoxed>,
    {
        Error(
            ErrorKind::Tokenization {
                tokenizer: tokenizer.into(),
                source: source.into(),
            }
            .into(),
        )
    }

    pub fn corrupt_document(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::CorruptDocument {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn unknown_tag_type(type_name: impl Into<String>) -> Error {
        Error(
            ErrorKind::UnknownTagType {
                type_name: type_name.into(),
            }
            .into(),
        )
    }

    pub fn unsupported_mutation(operation: impl Into<String>) -> Error {
        Error(
            ErrorKind::UnsupportedMutation {
                operation: operation.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    pub fn is_corrupt_document(&self) -> bool {
        matches!(self.kind(), ErrorKind::CorruptDocument { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("empty input: {context}")]
    EmptyInput { context: String },

    #[error("tokenizer '{tokenizer}' failed: {source}")]
    Tokenization {
        tokenizer: String,
        source: StdErrorBoxed,
    },

    #[error("corrupt document, '{element}': {message}")]
    CorruptDocument { element: String, message: String },

    #[error("unknown tag type '{type_name}'")]
    UnknownTagType { type_name: String },

    #[error("unsupported mutation '{operation}' on a read-only view")]
    UnsupportedMutation { operation: String },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = Error::corrupt_document("term_index", "17 is out of bounds (len 3)");
        assert!(err.is_corrupt_document());
        assert_eq!(
            err.to_string(),
            "corrupt document, 'term_index': 17 is out of bounds (len 3)"
        );

        let err = Error::unknown_tag_type("ABNER");
        assert_eq!(err.to_string(), "unknown tag type 'ABNER'");
        assert!(!err.is_corrupt_document());
    }

    #[test]
    fn test_tokenization_error_keeps_source() {
        let source = std::io::Error::other("model not loaded");
        let err = Error::tokenization("unicode-sentence", source);
        match err.into_kind() {
            ErrorKind::Tokenization { tokenizer, source } => {
                assert_eq!(tokenizer, "unicode-sentence");
                assert_eq!(source.to_string(), "model not loaded");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }
}
