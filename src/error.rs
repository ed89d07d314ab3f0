//! Error taxonomy for template instantiation.

use std::path::PathBuf;

use crate::frontend::span::Span;
use crate::frontend::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Missing, duplicate or incomplete `// template type` directive
    #[error("{message}")]
    Definition { message: String, span: Option<Span> },

    #[error("wrong number of arguments: template is expecting {expected} but {supplied} supplied")]
    Arity { expected: usize, supplied: usize, span: Option<Span> },

    /// A call or parameter that is not of the expected form
    #[error("{message}")]
    Shape { message: String, span: Option<Span> },

    #[error("{0}")]
    Resolution(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rewrite broke a structural invariant of the tree
    #[error("internal error: {0}")]
    Internal(String),

    #[error("failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: ParseError,
    },
}

impl TemplateError {
    pub fn definition(message: impl Into<String>, span: Option<Span>) -> Self {
        TemplateError::Definition { message: message.into(), span }
    }

    pub fn shape(message: impl Into<String>, span: Option<Span>) -> Self {
        TemplateError::Shape { message: message.into(), span }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TemplateError::Io { path: path.into(), source }
    }

    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            TemplateError::Definition { .. } => "GT0001",
            TemplateError::Arity { .. } => "GT0002",
            TemplateError::Shape { .. } => "GT0003",
            TemplateError::Resolution(_) => "GT0004",
            TemplateError::Io { .. } => "GT0005",
            TemplateError::Internal(_) => "GT0006",
            TemplateError::Parse { .. } => "GT0007",
        }
    }

    /// Location inside the template source, when there is one
    pub fn span(&self) -> Option<Span> {
        match self {
            TemplateError::Definition { span, .. }
            | TemplateError::Arity { span, .. }
            | TemplateError::Shape { span, .. } => *span,
            TemplateError::Parse { source, .. } => Some(source.span),
            TemplateError::Resolution(_) | TemplateError::Io { .. } | TemplateError::Internal(_) => None,
        }
    }
}
