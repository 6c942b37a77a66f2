use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Errors produced while reading the type notation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SyntaxError {
    #[error("unexpected character '{ch}'")]
    #[diagnostic(code(tyre::syntax::unexpected_char))]
    UnexpectedChar {
        ch: char,
        #[label("not part of the type notation")]
        span: SourceSpan,
    },

    #[error("invalid type variable '{text}'")]
    #[diagnostic(code(tyre::syntax::invalid_variable), help("type variables are written ?0, ?1, ..."))]
    InvalidVariable {
        text: String,
        #[label("expected a number after '?'")]
        span: SourceSpan,
    },

    #[error("expected {expected}, found {found}")]
    #[diagnostic(code(tyre::syntax::unexpected_token))]
    UnexpectedToken {
        expected: String,
        found: String,
        #[label("unexpected token here")]
        span: SourceSpan,
    },

    #[error("unknown literal kind '{keyword}'")]
    #[diagnostic(
        code(tyre::syntax::unknown_literal),
        help("literal types are #integer, #float, #string and #boolean")
    )]
    UnknownLiteralKind {
        keyword: String,
        #[label("unknown literal kind")]
        span: SourceSpan,
    },

    #[error("parameter convention '{keyword}' outside a function type")]
    #[diagnostic(code(tyre::syntax::misplaced_convention))]
    MisplacedConvention {
        keyword: String,
        #[label("only function parameters take a convention")]
        span: SourceSpan,
    },

    #[error("generic parameter '{name}' cannot take arguments")]
    #[diagnostic(code(tyre::syntax::parameter_arguments))]
    ParameterWithArguments {
        name: String,
        #[label("declared as a generic parameter")]
        span: SourceSpan,
    },
}

impl SyntaxError {
    pub fn span(&self) -> SourceSpan {
        match self {
            SyntaxError::UnexpectedChar { span, .. }
            | SyntaxError::InvalidVariable { span, .. }
            | SyntaxError::UnexpectedToken { span, .. }
            | SyntaxError::UnknownLiteralKind { span, .. }
            | SyntaxError::MisplacedConvention { span, .. }
            | SyntaxError::ParameterWithArguments { span, .. } => *span,
        }
    }
}
