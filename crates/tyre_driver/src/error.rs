use miette::{Diagnostic, SourceSpan};
use thiserror::Error;
use tyre_options::ConfigError;
use tyre_syntax::SyntaxError;
use tyre_traits::TableError;

/// Errors raised while loading or running a workspace. Type errors found
/// by the solver are not driver errors; they are reported per unit.
#[derive(Debug, Error, Diagnostic)]
pub enum DriverError {
    #[error("failed to read workspace: {0}")]
    #[diagnostic(code(tyre::driver::io))]
    Io(#[from] std::io::Error),

    #[error("invalid workspace JSON: {0}")]
    #[diagnostic(code(tyre::driver::json))]
    Json(#[from] serde_json::Error),

    #[error("invalid type `{text}`: {error}")]
    #[diagnostic(code(tyre::driver::syntax))]
    Syntax {
        #[source_code]
        text: String,
        #[label("{error}")]
        span: SourceSpan,
        error: SyntaxError,
    },

    #[error(transparent)]
    #[diagnostic(code(tyre::driver::table))]
    Table(#[from] TableError),

    #[error(transparent)]
    #[diagnostic(code(tyre::driver::config))]
    Config(#[from] ConfigError),

    #[error("unit '{unit}' uses type variable {var} but declares only {declared}")]
    #[diagnostic(code(tyre::driver::unknown_variable), help("raise the unit's \"variables\" count"))]
    UnknownVariable { unit: String, var: String, declared: u32 },

    #[error("unit '{unit}' declares {declared} type variables; at most {max} are allowed")]
    #[diagnostic(code(tyre::driver::too_many_variables))]
    TooManyVariables { unit: String, declared: u32, max: u32 },

    #[error("unknown literal kind '{0}'")]
    #[diagnostic(
        code(tyre::driver::unknown_literal),
        help("literal kinds are integer, float, string and boolean")
    )]
    UnknownLiteral(String),

    #[error("failed to start worker pool: {0}")]
    #[diagnostic(code(tyre::driver::pool))]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl DriverError {
    pub(crate) fn syntax(text: &str, error: SyntaxError) -> Self {
        DriverError::Syntax {
            text: text.to_string(),
            span: error.span(),
            error,
        }
    }
}
