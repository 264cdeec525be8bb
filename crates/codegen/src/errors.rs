use thiserror::Error;

/// Errors raised by an [`AbstractAssembly`](crate::assembly::AbstractAssembly) backend.
///
/// These are internal errors: a code generator that receives one must abort the pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("Unsupported capability: {0}")]
    UnsupportedCapability(&'static str),
}

/// Errors raised while generating code for an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error("Unknown function `{0}`")]
    UnknownFunction(String),
    #[error("Unknown identifier `{0}`")]
    UnknownIdentifier(String),
    #[error("Unknown data object `{0}`")]
    UnknownDataObject(String),
    #[error("Function `{name}` expects {expected} arguments, got {got}")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("Argument {index} of `{name}` must be a literal")]
    LiteralArgumentExpected { name: String, index: usize },
    #[error("String literal is longer than 32 bytes: {0:?}")]
    StringLiteralTooLong(String),
    #[error("Variable `{0}` is out of reach of DUP16")]
    StackTooDeep(String),
    #[error("Expression statement changed the stack height by {0}")]
    UnbalancedStatement(i64),
}
