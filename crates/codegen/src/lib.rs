//! # drygen-codegen
//!
//! Code generation backends for estimating the stack effects of EVM code without producing
//! bytecode.
//!
//! ## Overview
//!
//! A code generator writes into an [`assembly::AbstractAssembly`]. For a dry run it writes
//! into [`no_output::NoOutputAssembly`], which discards everything except the running stack
//! height, and resolves builtin calls through a dialect patched with
//! [`dialect::patch_for_dry_run`] so that builtins the no-output backend cannot lower
//! (immutables, linker symbols) still report their stack effect.
//!
//! ```text
//!   Expression ──► ExpressionCodegen ──► Dialect (Real | DryRun)
//!                         │                    │ builtin callbacks
//!                         ▼                    ▼
//!                  &mut dyn AbstractAssembly ◄─┘
//!                         │
//!                         ▼
//!                  NoOutputAssembly::stack_height()
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`assembly`] | Assembler interface, label and sub-assembly handles |
//! | [`no_output`] | Stack-height-only assembly backend |
//! | [`dialect`] | Builtin function tables and the dry-run patcher |
//! | [`codegen`] | Expression code generator |
//! | [`ast`] | Expression tree |
//! | [`errors`] | AssemblyError, CodegenError |
//!
//! ## Quick Start
//!
//! ```ignore
//! use drygen_codegen::{Dialect, EvmDialect, ExpressionCodegen, NoOutputAssembly, BuiltinContext};
//!
//! let dialect = Dialect::dry_run(&EvmDialect::new(Fork::Cancun, true));
//! let mut assembly = NoOutputAssembly::new();
//! let mut codegen = ExpressionCodegen::new(&dialect, &mut assembly, BuiltinContext::default());
//! codegen.visit_statement(&expression)?;
//! println!("Stack height: {}", codegen.stack_height());
//! ```

pub mod assembly;
pub mod ast;
pub mod codegen;
pub mod dialect;
pub mod errors;
pub mod no_output;
#[cfg(test)]
pub(crate) mod test_utils;

pub use assembly::{AbstractAssembly, JumpType, LabelId, SubId};
pub use ast::{Expression, FunctionCall};
pub use codegen::ExpressionCodegen;
pub use dialect::{BuiltinContext, BuiltinFunction, Dialect, EvmDialect, patch_for_dry_run};
pub use errors::{AssemblyError, CodegenError};
pub use no_output::NoOutputAssembly;
