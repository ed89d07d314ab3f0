//! Generics for Go by source rewriting.
//!
//! A template package marks itself with a `// template type Name(A, B)`
//! comment and declares stubs for its parameters. [`instantiate::instantiate`]
//! copies it with the stubs removed, the parameters replaced by concrete
//! arguments and every other top-level name renamed for the instance.

pub mod cli;
pub mod config;
pub mod diag;
pub mod error;
pub mod frontend;
pub mod instantiate;
pub mod middle;
pub mod resolve;
pub mod utils;

pub use error::TemplateError;
pub use instantiate::{expand, instantiate, Options, Outcome, Request};
