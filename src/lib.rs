//! midlc: MIDL front end
//!
//! Tokenizes Microsoft IDL sources, evaluates constant expressions, builds
//! the declaration model, resolves type references across files and computes
//! the wire layout of fields (pointer levels, conformant and varying array
//! dimensions, strings).
//!
//! # Example
//!
//! ```no_run
//! use midlc::{tokenize, Result};
//!
//! fn main() -> Result<()> {
//!     let tokens = tokenize("typedef [string] wchar_t *LPWSTR;")?;
//!     println!("{} tokens", tokens.len());
//!     Ok(())
//! }
//! ```

#![warn(rust_2018_idioms)]

// Public modules
pub mod frontend;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use thiserror::Error;

pub use frontend::{Frontend, Grammar};

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::frontend::lexer::Token;
use crate::frontend::module::{bootstrap, File};
use crate::util::config::FrontendConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tool name
pub const NAME: &str = "midlc";

/// Tokenize source text
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Ok(frontend::lexer::tokenize(source)?)
}

/// Tokenize a file
pub fn tokenize_file(path: &Path) -> Result<Vec<Token>> {
    debug!("tokenizing {}", path.display());
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    tokenize(&source).with_context(|| format!("Failed to tokenize: {}", path.display()))
}

/// Built-in declarations as pretty-printed JSON
pub fn bootstrap_json() -> Result<String> {
    serde_json::to_string_pretty(&bootstrap()).context("Failed to serialize bootstrap file")
}

/// Parse a file and its imports with a fresh registry
pub fn parse_file(
    path: &Path,
    grammar: Arc<dyn Grammar>,
    config: &FrontendConfig,
) -> Result<Arc<File>> {
    let mut frontend = Frontend::new(config, grammar);
    frontend
        .load_file(path)
        .with_context(|| format!("Failed to parse: {}", path.display()))
}
