//! MIDL front end
//!
//! Lexer, constant expressions, the declaration model, the file registry and
//! the layout resolver. The grammar that drives a parse is supplied by the
//! embedder through [`driver::Grammar`].

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

pub mod builder;
pub mod driver;
pub mod error;
pub mod expr;
pub mod layout;
pub mod lexer;
pub mod module;
pub mod types;

pub use driver::{parse, Definition, Grammar, Importer, ParseContext};
pub use error::ParseError;
pub use layout::{Layout, LayoutError};
pub use module::{File, Loader, ModuleError, Registry};

use crate::util::config::FrontendConfig;

/// Compilation run: one registry shared by every file loaded through it
pub struct Frontend {
    loader: Loader,
}

impl Frontend {
    /// Create a front end with a fresh registry holding the bootstrap file
    pub fn new(
        config: &FrontendConfig,
        grammar: Arc<dyn Grammar>,
    ) -> Self {
        Self::with_registry(config, grammar, Arc::new(Registry::with_bootstrap()))
    }

    pub fn with_registry(
        config: &FrontendConfig,
        grammar: Arc<dyn Grammar>,
        registry: Arc<Registry>,
    ) -> Self {
        Self {
            loader: Loader::new(config, grammar, registry),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.loader.registry()
    }

    /// Load a file by import name, along with everything it imports
    pub fn load(
        &mut self,
        name: &str,
    ) -> Result<Arc<File>, ModuleError> {
        debug!("loading '{}'", name);
        self.loader.load(name)
    }

    /// Load a file by path
    pub fn load_file(
        &mut self,
        path: &Path,
    ) -> Result<Arc<File>, ModuleError> {
        debug!("loading {}", path.display());
        self.loader.load_path(path)
    }

    /// Layout of a struct field, resolving names through the registry
    pub fn field_layout(
        &self,
        field: &types::Field,
    ) -> Result<Layout, LayoutError> {
        layout::field_layout(self.registry().as_ref(), field)
    }
}
