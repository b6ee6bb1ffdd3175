#![forbid(unsafe_code)]

mod json;

pub use json::JsonModuleLoader;

use thiserror::Error;

use quiz_core::model::Module;

/// Errors surfaced by question-bank providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("module {0:?} not found")]
    NotFound(String),

    #[error("malformed quiz content in {file}: {reason}")]
    Malformed { file: String, reason: String },

    #[error("failed reading {file}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

/// Provider contract for question banks.
///
/// A returned `Module` already satisfies the data-model invariants; sessions
/// consume it without re-validating individual questions.
pub trait ModuleProvider {
    /// Names of the modules this provider can load, sorted.
    fn available_modules(&self) -> Vec<String>;

    /// Load one module by name.
    ///
    /// # Errors
    ///
    /// Returns `BankError::NotFound` when no content exists under `name`,
    /// `BankError::Malformed` when the content fails validation, or
    /// `BankError::Io` when the backing store cannot be read.
    fn load_module(&self, name: &str) -> Result<Module, BankError>;
}
