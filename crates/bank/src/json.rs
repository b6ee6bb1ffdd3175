use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use quiz_core::model::{Module, Question};

use crate::{BankError, ModuleProvider};

/// On-disk shape of one question record inside a module file.
///
/// Raw records carry no invariants; they are promoted into domain values
/// through the validating `quiz-core` constructors.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    number: u32,
    text: String,
    options: Vec<String>,
    correct_option: String,
}

/// Loads modules from a directory of `<name>.json` files, each holding a
/// JSON array of question records.
#[derive(Debug, Clone)]
pub struct JsonModuleLoader {
    folder: PathBuf,
}

impl JsonModuleLoader {
    #[must_use]
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    fn module_path(&self, name: &str) -> PathBuf {
        self.folder.join(format!("{name}.json"))
    }
}

impl ModuleProvider for JsonModuleLoader {
    fn available_modules(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.folder) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    path.file_stem()
                        .and_then(|stem| stem.to_str())
                        .map(str::to_owned)
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        names
    }

    fn load_module(&self, name: &str) -> Result<Module, BankError> {
        let path = self.module_path(name);
        if !path.exists() {
            return Err(BankError::NotFound(name.to_owned()));
        }

        let file = path.display().to_string();
        let raw = fs::read_to_string(&path).map_err(|source| BankError::Io {
            file: file.clone(),
            source,
        })?;

        let records: Vec<RawQuestion> =
            serde_json::from_str(&raw).map_err(|err| BankError::Malformed {
                file: file.clone(),
                reason: err.to_string(),
            })?;

        let mut questions = Vec::with_capacity(records.len());
        for (idx, record) in records.into_iter().enumerate() {
            let question = Question::new(
                record.number,
                record.text,
                record.options,
                record.correct_option,
            )
            .map_err(|err| BankError::Malformed {
                file: file.clone(),
                reason: format!("question {}: {err}", idx + 1),
            })?;
            questions.push(question);
        }

        Module::new(name, questions).map_err(|err| BankError::Malformed {
            file,
            reason: err.to_string(),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
