#![forbid(unsafe_code)]

use nucleon_lens::Path;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// `view_path` was given the wrong number of lens paths.
    #[error("view expects exactly {expected} lens path argument, got {got}")]
    Arity { expected: usize, got: usize },

    /// A molecule write does not fit the molecule's template.
    #[error("Molecule cannot change the template at {path}: {reason}")]
    TemplateShape { path: Path, reason: String },
}

impl Error {
    #[must_use]
    pub fn template_shape(path: &Path, reason: impl Into<String>) -> Self {
        Self::TemplateShape {
            path: path.clone(),
            reason: reason.into(),
        }
    }
}
