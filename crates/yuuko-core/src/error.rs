//! error.rs — Erreur agrégée d'une traduction.
//!
//! Toutes les étapes remontent une seule `TranslationError` ; rien n'est
//! réessayé en interne. Le message d'une erreur de validation est la liste des
//! diagnostics, un par ligne.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::dictionary::ResourceError;
use crate::shield::ShieldError;
use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error(transparent)]
    Shield(#[from] ShieldError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("YK404 - Arquivo {} não encontrado.", .0.display())]
    NotFound(PathBuf),

    #[error("entrada grande demais: {size} bytes (máximo {max})")]
    InputTooLarge { size: usize, max: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl TranslationError {
    /// Diagnostics structurés si l'échec vient du validateur.
    pub fn diagnostics(&self) -> &[crate::validate::Diagnostic] {
        match self {
            Self::Validation(v) => &v.diagnostics,
            _ => &[],
        }
    }
}

pub type Result<T, E = TranslationError> = core::result::Result<T, E>;
