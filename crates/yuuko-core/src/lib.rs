//! yuuko-core — Cœur du traducteur YuukoLane (.yl) → Python
//!
//! Prend une source écrite dans le dialecte (mots-clés et opérateurs en
//! portugais), la réécrit en Python puis la valide avant de la rendre.
//! Aucune E/S hors lecture optionnelle d'un fichier : écrire le `.py` et lancer
//! l'interpréteur est l'affaire de `yuuko-cli`.
//!
//! ## Modules
//! - `lexer`       : tokens sans perte (chaînes, commentaires, mots, opérateurs).
//! - `shield`      : masquage/restauration des littéraux, table propre à la passe.
//! - `dictionary`  : vocabulaire du dialecte (JSON intégré ou externe).
//! - `rewrite`     : substitution des termes + `=` → `==` dans `if/elif/while`.
//! - `interpolate` : `mostrar "…{x}…"` → `print(f"…{x}…")`.
//! - `validate`    : diagnostics YK101 / YK102 / YK201 / YK202.
//! - `pipeline`    : `Translator`, enchaîne le tout.
//! - `config`      : limites + options (defaults, ENV `YUUKO_*`, overrides CLI).
//!
//! ```
//! let py = yuuko_core::translate("se x = 1:\n    mostrar 'um'\n").unwrap();
//! assert_eq!(py, "if x == 1:\n    print('um')\n");
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_must_use)]

// ---------- Modules publics ----------
pub mod config;
pub mod dictionary;
pub mod error;
pub mod interpolate;
pub mod lexer;
pub mod pipeline;
pub mod rewrite;
pub mod shield;
pub mod validate;

// ---------- Reexports de confort ----------
pub use config::{CliOverrides, Config, Limits};
pub use dictionary::{Dictionary, ResourceError};
pub use error::{Result, TranslationError};
pub use pipeline::{translate, Translator};
pub use shield::{LiteralTable, ShieldError, Shielded};
pub use validate::{Diagnostic, ValidationError};

// ---------- Version ----------
/// Version du crate (lisible, via Cargo).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bannière de version (utile pour logs/outils).
pub fn version() -> String {
    format!("yuuko-core {VERSION}")
}

// ---------- Prelude ----------
pub mod prelude {
    pub use crate::{
        shield::{mask, unmask},
        translate, Config, Diagnostic, Dictionary, Result, TranslationError, Translator,
    };
}
