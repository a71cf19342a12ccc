//! pipeline.rs — Orchestrateur de la traduction YuukoLane → Python.
//!
//! Étapes :
//!   source → shield::mask → rewrite → interpolate → validate (texte blindé)
//!          → shield::unmask → Python
//!
//! Tout ou rien : au moindre diagnostic, aucune sortie partielle.
//! Aucun état global : la table des littéraux vit le temps d'un appel, le
//! dictionnaire est partagé en lecture seule (plusieurs threads peuvent
//! traduire en parallèle avec le même `Translator`).

use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info};

use crate::config::Config;
use crate::dictionary::Dictionary;
use crate::error::{Result, TranslationError};
use crate::interpolate::Interpolator;
use crate::rewrite::Rewriter;
use crate::shield::Shield;
use crate::validate::{ValidationError, Validator};

#[derive(Debug, Clone)]
pub struct Translator<'d> {
    config: Config,
    shield: Shield,
    rewriter: Rewriter<'d>,
    interpolator: Interpolator,
    validator: Validator,
}

impl<'d> Translator<'d> {
    pub fn new(dict: &'d Dictionary, config: Config) -> Self {
        Self {
            shield: Shield::from_config(&config),
            rewriter: Rewriter::new(dict),
            interpolator: Interpolator::from_config(&config, dict),
            validator: Validator::new(dict),
            config,
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Traduit une unité source complète.
    pub fn translate(&self, source: &str) -> Result<String> {
        let max = self.config.limits.max_input_bytes;
        if source.len() > max {
            return Err(TranslationError::InputTooLarge { size: source.len(), max });
        }

        let mut shielded = self.shield.mask(source)?;
        debug!("mask: {} littéraux", shielded.table.len());

        let rewritten = self.rewriter.rewrite(&shielded);
        let text = self.interpolator.apply(&rewritten, &mut shielded.table);
        debug!("rewrite: {} → {} octets", source.len(), text.len());

        let diagnostics = self.validator.validate_rewritten(&text, &shielded.table, &shielded.text);
        shielded.text = text;
        if !diagnostics.is_empty() {
            debug!("validate: {} diagnostics", diagnostics.len());
        }
        ValidationError::check(diagnostics)?;

        Ok(shielded.unmask())
    }

    /// Lit `path` (UTF-8) puis traduit.
    pub fn translate_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TranslationError::NotFound(path.to_path_buf()),
            _ => TranslationError::Io(e),
        })?;
        let out = self.translate(&source)?;
        info!("traduit: {}", path.display());
        Ok(out)
    }
}

/// Traduction avec le dictionnaire intégré et la configuration par défaut.
pub fn translate(source: &str) -> Result<String> {
    let dict = Dictionary::builtin()?;
    Translator::new(dict, Config::default()).translate(source)
}

/* ───────────────────────── Tests ───────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Diagnostic;

    #[test]
    fn default_translation() {
        assert_eq!(translate("mostrar 'oi'\n").unwrap(), "print('oi')\n");
        assert_eq!(translate("").unwrap(), "");
    }

    #[test]
    fn all_or_nothing() {
        let err = translate("x = 1\nretornar x\n").unwrap_err();
        assert_eq!(err.diagnostics(), &[Diagnostic::ReturnOutsideFunction { line: 2 }]);
    }

    #[test]
    fn input_cap_before_scan() {
        let dict = Dictionary::builtin().unwrap();
        let mut cfg = Config::default();
        cfg.limits.max_input_bytes = 4;
        let err = Translator::new(dict, cfg).translate("x = 'abc'").unwrap_err();
        assert!(matches!(err, TranslationError::InputTooLarge { size: 9, max: 4 }));
    }

    #[test]
    fn renamed_display_directive() {
        let dict = Dictionary::builtin().unwrap();
        let cfg = Config { display_directive: "exibir".into(), ..Config::default() };
        let t = Translator::new(dict, cfg);
        assert_eq!(t.translate("mostrar '{a}'\n").unwrap(), "print(f'{a}')\n");
        assert_eq!(t.translate("exibir '{a}'\n").unwrap(), "print(f'{a}')\n");
    }

    #[test]
    fn attribute_calls_translate() {
        assert_eq!(translate("x = fila.retornar()\n").unwrap(), "x = fila.retornar()\n");
        assert_eq!(translate("y = tarefa.aguardar()\n").unwrap(), "y = tarefa.aguardar()\n");
    }

    #[test]
    fn strict_quotes_from_config() {
        let dict = Dictionary::builtin().unwrap();
        let cfg = Config { strict_quotes: true, ..Config::default() };
        let err = Translator::new(dict, cfg).translate("x = 'abc\n").unwrap_err();
        assert!(matches!(err, TranslationError::Shield(_)));
        // mode tolérant : la chaîne file jusqu'à la fin
        assert_eq!(translate("x = 'abc\nse y").unwrap(), "x = 'abc\nse y");
    }
}
