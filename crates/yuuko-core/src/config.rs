//! config.rs — Configuration de la transpilation YuukoLane.
//!
//! - Defaults sûrs (`Config::default()`)
//! - Lecture **ENV** (préfixe `YUUKO_...`) via `Config::from_env()`
//! - **Overrides CLI** via `CliOverrides` (appliqués avec `apply_cli_overrides`)
//! - Limites de sécurité (taille d'entrée, nombre de littéraux)
//! - (Dé)sérialisable : la CLI peut la lire depuis un fichier TOML.
//!
//! ENV supportés (tous facultatifs) :
//!   YUUKO_MAX_INPUT=<octets>
//!   YUUKO_MAX_LITERALS=<usize>
//!   YUUKO_STRICT_QUOTES=0|1
//!   YUUKO_DICTIONARY=<chemin .json>
//!   YUUKO_PYTHON=<binaire>
//!   YUUKO_DISPLAY=<terme du dialecte>

use std::borrow::Cow;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::dictionary::{Dictionary, ResourceError};

/* ─────────────────────────── Types publics ─────────────────────────── */

/// Garde-fous : chaque étape reste linéaire, mais on borne l'entrée.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Taille maximale d'une source, en octets.
    pub max_input_bytes: usize,
    /// Nombre maximal de chaînes + commentaires masqués.
    pub max_literals: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_bytes: 16 * 1024 * 1024,
            max_literals: 1_000_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: Limits,
    /// Chaîne non terminée = erreur (sinon elle court jusqu'à la fin du fichier).
    pub strict_quotes: bool,
    /// Directive d'affichage du dialecte (`mostrar "…"`).
    pub display_directive: String,
    /// Appel cible émis pour la directive.
    pub display_call: String,
    /// Dictionnaire externe ; `None` = dictionnaire intégré.
    pub dictionary: Option<PathBuf>,
    /// Interpréteur lancé par la CLI.
    pub interpreter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            strict_quotes: false,
            display_directive: "mostrar".into(),
            display_call: "print".into(),
            dictionary: None,
            interpreter: "python".into(),
        }
    }
}

/* ─────────────────────── Overrides (CLI / couches) ─────────────────────── */

/// Overrides typiques fournis par une CLI en amont.
#[derive(Default, Clone, Debug)]
pub struct CliOverrides {
    pub strict_quotes: Option<bool>,
    pub dictionary: Option<PathBuf>,
    pub interpreter: Option<String>,
    pub display_directive: Option<String>,
    pub max_input_bytes: Option<usize>,
    pub max_literals: Option<usize>,
}

impl Config {
    /// Construit depuis les valeurs par défaut + ENV.
    pub fn from_env() -> Self {
        let mut c = Self::default();
        c.apply_env();
        c
    }

    /// Applique les variables d'environnement `YUUKO_*`.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, read: impl Fn(&str) -> Option<String>) {
        if let Some(v) = read("YUUKO_MAX_INPUT")     { if let Some(n) = parse_usize(&v) { self.limits.max_input_bytes = n; } }
        if let Some(v) = read("YUUKO_MAX_LITERALS")  { if let Some(n) = parse_usize(&v) { self.limits.max_literals = n; } }
        if let Some(v) = read("YUUKO_STRICT_QUOTES") { if let Some(b) = parse_bool(&v)  { self.strict_quotes = b; } }
        if let Some(v) = read("YUUKO_DICTIONARY")    { if !v.trim().is_empty() { self.dictionary = Some(PathBuf::from(v.trim())); } }
        if let Some(v) = read("YUUKO_PYTHON")        { if !v.trim().is_empty() { self.interpreter = v.trim().to_string(); } }
        if let Some(v) = read("YUUKO_DISPLAY")       { if !v.trim().is_empty() { self.display_directive = v.trim().to_string(); } }
    }

    /// Applique des overrides “dernier mot” typiquement issus d'une CLI.
    pub fn apply_cli_overrides(&mut self, o: &CliOverrides) {
        if let Some(x) = o.strict_quotes            { self.strict_quotes = x; }
        if let Some(x) = &o.dictionary              { self.dictionary = Some(x.clone()); }
        if let Some(x) = &o.interpreter             { self.interpreter.clone_from(x); }
        if let Some(x) = &o.display_directive       { self.display_directive.clone_from(x); }
        if let Some(x) = o.max_input_bytes          { self.limits.max_input_bytes = x; }
        if let Some(x) = o.max_literals             { self.limits.max_literals = x; }
    }

    /// Validation de base (retourne `Err(&'static str)` si incohérence).
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.limits.max_input_bytes == 0 { return Err("max_input_bytes deve ser > 0"); }
        if self.limits.max_literals == 0    { return Err("max_literals deve ser > 0"); }
        if !crate::lexer::is_word(&self.display_directive) { return Err("display_directive deve ser uma palavra"); }
        if !crate::lexer::is_word(&self.display_call)      { return Err("display_call deve ser uma palavra"); }
        if self.interpreter.trim().is_empty() { return Err("interpreter vazio"); }
        Ok(())
    }

    /// Dictionnaire externe si configuré, sinon celui intégré (partagé).
    pub fn load_dictionary(&self) -> Result<Cow<'static, Dictionary>, ResourceError> {
        match &self.dictionary {
            Some(path) => Dictionary::from_path(path).map(Cow::Owned),
            None => Dictionary::builtin().map(Cow::Borrowed),
        }
    }
}

/* ────────────────────────── Parsing d'ENV ────────────────────────── */

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" | "sim" => Some(true),
        "0" | "false" | "no"  | "n" | "off" | "nao" | "não" => Some(false),
        _ => None,
    }
}

fn parse_usize(s: &str) -> Option<usize> {
    s.trim().replace('_', "").parse::<usize>().ok()
}

/* ───────────────────────────── Tests ───────────────────────────── */
