//! dictionary.rs — Dictionnaire YuukoLane → Python (immuable, chargé une fois).
//!
//! Format JSON : `{ "<catégorie>": { "<terme du dialecte>": "<fragment python>" } }`.
//! Un terme peut contenir des espaces (`"maior ou igual a"`) : il est alors
//! *composé* et toujours essayé avant les termes simples, du plus long au plus court.
//!
//! Le dictionnaire intégré (`dictionary.json`, à côté de ce fichier) est parsé au
//! premier appel de [`Dictionary::builtin`] puis partagé en lecture seule.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::lexer::is_word;

/* ───────────────────────── Catégories ───────────────────────── */

pub const OPERATORS: &str = "operadores";
pub const KEYWORDS: &str = "palavras_chave";
pub const LITERALS: &str = "literais";
pub const BUILTINS: &str = "funcoes";

/// Littéraux réservés du langage cible, même si le dictionnaire les ignore.
const TARGET_LITERALS: [&str; 3] = ["True", "False", "None"];

const BUILTIN_JSON: &str = include_str!("dictionary.json");
static BUILTIN: OnceCell<Dictionary> = OnceCell::new();

/// Terme du dialecte → fragment cible.
pub type Category = BTreeMap<String, String>;

/* ───────────────────────── Erreurs ───────────────────────── */

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("dicionário não encontrado: {}", .0.display())]
    Missing(PathBuf),

    #[error("leitura de {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("dicionário malformado: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("termo inválido '{term}' na categoria '{category}': {reason}")]
    InvalidTerm { category: String, term: String, reason: &'static str },

    #[error("termo '{term}' ambíguo: '{first}' ≠ '{second}'")]
    Conflict { term: String, first: String, second: String },
}

/* ───────────────────────── Types ───────────────────────── */

/// Terme multi-mots, découpé pour la comparaison token par token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    /// Forme normalisée (mots séparés par un espace).
    pub term: String,
    pub words: Vec<String>,
    pub fragment: String,
}

#[derive(Debug, Clone)]
pub struct Dictionary {
    categories: BTreeMap<String, Category>,
    simple: HashMap<String, String>,
    /// Triés : plus de mots d'abord, puis plus long, puis ordre lexical.
    compounds: Vec<Compound>,
    /// premier mot → indices dans `compounds` (ordre conservé)
    heads: HashMap<String, Vec<usize>>,
}

impl Dictionary {
    /// Dictionnaire intégré, parsé une seule fois par processus.
    pub fn builtin() -> Result<&'static Self, ResourceError> {
        BUILTIN.get_or_try_init(|| Self::from_json_str(BUILTIN_JSON))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ResourceError::Missing(path.to_path_buf()),
            _ => ResourceError::Io { path: path.to_path_buf(), source: e },
        })?;
        let dict = Self::from_json_str(&raw)?;
        debug!("dictionnaire chargé depuis {}", path.display());
        Ok(dict)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ResourceError> {
        let categories: BTreeMap<String, Category> = serde_json::from_str(raw)?;
        Self::from_categories(categories)
    }

    /// Valide et indexe les catégories.
    pub fn from_categories(categories: BTreeMap<String, Category>) -> Result<Self, ResourceError> {
        let mut simple = HashMap::<String, String>::new();
        let mut compounds = Vec::<Compound>::new();
        // terme normalisé → fragment (toutes catégories confondues)
        let mut seen = HashMap::<String, String>::new();

        for (category, entries) in &categories {
            for (term, fragment) in entries {
                let invalid = |reason| ResourceError::InvalidTerm {
                    category: category.clone(),
                    term: term.clone(),
                    reason,
                };
                let words: Vec<&str> = term.split_whitespace().collect();
                if words.is_empty() { return Err(invalid("termo vazio")); }
                if !words.iter().all(|w| is_word(w)) { return Err(invalid("não é uma sequência de palavras")); }
                if fragment.trim().is_empty() { return Err(invalid("fragmento vazio")); }
                if fragment.contains('\n') { return Err(invalid("fragmento com quebra de linha")); }
                if fragment.contains(['\'', '"', '#']) { return Err(invalid("fragmento com aspas ou comentário")); }

                let key = words.join(" ");
                if let Some(prev) = seen.get(&key) {
                    if prev != fragment {
                        return Err(ResourceError::Conflict {
                            term: key,
                            first: prev.clone(),
                            second: fragment.clone(),
                        });
                    }
                    continue;
                }
                seen.insert(key.clone(), fragment.clone());

                if words.len() == 1 {
                    simple.insert(key, fragment.clone());
                } else {
                    compounds.push(Compound {
                        words: words.iter().map(|w| (*w).to_string()).collect(),
                        term: key,
                        fragment: fragment.clone(),
                    });
                }
            }
        }

        compounds.sort_by(|a, b| {
            b.words.len().cmp(&a.words.len())
                .then_with(|| b.term.chars().count().cmp(&a.term.chars().count()))
                .then_with(|| a.term.cmp(&b.term))
        });
        let mut heads = HashMap::<String, Vec<usize>>::new();
        for (ix, c) in compounds.iter().enumerate() {
            heads.entry(c.words[0].clone()).or_default().push(ix);
        }

        debug!(
            "dictionnaire: {} catégories, {} termes simples, {} composés",
            categories.len(), simple.len(), compounds.len()
        );
        Ok(Self { categories, simple, compounds, heads })
    }

    /* ────── requêtes ────── */

    /// Fragment cible d'un terme simple (un seul mot).
    pub fn lookup(&self, word: &str) -> Option<&str> {
        self.simple.get(word).map(String::as_str)
    }

    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }

    /// Composés dont le premier mot est `head`, plus longs d'abord.
    pub fn compounds_starting_with<'s>(&'s self, head: &str) -> impl Iterator<Item = &'s Compound> + 's {
        self.heads
            .get(head)
            .into_iter()
            .flatten()
            .map(move |&ix| &self.compounds[ix])
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.get(name)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Termes du dialecte traduits vers `fragment` (ex. `"return"` → `retornar`).
    pub fn terms_for<'s>(&'s self, fragment: &'s str) -> impl Iterator<Item = &'s str> + 's {
        self.categories
            .values()
            .flat_map(|c| c.iter())
            .filter(move |(_, f)| f.as_str() == fragment)
            .map(|(t, _)| t.as_str())
    }

    /// Noms de littéraux réservés : termes et fragments de `literais`, plus
    /// `True`/`False`/`None`.
    pub fn reserved_literals(&self) -> BTreeSet<String> {
        let mut out: BTreeSet<String> = TARGET_LITERALS.iter().map(|s| (*s).to_string()).collect();
        if let Some(lits) = self.category(LITERALS) {
            for (term, fragment) in lits {
                out.insert(term.clone());
                out.insert(fragment.clone());
            }
        }
        out
    }

    /// Nombre de termes distincts.
    pub fn len(&self) -> usize {
        self.simple.len() + self.compounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/* ───────────────────────── Tests ───────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(json: &str) -> Result<Dictionary, ResourceError> {
        Dictionary::from_json_str(json)
    }

    #[test]
    fn builtin_loads_once() {
        let a = Dictionary::builtin().unwrap();
        let b = Dictionary::builtin().unwrap();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.lookup("se"), Some("if"));
        assert_eq!(a.lookup("retornar"), Some("return"));
        assert_eq!(a.lookup("verdadeiro"), Some("True"));
        assert!(a.category(OPERATORS).is_some());
        assert!(a.category(KEYWORDS).is_some());
        assert!(a.category(BUILTINS).is_some());
    }

    #[test]
    fn compounds_longest_first() {
        let d = Dictionary::builtin().unwrap();
        let maior: Vec<&str> = d.compounds_starting_with("maior").map(|c| c.term.as_str()).collect();
        assert_eq!(maior, vec!["maior ou igual a", "maior que"]);
        let nao: Vec<&str> = d.compounds_starting_with("não").map(|c| c.term.as_str()).collect();
        assert_eq!(nao, vec!["não está em", "não é"]);
        assert!(d.compounds().windows(2).all(|w| w[0].words.len() >= w[1].words.len()));
        // un composé n'est jamais indexé comme terme simple
        assert_eq!(d.lookup("maior"), None);
    }

    #[test]
    fn spaces_are_normalised() {
        let d = dict(r#"{"op": {"maior   que": ">"}}"#).unwrap();
        assert_eq!(d.compounds()[0].term, "maior que");
        assert_eq!(d.compounds()[0].words, vec!["maior", "que"]);
    }

    #[test]
    fn conflicting_terms_rejected() {
        let err = dict(r#"{"a": {"se": "if"}, "b": {"se": "when"}}"#).unwrap_err();
        assert!(matches!(err, ResourceError::Conflict { ref term, .. } if term == "se"));
        // même fragment dans deux catégories : toléré
        assert!(dict(r#"{"a": {"se": "if"}, "b": {"se": "if"}}"#).is_ok());
    }

    #[test]
    fn invalid_terms_rejected() {
        assert!(matches!(dict(r#"{"a": {"": "x"}}"#), Err(ResourceError::InvalidTerm { .. })));
        assert!(matches!(dict(r#"{"a": {"a+b": "x"}}"#), Err(ResourceError::InvalidTerm { .. })));
        assert!(matches!(dict(r#"{"a": {"x": "a\nb"}}"#), Err(ResourceError::InvalidTerm { .. })));
        assert!(matches!(dict(r#"{"a": {"x": "'oi'"}}"#), Err(ResourceError::InvalidTerm { .. })));
        assert!(matches!(dict(r##"{"a": {"x": "# nada"}}"##), Err(ResourceError::InvalidTerm { .. })));
        assert!(matches!(dict(r#"{"a": ["x"]}"#), Err(ResourceError::Malformed(_))));
    }

    #[test]
    fn terms_for_and_reserved() {
        let d = Dictionary::builtin().unwrap();
        let ret: Vec<&str> = d.terms_for("return").collect();
        assert_eq!(ret, vec!["retornar"]);
        let lits = d.reserved_literals();
        for name in ["verdadeiro", "falso", "nenhum", "True", "False", "None"] {
            assert!(lits.contains(name), "{name}");
        }
        assert!(!lits.contains("x"));
    }

    #[test]
    fn from_path_missing_and_ok() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(Dictionary::from_path(&missing), Err(ResourceError::Missing(_))));

        let path = dir.path().join("d.json");
        fs::write(&path, r#"{"literais": {"sim": "True"}}"#).unwrap();
        let d = Dictionary::from_path(&path).unwrap();
        assert_eq!(d.lookup("sim"), Some("True"));
        assert_eq!(d.len(), 1);
    }
}
