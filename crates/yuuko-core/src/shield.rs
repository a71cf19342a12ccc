//! shield.rs — Blindage des littéraux (chaînes + commentaires).
//!
//! `mask` remplace chaque chaîne et chaque commentaire par un jeton unique
//! (`__YKS0__`, `__YKC1__` …) et garde le texte exact dans une [`LiteralTable`]
//! propre à la passe : aucune étape en aval ne voit jamais le contenu d'un
//! littéral. `unmask` restaure tout, en un seul passage linéaire ; le texte
//! restauré n'est jamais relu, un commentaire ne peut donc pas être altéré par
//! la restauration d'une chaîne.
//!
//! Chaque entrée porte aussi des métadonnées (guillemets, préfixe, accolades,
//! retours ligne masqués) : l'interpolation et le validateur s'en servent sans
//! relire le texte brut.
//!
//! NB: une chaîne non terminée s'étend jusqu'à la fin de l'entrée (approximation
//! volontaire, pas de contrôle d'équilibre des guillemets) sauf si
//! `strict_quotes` est actif.

use std::collections::{HashMap, HashSet};

use log::trace;
use thiserror::Error;

use crate::config::Config;
use crate::lexer::{Lexer, Quote, TokenKind};

const BASE_TAG: &str = "YK";
/// Au-delà, un suffixe numérique ne peut plus bloquer les sels essayés.
const MAX_SALT_DIGITS: usize = 20;

/* ───────────────────────── Erreurs ───────────────────────── */

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShieldError {
    #[error("literal não terminado (linha {line}, coluna {col})")]
    Unterminated { line: u32, col: u32 },

    #[error("literais demais: máximo {max}")]
    TooManyLiterals { max: usize },
}

/* ───────────────────────── Types ───────────────────────── */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind { Str, Comment }

impl LiteralKind {
    const fn code(self) -> char {
        match self {
            Self::Str => 'S',
            Self::Comment => 'C',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralMeta {
    pub kind: LiteralKind,
    /// `None` pour un commentaire.
    pub quote: Option<Quote>,
    /// Préfixe tel qu'écrit (`""`, `"f"`, `"rb"` …).
    pub prefix: String,
    /// Le corps contient `{` et `}`.
    pub has_braces: bool,
    /// Retours ligne contenus dans le littéral.
    pub newlines: usize,
    pub terminated: bool,
}

impl LiteralMeta {
    fn comment() -> Self {
        Self {
            kind: LiteralKind::Comment,
            quote: None,
            prefix: String::new(),
            has_braces: false,
            newlines: 0,
            terminated: true,
        }
    }

    pub fn is_formatted(&self) -> bool {
        self.prefix.contains(['f', 'F'])
    }

    /// Peut recevoir le préfixe `f` (pas de bytes, pas de `u`, pas déjà formatée).
    pub fn can_format(&self) -> bool {
        self.kind == LiteralKind::Str && self.prefix.chars().all(|c| matches!(c, 'r' | 'R'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub placeholder: String,
    /// Texte exact de la source (préfixe et guillemets compris).
    pub text: String,
    pub meta: LiteralMeta,
}

/// Table des littéraux d'une passe (jamais partagée entre deux traductions).
#[derive(Debug, Clone, Default)]
pub struct LiteralTable {
    marker: String,
    entries: Vec<Literal>,
    index: HashMap<String, usize>,
}

impl LiteralTable {
    /// Table vide dont le marqueur n'apparaît nulle part dans `source`.
    pub fn for_source(source: &str) -> Self {
        Self { marker: pick_marker(source), ..Self::default() }
    }

    /// Préfixe commun des jetons (`__YK`, ou `__YK1` … si la source le contient).
    pub fn marker(&self) -> &str {
        &self.marker
    }

    fn push(&mut self, text: &str, meta: LiteralMeta) -> &str {
        let ix = self.entries.len();
        let placeholder = format!("{}{}{}__", self.marker, meta.kind.code(), ix);
        self.index.insert(placeholder.clone(), ix);
        self.entries.push(Literal { placeholder, text: text.to_string(), meta });
        &self.entries[ix].placeholder
    }

    pub fn get(&self, placeholder: &str) -> Option<&Literal> {
        self.index.get(placeholder).map(|&ix| &self.entries[ix])
    }

    /// Ajoute le préfixe `f` à une chaîne ; `false` si rien n'a changé.
    pub fn mark_formatted(&mut self, placeholder: &str) -> bool {
        let Some(&ix) = self.index.get(placeholder) else { return false };
        let lit = &mut self.entries[ix];
        if !lit.meta.can_format() || lit.meta.is_formatted() {
            return false;
        }
        lit.text.insert(0, 'f');
        lit.meta.prefix.insert(0, 'f');
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pour chaque ligne de `text` (blindé), le numéro 1-based de la ligne source.
    pub fn line_map(&self, text: &str) -> Vec<usize> {
        let mut map = vec![1usize];
        let mut hidden = 0usize;
        for tok in Lexer::with_marker(text, &self.marker) {
            match tok.kind {
                TokenKind::Placeholder => {
                    hidden += self.get(tok.text).map_or(0, |l| l.meta.newlines);
                }
                TokenKind::Newline => map.push(map.len() + 1 + hidden),
                _ => {}
            }
        }
        map
    }
}

/// Texte blindé + sa table.
#[derive(Debug, Clone)]
pub struct Shielded {
    pub text: String,
    pub table: LiteralTable,
}

impl Shielded {
    pub fn unmask(&self) -> String {
        unmask(&self.text, &self.table)
    }
}

/* ───────────────────────── Shield ───────────────────────── */

#[derive(Debug, Clone)]
pub struct Shield {
    pub strict_quotes: bool,
    pub max_literals: usize,
}

impl Default for Shield {
    fn default() -> Self {
        Self { strict_quotes: false, max_literals: usize::MAX }
    }
}

impl Shield {
    pub fn from_config(cfg: &Config) -> Self {
        Self { strict_quotes: cfg.strict_quotes, max_literals: cfg.limits.max_literals }
    }

    pub fn mask(&self, source: &str) -> Result<Shielded, ShieldError> {
        let mut table = LiteralTable::for_source(source);
        let mut text = String::with_capacity(source.len());

        for tok in Lexer::new(source) {
            let meta = match tok.kind {
                TokenKind::Str { quote, prefix_len, terminated } => {
                    if !terminated && self.strict_quotes {
                        return Err(ShieldError::Unterminated {
                            line: tok.span.start.line,
                            col: tok.span.start.col,
                        });
                    }
                    let (prefix, body) = tok.text.split_at(prefix_len);
                    LiteralMeta {
                        kind: LiteralKind::Str,
                        quote: Some(quote),
                        prefix: prefix.to_string(),
                        has_braces: body.contains('{') && body.contains('}'),
                        newlines: body.matches('\n').count(),
                        terminated,
                    }
                }
                TokenKind::Comment => LiteralMeta::comment(),
                _ => {
                    text.push_str(tok.text);
                    continue;
                }
            };
            if table.len() >= self.max_literals {
                return Err(ShieldError::TooManyLiterals { max: self.max_literals });
            }
            text.push_str(table.push(tok.text, meta));
        }

        trace!("shield: {} littéraux masqués (marqueur {})", table.len(), table.marker());
        Ok(Shielded { text, table })
    }
}

/* ───────────────────────── API top-level ───────────────────────── */

/// Blindage avec les options par défaut (chaînes non terminées tolérées).
pub fn mask(source: &str) -> Result<Shielded, ShieldError> {
    Shield::default().mask(source)
}

/// Restaure chaque jeton connu de `table` ; le reste du texte est recopié tel quel.
pub fn unmask(text: &str, table: &LiteralTable) -> String {
    if table.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + table.iter().map(|l| l.text.len()).sum::<usize>());
    for tok in Lexer::with_marker(text, table.marker()) {
        match table.get(tok.text) {
            Some(lit) if tok.kind == TokenKind::Placeholder => out.push_str(&lit.text),
            _ => out.push_str(tok.text),
        }
    }
    out
}

/// Choisit `__YK` + sel : le plus petit sel dont le marqueur n'apparaît pas dans la source.
fn pick_marker(source: &str) -> String {
    let base = format!("__{BASE_TAG}");
    if !source.contains(&base) {
        return base;
    }
    // `__YK12` bloque aussi `__YK1` : on retient tous les préfixes numériques.
    let mut blocked = HashSet::<String>::new();
    for (ix, _) in source.match_indices(&base) {
        let digits: String = source[ix + base.len()..]
            .chars()
            .take_while(char::is_ascii_digit)
            .take(MAX_SALT_DIGITS)
            .collect();
        for end in 1..=digits.len() {
            blocked.insert(digits[..end].to_string());
        }
    }
    let salt = (1u64..).find(|n| !blocked.contains(&n.to_string())).unwrap_or(u64::MAX);
    format!("{base}{salt}")
}

/* ───────────────────────── Tests ───────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hides_strings_and_comments() {
        let src = "se x: # se não\n    mostrar \"se verdadeiro\"\n";
        let s = mask(src).unwrap();
        assert_eq!(s.text, "se x: __YKC0__\n    mostrar __YKS1__\n");
        assert_eq!(s.table.len(), 2);
        assert_eq!(s.unmask(), src);
    }

    #[test]
    fn metadata_flows_through() {
        let s = mask("a = f'{x}'\nb = r\"{y}\"\nc = \"\"\"l1\nl2\"\"\"\nd = b'{z}'").unwrap();
        let lits: Vec<&Literal> = s.table.iter().collect();
        assert!(lits[0].meta.is_formatted());
        assert!(lits[1].meta.has_braces && lits[1].meta.can_format());
        assert_eq!(lits[1].meta.prefix, "r");
        assert_eq!(lits[2].meta.quote, Some(Quote::TripleDouble));
        assert_eq!(lits[2].meta.newlines, 1);
        assert!(!lits[3].meta.can_format());
    }

    #[test]
    fn roundtrip_tricky_inputs() {
        for src in [
            "",
            "x = 'it\\'s' + \"a \\\"b\\\" c\"",
            "s = '''um\n'dois'\n\"tres\"'''  # fim",
            "# só comentário",
            "x = \"nunca fecha\nse y:\n",
            "a__YKS0__ = '__YK1C3__'",
            "t = 'ã' # ç\r\n",
        ] {
            let s = mask(src).unwrap();
            assert_eq!(s.unmask(), src);
        }
    }

    #[test]
    fn marker_avoids_user_text() {
        let src = "__YK = 1\n__YK1 = '__YK12'\n";
        let s = mask(src).unwrap();
        assert_eq!(s.table.marker(), "__YK2");
        assert!(s.text.contains("__YK2S0__"));
        assert_eq!(s.unmask(), src);
    }

    #[test]
    fn strict_quotes_and_limits() {
        let strict = Shield { strict_quotes: true, ..Shield::default() };
        let err = strict.mask("x = 1\ny = \"abc\n").unwrap_err();
        assert_eq!(err, ShieldError::Unterminated { line: 2, col: 5 });
        assert!(strict.mask("y = \"abc\"").is_ok());

        let small = Shield { max_literals: 1, ..Shield::default() };
        assert_eq!(small.mask("'a' 'b'").unwrap_err(), ShieldError::TooManyLiterals { max: 1 });
    }

    #[test]
    fn line_map_skips_hidden_newlines() {
        let s = mask("a = '''x\ny\nz'''\nb = 1\nc = 2").unwrap();
        assert_eq!(s.text, "a = __YKS0__\nb = 1\nc = 2");
        assert_eq!(s.table.line_map(&s.text), vec![1, 4, 5]);
    }

    #[test]
    fn mark_formatted_once() {
        let mut s = mask("mostrar 'oi {n}' + b'{x}'").unwrap();
        assert!(s.table.mark_formatted("__YKS0__"));
        assert!(!s.table.mark_formatted("__YKS0__"));
        assert!(!s.table.mark_formatted("__YKS1__"));
        assert!(!s.table.mark_formatted("__nope__"));
        assert_eq!(s.unmask(), "mostrar f'oi {n}' + b'{x}'");
    }
}
