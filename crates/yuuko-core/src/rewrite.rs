//! rewrite.rs — Réécriture du dialecte en Python, au niveau des tokens.
//!
//! Étapes (sur le texte **blindé**, les littéraux ne sont que des jetons) :
//! 1. Substitution : termes composés d'abord (plus longs d'abord, mots séparés
//!    par des espaces horizontaux), puis termes simples mot pour mot.
//!    Un mot n'est remplacé que s'il forme un token entier : `senhor` ne
//!    contient jamais `se`. Les attributs (`obj.tamanho`) sont laissés tels quels.
//! 2. Correction des en-têtes `if` / `elif` / `while` : dans la condition (jusqu'au
//!    premier `:` hors parenthèses), un `=` isolé devient `==`.
//!
//! La sortie est une fonction pure de (source, dictionnaire).

use std::ops::Range;

use log::trace;

use crate::dictionary::Dictionary;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::shield::Shielded;

/// En-têtes dont la condition accepte `=` comme comparaison.
const CONDITIONAL_HEADERS: [&str; 3] = ["if", "elif", "while"];

#[derive(Debug, Clone, Copy)]
pub struct Rewriter<'d> {
    dict: &'d Dictionary,
}

impl<'d> Rewriter<'d> {
    pub const fn new(dict: &'d Dictionary) -> Self {
        Self { dict }
    }

    pub fn rewrite(&self, shielded: &Shielded) -> String {
        let marker = shielded.table.marker();
        let substituted = self.substitute(&shielded.text, marker);
        fix_comparisons(&substituted, marker)
    }

    /// Remplace chaque terme du dictionnaire par son fragment cible.
    pub fn substitute(&self, text: &str, marker: &str) -> String {
        let toks: Vec<Token<'_>> = Lexer::with_marker(text, marker).collect();
        let mut out = String::with_capacity(text.len());
        let mut hits = 0usize;
        let mut i = 0;

        while i < toks.len() {
            let tok = toks[i];
            let after_dot = i > 0 && toks[i - 1].is_punct(".");
            if tok.kind != TokenKind::Word || after_dot {
                out.push_str(tok.text);
                i += 1;
                continue;
            }
            if let Some((end, fragment)) = self.match_compound(&toks, i) {
                out.push_str(fragment);
                hits += 1;
                i = end;
                continue;
            }
            match self.dict.lookup(tok.text) {
                Some(fragment) => {
                    out.push_str(fragment);
                    hits += 1;
                }
                None => out.push_str(tok.text),
            }
            i += 1;
        }

        trace!("rewrite: {hits} termes substitués");
        out
    }

    /// Composé le plus long commençant au token `start` ; renvoie l'index qui suit.
    fn match_compound(&self, toks: &[Token<'_>], start: usize) -> Option<(usize, &'d str)> {
        self.dict.compounds_starting_with(toks[start].text).find_map(|c| {
            let mut j = start + 1;
            for word in &c.words[1..] {
                match (toks.get(j), toks.get(j + 1)) {
                    (Some(sp), Some(w)) if sp.kind == TokenKind::Space && w.is_word(word) => j += 2,
                    _ => return None,
                }
            }
            Some((j, c.fragment.as_str()))
        })
    }
}

/// Raccourci : `Rewriter::new(dict).rewrite(shielded)`.
pub fn rewrite(shielded: &Shielded, dict: &Dictionary) -> String {
    Rewriter::new(dict).rewrite(shielded)
}

/* ───────────────────── En-têtes conditionnels ───────────────────── */

/// `if x = 5:` → `if x == 5:` ; `==`, `<=`, `>=`, `!=`, `+=`, `:=` sont des tokens
/// distincts et ne sont jamais touchés.
pub fn fix_comparisons(text: &str, marker: &str) -> String {
    let toks: Vec<Token<'_>> = Lexer::with_marker(text, marker).collect();
    let mut out = String::with_capacity(text.len() + 8);

    for line in toks.split_inclusive(|t| t.kind == TokenKind::Newline) {
        let cond = header_condition(line);
        for (ix, tok) in line.iter().enumerate() {
            let in_cond = cond.as_ref().is_some_and(|r| r.contains(&ix));
            if in_cond && tok.is_punct("=") {
                out.push_str("==");
            } else {
                out.push_str(tok.text);
            }
        }
    }
    out
}

/// Indices des tokens de la condition, si la ligne est un en-tête complet.
fn header_condition(line: &[Token<'_>]) -> Option<Range<usize>> {
    let first = line.iter().position(|t| t.kind != TokenKind::Space)?;
    if !CONDITIONAL_HEADERS.iter().any(|k| line[first].is_word(k)) {
        return None;
    }
    let mut depth = 0usize;
    for (ix, tok) in line.iter().enumerate().skip(first + 1) {
        if tok.kind != TokenKind::Punct {
            continue;
        }
        match tok.text {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth = depth.saturating_sub(1),
            ":" if depth == 0 => return Some(first + 1..ix),
            _ => {}
        }
    }
    None
}

/* ───────────────────────── Tests ───────────────────────── */
