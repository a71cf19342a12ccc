//! validate.rs — Contrôles structurels du Python réécrit (encore blindé).
//!
//! Trois passes, ligne par ligne, sur les lignes non vides et non commentaires :
//! - **YK101** : affectation `<nom> = …` à un littéral réservé (`True`, `verdadeiro` …)
//! - **YK102** : affectation à un mot-clé cible (`def`, `import`, `class`, `async` …)
//! - **YK201 / YK202** : `return` hors fonction, `await` hors fonction async,
//!   via une pile de portées ouverte/fermée par l'indentation.
//!
//! Les diagnostics sont concaténés dans cet ordre (YK101, YK102, puis portées),
//! chacun dans l'ordre des lignes. Une liste non vide rejette toute l'unité.
//!
//! Les numéros de ligne sont ceux de la **source** : un littéral multi-lignes
//! masqué ne décale rien (cf. [`LiteralTable::line_map`]).

use std::collections::BTreeSet;
use std::fmt;

use log::debug;

use crate::dictionary::Dictionary;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::shield::{LiteralKind, LiteralTable};

/// Noms cibles interdits à gauche d'une affectation.
const RESERVED_IDENTIFIERS: [&str; 8] = ["def", "import", "class", "True", "False", "None", "async", "await"];

const TAB_WIDTH: usize = 8;

/* ───────────────────────── Diagnostics ───────────────────────── */

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    ReservedLiteral { line: usize, name: String },
    ReservedIdentifier { line: usize, name: String },
    ReturnOutsideFunction { line: usize },
    AwaitOutsideAsync { line: usize },
}

impl Diagnostic {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ReservedLiteral { .. } => "YK101",
            Self::ReservedIdentifier { .. } => "YK102",
            Self::ReturnOutsideFunction { .. } => "YK201",
            Self::AwaitOutsideAsync { .. } => "YK202",
        }
    }

    /// Ligne source, 1-based.
    pub const fn line(&self) -> usize {
        match self {
            Self::ReservedLiteral { line, .. }
            | Self::ReservedIdentifier { line, .. }
            | Self::ReturnOutsideFunction { line }
            | Self::AwaitOutsideAsync { line } => *line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code();
        match self {
            Self::ReservedLiteral { line, name } => {
                write!(f, "{code} - Atribuição proibida a literal reservado '{name}' (linha {line})")
            }
            Self::ReservedIdentifier { line, name } => {
                write!(f, "{code} - Identificador reservado '{name}' usado como variável (linha {line})")
            }
            Self::ReturnOutsideFunction { line } => write!(f, "{code} - 'retornar' fora de função (linha {line})"),
            Self::AwaitOutsideAsync { line } => write!(f, "{code} - 'await' fora de função async (linha {line})"),
        }
    }
}

/// Échec de validation : tous les diagnostics accumulés.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub diagnostics: Vec<Diagnostic>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.diagnostics.iter().enumerate() {
            if i > 0 { f.write_str("\n")?; }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// `Ok(())` si la liste est vide.
    pub fn check(diagnostics: Vec<Diagnostic>) -> Result<(), Self> {
        if diagnostics.is_empty() { Ok(()) } else { Err(Self { diagnostics }) }
    }
}

/* ───────────────────────── Portées ───────────────────────── */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind { Function, AsyncFunction, Class, Other }

impl FrameKind {
    const fn is_function(self) -> bool {
        matches!(self, Self::Function | Self::AsyncFunction)
    }
}

/// Bloc ouvert : genre + colonne d'indentation de la ligne d'ouverture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeFrame {
    pub kind: FrameKind,
    pub indent: usize,
}

/* ───────────────────────── Validator ───────────────────────── */

#[derive(Debug, Clone)]
pub struct Validator {
    reserved_literals: BTreeSet<String>,
    return_words: BTreeSet<String>,
    await_words: BTreeSet<String>,
}

/// Une ligne logique : indentation + tokens significatifs (sans espaces ni commentaires).
struct Line<'t> {
    number: usize,
    indent: usize,
    /// Premier mot de la ligne avant réécriture, si connu.
    head: Option<&'t str>,
    code: Vec<Token<'t>>,
}

impl Validator {
    pub fn new(dict: &Dictionary) -> Self {
        let with_terms = |target: &str| -> BTreeSet<String> {
            std::iter::once(target).chain(dict.terms_for(target)).map(str::to_string).collect()
        };
        Self {
            reserved_literals: dict.reserved_literals(),
            return_words: with_terms("return"),
            await_words: with_terms("await"),
        }
    }

    /// Texte non blindé (chaînes et commentaires lus par le lexer).
    pub fn validate(&self, text: &str) -> Vec<Diagnostic> {
        self.run(text, None, None)
    }

    /// Texte blindé : numéros de ligne ramenés à la source via `table`.
    pub fn validate_shielded(&self, text: &str, table: &LiteralTable) -> Vec<Diagnostic> {
        self.run(text, Some(table), None)
    }

    /// Comme [`validate_shielded`](Self::validate_shielded), avec le texte blindé
    /// d'avant réécriture : YK101 cite alors le nom tel qu'écrit (`verdadeiro`,
    /// pas `True`). Les deux textes ont les mêmes sauts de ligne.
    pub fn validate_rewritten(&self, text: &str, table: &LiteralTable, before: &str) -> Vec<Diagnostic> {
        self.run(text, Some(table), Some(before))
    }

    fn run(&self, text: &str, table: Option<&LiteralTable>, before: Option<&str>) -> Vec<Diagnostic> {
        let marker = table.map_or("", LiteralTable::marker);
        let line_map = table.map(|t| t.line_map(text));
        let toks: Vec<Token<'_>> = Lexer::with_marker(text, marker).collect();
        let heads = before.map(|b| first_words(b, marker, table)).unwrap_or_default();

        let mut lines: Vec<Line<'_>> = Vec::new();
        let mut depth = 0usize;
        for (k, raw) in toks.split_inclusive(|t| t.kind == TokenKind::Newline).enumerate() {
            let code: Vec<Token<'_>> = raw
                .iter()
                .copied()
                .filter(|t| !t.is_trivia() && !is_comment(t, table))
                .collect();
            let continued = depth > 0;
            depth = bracket_depth(depth, &code);
            if code.is_empty() {
                continue;
            }
            // suite d'une ligne logique ouverte par une parenthèse
            if continued {
                if let Some(last) = lines.last_mut() {
                    last.code.extend(code);
                    continue;
                }
            }
            let indent = raw.first().filter(|t| t.kind == TokenKind::Space).map_or(0, |t| indent_width(t.text));
            let number = line_map
                .as_ref()
                .and_then(|m| m.get(k).copied())
                .unwrap_or(raw[0].span.start.line as usize);
            let head = heads.get(k).copied().flatten();
            lines.push(Line { number, indent, head, code });
        }

        let mut out = self.check_assignments(&lines);
        out.extend(self.check_scoping(&lines));
        debug!("validate: {} lignes, {} diagnostics", lines.len(), out.len());
        out
    }

    /// YK101 puis YK102 ; un nom déjà signalé comme littéral ne l'est pas deux fois.
    fn check_assignments(&self, lines: &[Line<'_>]) -> Vec<Diagnostic> {
        let mut literals = Vec::new();
        let mut identifiers = Vec::new();
        for line in lines {
            let Some(name) = assigned_name(&line.code) else { continue };
            if self.reserved_literals.contains(name) {
                let written = line.head.filter(|h| self.reserved_literals.contains(*h)).unwrap_or(name);
                literals.push(Diagnostic::ReservedLiteral { line: line.number, name: written.to_string() });
            } else if RESERVED_IDENTIFIERS.contains(&name) {
                identifiers.push(Diagnostic::ReservedIdentifier { line: line.number, name: name.to_string() });
            }
        }
        literals.extend(identifiers);
        literals
    }

    fn check_scoping(&self, lines: &[Line<'_>]) -> Vec<Diagnostic> {
        let mut scopes: Vec<ScopeFrame> = Vec::new();
        let mut out = Vec::new();

        for line in lines {
            while scopes.last().is_some_and(|top| line.indent <= top.indent) {
                scopes.pop();
            }
            if let Some(kind) = opener(&line.code) {
                scopes.push(ScopeFrame { kind, indent: line.indent });
            }

            // `fila.retornar()` est un attribut, pas le mot-clé
            let has = |words: &BTreeSet<String>| {
                line.code.iter().enumerate().any(|(i, t)| {
                    t.kind == TokenKind::Word
                        && words.contains(t.text)
                        && !(i > 0 && line.code[i - 1].is_punct("."))
                })
            };
            if has(&self.return_words) && !scopes.iter().any(|s| s.kind.is_function()) {
                out.push(Diagnostic::ReturnOutsideFunction { line: line.number });
            }
            if has(&self.await_words) {
                let nearest = scopes.iter().rev().find(|s| s.kind.is_function());
                if !nearest.is_some_and(|s| s.kind == FrameKind::AsyncFunction) {
                    out.push(Diagnostic::AwaitOutsideAsync { line: line.number });
                }
            }
        }
        out
    }
}

/* ───────────────────────── Helpers ───────────────────────── */

fn is_comment(tok: &Token<'_>, table: Option<&LiteralTable>) -> bool {
    match tok.kind {
        TokenKind::Comment => true,
        TokenKind::Placeholder => table
            .and_then(|t| t.get(tok.text))
            .is_some_and(|l| l.meta.kind == LiteralKind::Comment),
        _ => false,
    }
}

/// Premier jeton significatif de chaque ligne brute, s'il s'agit d'un mot.
fn first_words<'t>(text: &'t str, marker: &'t str, table: Option<&LiteralTable>) -> Vec<Option<&'t str>> {
    let toks: Vec<Token<'t>> = Lexer::with_marker(text, marker).collect();
    toks.split_inclusive(|t| t.kind == TokenKind::Newline)
        .map(|raw| {
            raw.iter()
                .find(|t| !t.is_trivia() && !is_comment(t, table))
                .filter(|t| t.kind == TokenKind::Word)
                .map(|t| t.text)
        })
        .collect()
}

fn bracket_depth(mut depth: usize, code: &[Token<'_>]) -> usize {
    for t in code.iter().filter(|t| t.kind == TokenKind::Punct) {
        match t.text {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

/// Espaces = 1 colonne, tabulation = jusqu'au prochain multiple de 8.
fn indent_width(ws: &str) -> usize {
    ws.chars().fold(0, |col, c| if c == '\t' { (col / TAB_WIDTH + 1) * TAB_WIDTH } else { col + 1 })
}

/// `nom = …` (un `=` seul, pas `==` ni `+=`).
fn assigned_name<'t>(code: &[Token<'t>]) -> Option<&'t str> {
    match code {
        [name, eq, ..] if name.kind == TokenKind::Word && eq.is_punct("=") => Some(name.text),
        _ => None,
    }
}

fn opener(code: &[Token<'_>]) -> Option<FrameKind> {
    match code {
        [a, d, ..] if a.is_word("async") && d.is_word("def") => Some(FrameKind::AsyncFunction),
        [d, ..] if d.is_word("def") => Some(FrameKind::Function),
        [c, ..] if c.is_word("class") => Some(FrameKind::Class),
        [.., last] if last.is_punct(":") => Some(FrameKind::Other),
        _ => None,
    }
}

/* ───────────────────────── Tests ───────────────────────── */
