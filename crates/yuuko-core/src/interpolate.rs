//! interpolate.rs — Directive d'affichage : `mostrar "…"` → `print(f"…")`.
//!
//! Travaille sur le texte blindé : la forme du littéral (préfixe, accolades)
//! est lue dans les métadonnées de la [`LiteralTable`], jamais dans le texte.
//! Une chaîne à accolades reçoit le préfixe `f` sauf si elle est déjà formatée
//! ou si c'est une chaîne bytes.

use log::trace;

use crate::config::Config;
use crate::dictionary::Dictionary;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::shield::{LiteralKind, LiteralTable};

#[derive(Debug, Clone)]
pub struct Interpolator {
    /// Mots reconnus comme directive (terme du dialecte + sa traduction).
    directives: Vec<String>,
    call: String,
}

impl Interpolator {
    pub fn new<I, S>(directives: I, call: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for d in directives {
            let d = d.into();
            if !out.contains(&d) { out.push(d); }
        }
        Self { directives: out, call: call.into() }
    }

    /// Directive de la config et le fragment que le dictionnaire lui associe,
    /// l'appel cible lui-même et tous les termes du dialecte traduits vers lui
    /// (la réécriture passe avant : `mostrar` y est déjà devenu `print`).
    pub fn from_config(cfg: &Config, dict: &Dictionary) -> Self {
        let mut directives = vec![cfg.display_directive.clone()];
        if let Some(fragment) = dict.lookup(&cfg.display_directive) {
            directives.push(fragment.to_string());
        }
        directives.push(cfg.display_call.clone());
        directives.extend(dict.terms_for(&cfg.display_call).map(str::to_string));
        Self::new(directives, cfg.display_call.clone())
    }

    fn is_directive(&self, tok: &Token<'_>) -> bool {
        tok.kind == TokenKind::Word && self.directives.iter().any(|d| d == tok.text)
    }

    pub fn apply(&self, text: &str, table: &mut LiteralTable) -> String {
        let marker = table.marker().to_string();
        let toks: Vec<Token<'_>> = Lexer::with_marker(text, &marker).collect();
        let mut out = String::with_capacity(text.len() + 16);
        let mut rewritten = 0usize;
        let mut i = 0;

        while i < toks.len() {
            let tok = toks[i];
            let after_dot = i > 0 && toks[i - 1].is_punct(".");
            if !after_dot && self.is_directive(&tok) {
                if let Some(lit) = self.literal_after(&toks, i, table) {
                    let has_braces = table.get(lit).is_some_and(|l| l.meta.has_braces);
                    if has_braces {
                        table.mark_formatted(lit);
                    }
                    out.push_str(&self.call);
                    out.push('(');
                    out.push_str(lit);
                    out.push(')');
                    rewritten += 1;
                    i += 3;
                    continue;
                }
            }
            out.push_str(tok.text);
            i += 1;
        }

        trace!("interpolate: {rewritten} directives d'affichage");
        out
    }

    /// Jeton de chaîne séparé de la directive par des espaces horizontaux.
    fn literal_after<'t>(&self, toks: &[Token<'t>], at: usize, table: &LiteralTable) -> Option<&'t str> {
        let (space, lit) = (toks.get(at + 1)?, toks.get(at + 2)?);
        if space.kind != TokenKind::Space || lit.kind != TokenKind::Placeholder {
            return None;
        }
        let entry = table.get(lit.text)?;
        (entry.meta.kind == LiteralKind::Str).then_some(lit.text)
    }
}

/// Raccourci avec la directive par défaut (`mostrar`/`print` → `print(…)`).
pub fn rewrite_display(text: &str, table: &mut LiteralTable) -> String {
    Interpolator::new(["mostrar", "print"], "print").apply(text, table)
}

/* ───────────────────────── Tests ───────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shield::{self, Shielded};
    use pretty_assertions::assert_eq;

    fn run(src: &str) -> String {
        let mut s = shield::mask(src).unwrap();
        let text = rewrite_display(&s.text, &mut s.table);
        Shielded { text, table: s.table }.unmask()
    }

    #[test]
    fn braces_get_format_marker() {
        assert_eq!(run("mostrar \"Olá, {nome}!\""), "print(f\"Olá, {nome}!\")");
        assert_eq!(run("    print '''{a}\n{b}'''\n"), "    print(f'''{a}\n{b}''')\n");
        assert_eq!(run("mostrar r'{x}\\d'"), "print(fr'{x}\\d')");
    }

    #[test]
    fn plain_and_formatted_literals() {
        assert_eq!(run("mostrar 'nada'"), "print('nada')");
        assert_eq!(run("mostrar f'{x}'"), "print(f'{x}')");
        assert_eq!(run("mostrar b'{x}'"), "print(b'{x}')");
        assert_eq!(run("mostrar '{ sem fim'"), "print('{ sem fim')");
    }

    #[test]
    fn only_directive_then_literal() {
        for src in [
            "obj.mostrar 'x'",
            "mostrar # '{x}'",
            "mostrar\n'{x}'",
            "print('{x}')",
            "mostrar_tudo '{x}'",
        ] {
            assert_eq!(run(src), src);
        }
    }

    #[test]
    fn configured_directive() {
        let mut s = shield::mask("exibir '{n}'\nmostrar '{n}'").unwrap();
        let text = Interpolator::new(["exibir"], "echo").apply(&s.text, &mut s.table);
        assert_eq!(
            Shielded { text, table: s.table }.unmask(),
            "echo(f'{n}')\nmostrar '{n}'"
        );
    }

    #[test]
    fn from_config_adds_translation() {
        let dict = Dictionary::builtin().unwrap();
        let i = Interpolator::from_config(&Config::default(), dict);
        assert_eq!(i.directives, vec!["mostrar".to_string(), "print".to_string()]);
    }

    #[test]
    fn renamed_directive_keeps_dictionary_spelling() {
        let dict = Dictionary::builtin().unwrap();
        let cfg = Config { display_directive: "exibir".into(), ..Config::default() };
        let i = Interpolator::from_config(&cfg, dict);
        assert_eq!(i.directives, vec!["exibir".to_string(), "print".to_string(), "mostrar".to_string()]);

        // `mostrar` est déjà devenu `print` à ce stade
        let mut s = shield::mask("print '{a}'\nexibir '{b}'").unwrap();
        let text = i.apply(&s.text, &mut s.table);
        assert_eq!(Shielded { text, table: s.table }.unmask(), "print(f'{a}')\nprint(f'{b}')");
    }
}
