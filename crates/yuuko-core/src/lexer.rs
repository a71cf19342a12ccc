//! lexer.rs — Analyse lexicale commune au dialecte YuukoLane (.yl) et au Python émis.
//!
//! Objectifs :
//! - Un seul passage, zéro copie : chaque `Token` référence une tranche de la source.
//! - **Sans perte** : concaténer les `text` des tokens redonne exactement l'entrée,
//!   espaces et retours ligne compris (la réécriture travaille donc token par token).
//! - Littéraux : `'…'`, `"…"`, `'''…'''`, `"""…"""`, échappes `\x`, multi-lignes,
//!   préfixes `r b f u` (et combinaisons valides `rb`, `br`, `fr`, `rf`).
//!   Un littéral non terminé s'étend jusqu'à la fin de l'entrée (`terminated = false`).
//! - Commentaires : `# …` jusqu'au retour ligne (exclu).
//! - Opérateurs : plus long d'abord (`**=`, `//=`, `>>=`, `:=`, `->`, `==`, `+=` …).
//! - Identifiants Unicode (lettres accentuées, marques combinantes).
//!
//! Les jetons de blindage (`__YKS0__`) sont reconnus comme `Placeholder` quand le
//! lexer reçoit le marqueur de la passe via [`Lexer::with_marker`], même collés à
//! un identifiant.
//!
//! API :
//!   for tok in Lexer::new(src) { … }
//!   // ou: let toks = tokenize(src);

use std::fmt;

/* ───────────────────────── Positions & spans ───────────────────────── */

/// Position 1-based (ligne/col) + offset 0-based (octets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
    pub offset: usize,
}
impl Pos {
    const fn start() -> Self { Self { line: 1, col: 1, offset: 0 } }
}

/// Tranche source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

/* ───────────────────────── Tokens ───────────────────────── */

/// Délimiteur d'un littéral chaîne.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote { Single, Double, TripleSingle, TripleDouble }

impl Quote {
    pub const fn delimiter(self) -> &'static str {
        match self {
            Self::Single => "'",
            Self::Double => "\"",
            Self::TripleSingle => "'''",
            Self::TripleDouble => "\"\"\"",
        }
    }

    pub const fn is_triple(self) -> bool {
        matches!(self, Self::TripleSingle | Self::TripleDouble)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Littéral chaîne (préfixe inclus dans le texte du token).
    Str { quote: Quote, prefix_len: usize, terminated: bool },
    Comment,
    Word,
    Number,
    Punct,
    /// Espaces horizontaux (jamais de `\n`).
    Space,
    Newline,
    /// Jeton de blindage émis par `shield::mask`.
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub span: Span,
    /// Vue texte brute (slice de la source)
    pub text: &'a str,
}

impl Token<'_> {
    pub fn is_word(&self, w: &str) -> bool {
        self.kind == TokenKind::Word && self.text == w
    }

    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == p
    }

    /// Espace ou retour ligne.
    pub const fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Space | TokenKind::Newline)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} ({}:{})", self.kind, self.text, self.span.start.line, self.span.start.col)
    }
}

/* ───────────────────────── Lexer ───────────────────────── */

/// Opérateurs multi-caractères, les plus longs d'abord.
const OPERATORS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...",
    "==", "!=", "<=", ">=", "->", ":=", "**", "//", "<<", ">>",
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "@=",
];

#[derive(Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    /// position courante (début du *prochain* token)
    pos: Pos,
    /// marqueur des jetons de blindage (`__YK`), si connu
    marker: Option<&'a str>,
}

impl<'a> Lexer<'a> {
    pub const fn new(src: &'a str) -> Self {
        Self { src, pos: Pos::start(), marker: None }
    }

    /// Lexer qui reconnaît les jetons `<marker>S<n>__` / `<marker>C<n>__`.
    pub fn with_marker(src: &'a str, marker: &'a str) -> Self {
        let marker = (!marker.is_empty()).then_some(marker);
        Self { src, pos: Pos::start(), marker }
    }

    /// Lit le prochain token (`None` en fin d'entrée).
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        let start = self.pos;
        let ch = self.peek()?;

        let kind = if self.at_marker() {
            self.lex_placeholder()
        } else {
            match ch {
                '\n' => { self.bump(); TokenKind::Newline }
                '#' => {
                    self.eat_while(|c| c != '\n');
                    TokenKind::Comment
                }
                '"' | '\'' => self.lex_string(0),
                c if c.is_whitespace() => {
                    self.eat_while(|c| c != '\n' && c.is_whitespace());
                    TokenKind::Space
                }
                c if c.is_ascii_digit() => self.lex_number(),
                c if is_ident_start(c) => match self.string_prefix_len() {
                    0 => self.lex_word(),
                    n => {
                        for _ in 0..n { self.bump(); }
                        self.lex_string(n)
                    }
                },
                _ => self.lex_punct(),
            }
        };

        Some(self.mk_token(start, kind))
    }

    /* ────── core ────── */

    fn mk_token(&self, start: Pos, kind: TokenKind) -> Token<'a> {
        Token {
            kind,
            span: Span { start, end: self.pos },
            text: &self.src[start.offset..self.pos.offset],
        }
    }

    fn rest(&self) -> &'a str { &self.src[self.pos.offset..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn starts_with(&self, s: &str) -> bool { self.rest().starts_with(s) }

    fn at_marker(&self) -> bool {
        self.marker.is_some_and(|m| self.starts_with(m))
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.col = 1;
        } else {
            self.pos.col += 1;
        }
        self.pos.offset += ch.len_utf8();
        Some(ch)
    }

    /// Avance d'un préfixe ASCII déjà vérifié par `starts_with`.
    fn bump_str(&mut self, s: &str) {
        for _ in s.chars() { self.bump(); }
    }

    fn eat_while(&mut self, f: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !f(c) { break; }
            self.bump();
        }
    }

    /* ────── mots / jetons ────── */

    fn lex_word(&mut self) -> TokenKind {
        self.bump();
        while let Some(c) = self.peek() {
            if !is_ident_continue(c) || self.at_marker() { break; }
            self.bump();
        }
        TokenKind::Word
    }

    fn lex_number(&mut self) -> TokenKind {
        while let Some(c) = self.peek() {
            if !(is_ident_continue(c) || c == '.') || self.at_marker() { break; }
            self.bump();
        }
        TokenKind::Number
    }

    fn lex_placeholder(&mut self) -> TokenKind {
        if let Some(m) = self.marker { self.bump_str(m); }
        if matches!(self.peek(), Some('S' | 'C')) { self.bump(); }
        self.eat_while(|c| c.is_ascii_digit());
        if self.starts_with("__") { self.bump_str("__"); }
        TokenKind::Placeholder
    }

    /* ────── littéraux ────── */

    /// Longueur du préfixe de chaîne (`f"…"`, `rb'…'`), 0 si le mot n'en est pas un.
    fn string_prefix_len(&self) -> usize {
        let rest = self.rest().as_bytes();
        for n in [2usize, 1] {
            if rest.len() <= n || !matches!(rest[n], b'"' | b'\'') { continue; }
            let prefix = &rest[..n];
            if is_string_prefix(prefix) { return n; }
        }
        0
    }

    fn lex_string(&mut self, prefix_len: usize) -> TokenKind {
        let quote = if self.starts_with("\"\"\"") {
            Quote::TripleDouble
        } else if self.starts_with("'''") {
            Quote::TripleSingle
        } else if self.starts_with("\"") {
            Quote::Double
        } else {
            Quote::Single
        };
        let delim = quote.delimiter();
        self.bump_str(delim);

        let mut terminated = false;
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                self.bump();
                continue;
            }
            if self.starts_with(delim) {
                self.bump_str(delim);
                terminated = true;
                break;
            }
            self.bump();
        }
        TokenKind::Str { quote, prefix_len, terminated }
    }

    /* ────── opérateurs / ponctuation ────── */

    fn lex_punct(&mut self) -> TokenKind {
        if let Some(op) = OPERATORS.iter().find(|op| self.starts_with(op)) {
            self.bump_str(op);
        } else {
            self.bump();
        }
        TokenKind::Punct
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        self.next_token()
    }
}

/* ───────────────────────── Utils ident ───────────────────────── */

pub fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

pub fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric() || is_combining_mark(c)
}

/// Diacritiques combinants (sources NFD : `a` + U+0303 pour `ã`).
const fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}')
}

/// `true` si `w` est un identifiant complet (utile pour valider le dictionnaire).
pub fn is_word(w: &str) -> bool {
    let mut it = w.chars();
    it.next().is_some_and(is_ident_start) && it.all(is_ident_continue)
}

fn is_string_prefix(p: &[u8]) -> bool {
    let lower: Vec<u8> = p.iter().map(u8::to_ascii_lowercase).collect();
    matches!(
        lower.as_slice(),
        b"r" | b"u" | b"f" | b"b" | b"rb" | b"br" | b"fr" | b"rf"
    )
}

/* ───────────────────────── API top-level ───────────────────────── */

pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    Lexer::new(src).collect()
}

/* ───────────────────────── Tests ───────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).into_iter().map(|t| t.kind).filter(|k| *k != TokenKind::Space).collect()
    }

    #[test]
    fn lossless() {
        let src = "se x = 5:  # commentaire\n    mostrar f\"{x}\" + 'a\\'b'\n\"\"\"doc\nstring\"\"\"\n";
        let back: String = tokenize(src).iter().map(|t| t.text).collect();
        assert_eq!(back, src);
    }

    #[test]
    fn strings_and_prefixes() {
        let t = tokenize(r#"f"a{b}" rb'x' fx"y" """tri"ple""" 'it\'s'"#);
        assert!(matches!(t[0].kind, TokenKind::Str { quote: Quote::Double, prefix_len: 1, terminated: true }));
        assert_eq!(t[0].text, r#"f"a{b}""#);
        assert!(matches!(t[2].kind, TokenKind::Str { quote: Quote::Single, prefix_len: 2, .. }));
        // `fx` n'est pas un préfixe valide : mot puis chaîne
        assert_eq!(t[4].kind, TokenKind::Word);
        assert_eq!(t[4].text, "fx");
        assert!(matches!(t[5].kind, TokenKind::Str { prefix_len: 0, .. }));
        assert!(matches!(t[7].kind, TokenKind::Str { quote: Quote::TripleDouble, .. }));
        assert_eq!(t[7].text, r#""""tri"ple""""#);
        assert_eq!(t[9].text, r"'it\'s'");
    }

    #[test]
    fn unterminated_is_greedy() {
        let t = tokenize("x = \"abc\ny = 1\n");
        let last = t.last().unwrap();
        assert!(matches!(last.kind, TokenKind::Str { terminated: false, .. }));
        assert_eq!(last.text, "\"abc\ny = 1\n");
    }

    #[test]
    fn comment_stops_before_newline() {
        let t = tokenize("a # b 'c'\nd");
        assert_eq!(t[2].kind, TokenKind::Comment);
        assert_eq!(t[2].text, "# b 'c'");
        assert_eq!(t[3].kind, TokenKind::Newline);
    }

    #[test]
    fn ops_longest_first() {
        let t: Vec<&str> = tokenize("a //= b ** c == d >= e := f").into_iter()
            .filter(|t| t.kind == TokenKind::Punct).map(|t| t.text).collect();
        assert_eq!(t, vec!["//=", "**", "==", ">=", ":="]);
    }

    #[test]
    fn unicode_words() {
        let t = tokenize("senão função_x ação2");
        assert_eq!(kinds("senão função_x ação2"), vec![TokenKind::Word; 3]);
        assert_eq!(t[2].text, "função_x");
        assert!(is_word("não"));
        assert!(!is_word("não é"));
        assert!(!is_word("2x"));
    }

    #[test]
    fn placeholders_with_marker() {
        let src = "x__YKS0__ + __YKC12__";
        let t: Vec<_> = Lexer::with_marker(src, "__YK").collect();
        assert_eq!(t[0].kind, TokenKind::Word);
        assert_eq!(t[0].text, "x");
        assert_eq!(t[1].kind, TokenKind::Placeholder);
        assert_eq!(t[1].text, "__YKS0__");
        assert_eq!(t.last().unwrap().text, "__YKC12__");
        // sans marqueur : un seul mot
        assert_eq!(tokenize("x__YKS0__")[0].text, "x__YKS0__");
    }

    #[test]
    fn positions_track_lines() {
        let t = tokenize("a\n  b");
        let b = t.iter().find(|t| t.text == "b").unwrap();
        assert_eq!((b.span.start.line, b.span.start.col), (2, 3));
    }
}
