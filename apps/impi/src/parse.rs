//! Imports-only reader for Go source files.
//!
//! Tokenizes just enough of Go to read the package clause and the import
//! declarations that follow it, tracking lines so grouping can work off
//! source adjacency. Parsing stops at the first token after the imports; the
//! rest of the file is never looked at.

use crate::error::ParseError;
use crate::models::{ImportDecl, ParsedImport};
use std::iter::Peekable;
use std::str::Chars;

const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Ident(String),
    /// String literal contents without delimiters, plus the raw source form.
    Str { value: String, raw: String },
    Comment,
    Punct(char),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    line: usize,
    column: usize,
    end_line: usize,
}

impl Token {
    fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Ident(name) if KEYWORDS.contains(&name.as_str()) => format!("'{}'", name),
            TokenKind::Ident(name) => name.clone(),
            TokenKind::Str { raw, .. } => raw.clone(),
            TokenKind::Comment => "comment".into(),
            TokenKind::Punct(c) => format!("'{}'", c),
            TokenKind::Eof => "'EOF'".into(),
        }
    }

    fn is_ident(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(name) if name == word)
    }

    fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }
}

struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            input: src.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.input.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, column: usize, message: &str) -> ParseError {
        ParseError {
            line,
            column,
            message: message.to_string(),
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        while let Some(&c) = self.input.peek() {
            if c.is_whitespace() || c == '\u{feff}' {
                self.bump();
            } else {
                break;
            }
        }
        let (line, column) = (self.line, self.column);
        let token = |kind, end_line| Token {
            kind,
            line,
            column,
            end_line,
        };
        let Some(c) = self.bump() else {
            return Ok(token(TokenKind::Eof, line));
        };
        match c {
            '/' if self.input.peek() == Some(&'/') => {
                while let Some(&n) = self.input.peek() {
                    if n == '\n' {
                        break;
                    }
                    self.bump();
                }
                Ok(token(TokenKind::Comment, line))
            }
            '/' if self.input.peek() == Some(&'*') => {
                self.bump();
                let mut prev = '\0';
                loop {
                    match self.bump() {
                        Some('/') if prev == '*' => break,
                        Some(n) => prev = n,
                        None => return Err(self.error(line, column, "comment not terminated")),
                    }
                }
                Ok(token(TokenKind::Comment, self.line))
            }
            '"' => {
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some('"') => break,
                        Some('\\') => {
                            value.push('\\');
                            match self.bump() {
                                Some('\n') | None => {
                                    return Err(self.error(line, column, "string literal not terminated"))
                                }
                                Some(n) => value.push(n),
                            }
                        }
                        Some('\n') | None => {
                            return Err(self.error(line, column, "string literal not terminated"))
                        }
                        Some(n) => value.push(n),
                    }
                }
                let raw = format!("\"{}\"", value);
                Ok(token(TokenKind::Str { value, raw }, line))
            }
            '`' => {
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some('`') => break,
                        Some(n) => value.push(n),
                        None => {
                            return Err(self.error(line, column, "raw string literal not terminated"))
                        }
                    }
                }
                let raw = format!("`{}`", value);
                Ok(token(TokenKind::Str { value, raw }, self.line))
            }
            c if c == '_' || c.is_alphabetic() => {
                let mut name = String::from(c);
                while let Some(&n) = self.input.peek() {
                    if n == '_' || n.is_alphanumeric() {
                        name.push(n);
                        self.bump();
                    } else {
                        break;
                    }
                }
                Ok(token(TokenKind::Ident(name), line))
            }
            other => Ok(token(TokenKind::Punct(other), line)),
        }
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    tok: Token,
    /// First and last line of the comment group directly above `tok`.
    lead: Option<(usize, usize)>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Result<Self, ParseError> {
        let mut parser = Self {
            lexer: Lexer::new(src),
            tok: Token {
                kind: TokenKind::Eof,
                line: 0,
                column: 0,
                end_line: 0,
            },
            lead: None,
        };
        parser.advance()?;
        Ok(parser)
    }

    /// Move to the next non-comment token and work out its lead comment.
    ///
    /// Comments starting on the line of the previous token form a trailing
    /// group and are never a lead. Remaining comments are grouped while each
    /// starts at most one line after the previous one ends; the last group
    /// is the lead when it ends on the line just above the next token.
    fn advance(&mut self) -> Result<(), ParseError> {
        let prev_line = self.tok.line;
        let mut trailing_end: Option<usize> = None;
        let mut group: Option<(usize, usize)> = None;
        let mut next = self.lexer.next_token()?;
        while next.kind == TokenKind::Comment {
            let on_trailing_line = prev_line > 0
                && group.is_none()
                && next.line == trailing_end.unwrap_or(prev_line);
            if on_trailing_line {
                trailing_end = Some(next.end_line);
            } else {
                group = match group {
                    Some((start, end)) if next.line <= end + 1 => Some((start, next.end_line)),
                    _ => Some((next.line, next.end_line)),
                };
            }
            next = self.lexer.next_token()?;
        }
        self.lead = group.filter(|(_, end)| end + 1 == next.line);
        self.tok = next;
        Ok(())
    }

    fn expected(&self, what: &str) -> ParseError {
        ParseError {
            line: self.tok.line,
            column: self.tok.column,
            message: format!("expected {}, found {}", what, self.tok.describe()),
        }
    }

    /// Accept an explicit `;` or an implicit one at a line break.
    fn expect_semi(&mut self, prev_end: usize, closing: Option<char>) -> Result<(), ParseError> {
        if self.tok.is_punct(';') {
            return self.advance();
        }
        let closes = closing.is_some_and(|c| self.tok.is_punct(c));
        if closes || self.tok.kind == TokenKind::Eof || self.tok.line > prev_end {
            return Ok(());
        }
        Err(self.expected("';'"))
    }

    fn skip_semis(&mut self) -> Result<(), ParseError> {
        while self.tok.is_punct(';') {
            self.advance()?;
        }
        Ok(())
    }

    fn parse_file(&mut self) -> Result<Vec<ImportDecl>, ParseError> {
        if !self.tok.is_ident("package") {
            return Err(self.expected("'package'"));
        }
        self.advance()?;
        let name_end = match &self.tok.kind {
            TokenKind::Ident(name) if !KEYWORDS.contains(&name.as_str()) => self.tok.end_line,
            _ => return Err(self.expected("'IDENT'")),
        };
        self.advance()?;
        self.expect_semi(name_end, None)?;

        let mut decls = Vec::new();
        loop {
            self.skip_semis()?;
            if !self.tok.is_ident("import") {
                break;
            }
            let decl = self.parse_decl()?;
            let end = decl.end_line;
            decls.push(decl);
            self.expect_semi(end, None)?;
        }
        Ok(decls)
    }

    fn parse_decl(&mut self) -> Result<ImportDecl, ParseError> {
        self.advance()?;
        if !self.tok.is_punct('(') {
            let spec = self.parse_spec(false)?;
            return Ok(ImportDecl {
                end_line: spec.end_line,
                imports: vec![spec],
            });
        }
        self.advance()?;
        let mut imports = Vec::new();
        loop {
            self.skip_semis()?;
            if self.tok.is_punct(')') {
                let end_line = self.tok.line;
                self.advance()?;
                return Ok(ImportDecl { end_line, imports });
            }
            if self.tok.kind == TokenKind::Eof {
                return Err(self.expected("')'"));
            }
            let spec = self.parse_spec(true)?;
            let end = spec.end_line;
            imports.push(spec);
            self.expect_semi(end, Some(')'))?;
        }
    }

    fn parse_spec(&mut self, with_lead: bool) -> Result<ParsedImport, ParseError> {
        let lead = if with_lead { self.lead } else { None };
        let import_line = self.tok.line;
        let named = self.tok.is_punct('.')
            || matches!(&self.tok.kind, TokenKind::Ident(name) if !KEYWORDS.contains(&name.as_str()));
        if named {
            self.advance()?;
        }
        let (path, end_line) = match &self.tok.kind {
            TokenKind::Str { value, .. } => (value.clone(), self.tok.end_line),
            _ => return Err(self.expected("import path")),
        };
        self.advance()?;
        Ok(ParsedImport {
            path,
            start_line: lead.map(|(start, _)| start).unwrap_or(import_line),
            import_line,
            end_line,
        })
    }
}

/// Read every top-level import declaration of a Go source file, in order.
pub fn parse_imports(src: &str) -> Result<Vec<ImportDecl>, ParseError> {
    Parser::new(src)?.parse_file()
}
