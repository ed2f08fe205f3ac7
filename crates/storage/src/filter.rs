//! Filter expressions
//!
//! Grammar:
//!
//! ```text
//! filter  := and ("or" and)*
//! and     := term ("and" term)*
//! term    := "(" filter ")" | "not" path | path (cmpOp value)?
//! path    := name ("->" name)*
//! cmpOp   := "==" | "!=" | "<" | "<=" | ">" | ">="
//! value   := true | false | @ref | "str" | `uri` | YYYY-MM-DD | number[unit]
//! ```
//!
//! A bare path matches when the tag is present. `->` follows a Ref tag to
//! the referenced entity, so `equipRef->siteRef==@s1` matches points whose
//! equip sits on site `s1`. Every comparison against a missing tag is
//! false, including `!=`.

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::sync::Arc;

use haystack_core::{Dict, EntityId, Error, Number, Result, Value};

/// Tag path, possibly dereferencing Ref tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path(Vec<String>);

impl Path {
    /// Path segments
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Resolve the path against `dict`, following Refs through `resolve`
    pub fn get(
        &self,
        dict: &Dict,
        resolve: &dyn Fn(&EntityId) -> Option<Arc<Dict>>,
    ) -> Option<Value> {
        let (first, rest) = self.0.split_first()?;
        let mut val = dict.get(first)?.clone();
        for name in rest {
            let target = resolve(&val.as_entity_ref()?.id)?;
            val = target.get(name)?.clone();
        }
        Some(val)
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

/// Parsed filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Tag present
    Has(Path),
    /// Tag absent
    Missing(Path),
    /// Tag compared against a literal
    Cmp(Path, CmpOp, Value),
    /// Both match
    And(Box<Filter>, Box<Filter>),
    /// Either matches
    Or(Box<Filter>, Box<Filter>),
}

impl Filter {
    /// Parse a filter expression
    ///
    /// # Errors
    /// Returns `MalformedRequest` describing the first syntax error.
    pub fn parse(src: &str) -> Result<Filter> {
        let tokens = tokenize(src)?;
        let mut parser = Parser { tokens, pos: 0 };
        let filter = parser.filter()?;
        match parser.peek() {
            Token::Eof => Ok(filter),
            other => Err(syntax(src, format!("unexpected {:?}", other))),
        }
    }

    /// Evaluate against one entity
    pub fn matches(
        &self,
        dict: &Dict,
        resolve: &dyn Fn(&EntityId) -> Option<Arc<Dict>>,
    ) -> bool {
        match self {
            Filter::Has(path) => path.get(dict, resolve).is_some(),
            Filter::Missing(path) => path.get(dict, resolve).is_none(),
            Filter::Cmp(path, op, expected) => match path.get(dict, resolve) {
                Some(actual) => compare(&actual, *op, expected),
                None => false,
            },
            Filter::And(a, b) => a.matches(dict, resolve) && b.matches(dict, resolve),
            Filter::Or(a, b) => a.matches(dict, resolve) || b.matches(dict, resolve),
        }
    }
}

fn compare(actual: &Value, op: CmpOp, expected: &Value) -> bool {
    let ord = actual.compare(expected);
    match op {
        CmpOp::Eq => ord.map_or_else(|| actual == expected, |o| o == Ordering::Equal),
        CmpOp::Ne => !ord.map_or_else(|| actual == expected, |o| o == Ordering::Equal),
        CmpOp::Lt => ord == Some(Ordering::Less),
        CmpOp::Le => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
        CmpOp::Gt => ord == Some(Ordering::Greater),
        CmpOp::Ge => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
    }
}

fn syntax(src: &str, msg: impl std::fmt::Display) -> Error {
    Error::malformed(format!("Invalid filter '{}': {}", src, msg))
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Name(String),
    Val(Value),
    LParen,
    RParen,
    Arrow,
    Cmp(CmpOp),
    Eof,
}

fn tokenize(src: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '-' if next == Some('>') => {
                tokens.push(Token::Arrow);
                i += 2;
            }
            '=' if next == Some('=') => {
                tokens.push(Token::Cmp(CmpOp::Eq));
                i += 2;
            }
            '!' if next == Some('=') => {
                tokens.push(Token::Cmp(CmpOp::Ne));
                i += 2;
            }
            '<' | '>' => {
                let or_equal = next == Some('=');
                let op = match (c, or_equal) {
                    ('<', false) => CmpOp::Lt,
                    ('<', true) => CmpOp::Le,
                    ('>', false) => CmpOp::Gt,
                    _ => CmpOp::Ge,
                };
                tokens.push(Token::Cmp(op));
                i += if or_equal { 2 } else { 1 };
            }
            '"' => {
                let (s, end) = lex_quoted(src, &chars, i + 1, '"')?;
                tokens.push(Token::Val(Value::Str(s)));
                i = end;
            }
            '`' => {
                let (s, end) = lex_quoted(src, &chars, i + 1, '`')?;
                tokens.push(Token::Val(Value::Uri(s)));
                i = end;
            }
            '@' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && EntityId::is_id_char(chars[end]) {
                    end += 1;
                }
                let id: String = chars[start..end].iter().collect();
                tokens.push(Token::Val(Value::Ref(EntityId::parse(&id)?.into())));
                i = end;
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Name(chars[start..i].iter().collect()));
            }
            c if c.is_ascii_digit() || (c == '-' && next.map_or(false, |n| n.is_ascii_digit())) => {
                let start = i;
                i += 1;
                while i < chars.len() && is_literal_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(Token::Val(lex_scalar(src, &word)?));
            }
            other => return Err(syntax(src, format!("unexpected char {:?}", other))),
        }
    }
    tokens.push(Token::Eof);
    Ok(tokens)
}

fn is_literal_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '=' | '!' | '<' | '>')
}

fn lex_quoted(src: &str, chars: &[char], mut i: usize, quote: char) -> Result<(String, usize)> {
    let mut out = String::new();
    while i < chars.len() {
        match chars[i] {
            c if c == quote => return Ok((out, i + 1)),
            '\\' => {
                let esc = chars
                    .get(i + 1)
                    .ok_or_else(|| syntax(src, "unterminated escape"))?;
                out.push(match esc {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => *other,
                });
                i += 2;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Err(syntax(src, "unterminated literal"))
}

/// Number with optional unit, or a date
fn lex_scalar(src: &str, word: &str) -> Result<Value> {
    if let Ok(date) = NaiveDate::parse_from_str(word, "%Y-%m-%d") {
        return Ok(Value::Date(date));
    }
    let bytes = word.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end += 1;
    }
    let digits = |mut j: usize| {
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        j
    };
    end = digits(end);
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end = digits(end + 1);
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut j = end + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            end = digits(j);
        }
    }
    let val: f64 = word[..end]
        .parse()
        .map_err(|_| syntax(src, format!("invalid number {:?}", word)))?;
    let unit = &word[end..];
    Ok(Value::Number(if unit.is_empty() {
        Number::new(val)
    } else {
        Number::with_unit(val, unit)
    }))
}

// ============================================================================
// Parser
// ============================================================================

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn next(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn keyword(&self, kw: &str) -> bool {
        matches!(self.peek(), Token::Name(n) if n == kw)
    }

    fn filter(&mut self) -> Result<Filter> {
        let mut lhs = self.and()?;
        while self.keyword("or") {
            self.next();
            let rhs = self.and()?;
            lhs = Filter::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Filter> {
        let mut lhs = self.term()?;
        while self.keyword("and") {
            self.next();
            let rhs = self.term()?;
            lhs = Filter::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Filter> {
        if *self.peek() == Token::LParen {
            self.next();
            let inner = self.filter()?;
            return match self.next() {
                Token::RParen => Ok(inner),
                other => Err(self.err(format!("expected ')', found {:?}", other))),
            };
        }
        if self.keyword("not") {
            self.next();
            return Ok(Filter::Missing(self.path()?));
        }
        let path = self.path()?;
        if let Token::Cmp(op) = *self.peek() {
            self.next();
            let val = self.value()?;
            return Ok(Filter::Cmp(path, op, val));
        }
        Ok(Filter::Has(path))
    }

    fn path(&mut self) -> Result<Path> {
        let mut names = vec![self.name()?];
        while *self.peek() == Token::Arrow {
            self.next();
            names.push(self.name()?);
        }
        Ok(Path(names))
    }

    fn name(&mut self) -> Result<String> {
        match self.next() {
            Token::Name(n) if !matches!(n.as_str(), "and" | "or" | "not") => Ok(n),
            other => Err(self.err(format!("expected tag name, found {:?}", other))),
        }
    }

    fn value(&mut self) -> Result<Value> {
        match self.next() {
            Token::Val(v) => Ok(v),
            Token::Name(n) if n == "true" => Ok(Value::Bool(true)),
            Token::Name(n) if n == "false" => Ok(Value::Bool(false)),
            other => Err(self.err(format!("expected value, found {:?}", other))),
        }
    }

    fn err(&self, msg: String) -> Error {
        Error::malformed(format!("Invalid filter: {}", msg))
    }
}
