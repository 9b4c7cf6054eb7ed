use chrono::NaiveDate;
use glob::Pattern;
use regex::Regex;
use thiserror::Error;

use crate::query::types::{CmpOp, Comparison, Expr, Operand};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Empty filter expression")]
    Empty,
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),
    #[error("Expected a comparison operator after '{0}'")]
    ExpectedOperator(String),
    #[error("Expected a value, found {0}")]
    ExpectedValue(String),
    #[error("Expected ')', found {0}")]
    ExpectedCloseParen(String),
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),
    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(String),
    #[error("'{0}' is not a numeric or date value")]
    InvalidOrdinal(String),
    #[error("Unterminated string literal")]
    UnterminatedString,
    #[error("Trailing input: {0}")]
    TrailingInput(String),
}

impl TryFrom<&str> for Expr {
    type Error = ParseError;

    /// Parse a filter expression like `city = oslo & balance > 100`
    ///
    /// # Examples
    /// ```
    /// use siftr::query::Expr;
    ///
    /// let expr: Expr = "status = active".try_into().unwrap();
    /// let expr: Expr = "name : harbor | opened >= 2024-01-01".try_into().unwrap();
    /// let expr: Expr = "!(code ~ \"^X\") & city like \"os*\"".try_into().unwrap();
    /// ```
    fn try_from(input: &str) -> Result<Self, Self::Error> {
        parse(input)
    }
}

/// Parse a complete filter expression
///
/// # Errors
/// Returns an error if the input is empty, syntactically malformed, or
/// carries an invalid regex/glob pattern or a non-ordinal value after an
/// ordering operator.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    match parser.peek() {
        Some(tok) => Err(ParseError::TrailingInput(describe(tok))),
        None => Ok(expr),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Str(String),
    Eq,
    NotEq,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
    Matches,
    And,
    Or,
    Not,
    LParen,
    RParen,
}

fn describe(token: &Token) -> String {
    match token {
        Token::Word(w) => format!("'{w}'"),
        Token::Str(s) => format!("\"{s}\""),
        Token::Eq => "'='".into(),
        Token::NotEq => "'!='".into(),
        Token::Gt => "'>'".into(),
        Token::Ge => "'>='".into(),
        Token::Lt => "'<'".into(),
        Token::Le => "'<='".into(),
        Token::Contains => "':'".into(),
        Token::Matches => "'~'".into(),
        Token::And => "'&'".into(),
        Token::Or => "'|'".into(),
        Token::Not => "'!'".into(),
        Token::LParen => "'('".into(),
        Token::RParen => "')'".into(),
    }
}

// Characters that terminate a bare word
const fn is_special(c: char) -> bool {
    matches!(
        c,
        '&' | '|' | '!' | '(' | ')' | '<' | '>' | '=' | '~' | ':' | '"'
    )
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            _ if c.is_whitespace() => {
                chars.next();
            }
            '&' => {
                chars.next();
                tokens.push(Token::And);
            }
            '|' => {
                chars.next();
                tokens.push(Token::Or);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Eq);
            }
            '~' => {
                chars.next();
                tokens.push(Token::Matches);
            }
            ':' => {
                chars.next();
                tokens.push(Token::Contains);
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::NotEq);
                } else {
                    tokens.push(Token::Not);
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => value.push(escaped),
                            None => return Err(ParseError::UnterminatedString),
                        },
                        Some(other) => value.push(other),
                        None => return Err(ParseError::UnterminatedString),
                    }
                }
                tokens.push(Token::Str(value));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || is_special(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut clauses = vec![self.parse_and()?];
        while self.eat(&Token::Or) {
            clauses.push(self.parse_and()?);
        }
        if clauses.len() == 1 {
            Ok(clauses.remove(0))
        } else {
            Ok(Expr::Any(clauses))
        }
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut clauses = vec![self.parse_term()?];
        while self.eat(&Token::And) {
            clauses.push(self.parse_term()?);
        }
        if clauses.len() == 1 {
            Ok(clauses.remove(0))
        } else {
            Ok(Expr::All(clauses))
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        match self.next() {
            Some(Token::Not) => Ok(Expr::Not(Box::new(self.parse_term()?))),
            Some(Token::LParen) => {
                let expr = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(expr),
                    Some(tok) => Err(ParseError::ExpectedCloseParen(describe(&tok))),
                    None => Err(ParseError::UnexpectedEnd),
                }
            }
            Some(Token::Word(field)) => self.parse_comparison(field),
            Some(tok) => Err(ParseError::UnexpectedToken(describe(&tok))),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn parse_comparison(&mut self, field: String) -> Result<Expr, ParseError> {
        let op = match self.next() {
            Some(Token::Eq) => CmpOp::Eq,
            Some(Token::NotEq) => CmpOp::NotEq,
            Some(Token::Gt) => CmpOp::Gt,
            Some(Token::Ge) => CmpOp::Ge,
            Some(Token::Lt) => CmpOp::Lt,
            Some(Token::Le) => CmpOp::Le,
            Some(Token::Contains) => CmpOp::Contains,
            Some(Token::Matches) => CmpOp::Matches,
            Some(Token::Word(w)) if w.eq_ignore_ascii_case("like") => CmpOp::Like,
            Some(_) => return Err(ParseError::ExpectedOperator(field)),
            None => return Err(ParseError::UnexpectedEnd),
        };
        let operand = self.parse_operand(op)?;
        Ok(Expr::Cmp(Comparison { field, op, operand }))
    }

    fn parse_operand(&mut self, op: CmpOp) -> Result<Operand, ParseError> {
        let (raw, quoted) = match self.next() {
            Some(Token::Word(w)) => (w, false),
            Some(Token::Str(s)) => (s, true),
            Some(tok) => return Err(ParseError::ExpectedValue(describe(&tok))),
            None => return Err(ParseError::UnexpectedEnd),
        };

        match op {
            CmpOp::Matches => Regex::new(&raw)
                .map(Operand::Regex)
                .map_err(|_| ParseError::InvalidRegex(raw)),
            // Compiled lowercased; evaluation lowercases the value to match
            CmpOp::Like => Pattern::new(&raw.to_lowercase())
                .map(Operand::Glob)
                .map_err(|_| ParseError::InvalidPattern(raw)),
            CmpOp::Contains => Ok(Operand::Text(raw)),
            CmpOp::Gt | CmpOp::Ge | CmpOp::Lt | CmpOp::Le => {
                if let Ok(n) = raw.parse::<f64>() {
                    Ok(Operand::Number(n))
                } else if let Ok(d) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                    Ok(Operand::Date(d))
                } else {
                    Err(ParseError::InvalidOrdinal(raw))
                }
            }
            CmpOp::Eq | CmpOp::NotEq => {
                // Quoting forces a literal text comparison
                if quoted {
                    Ok(Operand::Text(raw))
                } else if let Ok(n) = raw.parse::<f64>() {
                    Ok(Operand::Number(n))
                } else if let Ok(d) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                    Ok(Operand::Date(d))
                } else {
                    Ok(Operand::Text(raw))
                }
            }
        }
    }
}
