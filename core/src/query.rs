//! Boolean query parsing: lexing, grammar validation, normalization and
//! infix-to-postfix conversion.
//!
//! Operators are the upper-case words `AND`, `OR` and `NOT`; `AND NOT` is
//! fused into a single binary operator. Precedence: `NOT` = `AND NOT` = 3,
//! `AND` = 2, `OR` = 1. An operator only displaces operators of strictly
//! higher precedence, so equal-precedence chains group to the right.

use std::fmt;

use crate::tokenizer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An operand; raw text before normalization, a term after.
    Term(String),
    And,
    Or,
    /// Unary prefix negation
    Not,
    /// Fused `AND NOT`: left minus right
    AndNot,
    LeftParen,
    RightParen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Operand,
    Unary,
    Binary,
    Open,
    Close,
}

impl Token {
    fn class(&self) -> Class {
        match self {
            Token::Term(_) => Class::Operand,
            Token::Not => Class::Unary,
            Token::And | Token::Or | Token::AndNot => Class::Binary,
            Token::LeftParen => Class::Open,
            Token::RightParen => Class::Close,
        }
    }

    /// Binding strength of an operator; `None` for operands and parentheses.
    pub fn precedence(&self) -> Option<u8> {
        match self {
            Token::Not | Token::AndNot => Some(3),
            Token::And => Some(2),
            Token::Or => Some(1),
            _ => None,
        }
    }

    pub fn is_operator(&self) -> bool {
        self.precedence().is_some()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Term(t) => write!(f, "{t}"),
            Token::And => f.write_str("AND"),
            Token::Or => f.write_str("OR"),
            Token::Not => f.write_str("NOT"),
            Token::AndNot => f.write_str("AND NOT"),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("empty query")]
    Empty,

    #[error("query cannot start with {0}")]
    BadStart(String),

    #[error("{next} cannot follow {prev}")]
    BadTransition { prev: String, next: String },

    #[error("query ends with dangling {0}")]
    Dangling(String),

    #[error("unbalanced parentheses")]
    UnbalancedParentheses,

    #[error("operand {0:?} has no indexable characters")]
    EmptyOperand(String),

    #[error("operand {0:?} splits into several index terms")]
    CompoundOperand(String),

    #[error("{0} is missing an operand")]
    MissingOperand(String),

    #[error("expression leaves {0} results instead of one")]
    UnconsumedOperands(usize),
}

/// Split a query into tokens. Parentheses are always tokens of their own;
/// everything else is delimited by whitespace, so operands keep any
/// punctuation they contain.
pub fn lex(query: &str) -> Vec<Token> {
    let mut words: Vec<Token> = Vec::new();
    let mut word = String::new();
    for c in query.chars() {
        match c {
            '(' | ')' => {
                push_word(&mut word, &mut words);
                words.push(if c == '(' { Token::LeftParen } else { Token::RightParen });
            }
            c if c.is_whitespace() => push_word(&mut word, &mut words),
            c => word.push(c),
        }
    }
    push_word(&mut word, &mut words);

    let mut tokens = Vec::with_capacity(words.len());
    let mut it = words.into_iter().peekable();
    while let Some(tok) = it.next() {
        if tok == Token::And && it.peek() == Some(&Token::Not) {
            it.next();
            tokens.push(Token::AndNot);
        } else {
            tokens.push(tok);
        }
    }
    tokens
}

fn push_word(word: &mut String, out: &mut Vec<Token>) {
    if word.is_empty() {
        return;
    }
    let op = match word.as_str() {
        "AND" => Some(Token::And),
        "OR" => Some(Token::Or),
        "NOT" => Some(Token::Not),
        _ => None,
    };
    out.push(op.unwrap_or_else(|| Token::Term(word.clone())));
    word.clear();
}

fn allowed_after(prev: Class, next: Class) -> bool {
    use Class::*;
    match prev {
        Operand | Close => matches!(next, Binary | Close),
        Unary | Binary | Open => matches!(next, Operand | Unary | Open),
    }
}

/// Check the token sequence against the grammar before any stemming.
pub fn validate(tokens: &[Token]) -> Result<(), QueryError> {
    let first = tokens.first().ok_or(QueryError::Empty)?;
    if !matches!(first.class(), Class::Operand | Class::Unary | Class::Open) {
        return Err(QueryError::BadStart(first.to_string()));
    }
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate() {
        if i > 0 {
            let prev = &tokens[i - 1];
            if !allowed_after(prev.class(), tok.class()) {
                return Err(QueryError::BadTransition { prev: prev.to_string(), next: tok.to_string() });
            }
        }
        match tok {
            Token::LeftParen => depth += 1,
            Token::RightParen => {
                depth = depth.checked_sub(1).ok_or(QueryError::UnbalancedParentheses)?;
            }
            _ => {}
        }
    }
    if let Some(last) = tokens.last().filter(|t| !matches!(t.class(), Class::Operand | Class::Close)) {
        return Err(QueryError::Dangling(last.to_string()));
    }
    if depth != 0 {
        return Err(QueryError::UnbalancedParentheses);
    }
    Ok(())
}

/// Stem operands; operators and parentheses pass through. An operand must
/// tokenize to exactly one word, the same way document text does, or it could
/// never match an index term.
pub fn normalize(tokens: Vec<Token>) -> Result<Vec<Token>, QueryError> {
    tokens
        .into_iter()
        .map(|tok| match tok {
            Token::Term(raw) => normalize_operand(raw).map(Token::Term),
            other => Ok(other),
        })
        .collect()
}

fn normalize_operand(raw: String) -> Result<String, QueryError> {
    let words = tokenizer::tokenize(&raw);
    let [word] = words.as_slice() else {
        return Err(if words.is_empty() { QueryError::EmptyOperand(raw) } else { QueryError::CompoundOperand(raw) });
    };
    let term = tokenizer::normalize(word);
    if term.is_empty() {
        return Err(QueryError::EmptyOperand(raw));
    }
    Ok(term)
}

/// Shunting-yard conversion of a validated infix sequence.
pub fn to_postfix(tokens: Vec<Token>) -> Vec<Token> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();
    for tok in tokens {
        match tok {
            Token::Term(_) => output.push(tok),
            Token::LeftParen | Token::Not => stack.push(tok),
            Token::RightParen => {
                while let Some(top) = stack.pop() {
                    if top == Token::LeftParen {
                        break;
                    }
                    output.push(top);
                }
            }
            Token::And | Token::Or | Token::AndNot => {
                let prec = tok.precedence().unwrap_or(0);
                while let Some(top_prec) = stack.last().and_then(Token::precedence) {
                    if top_prec <= prec {
                        break;
                    }
                    output.extend(stack.pop());
                }
                stack.push(tok);
            }
        }
    }
    while let Some(top) = stack.pop() {
        output.push(top);
    }
    output
}

/// Lex, validate, normalize and convert a query to postfix.
pub fn parse(query: &str) -> Result<Vec<Token>, QueryError> {
    let tokens = lex(query);
    validate(&tokens)?;
    Ok(to_postfix(normalize(tokens)?))
}
