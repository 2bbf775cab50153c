//! Postfix evaluation against a final index.

use crate::error::Result;
use crate::persist::IndexReader;
use crate::postings::PostingList;
use crate::query::{self, QueryError, Token};
use crate::setops;

/// Result line written for a query that fails grammar validation.
pub const INVALID_QUERY: &str = "invalid query";

/// Evaluation context: the index snapshot every operand and `NOT` resolve against.
pub struct Evaluator<'a> {
    index: &'a IndexReader,
}

impl<'a> Evaluator<'a> {
    pub fn new(index: &'a IndexReader) -> Self {
        Self { index }
    }

    /// Parse and evaluate one query line.
    pub fn search(&self, query: &str) -> Result<PostingList> {
        let postfix = query::parse(query)?;
        self.evaluate(&postfix)
    }

    pub fn evaluate(&self, postfix: &[Token]) -> Result<PostingList> {
        let mut stack: Vec<PostingList> = Vec::new();
        for tok in postfix {
            let result = match tok {
                Token::Term(term) => self.index.postings(term)?,
                Token::Not => {
                    let operand = pop(&mut stack, tok)?;
                    setops::negate(&operand, self.index.universe())
                }
                Token::And | Token::Or | Token::AndNot => {
                    let right = pop(&mut stack, tok)?;
                    let left = pop(&mut stack, tok)?;
                    match tok {
                        Token::And => setops::intersect(&left, &right),
                        Token::Or => setops::union(&left, &right),
                        _ => setops::and_not(&left, &right),
                    }
                }
                Token::LeftParen | Token::RightParen => return Err(QueryError::UnbalancedParentheses.into()),
            };
            stack.push(result);
        }
        match stack.len() {
            1 => Ok(stack.pop().unwrap_or_default()),
            0 => Err(QueryError::Empty.into()),
            n => Err(QueryError::UnconsumedOperands(n).into()),
        }
    }

    /// Result line for `query`: ascending ids, an empty line for no matches,
    /// or [`INVALID_QUERY`]. Errors other than malformed queries propagate.
    pub fn result_line(&self, query: &str) -> Result<String> {
        match self.search(query) {
            Ok(list) => Ok(list.to_string()),
            Err(e) if e.is_query_local() => {
                tracing::debug!(query, error = %e, "invalid query");
                Ok(INVALID_QUERY.to_string())
            }
            Err(e) => Err(e),
        }
    }
}

fn pop(stack: &mut Vec<PostingList>, op: &Token) -> std::result::Result<PostingList, QueryError> {
    stack.pop().ok_or_else(|| QueryError::MissingOperand(op.to_string()))
}
