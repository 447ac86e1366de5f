use crate::errors::EvalError;
use crate::row::Row;
use crate::types::{parse_decimal, Value};
use std::cmp::Ordering;
use std::fmt;

/// Comparison operators accepted in a WHERE condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Operator::Equal),
            "!=" => Some(Operator::NotEqual),
            ">" => Some(Operator::Greater),
            ">=" => Some(Operator::GreaterEqual),
            "<" => Some(Operator::Less),
            "<=" => Some(Operator::LessEqual),
            _ => None,
        }
    }

    pub fn to_symbol(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::Greater => ordering == Ordering::Greater,
            Operator::GreaterEqual => ordering != Ordering::Less,
            Operator::Less => ordering == Ordering::Less,
            Operator::LessEqual => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_symbol())
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Unquoted token; compared numerically when both sides are numbers.
    Bare(String),
    /// Quoted token, quotes removed; always compared as text.
    Quoted(String),
    Null,
}

impl Literal {
    fn parse(token: &str) -> Self {
        if token.eq_ignore_ascii_case("NULL") {
            return Literal::Null;
        }
        for quote in ['\'', '"'] {
            if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
                return Literal::Quoted(token[1..token.len() - 1].to_string());
            }
        }
        Literal::Bare(token.to_string())
    }
}

/// A compiled `<column> <operator> <literal>` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub literal: Literal,
}

impl Condition {
    /// Compiles condition text. Exactly three whitespace-separated tokens are
    /// required and the operator must come from the fixed set.
    pub fn parse(text: &str) -> Result<Self, EvalError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let [column, symbol, literal] = tokens.as_slice() else {
            return Err(EvalError::MalformedCondition(text.to_string()));
        };
        let operator =
            Operator::from_symbol(symbol).ok_or_else(|| EvalError::MalformedCondition(text.to_string()))?;

        Ok(Self {
            column: column.to_string(),
            operator,
            literal: Literal::parse(literal),
        })
    }

    pub fn evaluate(&self, row: &Row) -> Result<bool, EvalError> {
        let cell = row
            .get(&self.column)
            .ok_or_else(|| EvalError::UnknownColumn(self.column.clone()))?;
        Ok(self.matches(cell))
    }

    fn matches(&self, cell: &Value) -> bool {
        match (cell, &self.literal) {
            (Value::Null, Literal::Null) => self.operator == Operator::Equal,
            (Value::Text(_), Literal::Null) => self.operator == Operator::NotEqual,
            (Value::Null, _) => false,
            (Value::Text(left), Literal::Quoted(right)) => self.operator.accepts(left.as_str().cmp(right)),
            (Value::Text(left), Literal::Bare(right)) => match (parse_decimal(left), parse_decimal(right)) {
                (Some(l), Some(r)) => l.partial_cmp(&r).is_some_and(|o| self.operator.accepts(o)),
                _ => self.operator.accepts(left.as_str().cmp(right)),
            },
        }
    }
}

/// Evaluates condition text against a row in one step.
pub fn evaluate(condition: &str, row: &Row) -> Result<bool, EvalError> {
    Condition::parse(condition)?.evaluate(row)
}
