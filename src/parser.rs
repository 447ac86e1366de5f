use crate::errors::ParseError;
use crate::types::Value;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{map, opt, rest, verify},
    multi::separated_list1,
    sequence::{delimited, tuple},
    IResult,
};

/// Parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Select(SelectCommand),
    Insert(InsertCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectCommand {
    /// Requested columns in output order; empty for `*`.
    pub columns: Vec<String>,
    pub table: String,
    /// Raw condition text, compiled by the executor.
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertCommand {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

/// Parses one statement. The whole input must be consumed.
pub fn parse_query(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();

    match statement(trimmed) {
        Ok((remaining, command)) => {
            if !remaining.trim().is_empty() {
                return Err(ParseError::TrailingInput(remaining.trim().to_string()));
            }
            if let Command::Insert(insert) = &command {
                if insert.columns.len() != insert.values.len() {
                    return Err(ParseError::ColumnValueCountMismatch {
                        columns: insert.columns.len(),
                        values: insert.values.len(),
                    });
                }
            }
            Ok(command)
        }
        Err(_) => Err(ParseError::Unsupported(trimmed.to_string())),
    }
}

fn statement(input: &str) -> IResult<&str, Command> {
    alt((
        map(select_statement, Command::Select),
        map(insert_statement, Command::Insert),
    ))(input)
}

// SELECT <col-list> FROM <table> [WHERE <condition>]
fn select_statement(input: &str) -> IResult<&str, SelectCommand> {
    let (input, _) = tag("SELECT")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, columns) = alt((map(char('*'), |_| Vec::new()), identifier_list))(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag("FROM")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, table) = identifier(input)?;
    let (input, condition) = opt(where_clause)(input)?;

    Ok((
        input,
        SelectCommand {
            columns,
            table: table.to_string(),
            condition,
        },
    ))
}

// The condition is everything after WHERE; its shape is checked at execution.
fn where_clause(input: &str) -> IResult<&str, String> {
    let (input, _) = multispace1(input)?;
    let (input, _) = tag("WHERE")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, text) = verify(rest, |s: &str| !s.trim().is_empty())(input)?;

    Ok((input, text.trim().to_string()))
}

// INSERT INTO <table> (<col-list>) VALUES (<val-list>)
fn insert_statement(input: &str) -> IResult<&str, InsertCommand> {
    let (input, _) = tag("INSERT")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag("INTO")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, table) = identifier(input)?;
    let (input, _) = multispace0(input)?;
    let (input, columns) = parenthesized(identifier_list)(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = tag("VALUES")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, values) = parenthesized(separated_list1(comma, value_literal))(input)?;

    Ok((
        input,
        InsertCommand {
            table: table.to_string(),
            columns,
            values,
        },
    ))
}

fn parenthesized<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(
        tuple((char('('), multispace0)),
        inner,
        tuple((multispace0, char(')'))),
    )
}

fn comma(input: &str) -> IResult<&str, char> {
    delimited(multispace0, char(','), multispace0)(input)
}

fn identifier_list(input: &str) -> IResult<&str, Vec<String>> {
    map(separated_list1(comma, identifier), |names| {
        names.into_iter().map(|s| s.to_string()).collect()
    })(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

// 'text' | "text" | NULL | bare-token
fn value_literal(input: &str) -> IResult<&str, Value> {
    alt((
        map(quoted_string, |s| Value::Text(s.to_string())),
        map(bare_token, |s| {
            if s.eq_ignore_ascii_case("NULL") {
                Value::Null
            } else {
                Value::Text(s.to_string())
            }
        }),
    ))(input)
}

fn quoted_string(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_until("'"), char('\'')),
        delimited(char('"'), take_until("\""), char('"')),
    ))(input)
}

fn bare_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !matches!(c, ',' | '(' | ')' | '\'' | '"'))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(sql: &str) -> SelectCommand {
        match parse_query(sql).unwrap() {
            Command::Select(select) => select,
            other => panic!("Expected Select statement, got {:?}", other),
        }
    }

    fn insert(sql: &str) -> InsertCommand {
        match parse_query(sql).unwrap() {
            Command::Insert(insert) => insert,
            other => panic!("Expected Insert statement, got {:?}", other),
        }
    }

    #[test]
    fn test_select_parsing() {
        let result = select("SELECT name, age FROM users");
        assert_eq!(result.table, "users");
        assert_eq!(result.columns, vec!["name", "age"]);
        assert!(result.condition.is_none());
    }

    #[test]
    fn test_select_without_space_after_comma() {
        let result = select("SELECT a,b , c FROM t");
        assert_eq!(result.columns, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_select_wildcard() {
        let result = select("SELECT * FROM users");
        assert!(result.columns.is_empty());
    }

    #[test]
    fn test_select_with_where_parsing() {
        let result = select("  SELECT name FROM users WHERE age  >   30  ");
        assert_eq!(result.condition.as_deref(), Some("age  >   30"));
    }

    #[test]
    fn test_select_condition_text_is_deferred() {
        // Shape errors surface at evaluation, not here.
        let result = select("SELECT a FROM t WHERE a > 5 junk");
        assert_eq!(result.condition.as_deref(), Some("a > 5 junk"));
    }

    #[test]
    fn test_select_dangling_where_is_rejected() {
        assert!(matches!(
            parse_query("SELECT a FROM t WHERE"),
            Err(ParseError::TrailingInput(rest)) if rest == "WHERE"
        ));
        assert!(matches!(
            parse_query("SELECT a FROM t WHERE   "),
            Err(ParseError::TrailingInput(_))
        ));
    }

    #[test]
    fn test_select_trailing_garbage() {
        assert_eq!(
            parse_query("SELECT a FROM t;"),
            Err(ParseError::TrailingInput(";".to_string()))
        );
        assert_eq!(
            parse_query("SELECT a FROM t LIMIT 3"),
            Err(ParseError::TrailingInput("LIMIT 3".to_string()))
        );
    }

    #[test]
    fn test_insert_parsing() {
        let result = insert("INSERT INTO users (id, name, age) VALUES (1, 'Ada Lovelace', NULL)");
        assert_eq!(result.table, "users");
        assert_eq!(result.columns, vec!["id", "name", "age"]);
        assert_eq!(
            result.values,
            vec![Value::from("1"), Value::from("Ada Lovelace"), Value::Null]
        );
    }

    #[test]
    fn test_insert_compact_form() {
        let result = insert("INSERT INTO t(a,b)VALUES(1,2)");
        assert_eq!(result.columns, vec!["a", "b"]);
        assert_eq!(result.values, vec![Value::from("1"), Value::from("2")]);
    }

    #[test]
    fn test_insert_quoted_values_keep_commas() {
        let result = insert(r#"INSERT INTO t (a, b) VALUES ("x, y", '')"#);
        assert_eq!(result.values, vec![Value::from("x, y"), Value::from("")]);
    }

    #[test]
    fn test_insert_count_mismatch() {
        assert_eq!(
            parse_query("INSERT INTO t (a, b) VALUES (1)"),
            Err(ParseError::ColumnValueCountMismatch { columns: 2, values: 1 })
        );
    }

    #[test]
    fn test_insert_empty_lists_unsupported() {
        assert!(matches!(
            parse_query("INSERT INTO t () VALUES ()"),
            Err(ParseError::Unsupported(_))
        ));
    }

    #[test]
    fn test_unsupported_statements() {
        for sql in [
            "DELETE FROM users",
            "select a from t",
            "SELECT FROM t",
            "SELECT a FROM",
            "INSERT INTO t VALUES (1)",
            "",
        ] {
            assert!(
                matches!(parse_query(sql), Err(ParseError::Unsupported(_))),
                "expected unsupported for {:?}",
                sql
            );
        }
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let sql = "SELECT a, b FROM t WHERE a >= 2";
        assert_eq!(parse_query(sql), parse_query(sql));
        let bad = "SELECT a FROM t garbage";
        assert_eq!(parse_query(bad), parse_query(bad));
    }
}
