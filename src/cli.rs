use crate::database::Database;
use crate::errors::DbError;
use crate::executor::QueryResult;
use crate::storage::TableStorage;
use std::io::{self, BufRead, IsTerminal, Write};

/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// SELECT or INSERT, handed to the grammar
    Sql(String),
    /// HORIZONTAL SCALING <table> [shard_size]
    HorizontalScaling {
        table: String,
        shard_size: Option<usize>,
    },
    /// VERTICAL SCALING <table> <a,b> <c> ...
    VerticalScaling {
        table: String,
        column_groups: Vec<Vec<String>>,
    },
    /// .create <table> <col1,col2,...>
    CreateTable { table: String, columns: Vec<String> },
    ListTables,
    Help,
    Quit,
    Unsupported(String),
}

/// Interactive command loop over a [`Database`].
pub struct DatabaseCli<S: TableStorage> {
    database: Database<S>,
    default_shard_size: usize,
}

impl<S: TableStorage> DatabaseCli<S> {
    /// Wraps `database`; `default_shard_size` applies when a scaling command names none.
    pub fn new(database: Database<S>, default_shard_size: usize) -> Self {
        Self {
            database,
            default_shard_size,
        }
    }

    /// The underlying store.
    pub fn database(&self) -> &Database<S> {
        &self.database
    }

    /// Runs against stdin/stdout until `exit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        let is_interactive = io::stdin().is_terminal();
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        self.run_with(stdin.lock(), &mut stdout, is_interactive)
    }

    /// Command loop over any input and output. Prompt and banner only when `is_interactive`.
    pub fn run_with<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W, is_interactive: bool) -> io::Result<()> {
        if is_interactive {
            self.print_welcome(out)?;
        }

        loop {
            if is_interactive {
                write!(out, "scaledb> ")?;
                out.flush()?;
            }

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }

            for cmd in split_statements(&line) {
                match parse_command(cmd) {
                    CliCommand::Quit => {
                        if is_interactive {
                            writeln!(out, "👋 Bye!")?;
                        }
                        return Ok(());
                    }
                    command => {
                        if let Err(e) = self.execute_command(command, out)? {
                            writeln!(out, "Error: {}", e)?;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Outer `Err` is an output failure; inner `Err` is a command failure to report.
    fn execute_command<W: Write>(&mut self, command: CliCommand, out: &mut W) -> io::Result<Result<(), DbError>> {
        match command {
            CliCommand::Sql(sql) => match self.database.execute_sql(&sql) {
                Ok(QueryResult::Success { .. }) => writeln!(out, "Insert successful.")?,
                Ok(result @ QueryResult::Select { .. }) => {
                    let rows = result.string_rows();
                    if rows.is_empty() {
                        writeln!(out, "No results found.")?;
                    } else if let QueryResult::Select { columns, execution_time_us, .. } = &result {
                        print_table_result(out, columns, &rows)?;
                        writeln!(out, "⏱️ {} row(s) in {}μs", rows.len(), execution_time_us)?;
                    }
                }
                Err(e) => return Ok(Err(e)),
            },
            CliCommand::HorizontalScaling { table, shard_size } => {
                let shard_size = shard_size.unwrap_or(self.default_shard_size);
                match self.database.horizontal_scaling(&table, shard_size) {
                    Ok(shards) => writeln!(
                        out,
                        "Table {} scaled horizontally into {} shard(s).",
                        table,
                        shards.len()
                    )?,
                    Err(e) => return Ok(Err(e)),
                }
            }
            CliCommand::VerticalScaling { table, column_groups } => {
                match self.database.vertical_scaling(&table, &column_groups) {
                    Ok(partitions) => writeln!(
                        out,
                        "Table {} scaled vertically into {} partition(s).",
                        table,
                        partitions.len()
                    )?,
                    Err(e) => return Ok(Err(e)),
                }
            }
            CliCommand::CreateTable { table, columns } => match self.database.create_table(&table, columns) {
                Ok(()) => writeln!(out, "Table {} created.", table)?,
                Err(e) => return Ok(Err(e)),
            },
            CliCommand::ListTables => self.list_tables(out)?,
            CliCommand::Help => show_help(out)?,
            CliCommand::Unsupported(_) => writeln!(out, "Unsupported query.")?,
            // Handled by the loop
            CliCommand::Quit => {}
        }
        Ok(Ok(()))
    }

    fn print_welcome<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "🚀 scaledb - sharding table store")?;
        writeln!(out, "==================================")?;
        writeln!(out, "📋 Tables loaded: {}", self.database.table_names().len())?;
        writeln!(out, "💡 Type '.help' for help, 'exit' to quit")?;
        writeln!(out)
    }

    fn list_tables<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let names = self.database.table_names();
        if names.is_empty() {
            return writeln!(out, "📋 No tables yet");
        }

        writeln!(out, "┌─────────────────────┬─────────┬─────────┐")?;
        writeln!(out, "│ Table               │ Columns │ Rows    │")?;
        writeln!(out, "├─────────────────────┼─────────┼─────────┤")?;
        for name in names {
            if let Some(table) = self.database.table(name) {
                writeln!(
                    out,
                    "│ {:19} │ {:7} │ {:7} │",
                    name,
                    table.columns.len(),
                    table.row_count()
                )?;
            }
        }
        writeln!(out, "└─────────────────────┴─────────┴─────────┘")
    }
}

/// Classifies one command. Statement prefixes are case-sensitive; `exit` is not.
pub fn parse_command(input: &str) -> CliCommand {
    let trimmed = input.trim();

    if trimmed.eq_ignore_ascii_case("exit") {
        return CliCommand::Quit;
    }

    if trimmed.starts_with('.') {
        let mut parts = trimmed.split_whitespace();
        return match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(".help" | ".h"), None, _, _) => CliCommand::Help,
            (Some(".quit" | ".q" | ".exit"), None, _, _) => CliCommand::Quit,
            (Some(".tables" | ".t"), None, _, _) => CliCommand::ListTables,
            (Some(".create"), Some(table), Some(columns), None) => CliCommand::CreateTable {
                table: table.to_string(),
                columns: split_group(columns),
            },
            _ => CliCommand::Unsupported(trimmed.to_string()),
        };
    }

    if trimmed.starts_with("SELECT") || trimmed.starts_with("INSERT") {
        return CliCommand::Sql(trimmed.to_string());
    }

    if let Some(args) = strip_keyword(trimmed, "HORIZONTAL SCALING") {
        let args: Vec<&str> = args.split_whitespace().collect();
        return match args.as_slice() {
            [table] => CliCommand::HorizontalScaling {
                table: table.to_string(),
                shard_size: None,
            },
            [table, size] => match size.parse() {
                Ok(size) => CliCommand::HorizontalScaling {
                    table: table.to_string(),
                    shard_size: Some(size),
                },
                Err(_) => CliCommand::Unsupported(trimmed.to_string()),
            },
            _ => CliCommand::Unsupported(trimmed.to_string()),
        };
    }

    if let Some(args) = strip_keyword(trimmed, "VERTICAL SCALING") {
        let mut args = args.split_whitespace();
        return match args.next() {
            Some(table) => CliCommand::VerticalScaling {
                table: table.to_string(),
                column_groups: args.map(split_group).collect(),
            },
            None => CliCommand::Unsupported(trimmed.to_string()),
        };
    }

    CliCommand::Unsupported(trimmed.to_string())
}

/// Splits a line on `;` outside quotes; empty pieces are dropped.
pub fn split_statements(line: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in line.char_indices() {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(open), _) if c == open => quote = None,
            (None, ';') => {
                statements.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    statements.push(&line[start..]);

    statements
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

// Keyword followed by whitespace or end of input.
fn strip_keyword<'a>(input: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = input.strip_prefix(keyword)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

fn split_group(group: &str) -> Vec<String> {
    group
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn show_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "🆘 scaledb help")?;
    writeln!(out)?;
    writeln!(out, "🔸 Statements:")?;
    writeln!(out, "  SELECT col1, col2 FROM table [WHERE col <op> value]")?;
    writeln!(out, "  SELECT * FROM table")?;
    writeln!(out, "  INSERT INTO table (col1, col2) VALUES (v1, 'v 2')")?;
    writeln!(out, "  Operators: =, !=, >, >=, <, <=")?;
    writeln!(out)?;
    writeln!(out, "🔸 Redistribution:")?;
    writeln!(out, "  HORIZONTAL SCALING table [shard_size]")?;
    writeln!(out, "  VERTICAL SCALING table col1,col2 col3 ...")?;
    writeln!(out)?;
    writeln!(out, "🔸 Meta commands:")?;
    writeln!(out, "  .create table col1,col2,...  - create an empty table")?;
    writeln!(out, "  .tables, .t                  - list tables")?;
    writeln!(out, "  .help, .h                    - show this help")?;
    writeln!(out, "  exit, .quit, .q              - quit")
}

/// Boxed table rendering of a result set.
fn print_table_result<W: Write>(out: &mut W, columns: &[String], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let border = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(mid), right)
    };
    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!(" {:width$} ", cell, width = *width))
            .collect();
        format!("│{}│", padded.join("│"))
    };

    writeln!(out, "{}", border("┌", "┬", "┐"))?;
    writeln!(out, "{}", line(columns))?;
    writeln!(out, "{}", border("├", "┼", "┤"))?;
    for row in rows {
        writeln!(out, "{}", line(row.as_slice()))?;
    }
    writeln!(out, "{}", border("└", "┴", "┘"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaling::{FragmentId, FragmentKind};
    use crate::storage::MemoryStorage;

    fn run_script(script: &str) -> (String, DatabaseCli<MemoryStorage>) {
        let mut cli = DatabaseCli::new(Database::new(MemoryStorage::new()), 5);
        let mut out = Vec::new();
        cli.run_with(script.as_bytes(), &mut out, false).unwrap();
        (String::from_utf8(out).unwrap(), cli)
    }

    #[test]
    fn test_parse_command_prefixes() {
        assert_eq!(parse_command("SELECT a FROM t"), CliCommand::Sql("SELECT a FROM t".to_string()));
        assert_eq!(parse_command("EXIT"), CliCommand::Quit);
        assert_eq!(
            parse_command("HORIZONTAL SCALING users"),
            CliCommand::HorizontalScaling {
                table: "users".to_string(),
                shard_size: None
            }
        );
        assert_eq!(
            parse_command("HORIZONTAL SCALING users 3"),
            CliCommand::HorizontalScaling {
                table: "users".to_string(),
                shard_size: Some(3)
            }
        );
        assert_eq!(
            parse_command("VERTICAL SCALING users id,name age"),
            CliCommand::VerticalScaling {
                table: "users".to_string(),
                column_groups: vec![
                    vec!["id".to_string(), "name".to_string()],
                    vec!["age".to_string()]
                ],
            }
        );
        assert_eq!(
            parse_command(".create users id,name"),
            CliCommand::CreateTable {
                table: "users".to_string(),
                columns: vec!["id".to_string(), "name".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_command_unsupported() {
        for input in [
            "select a from t",
            "DELETE FROM t",
            "HORIZONTAL SCALING",
            "HORIZONTAL SCALING users many",
            "VERTICAL SCALING",
            "HORIZONTAL SCALINGusers",
            "VERTICAL SCALINGusers a",
            ".create users",
            ".frobnicate",
        ] {
            assert!(
                matches!(parse_command(input), CliCommand::Unsupported(_)),
                "expected unsupported for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_session_insert_select_and_scale() {
        let (output, cli) = run_script(
            ".create users name,age\n\
             INSERT INTO users (name, age) VALUES (Ada, 36); INSERT INTO users (name, age) VALUES (Bob, 17)\n\
             SELECT name FROM users WHERE age > 20\n\
             SELECT name FROM users WHERE age > 99\n\
             HORIZONTAL SCALING users 1\n\
             VERTICAL SCALING users name age\n\
             exit\n\
             SELECT name FROM users\n",
        );

        assert!(output.contains("Table users created."));
        assert_eq!(output.matches("Insert successful.").count(), 2);
        assert!(output.contains("│ Ada  │"));
        assert!(!output.contains("Bob  │"));
        assert!(output.contains("No results found."));
        assert!(output.contains("Table users scaled horizontally into 2 shard(s)."));
        assert!(output.contains("Table users scaled vertically into 2 partition(s)."));

        let storage = cli.database().storage();
        assert_eq!(
            storage.fragments_of("users"),
            vec![
                FragmentId::new(FragmentKind::Shard, 0),
                FragmentId::new(FragmentKind::Shard, 1),
                FragmentId::new(FragmentKind::Partition, 0),
                FragmentId::new(FragmentKind::Partition, 1),
            ]
        );
    }

    #[test]
    fn test_session_reports_errors_and_unsupported() {
        let (output, _) = run_script(
            "SELECT a FROM ghosts\n\
             HORIZONTAL SCALING ghosts\n\
             UPDATE t SET a = 1\n",
        );

        assert_eq!(output.matches("Error: Execution error: Table 'ghosts' not found").count(), 2);
        assert!(output.contains("Unsupported query."));
    }

    #[test]
    fn test_split_statements_respects_quotes() {
        assert_eq!(
            split_statements("SELECT a FROM t; INSERT INTO t (a) VALUES ('x;y');;"),
            vec!["SELECT a FROM t", "INSERT INTO t (a) VALUES ('x;y')"]
        );
        assert_eq!(
            split_statements(r#"INSERT INTO t (a, b) VALUES ("it's;", 'say "hi";')"#),
            vec![r#"INSERT INTO t (a, b) VALUES ("it's;", 'say "hi";')"#]
        );
        assert!(split_statements(" ; \n").is_empty());
    }

    #[test]
    fn test_session_quoted_semicolon_round_trip() {
        let (output, cli) = run_script(
            ".create t a\n\
             INSERT INTO t (a) VALUES ('x;y'); SELECT a FROM t\n",
        );

        assert!(output.contains("Insert successful."));
        assert!(output.contains("│ x;y │"));
        assert!(!output.contains("Unsupported query."));
        let rows = &cli.database().table("t").unwrap().rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_as_string("a"), "x;y");
    }

    #[test]
    fn test_default_shard_size_is_used() {
        let (output, _) = run_script(
            ".create t a\n\
             INSERT INTO t (a) VALUES (1)\n\
             INSERT INTO t (a) VALUES (2)\n\
             INSERT INTO t (a) VALUES (3)\n\
             INSERT INTO t (a) VALUES (4)\n\
             INSERT INTO t (a) VALUES (5)\n\
             INSERT INTO t (a) VALUES (6)\n\
             HORIZONTAL SCALING t\n",
        );
        assert!(output.contains("Table t scaled horizontally into 2 shard(s)."));
    }
}
