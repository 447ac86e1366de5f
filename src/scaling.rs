//! Redistribution of a table across fragments.
//!
//! Horizontal scaling cuts the row sequence into contiguous shards that keep
//! every column. Vertical scaling projects every row onto column groups, one
//! partition per group. Both are pure functions of the source table; storing
//! the fragments is left to [`crate::Database`].

use crate::errors::ExecError;
use crate::row::Row;
use crate::storage::TableData;
use crate::table::{validate_columns, Table};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FragmentKind {
    /// Row subset, all columns.
    Shard,
    /// Column subset, all rows.
    Partition,
}

impl FragmentKind {
    /// Tag used in fragment file names.
    pub fn file_tag(&self) -> &'static str {
        match self {
            FragmentKind::Shard => "shard",
            FragmentKind::Partition => "partition",
        }
    }
}

/// Identity of a fragment within its source table. The kind is part of the
/// identity, so shard 0 and partition 0 of the same table are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FragmentId {
    pub kind: FragmentKind,
    pub index: usize,
}

impl FragmentId {
    pub fn new(kind: FragmentKind, index: usize) -> Self {
        Self { kind, index }
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.file_tag(), self.index)
    }
}

/// A derived table produced by a split.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub table_name: String,
    pub id: FragmentId,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Fragment {
    /// Document form for storage.
    pub fn to_data(&self) -> TableData {
        TableData {
            columns: self.columns.clone(),
            rows: self.rows.clone(),
        }
    }
}

/// Splits rows into chunks of `shard_size`; shard `i` holds rows
/// `[i * shard_size, (i + 1) * shard_size)`. An empty table yields no shards.
pub fn horizontal_split(table: &Table, shard_size: usize) -> Result<Vec<Fragment>, ExecError> {
    if shard_size == 0 {
        return Err(ExecError::InvalidShardSize);
    }

    let fragments = table
        .rows
        .chunks(shard_size)
        .enumerate()
        .map(|(index, chunk)| Fragment {
            table_name: table.name.clone(),
            id: FragmentId::new(FragmentKind::Shard, index),
            columns: table.columns.clone(),
            rows: chunk.to_vec(),
        })
        .collect();

    Ok(fragments)
}

/// Projects every row onto each column group. Groups may share columns, but
/// each one must be non-empty, repeat-free, and drawn from the table's columns.
/// All groups are checked before any fragment is built.
pub fn vertical_split(table: &Table, column_groups: &[Vec<String>]) -> Result<Vec<Fragment>, ExecError> {
    for (index, group) in column_groups.iter().enumerate() {
        if group.is_empty() {
            return Err(ExecError::EmptyColumnGroup(index));
        }
        table.check_columns(group)?;
        validate_columns(group)?;
    }

    let fragments = column_groups
        .iter()
        .enumerate()
        .map(|(index, group)| Fragment {
            table_name: table.name.clone(),
            id: FragmentId::new(FragmentKind::Partition, index),
            columns: group.clone(),
            rows: table.rows.iter().map(|row| row.project(group)).collect(),
        })
        .collect();

    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn numbered_table(row_count: usize) -> Table {
        let mut table = Table::new(
            "events".to_string(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        )
        .unwrap();
        for i in 0..row_count {
            table.insert_row(Row::from_values([
                ("a", format!("a{}", i)),
                ("b", format!("b{}", i)),
                ("c", format!("c{}", i)),
            ]));
        }
        table
    }

    fn group(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_horizontal_split_twelve_rows_by_five() {
        let table = numbered_table(12);
        let shards = horizontal_split(&table, 5).unwrap();

        let sizes: Vec<usize> = shards.iter().map(|s| s.rows.len()).collect();
        assert_eq!(sizes, vec![5, 5, 2]);

        for (i, shard) in shards.iter().enumerate() {
            assert_eq!(shard.id, FragmentId::new(FragmentKind::Shard, i));
            assert_eq!(shard.columns, table.columns);
        }

        let rejoined: Vec<Row> = shards.into_iter().flat_map(|s| s.rows).collect();
        assert_eq!(rejoined, table.rows);
    }

    #[test]
    fn test_horizontal_split_exact_multiple() {
        let shards = horizontal_split(&numbered_table(10), 5).unwrap();
        assert_eq!(shards.len(), 2);
        assert!(shards.iter().all(|s| s.rows.len() == 5));
    }

    #[test]
    fn test_horizontal_split_empty_table() {
        let shards = horizontal_split(&numbered_table(0), 5).unwrap();
        assert!(shards.is_empty());
    }

    #[test]
    fn test_horizontal_split_rejects_zero_size() {
        let result = horizontal_split(&numbered_table(3), 0);
        assert!(matches!(result, Err(ExecError::InvalidShardSize)));
    }

    #[test]
    fn test_vertical_split_projects_groups() {
        let table = numbered_table(4);
        let partitions = vertical_split(&table, &[group(&["a"]), group(&["b", "c"])]).unwrap();

        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[0].id, FragmentId::new(FragmentKind::Partition, 0));
        assert_eq!(partitions[1].columns, group(&["b", "c"]));

        for (i, source) in table.rows.iter().enumerate() {
            let left = &partitions[0].rows[i];
            let right = &partitions[1].rows[i];

            assert_eq!(left.len(), 1);
            assert_eq!(left.get("a"), source.get("a"));

            assert_eq!(right.len(), 2);
            assert_eq!(right.get("b"), source.get("b"));
            assert_eq!(right.get("c"), source.get("c"));
        }
    }

    #[test]
    fn test_vertical_split_allows_overlapping_groups() {
        let table = numbered_table(2);
        let partitions = vertical_split(&table, &[group(&["a", "b"]), group(&["b"])]).unwrap();
        assert_eq!(partitions[1].rows[1].get("b"), Some(&Value::from("b1")));
        assert_eq!(partitions[0].rows.len(), 2);
    }

    #[test]
    fn test_vertical_split_rejects_bad_groups() {
        let table = numbered_table(2);

        let unknown = vertical_split(&table, &[group(&["a"]), group(&["zzz"])]);
        assert!(matches!(unknown, Err(ExecError::UnknownColumn { column, .. }) if column == "zzz"));

        let empty = vertical_split(&table, &[group(&["a"]), Vec::new()]);
        assert!(matches!(empty, Err(ExecError::EmptyColumnGroup(1))));

        let repeated = vertical_split(&table, &[group(&["a", "a"])]);
        assert!(matches!(repeated, Err(ExecError::DuplicateColumn(_))));
    }

    #[test]
    fn test_vertical_split_no_groups() {
        let partitions = vertical_split(&numbered_table(3), &[]).unwrap();
        assert!(partitions.is_empty());
    }
}
