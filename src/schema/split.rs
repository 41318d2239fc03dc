//! Stable grouping of denormalized rows

use std::hash::Hash;

use indexmap::IndexMap;

use super::{FullyQualifiedName, FunctionDetailsRow, TableDetailsRow};

/// Group `rows` by `key`, keeping groups in first-seen order and rows in
/// input order within each group.
pub fn split_rows<'a, R, K, F>(rows: &'a [R], key: F) -> Vec<(K, Vec<&'a R>)>
where
    K: Hash + Eq,
    F: Fn(&R) -> K,
{
    let mut groups: IndexMap<K, Vec<&'a R>> = IndexMap::new();
    for row in rows {
        groups.entry(key(row)).or_default().push(row);
    }
    groups.into_iter().collect()
}

/// Group column rows by `catalog.schema.table`
pub fn split_table_rows(
    rows: &[TableDetailsRow],
) -> Vec<(FullyQualifiedName, Vec<&TableDetailsRow>)> {
    split_rows(rows, TableDetailsRow::table_key)
}

/// Group function rows by `catalog.schema.function`
pub fn split_function_rows(
    rows: &[FunctionDetailsRow],
) -> Vec<(FullyQualifiedName, Vec<&FunctionDetailsRow>)> {
    split_rows(rows, FunctionDetailsRow::function_key)
}
