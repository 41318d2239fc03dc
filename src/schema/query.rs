//! Schema discovery query text for SQL Server
//!
//! The discovery collaborator executes these queries; this module only
//! renders their text. Column aliases match the row field names so results
//! can be loaded with [`super::load_store_schema`].

use super::filter::is_wildcard;
use super::{FilterEffect, SchemaFilterEntry, SchemaObjectKind};

const COLUMN_DETAILS_SELECT: &str = r#"SELECT
    c.TABLE_CATALOG AS [catalog],
    c.TABLE_SCHEMA AS [schema],
    c.TABLE_NAME AS [table_name],
    c.COLUMN_NAME AS [column_name],
    c.ORDINAL_POSITION AS [ordinal],
    CAST(CASE c.IS_NULLABLE WHEN 'YES' THEN 1 ELSE 0 END AS bit) AS [is_nullable],
    CASE WHEN c.CHARACTER_MAXIMUM_LENGTH = -1 THEN c.DATA_TYPE + '(max)' ELSE c.DATA_TYPE END AS [data_type],
    c.CHARACTER_MAXIMUM_LENGTH AS [maximum_length],
    c.NUMERIC_PRECISION AS [precision],
    c.DATETIME_PRECISION AS [date_time_precision],
    c.NUMERIC_SCALE AS [scale],
    CAST(COLUMNPROPERTY(OBJECT_ID(QUOTENAME(c.TABLE_SCHEMA) + '.' + QUOTENAME(c.TABLE_NAME)), c.COLUMN_NAME, 'IsIdentity') AS bit) AS [is_identity],
    CAST(CASE WHEN COLUMNPROPERTY(OBJECT_ID(QUOTENAME(c.TABLE_SCHEMA) + '.' + QUOTENAME(c.TABLE_NAME)), c.COLUMN_NAME, 'IsComputed') = 1
              OR c.DATA_TYPE = 'timestamp' THEN 1 ELSE 0 END AS bit) AS [is_server_generated],
    CAST(CASE WHEN EXISTS (
        SELECT 1
        FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
        JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE k
          ON k.CONSTRAINT_CATALOG = tc.CONSTRAINT_CATALOG
         AND k.CONSTRAINT_SCHEMA = tc.CONSTRAINT_SCHEMA
         AND k.CONSTRAINT_NAME = tc.CONSTRAINT_NAME
        WHERE tc.CONSTRAINT_TYPE = 'PRIMARY KEY'
          AND k.TABLE_SCHEMA = c.TABLE_SCHEMA
          AND k.TABLE_NAME = c.TABLE_NAME
          AND k.COLUMN_NAME = c.COLUMN_NAME) THEN 1 ELSE 0 END AS bit) AS [is_primary_key]
FROM INFORMATION_SCHEMA.COLUMNS c
JOIN INFORMATION_SCHEMA.TABLES t
  ON t.TABLE_CATALOG = c.TABLE_CATALOG
 AND t.TABLE_SCHEMA = c.TABLE_SCHEMA
 AND t.TABLE_NAME = c.TABLE_NAME"#;

const FUNCTION_DETAILS_SELECT: &str = r#"SELECT
    r.ROUTINE_CATALOG AS [catalog],
    r.ROUTINE_SCHEMA AS [schema],
    r.ROUTINE_NAME AS [function_name],
    r.DATA_TYPE AS [return_type],
    CAST(0 AS bit) AS [is_aggregate],
    CAST(CASE WHEN r.ROUTINE_TYPE = 'FUNCTION' THEN 1 ELSE 0 END AS bit) AS [is_composable],
    CAST(0 AS bit) AS [is_builtin],
    CAST(0 AS bit) AS [is_niladic],
    CAST(CASE WHEN r.DATA_TYPE = 'TABLE' THEN 1 ELSE 0 END AS bit) AS [is_tvf],
    p.PARAMETER_NAME AS [parameter_name],
    p.DATA_TYPE AS [parameter_type],
    p.PARAMETER_MODE AS [parameter_direction]
FROM INFORMATION_SCHEMA.ROUTINES r
LEFT JOIN INFORMATION_SCHEMA.PARAMETERS p
  ON p.SPECIFIC_CATALOG = r.SPECIFIC_CATALOG
 AND p.SPECIFIC_SCHEMA = r.SPECIFIC_SCHEMA
 AND p.SPECIFIC_NAME = r.SPECIFIC_NAME
 AND p.IS_RESULT = 'NO'"#;

impl SchemaObjectKind {
    /// Columns holding the (catalog, schema, name) identity of the object
    fn identity_columns(self) -> [&'static str; 3] {
        match self {
            SchemaObjectKind::Tables | SchemaObjectKind::Views => {
                ["t.TABLE_CATALOG", "t.TABLE_SCHEMA", "t.TABLE_NAME"]
            }
            SchemaObjectKind::Functions => {
                ["r.ROUTINE_CATALOG", "r.ROUTINE_SCHEMA", "r.ROUTINE_NAME"]
            }
        }
    }

    fn base_query(self) -> (&'static str, &'static str) {
        match self {
            SchemaObjectKind::Tables => (COLUMN_DETAILS_SELECT, "t.TABLE_TYPE = 'BASE TABLE'"),
            SchemaObjectKind::Views => (COLUMN_DETAILS_SELECT, "t.TABLE_TYPE = 'VIEW'"),
            SchemaObjectKind::Functions => (FUNCTION_DETAILS_SELECT, "1 = 1"),
        }
    }

    fn order_by(self) -> &'static str {
        match self {
            SchemaObjectKind::Tables | SchemaObjectKind::Views => {
                "c.TABLE_CATALOG, c.TABLE_SCHEMA, c.TABLE_NAME, c.ORDINAL_POSITION"
            }
            SchemaObjectKind::Functions => {
                "r.ROUTINE_CATALOG, r.ROUTINE_SCHEMA, r.ROUTINE_NAME, p.ORDINAL_POSITION"
            }
        }
    }
}

/// Query text plus its named parameter values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaQuery {
    pub text: String,
    pub parameters: Vec<(String, String)>,
}

/// Renders the discovery query for one kind of object under a set of filters
pub struct SchemaQueryGenerator<'a> {
    kind: SchemaObjectKind,
    filters: &'a [SchemaFilterEntry],
}

impl<'a> SchemaQueryGenerator<'a> {
    pub fn new(kind: SchemaObjectKind, filters: &'a [SchemaFilterEntry]) -> Self {
        Self { kind, filters }
    }

    pub fn generate(&self) -> SchemaQuery {
        let (select, base_predicate) = self.kind.base_query();
        let mut parameters = Vec::new();

        let relevant = self.filters.iter().filter(|f| f.applies_to(self.kind));
        let mut allows = Vec::new();
        let mut excludes = Vec::new();
        for entry in relevant {
            let clause = self.entry_clause(entry, &mut parameters);
            match entry.effect {
                FilterEffect::Allow => allows.push(clause),
                FilterEffect::Exclude => excludes.push(format!("NOT ({})", clause)),
            }
        }

        let mut predicates = vec![base_predicate.to_string()];
        if !allows.is_empty() {
            predicates.push(format!("({})", allows.join("\n    OR ")));
        }
        predicates.extend(excludes);

        let text = format!(
            "{}\nWHERE {}\nORDER BY {}",
            select,
            predicates.join("\n  AND "),
            self.kind.order_by()
        );
        SchemaQuery { text, parameters }
    }

    /// `LIKE` conditions for the constrained parts of one entry
    fn entry_clause(
        &self,
        entry: &SchemaFilterEntry,
        parameters: &mut Vec<(String, String)>,
    ) -> String {
        let columns = self.kind.identity_columns();
        let parts = [&entry.catalog, &entry.schema, &entry.name];

        let conditions: Vec<String> = columns
            .iter()
            .zip(parts)
            .filter_map(|(column, part)| {
                let pattern = part.as_deref().filter(|p| !is_wildcard(Some(*p)))?;
                let name = format!("@p{}", parameters.len());
                parameters.push((name.clone(), pattern.to_string()));
                Some(format!("{} LIKE {}", column, name))
            })
            .collect();

        if conditions.is_empty() {
            "1 = 1".to_string()
        } else {
            conditions.join(" AND ")
        }
    }
}
