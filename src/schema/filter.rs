//! Include/exclude filters over discovered schema objects
//!
//! Each part of an entry (catalog, schema, name) is a SQL `LIKE` pattern:
//! `%` matches any run of characters, `_` matches one character, and an
//! absent part matches everything.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{FullyQualifiedName, StoreSchemaDetails};
use crate::error::EdmGenError;

/// Kind of schema object a filter applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaObjectKind {
    Tables,
    Views,
    Functions,
}

impl std::str::FromStr for SchemaObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tables" | "table" => Ok(SchemaObjectKind::Tables),
            "views" | "view" => Ok(SchemaObjectKind::Views),
            "functions" | "function" => Ok(SchemaObjectKind::Functions),
            _ => Err(format!("Unknown schema object kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterEffect {
    #[default]
    Allow,
    Exclude,
}

fn all_kinds() -> Vec<SchemaObjectKind> {
    vec![
        SchemaObjectKind::Tables,
        SchemaObjectKind::Views,
        SchemaObjectKind::Functions,
    ]
}

/// One filter entry as written in the settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFilterEntry {
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "all_kinds")]
    pub object_types: Vec<SchemaObjectKind>,
    #[serde(default)]
    pub effect: FilterEffect,
}

impl SchemaFilterEntry {
    pub fn allow(catalog: Option<&str>, schema: Option<&str>, name: Option<&str>) -> Self {
        Self {
            catalog: catalog.map(str::to_string),
            schema: schema.map(str::to_string),
            name: name.map(str::to_string),
            object_types: all_kinds(),
            effect: FilterEffect::Allow,
        }
    }

    pub fn exclude(catalog: Option<&str>, schema: Option<&str>, name: Option<&str>) -> Self {
        Self {
            effect: FilterEffect::Exclude,
            ..Self::allow(catalog, schema, name)
        }
    }

    pub fn with_object_types(mut self, kinds: &[SchemaObjectKind]) -> Self {
        self.object_types = kinds.to_vec();
        self
    }

    pub fn applies_to(&self, kind: SchemaObjectKind) -> bool {
        self.object_types.contains(&kind)
    }
}

/// Whether a pattern part constrains anything
pub(crate) fn is_wildcard(part: Option<&str>) -> bool {
    match part {
        None => true,
        Some(p) => p.is_empty() || p == "%",
    }
}

/// Translate a LIKE pattern into an anchored, case-insensitive regex
fn like_to_regex(pattern: &str) -> Result<Regex, EdmGenError> {
    let mut expr = String::from("(?i)^");
    for c in pattern.chars() {
        match c {
            '%' => expr.push_str(".*"),
            '_' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|e| EdmGenError::InvalidFilterPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

#[derive(Debug)]
struct CompiledEntry {
    catalog: Option<Regex>,
    schema: Option<Regex>,
    name: Option<Regex>,
    object_types: Vec<SchemaObjectKind>,
    effect: FilterEffect,
}

impl CompiledEntry {
    fn compile(entry: &SchemaFilterEntry) -> Result<Self, EdmGenError> {
        let part = |p: &Option<String>| -> Result<Option<Regex>, EdmGenError> {
            if is_wildcard(p.as_deref()) {
                Ok(None)
            } else {
                like_to_regex(p.as_deref().unwrap_or_default()).map(Some)
            }
        };
        Ok(Self {
            catalog: part(&entry.catalog)?,
            schema: part(&entry.schema)?,
            name: part(&entry.name)?,
            object_types: entry.object_types.clone(),
            effect: entry.effect,
        })
    }

    fn matches(&self, key: &FullyQualifiedName) -> bool {
        let part_matches = |re: &Option<Regex>, value: Option<&str>| match re {
            None => true,
            Some(re) => re.is_match(value.unwrap_or_default()),
        };
        part_matches(&self.catalog, key.catalog.as_deref())
            && part_matches(&self.schema, key.schema.as_deref())
            && part_matches(&self.name, Some(&key.name))
    }
}

/// Compiled set of filter entries
#[derive(Debug, Default)]
pub struct SchemaFilter {
    entries: Vec<CompiledEntry>,
}

impl SchemaFilter {
    pub fn new(entries: &[SchemaFilterEntry]) -> Result<Self, EdmGenError> {
        let entries = entries
            .iter()
            .map(CompiledEntry::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// An object is excluded by any matching Exclude entry; otherwise it is
    /// included when no Allow entry targets its kind or one of them matches.
    pub fn is_included(&self, kind: SchemaObjectKind, key: &FullyQualifiedName) -> bool {
        let relevant = self.entries.iter().filter(|e| e.object_types.contains(&kind));

        let mut has_allow = false;
        let mut allowed = false;
        for entry in relevant {
            match entry.effect {
                FilterEffect::Exclude if entry.matches(key) => return false,
                FilterEffect::Exclude => {}
                FilterEffect::Allow => {
                    has_allow = true;
                    allowed = allowed || entry.matches(key);
                }
            }
        }
        !has_allow || allowed
    }

    /// Drop every row whose object is filtered out. Relationships survive only
    /// when both of their tables do.
    pub fn apply(&self, details: StoreSchemaDetails) -> StoreSchemaDetails {
        if self.is_empty() {
            return details;
        }

        let tables: Vec<_> = details
            .table_details
            .into_iter()
            .filter(|r| self.is_included(SchemaObjectKind::Tables, &r.table_key()))
            .collect();
        let views: Vec<_> = details
            .view_details
            .into_iter()
            .filter(|r| self.is_included(SchemaObjectKind::Views, &r.table_key()))
            .collect();

        let kept: HashSet<FullyQualifiedName> =
            tables.iter().chain(views.iter()).map(|r| r.table_key()).collect();

        let relationships = details
            .relationship_details
            .into_iter()
            .filter(|r| kept.contains(&r.pk_table_key()) && kept.contains(&r.fk_table_key()))
            .collect();
        let functions = details
            .function_details
            .into_iter()
            .filter(|r| self.is_included(SchemaObjectKind::Functions, &r.function_key()))
            .collect();
        let tvf_columns = details
            .tvf_return_type_details
            .into_iter()
            .filter(|r| self.is_included(SchemaObjectKind::Functions, &r.table_key()))
            .collect();

        StoreSchemaDetails {
            table_details: tables,
            view_details: views,
            relationship_details: relationships,
            function_details: functions,
            tvf_return_type_details: tvf_columns,
        }
    }
}
