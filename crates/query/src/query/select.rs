//! SELECT-list resolution
//!
//! Three competing strategies, applied in order: columns the caller chose
//! explicitly win outright; otherwise a projection type's fields drive the
//! list; otherwise every participating table contributes a wildcard. The
//! assembled list runs through a defense-in-depth sanitization pass before
//! being memoized for the life of the builder.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use joinforge_core::{to_snake_case, ProjectionField};

use crate::query::core::QueryCore;

static SQL_INJECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"('.+--)|(--)|(\|)|(%7C)").expect("sanitization pattern"));

/// Strip comment and pipe injection sequences from an assembled select list
pub(crate) fn strip_sql_injection(sql: &str) -> String {
    let stripped = SQL_INJECTION.replace_all(sql, "");
    if stripped != sql {
        warn!("stripped suspicious sequence from select list");
    }
    stripped.into_owned()
}

/// A SQL function wrapping one column in the select list
pub trait SqlFunction {
    /// Template with a single `%s` slot for the column
    fn sql_template(&self) -> &'static str;

    fn apply(&self, column: &str) -> String {
        self.sql_template().replacen("%s", column, 1)
    }
}

/// Common SQL functions; implement [`SqlFunction`] for custom ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlFunc {
    Sum,
    Count,
    Max,
    Min,
    Avg,
    Len,
}

impl SqlFunction for SqlFunc {
    fn sql_template(&self) -> &'static str {
        match self {
            SqlFunc::Sum => "SUM(%s)",
            SqlFunc::Count => "COUNT(%s)",
            SqlFunc::Max => "MAX(%s)",
            SqlFunc::Min => "MIN(%s)",
            SqlFunc::Avg => "AVG(%s)",
            SqlFunc::Len => "LEN(%s)",
        }
    }
}

impl QueryCore {
    /// Resolved select list, computed once and cached for the life of the
    /// builder
    pub fn sql_select(&self) -> String {
        self.sql_select
            .get_or_init(|| self.resolve_select())
            .clone()
    }

    fn resolve_select(&self) -> String {
        let mut list = self.sql_columns.clone();
        if !self.set_select {
            if let Some(fields) = self.projection {
                list.extend(self.projection_columns(fields));
            } else {
                list.push(select_all(&self.table_alias));
                for part in &self.join_parts {
                    list.push(select_all(&part.table_alias));
                }
            }
        }

        let joined = strip_sql_injection(&list.join(", "));
        if joined.trim().is_empty() {
            // Last-resort wildcard when selection produced nothing usable.
            format!("{}*", self.column_prefix())
        } else {
            joined
        }
    }

    fn column_prefix(&self) -> String {
        if self.table_alias.is_empty() {
            String::new()
        } else {
            format!("{}.", self.table_alias)
        }
    }

    /// Derive `alias.column` entries from a projection type's fields.
    ///
    /// Owning alias per field name: joined tables are consulted in join
    /// registration order (first match wins), then the root table, which
    /// overrides any join carrying the same property.
    fn projection_columns(&self, fields: &[ProjectionField]) -> Vec<String> {
        let mut owner: HashMap<&'static str, &str> = HashMap::new();
        for binding in self.bound.iter().skip(1) {
            for field in binding.fields {
                owner.entry(field.property).or_insert(binding.alias.as_str());
            }
        }
        if let Some(root) = self.bound.first() {
            for field in root.fields {
                owner.insert(field.property, root.alias.as_str());
            }
        }

        let mut columns = Vec::with_capacity(fields.len());
        for field in fields {
            if !field.exists || !field.select {
                continue;
            }
            let column = to_snake_case(field.name);
            // Serialization artifact on DTOs mirrored from the wire, never
            // a real column.
            if column == "serial_version_uid" {
                continue;
            }
            match owner.get(field.name) {
                Some(alias) if !alias.is_empty() => columns.push(format!("{}.{}", alias, column)),
                _ => columns.push(column),
            }
        }
        columns
    }
}

fn select_all(alias: &str) -> String {
    if alias.is_empty() {
        "*".to_string()
    } else {
        format!("{}.*", alias)
    }
}
