//! Statement assembly
//!
//! Emits `SELECT <list> FROM <table> <alias> <joins> <where>` plus the
//! individually queryable segments. Soft-delete predicates are injected
//! lazily, exactly once, the first time a segment that renders conditions
//! is requested.

use std::collections::BTreeMap;

use serde_json::Value;

use joinforge_core::NotDeleted;

use crate::query::core::QueryCore;

impl QueryCore {
    /// Join-clause segment, one clause per line, in registration order
    pub fn join_sql(&self) -> String {
        self.join_parts
            .iter()
            .map(|part| part.render(&self.table_alias))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Inject soft-delete predicates for every (entity, alias) pair
    /// referenced by the statement, root and all joins flattened. Guarded
    /// so repeated SQL assembly appends them at most once.
    pub(crate) fn finalize_conditions(&mut self) {
        if !self.with_soft_delete || self.soft_delete_applied {
            return;
        }
        let mut predicates = Vec::new();
        for binding in &self.bound {
            if let Some(sd) = binding.soft_delete {
                let predicate = match sd.not_deleted {
                    NotDeleted::Null => {
                        format!("{}.{} IS NULL", binding.alias, sd.column)
                    }
                    NotDeleted::Int(v) => {
                        format!("{}.{} = {}", binding.alias, sd.column, v)
                    }
                    NotDeleted::Text(v) => {
                        format!("{}.{} = '{}'", binding.alias, sd.column, v)
                    }
                };
                predicates.push(predicate);
            }
        }
        for predicate in predicates {
            self.expr.push_normal(predicate);
        }
        self.soft_delete_applied = true;
    }

    /// Trailing `WHERE ... GROUP BY ... ORDER BY ...` segment
    pub fn where_sql(&mut self) -> String {
        self.finalize_conditions();
        self.expr.sql_segment()
    }

    /// The fully assembled SELECT statement
    pub fn full_sql(&mut self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.sql_select(), self.table_name);
        if !self.table_alias.is_empty() {
            sql.push(' ');
            sql.push_str(&self.table_alias);
        }
        let joins = self.join_sql();
        if !joins.is_empty() {
            sql.push(' ');
            sql.push_str(&joins);
        }
        let trailing = self.where_sql();
        if !trailing.is_empty() {
            sql.push(' ');
            sql.push_str(&trailing);
        }
        sql
    }

    /// Snapshot of the named parameter bindings accumulated so far
    ///
    /// # Panics
    /// Panics if the parameter store lock is poisoned.
    pub fn params(&self) -> BTreeMap<String, Value> {
        self.params
            .lock()
            .expect("parameter store poisoned")
            .snapshot()
    }
}
