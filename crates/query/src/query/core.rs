//! Builder core state
//!
//! Owns everything one top-level query construction accumulates: root table
//! identity and alias, the insertion-ordered join registry, entity->alias
//! bindings, selected columns, condition expression, and the shared
//! parameter binder. The typed surface in [`crate::query::builder`] layers
//! field resolution on top of this state.

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::Value;

use joinforge_core::{
    table_alias, unique_alias, Entity, FieldDef, ProjectionField, QueryError, QueryResult,
    SoftDelete,
};

use crate::conditions::{ConditionExpression, SharedParams};
use crate::meta::AliasRegistry;
use crate::query::join_part::{JoinOperand, JoinPart};

/// One entity type participating in the statement, with the alias it is
/// reachable under. The first binding is always the root table.
#[derive(Debug, Clone)]
pub(crate) struct BoundEntity {
    pub type_id: TypeId,
    pub alias: String,
    pub fields: &'static [FieldDef],
    pub soft_delete: Option<SoftDelete>,
}

/// Mutable state of one query construction; single-owner, short-lived
pub struct QueryCore {
    pub(crate) registry: Arc<AliasRegistry>,
    pub(crate) table_name: String,
    pub(crate) table_alias: String,
    pub(crate) sql_select: OnceCell<String>,
    pub(crate) sql_columns: Vec<String>,
    pub(crate) set_select: bool,
    pub(crate) projection: Option<&'static [ProjectionField]>,
    pub(crate) with_soft_delete: bool,
    pub(crate) soft_delete_applied: bool,
    pub(crate) join_parts: Vec<JoinPart>,
    pub(crate) bound: Vec<BoundEntity>,
    pub(crate) expr: ConditionExpression,
    pub(crate) params: SharedParams,
}

impl QueryCore {
    /// Root construction for entity `E`. A blank or absent alias derives
    /// one from the table name.
    pub(crate) fn for_entity<E: Entity>(
        registry: Arc<AliasRegistry>,
        alias: Option<String>,
        params: SharedParams,
    ) -> Self {
        registry.ensure::<E>();
        let table_name = E::table_name().to_string();
        let table_alias = match alias.filter(|a| !a.is_empty()) {
            Some(a) => a,
            // The registry's default is the derived alias made unique
            // against every type it has cached.
            None => registry
                .default_alias::<E>()
                .unwrap_or_else(|_| table_alias(&table_name)),
        };
        let mut core = Self {
            registry,
            table_name,
            table_alias: table_alias.clone(),
            sql_select: OnceCell::new(),
            sql_columns: Vec::new(),
            set_select: false,
            projection: None,
            with_soft_delete: true,
            soft_delete_applied: false,
            join_parts: Vec::new(),
            bound: Vec::new(),
            expr: ConditionExpression::new(),
            params,
        };
        core.bind::<E>(table_alias);
        core
    }

    /// Record that entity `E` participates under `alias`
    pub(crate) fn bind<E: Entity>(&mut self, alias: String) {
        self.bound.push(BoundEntity {
            type_id: TypeId::of::<E>(),
            alias,
            fields: E::fields(),
            soft_delete: E::soft_delete(),
        });
    }

    /// Alias currently bound for an entity type; the latest binding wins
    /// when the same type was joined more than once.
    pub(crate) fn class_alias_for(&self, type_id: TypeId) -> Option<&str> {
        self.bound
            .iter()
            .rev()
            .find(|b| b.type_id == type_id)
            .map(|b| b.alias.as_str())
    }

    /// All aliases taken within this builder's statement, root included
    pub(crate) fn used_aliases(&self) -> HashSet<String> {
        let mut used: HashSet<String> =
            self.join_parts.iter().map(|p| p.table_alias.clone()).collect();
        used.insert(self.table_alias.clone());
        used
    }

    pub(crate) fn alias_in_use(&self, alias: &str) -> bool {
        self.used_aliases().contains(alias)
    }

    /// Derive a statement-unique alias for a join target table
    pub(crate) fn fresh_alias(&self, table_name: &str) -> String {
        unique_alias(&table_alias(table_name), &self.used_aliases())
    }

    pub(crate) fn push_join_part(&mut self, part: JoinPart) {
        self.join_parts.push(part);
    }

    /// Bind a value through the shared parameter store, returning its
    /// placeholder.
    ///
    /// # Panics
    /// Panics if the parameter store lock is poisoned.
    pub(crate) fn bind_value(&self, value: Value) -> String {
        self.params
            .lock()
            .expect("parameter store poisoned")
            .bind(value)
    }

    /// Fold a configured child builder into this one.
    ///
    /// The child's own generated-alias joins are re-parented with suffix
    /// renames on alias collision; a colliding caller-chosen alias is an
    /// [`QueryError::AliasCollision`] instead. Everything the child
    /// resolved against a renamed alias (ON operands, WHERE fragments,
    /// selected columns, entity bindings) is rewritten to match. Grouping
    /// and ordering entries transfer to this statement; child-selected
    /// columns are appended; the child's WHERE fragments land as one
    /// bracketed AND group.
    pub(crate) fn merge_child(&mut self, mut child: QueryCore) -> QueryResult<()> {
        let mut parts = std::mem::take(&mut child.join_parts);

        // New names must dodge the parent's aliases AND every child alias,
        // including ones not yet processed.
        let parent_used = self.used_aliases();
        let mut all_used = parent_used.clone();
        for part in &parts {
            all_used.insert(part.table_alias.clone());
        }
        let mut renames: Vec<(String, String)> = Vec::new();
        for part in &mut parts {
            if parent_used.contains(&part.table_alias) {
                if part.explicit {
                    return Err(QueryError::AliasCollision(part.table_alias.clone()));
                }
                let renamed = unique_alias(&part.table_alias, &all_used);
                all_used.insert(renamed.clone());
                renames.push((part.table_alias.clone(), renamed.clone()));
                part.table_alias = renamed;
            }
        }

        for (old, new) in &renames {
            for part in &mut parts {
                if part.from_alias.as_deref() == Some(old.as_str()) {
                    part.from_alias = Some(new.clone());
                }
                for pair in &mut part.on {
                    rewrite_operand(&mut pair.left, old, new);
                    rewrite_operand(&mut pair.right, old, new);
                }
                if let Some(apply) = part.apply.take() {
                    part.apply = Some(rewrite_alias_refs(&apply, old, new));
                }
            }
            for binding in child.bound.iter_mut().filter(|b| &b.alias == old) {
                binding.alias = new.clone();
            }
            child.expr.map_fragments(|s| rewrite_alias_refs(s, old, new));
            for column in &mut child.sql_columns {
                *column = rewrite_alias_refs(column, old, new);
            }
        }

        self.join_parts.extend(parts);

        let (group_by, order_by) = child.expr.take_grouping();
        self.expr.extend_grouping(group_by, order_by);

        // The direct join target was bound by this builder before the child
        // was configured; only the child's nested bindings are new.
        for binding in child.bound.into_iter().skip(1) {
            self.bound.push(binding);
        }

        if !child.sql_columns.is_empty() {
            self.sql_columns.extend(child.sql_columns);
        }

        self.expr.merge_bracketed(&child.expr);
        Ok(())
    }
}

fn rewrite_operand(operand: &mut JoinOperand, old: &str, new: &str) {
    if let JoinOperand::Column(column) = operand {
        *column = rewrite_alias_refs(column, old, new);
    }
}

/// Replace `old.` qualifications with `new.` wherever `old` stands as a
/// whole identifier; `sr.` never matches inside `sr1.`.
fn rewrite_alias_refs(text: &str, old: &str, new: &str) -> String {
    let pattern = Regex::new(&format!(r"\b{}\.", regex::escape(old)))
        .expect("alias rewrite pattern");
    pattern
        .replace_all(text, format!("{}.", new).as_str())
        .into_owned()
}
