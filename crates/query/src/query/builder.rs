//! Typed join-query builder
//!
//! [`JoinQuery<E>`] composes a multi-table SELECT rooted at entity `E`.
//! Field references resolve through the metadata registry, honoring custom
//! alias overrides; every join spawns a transient child builder scoped to
//! the target table, whose accumulated state is merged back into the
//! parent when the join call returns.
//!
//! ```
//! use joinforge_core::{Entity, FieldDef, FieldRef};
//! use joinforge_query::{AliasRegistry, JoinQuery};
//! use std::sync::Arc;
//!
//! struct User;
//! impl Entity for User {
//!     fn table_name() -> &'static str { "sys_user" }
//!     fn fields() -> &'static [FieldDef] {
//!         const FIELDS: &[FieldDef] =
//!             &[FieldDef::new("id", "id"), FieldDef::new("dept_id", "dept_id")];
//!         FIELDS
//!     }
//! }
//! impl User {
//!     const DEPT_ID: FieldRef<User> = FieldRef::new("dept_id");
//! }
//!
//! struct Dept;
//! impl Entity for Dept {
//!     fn table_name() -> &'static str { "sys_dept" }
//!     fn fields() -> &'static [FieldDef] {
//!         const FIELDS: &[FieldDef] = &[FieldDef::new("id", "id")];
//!         FIELDS
//!     }
//! }
//! impl Dept {
//!     const ID: FieldRef<Dept> = FieldRef::new("id");
//! }
//!
//! let registry = Arc::new(AliasRegistry::new());
//! let mut query = JoinQuery::<User>::with_registry(registry)
//!     .left_join(User::DEPT_ID, Dept::ID)
//!     .unwrap();
//! assert_eq!(
//!     query.full_sql(),
//!     "SELECT su.*, sd.* FROM sys_user su LEFT JOIN sys_dept sd ON( su.dept_id = sd.id )"
//! );
//! ```

use std::any::TypeId;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use joinforge_core::{Entity, FieldRef, Projection, QueryError, QueryResult};

use crate::conditions::{params, SharedParams};
use crate::meta::{global, qualify, AliasRegistry};
use crate::query::core::QueryCore;
use crate::query::join_part::{JoinKind, JoinOn, JoinOperand, JoinPart};
use crate::query::select::SqlFunction;

/// One join-key rule between the current builder's entity and a join target
#[derive(Debug, Clone)]
pub enum JoinKey<E: Entity, J: Entity> {
    /// `source.col = target.col`
    Pair(FieldRef<E>, FieldRef<J>),
    /// `source.col = 'literal'`
    SourceLiteral(FieldRef<E>, String),
    /// `source.col IN ('a','b',...)`
    SourceIn(FieldRef<E>, Vec<String>),
    /// Raw column strings; bare names are qualified with the owning side's
    /// alias at emission, dotted names pass through verbatim
    Raw(String, String),
}

/// Target side of a join key, staged until the join target is bound
enum RightKey<J: Entity> {
    Field(FieldRef<J>),
    Done(JoinOperand),
}

/// Query builder rooted at entity `E`
pub struct JoinQuery<E: Entity> {
    core: QueryCore,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> JoinQuery<E> {
    /// Builder over the process-wide metadata registry
    pub fn new() -> Self {
        Self::with_registry(global())
    }

    /// Builder over an injected registry
    pub fn with_registry(registry: Arc<AliasRegistry>) -> Self {
        Self::scoped(registry, None, params::shared())
    }

    /// Builder with a caller-chosen root alias
    pub fn with_alias(alias: &str) -> Self {
        Self::with_registry_alias(global(), alias)
    }

    /// Builder over an injected registry with a caller-chosen root alias
    pub fn with_registry_alias(registry: Arc<AliasRegistry>, alias: &str) -> Self {
        Self::scoped(registry, Some(alias.to_string()), params::shared())
    }

    fn scoped(registry: Arc<AliasRegistry>, alias: Option<String>, params: SharedParams) -> Self {
        Self {
            core: QueryCore::for_entity::<E>(registry, alias, params),
            _marker: PhantomData,
        }
    }

    /// Root table alias of this builder
    pub fn table_alias(&self) -> &str {
        &self.core.table_alias
    }

    /// Root table name of this builder
    pub fn table_name(&self) -> &str {
        &self.core.table_name
    }

    /// Alias a joined entity type is reachable under; fails when `T` was
    /// never joined into (or is not the root of) this statement.
    pub fn joined_alias<T: Entity>(&self) -> QueryResult<String> {
        self.core
            .class_alias_for(TypeId::of::<T>())
            .map(|a| a.to_string())
            .ok_or_else(|| {
                QueryError::NotMapped(format!(
                    "entity '{}' is not part of this statement's join map",
                    T::table_name()
                ))
            })
    }

    /// Resolve a typed field reference to its alias-qualified column.
    ///
    /// A custom alias bound for `T` within this statement takes precedence
    /// over the registry's default qualification.
    pub fn resolve_field<T: Entity>(&self, field: FieldRef<T>) -> QueryResult<String> {
        self.core.registry.ensure::<T>();
        let cached = self.core.registry.lookup::<T>(field.property())?;
        match self.core.class_alias_for(TypeId::of::<T>()) {
            Some(alias) => Ok(qualify(alias, &cached.column)),
            None => Ok(cached.qualified),
        }
    }

    // --- select list -----------------------------------------------------

    /// Select exactly these fields; disables projection and wildcard
    /// resolution
    pub fn select(mut self, columns: &[FieldRef<E>]) -> QueryResult<Self> {
        for column in columns {
            let qualified = self.resolve_field(*column)?;
            self.core.sql_columns.push(qualified);
        }
        self.core.set_select = true;
        Ok(self)
    }

    /// Select a raw column expression verbatim
    pub fn select_raw(mut self, column: &str) -> Self {
        self.core.sql_columns.push(column.to_string());
        self.core.set_select = true;
        self
    }

    /// Select a SQL function applied to a field, e.g. `COUNT(su.id)`
    pub fn select_func<T: Entity>(
        mut self,
        func: impl SqlFunction,
        field: FieldRef<T>,
    ) -> QueryResult<Self> {
        let qualified = self.resolve_field(field)?;
        self.core.sql_columns.push(func.apply(&qualified));
        self.core.set_select = true;
        Ok(self)
    }

    /// Drive the select list from a projection type's fields (used only
    /// when no explicit columns were selected)
    pub fn project<P: Projection>(mut self) -> Self {
        self.core.projection = Some(P::fields());
        self
    }

    // --- conditions ------------------------------------------------------

    fn compare<T: Entity>(
        mut self,
        field: FieldRef<T>,
        op: &str,
        value: Value,
    ) -> QueryResult<Self> {
        let column = self.resolve_field(field)?;
        let placeholder = self.core.bind_value(value);
        self.core
            .expr
            .push_normal(format!("{} {} {}", column, op, placeholder));
        Ok(self)
    }

    pub fn eq<T: Entity>(self, field: FieldRef<T>, value: impl Into<Value>) -> QueryResult<Self> {
        self.compare(field, "=", value.into())
    }

    pub fn ne<T: Entity>(self, field: FieldRef<T>, value: impl Into<Value>) -> QueryResult<Self> {
        self.compare(field, "<>", value.into())
    }

    pub fn gt<T: Entity>(self, field: FieldRef<T>, value: impl Into<Value>) -> QueryResult<Self> {
        self.compare(field, ">", value.into())
    }

    pub fn ge<T: Entity>(self, field: FieldRef<T>, value: impl Into<Value>) -> QueryResult<Self> {
        self.compare(field, ">=", value.into())
    }

    pub fn lt<T: Entity>(self, field: FieldRef<T>, value: impl Into<Value>) -> QueryResult<Self> {
        self.compare(field, "<", value.into())
    }

    pub fn le<T: Entity>(self, field: FieldRef<T>, value: impl Into<Value>) -> QueryResult<Self> {
        self.compare(field, "<=", value.into())
    }

    pub fn like<T: Entity>(self, field: FieldRef<T>, pattern: &str) -> QueryResult<Self> {
        self.compare(field, "LIKE", Value::String(pattern.to_string()))
    }

    /// `col IN (:p1,:p2,...)` with one bound parameter per value
    pub fn in_list<T: Entity>(
        mut self,
        field: FieldRef<T>,
        values: Vec<Value>,
    ) -> QueryResult<Self> {
        let column = self.resolve_field(field)?;
        let placeholders: Vec<String> = values
            .into_iter()
            .map(|v| self.core.bind_value(v))
            .collect();
        self.core
            .expr
            .push_normal(format!("{} IN ({})", column, placeholders.join(",")));
        Ok(self)
    }

    pub fn is_null<T: Entity>(mut self, field: FieldRef<T>) -> QueryResult<Self> {
        let column = self.resolve_field(field)?;
        self.core.expr.push_normal(format!("{} IS NULL", column));
        Ok(self)
    }

    pub fn is_not_null<T: Entity>(mut self, field: FieldRef<T>) -> QueryResult<Self> {
        let column = self.resolve_field(field)?;
        self.core.expr.push_normal(format!("{} IS NOT NULL", column));
        Ok(self)
    }

    /// Append a raw WHERE fragment verbatim
    pub fn apply_raw(mut self, fragment: &str) -> Self {
        self.core.expr.push_normal(fragment.to_string());
        self
    }

    pub fn group_by<T: Entity>(mut self, field: FieldRef<T>) -> QueryResult<Self> {
        let column = self.resolve_field(field)?;
        self.core.expr.push_group_by(column);
        Ok(self)
    }

    pub fn order_by_asc<T: Entity>(mut self, field: FieldRef<T>) -> QueryResult<Self> {
        let column = self.resolve_field(field)?;
        self.core.expr.push_order_by(format!("{} ASC", column));
        Ok(self)
    }

    pub fn order_by_desc<T: Entity>(mut self, field: FieldRef<T>) -> QueryResult<Self> {
        let column = self.resolve_field(field)?;
        self.core.expr.push_order_by(format!("{} DESC", column));
        Ok(self)
    }

    /// Skip soft-delete predicate injection for this statement
    pub fn ignore_soft_delete(mut self) -> Self {
        self.core.with_soft_delete = false;
        self
    }

    /// Raw SQL prepended before the statement is not supported by this
    /// builder family.
    pub fn first_sql(self, _sql: &str) -> QueryResult<Self> {
        Err(QueryError::UnsupportedOperation(
            "first_sql: prepending raw SQL to a join query".to_string(),
        ))
    }

    // --- joins -----------------------------------------------------------

    pub fn left_join<J: Entity>(
        self,
        left: FieldRef<E>,
        right: FieldRef<J>,
    ) -> QueryResult<Self> {
        self.join_with(JoinKind::Left, None, vec![JoinKey::Pair(left, right)], Ok)
    }

    pub fn left_join_with<J: Entity>(
        self,
        left: FieldRef<E>,
        right: FieldRef<J>,
        configure: impl FnOnce(JoinQuery<J>) -> QueryResult<JoinQuery<J>>,
    ) -> QueryResult<Self> {
        self.join_with(
            JoinKind::Left,
            None,
            vec![JoinKey::Pair(left, right)],
            configure,
        )
    }

    pub fn right_join<J: Entity>(
        self,
        left: FieldRef<E>,
        right: FieldRef<J>,
    ) -> QueryResult<Self> {
        self.join_with(JoinKind::Right, None, vec![JoinKey::Pair(left, right)], Ok)
    }

    pub fn right_join_with<J: Entity>(
        self,
        left: FieldRef<E>,
        right: FieldRef<J>,
        configure: impl FnOnce(JoinQuery<J>) -> QueryResult<JoinQuery<J>>,
    ) -> QueryResult<Self> {
        self.join_with(
            JoinKind::Right,
            None,
            vec![JoinKey::Pair(left, right)],
            configure,
        )
    }

    pub fn inner_join<J: Entity>(
        self,
        left: FieldRef<E>,
        right: FieldRef<J>,
    ) -> QueryResult<Self> {
        self.join_with(JoinKind::Inner, None, vec![JoinKey::Pair(left, right)], Ok)
    }

    pub fn inner_join_with<J: Entity>(
        self,
        left: FieldRef<E>,
        right: FieldRef<J>,
        configure: impl FnOnce(JoinQuery<J>) -> QueryResult<JoinQuery<J>>,
    ) -> QueryResult<Self> {
        self.join_with(
            JoinKind::Inner,
            None,
            vec![JoinKey::Pair(left, right)],
            configure,
        )
    }

    /// Full-form join: kind, optional explicit alias, any number of
    /// key-matching rules, and a configuration callback run against a
    /// transient child builder scoped to the join target.
    ///
    /// An implicit alias is derived from the target table name and made
    /// unique against every alias this statement already uses. An explicit
    /// alias is taken verbatim and fails with
    /// [`QueryError::AliasCollision`] when already taken.
    pub fn join_with<J: Entity>(
        mut self,
        kind: JoinKind,
        alias: Option<&str>,
        keys: Vec<JoinKey<E, J>>,
        configure: impl FnOnce(JoinQuery<J>) -> QueryResult<JoinQuery<J>>,
    ) -> QueryResult<Self> {
        self.core.registry.ensure::<J>();
        let table_name = J::table_name();
        let join_alias = match alias {
            Some(explicit) => {
                if self.core.alias_in_use(explicit) {
                    return Err(QueryError::AliasCollision(explicit.to_string()));
                }
                explicit.to_string()
            }
            None => self.core.fresh_alias(table_name),
        };

        // Source-side references must resolve before the target is bound:
        // a self-join's left side points at the current alias, not the one
        // this join assigns.
        let staged = keys
            .into_iter()
            .map(|key| {
                Ok(match key {
                    JoinKey::Pair(left, right) => (
                        JoinOperand::Column(self.resolve_field(left)?),
                        RightKey::Field(right),
                    ),
                    JoinKey::SourceLiteral(left, value) => (
                        JoinOperand::Column(self.resolve_field(left)?),
                        RightKey::Done(JoinOperand::Literal(value)),
                    ),
                    JoinKey::SourceIn(left, values) => (
                        JoinOperand::Column(self.resolve_field(left)?),
                        RightKey::Done(JoinOperand::List(values)),
                    ),
                    JoinKey::Raw(left, right) => (
                        JoinOperand::Column(left),
                        RightKey::Done(JoinOperand::Column(right)),
                    ),
                })
            })
            .collect::<QueryResult<Vec<_>>>()?;

        self.core.bind::<J>(join_alias.clone());

        let on = staged
            .into_iter()
            .map(|(left, right)| {
                Ok(JoinOn::new(
                    left,
                    match right {
                        RightKey::Field(field) => {
                            JoinOperand::Column(self.resolve_field(field)?)
                        }
                        RightKey::Done(operand) => operand,
                    },
                ))
            })
            .collect::<QueryResult<Vec<_>>>()?;

        self.core.push_join_part(JoinPart {
            kind,
            table_name: table_name.to_string(),
            table_alias: join_alias.clone(),
            from_alias: Some(self.core.table_alias.clone()),
            explicit: alias.is_some(),
            on,
            apply: None,
        });

        let child = JoinQuery::<J>::scoped(
            Arc::clone(&self.core.registry),
            Some(join_alias),
            Arc::clone(&self.core.params),
        );
        let child = configure(child)?;
        self.core.merge_child(child.core)?;
        Ok(self)
    }

    /// AND an extra free-form predicate into the most recent join's ON
    /// clause
    pub fn on_apply(mut self, predicate: &str) -> Self {
        if let Some(part) = self.core.join_parts.last_mut() {
            part.apply = Some(match part.apply.take() {
                Some(existing) => format!("{} AND {}", existing, predicate),
                None => predicate.to_string(),
            });
        }
        self
    }

    // --- emission --------------------------------------------------------

    /// The fully assembled SELECT statement
    pub fn full_sql(&mut self) -> String {
        self.core.full_sql()
    }

    /// Resolved select list (memoized)
    pub fn sql_select(&self) -> String {
        self.core.sql_select()
    }

    /// Join-clause segment only
    pub fn join_sql(&self) -> String {
        self.core.join_sql()
    }

    /// Trailing WHERE / GROUP BY / ORDER BY segment
    pub fn where_sql(&mut self) -> String {
        self.core.where_sql()
    }

    /// Snapshot of the named parameter bindings
    pub fn params(&self) -> BTreeMap<String, Value> {
        self.core.params()
    }
}

impl<E: Entity> Default for JoinQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impl: entity marker types need not be Debug themselves.
impl<E: Entity> std::fmt::Debug for JoinQuery<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinQuery")
            .field("table", &self.core.table_name)
            .field("alias", &self.core.table_alias)
            .field("joins", &self.core.join_parts.len())
            .finish()
    }
}
