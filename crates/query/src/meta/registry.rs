//! Process-wide alias and column cache
//!
//! Maps an entity type to its default table alias and, per property, the
//! alias-qualified column (`su.login_code`). Population happens at most
//! once per type behind a double-checked guard; the published table is
//! immutable and read lock-free afterwards.
//!
//! Default aliases are unique registry-wide: `ass_nominate` and `ass_note`
//! both derive `an`, so the second type registered gets `an1`. The suffix a
//! type ends up with therefore depends on registration order.
//!
//! Builders take an [`Arc<AliasRegistry>`] so tests can construct a fresh
//! registry per case instead of relying on process-wide state; [`global`]
//! supplies the shared default.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use joinforge_core::{table_alias, unique_alias, Entity, QueryError, QueryResult};

/// Qualify a column with a table alias; a blank alias yields the bare
/// column with no dot.
pub fn qualify(alias: &str, column: &str) -> String {
    if alias.is_empty() {
        column.to_string()
    } else {
        format!("{}.{}", alias, column)
    }
}

/// Cached per-property column info, immutable once published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasColumn {
    /// Alias and column joined for direct use in SQL, e.g. `su.login_code`
    pub qualified: String,
    /// Default table alias the column was qualified with
    pub alias: String,
    /// Raw column name
    pub column: String,
}

/// Lazily-populated mapping from entity type to alias/column metadata
#[derive(Debug, Default)]
pub struct AliasRegistry {
    columns: DashMap<TypeId, Arc<HashMap<&'static str, AliasColumn>>>,
    aliases: DashMap<TypeId, String>,
    used_aliases: Mutex<HashSet<String>>,
    init_guard: Mutex<()>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize the cache entry for `E` if it does not exist yet.
    ///
    /// Idempotent and safe to call from concurrent query constructions;
    /// initialization for a given type happens at most once.
    ///
    /// # Panics
    /// Panics if an initialization lock is poisoned.
    pub fn ensure<E: Entity>(&self) {
        let key = TypeId::of::<E>();
        if self.columns.contains_key(&key) {
            return;
        }
        let _guard = self.init_guard.lock().expect("registry init lock poisoned");
        // Re-check: another thread may have published while we waited.
        if self.columns.contains_key(&key) {
            return;
        }

        let alias = {
            let mut used = self.used_aliases.lock().expect("registry alias set poisoned");
            let alias = unique_alias(&table_alias(E::table_name()), &used);
            used.insert(alias.clone());
            alias
        };

        let fields = E::fields();
        let mut table = HashMap::with_capacity(fields.len());
        for field in fields {
            table.insert(
                field.property,
                AliasColumn {
                    qualified: qualify(&alias, field.column),
                    alias: alias.clone(),
                    column: field.column.to_string(),
                },
            );
        }
        debug!(
            table = E::table_name(),
            alias = %alias,
            columns = table.len(),
            "cached alias columns for entity"
        );
        self.aliases.insert(key, alias);
        self.columns.insert(key, Arc::new(table));
    }

    /// Look up the cached column info for a property of `E`.
    ///
    /// Fails with [`QueryError::NotMapped`] if the type was never
    /// initialized or the property is unknown.
    pub fn lookup<E: Entity>(&self, property: &str) -> QueryResult<AliasColumn> {
        let table = self
            .columns
            .get(&TypeId::of::<E>())
            .ok_or_else(|| QueryError::unmapped_entity(E::table_name()))?;
        table
            .get(property)
            .cloned()
            .ok_or_else(|| QueryError::unmapped_property(E::table_name(), property))
    }

    /// Default alias assigned to `E` at initialization
    pub fn default_alias<E: Entity>(&self) -> QueryResult<String> {
        self.aliases
            .get(&TypeId::of::<E>())
            .map(|a| a.clone())
            .ok_or_else(|| QueryError::unmapped_entity(E::table_name()))
    }
}

static GLOBAL_REGISTRY: Lazy<Arc<AliasRegistry>> = Lazy::new(|| Arc::new(AliasRegistry::new()));

/// The process-wide registry shared by builders that do not inject their own
pub fn global() -> Arc<AliasRegistry> {
    Arc::clone(&GLOBAL_REGISTRY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use joinforge_core::FieldDef;

    struct User;

    impl Entity for User {
        fn table_name() -> &'static str {
            "sys_user"
        }

        fn fields() -> &'static [FieldDef] {
            const FIELDS: &[FieldDef] = &[
                FieldDef::new("id", "id"),
                FieldDef::new("login_code", "login_code"),
            ];
            FIELDS
        }
    }

    struct Nominate;

    impl Entity for Nominate {
        fn table_name() -> &'static str {
            "ass_nominate"
        }

        fn fields() -> &'static [FieldDef] {
            const FIELDS: &[FieldDef] = &[FieldDef::new("id", "id")];
            FIELDS
        }
    }

    struct Note;

    impl Entity for Note {
        fn table_name() -> &'static str {
            "ass_note"
        }

        fn fields() -> &'static [FieldDef] {
            const FIELDS: &[FieldDef] = &[FieldDef::new("id", "id")];
            FIELDS
        }
    }

    #[test]
    fn lookup_requires_initialization() {
        let registry = AliasRegistry::new();
        assert!(matches!(
            registry.lookup::<User>("id"),
            Err(QueryError::NotMapped(_))
        ));

        registry.ensure::<User>();
        let cached = registry.lookup::<User>("login_code").unwrap();
        assert_eq!(cached.qualified, "su.login_code");
        assert_eq!(cached.alias, "su");
        assert_eq!(cached.column, "login_code");
    }

    #[test]
    fn unknown_property_is_not_mapped() {
        let registry = AliasRegistry::new();
        registry.ensure::<User>();
        let err = registry.lookup::<User>("missing").unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn colliding_default_aliases_get_suffixes() {
        let registry = AliasRegistry::new();
        registry.ensure::<Nominate>();
        registry.ensure::<Note>();
        assert_eq!(registry.default_alias::<Nominate>().unwrap(), "an");
        assert_eq!(registry.default_alias::<Note>().unwrap(), "an1");
    }

    #[test]
    fn concurrent_ensure_initializes_once() {
        let registry = Arc::new(AliasRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry.ensure::<User>();
                    registry.default_alias::<User>().unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "su");
        }
        // A second type still gets a fresh, distinct alias.
        registry.ensure::<Nominate>();
        assert_eq!(registry.default_alias::<Nominate>().unwrap(), "an");
    }

    #[test]
    fn blank_alias_qualifies_to_bare_column() {
        assert_eq!(qualify("", "id"), "id");
        assert_eq!(qualify("su", "id"), "su.id");
    }
}
