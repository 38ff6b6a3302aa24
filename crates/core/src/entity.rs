//! Entity metadata contract
//!
//! An [`Entity`] describes one mapped database table: its name, its
//! persistent fields, an optional primary key, and an optional soft-delete
//! convention. Metadata is static per type; the registry in the query crate
//! caches the derived alias-qualified columns on first use.

/// One persistent field of an entity or projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Declared property name, used for lookups and projection matching
    pub property: &'static str,
    /// Raw column name in the table
    pub column: &'static str,
    /// Whether the field participates in generated SELECT lists
    pub select: bool,
    /// Whether the field physically exists in the schema
    pub exists: bool,
}

impl FieldDef {
    pub const fn new(property: &'static str, column: &'static str) -> Self {
        Self {
            property,
            column,
            select: true,
            exists: true,
        }
    }

    /// Mark the field as excluded from generated SELECT lists
    pub const fn not_selected(mut self) -> Self {
        self.select = false;
        self
    }

    /// Mark the field as absent from the schema
    pub const fn not_in_schema(mut self) -> Self {
        self.exists = false;
        self
    }
}

/// The value a soft-delete column holds for rows that are still live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotDeleted {
    /// Live rows carry NULL in the flag column
    Null,
    /// Live rows carry a numeric sentinel, e.g. `0`
    Int(i64),
    /// Live rows carry a textual sentinel, quoted on emission
    Text(&'static str),
}

/// Soft-delete convention for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftDelete {
    pub column: &'static str,
    pub not_deleted: NotDeleted,
}

/// Static table metadata for a mapped entity type
pub trait Entity: 'static {
    /// Table name for this entity
    fn table_name() -> &'static str;

    /// Persistent fields in declaration order, primary key included
    fn fields() -> &'static [FieldDef];

    /// Primary key property name, when the table has one
    fn primary_key() -> Option<&'static str> {
        None
    }

    /// Soft-delete convention, when the table uses one
    fn soft_delete() -> Option<SoftDelete> {
        None
    }
}
