//! Projection types for automatic SELECT-list generation
//!
//! A projection is a plain data type whose declared fields drive the
//! SELECT list when no explicit columns were chosen. Field names are
//! matched against the root and joined entities to find the owning table
//! alias; column names are derived by camelCase -> snake_case conversion.

/// One declared field of a projection type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionField {
    /// Declared field name, matched against entity property names
    pub name: &'static str,
    /// Whether the field participates in SELECT lists
    pub select: bool,
    /// Whether the field maps to a schema column at all
    pub exists: bool,
}

impl ProjectionField {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            select: true,
            exists: true,
        }
    }

    pub const fn not_selected(mut self) -> Self {
        self.select = false;
        self
    }

    pub const fn not_in_schema(mut self) -> Self {
        self.exists = false;
        self
    }
}

/// A data type whose fields drive automatic SELECT-list generation
pub trait Projection: 'static {
    /// Declared fields in declaration order
    fn fields() -> &'static [ProjectionField];
}
