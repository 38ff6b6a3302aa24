//! Typed field references
//!
//! A [`FieldRef`] names one persistent property of an entity without raw
//! SQL strings leaking into call sites. References are const-constructible
//! so entities can expose them as associated constants:
//!
//! ```
//! use joinforge_core::{Entity, FieldDef, FieldRef};
//!
//! struct User;
//!
//! impl Entity for User {
//!     fn table_name() -> &'static str { "sys_user" }
//!     fn fields() -> &'static [FieldDef] {
//!         const FIELDS: &[FieldDef] =
//!             &[FieldDef::new("id", "id"), FieldDef::new("dept_id", "dept_id")];
//!         FIELDS
//!     }
//! }
//!
//! impl User {
//!     pub const ID: FieldRef<User> = FieldRef::new("id");
//!     pub const DEPT_ID: FieldRef<User> = FieldRef::new("dept_id");
//! }
//!
//! assert_eq!(User::DEPT_ID.property(), "dept_id");
//! ```

use std::marker::PhantomData;

use crate::entity::Entity;

/// A typed reference to one persistent property of `E`
pub struct FieldRef<E: Entity> {
    property: &'static str,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> FieldRef<E> {
    pub const fn new(property: &'static str) -> Self {
        Self {
            property,
            _marker: PhantomData,
        }
    }

    /// The declared property name this reference points at
    pub fn property(&self) -> &'static str {
        self.property
    }
}

impl<E: Entity> Clone for FieldRef<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: Entity> Copy for FieldRef<E> {}

impl<E: Entity> std::fmt::Debug for FieldRef<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRef")
            .field("property", &self.property)
            .finish()
    }
}
