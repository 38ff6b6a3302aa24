//! Named parameter binding
//!
//! One monotonically-incrementing name sequence plus a name -> value map.
//! A binder belongs to one top-level builder; during a join call it is
//! deliberately shared with the transient child builder so parameter names
//! generated inside the child cannot collide with the parent's.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

/// Accumulates named parameter bindings for one query construction
#[derive(Debug, Default)]
pub struct ParamBinder {
    seq: usize,
    values: BTreeMap<String, Value>,
}

impl ParamBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value under the next generated name and return its SQL
    /// placeholder, e.g. `:p3`.
    pub fn bind(&mut self, value: Value) -> String {
        self.seq += 1;
        let name = format!("p{}", self.seq);
        let placeholder = format!(":{}", name);
        self.values.insert(name, value);
        placeholder
    }

    /// All bound values by parameter name
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Snapshot of the bound values
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.values.clone()
    }
}

/// Binder handle shared between a parent builder and its transient child
pub type SharedParams = Arc<Mutex<ParamBinder>>;

/// Fresh binder handle for a new top-level builder
pub fn shared() -> SharedParams {
    Arc::new(Mutex::new(ParamBinder::new()))
}
