//! Join edge model
//!
//! One [`JoinPart`] describes a single JOIN clause: the join kind, the
//! target table and its alias, the alias of the side supplying the join
//! key, the matched operand pairs, and an optional extra predicate ANDed
//! into the ON clause.

use std::fmt;

use crate::meta::qualify;

/// Join kind of one join edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Left,
    Right,
    Inner,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Left => write!(f, "LEFT"),
            JoinKind::Right => write!(f, "RIGHT"),
            JoinKind::Inner => write!(f, "INNER"),
        }
    }
}

/// One side of a join-key match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOperand {
    /// A column name. Bare names are qualified with the owning side's alias
    /// at emission; names already containing a dot or a function call pass
    /// through verbatim.
    Column(String),
    /// A literal value, single-quoted on emission
    Literal(String),
    /// A literal list rendered as an IN predicate
    List(Vec<String>),
}

/// One matched operand pair of a join's ON clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOn {
    pub left: JoinOperand,
    pub right: JoinOperand,
}

impl JoinOn {
    pub fn new(left: JoinOperand, right: JoinOperand) -> Self {
        Self { left, right }
    }

    pub fn columns(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::new(
            JoinOperand::Column(left.into()),
            JoinOperand::Column(right.into()),
        )
    }
}

/// One edge in the join graph
#[derive(Debug, Clone)]
pub struct JoinPart {
    pub kind: JoinKind,
    pub table_name: String,
    pub table_alias: String,
    /// Alias of the side supplying the join key; the builder's root alias
    /// is used when absent
    pub from_alias: Option<String>,
    /// Whether the caller chose the alias. Explicit aliases are never
    /// auto-renamed on merge collisions; only generated ones are.
    pub explicit: bool,
    pub on: Vec<JoinOn>,
    /// Extra free-form predicate ANDed into the ON clause
    pub apply: Option<String>,
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// A column expression that must not be re-qualified: it is already
/// alias-qualified or is a function call.
fn is_opaque_column(column: &str) -> bool {
    column.contains('.') || column.contains('(')
}

impl JoinPart {
    fn render_column(column: &str, owner: &str) -> String {
        if is_opaque_column(column) {
            column.to_string()
        } else {
            qualify(owner, column)
        }
    }

    fn render_pair(&self, pair: &JoinOn, from: &str) -> String {
        let left = match &pair.left {
            JoinOperand::Column(c) => Self::render_column(c, from),
            JoinOperand::Literal(l) => quote(l),
            // A list on the key side reads as an IN against the target.
            JoinOperand::List(values) => {
                let right = match &pair.right {
                    JoinOperand::Column(c) => Self::render_column(c, &self.table_alias),
                    JoinOperand::Literal(l) => quote(l),
                    JoinOperand::List(_) => String::new(),
                };
                return Self::render_in(&right, values);
            }
        };
        match &pair.right {
            JoinOperand::Column(c) => {
                format!("{} = {}", left, Self::render_column(c, &self.table_alias))
            }
            JoinOperand::Literal(l) => format!("{} = {}", left, quote(l)),
            JoinOperand::List(values) => Self::render_in(&left, values),
        }
    }

    fn render_in(column: &str, values: &[String]) -> String {
        let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
        format!("{} IN ({})", column, quoted.join(","))
    }

    /// Render the full JOIN clause, e.g.
    /// `LEFT JOIN sys_dept sd ON( su.dept_id = sd.id )`.
    ///
    /// `root_alias` qualifies bare key-side columns when this part carries
    /// no explicit from-alias.
    pub fn render(&self, root_alias: &str) -> String {
        let from = self
            .from_alias
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(root_alias);
        let mut on_clause = self
            .on
            .iter()
            .map(|pair| self.render_pair(pair, from))
            .collect::<Vec<_>>()
            .join(" AND ");
        if let Some(apply) = self.apply.as_deref().filter(|a| !a.trim().is_empty()) {
            on_clause = format!("{} AND {}", on_clause, apply);
        }
        format!(
            "{} JOIN {} {} ON( {} )",
            self.kind, self.table_name, self.table_alias, on_clause
        )
    }
}
