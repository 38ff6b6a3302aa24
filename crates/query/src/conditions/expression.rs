//! Condition expression accumulator
//!
//! Holds the WHERE fragments plus the GROUP BY and ORDER BY entries of one
//! builder as three separate ordered collections. Keeping grouping and
//! ordering out of the normal-fragment list means a child builder's
//! grouping entries can be raised into its parent without corrupting the
//! parent's WHERE rendering.

/// Ordered WHERE / GROUP BY / ORDER BY fragments for one builder
#[derive(Debug, Default, Clone)]
pub struct ConditionExpression {
    normal: Vec<String>,
    group_by: Vec<String>,
    order_by: Vec<String>,
}

impl ConditionExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one WHERE fragment; fragments are AND-joined on emission
    pub fn push_normal(&mut self, fragment: String) {
        self.normal.push(fragment);
    }

    pub fn push_group_by(&mut self, column: String) {
        self.group_by.push(column);
    }

    pub fn push_order_by(&mut self, entry: String) {
        self.order_by.push(entry);
    }

    pub fn has_normal(&self) -> bool {
        !self.normal.is_empty()
    }

    /// Move all grouping and ordering entries out, leaving this expression
    /// with WHERE fragments only. Used when merging a child builder: its
    /// grouping belongs to the parent statement.
    pub fn take_grouping(&mut self) -> (Vec<String>, Vec<String>) {
        (
            std::mem::take(&mut self.group_by),
            std::mem::take(&mut self.order_by),
        )
    }

    /// Adopt grouping and ordering entries raised from a child
    pub fn extend_grouping(&mut self, group_by: Vec<String>, order_by: Vec<String>) {
        self.group_by.extend(group_by);
        self.order_by.extend(order_by);
    }

    /// Rewrite every stored fragment in place; used to patch alias
    /// references after a merge renamed a join alias.
    pub fn map_fragments(&mut self, f: impl Fn(&str) -> String) {
        for fragment in self
            .normal
            .iter_mut()
            .chain(self.group_by.iter_mut())
            .chain(self.order_by.iter_mut())
        {
            *fragment = f(fragment);
        }
    }

    /// AND another expression's normal fragments into this one as a single
    /// bracketed group. Adds nothing when the other side is empty, so no
    /// stray `( )` is ever emitted.
    pub fn merge_bracketed(&mut self, other: &ConditionExpression) {
        if other.normal.is_empty() {
            return;
        }
        self.normal.push(format!("( {} )", other.normal.join(" AND ")));
    }

    /// Render the full trailing segment: `WHERE ... GROUP BY ... ORDER BY ...`
    ///
    /// Empty when no fragments of any kind were collected.
    pub fn sql_segment(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if !self.normal.is_empty() {
            parts.push(format!("WHERE {}", self.normal.join(" AND ")));
        }
        if !self.group_by.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by.join(", ")));
        }
        if !self.order_by.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by.join(", ")));
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_clauses_in_order() {
        let mut expr = ConditionExpression::new();
        expr.push_normal("su.status = :p1".to_string());
        expr.push_normal("su.age > :p2".to_string());
        expr.push_group_by("su.dept_id".to_string());
        expr.push_order_by("su.id DESC".to_string());
        assert_eq!(
            expr.sql_segment(),
            "WHERE su.status = :p1 AND su.age > :p2 GROUP BY su.dept_id ORDER BY su.id DESC"
        );
    }

    #[test]
    fn empty_expression_renders_nothing() {
        assert_eq!(ConditionExpression::new().sql_segment(), "");
    }

    #[test]
    fn bracketed_merge_skips_empty_child() {
        let mut parent = ConditionExpression::new();
        parent.push_normal("su.id = :p1".to_string());
        parent.merge_bracketed(&ConditionExpression::new());
        assert_eq!(parent.sql_segment(), "WHERE su.id = :p1");

        let mut child = ConditionExpression::new();
        child.push_normal("sd.status = :p2".to_string());
        child.push_normal("sd.kind = :p3".to_string());
        parent.merge_bracketed(&child);
        assert_eq!(
            parent.sql_segment(),
            "WHERE su.id = :p1 AND ( sd.status = :p2 AND sd.kind = :p3 )"
        );
    }

    #[test]
    fn grouping_transfer_empties_the_source() {
        let mut child = ConditionExpression::new();
        child.push_normal("sd.status = :p1".to_string());
        child.push_group_by("sd.kind".to_string());
        child.push_order_by("sd.id".to_string());

        let mut parent = ConditionExpression::new();
        let (group_by, order_by) = child.take_grouping();
        parent.extend_grouping(group_by, order_by);

        assert_eq!(child.sql_segment(), "WHERE sd.status = :p1");
        assert_eq!(parent.sql_segment(), "GROUP BY sd.kind ORDER BY sd.id");
    }
}
