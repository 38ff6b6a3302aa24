//! Table alias derivation
//!
//! Aliases are derived from table names by taking the first character of
//! each underscore-separated segment (`sys_user` -> `su`). Collision
//! resolution is the caller's concern: both the metadata registry and the
//! query builder keep their own used-alias sets and ask for suffixed
//! variants through [`unique_alias`].

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static SEGMENT_INITIALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_(\w)").expect("segment initials pattern"));

/// Derive a short alias from a table name.
///
/// `sys_user` -> `su`, `sys_dept_info` -> `sdi`. A name without underscores
/// keeps its first three characters (the whole name if shorter). A blank
/// name yields an empty alias; callers must then emit bare column names
/// without a qualifying dot.
pub fn table_alias(table_name: &str) -> String {
    let initials: String = SEGMENT_INITIALS
        .captures_iter(table_name)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();

    if initials.is_empty() {
        let bare = table_name.replace('_', "");
        return bare.chars().take(3).collect();
    }

    let mut alias: String = table_name.chars().take(1).collect();
    alias.push_str(&initials);
    alias
}

/// Find an unused alias by appending an incrementing integer suffix.
///
/// Returns `base` untouched when it is still free, otherwise `base1`,
/// `base2`, ... until a free name is found. Deterministic for a fixed set
/// of used aliases.
pub fn unique_alias(base: &str, used: &HashSet<String>) -> String {
    if !used.contains(base) {
        return base.to_string();
    }
    let mut suffix = 1usize;
    loop {
        let candidate = format!("{}{}", base, suffix);
        if !used.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_initials_from_underscore_segments() {
        assert_eq!(table_alias("sys_user"), "su");
        assert_eq!(table_alias("sys_dept"), "sd");
        assert_eq!(table_alias("sys_dept_info"), "sdi");
    }

    #[test]
    fn falls_back_to_first_three_characters() {
        assert_eq!(table_alias("users"), "use");
        assert_eq!(table_alias("ab"), "ab");
        assert_eq!(table_alias(""), "");
    }

    #[test]
    fn derivation_is_idempotent() {
        assert_eq!(table_alias("sys_user"), table_alias("sys_user"));
    }

    #[test]
    fn suffixes_until_free() {
        let mut used = HashSet::new();
        assert_eq!(unique_alias("sd", &used), "sd");
        used.insert("sd".to_string());
        assert_eq!(unique_alias("sd", &used), "sd1");
        used.insert("sd1".to_string());
        used.insert("sd2".to_string());
        assert_eq!(unique_alias("sd", &used), "sd3");
    }

    #[test]
    fn colliding_bases_get_distinct_stable_suffixes() {
        let mut used = HashSet::new();
        let mut assigned = Vec::new();
        for _ in 0..4 {
            let alias = unique_alias("an", &used);
            used.insert(alias.clone());
            assigned.push(alias);
        }
        assert_eq!(assigned, vec!["an", "an1", "an2", "an3"]);
    }
}
