//! Property-name to column-name derivation

/// Convert a camelCase property name to its snake_case column name.
///
/// Already-snake_case input passes through unchanged, so projection types
/// may freely mix Rust-style field names with camelCase names mirrored
/// from wire DTOs.
pub fn to_snake_case(property: &str) -> String {
    let mut out = String::with_capacity(property.len() + 4);
    let mut prev_lower = false;
    for ch in property.chars() {
        if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_camel_case() {
        assert_eq!(to_snake_case("deptId"), "dept_id");
        assert_eq!(to_snake_case("loginCode"), "login_code");
        assert_eq!(to_snake_case("userDeptName"), "user_dept_name");
    }

    #[test]
    fn snake_case_is_untouched() {
        assert_eq!(to_snake_case("dept_id"), "dept_id");
        assert_eq!(to_snake_case("id"), "id");
    }
}
