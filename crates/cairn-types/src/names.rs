//! Node and property name validation.
//!
//! Valid names:
//! - Must be non-empty
//! - Must not be `.` or `..`
//! - Must not contain whitespace other than a plain space, `/`, `[`, `]`,
//!   `*`, `|` or `"`
//! - May carry at most one namespace prefix (`prefix:local`), and both sides
//!   of the colon must be non-empty

use crate::error::TypeError;

/// Characters that are forbidden anywhere in a name.
const FORBIDDEN_CHARS: &[char] = &['/', '[', ']', '*', '|', '"', '\t', '\n', '\r'];

/// Validate a node name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use cairn_types::names::validate_node_name;
///
/// assert!(validate_node_name("content").is_ok());
/// assert!(validate_node_name("jcr:content").is_ok());
/// assert!(validate_node_name("").is_err());
/// assert!(validate_node_name("a/b").is_err());
/// ```
pub fn validate_node_name(name: &str) -> Result<(), TypeError> {
    validate_name(name)
}

/// Validate a property name. Same rules as node names.
pub fn validate_property_name(name: &str) -> Result<(), TypeError> {
    validate_name(name)
}

fn validate_name(name: &str) -> Result<(), TypeError> {
    let invalid = |reason: String| TypeError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name must not be empty".into()));
    }

    if name == "." || name == ".." {
        return Err(invalid("'.' and '..' are reserved".into()));
    }

    for ch in FORBIDDEN_CHARS {
        if name.contains(*ch) {
            return Err(invalid(format!("contains forbidden character: {ch:?}")));
        }
    }

    if name.starts_with(' ') || name.ends_with(' ') {
        return Err(invalid("must not start or end with a space".into()));
    }

    let mut parts = name.split(':');
    let first = parts.next().unwrap_or_default();
    match (parts.next(), parts.next()) {
        (None, _) => {}
        (Some(local), None) => {
            if first.is_empty() || local.is_empty() {
                return Err(invalid("namespace prefix and local name must be non-empty".into()));
            }
        }
        (Some(_), Some(_)) => {
            return Err(invalid("at most one namespace prefix is allowed".into()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(validate_node_name("a").is_ok());
        assert!(validate_node_name("qwertyuio").is_ok());
        assert!(validate_node_name("nt:unstructured").is_ok());
        assert!(validate_node_name("with space").is_ok());
        assert!(validate_property_name("jcr:primaryType").is_ok());
    }

    #[test]
    fn empty_name() {
        assert!(validate_node_name("").is_err());
    }

    #[test]
    fn reserved_names() {
        assert!(validate_node_name(".").is_err());
        assert!(validate_node_name("..").is_err());
        assert!(validate_node_name("...").is_ok());
    }

    #[test]
    fn forbidden_characters() {
        for bad in ["a/b", "a[1]", "a*", "a|b", "a\"b", "a\tb", "a\nb"] {
            assert!(validate_node_name(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn surrounding_spaces() {
        assert!(validate_node_name(" a").is_err());
        assert!(validate_node_name("a ").is_err());
    }

    #[test]
    fn namespace_prefix_rules() {
        assert!(validate_node_name(":a").is_err());
        assert!(validate_node_name("a:").is_err());
        assert!(validate_node_name("a:b:c").is_err());
    }

    #[test]
    fn error_carries_name() {
        let err = validate_node_name("a/b").unwrap_err();
        match err {
            TypeError::InvalidName { name, .. } => assert_eq!(name, "a/b"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
