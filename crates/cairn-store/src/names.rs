//! Repository and ref name validation.
//!
//! Ref names follow git-style rules:
//! - Must be non-empty
//! - Must not contain whitespace, control characters, `~`, `^`, `:`, `?`,
//!   `*`, `[`, `\`
//! - Must not contain `..` or `//`
//! - Must not start or end with `/`, and must not end with `.lock`
//! - Components between slashes must be non-empty and not start with `.`
//!
//! Repository names follow the same character rules but are a single
//! component: no `/` at all.

use crate::error::{StoreError, StoreResult};

/// Characters that are forbidden anywhere in a name.
const FORBIDDEN_CHARS: &[char] = &['~', '^', ':', '?', '*', '[', '\\'];

fn invalid(name: &str, reason: impl Into<String>) -> StoreError {
    StoreError::InvalidRefName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn check_chars(name: &str) -> StoreResult<()> {
    if let Some(ch) = name
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_CHARS.contains(c))
    {
        return Err(invalid(name, format!("contains forbidden character {ch:?}")));
    }
    Ok(())
}

fn check_component(name: &str, component: &str) -> StoreResult<()> {
    if component.is_empty() {
        return Err(invalid(name, "path components must not be empty"));
    }
    if component.starts_with('.') {
        return Err(invalid(
            name,
            format!("component must not start with '.': {component:?}"),
        ));
    }
    if component.ends_with(".lock") {
        return Err(invalid(name, "component must not end with '.lock'"));
    }
    Ok(())
}

/// Validate a ref name such as `main` or `feature/auth`.
///
/// ```
/// use cairn_store::names::validate_ref_name;
///
/// assert!(validate_ref_name("feature/auth").is_ok());
/// assert!(validate_ref_name("bad..name").is_err());
/// ```
pub fn validate_ref_name(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(invalid(name, "ref name must not be empty"));
    }
    check_chars(name)?;
    if name.contains("..") {
        return Err(invalid(name, "must not contain '..'"));
    }
    if name.contains("@{") {
        return Err(invalid(name, "must not contain '@{'"));
    }
    if name.ends_with('.') {
        return Err(invalid(name, "must not end with '.'"));
    }
    for component in name.split('/') {
        check_component(name, component)?;
    }
    Ok(())
}

/// Validate a repository name: one path component, same character rules.
pub fn validate_repo_name(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(invalid(name, "repository name must not be empty"));
    }
    if name.contains('/') {
        return Err(invalid(name, "repository name must not contain '/'"));
    }
    check_chars(name)?;
    check_component(name, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_nested_refs() {
        for name in ["main", "v1.0", "my-branch", "feature/auth", "user/alice/fix-123"] {
            assert!(validate_ref_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_bad_refs() {
        for name in [
            "", "bad..name", "has space", "tab\there", "a~b", "a^b", "a:b", "a?b", "a*b", "a[b",
            "a\\b", "/leading", "trailing/", "a//b", "main.lock", "ref@{0}", "feature/.hidden",
            "trailing.", ".hidden",
        ] {
            assert!(validate_ref_name(name).is_err(), "{name:?}");
        }
    }

    #[test]
    fn repo_names_are_single_component() {
        assert!(validate_repo_name("widgets").is_ok());
        assert!(validate_repo_name("my.repo").is_ok());
        assert!(validate_repo_name("a/b").is_err());
        assert!(validate_repo_name("..").is_err());
        assert!(validate_repo_name("").is_err());
    }

    #[test]
    fn error_names_the_input() {
        match validate_ref_name("a b") {
            Err(StoreError::InvalidRefName { name, reason }) => {
                assert_eq!(name, "a b");
                assert!(reason.contains("forbidden"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
