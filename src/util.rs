use crate::error::ExpandError;

/// Nesting limit for `%(name)s` references; hitting it almost always means a cycle.
const MAX_DEPTH: usize = 200;

/// Replace every `%(name)s` in `value` with the result of `lookup(name)`, recursively.
///
/// A `%(` that is not followed by a valid name and `)s` is kept as-is.
pub fn expand<'a, F>(value: &str, lookup: F) -> Result<String, ExpandError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    expand_at(value, &lookup, 0)
}

fn expand_at<'a, F>(value: &str, lookup: &F, depth: usize) -> Result<String, ExpandError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    if depth >= MAX_DEPTH {
        return Err(ExpandError::TooDeep);
    }

    let mut result = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("%(") {
        let after = &rest[start + 2..];
        let name_len = after
            .find(|c: char| !is_name_char(c))
            .unwrap_or(after.len());
        let name = &after[..name_len];

        if name.is_empty() || !after[name_len..].starts_with(")s") {
            // Not a reference; keep the `%(` and move on.
            result.push_str(&rest[..start + 2]);
            rest = after;
            continue;
        }

        let replacement = lookup(name).ok_or_else(|| ExpandError::NotFound {
            name: name.to_owned(),
        })?;

        result.push_str(&rest[..start]);
        result.push_str(&expand_at(replacement, lookup, depth + 1)?);
        rest = &after[name_len + 2..];
    }

    result.push_str(rest);
    Ok(result)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<&'static str> {
        match name {
            "name" => Some("Stinky"),
            "color" => Some("Blue"),
            "greeting" => Some("Hello, %(name)s"),
            "a" => Some("%(b)s"),
            "b" => Some("%(a)s"),
            _ => None,
        }
    }

    #[test]
    fn expand() {
        let expanded = super::expand("Hello, %(name)s!", lookup)
            .expect("expected hardcoded string to be valid");

        assert_eq!(expanded, "Hello, Stinky!");
    }

    #[test]
    fn multiple_expands() {
        let expanded = super::expand("%(color)s %(color)s %(color)s", lookup)
            .expect("expected hardcoded string to be valid");

        assert_eq!(expanded, "Blue Blue Blue");
    }

    #[test]
    fn nested_expand() {
        let expanded = super::expand("%(greeting)s.", lookup)
            .expect("expected hardcoded string to be valid");

        assert_eq!(expanded, "Hello, Stinky.");
    }

    #[test]
    fn malformed_references_are_literal() {
        for text in ["50%", "%(", "%()s", "%(name)", "%(na me)s", "100%(x"] {
            let expanded = super::expand(text, lookup).expect("literal text should pass through");
            assert_eq!(expanded, text);
        }
    }

    #[test]
    fn missing_reference() {
        let result = super::expand("%(nobody)s", lookup);

        assert_eq!(
            result,
            Err(ExpandError::NotFound {
                name: "nobody".to_owned()
            })
        );
    }

    #[test]
    fn cycle() {
        assert_eq!(super::expand("%(a)s", lookup), Err(ExpandError::TooDeep));
    }

    #[test]
    fn bools() {
        for text in ["1", "t", "TRUE", "y", "Yes", " on "] {
            assert_eq!(parse_bool(text), Some(true), "{text:?}");
        }
        for text in ["0", "F", "false", "n", "NO", "off"] {
            assert_eq!(parse_bool(text), Some(false), "{text:?}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }
}
