//! Heading anchor slugs.

/// Turn heading text into an anchor id.
///
/// Lowercases, keeps letters, digits, `_` and `-`, and collapses runs of
/// whitespace and hyphens into a single `-`. Non-ASCII letters are kept so
/// headings in any script get usable anchors.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.trim().chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_punctuation_dropped() {
        assert_eq!(slugify("What's new?"), "whats-new");
    }

    #[test]
    fn test_runs_collapse() {
        assert_eq!(slugify("  a  --  b  "), "a-b");
    }

    #[test]
    fn test_underscores_kept() {
        assert_eq!(slugify("snake_case"), "snake_case");
    }

    #[test]
    fn test_non_ascii_kept() {
        assert_eq!(slugify("ملاحظات سريعة"), "ملاحظات-سريعة");
    }

    #[test]
    fn test_empty() {
        assert_eq!(slugify("!!!"), "");
    }
}
