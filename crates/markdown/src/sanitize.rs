//! Allow-list HTML sanitization.

use std::collections::{HashMap, HashSet};

use ammonia::Builder;

/// Tags that survive sanitization. Anything else is unwrapped: the markup
/// goes, the text inside stays. `script` and `style` are dropped with their
/// contents.
pub const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "strong", "em", "u", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "code",
    "pre", "hr", "div", "span", "ul", "ol", "li", "a", "img", "table", "thead", "tbody", "tr",
    "th", "td", "del", "ins", "sup", "sub",
];

/// Attributes allowed on every allowed tag.
const GENERIC_ATTRIBUTES: &[&str] = &["class", "id", "dir"];

/// Per-tag attributes.
///
/// `rel` on links is not listed: the sanitizer owns it and always writes
/// `rel="nofollow"`.
const TAG_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "title"]),
    ("img", &["src", "alt", "title", "width", "height"]),
    ("code", &["class"]),
    ("pre", &["class"]),
];

/// Strip every tag and attribute that is not on the allow-list.
///
/// URLs in `href`/`src` are limited to the sanitizer's safe scheme list, so
/// `javascript:` links lose their target.
#[must_use]
pub fn sanitize(html: &str) -> String {
    let tag_attributes: HashMap<&str, HashSet<&str>> = TAG_ATTRIBUTES
        .iter()
        .map(|(tag, attrs)| (*tag, attrs.iter().copied().collect()))
        .collect();

    Builder::default()
        .tags(ALLOWED_TAGS.iter().copied().collect())
        .generic_attributes(GENERIC_ATTRIBUTES.iter().copied().collect())
        .tag_attributes(tag_attributes)
        .link_rel(Some("nofollow"))
        .clean(html)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_markup_survives() {
        let html = sanitize("<p dir=\"rtl\" class=\"lead\"><strong>bold</strong></p>");
        assert!(html.contains("dir=\"rtl\""));
        assert!(html.contains("class=\"lead\""));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_style_attribute_is_stripped() {
        let html = sanitize("<span style=\"color:red\">red</span>");
        assert!(!html.contains("style"));
        assert!(html.contains("<span>red</span>"));
    }

    #[test]
    fn test_unknown_tag_is_unwrapped() {
        let html = sanitize("<section><p>kept</p></section>");
        assert!(!html.contains("section"));
        assert!(html.contains("<p>kept</p>"));
    }

    #[test]
    fn test_iframe_is_removed() {
        let html = sanitize("<iframe src=\"https://evil.example\"></iframe>ok");
        assert!(!html.contains("iframe"));
        assert!(html.contains("ok"));
    }

    #[test]
    fn test_image_attributes() {
        let html = sanitize(
            "<img src=\"https://example.com/a.png\" alt=\"a\" width=\"10\" onload=\"x()\">",
        );
        assert!(html.contains("src=\"https://example.com/a.png\""));
        assert!(html.contains("alt=\"a\""));
        assert!(html.contains("width=\"10\""));
        assert!(!html.contains("onload"));
    }

    #[test]
    fn test_link_rel_is_forced() {
        let html = sanitize("<a href=\"https://example.com\" rel=\"opener\">x</a>");
        assert!(html.contains("rel=\"nofollow\""));
        assert!(!html.contains("opener"));
    }
}
