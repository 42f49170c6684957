//! Markdown rendering for notebook notes.
//!
//! Notes are written in Markdown and stored alongside a pre-rendered HTML
//! copy. This crate produces that copy.
//!
//! # Features
//!
//! - **Rendering**: Markdown to HTML via [`to_html`], with tables, fenced
//!   code, strikethrough, task lists, hard line breaks and heading anchors
//! - **Sanitization**: allow-list HTML cleaning via [`sanitize`]
//! - **Both**: [`render_to_safe_html`], the only entry point the save path uses
//!
//! # Example
//!
//! ```
//! use notebook_markdown::render_to_safe_html;
//!
//! let html = render_to_safe_html("# Hi\n\n<script>alert(1)</script>");
//! assert!(html.contains("<h1 id=\"hi\">Hi</h1>"));
//! assert!(!html.contains("<script"));
//! ```

#![allow(clippy::missing_const_for_fn)]

mod render;
mod sanitize;
mod slug;

pub use render::to_html;
pub use sanitize::{ALLOWED_TAGS, sanitize};
pub use slug::slugify;

/// Render Markdown to HTML that is safe to embed without further escaping.
///
/// Blank input renders to the empty string. Never fails: malformed Markdown
/// comes out as best-effort HTML.
#[must_use]
pub fn render_to_safe_html(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return String::new();
    }

    sanitize(&to_html(markdown))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_renders_empty() {
        assert_eq!(render_to_safe_html(""), "");
    }

    #[test]
    fn test_whitespace_input_renders_empty() {
        assert_eq!(render_to_safe_html("   \n\t\n  "), "");
    }

    #[test]
    fn test_script_is_removed() {
        let html = render_to_safe_html("# Hi\n\n<script>alert(1)</script>");
        assert!(html.contains("<h1 id=\"hi\">Hi</h1>"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("</script"));
    }

    #[test]
    fn test_inline_script_is_removed() {
        let html = render_to_safe_html("before <script>alert(1)</script> after");
        assert!(!html.contains("<script"));
        assert!(html.contains("before"));
        assert!(html.contains("after"));
    }

    #[test]
    fn test_onerror_attribute_is_removed() {
        let html = render_to_safe_html("<img src=\"a.png\" onerror=\"alert(1)\">");
        assert!(!html.contains("onerror"));
        assert!(!html.contains("alert(1)"));
    }

    #[test]
    fn test_event_handler_in_markdown_image_is_removed() {
        let html = render_to_safe_html("![x](a.png)\n\n<p onclick=\"steal()\">hi</p>");
        assert!(!html.contains("onclick"));
        assert!(html.contains("hi"));
    }

    #[test]
    fn test_javascript_links_are_dropped() {
        let html = render_to_safe_html("[click](javascript:alert(1))");
        assert!(!html.contains("javascript:"));
        assert!(html.contains("click"));
    }

    #[test]
    fn test_links_are_nofollow() {
        let html = render_to_safe_html("[docs](https://example.com/docs)");
        assert!(html.contains("href=\"https://example.com/docs\""));
        assert!(html.contains("rel=\"nofollow\""));
    }

    #[test]
    fn test_disallowed_tag_keeps_text() {
        let html = render_to_safe_html("say <marquee>hello</marquee> there");
        assert!(!html.contains("marquee"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn test_fenced_code_keeps_language_class() {
        let html = render_to_safe_html("```rust\nfn main() {}\n```");
        assert!(html.contains("<pre><code class=\"language-rust\">"));
        assert!(html.contains("fn main() {}"));
    }

    #[test]
    fn test_tables() {
        let html = render_to_safe_html("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<th>a</th>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_single_newline_is_line_break() {
        let html = render_to_safe_html("first\nsecond");
        assert!(html.contains("<br"));
    }

    #[test]
    fn test_task_list_renders_without_input() {
        let html = render_to_safe_html("- [x] done\n- [ ] todo");
        assert!(!html.contains("<input"));
        assert!(html.contains("task-list-item-checkbox"));
        assert!(html.contains("done"));
        assert!(html.contains("todo"));
    }

    #[test]
    fn test_strikethrough() {
        let html = render_to_safe_html("~~gone~~");
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_intraword_underscores_stay_literal() {
        let html = render_to_safe_html("call snake_case_name here");
        assert!(html.contains("snake_case_name"));
        assert!(!html.contains("<em>"));
    }

    #[test]
    fn test_cuddled_list() {
        let html = render_to_safe_html("Items:\n- one\n- two");
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<li>two</li>"));
    }
}
