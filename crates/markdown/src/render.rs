//! Markdown to HTML conversion.

use std::collections::{HashMap, HashSet};

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::slug::slugify;

const TASK_DONE: &str = "<span class=\"task-list-item-checkbox checked\">\u{2611}</span> ";
const TASK_OPEN: &str = "<span class=\"task-list-item-checkbox\">\u{2610}</span> ";

/// Convert Markdown to (unsanitized) HTML.
///
/// Single newlines become `<br>`, headings get slug ids, and task-list
/// markers are emitted as plain spans so they survive sanitization.
#[must_use]
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, options)
        .map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            Event::TaskListMarker(true) => Event::InlineHtml(CowStr::Borrowed(TASK_DONE)),
            Event::TaskListMarker(false) => Event::InlineHtml(CowStr::Borrowed(TASK_OPEN)),
            other => other,
        })
        .collect();

    assign_heading_ids(&mut events);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Give every heading without an explicit id a slug of its text.
///
/// Repeated slugs get `-2`, `-3`, ... suffixes in document order. A suffix
/// never reuses an id already given to an earlier heading.
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut used: HashSet<String> = HashSet::new();
    let mut last_suffix: HashMap<String, usize> = HashMap::new();

    for i in 0..events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }

        let base = slugify(&heading_text(&events[i + 1..]));
        if base.is_empty() {
            continue;
        }

        let slug = if used.contains(&base) {
            let n = last_suffix.entry(base.clone()).or_insert(1);
            loop {
                *n += 1;
                let candidate = format!("{base}-{n}");
                if !used.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            base
        };
        used.insert(slug.clone());

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(slug));
        }
    }
}

/// Concatenate the text inside a heading, up to its closing tag.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}
