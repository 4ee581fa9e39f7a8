//! Structural paths for parsed elements.
//!
//! Paths follow the convention of libxml2's `getpath`: `/`-separated tag names
//! from the document element down, where a step carries a 1-based `[k]`
//! qualifier only when its parent has more than one child element of the same
//! name (`/html/body/div[2]/ul/li[3]`).
//!
//! html5ever keeps characters such as `[` and `/` inside tag names, so they
//! are percent-escaped in steps. `[` and `/` in a path are always delimiters.

use std::borrow::Cow;
use std::collections::HashMap;

use scraper::ElementRef;

/// Compute the structural path of `element` within its document.
#[must_use]
pub fn structural_path(element: ElementRef<'_>) -> String {
    let mut steps = Vec::new();
    let mut current = Some(element);
    while let Some(el) = current {
        steps.push(step(el));
        current = el.parent().and_then(ElementRef::wrap);
    }
    steps.reverse();
    format!("/{}", steps.join("/"))
}

/// Path steps of every child element of `parent`, in document order.
///
/// Equivalent to calling [`structural_path`] on each child and keeping the
/// last step, in a single pass over the children.
pub(crate) fn child_steps(parent: ElementRef<'_>) -> Vec<(ElementRef<'_>, String)> {
    let children: Vec<ElementRef<'_>> = parent.children().filter_map(ElementRef::wrap).collect();

    let mut totals: HashMap<&str, usize> = HashMap::new();
    for child in &children {
        *totals.entry(child.value().name()).or_default() += 1;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    children
        .into_iter()
        .map(|child| {
            let name = child.value().name();
            let ordinal = seen.entry(name).or_default();
            *ordinal += 1;
            let total = totals.get(name).copied().unwrap_or(1);
            (child, qualify(name, *ordinal, total))
        })
        .collect()
}

fn step(element: ElementRef<'_>) -> String {
    let name = element.value().name();
    let Some(parent) = element.parent() else {
        return escape(name).into_owned();
    };

    let mut same_named = 0_usize;
    let mut ordinal = 0_usize;
    for sibling in parent.children().filter_map(ElementRef::wrap) {
        if sibling.value().name() != name {
            continue;
        }
        same_named += 1;
        if sibling.id() == element.id() {
            ordinal = same_named;
        }
    }

    qualify(name, ordinal, same_named)
}

fn qualify(name: &str, ordinal: usize, same_named: usize) -> String {
    let name = escape(name);
    if same_named > 1 {
        format!("{name}[{ordinal}]")
    } else {
        name.into_owned()
    }
}

fn escape(name: &str) -> Cow<'_, str> {
    if !name.contains(['%', '/', '[', ']']) {
        return Cow::Borrowed(name);
    }
    let mut escaped = String::with_capacity(name.len() + 6);
    for c in name.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '/' => escaped.push_str("%2F"),
            '[' => escaped.push_str("%5B"),
            ']' => escaped.push_str("%5D"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Tag names of every step in `path`, qualifiers stripped, space-joined.
///
/// `/html/body/div[2]/p[1]` becomes `html body div p`.
#[must_use]
pub fn path_words(path: &str) -> String {
    path.split('/')
        .filter(|step| !step.is_empty())
        .map(|step| step.split_once('[').map_or(step, |(name, _)| name))
        .collect::<Vec<_>>()
        .join(" ")
}
