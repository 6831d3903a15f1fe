//! Structural lookups and text normalization
//!
//! Record fields are located by short relative paths of element steps, the
//! way the portal's markup nests them (`tr[1]/td/table/tr[1]/th[2]`).
//! Positions are 1-based and counted among same-name siblings. Table rows
//! are counted through implied `tbody`/`thead`/`tfoot` sections, so a path
//! written against the served markup still matches the parsed tree.
//!
//! The slicing helpers count characters, not bytes, and never panic: a
//! shorter input simply yields a shorter (possibly empty) result.

use crate::error::{Error, Result};
use crate::types::ResourceKind;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// How a step moves from the current element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Direct children
    Child,
    /// Any element below the current one
    Descendant,
}

/// One element step of a structural path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    pub tag: &'static str,
    /// 1-based position among same-name siblings; `None` matches all
    pub position: Option<usize>,
}

impl Step {
    /// All children named `tag`
    pub const fn child(tag: &'static str) -> Self {
        Self {
            axis: Axis::Child,
            tag,
            position: None,
        }
    }

    /// The `position`-th child named `tag`
    pub const fn nth(tag: &'static str, position: usize) -> Self {
        Self {
            axis: Axis::Child,
            tag,
            position: Some(position),
        }
    }

    /// Descendants named `tag` that are the `position`-th of their siblings
    pub const fn descendant_nth(tag: &'static str, position: usize) -> Self {
        Self {
            axis: Axis::Descendant,
            tag,
            position: Some(position),
        }
    }
}

fn is_table_section(el: &ElementRef<'_>) -> bool {
    matches!(el.value().name(), "tbody" | "thead" | "tfoot")
}

/// Children of `parent` named `tag`, in document order
fn children_named<'a>(parent: ElementRef<'a>, tag: &str) -> Vec<ElementRef<'a>> {
    let through_sections = tag == "tr" && parent.value().name() == "table";
    let mut out = Vec::new();
    for child in parent.children().filter_map(ElementRef::wrap) {
        if child.value().name() == tag {
            out.push(child);
        } else if through_sections && is_table_section(&child) {
            out.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|row| row.value().name() == tag),
            );
        }
    }
    out
}

/// The element whose children `el` is counted among
fn logical_parent<'a>(el: ElementRef<'a>) -> Option<ElementRef<'a>> {
    let parent = el.parent().and_then(ElementRef::wrap)?;
    if el.value().name() == "tr" && is_table_section(&parent) {
        if let Some(table) = parent.parent().and_then(ElementRef::wrap) {
            if table.value().name() == "table" {
                return Some(table);
            }
        }
    }
    Some(parent)
}

/// 1-based position of `el` among its same-name siblings
fn sibling_position(el: ElementRef<'_>) -> Option<usize> {
    let parent = logical_parent(el)?;
    children_named(parent, el.value().name())
        .iter()
        .position(|sibling| sibling.id() == el.id())
        .map(|index| index + 1)
}

fn apply_step<'a>(from: ElementRef<'a>, step: &Step) -> Vec<ElementRef<'a>> {
    match step.axis {
        Axis::Child => {
            let mut matches = children_named(from, step.tag);
            match step.position {
                Some(position) => match position.checked_sub(1) {
                    Some(index) if index < matches.len() => vec![matches.swap_remove(index)],
                    _ => Vec::new(),
                },
                None => matches,
            }
        }
        Axis::Descendant => from
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == step.tag)
            .filter(|el| step.position.is_none() || sibling_position(*el) == step.position)
            .collect(),
    }
}

/// Every element reached by `path` from `from`, in document order
pub fn find_all<'a>(from: ElementRef<'a>, path: &[Step]) -> Vec<ElementRef<'a>> {
    let mut current = vec![from];
    for step in path {
        current = current
            .into_iter()
            .flat_map(|el| apply_step(el, step))
            .collect();
        if current.is_empty() {
            break;
        }
    }
    current
}

/// First element reached by `path`
pub fn find_first<'a>(from: ElementRef<'a>, path: &[Step]) -> Option<ElementRef<'a>> {
    find_all(from, path).into_iter().next()
}

/// First text node directly inside `el`
pub fn own_text<'a>(el: ElementRef<'a>) -> Option<&'a str> {
    el.children()
        .find_map(|node| node.value().as_text().map(|text| &**text))
}

/// First direct text of the elements reached by `path`
pub fn text_at<'a>(from: ElementRef<'a>, path: &[Step]) -> Option<&'a str> {
    find_all(from, path).into_iter().find_map(own_text)
}

/// Attribute of the first element reached by `path`
pub fn attr_at<'a>(from: ElementRef<'a>, path: &[Step], name: &str) -> Option<&'a str> {
    find_first(from, path).and_then(|el| el.value().attr(name))
}

/// Turn a missing node into a shape error
pub fn require<T>(
    value: Option<T>,
    resource: ResourceKind,
    field: &'static str,
    detail: &str,
) -> Result<T> {
    value.ok_or_else(|| Error::shape(resource, field, detail))
}

// ============================================================================
// Text normalization
// ============================================================================

/// Collapse whitespace runs (newlines included) to one space and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove every whitespace character
pub fn strip_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, "").into_owned()
}

/// Last `count` characters
pub fn tail_chars(text: &str, count: usize) -> String {
    let len = text.chars().count();
    text.chars().skip(len.saturating_sub(count)).collect()
}

/// Everything after the first `count` characters
pub fn skip_chars(text: &str, count: usize) -> String {
    text.chars().skip(count).collect()
}

/// Drop `head` leading and `tail` trailing characters
pub fn slice_chars(text: &str, head: usize, tail: usize) -> String {
    let len = text.chars().count();
    let end = len.saturating_sub(tail);
    if head >= end {
        return String::new();
    }
    text.chars().skip(head).take(end - head).collect()
}

/// The `from_end`-th `/`-separated segment counting from the end (1 = last)
pub fn path_segment_from_end(path: &str, from_end: usize) -> Option<&str> {
    if from_end == 0 {
        return None;
    }
    let segments: Vec<&str> = path.split('/').collect();
    let index = segments.len().checked_sub(from_end)?;
    segments.get(index).copied()
}
