//! Text rendering for management-group trees.
//!
//! All functions are pure: the output depends only on the tree shape and the
//! arguments, so rendering the same tree twice yields identical lines.

use brutus_types::ManagementGroupNode;
use unicode_width::UnicodeWidthChar;

pub const NO_STRUCTURE_PLACEHOLDER: &str = "❌ No structure available";
pub const TRUNCATION_MARKER: &str = "   ... (truncated)";

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const BLANK: &str = "    ";
const GUTTER: &str = "  ";

fn level_icon(level: usize) -> &'static str {
    match level {
        0 => "🏛️",
        1 => "🏢",
        2 => "📁",
        _ => "📂",
    }
}

/// Depth-first, pre-order rendering of `node` and its subscriptions.
pub fn render_tree(node: &ManagementGroupNode) -> Vec<String> {
    let mut lines = Vec::new();
    render_node(node, "", "", "", &mut lines);
    lines
}

fn render_node(
    node: &ManagementGroupNode,
    prefix: &str,
    connector: &str,
    child_prefix: &str,
    lines: &mut Vec<String>,
) {
    lines.push(format!(
        "{}{}{} {} ({})",
        prefix,
        connector,
        level_icon(node.level),
        node.display_name,
        node.short_id()
    ));

    for sub in &node.subscriptions {
        lines.push(format!(
            "{}💳 {} ({})",
            child_prefix,
            sub.display_name,
            sub.short_id()
        ));
    }

    let last = node.children.len().saturating_sub(1);
    for (i, child) in node.children.iter().enumerate() {
        let (connector, continuation) = if i == last {
            (LAST_BRANCH, BLANK)
        } else {
            (BRANCH, PIPE)
        };
        let grandchild_prefix = format!("{}{}", child_prefix, continuation);
        render_node(child, child_prefix, connector, &grandchild_prefix, lines);
    }
}

/// Render at most `max_lines` lines, followed by a marker when lines were dropped.
pub fn render_truncated(node: &ManagementGroupNode, max_lines: usize) -> Vec<String> {
    let mut lines = render_tree(node);
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        lines.push(TRUNCATION_MARKER.to_string());
    }
    lines
}

/// Title, blank line, then the tree or the placeholder when there is no tree.
pub fn render_column(title: &str, node: Option<&ManagementGroupNode>) -> Vec<String> {
    let mut lines = vec![title.to_string(), String::new()];
    match node {
        Some(node) => lines.extend(render_tree(node)),
        None => lines.push(NO_STRUCTURE_PLACEHOLDER.to_string()),
    }
    lines
}

/// Current and recommended trees as two columns of `column_width` display cells.
///
/// Each side is rendered independently; the shorter column is padded with
/// blank rows so every output line has the same width.
pub fn render_side_by_side(
    current: Option<&ManagementGroupNode>,
    recommended: Option<&ManagementGroupNode>,
    column_width: usize,
) -> Vec<String> {
    let left = render_column("Current Structure", current);
    let right = render_column("Recommended Structure", recommended);
    let height = left.len().max(right.len());

    (0..height)
        .map(|i| {
            let l = left.get(i).map(String::as_str).unwrap_or("");
            let r = right.get(i).map(String::as_str).unwrap_or("");
            format!(
                "{}{}{}",
                fit_to_width(l, column_width),
                GUTTER,
                fit_to_width(r, column_width)
            )
        })
        .collect()
}

/// Emoji presentation selector. Terminals draw the preceding glyph two cells wide.
const VS16: char = '\u{FE0F}';

/// Split `text` into drawable units and their cell widths, folding a trailing
/// presentation selector into its base glyph.
fn cells(text: &str) -> Vec<(&str, usize)> {
    let mut out = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        let mut end = start + c.len_utf8();
        let mut width = c.width().unwrap_or(0);
        if let Some(&(_, VS16)) = chars.peek() {
            chars.next();
            end += VS16.len_utf8();
            width = 2;
        }
        out.push((&text[start..end], width));
    }
    out
}

/// Clip or pad `text` to exactly `width` display cells.
pub fn fit_to_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for (unit, w) in cells(text) {
        if used + w > width {
            break;
        }
        used += w;
        out.push_str(unit);
    }
    if used < width {
        out.push_str(&" ".repeat(width - used));
    }
    out
}

/// Display width in terminal cells, measured the same way as `fit_to_width`
pub fn display_width(text: &str) -> usize {
    cells(text).iter().map(|(_, w)| w).sum()
}
