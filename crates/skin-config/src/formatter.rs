//! Canonical text rendering for configuration trees.
//!
//! Blocks are written one entry per line with four-space indentation. Values
//! that would not survive a re-parse verbatim (empty, padded, or containing
//! braces, quotes, `#` or line breaks) are written as quoted strings.

use crate::ConfigNode;

const INDENT: &str = "    ";

/// Format a configuration tree.
///
/// An anonymous root (empty name) writes its children at the top level. The
/// returned string includes a trailing newline.
pub fn format_tree(node: &ConfigNode) -> String {
    let mut out = String::new();
    if node.name.is_empty() {
        for child in &node.children {
            write_node(child, 0, &mut out);
        }
    } else {
        write_node(node, 0, &mut out);
    }
    out
}

fn write_node(node: &ConfigNode, depth: usize, out: &mut String) {
    push_indent(out, depth);
    out.push_str(&node.name);

    match node.value() {
        Some(value) => {
            out.push(' ');
            if needs_quotes(value) {
                out.push_str(&quote_string(value));
            } else {
                out.push_str(value);
            }
            out.push('\n');
        }
        None => {
            out.push_str(" {\n");
            for child in &node.children {
                write_node(child, depth + 1, out);
            }
            push_indent(out, depth);
            out.push_str("}\n");
        }
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.trim() != value
        || value.starts_with('"')
        || value
            .chars()
            .any(|ch| matches!(ch, '{' | '}' | '#' | '\n' | '\r'))
}

/// Quote a string value, escaping special characters.
pub(crate) fn quote_string(value: &str) -> String {
    let escaped = escape_string(value);
    let mut quoted = String::with_capacity(escaped.len() + 2);
    quoted.push('"');
    quoted.push_str(&escaped);
    quoted.push('"');
    quoted
}

pub(crate) fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ => result.push(ch),
        }
    }
    result
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
