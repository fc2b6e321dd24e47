//! Offset-addressed operations on node lists.
//!
//! Offsets count visible characters (see [`Node::text_len`]). Every
//! function here works on a slice of siblings with offsets relative to the
//! first sibling, recursing into elements with rebased offsets.

use super::types::{ElementKind, Node};

pub(crate) fn nodes_len(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::text_len).sum()
}

/// Plain text of `[start, end)`, line breaks rendered as `\n`.
pub(crate) fn text_in_range(nodes: &[Node], start: usize, end: usize) -> String {
    let mut out = String::new();
    let mut pos = 0;
    collect_range(nodes, start, end, &mut pos, &mut out);
    out
}

fn collect_range(nodes: &[Node], start: usize, end: usize, pos: &mut usize, out: &mut String) {
    for node in nodes {
        if *pos >= end {
            return;
        }
        match node {
            Node::Text(text) => {
                let len = text.chars().count();
                let from = start.saturating_sub(*pos).min(len);
                let to = end.saturating_sub(*pos).min(len);
                if from < to {
                    out.extend(text.chars().skip(from).take(to - from));
                }
                *pos += len;
            }
            Node::LineBreak => {
                if *pos >= start {
                    out.push('\n');
                }
                *pos += 1;
            }
            Node::Element(element) => collect_range(&element.children, start, end, pos, out),
        }
    }
}

/// Remove the visible characters in `[start, end)`.
///
/// Elements entirely covered by the range are dropped whole; partially
/// covered ones keep their remaining content. Empty leftovers are cleaned
/// up by [`normalize`].
pub(crate) fn remove_range(nodes: &mut Vec<Node>, start: usize, end: usize) {
    if start >= end {
        return;
    }
    let mut pos = 0;
    let mut i = 0;
    while i < nodes.len() {
        let len = nodes[i].text_len();
        let node_start = pos;
        let node_end = pos + len;
        pos = node_end;

        if len == 0 || node_end <= start || node_start >= end {
            i += 1;
            continue;
        }

        let fully_covered = start <= node_start && node_end <= end;
        if fully_covered {
            nodes.remove(i);
            continue;
        }

        let from = start.saturating_sub(node_start);
        let to = (end - node_start).min(len);
        match &mut nodes[i] {
            Node::Text(text) => {
                *text = text
                    .chars()
                    .take(from)
                    .chain(text.chars().skip(to))
                    .collect();
            }
            Node::Element(element) => remove_range(&mut element.children, from, to),
            // A line break is one character, so any overlap covers it fully.
            Node::LineBreak => {}
        }
        i += 1;
    }
}

/// Insert `new_nodes` at `offset`.
///
/// The insertion point prefers the deepest position: an offset at the end
/// of a text run or element extends that run or element, so typing after
/// bold text stays bold. Lists always route insertions into an item, and an
/// empty list directly after the offset wins over extending what precedes it.
pub(crate) fn insert_at(nodes: &mut Vec<Node>, offset: usize, new_nodes: Vec<Node>) {
    let mut pos = 0;
    for i in 0..nodes.len() {
        let len = nodes[i].text_len();
        let rel = offset.saturating_sub(pos);
        let empty_slot_follows = rel == len
            && nodes
                .get(i + 1)
                .is_some_and(|next| next.text_len() == 0 && has_list_slot(next));
        if !empty_slot_follows {
            let slot = has_list_slot(&nodes[i]);
            match &mut nodes[i] {
                Node::Text(text) if rel <= len => {
                    let tail: String = text.chars().skip(rel).collect();
                    *text = text.chars().take(rel).collect();
                    let insert_at = i + 1;
                    let count = new_nodes.len();
                    nodes.splice(insert_at..insert_at, new_nodes);
                    nodes.insert(insert_at + count, Node::Text(tail));
                    return;
                }
                Node::LineBreak if rel == 0 => {
                    nodes.splice(i..i, new_nodes);
                    return;
                }
                Node::Element(element) if rel < len || (rel == len && (len > 0 || slot)) => {
                    insert_at(&mut element.children, rel, new_nodes);
                    return;
                }
                _ => {}
            }
        }
        pos += len;
    }
    nodes.extend(new_nodes);
}

/// Whether `node` is, or wraps, a list that can take inserted content.
fn has_list_slot(node: &Node) -> bool {
    match node {
        Node::Element(element) => {
            matches!(element.kind, ElementKind::List(_) | ElementKind::ListItem)
                || element.children.iter().any(has_list_slot)
        }
        _ => false,
    }
}

/// Drop empty text and empty elements, merge adjacent text runs.
pub(crate) fn normalize(nodes: &mut Vec<Node>) {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes.drain(..) {
        match node {
            Node::Text(text) if text.is_empty() => {}
            Node::Text(text) => {
                if let Some(Node::Text(prev)) = out.last_mut() {
                    prev.push_str(&text);
                } else {
                    out.push(Node::Text(text));
                }
            }
            Node::Element(mut element) => {
                normalize(&mut element.children);
                if !element.children.is_empty() || element.kind.keeps_when_empty() {
                    out.push(Node::Element(element));
                }
            }
            Node::LineBreak => out.push(Node::LineBreak),
        }
    }
    *nodes = out;
}

/// Build text and line-break nodes from plain text.
pub(crate) fn nodes_from_plain_text(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    for (i, part) in text.split('\n').enumerate() {
        if i > 0 {
            nodes.push(Node::LineBreak);
        }
        if !part.is_empty() {
            nodes.push(Node::text(part));
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold(text: &str) -> Node {
        Node::element(ElementKind::Bold, vec![Node::text(text)])
    }

    #[test]
    fn test_nodes_len_counts_line_breaks() {
        let nodes = vec![Node::text("ab"), Node::LineBreak, bold("cd")];
        assert_eq!(nodes_len(&nodes), 5);
    }

    #[test]
    fn test_text_in_range_spans_elements() {
        let nodes = vec![Node::text("ab"), Node::LineBreak, bold("cd")];
        assert_eq!(text_in_range(&nodes, 1, 4), "b\nc");
        assert_eq!(text_in_range(&nodes, 0, 5), "ab\ncd");
        assert_eq!(text_in_range(&nodes, 3, 3), "");
    }

    #[test]
    fn test_text_in_range_counts_multibyte_as_one() {
        let nodes = vec![Node::text("café!")];
        assert_eq!(text_in_range(&nodes, 3, 5), "é!");
    }

    #[test]
    fn test_remove_range_inside_text() {
        let mut nodes = vec![Node::text("hello")];
        remove_range(&mut nodes, 1, 4);
        assert_eq!(nodes, vec![Node::text("ho")]);
    }

    #[test]
    fn test_remove_range_drops_covered_elements() {
        let mut nodes = vec![Node::text("a"), bold("bc"), Node::text("d")];
        remove_range(&mut nodes, 1, 3);
        normalize(&mut nodes);
        assert_eq!(nodes, vec![Node::text("ad")]);
    }

    #[test]
    fn test_remove_range_partial_element() {
        let mut nodes = vec![bold("abcd")];
        remove_range(&mut nodes, 2, 10);
        assert_eq!(nodes, vec![bold("ab")]);
    }

    #[test]
    fn test_remove_range_line_break() {
        let mut nodes = vec![Node::text("a"), Node::LineBreak, Node::text("b")];
        remove_range(&mut nodes, 1, 2);
        normalize(&mut nodes);
        assert_eq!(nodes, vec![Node::text("ab")]);
    }

    #[test]
    fn test_insert_at_splits_text() {
        let mut nodes = vec![Node::text("hd")];
        insert_at(&mut nodes, 1, vec![bold("X")]);
        normalize(&mut nodes);
        assert_eq!(nodes, vec![Node::text("h"), bold("X"), Node::text("d")]);
    }

    #[test]
    fn test_insert_at_end_of_element_extends_it() {
        let mut nodes = vec![bold("ab")];
        insert_at(&mut nodes, 2, vec![Node::text("c")]);
        normalize(&mut nodes);
        assert_eq!(nodes, vec![bold("abc")]);
    }

    #[test]
    fn test_insert_before_line_break() {
        let mut nodes = vec![Node::LineBreak];
        insert_at(&mut nodes, 0, vec![Node::text("x")]);
        assert_eq!(nodes, vec![Node::text("x"), Node::LineBreak]);
    }

    #[test]
    fn test_insert_after_line_break_appends() {
        let mut nodes = vec![Node::LineBreak];
        insert_at(&mut nodes, 1, vec![Node::text("x")]);
        assert_eq!(nodes, vec![Node::LineBreak, Node::text("x")]);
    }

    #[test]
    fn test_insert_into_empty_list_item() {
        let list = Node::element(
            ElementKind::List(super::super::types::ListKind::Unordered),
            vec![Node::element(ElementKind::ListItem, Vec::new())],
        );
        let mut nodes = vec![list];
        insert_at(&mut nodes, 0, vec![Node::text("item")]);
        let Node::Element(list) = &nodes[0] else {
            panic!("expected list");
        };
        let Node::Element(item) = &list.children[0] else {
            panic!("expected item");
        };
        assert_eq!(item.children, vec![Node::text("item")]);
    }

    #[test]
    fn test_insert_prefers_empty_list_after_text() {
        let list = Node::element(
            ElementKind::Span,
            vec![Node::element(
                ElementKind::List(super::super::types::ListKind::Ordered),
                vec![Node::element(ElementKind::ListItem, Vec::new())],
            )],
        );
        let mut nodes = vec![Node::text("ab"), list];
        insert_at(&mut nodes, 2, vec![Node::text("x")]);
        assert_eq!(text_in_range(&nodes, 0, 3), "abx");
        assert_eq!(nodes[0], Node::text("ab"));
    }

    #[test]
    fn test_normalize_merges_text_and_drops_empty() {
        let mut nodes = vec![
            Node::text("a"),
            Node::text(""),
            Node::text("b"),
            Node::element(ElementKind::Bold, vec![Node::text("")]),
        ];
        normalize(&mut nodes);
        assert_eq!(nodes, vec![Node::text("ab")]);
    }

    #[test]
    fn test_normalize_keeps_empty_list_item() {
        let mut nodes = vec![Node::element(ElementKind::ListItem, Vec::new())];
        normalize(&mut nodes);
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_nodes_from_plain_text() {
        assert_eq!(
            nodes_from_plain_text("a\n\nb"),
            vec![Node::text("a"), Node::LineBreak, Node::LineBreak, Node::text("b")]
        );
        assert!(nodes_from_plain_text("").is_empty());
    }
}
