//! Markdown tokenizer for the note preview.
//!
//! # Responsibility
//! - Turn a raw buffer into an ordered forest of block and inline nodes.
//!
//! # Invariants
//! - `parse` never fails; unmatched markers stay literal text.
//! - Node spans stay within the buffer and are ordered by `span.start`.
//! - Children lie inside their parent's `content` span.
//! - `**` is tried before `*` at every star run; a style never nests in itself.

use super::block::{classify_line, split_lines, LineKind, LineRange};
use crate::model::span::TextSpan;

/// Node variant produced by [`parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Literal text. As a top-level node it is a paragraph line whose
    /// children hold the inline nodes.
    PlainText,
    Bold,
    Italic,
    /// `level` is 1..=3.
    Heading { level: u8 },
    ListItem { ordered: bool },
    CodeInline,
    CodeBlock,
}

/// One parsed markdown node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownNode {
    pub kind: NodeKind,
    /// Full extent including markers.
    pub span: TextSpan,
    /// Extent without markers or line prefix.
    pub content: TextSpan,
    pub children: Vec<MarkdownNode>,
}

impl MarkdownNode {
    fn leaf(kind: NodeKind, span: TextSpan) -> Self {
        Self {
            kind,
            span,
            content: span,
            children: Vec::new(),
        }
    }

    fn plain(start: usize, end: usize) -> Self {
        Self::leaf(NodeKind::PlainText, TextSpan::new(start, end))
    }
}

/// Parses `buffer` into block nodes in document order.
///
/// Blank lines produce no node.
pub fn parse(buffer: &str) -> Vec<MarkdownNode> {
    let lines = split_lines(buffer);
    let mut nodes = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];
        let text = line.text(buffer);
        let kind = classify_line(text);

        if kind == LineKind::Fence {
            let (node, next) = parse_code_block(buffer, &lines, idx);
            nodes.push(node);
            idx = next;
            continue;
        }

        idx += 1;
        if text.trim().is_empty() {
            continue;
        }

        let content_start = line.start + kind.prefix_len();
        let content = TextSpan::new(content_start, line.end);
        let children = parse_inline(buffer, content_start, line.end, InlineContext::TOP);
        let kind = match kind {
            LineKind::Heading { level, .. } => NodeKind::Heading { level },
            LineKind::Bullet { .. } => NodeKind::ListItem { ordered: false },
            LineKind::Ordered { .. } => NodeKind::ListItem { ordered: true },
            LineKind::Plain | LineKind::Fence => NodeKind::PlainText,
        };
        nodes.push(MarkdownNode {
            kind,
            span: TextSpan::new(line.start, line.end),
            content,
            children,
        });
    }

    nodes
}

/// Consumes an opening fence at `open_idx` through its closing fence, or to
/// the end of the buffer. Returns the node and the next unconsumed line index.
fn parse_code_block(buffer: &str, lines: &[LineRange], open_idx: usize) -> (MarkdownNode, usize) {
    let open = lines[open_idx];
    let close_idx = lines
        .iter()
        .enumerate()
        .skip(open_idx + 1)
        .find(|(_, line)| classify_line(line.text(buffer)) == LineKind::Fence)
        .map(|(idx, _)| idx);

    let last_idx = close_idx.unwrap_or(lines.len() - 1);
    let span = TextSpan::new(open.start, lines[last_idx].end);

    let inner_first = open_idx + 1;
    let inner_last = match close_idx {
        Some(close) => close.checked_sub(1),
        None => Some(lines.len() - 1),
    };
    let content = match inner_last {
        Some(last) if last >= inner_first => {
            TextSpan::new(lines[inner_first].start, lines[last].end)
        }
        _ => TextSpan::cursor(open.end),
    };

    let children = if content.is_empty() {
        Vec::new()
    } else {
        vec![MarkdownNode::leaf(NodeKind::PlainText, content)]
    };

    (
        MarkdownNode {
            kind: NodeKind::CodeBlock,
            span,
            content,
            children,
        },
        last_idx + 1,
    )
}

/// Which inline styles may still open at the current nesting depth.
#[derive(Debug, Clone, Copy)]
struct InlineContext {
    bold: bool,
    italic: bool,
}

impl InlineContext {
    const TOP: Self = Self {
        bold: true,
        italic: true,
    };
}

fn parse_inline(buffer: &str, start: usize, end: usize, ctx: InlineContext) -> Vec<MarkdownNode> {
    let bytes = buffer.as_bytes();
    let mut nodes = Vec::new();
    let mut plain_start = start;
    let mut idx = start;

    while idx < end {
        match bytes[idx] {
            b'`' => {
                if let Some(close) = find_byte(bytes, b'`', idx + 1, end) {
                    flush_plain(&mut nodes, plain_start, idx);
                    let content = TextSpan::new(idx + 1, close);
                    let children = if content.is_empty() {
                        Vec::new()
                    } else {
                        vec![MarkdownNode::leaf(NodeKind::PlainText, content)]
                    };
                    nodes.push(MarkdownNode {
                        kind: NodeKind::CodeInline,
                        span: TextSpan::new(idx, close + 1),
                        content,
                        children,
                    });
                    idx = close + 1;
                    plain_start = idx;
                } else {
                    idx += 1;
                }
            }
            b'*' => {
                let run = star_run(bytes, idx, end);
                if run >= 2 && ctx.bold {
                    if let Some(close) = find_bold_close(bytes, idx + 2, end) {
                        flush_plain(&mut nodes, plain_start, idx);
                        let inner = InlineContext { bold: false, ..ctx };
                        nodes.push(MarkdownNode {
                            kind: NodeKind::Bold,
                            span: TextSpan::new(idx, close + 2),
                            content: TextSpan::new(idx + 2, close),
                            children: parse_inline(buffer, idx + 2, close, inner),
                        });
                        idx = close + 2;
                        plain_start = idx;
                        continue;
                    }
                }
                if ctx.italic {
                    if let Some(close) = find_italic_close(bytes, idx + 1, end, ctx.bold) {
                        flush_plain(&mut nodes, plain_start, idx);
                        let inner = InlineContext {
                            italic: false,
                            ..ctx
                        };
                        nodes.push(MarkdownNode {
                            kind: NodeKind::Italic,
                            span: TextSpan::new(idx, close + 1),
                            content: TextSpan::new(idx + 1, close),
                            children: parse_inline(buffer, idx + 1, close, inner),
                        });
                        idx = close + 1;
                        plain_start = idx;
                        continue;
                    }
                }
                // Unmatched: the star stays literal.
                idx += 1;
            }
            _ => idx += 1,
        }
    }

    flush_plain(&mut nodes, plain_start, end);
    nodes
}

fn flush_plain(nodes: &mut Vec<MarkdownNode>, start: usize, end: usize) {
    if start < end {
        nodes.push(MarkdownNode::plain(start, end));
    }
}

fn find_byte(bytes: &[u8], needle: u8, from: usize, end: usize) -> Option<usize> {
    (from..end).find(|&idx| bytes[idx] == needle)
}

fn star_run(bytes: &[u8], from: usize, end: usize) -> usize {
    bytes[from..end].iter().take_while(|&&b| b == b'*').count()
}

/// Finds the start of the closing `**` for a bold opened just before `from`.
///
/// A longer star run closes with its last two stars. Code spans are skipped.
fn find_bold_close(bytes: &[u8], from: usize, end: usize) -> Option<usize> {
    let mut idx = from;
    while idx < end {
        match bytes[idx] {
            b'`' => match find_byte(bytes, b'`', idx + 1, end) {
                Some(close) => idx = close + 1,
                None => idx += 1,
            },
            b'*' => {
                let run = star_run(bytes, idx, end);
                if run >= 2 {
                    let close = idx + run - 2;
                    return (close > from).then_some(close);
                }
                idx += run;
            }
            _ => idx += 1,
        }
    }
    None
}

/// Finds the closing `*` for an italic opened just before `from`.
///
/// Only a lone star closes. A complete bold inside the italic is skipped
/// whole; any other multi-star run is skipped as literal text.
fn find_italic_close(bytes: &[u8], from: usize, end: usize, bold_allowed: bool) -> Option<usize> {
    let mut idx = from;
    while idx < end {
        match bytes[idx] {
            b'`' => match find_byte(bytes, b'`', idx + 1, end) {
                Some(close) => idx = close + 1,
                None => idx += 1,
            },
            b'*' => {
                let run = star_run(bytes, idx, end);
                if run == 1 {
                    return (idx > from).then_some(idx);
                }
                if bold_allowed {
                    if let Some(bold_close) = find_bold_close(bytes, idx + 2, end) {
                        idx = bold_close + 2;
                        continue;
                    }
                }
                idx += run;
            }
            _ => idx += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{parse, MarkdownNode, NodeKind};
    use crate::model::span::TextSpan;

    fn kinds(nodes: &[MarkdownNode]) -> Vec<NodeKind> {
        nodes.iter().map(|node| node.kind).collect()
    }

    fn texts<'a>(buffer: &'a str, nodes: &[MarkdownNode]) -> Vec<&'a str> {
        nodes.iter().map(|node| node.span.slice(buffer)).collect()
    }

    #[test]
    fn classifies_block_lines() {
        let buffer = "# Title\n- one\n2. two\nplain\n\n#### not heading";
        let nodes = parse(buffer);
        assert_eq!(
            kinds(&nodes),
            vec![
                NodeKind::Heading { level: 1 },
                NodeKind::ListItem { ordered: false },
                NodeKind::ListItem { ordered: true },
                NodeKind::PlainText,
                NodeKind::PlainText,
            ]
        );
        assert_eq!(nodes[0].content.slice(buffer), "Title");
        assert_eq!(nodes[2].content.slice(buffer), "two");
        assert_eq!(nodes[4].span.slice(buffer), "#### not heading");
    }

    #[test]
    fn recognizes_bold_italic_and_code() {
        let buffer = "a **b** *c* `d`";
        let line = &parse(buffer)[0];
        assert_eq!(
            kinds(&line.children),
            vec![
                NodeKind::PlainText,
                NodeKind::Bold,
                NodeKind::PlainText,
                NodeKind::Italic,
                NodeKind::PlainText,
                NodeKind::CodeInline,
            ]
        );
        assert_eq!(
            texts(buffer, &line.children),
            vec!["a ", "**b**", " ", "*c*", " ", "`d`"]
        );
        assert_eq!(line.children[1].content.slice(buffer), "b");
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        let buffer = "2 * 3 and **open";
        let line = &parse(buffer)[0];
        assert_eq!(kinds(&line.children), vec![NodeKind::PlainText]);
        assert_eq!(line.children[0].span, TextSpan::new(0, buffer.len()));
    }

    #[test]
    fn code_span_suppresses_inner_markdown() {
        let buffer = "`**not bold**` after";
        let line = &parse(buffer)[0];
        assert_eq!(line.children[0].kind, NodeKind::CodeInline);
        assert_eq!(line.children[0].children.len(), 1);
        assert_eq!(line.children[0].children[0].kind, NodeKind::PlainText);
    }

    #[test]
    fn italic_nests_inside_bold_but_bold_does_not_nest_in_bold() {
        let buffer = "***x***";
        let line = &parse(buffer)[0];
        assert_eq!(kinds(&line.children), vec![NodeKind::Bold]);
        let bold = &line.children[0];
        assert_eq!(bold.content.slice(buffer), "*x*");
        assert_eq!(kinds(&bold.children), vec![NodeKind::Italic]);
        assert_eq!(bold.children[0].content.slice(buffer), "x");
    }

    #[test]
    fn italic_skips_over_inner_bold() {
        let buffer = "*a **b** c*";
        let line = &parse(buffer)[0];
        assert_eq!(kinds(&line.children), vec![NodeKind::Italic]);
        let italic = &line.children[0];
        assert_eq!(
            kinds(&italic.children),
            vec![NodeKind::PlainText, NodeKind::Bold, NodeKind::PlainText]
        );
    }

    #[test]
    fn double_star_without_close_falls_back_to_italic() {
        let buffer = "**a*";
        let line = &parse(buffer)[0];
        assert_eq!(texts(buffer, &line.children), vec!["*", "*a*"]);
        assert_eq!(line.children[1].kind, NodeKind::Italic);
    }

    #[test]
    fn fenced_block_absorbs_block_lines() {
        let buffer = "intro\n```\n# not a heading\n- nor a list\n```\nafter";
        let nodes = parse(buffer);
        assert_eq!(
            kinds(&nodes),
            vec![NodeKind::PlainText, NodeKind::CodeBlock, NodeKind::PlainText]
        );
        assert_eq!(
            nodes[1].content.slice(buffer),
            "# not a heading\n- nor a list"
        );
        assert_eq!(nodes[1].span.slice(buffer), "```\n# not a heading\n- nor a list\n```");
    }

    #[test]
    fn unclosed_fence_runs_to_end_of_buffer() {
        let buffer = "```\n**x**";
        let nodes = parse(buffer);
        assert_eq!(kinds(&nodes), vec![NodeKind::CodeBlock]);
        assert_eq!(nodes[0].content.slice(buffer), "**x**");
        assert_eq!(nodes[0].children[0].kind, NodeKind::PlainText);
    }

    #[test]
    fn empty_buffer_yields_no_nodes() {
        assert!(parse("").is_empty());
        assert!(parse("\n  \n").is_empty());
    }

    fn assert_well_formed(buffer: &str, nodes: &[MarkdownNode], lower: usize, upper: usize) {
        let mut last = lower;
        for node in nodes {
            assert!(node.span.start >= last, "spans out of order in {buffer:?}");
            assert!(node.span.end <= upper, "span past bound in {buffer:?}");
            assert!(node.content.start >= node.span.start);
            assert!(node.content.end <= node.span.end);
            assert_well_formed(buffer, &node.children, node.content.start, node.content.end);
            last = node.span.end;
        }
    }

    #[test]
    fn parse_is_total_and_spans_are_ordered() {
        let samples = [
            "",
            "*",
            "**",
            "***",
            "****",
            "`",
            "``",
            "* ",
            "# ",
            "1.",
            "```",
            "```\n```\n```",
            "**a *b** c*",
            "é*ü*ñ **日本** `語`",
            "- **x\n## *y\r\n3. `z",
            "*a `*` b*",
        ];
        for buffer in samples {
            let nodes = parse(buffer);
            assert_well_formed(buffer, &nodes, 0, buffer.len());
        }
    }
}
