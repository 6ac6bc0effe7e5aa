//! Built-in node kinds.
//!
//! Tags are fixed; changing one is a breaking change for any renderer
//! registry keyed on it.

use crate::kind::{Category, NodeKind, Shape};

pub static DOCUMENT: NodeKind = NodeKind::new(1, "document", Category::Block, Shape::Container);
pub static PARAGRAPH: NodeKind = NodeKind::new(2, "paragraph", Category::Block, Shape::Container);
/// Heading; the level (1-6) is stored on the node.
pub static HEADING: NodeKind = NodeKind::new(3, "heading", Category::Block, Shape::Container);
pub static BLOCK_QUOTE: NodeKind =
    NodeKind::new(4, "block_quote", Category::Block, Shape::Container);
/// List; a list start marks an ordered list numbered from it.
pub static LIST: NodeKind = NodeKind::new(5, "list", Category::Block, Shape::Container);
pub static LIST_ITEM: NodeKind = NodeKind::new(6, "list_item", Category::Block, Shape::Container);

/// Indented code block; content is the literal code.
pub static CODE_BLOCK: NodeKind = NodeKind::new(7, "code_block", Category::Block, Shape::Leaf);
/// Fenced code block; `info` holds the info string.
pub static FENCED_CODE_BLOCK: NodeKind =
    NodeKind::new(8, "fenced_code_block", Category::Block, Shape::Leaf).with_base(&CODE_BLOCK);
pub static THEMATIC_BREAK: NodeKind =
    NodeKind::new(9, "thematic_break", Category::Block, Shape::Leaf);
pub static HTML_BLOCK: NodeKind = NodeKind::new(10, "html_block", Category::Block, Shape::Leaf);

pub static EMPHASIS: NodeKind = NodeKind::new(32, "emphasis", Category::Inline, Shape::Container);
pub static STRONG: NodeKind = NodeKind::new(33, "strong", Category::Inline, Shape::Container);
/// Link; `destination` and `title` are stored on the node.
pub static LINK: NodeKind = NodeKind::new(34, "link", Category::Inline, Shape::Container);

pub static TEXT: NodeKind = NodeKind::new(48, "text", Category::Inline, Shape::Leaf);
pub static CODE_SPAN: NodeKind = NodeKind::new(49, "code_span", Category::Inline, Shape::Leaf);
pub static HTML_INLINE: NodeKind = NodeKind::new(50, "html_inline", Category::Inline, Shape::Leaf);
pub static LINE_BREAK: NodeKind = NodeKind::new(51, "line_break", Category::Inline, Shape::Leaf);
/// Autolink; content is both the label and the destination.
pub static AUTOLINK: NodeKind = NodeKind::new(52, "autolink", Category::Inline, Shape::Leaf);

/// Every built-in kind.
pub static ALL: [&NodeKind; 18] = [
    &DOCUMENT,
    &PARAGRAPH,
    &HEADING,
    &BLOCK_QUOTE,
    &LIST,
    &LIST_ITEM,
    &CODE_BLOCK,
    &FENCED_CODE_BLOCK,
    &THEMATIC_BREAK,
    &HTML_BLOCK,
    &EMPHASIS,
    &STRONG,
    &LINK,
    &TEXT,
    &CODE_SPAN,
    &HTML_INLINE,
    &LINE_BREAK,
    &AUTOLINK,
];
