//! Built-in plain-text writers.
//!
//! Emits the textual content of a document: markup is dropped, raw HTML
//! is skipped, and each block ends on its own line. Inline containers
//! (emphasis, strong) have no writer and fall back to child traversal.
//!
//! With `implicit_paragraph` enabled, consecutive blocks are separated by a
//! blank line.

use quill_config::RendererOptions;
use quill_syntax::{Category, NodeRef, Shape, SyntaxTree, kinds};

use crate::error::RenderError;
use crate::family::Family;
use crate::format::PlainText;
use crate::registry::ObjectRendererRegistry;
use crate::renderer::Renderer;
use crate::writer::FnWriter;

/// Registry with the plain-text writers.
pub fn registry(options: &RendererOptions) -> ObjectRendererRegistry<PlainText> {
    let mut registry: ObjectRendererRegistry<PlainText> =
        ObjectRendererRegistry::new().with_rebuild_interval(options.rebuild_interval);
    registry
        .push(FnWriter::new(Family::of(&kinds::PARAGRAPH), block))
        .push(FnWriter::new(Family::of(&kinds::HEADING), block))
        .push(FnWriter::new(Family::of(&kinds::LIST_ITEM), block))
        .push(FnWriter::new(Family::of(&kinds::CODE_BLOCK), code_block))
        .push(FnWriter::new(Family::of(&kinds::THEMATIC_BREAK), skip))
        .push(FnWriter::new(Family::of(&kinds::HTML_BLOCK), skip))
        .push(FnWriter::new(Family::of(&kinds::HTML_INLINE), skip))
        .push(FnWriter::new(Family::of(&kinds::LINE_BREAK), |r, _| {
            r.write_char('\n')
        }))
        .push(FnWriter::new(Family::Shape(Category::Inline, Shape::Leaf), content));
    registry
}

/// Render `tree` to plain text with the built-in writers.
pub fn to_plain_text(tree: &SyntaxTree, options: &RendererOptions) -> Result<String, RenderError> {
    // Text output is never entity-escaped.
    let options = options.clone().with_escape(false);
    crate::renderer::render_to_string(&registry(&options), &options, tree)
}

fn block(r: &mut Renderer<'_, PlainText>, node: NodeRef<'_>) -> Result<(), RenderError> {
    r.ensure_line()?;
    r.write_children(node)?;
    end_block(r)
}

fn code_block(r: &mut Renderer<'_, PlainText>, node: NodeRef<'_>) -> Result<(), RenderError> {
    r.ensure_line()?;
    r.write_leaf_content(node)?;
    end_block(r)
}

fn end_block(r: &mut Renderer<'_, PlainText>) -> Result<(), RenderError> {
    r.ensure_line()?;
    if r.implicit_paragraph() && !r.is_last_in_container() {
        r.write_char('\n')?;
    }
    Ok(())
}

fn content(r: &mut Renderer<'_, PlainText>, node: NodeRef<'_>) -> Result<(), RenderError> {
    r.write_leaf_content(node)
}

fn skip(_: &mut Renderer<'_, PlainText>, _: NodeRef<'_>) -> Result<(), RenderError> {
    Ok(())
}
