//! Built-in HTML writers.
//!
//! Produces HTML5 with one block element per line:
//! - `<pre><code class="language-..">` for code blocks
//! - `<ol start="n">` for ordered lists not starting at 1
//! - node attributes on every block element that carries them
//!
//! Kinds without a writer here (custom kinds without their own writer)
//! fall back to child traversal or are skipped.

use quill_config::RendererOptions;
use quill_syntax::{NodeKind, NodeRef, SyntaxTree, kinds};

use crate::error::RenderError;
use crate::family::Family;
use crate::format::Html;
use crate::registry::ObjectRendererRegistry;
use crate::renderer::Renderer;
use crate::writer::FnWriter;

/// Registry with a writer for every built-in kind.
pub fn registry(options: &RendererOptions) -> ObjectRendererRegistry<Html> {
    let mut registry =
        ObjectRendererRegistry::new().with_rebuild_interval(options.rebuild_interval);
    registry
        .push(writer(&kinds::PARAGRAPH, paragraph))
        .push(writer(&kinds::HEADING, heading))
        .push(writer(&kinds::BLOCK_QUOTE, block_quote))
        .push(writer(&kinds::LIST, list))
        .push(writer(&kinds::LIST_ITEM, list_item))
        .push(writer(&kinds::CODE_BLOCK, code_block))
        .push(writer(&kinds::THEMATIC_BREAK, thematic_break))
        .push(writer(&kinds::HTML_BLOCK, raw_block))
        .push(writer(&kinds::TEXT, text))
        .push(writer(&kinds::EMPHASIS, |r, node| inline(r, node, "em")))
        .push(writer(&kinds::STRONG, |r, node| inline(r, node, "strong")))
        .push(writer(&kinds::LINK, link))
        .push(writer(&kinds::CODE_SPAN, code_span))
        .push(writer(&kinds::HTML_INLINE, raw_inline))
        .push(writer(&kinds::LINE_BREAK, line_break))
        .push(writer(&kinds::AUTOLINK, autolink));
    registry
}

/// Render `tree` to HTML with the built-in writers.
pub fn to_html(
    tree: &SyntaxTree,
    options: &RendererOptions,
) -> Result<String, RenderError> {
    crate::renderer::render_to_string(&registry(options), options, tree)
}

fn writer<W>(kind: &'static NodeKind, body: W) -> FnWriter<Html>
where
    W: for<'a, 'r, 't> Fn(&'a mut Renderer<'r, Html>, NodeRef<'t>) -> Result<(), RenderError>
        + Send
        + Sync
        + 'static,
{
    FnWriter::new(Family::of(kind), body)
}

/// `<tag attrs>`
fn open_tag(r: &mut Renderer<'_, Html>, tag: &str, node: NodeRef<'_>) -> Result<(), RenderError> {
    r.write_char('<')?;
    r.write_str(tag)?;
    r.write_attributes(node)?;
    r.write_char('>')
}

fn paragraph(r: &mut Renderer<'_, Html>, node: NodeRef<'_>) -> Result<(), RenderError> {
    r.ensure_line()?;
    open_tag(r, "p", node)?;
    r.write_children(node)?;
    r.write_line("</p>")
}

fn heading(r: &mut Renderer<'_, Html>, node: NodeRef<'_>) -> Result<(), RenderError> {
    let level = node.level().clamp(1, 6);
    r.ensure_line()?;
    write!(r, "<h{level}")?;
    r.write_attributes(node)?;
    r.write_char('>')?;
    r.write_children(node)?;
    writeln!(r, "</h{level}>")
}

fn block_quote(r: &mut Renderer<'_, Html>, node: NodeRef<'_>) -> Result<(), RenderError> {
    r.ensure_line()?;
    open_tag(r, "blockquote", node)?;
    r.write_char('\n')?;
    r.write_children(node)?;
    r.ensure_line()?;
    r.write_line("</blockquote>")
}

/// Lists without a start number are bullet lists.
fn list(r: &mut Renderer<'_, Html>, node: NodeRef<'_>) -> Result<(), RenderError> {
    let start = node.list_start();
    let tag = if start.is_some() { "ol" } else { "ul" };
    r.ensure_line()?;
    r.write_char('<')?;
    r.write_str(tag)?;
    if let Some(start) = start.filter(|&start| start != 1) {
        write!(r, " start=\"{start}\"")?;
    }
    r.write_attributes(node)?;
    r.write_line(">")?;
    r.write_children(node)?;
    r.ensure_line()?;
    writeln!(r, "</{tag}>")
}

fn list_item(r: &mut Renderer<'_, Html>, node: NodeRef<'_>) -> Result<(), RenderError> {
    r.ensure_line()?;
    open_tag(r, "li", node)?;
    r.write_children(node)?;
    r.write_line("</li>")
}

/// Handles indented and fenced blocks alike; the first word of the info
/// string becomes the language class.
fn code_block(r: &mut Renderer<'_, Html>, node: NodeRef<'_>) -> Result<(), RenderError> {
    r.ensure_line()?;
    r.write_str("<pre")?;
    r.write_attributes(node)?;
    r.write_str("><code")?;
    if let Some(lang) = node.info().and_then(|info| info.split_whitespace().next()) {
        r.write_str(" class=\"language-")?;
        r.write_escaped_attribute(lang)?;
        r.write_char('"')?;
    }
    r.write_char('>')?;
    r.write_leaf_content(node)?;
    r.write_line("</code></pre>")
}

fn thematic_break(r: &mut Renderer<'_, Html>, node: NodeRef<'_>) -> Result<(), RenderError> {
    r.ensure_line()?;
    r.write_str("<hr")?;
    r.write_attributes(node)?;
    r.write_line(" />")
}

fn raw_block(r: &mut Renderer<'_, Html>, node: NodeRef<'_>) -> Result<(), RenderError> {
    r.ensure_line()?;
    r.write_str(node.content())?;
    r.ensure_line()
}

fn text(r: &mut Renderer<'_, Html>, node: NodeRef<'_>) -> Result<(), RenderError> {
    r.write_leaf_content(node)
}

fn inline(r: &mut Renderer<'_, Html>, node: NodeRef<'_>, tag: &str) -> Result<(), RenderError> {
    open_tag(r, tag, node)?;
    r.write_children(node)?;
    write!(r, "</{tag}>")
}

fn link(r: &mut Renderer<'_, Html>, node: NodeRef<'_>) -> Result<(), RenderError> {
    r.write_str("<a href=\"")?;
    r.write_escaped_url(node.destination().unwrap_or_default())?;
    r.write_char('"')?;
    if let Some(title) = node.title().filter(|title| !title.is_empty()) {
        r.write_str(" title=\"")?;
        r.write_escaped_attribute(title)?;
        r.write_char('"')?;
    }
    r.write_attributes(node)?;
    r.write_char('>')?;
    r.write_children(node)?;
    r.write_str("</a>")
}

fn code_span(r: &mut Renderer<'_, Html>, node: NodeRef<'_>) -> Result<(), RenderError> {
    open_tag(r, "code", node)?;
    r.write_leaf_content(node)?;
    r.write_str("</code>")
}

fn raw_inline(r: &mut Renderer<'_, Html>, node: NodeRef<'_>) -> Result<(), RenderError> {
    r.write_str(node.content())
}

fn line_break(r: &mut Renderer<'_, Html>, _node: NodeRef<'_>) -> Result<(), RenderError> {
    r.write_line("<br />")
}

/// Content is the URL; destination, when set, overrides the target.
fn autolink(r: &mut Renderer<'_, Html>, node: NodeRef<'_>) -> Result<(), RenderError> {
    r.write_str("<a href=\"")?;
    r.write_escaped_url(node.destination().unwrap_or(node.content()))?;
    r.write_str("\">")?;
    r.write_leaf_content(node)?;
    r.write_str("</a>")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_syntax::{Attributes, NodeId, SyntaxTree, TreeBuilder};

    use super::*;

    fn render_html(tree: &SyntaxTree) -> String {
        to_html(tree, &RendererOptions::default()).unwrap()
    }

    fn doc() -> (TreeBuilder, NodeId) {
        let mut builder = TreeBuilder::new();
        let root = builder.add_root(&kinds::DOCUMENT).unwrap();
        (builder, root)
    }

    #[test]
    fn test_paragraph_with_inline_markup() {
        let (mut b, root) = doc();
        let p = b.add_child(root, &kinds::PARAGRAPH).unwrap();
        b.add_text(p, &kinds::TEXT, "Hello ").unwrap();
        let strong = b.add_child(p, &kinds::STRONG).unwrap();
        b.add_text(strong, &kinds::TEXT, "world").unwrap();
        b.add_text(p, &kinds::TEXT, " & ").unwrap();
        let em = b.add_child(p, &kinds::EMPHASIS).unwrap();
        b.add_text(em, &kinds::CODE_SPAN, "a<b").unwrap();

        assert_eq!(
            render_html(&b.build()),
            "<p>Hello <strong>world</strong> &amp; <em><code>a&lt;b</code></em></p>\n"
        );
    }

    #[test]
    fn test_heading_with_id() {
        let (mut b, root) = doc();
        let h = b.add_child(root, &kinds::HEADING).unwrap();
        b.set_level(h, 2).unwrap();
        b.set_attributes(h, Attributes::new().with_id("intro")).unwrap();
        b.add_text(h, &kinds::TEXT, "Intro").unwrap();

        assert_eq!(render_html(&b.build()), "<h2 id=\"intro\">Intro</h2>\n");
    }

    #[test]
    fn test_heading_level_clamped() {
        let (mut b, root) = doc();
        let h = b.add_child(root, &kinds::HEADING).unwrap();
        b.set_level(h, 9).unwrap();

        assert_eq!(render_html(&b.build()), "<h6></h6>\n");
    }

    #[test]
    fn test_code_block_language() {
        let (mut b, root) = doc();
        let code = b
            .add_text(root, &kinds::FENCED_CODE_BLOCK, "fn main() {}\nlet x = a < b;\n")
            .unwrap();
        b.set_info(code, "rust ignore").unwrap();

        assert_eq!(
            render_html(&b.build()),
            "<pre><code class=\"language-rust\">fn main() {}\nlet x = a &lt; b;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_indented_code_block() {
        let (mut b, root) = doc();
        b.add_text(root, &kinds::CODE_BLOCK, "x\n").unwrap();

        assert_eq!(render_html(&b.build()), "<pre><code>x\n</code></pre>\n");
    }

    #[test]
    fn test_lists() {
        let (mut b, root) = doc();
        let ul = b.add_child(root, &kinds::LIST).unwrap();
        let item = b.add_child(ul, &kinds::LIST_ITEM).unwrap();
        b.add_text(item, &kinds::TEXT, "one").unwrap();
        let ol = b.add_child(root, &kinds::LIST).unwrap();
        b.set_list_start(ol, 300).unwrap();
        let item = b.add_child(ol, &kinds::LIST_ITEM).unwrap();
        b.add_text(item, &kinds::TEXT, "three hundred").unwrap();
        let from_one = b.add_child(root, &kinds::LIST).unwrap();
        b.set_list_start(from_one, 1).unwrap();
        let from_zero = b.add_child(root, &kinds::LIST).unwrap();
        b.set_list_start(from_zero, 0).unwrap();

        assert_eq!(
            render_html(&b.build()),
            "<ul>\n<li>one</li>\n</ul>\n\
             <ol start=\"300\">\n<li>three hundred</li>\n</ol>\n\
             <ol>\n</ol>\n\
             <ol start=\"0\">\n</ol>\n"
        );
    }

    #[test]
    fn test_block_quote_and_break() {
        let (mut b, root) = doc();
        let quote = b.add_child(root, &kinds::BLOCK_QUOTE).unwrap();
        let p = b.add_child(quote, &kinds::PARAGRAPH).unwrap();
        b.add_text(p, &kinds::TEXT, "quoted").unwrap();
        b.add_child(root, &kinds::THEMATIC_BREAK).unwrap();

        assert_eq!(
            render_html(&b.build()),
            "<blockquote>\n<p>quoted</p>\n</blockquote>\n<hr />\n"
        );
    }

    #[test]
    fn test_link_escapes_url_and_title() {
        let (mut b, root) = doc();
        let p = b.add_child(root, &kinds::PARAGRAPH).unwrap();
        let a = b.add_child(p, &kinds::LINK).unwrap();
        b.set_destination(a, "/a b?x=1&y=2").unwrap();
        b.set_title(a, "Say \"hi\"").unwrap();
        b.add_text(a, &kinds::TEXT, "link").unwrap();

        assert_eq!(
            render_html(&b.build()),
            "<p><a href=\"/a%20b?x=1&amp;y=2\" title=\"Say &quot;hi&quot;\">link</a></p>\n"
        );
    }

    #[test]
    fn test_soft_escape_keeps_title_and_language_quoted() {
        let (mut b, root) = doc();
        let p = b.add_child(root, &kinds::PARAGRAPH).unwrap();
        let a = b.add_child(p, &kinds::LINK).unwrap();
        b.set_destination(a, "/x").unwrap();
        b.set_title(a, "t\" onmouseover=\"alert(1)").unwrap();
        b.add_text(a, &kinds::TEXT, "\"x\"").unwrap();
        let code = b.add_text(root, &kinds::FENCED_CODE_BLOCK, "c").unwrap();
        b.set_info(code, "rust\"onclick=\"evil()").unwrap();

        let options = RendererOptions::default().with_soft_escape(true);
        assert_eq!(
            to_html(&b.build(), &options).unwrap(),
            "<p><a href=\"/x\" title=\"t&quot; onmouseover=&quot;alert(1)\">\"x\"</a></p>\n\
             <pre><code class=\"language-rust&quot;onclick=&quot;evil()\">c</code></pre>\n"
        );
    }

    #[test]
    fn test_autolink_and_line_break() {
        let (mut b, root) = doc();
        let p = b.add_child(root, &kinds::PARAGRAPH).unwrap();
        b.add_text(p, &kinds::AUTOLINK, "https://example.com").unwrap();
        b.add_child(p, &kinds::LINE_BREAK).unwrap();
        b.add_text(p, &kinds::TEXT, "next").unwrap();

        assert_eq!(
            render_html(&b.build()),
            "<p><a href=\"https://example.com\">https://example.com</a><br />\nnext</p>\n"
        );
    }

    #[test]
    fn test_raw_html_not_escaped() {
        let (mut b, root) = doc();
        b.add_text(root, &kinds::HTML_BLOCK, "<div>raw</div>").unwrap();
        let p = b.add_child(root, &kinds::PARAGRAPH).unwrap();
        b.add_text(p, &kinds::HTML_INLINE, "<span>").unwrap();

        assert_eq!(render_html(&b.build()), "<div>raw</div>\n<p><span></p>\n");
    }

    #[test]
    fn test_soft_escape_option() {
        let (mut b, root) = doc();
        let p = b.add_child(root, &kinds::PARAGRAPH).unwrap();
        b.add_text(p, &kinds::TEXT, "a > \"b\" < c").unwrap();
        let options = RendererOptions::default().with_soft_escape(true);

        assert_eq!(
            to_html(&b.build(), &options).unwrap(),
            "<p>a > \"b\" &lt; c</p>\n"
        );
    }

    #[test]
    fn test_registry_covers_builtin_kinds_except_document() {
        let registry = registry(&RendererOptions::default());
        for kind in kinds::ALL {
            let covered = registry.resolve(kind).is_some();
            assert_eq!(covered, kind.tag() != kinds::DOCUMENT.tag(), "{kind}");
        }
    }
}
