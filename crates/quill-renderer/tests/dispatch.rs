//! Dispatch behavior across the registry, cache and renderer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use pretty_assertions::assert_eq;
use quill_config::RendererOptions;
use quill_renderer::{
    DispatchMode, Family, FnWriter, Html, ObjectRendererRegistry, RenderError, Renderer, html,
};
use quill_syntax::{Category, NodeId, NodeKind, Shape, SyntaxTree, TreeBuilder, VariantTag, kinds};

static CALLOUT: NodeKind = NodeKind::new(
    VariantTag::FIRST_CUSTOM,
    "callout",
    Category::Block,
    Shape::Container,
)
.with_base(&kinds::BLOCK_QUOTE);

static MENTION: NodeKind = NodeKind::new(
    VariantTag::FIRST_CUSTOM + 1,
    "mention",
    Category::Inline,
    Shape::Leaf,
);

static SPOILER: NodeKind = NodeKind::new(
    VariantTag::FIRST_CUSTOM + 2,
    "spoiler",
    Category::Inline,
    Shape::Container,
);

fn render(
    registry: &ObjectRendererRegistry<Html>,
    tree: &SyntaxTree,
    mode: DispatchMode,
) -> Result<String, RenderError> {
    let mut out = String::new();
    Renderer::builder(registry)
        .with_dispatch_mode(mode)
        .build(&mut out)?
        .render(tree)?;
    Ok(out)
}

/// A document mixing built-in and custom kinds, `n` paragraphs long.
fn mixed_tree(n: usize) -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let root = b.add_root(&kinds::DOCUMENT).unwrap();
    for i in 0..n {
        let parent: NodeId = if i % 3 == 0 {
            b.add_child(root, &CALLOUT).unwrap()
        } else {
            root
        };
        let p = b.add_child(parent, &kinds::PARAGRAPH).unwrap();
        b.add_text(p, &kinds::TEXT, format!("para {i} ")).unwrap();
        let spoiler = b.add_child(p, &SPOILER).unwrap();
        b.add_text(spoiler, &kinds::TEXT, "hidden").unwrap();
        b.add_text(p, &MENTION, "@someone").unwrap();
        if i % 2 == 0 {
            let em = b.add_child(p, &kinds::EMPHASIS).unwrap();
            b.add_text(em, &kinds::CODE_SPAN, "x<y").unwrap();
        }
    }
    b.build()
}

fn small_interval_registry() -> ObjectRendererRegistry<Html> {
    let options = RendererOptions::default().with_rebuild_interval(7);
    html::registry(&options)
}

#[test]
fn test_cached_and_uncached_output_identical() {
    let registry = small_interval_registry();
    let tree = mixed_tree(25);

    let uncached = render(&registry, &tree, DispatchMode::Uncached).unwrap();
    for _ in 0..5 {
        let cached = render(&registry, &tree, DispatchMode::Cached).unwrap();
        assert_eq!(cached, uncached);
    }
    assert!(registry.dispatch_stats().rebuilds > 0);
}

#[test]
fn test_custom_kind_uses_base_writer() {
    let registry = html::registry(&RendererOptions::default());
    let tree = mixed_tree(1);

    let out = render(&registry, &tree, DispatchMode::Cached).unwrap();
    assert_eq!(
        out,
        "<blockquote>\n<p>para 0 hidden<em><code>x&lt;y</code></em></p>\n</blockquote>\n"
    );
}

#[test]
fn test_extension_writer_overrides_base() {
    let mut registry = html::registry(&RendererOptions::default());
    registry.insert(
        0,
        FnWriter::<Html>::new(Family::of(&CALLOUT), |r, node| {
            r.ensure_line()?;
            r.write_str("<aside>")?;
            r.write_children(node)?;
            r.write_line("</aside>")
        }),
    );
    registry.push(FnWriter::<Html>::new(Family::of(&MENTION), |r, node| {
        r.write_str("<span class=\"mention\">")?;
        r.write_leaf_content(node)?;
        r.write_str("</span>")
    }));

    let out = render(&registry, &mixed_tree(1), DispatchMode::Cached).unwrap();
    assert_eq!(
        out,
        "<aside>\n<p>para 0 hidden<span class=\"mention\">@someone</span><em><code>x&lt;y</code></em></p>\n</aside>\n"
    );
}

#[test]
fn test_try_writer_priority_and_move_to_end() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut registry = html::registry(&RendererOptions::default());
    let writer = registry.find_exact_mut(Family::of(&kinds::TEXT)).unwrap();

    let log = Arc::clone(&calls);
    writer.try_writers_mut().push("a", move |r, _| {
        log.lock().unwrap().push("a");
        r.write_str("A")?;
        Ok(true)
    });
    let log = Arc::clone(&calls);
    writer.try_writers_mut().push("b", move |r, _| {
        log.lock().unwrap().push("b");
        r.write_str("B")?;
        Ok(true)
    });

    let mut b = TreeBuilder::new();
    let root = b.add_root(&kinds::DOCUMENT).unwrap();
    let p = b.add_child(root, &kinds::PARAGRAPH).unwrap();
    b.add_text(p, &kinds::TEXT, "ignored").unwrap();
    let tree = b.build();

    let out = render(&registry, &tree, DispatchMode::Cached).unwrap();
    assert_eq!(out, "<p>A</p>\n");
    assert_eq!(*calls.lock().unwrap(), vec!["a"]);

    calls.lock().unwrap().clear();
    let writer = registry.find_exact_mut(Family::of(&kinds::TEXT)).unwrap();
    assert!(writer.try_writers_mut().move_to_end("a"));

    let out = render(&registry, &tree, DispatchMode::Cached).unwrap();
    assert_eq!(out, "<p>B</p>\n");
    assert_eq!(*calls.lock().unwrap(), vec!["b"]);
}

#[test]
fn test_unknown_kinds_degrade_silently() {
    let registry = html::registry(&RendererOptions::default());
    let mut b = TreeBuilder::new();
    let root = b.add_root(&kinds::DOCUMENT).unwrap();
    let p = b.add_child(root, &kinds::PARAGRAPH).unwrap();
    let spoiler = b.add_child(p, &SPOILER).unwrap();
    b.add_text(spoiler, &kinds::TEXT, "a").unwrap();
    let inner = b.add_child(spoiler, &SPOILER).unwrap();
    b.add_text(inner, &kinds::TEXT, "b").unwrap();
    b.add_text(p, &MENTION, "gone").unwrap();

    let out = render(&registry, &b.build(), DispatchMode::Cached).unwrap();
    assert_eq!(out, "<p>ab</p>\n");
}

#[test]
fn test_shared_registry_across_threads() {
    let registry = Arc::new(small_interval_registry());
    let trees: Vec<SyntaxTree> = (1..=8).map(mixed_tree).collect();
    let expected: Vec<String> = trees
        .iter()
        .map(|tree| render(&registry, tree, DispatchMode::Uncached).unwrap())
        .collect();

    let mismatches = AtomicUsize::new(0);
    thread::scope(|scope| {
        for worker in 0..8 {
            let registry = Arc::clone(&registry);
            let trees = &trees;
            let expected = &expected;
            let mismatches = &mismatches;
            scope.spawn(move || {
                for round in 0..20 {
                    let index = (worker + round) % trees.len();
                    let out = render(&registry, &trees[index], DispatchMode::Cached).unwrap();
                    if out != expected[index] {
                        mismatches.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    assert_eq!(mismatches.load(Ordering::Relaxed), 0);
    let stats = registry.dispatch_stats();
    assert!(stats.rebuilds > 0);
    assert!(stats.hot_entries > 0);
}

#[test]
fn test_registry_mutation_after_render_takes_effect() {
    let mut registry = html::registry(&RendererOptions::default());
    let tree = mixed_tree(1);
    let before = render(&registry, &tree, DispatchMode::Cached).unwrap();
    assert!(before.contains("<em>"));

    registry.remove(Family::of(&kinds::EMPHASIS)).unwrap();
    let after = render(&registry, &tree, DispatchMode::Cached).unwrap();
    assert!(!after.contains("<em>"));
    assert!(after.contains("<code>x&lt;y</code>"));
}
