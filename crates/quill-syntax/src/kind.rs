//! Node kind descriptors and variant tags.

use std::fmt;

/// Stable identifier of a concrete node kind.
///
/// Assigned once, when the kind is defined. Built-in kinds use tags below
/// [`VariantTag::FIRST_CUSTOM`]; extensions pick tags at or above it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantTag(u32);

impl VariantTag {
    /// First tag available to extension kinds.
    pub const FIRST_CUSTOM: u32 = 1024;

    /// Create a tag from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw tag value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Whether this tag is in the extension range.
    #[must_use]
    pub const fn is_custom(self) -> bool {
        self.0 >= Self::FIRST_CUSTOM
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural category of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Block-level node (paragraph, list, code block).
    Block,
    /// Inline node (text run, emphasis, link).
    Inline,
}

/// Whether a node owns children or raw content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Owns an ordered collection of child nodes.
    Container,
    /// Owns raw content, no children.
    Leaf,
}

/// Definition of a concrete node kind.
///
/// Kinds are declared as `static` items so that every node of the kind
/// shares one descriptor:
///
/// ```
/// use quill_syntax::{Category, NodeKind, Shape, VariantTag};
///
/// static ADMONITION: NodeKind = NodeKind::new(
///     VariantTag::FIRST_CUSTOM,
///     "admonition",
///     Category::Block,
///     Shape::Container,
/// );
///
/// assert!(ADMONITION.tag().is_custom());
/// ```
///
/// A kind may name a `base` kind it specializes. Family matching in the
/// renderer treats a kind as belonging to every kind on its base chain.
#[derive(Debug)]
pub struct NodeKind {
    tag: VariantTag,
    name: &'static str,
    category: Category,
    shape: Shape,
    base: Option<&'static NodeKind>,
}

impl NodeKind {
    /// Define a kind with no base.
    #[must_use]
    pub const fn new(tag: u32, name: &'static str, category: Category, shape: Shape) -> Self {
        Self {
            tag: VariantTag::new(tag),
            name,
            category,
            shape,
            base: None,
        }
    }

    /// Declare the kind this one specializes.
    ///
    /// The base must have the same category and shape.
    #[must_use]
    pub const fn with_base(mut self, base: &'static NodeKind) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub const fn tag(&self) -> VariantTag {
        self.tag
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    #[must_use]
    pub const fn base(&self) -> Option<&'static NodeKind> {
        self.base
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        self.shape == Shape::Container
    }

    #[must_use]
    pub fn is_block(&self) -> bool {
        self.category == Category::Block
    }

    /// Whether this kind is `other` or specializes it (directly or not).
    #[must_use]
    pub fn is_a(&self, other: &NodeKind) -> bool {
        if self.tag == other.tag {
            return true;
        }
        let mut current = self.base;
        while let Some(kind) = current {
            if kind.tag == other.tag {
                return true;
            }
            current = kind.base;
        }
        false
    }
}

impl PartialEq for NodeKind {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl Eq for NodeKind {}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds;

    static CALLOUT: NodeKind = NodeKind::new(
        VariantTag::FIRST_CUSTOM + 1,
        "callout",
        Category::Block,
        Shape::Container,
    )
    .with_base(&kinds::BLOCK_QUOTE);

    #[test]
    fn test_is_a_same_kind() {
        assert!(kinds::PARAGRAPH.is_a(&kinds::PARAGRAPH));
    }

    #[test]
    fn test_is_a_follows_base_chain() {
        assert!(kinds::FENCED_CODE_BLOCK.is_a(&kinds::CODE_BLOCK));
        assert!(!kinds::CODE_BLOCK.is_a(&kinds::FENCED_CODE_BLOCK));
    }

    #[test]
    fn test_custom_kind_with_builtin_base() {
        assert!(CALLOUT.tag().is_custom());
        assert!(CALLOUT.is_a(&kinds::BLOCK_QUOTE));
        assert!(!CALLOUT.is_a(&kinds::LIST));
    }

    #[test]
    fn test_equality_is_by_tag() {
        assert_eq!(kinds::TEXT, kinds::TEXT);
        assert_ne!(kinds::TEXT, kinds::CODE_SPAN);
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(VariantTag::new(7).to_string(), "#7");
    }
}
