//! Node families a writer can declare.

use std::fmt;

use quill_syntax::{Category, NodeKind, Shape};

/// The set of node kinds a writer accepts.
///
/// Matching is by kind identity, never by structural coincidence: a
/// [`Family::Kind`] accepts its kind and every kind whose base chain
/// contains it. The broader families let one writer act as a catch-all
/// for a whole category.
#[derive(Clone, Copy)]
pub enum Family {
    /// One kind and its specializations.
    Kind(&'static NodeKind),
    /// Every kind with the given category and shape.
    Shape(Category, Shape),
    /// Every kind in the category.
    Category(Category),
    /// Every kind.
    Any,
}

impl Family {
    /// Family of a single kind.
    pub fn of(kind: &'static NodeKind) -> Self {
        Self::Kind(kind)
    }

    /// Whether `kind` belongs to this family.
    pub fn accepts(&self, kind: &NodeKind) -> bool {
        match *self {
            Self::Kind(family) => kind.is_a(family),
            Self::Shape(category, shape) => kind.category() == category && kind.shape() == shape,
            Self::Category(category) => kind.category() == category,
            Self::Any => true,
        }
    }
}

impl PartialEq for Family {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Self::Kind(a), Self::Kind(b)) => a.tag() == b.tag(),
            (Self::Shape(c1, s1), Self::Shape(c2, s2)) => c1 == c2 && s1 == s2,
            (Self::Category(a), Self::Category(b)) => a == b,
            (Self::Any, Self::Any) => true,
            _ => false,
        }
    }
}

impl Eq for Family {}

impl fmt::Debug for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => write!(f, "Kind({})", kind.name()),
            Self::Shape(category, shape) => write!(f, "Shape({category:?}, {shape:?})"),
            Self::Category(category) => write!(f, "Category({category:?})"),
            Self::Any => f.write_str("Any"),
        }
    }
}

#[cfg(test)]
mod tests {
    use quill_syntax::kinds;

    use super::*;

    static ADMONITION: NodeKind = NodeKind::new(
        quill_syntax::VariantTag::FIRST_CUSTOM,
        "admonition",
        Category::Block,
        Shape::Container,
    )
    .with_base(&kinds::BLOCK_QUOTE);

    #[test]
    fn test_kind_family_accepts_specializations() {
        let family = Family::of(&kinds::CODE_BLOCK);
        assert!(family.accepts(&kinds::CODE_BLOCK));
        assert!(family.accepts(&kinds::FENCED_CODE_BLOCK));
        assert!(!family.accepts(&kinds::HTML_BLOCK));
    }

    #[test]
    fn test_specialized_family_rejects_base() {
        let family = Family::of(&kinds::FENCED_CODE_BLOCK);
        assert!(!family.accepts(&kinds::CODE_BLOCK));
    }

    #[test]
    fn test_custom_kind_matches_base_family() {
        assert!(Family::of(&kinds::BLOCK_QUOTE).accepts(&ADMONITION));
        assert!(!Family::of(&kinds::PARAGRAPH).accepts(&ADMONITION));
    }

    #[test]
    fn test_broad_families() {
        let inline_leaves = Family::Shape(Category::Inline, Shape::Leaf);
        assert!(inline_leaves.accepts(&kinds::TEXT));
        assert!(!inline_leaves.accepts(&kinds::EMPHASIS));
        assert!(Family::Category(Category::Block).accepts(&kinds::LIST));
        assert!(!Family::Category(Category::Block).accepts(&kinds::LINK));
        assert!(Family::Any.accepts(&ADMONITION));
    }

    #[test]
    fn test_equality_is_by_identity() {
        assert_eq!(Family::of(&kinds::TEXT), Family::of(&kinds::TEXT));
        assert_ne!(Family::of(&kinds::TEXT), Family::of(&kinds::CODE_SPAN));
        assert_ne!(Family::Any, Family::Category(Category::Inline));
    }
}
