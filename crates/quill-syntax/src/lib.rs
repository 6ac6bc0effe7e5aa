//! Syntax tree data model for the Quill renderer.
//!
//! A document is a tree of nodes. Each node has a [`NodeKind`] defined once,
//! at compile time, carrying a stable integer [`VariantTag`] that renderers
//! use as their dispatch key.
//!
//! # Architecture
//!
//! Nodes live in a flat arena ([`SyntaxTree`]) and refer to each other by
//! [`NodeId`]. This gives:
//! - Non-owning parent back-references that can never dangle
//! - Block containers with indexable child lists
//! - Inline containers with doubly-linked sibling chains
//!
//! Trees are assembled with [`TreeBuilder`] and are immutable afterwards,
//! so a single tree can be rendered by any number of renderers at once.
//!
//! # Example
//!
//! ```
//! use quill_syntax::{TreeBuilder, kinds};
//!
//! let mut builder = TreeBuilder::new();
//! let doc = builder.add_root(&kinds::DOCUMENT).unwrap();
//! let para = builder.add_child(doc, &kinds::PARAGRAPH).unwrap();
//! builder.add_text(para, &kinds::TEXT, "Hello").unwrap();
//! let tree = builder.build();
//!
//! let root = tree.root().unwrap();
//! assert_eq!(root.child_count(), 1);
//! ```

mod attributes;
mod builder;
mod kind;
pub mod kinds;
mod tree;

pub use attributes::Attributes;
pub use builder::{TreeBuilder, TreeError};
pub use kind::{Category, NodeKind, Shape, VariantTag};
pub use tree::{Children, NodeId, NodeRef, SyntaxTree};
