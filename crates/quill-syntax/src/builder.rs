//! Builder for constructing [`SyntaxTree`] instances.
//!
//! Children can only be attached to nodes that already exist, so a built
//! tree is acyclic and every parent reference points at the owning container.

use crate::attributes::Attributes;
use crate::kind::{Category, NodeKind};
use crate::tree::{ChildList, NodeData, NodeId, SyntaxTree};

/// Error returned when a tree operation would break a structural invariant.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    /// A root was already added.
    #[error("Tree already has a root")]
    RootExists,
    /// The id does not belong to this builder.
    #[error("Unknown {0}")]
    UnknownNode(NodeId),
    /// Children can only be attached to containers.
    #[error("Cannot attach children to leaf node `{kind}`")]
    NotAContainer {
        /// Name of the leaf kind.
        kind: &'static str,
    },
    /// Inline containers only accept inline children.
    #[error("Inline container `{parent}` cannot hold block node `{child}`")]
    CategoryMismatch {
        /// Name of the parent kind.
        parent: &'static str,
        /// Name of the rejected child kind.
        child: &'static str,
    },
    /// Raw content can only be set on leaves.
    #[error("Cannot set content on container node `{kind}`")]
    NotALeaf {
        /// Name of the container kind.
        kind: &'static str,
    },
    /// The arena is full.
    #[error("Tree exceeds the maximum node count")]
    TooManyNodes,
}

/// Builder for a [`SyntaxTree`].
///
/// # Example
///
/// ```
/// use quill_syntax::{Attributes, TreeBuilder, kinds};
///
/// let mut builder = TreeBuilder::new();
/// let doc = builder.add_root(&kinds::DOCUMENT)?;
/// let heading = builder.add_child(doc, &kinds::HEADING)?;
/// builder.set_level(heading, 2)?;
/// builder.set_attributes(heading, Attributes::new().with_id("intro"))?;
/// builder.add_text(heading, &kinds::TEXT, "Intro")?;
///
/// let tree = builder.build();
/// assert_eq!(tree.len(), 3);
/// # Ok::<(), quill_syntax::TreeError>(())
/// ```
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl TreeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the root node.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::RootExists`] if called twice.
    pub fn add_root(&mut self, kind: &'static NodeKind) -> Result<NodeId, TreeError> {
        if self.root.is_some() {
            return Err(TreeError::RootExists);
        }
        let id = self.push(NodeData::new(kind, None))?;
        self.root = Some(id);
        Ok(id)
    }

    /// Append a new node as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails if `parent` is unknown, is a leaf, or is an inline container
    /// and `kind` is a block kind.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        kind: &'static NodeKind,
    ) -> Result<NodeId, TreeError> {
        let parent_data = self.data(parent)?;
        let parent_kind = parent_data.kind;
        match parent_data.children {
            ChildList::None => {
                return Err(TreeError::NotAContainer {
                    kind: parent_kind.name(),
                });
            }
            ChildList::Inline { .. } if kind.category() == Category::Block => {
                return Err(TreeError::CategoryMismatch {
                    parent: parent_kind.name(),
                    child: kind.name(),
                });
            }
            _ => {}
        }

        let id = self.push(NodeData::new(kind, Some(parent)))?;

        // Link the child into the parent's storage.
        let mut prev_last = None;
        match &mut self.nodes[parent.index()].children {
            ChildList::Block(ids) => ids.push(id),
            ChildList::Inline { first, last, len } => {
                prev_last = last.replace(id);
                if first.is_none() {
                    *first = Some(id);
                }
                *len += 1;
            }
            ChildList::None => unreachable!("checked above"),
        }
        if let Some(prev) = prev_last {
            self.nodes[prev.index()].next = Some(id);
            self.nodes[id.index()].prev = Some(prev);
        }

        Ok(id)
    }

    /// Append a leaf with raw content.
    ///
    /// # Errors
    ///
    /// Same as [`add_child`](Self::add_child), plus [`TreeError::NotALeaf`]
    /// if `kind` is a container kind.
    pub fn add_text(
        &mut self,
        parent: NodeId,
        kind: &'static NodeKind,
        content: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        if kind.is_container() {
            return Err(TreeError::NotALeaf { kind: kind.name() });
        }
        let id = self.add_child(parent, kind)?;
        self.nodes[id.index()].content = content.into();
        Ok(id)
    }

    /// Set the raw content of a leaf.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotALeaf`] for containers.
    pub fn set_content(&mut self, id: NodeId, content: impl Into<String>) -> Result<(), TreeError> {
        let data = self.data_mut(id)?;
        if data.kind.is_container() {
            return Err(TreeError::NotALeaf {
                kind: data.kind.name(),
            });
        }
        data.content = content.into();
        Ok(())
    }

    /// Attach an attribute bag, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for foreign ids.
    pub fn set_attributes(&mut self, id: NodeId, attributes: Attributes) -> Result<(), TreeError> {
        self.data_mut(id)?.attributes = Some(Box::new(attributes));
        Ok(())
    }

    /// Mutable attribute bag, created on first access.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for foreign ids.
    pub fn attributes_mut(&mut self, id: NodeId) -> Result<&mut Attributes, TreeError> {
        Ok(self.data_mut(id)?.attributes.get_or_insert_with(Box::default))
    }

    /// Set the code block info string.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for foreign ids.
    pub fn set_info(&mut self, id: NodeId, info: impl Into<String>) -> Result<(), TreeError> {
        self.data_mut(id)?.info = Some(info.into());
        Ok(())
    }

    /// Set the link destination.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for foreign ids.
    pub fn set_destination(
        &mut self,
        id: NodeId,
        destination: impl Into<String>,
    ) -> Result<(), TreeError> {
        self.data_mut(id)?.destination = Some(destination.into());
        Ok(())
    }

    /// Set the link title.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for foreign ids.
    pub fn set_title(&mut self, id: NodeId, title: impl Into<String>) -> Result<(), TreeError> {
        self.data_mut(id)?.title = Some(title.into());
        Ok(())
    }

    /// Set the heading level.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for foreign ids.
    pub fn set_level(&mut self, id: NodeId, level: u8) -> Result<(), TreeError> {
        self.data_mut(id)?.level = level;
        Ok(())
    }

    /// Mark a list as ordered, numbered from `start`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for foreign ids.
    pub fn set_list_start(&mut self, id: NodeId, start: u32) -> Result<(), TreeError> {
        self.data_mut(id)?.list_start = Some(start);
        Ok(())
    }

    /// Number of nodes added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build the [`SyntaxTree`].
    #[must_use]
    pub fn build(self) -> SyntaxTree {
        SyntaxTree::new(self.nodes, self.root)
    }

    fn push(&mut self, data: NodeData) -> Result<NodeId, TreeError> {
        let raw = u32::try_from(self.nodes.len()).map_err(|_| TreeError::TooManyNodes)?;
        self.nodes.push(data);
        Ok(NodeId(raw))
    }

    fn data(&self, id: NodeId) -> Result<&NodeData, TreeError> {
        self.nodes.get(id.index()).ok_or(TreeError::UnknownNode(id))
    }

    fn data_mut(&mut self, id: NodeId) -> Result<&mut NodeData, TreeError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(TreeError::UnknownNode(id))
    }
}
