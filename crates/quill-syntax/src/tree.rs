//! Arena-backed syntax tree and borrowed node views.
//!
//! Nodes are stored in a flat `Vec` and linked by [`NodeId`]:
//! - every node records its parent
//! - block containers keep an indexable child list
//! - inline containers keep `first`/`last` links, and their children keep
//!   `prev`/`next` sibling links

use std::fmt;

use crate::attributes::Attributes;
use crate::kind::{Category, NodeKind, VariantTag};

/// Index of a node within its [`SyntaxTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}

/// Child storage, chosen by the node's kind.
#[derive(Debug)]
pub(crate) enum ChildList {
    /// Leaf nodes own no children.
    None,
    /// Block containers: random access for first/last checks.
    Block(Vec<NodeId>),
    /// Inline containers: ends of the sibling chain.
    Inline {
        first: Option<NodeId>,
        last: Option<NodeId>,
        len: usize,
    },
}

#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: &'static NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) children: ChildList,
    pub(crate) attributes: Option<Box<Attributes>>,
    pub(crate) content: String,
    pub(crate) info: Option<String>,
    pub(crate) destination: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) level: u8,
    pub(crate) list_start: Option<u32>,
}

impl NodeData {
    pub(crate) fn new(kind: &'static NodeKind, parent: Option<NodeId>) -> Self {
        let children = match (kind.is_container(), kind.category()) {
            (false, _) => ChildList::None,
            (true, Category::Block) => ChildList::Block(Vec::new()),
            (true, Category::Inline) => ChildList::Inline {
                first: None,
                last: None,
                len: 0,
            },
        };
        Self {
            kind,
            parent,
            prev: None,
            next: None,
            children,
            attributes: None,
            content: String::new(),
            info: None,
            destination: None,
            title: None,
            level: 0,
            list_start: None,
        }
    }
}

/// An immutable document tree.
///
/// Built with [`TreeBuilder`](crate::TreeBuilder). Holds no interior
/// mutability, so it is `Send + Sync` and may be rendered concurrently.
#[derive(Debug)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl SyntaxTree {
    pub(crate) fn new(nodes: Vec<NodeData>, root: Option<NodeId>) -> Self {
        Self { nodes, root }
    }

    /// Root node, or `None` for an empty tree.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.root.map(|id| NodeRef { tree: self, id })
    }

    /// Node by id, or `None` if the id is out of range.
    ///
    /// Ids are plain indices; an in-range id from another tree yields
    /// whichever node of this tree sits at that index.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.index() < self.nodes.len()).then_some(NodeRef { tree: self, id })
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

/// Borrowed view of one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    fn data(&self) -> &'t NodeData {
        self.tree.data(self.id)
    }

    fn at(&self, id: NodeId) -> NodeRef<'t> {
        NodeRef {
            tree: self.tree,
            id,
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tree this node belongs to.
    #[must_use]
    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    #[must_use]
    pub fn kind(&self) -> &'static NodeKind {
        self.data().kind
    }

    /// Dispatch key of the node's kind.
    #[must_use]
    pub fn tag(&self) -> VariantTag {
        self.data().kind.tag()
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        self.data().kind.is_container()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        !self.is_container()
    }

    #[must_use]
    pub fn is_block(&self) -> bool {
        self.data().kind.is_block()
    }

    #[must_use]
    pub fn is_inline(&self) -> bool {
        !self.is_block()
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.data().parent.map(|id| self.at(id))
    }

    /// Attribute bag, if one was attached.
    #[must_use]
    pub fn attributes(&self) -> Option<&'t Attributes> {
        self.data().attributes.as_deref()
    }

    /// Raw content of a leaf (empty for containers).
    #[must_use]
    pub fn content(&self) -> &'t str {
        &self.data().content
    }

    /// Code block info string.
    #[must_use]
    pub fn info(&self) -> Option<&'t str> {
        self.data().info.as_deref()
    }

    /// Link destination.
    #[must_use]
    pub fn destination(&self) -> Option<&'t str> {
        self.data().destination.as_deref()
    }

    /// Link title.
    #[must_use]
    pub fn title(&self) -> Option<&'t str> {
        self.data().title.as_deref()
    }

    /// Heading level (0 if unset).
    #[must_use]
    pub fn level(&self) -> u8 {
        self.data().level
    }

    /// Start number of an ordered list; `None` for a bullet list.
    #[must_use]
    pub fn list_start(&self) -> Option<u32> {
        self.data().list_start
    }

    /// Children in document order.
    #[must_use]
    pub fn children(&self) -> Children<'t> {
        let state = match &self.data().children {
            ChildList::None => ChildState::Empty,
            ChildList::Block(ids) => ChildState::Block(ids.iter()),
            ChildList::Inline { first, len, .. } => ChildState::Inline {
                next: *first,
                remaining: *len,
            },
        };
        Children {
            tree: self.tree,
            state,
        }
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        match &self.data().children {
            ChildList::None => 0,
            ChildList::Block(ids) => ids.len(),
            ChildList::Inline { len, .. } => *len,
        }
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        self.child_count() > 0
    }

    /// Child at `index`.
    ///
    /// Constant time for block containers, linear for inline containers.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<NodeRef<'t>> {
        match &self.data().children {
            ChildList::Block(ids) => ids.get(index).map(|&id| self.at(id)),
            _ => self.children().nth(index),
        }
    }

    #[must_use]
    pub fn first_child(&self) -> Option<NodeRef<'t>> {
        match &self.data().children {
            ChildList::None => None,
            ChildList::Block(ids) => ids.first().map(|&id| self.at(id)),
            ChildList::Inline { first, .. } => first.map(|id| self.at(id)),
        }
    }

    #[must_use]
    pub fn last_child(&self) -> Option<NodeRef<'t>> {
        match &self.data().children {
            ChildList::None => None,
            ChildList::Block(ids) => ids.last().map(|&id| self.at(id)),
            ChildList::Inline { last, .. } => last.map(|id| self.at(id)),
        }
    }

    #[must_use]
    pub fn next_sibling(&self) -> Option<NodeRef<'t>> {
        let data = self.data();
        if data.next.is_some() {
            return data.next.map(|id| self.at(id));
        }
        let parent = self.parent()?;
        match &parent.data().children {
            ChildList::Block(ids) => {
                let pos = ids.iter().position(|&id| id == self.id)?;
                ids.get(pos + 1).map(|&id| self.at(id))
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn prev_sibling(&self) -> Option<NodeRef<'t>> {
        let data = self.data();
        if data.prev.is_some() {
            return data.prev.map(|id| self.at(id));
        }
        let parent = self.parent()?;
        match &parent.data().children {
            ChildList::Block(ids) => {
                let pos = ids.iter().position(|&id| id == self.id)?;
                pos.checked_sub(1).map(|p| self.at(ids[p]))
            }
            _ => None,
        }
    }

    /// Number of ancestors between this node and the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        std::iter::successors(self.parent(), NodeRef::parent).count()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", &self.kind().name())
            .finish()
    }
}

enum ChildState<'t> {
    Empty,
    Block(std::slice::Iter<'t, NodeId>),
    Inline {
        next: Option<NodeId>,
        remaining: usize,
    },
}

/// Iterator over a node's children in document order.
pub struct Children<'t> {
    tree: &'t SyntaxTree,
    state: ChildState<'t>,
}

impl<'t> Iterator for Children<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = match &mut self.state {
            ChildState::Empty => None,
            ChildState::Block(ids) => ids.next().copied(),
            ChildState::Inline { next, remaining } => {
                let id = (*next)?;
                *next = self.tree.data(id).next;
                *remaining -= 1;
                Some(id)
            }
        }?;
        Some(NodeRef {
            tree: self.tree,
            id,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = match &self.state {
            ChildState::Empty => 0,
            ChildState::Block(ids) => ids.len(),
            ChildState::Inline { remaining, .. } => *remaining,
        };
        (len, Some(len))
    }
}

impl ExactSizeIterator for Children<'_> {}
