use derive_more::Display;

/// Stable handle to a node owned by the tree.
///
/// Handles are minted from a monotonic counter and never reused, so one that
/// outlives its node fails every lookup instead of aliasing a younger node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u64);

/// Represents the type of a filesystem node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NodeKind {
    #[display("d")]
    Directory,
    #[display("-")]
    File,
}

/// A single entry in the tree.
///
/// Structure is expressed through identifiers rather than references; the
/// tree owns every node and is the only place identifiers resolve.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Content slot for file nodes. Nothing fills it today: files are
    /// created empty and copies never carry it over.
    pub payload: Option<Vec<u8>>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Node {
            name: name.into(),
            kind,
            parent,
            children: Vec::new(),
            payload: None,
        }
    }
}
