use crate::scene::NodeHandle;
use crate::scene::channel::TransformChannels;
use crate::scene::props::UserProps;
use crate::scene::transform::Transform;

/// A host scene node.
///
/// # Hierarchy
///
/// Nodes form a tree through parent-child handles stored in the scene arena:
/// - `parent`: handle of the parent node (`None` only for the scene root)
/// - `children`: ordered child handles
///
/// # Transform
///
/// `transform` is the static TRS value; `channels` hold animated keys. A
/// channel with keys overrides the matching static component when the node
/// is evaluated at a time.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    // === Core Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Spatial Data ===
    pub transform: Transform,
    pub channels: TransformChannels,

    // === Annotations ===
    pub props: UserProps,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            channels: TransformChannels::default(),
            props: UserProps::new(),
        }
    }

    /// Returns the parent node handle, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Returns a read-only slice of child node handles.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("")
    }
}
