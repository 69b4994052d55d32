//! Rendering service interface.

use smithay::utils::{Logical, Point};

use crate::output::OutputId;
use crate::protocol::SurfaceId;
use crate::windows::ViewId;

/// Opaque scene node handle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub u64);

/// Kind of a scene node.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum NodeKind {
    /// Node grouping other nodes.
    Tree,
    /// Drawable buffer of a client surface.
    Surface(SurfaceId),
    /// Drawable buffer without a client surface.
    Buffer,
}

/// Scene graph owning every drawable on screen.
///
/// Node positions are relative to their parent node. Later siblings are
/// stacked above earlier ones.
pub trait SceneGraph {
    /// Create the node subtree for a client surface.
    ///
    /// Without a parent, the subtree is attached to the scene's root.
    fn create_node(&mut self, parent: Option<NodeId>, surface: SurfaceId) -> NodeId;

    /// Remove a node and all its children.
    fn destroy_node(&mut self, node: NodeId);

    /// Move a node relative to its parent.
    fn set_position(&mut self, node: NodeId, position: Point<i32, Logical>);

    /// Stack a node above all its siblings.
    fn raise_to_top(&mut self, node: NodeId);

    /// Stack a node below all its siblings.
    fn lower_to_bottom(&mut self, node: NodeId);

    /// Show or hide a node and its children.
    fn set_enabled(&mut self, node: NodeId, enabled: bool);

    /// Topmost drawable node at a point, with the node-local coordinates.
    fn node_at(&self, point: Point<f64, Logical>) -> Option<(NodeId, Point<f64, Logical>)>;

    /// Kind of a node, `None` if the node does not exist.
    fn node_kind(&self, node: NodeId) -> Option<NodeKind>;

    /// Parent of a node.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Associate a node with the view it represents.
    fn tag(&mut self, node: NodeId, view: ViewId);

    /// View associated with a node.
    fn tag_of(&self, node: NodeId) -> Option<ViewId>;

    /// Load the cursor theme used for named cursor images.
    fn load_cursor_theme(&mut self, theme: &str, size: u32);

    /// Show a named image from the cursor theme.
    fn set_cursor_image(&mut self, name: &str);

    /// Show a client surface as cursor, hiding the cursor without a surface.
    fn set_cursor_surface(&mut self, surface: Option<SurfaceId>, hotspot: Point<i32, Logical>);

    /// Render the scene to an output.
    fn commit_frame(&mut self, output: OutputId);

    /// Notify surfaces on an output that their frame was presented.
    fn frame_done(&mut self, output: OutputId, time: u32);
}
