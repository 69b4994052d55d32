//! In-memory scene graph.

use std::collections::HashMap;

use smithay::utils::{Logical, Point, Rectangle, Size};
use tracing::trace;

use crate::output::OutputId;
use crate::protocol::SurfaceId;
use crate::scene::{NodeId, NodeKind, SceneGraph};
use crate::windows::ViewId;

/// Image currently used for the cursor.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CursorImage {
    /// Image from the cursor theme.
    Named(String),
    /// Client-provided cursor surface.
    Surface { surface: SurfaceId, hotspot: Point<i32, Logical> },
    Hidden,
}

/// Frame statistics of an output.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct FrameStats {
    pub commits: u64,
    /// Time of the last frame-done notification.
    pub last_done: Option<u32>,
}

#[derive(Debug)]
struct SceneNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    /// Child nodes, bottom to top.
    children: Vec<NodeId>,
    position: Point<i32, Logical>,
    enabled: bool,
    view: Option<ViewId>,
}

impl SceneNode {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            parent,
            kind,
            children: Default::default(),
            position: Default::default(),
            enabled: true,
            view: Default::default(),
        }
    }
}

/// Scene graph without any rendering.
///
/// Surface nodes only accept input once their size is known through
/// [`HeadlessScene::set_surface_size`].
#[derive(Debug)]
pub struct HeadlessScene {
    nodes: HashMap<NodeId, SceneNode>,

    /// Nodes attached to the scene root, bottom to top.
    root: Vec<NodeId>,

    surface_sizes: HashMap<SurfaceId, Size<i32, Logical>>,
    frames: HashMap<OutputId, FrameStats>,
    cursor_theme: Option<(String, u32)>,
    cursor: CursorImage,
    next_id: u64,
}

impl Default for HeadlessScene {
    fn default() -> Self {
        Self {
            cursor: CursorImage::Hidden,
            surface_sizes: Default::default(),
            cursor_theme: Default::default(),
            next_id: Default::default(),
            frames: Default::default(),
            nodes: Default::default(),
            root: Default::default(),
        }
    }
}

impl HeadlessScene {
    /// Update the buffer size of a surface.
    pub fn set_surface_size(&mut self, surface: SurfaceId, size: Size<i32, Logical>) {
        self.surface_sizes.insert(surface, size);
    }

    /// Position of a node relative to its parent.
    pub fn position(&self, node: NodeId) -> Option<Point<i32, Logical>> {
        self.nodes.get(&node).map(|node| node.position)
    }

    pub fn is_enabled(&self, node: NodeId) -> Option<bool> {
        self.nodes.get(&node).map(|node| node.enabled)
    }

    /// Topmost node attached to the scene root.
    pub fn top_node(&self) -> Option<NodeId> {
        self.root.last().copied()
    }

    /// Nodes attached to the scene root, bottom to top.
    pub fn root_nodes(&self) -> Vec<NodeId> {
        self.root.clone()
    }

    pub fn cursor_image(&self) -> &CursorImage {
        &self.cursor
    }

    pub fn cursor_theme(&self) -> Option<(&str, u32)> {
        self.cursor_theme.as_ref().map(|(theme, size)| (theme.as_str(), *size))
    }

    pub fn frame_stats(&self, output: OutputId) -> Option<FrameStats> {
        self.frames.get(&output).copied()
    }

    /// Allocate a node and stack it above its siblings.
    fn insert_node(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        self.nodes.insert(id, SceneNode::new(kind, parent));
        if let Some(siblings) = self.siblings_mut(id) {
            siblings.push(id);
        }

        id
    }

    /// Stacking list containing a node.
    fn siblings_mut(&mut self, node: NodeId) -> Option<&mut Vec<NodeId>> {
        let parent = self.nodes.get(&node)?.parent;
        match parent {
            Some(parent) => self.nodes.get_mut(&parent).map(|parent| &mut parent.children),
            None => Some(&mut self.root),
        }
    }

    /// Topmost surface node in a subtree, with its surface-local point.
    fn node_at_in(
        &self,
        node: NodeId,
        offset: Point<i32, Logical>,
        point: Point<f64, Logical>,
    ) -> Option<(NodeId, Point<f64, Logical>)> {
        let scene_node = self.nodes.get(&node).filter(|node| node.enabled)?;
        let location = offset + scene_node.position;

        let child_hit = scene_node
            .children
            .iter()
            .rev()
            .find_map(|child| self.node_at_in(*child, location, point));
        if child_hit.is_some() {
            return child_hit;
        }

        let surface = match scene_node.kind {
            NodeKind::Surface(surface) => surface,
            _ => return None,
        };

        let size = self.surface_sizes.get(&surface).copied().unwrap_or_default();
        let bounds = Rectangle { loc: location, size }.to_f64();
        bounds.contains(point).then(|| (node, point - location.to_f64()))
    }
}

impl SceneGraph for HeadlessScene {
    fn create_node(&mut self, parent: Option<NodeId>, surface: SurfaceId) -> NodeId {
        let parent = parent.filter(|parent| self.nodes.contains_key(parent));
        let tree = self.insert_node(NodeKind::Tree, parent);
        self.insert_node(NodeKind::Surface(surface), Some(tree));
        tree
    }

    fn destroy_node(&mut self, node: NodeId) {
        if let Some(siblings) = self.siblings_mut(node) {
            siblings.retain(|sibling| *sibling != node);
        }

        let mut pending = vec![node];
        while let Some(node) = pending.pop() {
            if let Some(removed) = self.nodes.remove(&node) {
                pending.extend(removed.children);
            }
        }
    }

    fn set_position(&mut self, node: NodeId, position: Point<i32, Logical>) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.position = position;
        }
    }

    fn raise_to_top(&mut self, node: NodeId) {
        if let Some(siblings) = self.siblings_mut(node) {
            siblings.retain(|sibling| *sibling != node);
            siblings.push(node);
        }
    }

    fn lower_to_bottom(&mut self, node: NodeId) {
        if let Some(siblings) = self.siblings_mut(node) {
            siblings.retain(|sibling| *sibling != node);
            siblings.insert(0, node);
        }
    }

    fn set_enabled(&mut self, node: NodeId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.enabled = enabled;
        }
    }

    fn node_at(&self, point: Point<f64, Logical>) -> Option<(NodeId, Point<f64, Logical>)> {
        self.root.iter().rev().find_map(|node| self.node_at_in(*node, Point::default(), point))
    }

    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(&node).map(|node| node.kind)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node)?.parent
    }

    fn tag(&mut self, node: NodeId, view: ViewId) {
        if let Some(node) = self.nodes.get_mut(&node) {
            node.view = Some(view);
        }
    }

    fn tag_of(&self, node: NodeId) -> Option<ViewId> {
        self.nodes.get(&node)?.view
    }

    fn load_cursor_theme(&mut self, theme: &str, size: u32) {
        self.cursor_theme = Some((theme.into(), size));
    }

    fn set_cursor_image(&mut self, name: &str) {
        if !matches!(&self.cursor, CursorImage::Named(current) if current == name) {
            self.cursor = CursorImage::Named(name.into());
        }
    }

    fn set_cursor_surface(&mut self, surface: Option<SurfaceId>, hotspot: Point<i32, Logical>) {
        self.cursor = match surface {
            Some(surface) => CursorImage::Surface { surface, hotspot },
            None => CursorImage::Hidden,
        };
    }

    fn commit_frame(&mut self, output: OutputId) {
        self.frames.entry(output).or_default().commits += 1;
    }

    fn frame_done(&mut self, output: OutputId, time: u32) {
        trace!("frame done on {output:?} at {time}ms");
        self.frames.entry(output).or_default().last_done = Some(time);
    }
}
