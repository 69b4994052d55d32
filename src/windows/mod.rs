//! Window management.

use std::collections::HashMap;
use std::iter;

use indexmap::IndexMap;
use smithay::utils::{Logical, Point};

use crate::protocol::SurfaceId;
use crate::scene::{NodeId, NodeKind, SceneGraph};

pub use crate::windows::view::View;

mod view;

/// Stable key of a view in the [`Views`] arena.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ViewId(pub u64);

/// Client surface below a point.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SurfaceUnder {
    /// Mapped view owning the surface.
    pub view: Option<ViewId>,
    pub surface: SurfaceId,
    /// Surface-local position of the point.
    pub location: Point<f64, Logical>,
}

/// Container tracking all toplevel windows.
///
/// Views stay in the arena from creation until their surface is destroyed,
/// while only mapped views take part in the stacking order.
#[derive(Default, Debug)]
pub struct Views {
    views: IndexMap<ViewId, View>,

    /// Mapped views, most recently focused first.
    mapped: Vec<ViewId>,

    /// Scene nodes of all popups.
    popups: HashMap<SurfaceId, NodeId>,

    next_id: u64,
}

impl Views {
    /// Add a new unmapped view.
    pub fn create(&mut self, surface: SurfaceId, node: NodeId) -> ViewId {
        let id = ViewId(self.next_id);
        self.next_id += 1;

        self.views.insert(id, View::new(id, surface, node));

        id
    }

    pub fn get(&self, id: ViewId) -> Option<&View> {
        self.views.get(&id)
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut View> {
        self.views.get_mut(&id)
    }

    /// Find the view owning a toplevel surface.
    pub fn find(&self, surface: SurfaceId) -> Option<ViewId> {
        self.views.values().find(|view| view.surface == surface).map(|view| view.id)
    }

    /// Add a view to the end of the stacking order.
    pub fn map(&mut self, id: ViewId) {
        if self.views.contains_key(&id) && !self.mapped.contains(&id) {
            self.mapped.push(id);
        }
    }

    /// Remove a view from the stacking order, keeping it alive.
    pub fn unmap(&mut self, id: ViewId) -> bool {
        let len = self.mapped.len();
        self.mapped.retain(|mapped| *mapped != id);
        self.mapped.len() != len
    }

    /// Remove a view entirely.
    pub fn destroy(&mut self, id: ViewId) -> Option<View> {
        self.unmap(id);
        self.views.shift_remove(&id)
    }

    /// Move a mapped view to the front of the stacking order.
    pub fn raise(&mut self, id: ViewId) {
        if let Some(index) = self.mapped.iter().position(|mapped| *mapped == id) {
            let id = self.mapped.remove(index);
            self.mapped.insert(0, id);
        }
    }

    /// Mapped views, most recently focused first.
    pub fn mapped(&self) -> &[ViewId] {
        &self.mapped
    }

    pub fn is_mapped(&self, id: ViewId) -> bool {
        self.mapped.contains(&id)
    }

    /// Iterate over mapped views, most recently focused first.
    pub fn iter_mapped(&self) -> impl DoubleEndedIterator<Item = &View> {
        self.mapped.iter().filter_map(|id| self.views.get(id))
    }

    /// Find the topmost client surface at a point.
    pub fn surface_at(
        &self,
        scene: &impl SceneGraph,
        point: Point<f64, Logical>,
    ) -> Option<SurfaceUnder> {
        let (node, location) = scene.node_at(point)?;
        let surface = match scene.node_kind(node)? {
            NodeKind::Surface(surface) => surface,
            _ => return None,
        };

        // Only the root of a view's subtree is tagged.
        let view = iter::successors(Some(node), |node| scene.parent(*node))
            .find_map(|node| scene.tag_of(node))
            .filter(|view| self.is_mapped(*view));

        Some(SurfaceUnder { view, surface, location })
    }

    /// Find the view at a point, with the exact surface and its local position.
    pub fn view_at(
        &self,
        scene: &impl SceneGraph,
        point: Point<f64, Logical>,
    ) -> Option<(ViewId, SurfaceId, Point<f64, Logical>)> {
        let under = self.surface_at(scene, point)?;
        Some((under.view?, under.surface, under.location))
    }

    pub fn add_popup(&mut self, surface: SurfaceId, node: NodeId) {
        self.popups.insert(surface, node);
    }

    pub fn popup_node(&self, surface: SurfaceId) -> Option<NodeId> {
        self.popups.get(&surface).copied()
    }

    pub fn remove_popup(&mut self, surface: SurfaceId) -> Option<NodeId> {
        self.popups.remove(&surface)
    }

    /// Drop popups whose scene node fails the predicate.
    pub fn retain_popups(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
        self.popups.retain(|_, node| keep(*node));
    }
}
