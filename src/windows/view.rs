//! Toplevel window state.

use smithay::utils::{Logical, Rectangle};

use crate::protocol::{DecorationId, SurfaceId};
use crate::scene::NodeId;
use crate::windows::ViewId;

/// Mapped toplevel window.
#[derive(Clone, PartialEq, Debug)]
pub struct View {
    pub id: ViewId,
    pub surface: SurfaceId,

    /// Root of the view's scene subtree.
    pub node: NodeId,

    /// Window geometry in layout space.
    pub geometry: Rectangle<i32, Logical>,

    /// Geometry before the last maximize or minimize.
    pub previous_geometry: Rectangle<i32, Logical>,

    pub decoration: Option<DecorationId>,
    pub maximized: bool,
    pub minimized: bool,
}

impl View {
    pub fn new(id: ViewId, surface: SurfaceId, node: NodeId) -> Self {
        Self {
            surface,
            node,
            id,
            previous_geometry: Default::default(),
            decoration: Default::default(),
            geometry: Default::default(),
            maximized: Default::default(),
            minimized: Default::default(),
        }
    }

    /// Toggle between maximized and restored geometry.
    ///
    /// Maximizing fills the entire `usable` area, restoring goes back to the
    /// geometry saved before maximizing.
    pub fn toggle_maximized(&mut self, usable: Rectangle<i32, Logical>) {
        if self.maximized {
            self.geometry = self.previous_geometry;
        } else {
            self.previous_geometry = self.geometry;
            self.geometry = Rectangle::from_size(usable.size);
        }
        self.maximized = !self.maximized;
    }

    /// Hide the view above the visible area, or bring it back.
    ///
    /// Returns `false` if the view was already in the requested state.
    pub fn set_minimized(&mut self, minimize: bool) -> bool {
        if self.minimized == minimize {
            return false;
        }

        if minimize {
            self.previous_geometry = self.geometry;
            self.geometry.loc.y = -self.geometry.size.h;
        } else {
            self.geometry = self.previous_geometry;
        }
        self.minimized = minimize;

        true
    }
}
