//! Interactive window move and resize.

use smithay::utils::{Logical, Point, Rectangle, Size};
use tracing::debug;

use crate::config::{MIN_WINDOW_SIZE, UNBOUNDED_SIZE};
use crate::geometry::{RectangleEdges, Vector};
use crate::protocol::{Edges, Protocol, ToplevelState};
use crate::scene::SceneGraph;
use crate::windows::ViewId;
use crate::wlbox::Wlbox;

/// Interactive operation in progress.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum GrabMode {
    #[default]
    Normal,
    MovingWindow,
    ResizingWindow,
}

/// Interactive grab state.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct Grab {
    /// Grabbed view, `None` without active grab.
    pub view: Option<ViewId>,
    pub mode: GrabMode,

    /// Cursor position at the start of the grab.
    pub cursor: Point<f64, Logical>,

    /// Window geometry at the start of the grab, in layout space.
    pub geometry: Rectangle<f64, Logical>,

    /// Edges dragged during resize.
    pub edges: Edges,
}

impl Grab {
    pub fn is_active(&self) -> bool {
        self.view.is_some() && self.mode != GrabMode::Normal
    }

    /// Stop the active grab.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Window geometry after a resize drag to `cursor`.
    ///
    /// Dimensions outside of the window's size limits are reset to their
    /// `current` value instead of being clamped.
    pub fn resize_geometry(
        &self,
        cursor: Point<f64, Logical>,
        current: Rectangle<i32, Logical>,
        state: ToplevelState,
    ) -> Rectangle<f64, Logical> {
        let mut geometry = self.geometry;

        if self.edges.contains(Edges::TOP) {
            geometry.set_top(cursor.y);
        } else if self.edges.contains(Edges::BOTTOM) {
            geometry.set_bottom(cursor.y);
        }

        if self.edges.contains(Edges::LEFT) {
            geometry.set_left(cursor.x);
        } else if self.edges.contains(Edges::RIGHT) {
            geometry.set_right(cursor.x);
        }

        let min_size = state.min_size.max((MIN_WINDOW_SIZE, MIN_WINDOW_SIZE));
        let max_size = unbounded_max(state.max_size);
        let current = current.to_f64();

        if geometry.size.w < min_size.w as f64 || geometry.size.w > max_size.w as f64 {
            geometry.loc.x = current.loc.x;
            geometry.size.w = current.size.w;
        }

        if geometry.size.h < min_size.h as f64 || geometry.size.h > max_size.h as f64 {
            geometry.loc.y = current.loc.y;
            geometry.size.h = current.size.h;
        }

        geometry
    }
}

/// Replace unconstrained maximum dimensions with [`UNBOUNDED_SIZE`].
fn unbounded_max(max_size: Size<i32, Logical>) -> Size<i32, Logical> {
    let w = if max_size.w == 0 { UNBOUNDED_SIZE } else { max_size.w };
    let h = if max_size.h == 0 { UNBOUNDED_SIZE } else { max_size.h };
    (w, h).into()
}

impl<S: SceneGraph, P: Protocol> Wlbox<S, P> {
    /// Start an interactive move or resize.
    ///
    /// Only the view with pointer focus can start a grab.
    pub fn begin_interactive(&mut self, id: ViewId, mode: GrabMode, edges: Edges) {
        let view = match self.views.get(id) {
            Some(view) => view,
            None => return,
        };

        let pointer_focus = self.protocol.pointer_focus();
        let focused = pointer_focus.map(|surface| self.protocol.root_surface(surface));
        if focused != Some(view.surface) {
            debug!("ignoring {mode:?} request from {:?} without pointer focus", view.surface);
            return;
        }

        let geometry = self.protocol.geometry(view.surface);
        let geometry = Rectangle { loc: view.geometry.loc + geometry.loc, size: geometry.size };

        self.grab = Grab {
            mode,
            edges,
            view: Some(id),
            cursor: self.seat.cursor,
            geometry: geometry.to_f64(),
        };
    }

    /// Apply cursor motion to the active grab.
    pub fn update_grab(&mut self) {
        let view = match self.grab.view.and_then(|id| self.views.get_mut(id)) {
            Some(view) => view,
            None => return,
        };

        match self.grab.mode {
            GrabMode::MovingWindow => {
                let location = self.grab.geometry.loc + (self.seat.cursor - self.grab.cursor);
                view.geometry.loc = location.to_i32_round();
                self.scene.set_position(view.node, view.geometry.loc);
            },
            GrabMode::ResizingWindow => {
                let mut current = self.protocol.geometry(view.surface);
                current.loc += view.geometry.loc;

                let state = self.protocol.toplevel_state(view.surface);
                let geometry = self.grab.resize_geometry(self.seat.cursor, current, state);

                view.geometry.loc = geometry.loc.to_i32_round();
                view.geometry.size = geometry.size.to_i32_round();
                self.scene.set_position(view.node, view.geometry.loc);
                self.protocol.set_size(view.surface, view.geometry.size);
            },
            GrabMode::Normal => (),
        }
    }
}
