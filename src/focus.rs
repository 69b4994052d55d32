//! Keyboard focus and stacking order.

use tracing::warn;

use crate::protocol::{Protocol, SurfaceId};
use crate::scene::SceneGraph;
use crate::windows::ViewId;
use crate::wlbox::Wlbox;

impl<S: SceneGraph, P: Protocol> Wlbox<S, P> {
    /// Activate a view and move it to the top of the stack.
    ///
    /// This does nothing if `surface` already has keyboard focus.
    pub fn focus_view(&mut self, id: ViewId, surface: SurfaceId) {
        let previous = self.protocol.keyboard_focus();
        if previous == Some(surface) {
            return;
        }

        let (node, toplevel) = match self.views.get(id) {
            Some(view) => (view.node, view.surface),
            None => return,
        };

        if let Some(previous) = previous {
            let previous = self.protocol.root_surface(previous);
            match self.views.find(previous) {
                Some(_) => self.protocol.set_activated(previous, false),
                None => warn!("keyboard focus {previous:?} is not a toplevel"),
            }
        }

        // Scene and registry order must always change together.
        self.scene.raise_to_top(node);
        self.views.raise(id);

        self.protocol.set_activated(toplevel, true);

        if let Some(keyboard) = self.seat.active_keyboard() {
            let keys = keyboard.pressed_keys();
            let modifiers = keyboard.modifiers();
            self.protocol.keyboard_enter(toplevel, &keys, &modifiers);
        }
    }

    /// Focus the second most recently focused view.
    pub fn cycle_focus(&mut self) {
        let view = self.views.mapped().get(1).and_then(|id| self.views.get(*id));
        if let Some((id, surface)) = view.map(|view| (view.id, view.surface)) {
            self.focus_view(id, surface);
        }
    }
}
