//! XDG shell lifecycle handling.

use smithay::utils::Rectangle;
use tracing::{debug, error, info};

use crate::geometry::Vector;
use crate::grab::GrabMode;
use crate::protocol::{CursorRequest, DecorationId, DecorationMode, Protocol, ShellEvent, SurfaceId};
use crate::scene::SceneGraph;
use crate::windows::ViewId;
use crate::wlbox::Wlbox;

impl<S: SceneGraph, P: Protocol> Wlbox<S, P> {
    /// Handle shell lifecycle callbacks.
    pub fn handle_shell(&mut self, event: ShellEvent) {
        match event {
            ShellEvent::NewToplevel { surface } => self.add_toplevel(surface),
            ShellEvent::NewPopup { surface, parent } => self.add_popup(surface, parent),
            ShellEvent::PopupDestroyed { surface } => {
                if let Some(node) = self.views.remove_popup(surface) {
                    self.scene.destroy_node(node);
                    self.prune_popups();
                }
            },
            ShellEvent::Map { surface } => {
                if let Some(id) = self.toplevel(surface) {
                    self.map_view(id);
                }
            },
            ShellEvent::Unmap { surface } => {
                if let Some(id) = self.toplevel(surface) {
                    self.unmap_view(id);
                }
            },
            ShellEvent::Destroy { surface } => {
                if let Some(id) = self.toplevel(surface) {
                    self.destroy_view(id);
                }
            },
            ShellEvent::RequestMove { surface } => {
                if let Some(id) = self.toplevel(surface) {
                    self.begin_interactive(id, GrabMode::MovingWindow, Default::default());
                }
            },
            ShellEvent::RequestResize { surface, edges } => {
                if let Some(id) = self.toplevel(surface) {
                    self.begin_interactive(id, GrabMode::ResizingWindow, edges);
                }
            },
            ShellEvent::RequestMaximize { surface, .. } => {
                if let Some(id) = self.toplevel(surface) {
                    self.toggle_maximized(id);
                }
            },
            ShellEvent::RequestMinimize { surface, minimize } => {
                if let Some(id) = self.toplevel(surface) {
                    self.set_minimized(id, minimize);
                }
            },
            // Fullscreen is unsupported, but the client still needs a configure.
            ShellEvent::RequestFullscreen { surface, .. } => {
                self.protocol.schedule_configure(surface);
            },
            ShellEvent::NewDecoration { decoration, toplevel } => {
                self.add_decoration(decoration, toplevel);
            },
            ShellEvent::SetCursor(request) => self.set_cursor(request),
            ShellEvent::SetSelection { source, serial } => {
                self.protocol.set_selection(source, serial);
            },
        }
    }

    /// Look up the view of a toplevel surface.
    fn toplevel(&self, surface: SurfaceId) -> Option<ViewId> {
        let id = self.views.find(surface);
        if id.is_none() {
            error!("ignoring callback for unknown toplevel {surface:?}");
        }
        id
    }

    /// Create the view for a new toplevel.
    fn add_toplevel(&mut self, surface: SurfaceId) {
        if self.views.find(surface).is_some() {
            error!("ignoring duplicate toplevel {surface:?}");
            return;
        }

        let node = self.scene.create_node(None, surface);
        self.scene.set_enabled(node, false);

        let id = self.views.create(surface, node);
        self.scene.tag(node, id);

        info!("new toplevel {surface:?} as {id:?}");
    }

    /// Attach a popup to its parent's scene node.
    fn add_popup(&mut self, surface: SurfaceId, parent: SurfaceId) {
        let parent_node = self.views.popup_node(parent).or_else(|| {
            let id = self.views.find(parent)?;
            self.views.get(id).map(|view| view.node)
        });

        match parent_node {
            Some(parent_node) => {
                let node = self.scene.create_node(Some(parent_node), surface);
                self.views.add_popup(surface, node);
            },
            None => error!("ignoring popup {surface:?} with unknown parent {parent:?}"),
        }
    }

    /// Place a view on the closest output and focus it.
    fn map_view(&mut self, id: ViewId) {
        let view = match self.views.get_mut(id) {
            Some(view) => view,
            None => return,
        };

        let natural_size = self.protocol.geometry(view.surface).size;
        let usable_area = self.outputs.usable_area(view.geometry);
        view.geometry = Rectangle::from_size(natural_size.min(usable_area.size));

        // Mapping always starts from the natural geometry.
        if view.maximized {
            view.maximized = false;
            self.protocol.set_maximized(view.surface, false);
        }
        view.minimized = false;

        let (node, surface) = (view.node, view.surface);
        self.scene.set_position(node, view.geometry.loc);
        self.scene.set_enabled(node, true);

        // New views start at the bottom of the stack, matching the registry.
        self.scene.lower_to_bottom(node);
        self.views.map(id);

        self.focus_view(id, surface);
    }

    /// Hide a view without destroying it.
    fn unmap_view(&mut self, id: ViewId) {
        if let Some(view) = self.views.get(id) {
            self.scene.set_enabled(view.node, false);
        }
        self.views.unmap(id);
    }

    /// Remove a view and everything referencing it.
    fn destroy_view(&mut self, id: ViewId) {
        if self.grab.view == Some(id) {
            self.grab.reset();
        }

        if let Some(view) = self.views.destroy(id) {
            self.scene.destroy_node(view.node);
            self.prune_popups();
            info!("toplevel {:?} destroyed", view.surface);
        }
    }

    /// Forget popups whose scene node was destroyed with an ancestor.
    fn prune_popups(&mut self) {
        let scene = &self.scene;
        self.views.retain_popups(|node| scene.node_kind(node).is_some());
    }

    /// Switch a view between maximized and its previous geometry.
    fn toggle_maximized(&mut self, id: ViewId) {
        let view = match self.views.get_mut(id) {
            Some(view) => view,
            None => return,
        };

        let usable_area = self.outputs.usable_area(view.geometry);
        view.toggle_maximized(usable_area);

        self.protocol.set_size(view.surface, view.geometry.size);
        self.protocol.set_maximized(view.surface, view.maximized);
        self.scene.set_position(view.node, view.geometry.loc);
    }

    /// Hide a view above the visible area, or restore it.
    fn set_minimized(&mut self, id: ViewId, minimize: bool) {
        let view = match self.views.get_mut(id) {
            Some(view) => view,
            None => return,
        };

        if view.set_minimized(minimize) {
            self.scene.set_position(view.node, view.geometry.loc);
        }
    }

    /// Force client-side decorations.
    fn add_decoration(&mut self, decoration: DecorationId, toplevel: SurfaceId) {
        self.protocol.set_decoration_mode(decoration, DecorationMode::ClientSide);

        match self.views.find(toplevel).and_then(|id| self.views.get_mut(id)) {
            Some(view) => view.decoration = Some(decoration),
            None => error!("decoration {decoration:?} for unknown toplevel {toplevel:?}"),
        }
    }

    /// Update the cursor image on client request.
    fn set_cursor(&mut self, request: CursorRequest) {
        if self.protocol.pointer_focus_client() != Some(request.client) {
            debug!("ignoring cursor request from unfocused {:?}", request.client);
            return;
        }

        self.scene.set_cursor_surface(request.surface, request.hotspot);
    }
}

#[cfg(test)]
mod test {
    use smithay::backend::input::ButtonState;

    use super::*;
    use crate::headless::{Command, CursorImage};
    use crate::input::DeviceId;
    use crate::protocol::{ClientId, DataSourceId, Edges};
    use crate::testing::{self, FakeKeyboard};

    #[test]
    fn map_clamps_to_output() {
        let mut wlbox = testing::wlbox_with_output(1920, 1080);
        let a = testing::map_toplevel(&mut wlbox, SurfaceId(1), (2000, 1200));
        let b = testing::map_toplevel(&mut wlbox, SurfaceId(2), (800, 600));

        assert_eq!(wlbox.views.get(a).unwrap().geometry, testing::rect(0, 0, 1920, 1080));
        assert_eq!(wlbox.views.get(b).unwrap().geometry, testing::rect(0, 0, 800, 600));
        assert_eq!(wlbox.views.mapped(), &[b, a]);
    }

    #[test]
    fn map_without_output() {
        let mut wlbox = testing::wlbox();
        let id = testing::map_toplevel(&mut wlbox, SurfaceId(1), (800, 600));

        assert_eq!(wlbox.views.get(id).unwrap().geometry, testing::rect(0, 0, 0, 0));
        assert_eq!(wlbox.views.mapped(), &[id]);
    }

    #[test]
    fn unmap_and_remap() {
        let mut wlbox = testing::wlbox_with_output(1920, 1080);
        let id = testing::map_toplevel(&mut wlbox, SurfaceId(1), (800, 600));
        let node = wlbox.views.get(id).unwrap().node;

        wlbox.dispatch(ShellEvent::Unmap { surface: SurfaceId(1) }.into());
        assert!(wlbox.views.mapped().is_empty());
        assert!(wlbox.views.get(id).is_some());
        assert_eq!(wlbox.scene.is_enabled(node), Some(false));

        wlbox.dispatch(ShellEvent::Map { surface: SurfaceId(1) }.into());
        assert_eq!(wlbox.views.mapped(), &[id]);
        assert_eq!(wlbox.scene.is_enabled(node), Some(true));
    }

    #[test]
    fn destroy_clears_grab() {
        let mut wlbox = testing::wlbox_with_output(1920, 1080);
        let id = testing::map_toplevel(&mut wlbox, SurfaceId(1), (800, 600));
        let node = wlbox.views.get(id).unwrap().node;

        testing::motion(&mut wlbox, (10., 10.));
        let edges = Edges::RIGHT;
        wlbox.dispatch(ShellEvent::RequestResize { surface: SurfaceId(1), edges }.into());
        assert_eq!(wlbox.grab.view, Some(id));

        wlbox.dispatch(ShellEvent::Unmap { surface: SurfaceId(1) }.into());
        assert_eq!(wlbox.grab.view, Some(id));

        wlbox.dispatch(ShellEvent::Destroy { surface: SurfaceId(1) }.into());
        assert_eq!(wlbox.grab.view, None);
        assert_eq!(wlbox.grab.mode, GrabMode::Normal);
        assert!(wlbox.views.get(id).is_none());
        assert_eq!(wlbox.scene.is_enabled(node), None);

        // Motion after destruction must not touch the old view.
        testing::motion(&mut wlbox, (10., 10.));
        testing::button(&mut wlbox, ButtonState::Pressed);
    }

    #[test]
    fn unknown_surface_is_ignored() {
        let mut wlbox = testing::wlbox_with_output(1920, 1080);
        wlbox.dispatch(ShellEvent::Map { surface: SurfaceId(9) }.into());
        wlbox.dispatch(ShellEvent::RequestMaximize { surface: SurfaceId(9), maximize: true }.into());
        wlbox.dispatch(ShellEvent::Destroy { surface: SurfaceId(9) }.into());

        assert!(wlbox.views.mapped().is_empty());
        assert!(wlbox.protocol.take_commands().is_empty());
    }

    #[test]
    fn maximize_toggles() {
        let mut wlbox = testing::wlbox_with_output(1920, 1080);
        let id = testing::map_toplevel(&mut wlbox, SurfaceId(1), (800, 600));
        wlbox.views.get_mut(id).unwrap().geometry.loc = (40, 30).into();
        wlbox.protocol.take_commands();

        wlbox.dispatch(ShellEvent::RequestMaximize { surface: SurfaceId(1), maximize: true }.into());
        let view = wlbox.views.get(id).unwrap();
        assert_eq!(view.geometry, testing::rect(0, 0, 1920, 1080));
        assert_eq!(wlbox.scene.position(view.node), Some((0, 0).into()));
        assert_eq!(wlbox.protocol.take_commands(), vec![
            Command::Size { surface: SurfaceId(1), size: (1920, 1080).into() },
            Command::Maximized { surface: SurfaceId(1), maximized: true },
        ]);

        // The requested state is ignored, every request toggles.
        wlbox.dispatch(ShellEvent::RequestMaximize { surface: SurfaceId(1), maximize: true }.into());
        let view = wlbox.views.get(id).unwrap();
        assert_eq!(view.geometry, testing::rect(40, 30, 800, 600));
        assert_eq!(wlbox.scene.position(view.node), Some((40, 30).into()));
        assert_eq!(wlbox.protocol.take_commands(), vec![
            Command::Size { surface: SurfaceId(1), size: (800, 600).into() },
            Command::Maximized { surface: SurfaceId(1), maximized: false },
        ]);
    }

    #[test]
    fn minimize_hides_view() {
        let mut wlbox = testing::wlbox_with_output(1920, 1080);
        let id = testing::map_toplevel(&mut wlbox, SurfaceId(1), (800, 600));

        wlbox.dispatch(ShellEvent::RequestMinimize { surface: SurfaceId(1), minimize: true }.into());
        let view = wlbox.views.get(id).unwrap();
        assert_eq!(view.geometry, testing::rect(0, -600, 800, 600));
        assert_eq!(wlbox.scene.position(view.node), Some((0, -600).into()));
        assert!(wlbox.views.is_mapped(id));

        wlbox.dispatch(ShellEvent::RequestMinimize { surface: SurfaceId(1), minimize: false }.into());
        let view = wlbox.views.get(id).unwrap();
        assert_eq!(view.geometry, testing::rect(0, 0, 800, 600));
        assert_eq!(wlbox.scene.position(view.node), Some((0, 0).into()));
    }

    #[test]
    fn fullscreen_is_acknowledged() {
        let mut wlbox = testing::wlbox_with_output(1920, 1080);
        let id = testing::map_toplevel(&mut wlbox, SurfaceId(1), (800, 600));
        wlbox.protocol.take_commands();

        let event = ShellEvent::RequestFullscreen { surface: SurfaceId(1), fullscreen: true };
        wlbox.dispatch(event.into());

        assert_eq!(wlbox.protocol.take_commands(), vec![Command::Configure {
            surface: SurfaceId(1)
        }]);
        assert_eq!(wlbox.views.get(id).unwrap().geometry, testing::rect(0, 0, 800, 600));
    }

    #[test]
    fn popups_follow_parent() {
        let mut wlbox = testing::wlbox_with_output(1920, 1080);
        let id = testing::map_toplevel(&mut wlbox, SurfaceId(1), (800, 600));
        let view_node = wlbox.views.get(id).unwrap().node;

        wlbox.dispatch(ShellEvent::NewPopup { surface: SurfaceId(2), parent: SurfaceId(1) }.into());
        wlbox.dispatch(ShellEvent::NewPopup { surface: SurfaceId(3), parent: SurfaceId(2) }.into());
        let popup = wlbox.views.popup_node(SurfaceId(2)).unwrap();
        let nested = wlbox.views.popup_node(SurfaceId(3)).unwrap();
        assert_eq!(wlbox.scene.parent(popup), Some(view_node));
        assert_eq!(wlbox.scene.parent(nested), Some(popup));

        // Popups hit inside the toplevel belong to its view.
        wlbox.scene.set_surface_size(SurfaceId(3), (100, 100).into());
        wlbox.scene.set_position(nested, (50, 50).into());
        let under = wlbox.views.surface_at(&wlbox.scene, (60., 70.).into()).unwrap();
        assert_eq!(under.view, Some(id));
        assert_eq!(under.surface, SurfaceId(3));
        assert_eq!(under.location, (10., 20.).into());

        wlbox.dispatch(ShellEvent::PopupDestroyed { surface: SurfaceId(3) }.into());
        assert_eq!(wlbox.views.popup_node(SurfaceId(3)), None);
        assert_eq!(wlbox.scene.node_kind(nested), None);

        // Popups without known parent are dropped.
        wlbox.dispatch(ShellEvent::NewPopup { surface: SurfaceId(4), parent: SurfaceId(9) }.into());
        assert_eq!(wlbox.views.popup_node(SurfaceId(4)), None);
    }

    #[test]
    fn destroyed_parents_drop_popups() {
        let mut wlbox = testing::wlbox_with_output(1920, 1080);
        testing::map_toplevel(&mut wlbox, SurfaceId(1), (800, 600));
        testing::map_toplevel(&mut wlbox, SurfaceId(5), (800, 600));

        wlbox.dispatch(ShellEvent::NewPopup { surface: SurfaceId(2), parent: SurfaceId(1) }.into());
        wlbox.dispatch(ShellEvent::NewPopup { surface: SurfaceId(3), parent: SurfaceId(2) }.into());
        wlbox.dispatch(ShellEvent::NewPopup { surface: SurfaceId(4), parent: SurfaceId(3) }.into());
        wlbox.dispatch(ShellEvent::NewPopup { surface: SurfaceId(6), parent: SurfaceId(5) }.into());

        // Nested popups go away with their parent popup.
        wlbox.dispatch(ShellEvent::PopupDestroyed { surface: SurfaceId(3) }.into());
        assert!(wlbox.views.popup_node(SurfaceId(2)).is_some());
        assert_eq!(wlbox.views.popup_node(SurfaceId(3)), None);
        assert_eq!(wlbox.views.popup_node(SurfaceId(4)), None);

        // Remaining popups go away with their toplevel.
        wlbox.dispatch(ShellEvent::Destroy { surface: SurfaceId(1) }.into());
        assert_eq!(wlbox.views.popup_node(SurfaceId(2)), None);
        assert!(wlbox.views.popup_node(SurfaceId(6)).is_some());

        // Reused surface handles cannot attach to stale nodes.
        wlbox.dispatch(ShellEvent::NewPopup { surface: SurfaceId(7), parent: SurfaceId(2) }.into());
        assert_eq!(wlbox.views.popup_node(SurfaceId(7)), None);
    }

    #[test]
    fn remap_clears_window_state() {
        let mut wlbox = testing::wlbox_with_output(1920, 1080);
        let id = testing::map_toplevel(&mut wlbox, SurfaceId(1), (800, 600));

        wlbox.dispatch(ShellEvent::RequestMaximize { surface: SurfaceId(1), maximize: true }.into());
        wlbox.dispatch(ShellEvent::RequestMinimize { surface: SurfaceId(1), minimize: true }.into());
        wlbox.dispatch(ShellEvent::Unmap { surface: SurfaceId(1) }.into());
        wlbox.protocol.take_commands();

        wlbox.dispatch(ShellEvent::Map { surface: SurfaceId(1) }.into());
        let view = wlbox.views.get(id).unwrap();
        assert!(!view.maximized);
        assert!(!view.minimized);
        assert_eq!(view.geometry, testing::rect(0, 0, 800, 600));
        assert!(!wlbox.protocol.is_maximized(SurfaceId(1)));
        assert!(wlbox
            .protocol
            .take_commands()
            .contains(&Command::Maximized { surface: SurfaceId(1), maximized: false }));

        // The next request maximizes instead of restoring stale geometry.
        wlbox.dispatch(ShellEvent::RequestMaximize { surface: SurfaceId(1), maximize: true }.into());
        let view = wlbox.views.get(id).unwrap();
        assert!(view.maximized);
        assert_eq!(view.geometry, testing::rect(0, 0, 1920, 1080));
    }

    #[test]
    fn selection_is_forwarded() {
        let mut wlbox = testing::wlbox_with_output(1920, 1080);

        let source = Some(DataSourceId(3));
        wlbox.dispatch(ShellEvent::SetSelection { source, serial: 12 }.into());
        assert_eq!(wlbox.protocol.selection(), source);

        wlbox.dispatch(ShellEvent::SetSelection { source: None, serial: 13 }.into());
        assert_eq!(wlbox.protocol.selection(), None);
        assert_eq!(wlbox.protocol.take_commands(), vec![
            Command::Selection(source),
            Command::Selection(None),
        ]);
    }

    #[test]
    fn decorations_are_client_side() {
        let mut wlbox = testing::wlbox_with_output(1920, 1080);
        let id = testing::map_toplevel(&mut wlbox, SurfaceId(1), (800, 600));
        wlbox.protocol.take_commands();

        let decoration = DecorationId(5);
        wlbox.dispatch(ShellEvent::NewDecoration { decoration, toplevel: SurfaceId(1) }.into());

        assert_eq!(wlbox.views.get(id).unwrap().decoration, Some(decoration));
        assert_eq!(wlbox.protocol.take_commands(), vec![Command::DecorationMode {
            decoration,
            mode: DecorationMode::ClientSide
        }]);
    }

    #[test]
    fn cursor_requires_pointer_focus() {
        let mut wlbox = testing::wlbox_with_output(1920, 1080);
        testing::map_toplevel(&mut wlbox, SurfaceId(1), (800, 600));
        let hotspot = (2, 3).into();

        let request = CursorRequest { client: ClientId(1), surface: Some(SurfaceId(7)), hotspot };
        wlbox.dispatch(ShellEvent::SetCursor(request).into());
        assert_ne!(wlbox.scene.cursor_image(), &CursorImage::Surface {
            surface: SurfaceId(7),
            hotspot
        });

        testing::motion(&mut wlbox, (10., 10.));
        assert_eq!(wlbox.protocol.pointer_focus_client(), Some(ClientId(1)));

        // Other clients still cannot change the cursor.
        let other = CursorRequest { client: ClientId(2), surface: None, hotspot };
        wlbox.dispatch(ShellEvent::SetCursor(other).into());
        assert_ne!(wlbox.scene.cursor_image(), &CursorImage::Hidden);

        wlbox.dispatch(ShellEvent::SetCursor(request).into());
        assert_eq!(wlbox.scene.cursor_image(), &CursorImage::Surface {
            surface: SurfaceId(7),
            hotspot
        });
    }

    #[test]
    fn remapped_view_gets_focus() {
        let mut wlbox = testing::wlbox_with_output(1920, 1080);
        testing::add_keyboard(&mut wlbox, DeviceId(1), FakeKeyboard::default());
        let a = testing::map_toplevel(&mut wlbox, SurfaceId(1), (800, 600));
        let b = testing::map_toplevel(&mut wlbox, SurfaceId(2), (800, 600));

        wlbox.dispatch(ShellEvent::Unmap { surface: SurfaceId(1) }.into());
        wlbox.dispatch(ShellEvent::Map { surface: SurfaceId(1) }.into());

        assert_eq!(wlbox.views.mapped(), &[a, b]);
        assert_eq!(wlbox.protocol.keyboard_focus(), Some(SurfaceId(1)));
        assert_eq!(wlbox.scene.top_node(), Some(wlbox.views.get(a).unwrap().node));
    }
}
