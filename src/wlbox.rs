//! Wlbox compositor state.

use std::time::Instant;

use tracing::{info, warn};
use wlbox_ipc::ViewInfo;

use crate::config::{Config, DEFAULT_CURSOR};
use crate::grab::Grab;
use crate::input::InputEvent;
use crate::output::{Output, OutputEvent, Outputs};
use crate::protocol::{Protocol, ShellEvent};
use crate::scene::SceneGraph;
use crate::seat::Seat;
use crate::windows::Views;

/// Events processed by the compositor.
#[derive(Debug)]
pub enum Event {
    Input(InputEvent),
    Shell(ShellEvent),
    Output(OutputEvent),
}

impl From<InputEvent> for Event {
    fn from(event: InputEvent) -> Self {
        Self::Input(event)
    }
}

impl From<ShellEvent> for Event {
    fn from(event: ShellEvent) -> Self {
        Self::Shell(event)
    }
}

impl From<OutputEvent> for Event {
    fn from(event: OutputEvent) -> Self {
        Self::Output(event)
    }
}

/// Shared compositor state.
pub struct Wlbox<S, P> {
    pub views: Views,
    pub outputs: Outputs,
    pub seat: Seat,
    pub grab: Grab,
    pub config: Config,
    pub terminated: bool,

    /// Rendering service.
    pub scene: S,

    /// Wayland protocol runtime.
    pub protocol: P,

    start_time: Instant,
}

impl<S: SceneGraph, P: Protocol> Wlbox<S, P> {
    /// Initialize the compositor.
    pub fn new(mut scene: S, protocol: P, config: Config) -> Self {
        scene.load_cursor_theme(&config.cursor_theme, config.cursor_size);
        scene.set_cursor_image(DEFAULT_CURSOR);

        Self {
            protocol,
            config,
            scene,
            start_time: Instant::now(),
            terminated: Default::default(),
            outputs: Default::default(),
            views: Default::default(),
            grab: Default::default(),
            seat: Default::default(),
        }
    }

    /// Process a single event to completion.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn dispatch(&mut self, event: Event) {
        match event {
            Event::Input(event) => self.handle_input(event),
            Event::Shell(event) => self.handle_shell(event),
            Event::Output(event) => self.handle_output(event),
        }
    }

    /// Handle output hotplug and frame events.
    pub fn handle_output(&mut self, event: OutputEvent) {
        match event {
            OutputEvent::Added { id, name, mode, scale, transform } => {
                let output = Output::new(id, name, mode, scale, transform);
                info!("output {} added with resolution {:?}", output.name, output.resolution());
                self.outputs.add(output);
            },
            OutputEvent::Removed { id } => match self.outputs.remove(id) {
                Some(output) => info!("output {} removed", output.name),
                None => warn!("ignoring removal of unknown output {id:?}"),
            },
            OutputEvent::Frame { id } => {
                if self.outputs.get(id).is_none() {
                    warn!("ignoring frame for unknown output {id:?}");
                    return;
                }

                let runtime = self.runtime();
                self.scene.commit_frame(id);
                self.scene.frame_done(id, runtime);
            },
        }
    }

    /// Compositor runtime in milliseconds.
    pub fn runtime(&self) -> u32 {
        self.start_time.elapsed().as_millis() as u32
    }

    /// Shut down the compositor.
    pub fn quit(&mut self) {
        info!("terminating compositor");

        self.terminated = true;
        self.protocol.terminate();
    }

    /// IPC description of all mapped views, most recently focused first.
    pub fn view_info(&self) -> Vec<ViewInfo> {
        let focus = self.protocol.keyboard_focus();
        let focus = focus.map(|surface| self.protocol.root_surface(surface));

        self.views
            .iter_mapped()
            .map(|view| ViewInfo {
                id: view.id.0,
                x: view.geometry.loc.x,
                y: view.geometry.loc.y,
                width: view.geometry.size.w,
                height: view.geometry.size.h,
                focused: focus == Some(view.surface),
                maximized: view.maximized,
                minimized: view.minimized,
            })
            .collect()
    }
}
