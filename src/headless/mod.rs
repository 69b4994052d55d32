//! Headless backend.
//!
//! This runs the compositor core against in-memory rendering and protocol
//! services, with a single virtual output and a fixed frame clock.
//!
//! No input devices or clients are attached. All backend events enter the
//! core through the [`Sender`] returned by [`backend_channel`], which `run`
//! only uses to announce the virtual output. Everything else reaches the
//! compositor through IPC.

use std::error::Error;
use std::time::Duration;
use std::{env, fs};

use calloop::channel::{self, Sender};
use calloop::signals::{Signal, Signals};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopHandle};
use smithay::utils::Transform;
use tracing::{info, trace, warn};
use wlbox_ipc::SOCKET_ENV;

use crate::config::Config;
use crate::output::{OutputEvent, OutputId};
use crate::wlbox::{Event, Wlbox};
use crate::{daemon, ipc_server, trace_error};

pub use crate::headless::protocol::{Command, HeadlessProtocol};
pub use crate::headless::scene::{CursorImage, FrameStats, HeadlessScene};

mod protocol;
mod scene;

/// Name of the virtual output.
const OUTPUT_NAME: &str = "HEADLESS-1";

/// Resolution of the virtual output.
const OUTPUT_MODE: (i32, i32) = (1920, 1080);

/// Interval between frames on every output.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Compositor state with headless services.
pub type HeadlessWlbox = Wlbox<HeadlessScene, HeadlessProtocol>;

/// Run the compositor until it is terminated.
pub fn run(startup: Option<String>) -> Result<(), Box<dyn Error>> {
    let mut event_loop: EventLoop<'static, HeadlessWlbox> = EventLoop::try_new()?;
    let config = Config::from_env();
    let mut wlbox = Wlbox::new(HeadlessScene::default(), HeadlessProtocol::default(), config);

    let sender = backend_channel(&event_loop.handle())?;

    // Terminate cleanly on SIGINT/SIGTERM.
    let signals = Signals::new(&[Signal::SIGINT, Signal::SIGTERM])?;
    event_loop.handle().insert_source(signals, |event, _, wlbox| {
        info!("received {:?}", event.signal());
        wlbox.quit();
    })?;

    add_virtual_output(&sender)?;

    // Drive the frame clock of all outputs.
    let timer = Timer::from_duration(FRAME_INTERVAL);
    event_loop.handle().insert_source(timer, |_, _, wlbox| {
        let outputs: Vec<_> = wlbox.outputs.iter().map(|output| output.id).collect();
        for id in outputs {
            wlbox.dispatch(OutputEvent::Frame { id }.into());
        }
        TimeoutAction::ToDuration(FRAME_INTERVAL)
    })?;

    // Start IPC socket listener.
    let socket_name = wlbox_ipc::socket_name();
    let socket_path = ipc_server::spawn_ipc_socket(&event_loop.handle(), &socket_name)?;
    env::set_var(SOCKET_ENV, &socket_name);
    info!("listening for IPC on {}", socket_path.display());

    if let Some(command) = startup {
        info!("spawning startup command {command:?}");
        trace_error(daemon::spawn_shell(&command));
    }

    while !wlbox.terminated {
        if let Err(error) = event_loop.dispatch(None, &mut wlbox) {
            warn!("event loop error: {error}");
            break;
        }

        // Requests would be flushed to clients here.
        for command in wlbox.protocol.take_commands() {
            trace!("{command:?}");
        }
    }

    trace_error(fs::remove_file(&socket_path));

    Ok(())
}

/// Create the channel feeding backend events to the compositor.
///
/// Events are dispatched in arrival order.
pub fn backend_channel(
    event_loop: &LoopHandle<'static, HeadlessWlbox>,
) -> Result<Sender<Event>, Box<dyn Error>> {
    let (sender, channel) = channel::channel::<Event>();
    event_loop.insert_source(channel, |event, _, wlbox| {
        if let channel::Event::Msg(event) = event {
            wlbox.dispatch(event);
        }
    })?;

    Ok(sender)
}

/// Announce the virtual output to the compositor.
fn add_virtual_output(sender: &Sender<Event>) -> Result<(), Box<dyn Error>> {
    let event = OutputEvent::Added {
        id: OutputId(0),
        name: OUTPUT_NAME.into(),
        mode: OUTPUT_MODE.into(),
        scale: 1.,
        transform: Transform::Normal,
    };
    sender.send(event.into()).map_err(|_| "backend channel closed")?;

    Ok(())
}
