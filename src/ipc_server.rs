//! IPC socket server.

use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;

use calloop::generic::Generic;
use calloop::{Interest, LoopHandle, Mode, PostAction};
use tracing::{debug, warn};
use wlbox_ipc::{self, IpcMessage};

use crate::protocol::Protocol;
use crate::scene::SceneGraph;
use crate::trace_error;
use crate::wlbox::Wlbox;

/// Maximum size of a single IPC message.
const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Create an IPC socket.
pub fn spawn_ipc_socket<S, P>(
    event_loop: &LoopHandle<'static, Wlbox<S, P>>,
    socket_name: &str,
) -> Result<PathBuf, Box<dyn Error>>
where
    S: SceneGraph + 'static,
    P: Protocol + 'static,
{
    let socket_path = wlbox_ipc::socket_path(socket_name);

    // Try to delete the socket if it exists already.
    if socket_path.exists() {
        fs::remove_file(&socket_path)?;
    }

    let listener = UnixListener::bind(&socket_path)?;
    listener.set_nonblocking(true)?;

    // Add source to calloop loop.
    let handle = event_loop.clone();
    let source = Generic::new(listener, Interest::READ, Mode::Level);
    event_loop.insert_source(source, move |_, listener, _| {
        loop {
            match listener.accept() {
                Ok((stream, _)) => trace_error(add_client(&handle, stream)),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) => {
                    warn!("IPC connection failed: {err}");
                    break;
                },
            }
        }

        Ok(PostAction::Continue)
    })?;

    Ok(socket_path)
}

/// Watch an accepted connection until it has sent a full message.
fn add_client<S, P>(
    event_loop: &LoopHandle<'static, Wlbox<S, P>>,
    stream: UnixStream,
) -> Result<(), Box<dyn Error>>
where
    S: SceneGraph + 'static,
    P: Protocol + 'static,
{
    // Accepted sockets do not inherit the listener's flags.
    stream.set_nonblocking(true)?;

    let mut buffer = Vec::new();
    let source = Generic::new(stream, Interest::READ, Mode::Level);
    event_loop.insert_source(source, move |_, stream, wlbox| {
        match read_message(stream, &mut buffer) {
            Ok(Some(message)) => handle_message(message, stream, wlbox),
            Ok(None) => return Ok(PostAction::Continue),
            Err(err) => warn!("dropping ipc client: {err}"),
        }

        Ok(PostAction::Remove)
    })?;

    Ok(())
}

/// Read all available data from a client.
///
/// Returns `None` until a full line has been received.
fn read_message(mut stream: &UnixStream, buffer: &mut Vec<u8>) -> io::Result<Option<IpcMessage>> {
    let mut chunk = [0; 1024];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(len) => buffer.extend_from_slice(&chunk[..len]),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }

        if let Some(end) = buffer.iter().position(|byte| *byte == b'\n') {
            let message = serde_json::from_slice(&buffer[..end])?;
            return Ok(Some(message));
        }

        if buffer.len() > MAX_MESSAGE_SIZE {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "ipc message too large"));
        }
    }
}

/// Handle IPC socket messages.
fn handle_message<S, P>(message: IpcMessage, stream: &UnixStream, wlbox: &mut Wlbox<S, P>)
where
    S: SceneGraph,
    P: Protocol,
{
    debug!("received ipc message {message:?}");

    match message {
        IpcMessage::Views => {
            let reply = IpcMessage::ViewsReply { views: wlbox.view_info() };
            if let Err(err) = send_reply(stream, &reply) {
                warn!("failed to send ipc reply: {err}");
            }
        },
        IpcMessage::CycleFocus => wlbox.cycle_focus(),
        IpcMessage::Quit => wlbox.quit(),
        IpcMessage::ViewsReply { .. } => warn!("ignoring unexpected ipc reply"),
    }
}

/// Write a single JSON line reply.
fn send_reply(mut stream: &UnixStream, reply: &IpcMessage) -> Result<(), Box<dyn Error>> {
    let mut payload = serde_json::to_string(reply)?;
    payload.push('\n');
    stream.write_all(payload.as_bytes())?;
    stream.flush()?;
    Ok(())
}
