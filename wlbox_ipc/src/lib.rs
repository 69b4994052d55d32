//! Wlbox compositor interface.
//!
//! This library provides abstractions for talking to a running Wlbox instance
//! over its IPC socket.

use std::error::Error;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::{env, process};

#[cfg(feature = "clap")]
use clap::Subcommand;
use serde::{Deserialize, Serialize};

/// Environment variable carrying the IPC socket name.
pub const SOCKET_ENV: &str = "WLBOX_SOCKET";

/// Socket name used when none is set.
pub const DEFAULT_SOCKET_NAME: &str = "wlbox-0";

/// IPC message format.
#[cfg_attr(feature = "clap", derive(Subcommand))]
#[derive(Deserialize, Serialize, PartialEq, Eq, Debug)]
pub enum IpcMessage {
    /// List mapped windows, most recently focused first.
    Views,

    /// Reply for the [`IpcMessage::Views`] query.
    #[cfg_attr(feature = "clap", clap(skip))]
    ViewsReply { views: Vec<ViewInfo> },

    /// Focus the second most recently focused window.
    CycleFocus,

    /// Terminate the compositor.
    Quit,
}

impl IpcMessage {
    /// Check whether the compositor will answer this message.
    pub fn expects_reply(&self) -> bool {
        matches!(self, Self::Views)
    }
}

/// Window state reported over IPC.
#[derive(Deserialize, Serialize, PartialEq, Eq, Clone, Debug)]
pub struct ViewInfo {
    pub id: u64,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub focused: bool,
    pub maximized: bool,
    pub minimized: bool,
}

/// Send a message to the Wlbox IPC socket.
///
/// The compositor's reply is returned for messages which expect one.
pub fn send_message(message: &IpcMessage) -> Result<Option<IpcMessage>, Box<dyn Error>> {
    let socket_path = socket_path(&socket_name());

    // Ensure Wlbox's IPC listener is running.
    if !socket_path.exists() {
        eprintln!("Error: IPC socket not found, ensure Wlbox is running");
        process::exit(102);
    }

    let mut socket = UnixStream::connect(&socket_path)?;

    let mut payload = serde_json::to_string(message)?;
    payload.push('\n');
    socket.write_all(payload.as_bytes())?;
    let _ = socket.flush();

    if !message.expects_reply() {
        return Ok(None);
    }

    let mut reply = String::new();
    BufReader::new(socket).read_line(&mut reply)?;
    Ok(Some(serde_json::from_str(&reply)?))
}

/// Name of the IPC socket for the current environment.
pub fn socket_name() -> String {
    env::var(SOCKET_ENV).unwrap_or_else(|_| DEFAULT_SOCKET_NAME.into())
}

/// Path for the IPC socket file.
pub fn socket_path(socket_name: &str) -> PathBuf {
    dirs::runtime_dir().unwrap_or_else(env::temp_dir).join(format!("{socket_name}.sock"))
}
