use std::{env, process};

use clap::{Parser, Subcommand};
#[cfg(feature = "profiling")]
use profiling::puffin;
#[cfg(feature = "profiling")]
use puffin_http::Server;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use wlbox::headless;
use wlbox_ipc::{IpcMessage, ViewInfo};

/// Command line arguments.
#[derive(Parser, Debug)]
#[clap(author, about, version, max_term_width = 80)]
struct Options {
    /// Shell command executed after startup.
    #[clap(long)]
    pub startup: Option<String>,

    #[clap(subcommand)]
    pub subcommands: Option<Subcommands>,
}

#[derive(Subcommand, Debug)]
pub enum Subcommands {
    /// Send IPC messages to Wlbox.
    #[clap(subcommand)]
    Msg(IpcMessage),
}

pub fn main() {
    #[cfg(feature = "profiling")]
    let _server = {
        puffin::set_scopes_on(true);
        let address = format!("0.0.0.0:{}", puffin_http::DEFAULT_PORT);
        Server::new(&address).map_err(|err| eprintln!("puffin server failed: {err}")).ok()
    };

    // Setup logging.
    let directives = env::var("RUST_LOG").unwrap_or("warn,wlbox=info".into());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    FmtSubscriber::builder().with_env_filter(env_filter).with_line_number(true).init();

    let options = Options::parse();
    match options.subcommands {
        Some(Subcommands::Msg(msg)) => match wlbox_ipc::send_message(&msg) {
            Err(err) => eprintln!("\x1b[31merror\x1b[0m: {err}"),
            Ok(Some(IpcMessage::ViewsReply { views })) => views.iter().for_each(print_view),
            Ok(_) => (),
        },
        None => {
            if let Err(err) = headless::run(options.startup) {
                error!("{err}");
                process::exit(1);
            }
        },
    }
}

/// Print one line describing a window.
fn print_view(view: &ViewInfo) {
    let mut flags = Vec::new();
    if view.focused {
        flags.push("focused");
    }
    if view.maximized {
        flags.push("maximized");
    }
    if view.minimized {
        flags.push("minimized");
    }

    let (x, y, width, height) = (view.x, view.y, view.width, view.height);
    println!("{}\t{x},{y} {width}x{height}\t{}", view.id, flags.join(","));
}
