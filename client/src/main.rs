use clap::Parser;
use client::completion::{CompletionList, DEFAULT_COMMANDS_FILE};
use client::config::{Preferences, DEFAULT_PREFERENCES_FILE};
use client::session::{Session, SessionCommand, SessionEvent};
use log::info;
use protocol::{Server, DEFAULT_PORT};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server to connect to as host[:port]; overrides --host and --port
    #[arg(long, value_name = "HOST:PORT")]
    connect: Option<String>,

    /// Server host name or address
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Remote console password
    #[arg(
        short = 'P',
        long,
        env = "RCON_PASSWORD",
        hide_env_values = true,
        default_value = ""
    )]
    password: String,

    /// Preferences file (JSON)
    #[arg(long, default_value = DEFAULT_PREFERENCES_FILE)]
    preferences: PathBuf,

    /// Directory for per-server transcript logs
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,

    /// Command list used for `?prefix` completion lookups
    #[arg(long, default_value = DEFAULT_COMMANDS_FILE)]
    commands: PathBuf,

    /// Render console colors with ANSI escapes
    #[arg(long)]
    color: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let server = match &args.connect {
        Some(addr) => addr.parse::<Server>()?,
        None => Server::new(args.host.clone(), args.port),
    };
    let preferences = Preferences::load(&args.preferences);
    let completions = CompletionList::load(&args.commands);

    info!("Connecting to {}", server);
    info!(
        "Polling status every {:?}, transcript {}",
        preferences.status_interval(),
        if preferences.logging_enabled { "on" } else { "off" }
    );
    info!("Loaded {} completion commands", completions.len());
    info!("Type a command to send it; :status, :serverinfo, ?prefix, :quit");

    let session = Session::connect(server, args.password, preferences, &args.log_dir).await?;

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let session_handle = tokio::spawn(session.run(cmd_rx, event_tx));

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let command = match line.trim() {
                "" => continue,
                ":quit" => break,
                ":status" => SessionCommand::Status,
                ":serverinfo" => SessionCommand::ServerInfo,
                text => match text.strip_prefix('?') {
                    Some(prefix) => {
                        println!("{}", completions.matches(prefix).join("  "));
                        continue;
                    }
                    None => SessionCommand::Send(text.to_string()),
                },
            };

            if cmd_tx.send(command).is_err() {
                return;
            }
        }

        let _ = cmd_tx.send(SessionCommand::Disconnect);
    });

    let mut last_summary = String::new();
    while let Some(event) = event_rx.recv().await {
        match event {
            SessionEvent::Status { status, ping } => {
                // Ping changes every poll, so only report map/player changes.
                let summary = format!("{} | {}", status.title(None), status.summary());
                if summary != last_summary {
                    let title = status.title(ping.map(|p| p.as_millis() as u64));
                    info!("{} | {}", title, status.summary());
                    last_summary = summary;
                }
            }
            SessionEvent::Output(lines) => {
                for line in lines {
                    if args.color {
                        println!("{}", line.to_ansi());
                    } else {
                        println!("{}", line.to_plain_text());
                    }
                }
            }
            SessionEvent::CommandSent(command) => println!("> {}", command),
            SessionEvent::Closed => break,
        }
    }

    session_handle.await??;

    Ok(())
}
