// remindme: schedule desktop notifications from the command line
//
// One-shot commands submit reminders to a resident watcher started
// with --watch. The transport (Unix socket or shared JSON document)
// is selected by REMINDME_TRANSPORT.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;

use remindme::reminder::client;
use remindme::reminder::clock;
use remindme::reminder::config::{Config, Transport};
use remindme::reminder::daemon;
use remindme::reminder::notify::{DesktopNotifier, Notifier};
use remindme::reminder::persistence;
use remindme::reminder::protocol::{DaemonRequest, DaemonResponse, Reminder};

fn print_help() {
    println!(
        r#"remindme - schedule desktop notifications

USAGE:
    remindme <COMMAND> [ARGS]

COMMANDS:
    in <duration> <message>    Remind after a relative delay (30s, 25m, 2h)
    at <HH:MM> <message>       Remind at a clock time today (24-hour)
    p <start|stop>             Control the Pomodoro cycle (socket transport only)
    --watch                    Run the resident watcher
    help                       Show this help message

ENVIRONMENT:
    REMINDME_TRANSPORT    "socket" (default) or "file"
    REMINDME_DIR          Override the state and runtime directories

EXAMPLES:
    remindme in 25m stand up and stretch
    remindme at 15:04 daily standup!        (trailing ! makes it critical)
    remindme p start
    remindme --watch
"#
    );
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        std::process::exit(2);
    }

    let config = Config::from_env();
    let transport = Transport::from_env();

    match args[1].as_str() {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }

        "in" | "at" => {
            if args.len() < 3 {
                eprintln!("Usage: remindme in <duration> <message>");
                eprintln!("       remindme at <HH:MM> <message>");
                std::process::exit(2);
            }

            let now = Local::now();
            let deadline = match args[1].as_str() {
                "in" => clock::parse_relative(&args[2], now),
                _ => clock::parse_clock(&args[2], now),
            };
            let deadline = match deadline {
                Ok(deadline) => deadline,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    eprintln!("Run 'remindme help' for the accepted time formats");
                    std::process::exit(2);
                }
            };

            let message = args[3..].join(" ");
            submit_reminder(&config, transport, Reminder::plain(deadline, message))
        }

        "p" => {
            if args.len() < 3 {
                eprintln!("Usage: remindme p <start|stop>");
                std::process::exit(2);
            }
            if transport == Transport::File {
                eprintln!("Error: Pomodoro control needs the socket transport");
                std::process::exit(2);
            }

            let (request, done) = match args[2].as_str() {
                "start" => (DaemonRequest::PomodoroStart, "Pomodoro started"),
                "stop" => (DaemonRequest::PomodoroStop, "Pomodoro stopped"),
                other => {
                    eprintln!("Unknown Pomodoro action: {}", other);
                    eprintln!("Usage: remindme p <start|stop>");
                    std::process::exit(2);
                }
            };

            let mut stream = client::connect(&config)?;
            match client::send_request(&mut stream, &request)? {
                DaemonResponse::Accepted { .. } => {
                    println!("{}", done);
                    Ok(())
                }
                DaemonResponse::Error { message } => {
                    eprintln!("Error: {}", message);
                    std::process::exit(1);
                }
            }
        }

        "--watch" => {
            init_tracing();

            let runtime = tokio::runtime::Runtime::new()
                .context("Failed to start the watcher runtime")?;
            let notifier: Arc<dyn Notifier> = Arc::new(DesktopNotifier);

            match transport {
                Transport::Socket => runtime.block_on(daemon::run(config, notifier)),
                Transport::File => runtime.block_on(daemon::run_file_watcher(config, notifier)),
            }
        }

        other => {
            eprintln!("Unknown command: {}", other);
            print_help();
            std::process::exit(2);
        }
    }
}

fn submit_reminder(config: &Config, transport: Transport, reminder: Reminder) -> Result<()> {
    let deadline = reminder.deadline;

    match transport {
        Transport::Socket => {
            let mut stream = client::connect(config)?;
            let request = DaemonRequest::Submit { reminder };
            match client::send_request(&mut stream, &request)? {
                DaemonResponse::Accepted { deadline } => {
                    println!("Reminder scheduled for {}", deadline.format("%H:%M:%S"));
                    Ok(())
                }
                DaemonResponse::Error { message } => {
                    eprintln!("Error: {}", message);
                    std::process::exit(1);
                }
            }
        }

        Transport::File => {
            persistence::update_reminders(config, |reminders| reminders.push(reminder))?;
            println!("Reminder scheduled for {}", deadline.format("%H:%M:%S"));
            Ok(())
        }
    }
}

// stderr only; one-shot commands keep stdout for their own output
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
