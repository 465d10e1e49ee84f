use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::info;

use calbook::client::HttpBookingStore;
use calbook::command::{self, Command};
use calbook::config::Config;
use calbook::engine::{Controller, EditSession, Field};
use calbook::model::{BookingSet, Ms};
use calbook::notify::{Notice, NotifyHub};
use calbook::store::{BookingStore, InMemoryStore};
use calbook::wire::{local_time_label, to_datetime};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    calbook::observability::init(config.metrics_port)?;

    let store: Arc<dyn BookingStore> = match &config.backend_url {
        Some(url) => {
            info!("backend: {url}");
            Arc::new(HttpBookingStore::new(url.as_str(), config.request_timeout)?)
        }
        None => {
            info!("backend: in-memory (set CALBOOK_BACKEND_URL to use a server)");
            Arc::new(InMemoryStore::new())
        }
    };
    info!("  request_timeout: {:?}", config.request_timeout);

    let notify = Arc::new(NotifyHub::new());
    let mut notices = notify.subscribe();
    let mut controller = Controller::new(store, notify);
    let view = controller.refresh().await;
    print_notices(&mut notices);
    print_bookings(&view.bookings);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let cmd = match command::parse_command(&line) {
            Ok(cmd) => cmd,
            Err(command::CommandError::Empty) => continue,
            Err(e) => {
                println!("error: {e}");
                continue;
            }
        };
        match cmd {
            Command::Quit => break,
            Command::Help => println!("{}", command::HELP),
            Command::List => print_bookings(controller.bookings()),
            Command::Show => print_session(controller.session()),
            Command::Intent(intent) => match controller.dispatch(intent).await {
                Ok(view) => {
                    print_notices(&mut notices);
                    print_session(view.session.as_ref());
                }
                Err(e) => println!("error: {e}"),
            },
        }
    }

    info!("calbook stopped");
    Ok(())
}

fn print_notices(rx: &mut broadcast::Receiver<Notice>) {
    while let Ok(notice) = rx.try_recv() {
        match notice {
            Notice::Alert(msg) => println!("!! {msg}"),
            Notice::Refreshed { count } => println!("({count} bookings loaded)"),
        }
    }
}

fn print_bookings(bookings: &BookingSet) {
    if bookings.is_empty() {
        println!("no bookings");
        return;
    }
    for b in bookings.iter() {
        let day = to_datetime(b.span.start)
            .map(|dt| dt.with_timezone(&chrono::Local).format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let id = b.id.map(|id| id.to_string()).unwrap_or_default();
        let struck = if b.canceled { " (canceled)" } else { "" };
        println!(
            "{id}  {day} {}  {}{struck}",
            local_time_label(&b.span),
            b.title()
        );
    }
}

fn print_session(session: Option<&EditSession>) {
    let Some(session) = session else {
        println!("(no booking open)");
        return;
    };
    let d = session.draft();
    let fmt_time = |t: Option<Ms>| {
        t.and_then(|t| to_datetime(t).ok())
            .map(|dt| dt.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    println!("[{:?}] {}", session.mode(), d.id.map(|id| id.to_string()).unwrap_or_default());
    let report = session.report();
    let rows = [
        (Field::Name, d.name.clone()),
        (Field::Start, fmt_time(d.start)),
        (Field::End, fmt_time(d.end)),
    ];
    for (field, value) in rows {
        let msg = report.message(field);
        if msg.is_empty() {
            println!("  {:<6} {value}", field.as_str());
        } else {
            println!("  {:<6} {value}  <- {msg}", field.as_str());
        }
    }
    println!("  blocked {}", d.blocked);
    if let Some(label) = session.save_label() {
        println!("  (save = {label})");
    }
    if let Some(label) = session.remove_label() {
        println!("  (remove = {label})");
    }
}
