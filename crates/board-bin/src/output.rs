//! Output formatting for the CLI.

use board_protocol_types::Notification;
use clap::ValueEnum;
use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print output in the specified format.
pub fn print<T: Serialize + std::fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(_) => println!("{}", value),
        },
    }
}

/// Print a success message.
pub fn print_success(message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", message),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "status": "success", "message": message })
        ),
    }
}

/// Print an error message.
pub fn print_error(message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Error: {}", message),
        OutputFormat::Json => eprintln!(
            "{}",
            serde_json::json!({ "status": "error", "message": message })
        ),
    }
}

/// Format a labelled row.
pub fn row(label: &str, value: &str) -> String {
    format!("  {:<16} {}", format!("{}:", label), value)
}

/// One notification on one line: read marker, id, timestamp, type, title.
pub fn notification_line(notification: &Notification) -> String {
    let marker = if notification.is_read { ' ' } else { '*' };
    let kind = serde_json::to_value(notification.notification_type)
        .ok()
        .and_then(|value| value.as_str().map(String::from))
        .unwrap_or_default();

    let mut line = format!(
        "{} {:>6}  {}  [{}] {}",
        marker,
        notification.id.to_string(),
        notification.created_at.format("%Y-%m-%d %H:%M"),
        kind,
        notification.title
    );
    if !notification.message.is_empty() {
        line.push_str(" - ");
        line.push_str(&notification.message);
    }
    line
}
