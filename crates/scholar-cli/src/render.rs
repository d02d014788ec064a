//! Terminal rendering of sessions and messages.

use colored::Colorize;
use scholar_core::session::{Message, Sender, Session};

use crate::commands::COMMANDS;

pub fn banner() {
    println!("{}", "=== Scholar ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a question to ask the assistant, '/help' for commands, or 'quit' to exit."
            .bright_black()
    );
    println!();
}

pub fn help() {
    for (name, description) in COMMANDS {
        println!("  {} {}", format!("{name:<8}").bright_cyan(), description.bright_black());
    }
    println!("  {} {}", format!("{:<8}", "quit").bright_cyan(), "exit Scholar".bright_black());
}

/// One line per session, marking the active one.
pub fn session_list(sessions: &[Session], active_id: Option<&str>) {
    if sessions.is_empty() {
        println!("{}", "No chats. Use /new to start one.".bright_black());
        return;
    }
    for (index, session) in sessions.iter().enumerate() {
        let marker = if Some(session.id.as_str()) == active_id { "*" } else { " " };
        let title = if session.title.is_empty() {
            "(untitled)".italic().to_string()
        } else {
            session.title.bold().to_string()
        };
        println!(
            "{} {:>2}. {} {} {}",
            marker.bright_green(),
            index + 1,
            title,
            format!("[{}]", short_id(&session.id)).bright_black(),
            format!(
                "{} messages, {}",
                session.messages().len(),
                session.created_at.format("%Y-%m-%d %H:%M")
            )
            .bright_black()
        );
    }
}

pub fn session(session: &Session) {
    println!("{}", format!("--- {} ---", session.title).bright_magenta());
    for message in session.messages() {
        self::message(message);
    }
}

pub fn message(message: &Message) {
    println!("{}", message_text(message));
}

/// A message as printable lines, without a trailing newline.
pub fn message_text(message: &Message) -> String {
    let time = message
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%H:%M")
        .to_string();
    let mut lines = Vec::new();
    match message.sender {
        Sender::User => {
            lines.push(format!("{} {}", time.bright_black(), "you".green().bold()));
            for line in message.text.lines() {
                lines.push(format!("  {}", line.green()));
            }
        }
        Sender::Assistant => {
            lines.push(format!("{} {}", time.bright_black(), "scholar".bright_blue().bold()));
            for line in message.text.lines() {
                lines.push(format!("  {}", line.bright_blue()));
            }
        }
    }
    for visualization in &message.visualizations {
        let size = visualization
            .image
            .decode()
            .map(|bytes| format!("{} bytes", bytes.len()))
            .unwrap_or_else(|_| "undecodable image".to_string());
        lines.push(format!(
            "  {} {}: {} {}",
            "[chart]".yellow(),
            visualization.title.bold(),
            visualization.description,
            format!("({size})").bright_black()
        ));
    }
    lines.join("\n")
}

/// Notice for a reply that landed in a chat other than the one on screen.
pub fn background_reply_text(session: &Session) -> String {
    format!(
        "New reply in '{}' [{}]. Use /select to view it.",
        session.title,
        short_id(&session.id)
    )
    .yellow()
    .to_string()
}

pub fn info(text: &str) {
    println!("{}", text.bright_black());
}

pub fn warn(text: &str) {
    println!("{}", text.yellow());
}

pub fn error(text: &str) {
    eprintln!("{}", error_text(text));
}

pub fn error_text(text: &str) -> String {
    text.red().to_string()
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
