//! REPL line parsing.

/// Slash commands offered for completion and listed by `/help`.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/new", "start a new chat and switch to it"),
    ("/list", "list chats, newest first"),
    ("/select", "<n|id> switch to a chat"),
    ("/rename", "<n|id> <title> rename a chat"),
    ("/delete", "<n|id> delete a chat"),
    ("/show", "print the active chat"),
    ("/help", "show this help"),
];

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    List,
    Select(String),
    Rename { target: String, title: String },
    Delete(String),
    Show,
    Help,
    Quit,
    /// Anything that is not a command is a message for the assistant.
    Send(String),
    /// A known command used with the wrong arguments.
    Usage(&'static str),
    Unknown(String),
}

/// Parses a line. Blank lines yield `None`.
pub fn parse(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed == "quit" || trimmed == "exit" {
        return Some(Command::Quit);
    }
    if !trimmed.starts_with('/') {
        return Some(Command::Send(line.to_string()));
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };

    let command = match name {
        "/new" => Command::New,
        "/list" | "/ls" => Command::List,
        "/show" => Command::Show,
        "/help" | "/?" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        "/select" | "/switch" => match rest {
            "" => Command::Usage("/select <n|id>"),
            target => Command::Select(target.to_string()),
        },
        "/delete" | "/rm" => match rest {
            "" => Command::Usage("/delete <n|id>"),
            target => Command::Delete(target.to_string()),
        },
        "/rename" => match rest.split_once(char::is_whitespace) {
            Some((target, title)) => Command::Rename {
                target: target.to_string(),
                title: title.trim().to_string(),
            },
            None if !rest.is_empty() => Command::Rename {
                target: rest.to_string(),
                title: String::new(),
            },
            None => Command::Usage("/rename <n|id> <title>"),
        },
        other => Command::Unknown(other.to_string()),
    };
    Some(command)
}

/// Resolves a user-supplied session reference against `ids` (in list order).
///
/// Accepts a 1-based list position, an exact id, or an unambiguous id prefix.
pub fn resolve_target<'a>(target: &str, ids: &[&'a str]) -> Option<&'a str> {
    if let Ok(position) = target.parse::<usize>() {
        if let Some(id) = position.checked_sub(1).and_then(|i| ids.get(i)) {
            return Some(*id);
        }
    }
    if let Some(id) = ids.iter().copied().find(|id| *id == target) {
        return Some(id);
    }

    let mut matches = ids.iter().copied().filter(|id| id.starts_with(target));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Some(id),
        _ => None,
    }
}
