//! Maps REPL commands onto the session controller.

use scholar_application::{ApplyOutcome, Completion, InFlightReplies, SessionController};

use crate::commands::{Command, resolve_target};
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    controller: SessionController,
    in_flight: InFlightReplies,
}

impl App {
    pub fn new(controller: SessionController) -> Self {
        Self {
            controller,
            in_flight: InFlightReplies::new(),
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Number of replies still being waited on.
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Resolves when the next in-flight reply arrives.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.in_flight.next().await
    }

    pub fn show_active(&self) {
        match self.controller.active_session() {
            Some(session) => render::session(session),
            None => render::warn("No active chat. Use /new to start one."),
        }
    }

    pub fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Quit => return Flow::Quit,
            Command::Help => render::help(),
            Command::List => render::session_list(
                self.controller.sessions(),
                self.controller.active_session_id(),
            ),
            Command::Show => self.show_active(),
            Command::New => {
                self.controller.create_session();
                self.show_active();
            }
            Command::Select(target) => match self.resolve(&target) {
                Some(id) => {
                    self.controller.select_session(&id);
                    self.show_active();
                }
                None => render::warn(&format!("No chat matches '{target}'.")),
            },
            Command::Rename { target, title } => match self.resolve(&target) {
                Some(id) => {
                    self.controller.rename_session(&id, title.as_str());
                    render::info(&format!("Renamed chat to '{title}'."));
                }
                None => render::warn(&format!("No chat matches '{target}'.")),
            },
            Command::Delete(target) => match self.resolve(&target) {
                Some(id) => {
                    self.controller.delete_session(&id);
                    render::info("Chat deleted.");
                    if self.controller.active_session_id().is_none() {
                        render::warn("No chats left. Use /new to start one.");
                    }
                }
                None => render::warn(&format!("No chat matches '{target}'.")),
            },
            Command::Send(text) => self.send(&text),
            Command::Usage(usage) => render::warn(&format!("Usage: {usage}")),
            Command::Unknown(name) => {
                render::warn(&format!("Unknown command {name}. Type /help for commands."))
            }
        }

        self.report_persist_error();
        Flow::Continue
    }

    /// Applies an arrived reply.
    ///
    /// Returns what to print: the reply itself when its chat is on screen,
    /// otherwise a one-line notice. The caller prints it above the prompt.
    pub fn on_completion(&mut self, completion: Completion) -> Option<String> {
        let mut output = match self.controller.apply(completion) {
            ApplyOutcome::Appended {
                session_id,
                message_id,
            } => self.controller.session(&session_id).and_then(|session| {
                if self.controller.active_session_id() == Some(session_id.as_str()) {
                    session
                        .messages()
                        .iter()
                        .find(|m| m.id == message_id)
                        .map(render::message_text)
                } else {
                    Some(render::background_reply_text(session))
                }
            }),
            ApplyOutcome::Discarded => None,
        };

        if let Some(err) = self.controller.last_persist_error() {
            let line = render::error_text(&format!("Could not save chats: {err}"));
            output = Some(match output {
                Some(text) => format!("{text}\n{line}"),
                None => line,
            });
        }
        output
    }

    fn send(&mut self, text: &str) {
        let Some(pending) = self.controller.begin_send(text) else {
            render::warn("No active chat. Use /new or /select first.");
            return;
        };
        self.in_flight.push(self.controller.dispatch(pending));
        render::info("(waiting for the assistant...)");
    }

    fn resolve(&self, target: &str) -> Option<String> {
        let ids: Vec<&str> = self.controller.sessions().iter().map(|s| s.id.as_str()).collect();
        resolve_target(target, &ids).map(str::to_string)
    }

    fn report_persist_error(&self) {
        if let Some(err) = self.controller.last_persist_error() {
            render::error(&format!("Could not save chats: {err}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use scholar_core::session::UuidIdGenerator;
    use scholar_core::transport::{AssistantReply, ChatTransport, ChatTurn, TransportFailure};
    use scholar_infrastructure::InMemorySessionStore;

    use super::*;
    use crate::commands::parse;

    struct FixedTransport;

    #[async_trait::async_trait]
    impl ChatTransport for FixedTransport {
        async fn send(&self, _history: Vec<ChatTurn>) -> Result<AssistantReply, TransportFailure> {
            Ok(AssistantReply {
                content: "noted".to_string(),
                visualizations: Vec::new(),
            })
        }
    }

    fn app() -> App {
        App::new(SessionController::bootstrap(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(UuidIdGenerator),
            Arc::new(FixedTransport),
        ))
    }

    fn run(app: &mut App, line: &str) -> Flow {
        app.handle(parse(line).unwrap())
    }

    #[test]
    fn test_commands_drive_controller() {
        let mut app = app();

        run(&mut app, "/new");
        assert_eq!(app.controller().sessions().len(), 2);

        run(&mut app, "/rename 2 Physics");
        assert_eq!(app.controller().sessions()[1].title, "Physics");

        run(&mut app, "/select 2");
        let physics = app.controller().sessions()[1].id.clone();
        assert_eq!(app.controller().active_session_id(), Some(physics.as_str()));

        run(&mut app, "/delete 2");
        assert_eq!(app.controller().sessions().len(), 1);
        assert_ne!(app.controller().active_session_id(), Some(physics.as_str()));

        assert_eq!(run(&mut app, "quit"), Flow::Quit);
    }

    #[test]
    fn test_unmatched_target_changes_nothing() {
        let mut app = app();
        let before = app.controller().sessions().to_vec();

        run(&mut app, "/delete 9");
        run(&mut app, "/select nope");

        assert_eq!(app.controller().sessions(), before.as_slice());
    }

    #[tokio::test]
    async fn test_reply_lands_after_switching_chats() {
        let mut app = app();
        let first = app.controller().active_session_id().unwrap().to_string();

        run(&mut app, "what is entropy?");
        assert_eq!(app.pending(), 1);
        run(&mut app, "/new");

        let completion = app.next_completion().await.unwrap();
        let notice = app.on_completion(completion).unwrap();
        assert!(notice.contains("New reply in"));

        let texts: Vec<&str> = app
            .controller()
            .session(&first)
            .unwrap()
            .messages()
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts[1..], ["what is entropy?", "noted"]);
        assert_eq!(app.controller().active_messages().len(), 1);
        assert_eq!(app.pending(), 0);
    }

    #[tokio::test]
    async fn test_reply_for_chat_on_screen_is_returned_for_printing() {
        let mut app = app();

        run(&mut app, "what is entropy?");
        let completion = app.next_completion().await.unwrap();
        let shown = app.on_completion(completion).unwrap();

        assert!(shown.contains("noted"));
        assert!(!shown.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_reply_for_deleted_chat_prints_nothing() {
        let mut app = app();

        run(&mut app, "what is entropy?");
        run(&mut app, "/delete 1");
        let completion = app.next_completion().await.unwrap();

        assert_eq!(app.on_completion(completion), None);
    }
}
