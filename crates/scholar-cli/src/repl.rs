//! Line editor running on its own thread.
//!
//! rustyline blocks, so the editor is built and driven on a dedicated OS
//! thread that forwards every line to the async main loop. The thread
//! waits for the main loop to finish handling a line before showing the
//! next prompt, which keeps command output from being drawn over it.
//! Output that arrives while the prompt is showing goes through the
//! editor's external printer instead.

use std::sync::mpsc as std_mpsc;
use std::thread::{self, JoinHandle};

use rustyline::error::ReadlineError;
use rustyline::{Editor, ExternalPrinter};
use tokio::sync::mpsc;

use crate::helper::ReplHelper;

const PROMPT: &str = ">> ";

type Printer = Box<dyn ExternalPrinter + Send>;

#[derive(Debug)]
pub enum ReplInput {
    Line(String),
    Interrupted,
    Eof,
    Failed(String),
}

/// Handle the main loop uses to receive input and release the next prompt.
pub struct Repl {
    pub lines: mpsc::Receiver<ReplInput>,
    ready: std_mpsc::Sender<()>,
    printer: Option<Printer>,
    _thread: JoinHandle<()>,
}

impl Repl {
    pub fn spawn() -> anyhow::Result<Self> {
        let (line_tx, lines) = mpsc::channel::<ReplInput>(16);
        let (ready, ready_rx) = std_mpsc::channel::<()>();
        let (printer_tx, printer_rx) = std_mpsc::channel::<Option<Printer>>();

        let thread = thread::Builder::new()
            .name("scholar-readline".to_string())
            .spawn(move || {
                let mut editor = match Editor::new() {
                    Ok(editor) => editor,
                    Err(err) => {
                        let _ = line_tx.blocking_send(ReplInput::Failed(err.to_string()));
                        return;
                    }
                };
                editor.set_helper(Some(ReplHelper::new()));
                let printer = match editor.create_external_printer() {
                    Ok(printer) => Some(Box::new(printer) as Printer),
                    Err(err) => {
                        tracing::debug!("No external printer, using stdout: {}", err);
                        None
                    }
                };
                let _ = printer_tx.send(printer);

                loop {
                    let input = match editor.readline(PROMPT) {
                        Ok(line) => {
                            if !line.trim().is_empty() {
                                let _ = editor.add_history_entry(line.as_str());
                            }
                            ReplInput::Line(line)
                        }
                        Err(ReadlineError::Interrupted) => ReplInput::Interrupted,
                        Err(ReadlineError::Eof) => ReplInput::Eof,
                        Err(err) => ReplInput::Failed(err.to_string()),
                    };
                    let last = matches!(input, ReplInput::Eof | ReplInput::Failed(_));

                    if line_tx.blocking_send(input).is_err() || last {
                        break;
                    }
                    // Main loop dropped its side: shutting down.
                    if ready_rx.recv().is_err() {
                        break;
                    }
                }
            })?;

        // Sender dropped without a value: the editor failed to start.
        let printer = printer_rx.recv().ok().flatten();

        Ok(Self {
            lines,
            ready,
            printer,
            _thread: thread,
        })
    }

    /// Lets the editor show the next prompt.
    pub fn ready(&self) {
        let _ = self.ready.send(());
    }

    /// Prints above the prompt without disturbing the line being typed.
    pub fn print(&mut self, text: String) {
        match self.printer.as_mut() {
            Some(printer) => {
                if let Err(err) = printer.print(text.clone()) {
                    tracing::debug!("External printer failed: {}", err);
                    println!("{text}");
                }
            }
            None => println!("{text}"),
        }
    }
}
