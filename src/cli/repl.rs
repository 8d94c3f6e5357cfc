//! Line-oriented chat loop.
//!
//! Reads one line at a time from stdin. Lines starting with `/` are commands;
//! anything else is sent as a message and the reply is printed as it streams.

use std::future::Future;
use std::io::Write;

use color_eyre::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::debug;

use crate::client::ChatClient;
use crate::config::ClientConfig;
use crate::models::{ConversationSummary, Sender};
use crate::session::{SessionController, SessionState};
use crate::traits::HttpClient;

pub const HELP: &str = "\
Commands:
  /new         start a new conversation
  /end         end the current conversation
  /list        list conversations
  /open <id>   open a conversation
  /refresh     reload the current conversation
  /help        show this help
  /quit        exit
Ctrl-C while a reply is streaming cancels it.";

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Send(String),
    New,
    End,
    List,
    Open(i64),
    Refresh,
    Help,
    Quit,
    Invalid(String),
    Empty,
}

pub fn parse_line(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplCommand::Empty;
    }
    if !trimmed.starts_with('/') {
        return ReplCommand::Send(line.trim_end_matches(['\r', '\n']).to_string());
    }

    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let argument = parts.next();
    match (command, argument) {
        ("/new", None) => ReplCommand::New,
        ("/end", None) => ReplCommand::End,
        ("/list", None) => ReplCommand::List,
        ("/refresh", None) => ReplCommand::Refresh,
        ("/help", _) => ReplCommand::Help,
        ("/quit" | "/exit", _) => ReplCommand::Quit,
        ("/open", Some(id)) => match id.parse::<i64>() {
            Ok(id) if id > 0 => ReplCommand::Open(id),
            _ => ReplCommand::Invalid(format!("invalid conversation id '{}'", id)),
        },
        ("/open", None) => ReplCommand::Invalid("/open needs a conversation id".to_string()),
        _ => ReplCommand::Invalid(format!("unknown command '{}' (try /help)", command)),
    }
}

/// Prints the assistant reply of one exchange incrementally.
///
/// Snapshots may be skipped; every call prints whatever the in-progress
/// message gained since the last one.
#[derive(Debug, Default)]
pub struct ReplyPrinter {
    /// Messages present before the send
    baseline: usize,
    /// Bytes of the in-progress message already printed
    shown: usize,
    printed_any: bool,
}

impl ReplyPrinter {
    pub fn new(baseline: usize) -> Self {
        Self {
            baseline,
            ..Self::default()
        }
    }

    pub fn update(&mut self, state: &SessionState, out: &mut impl Write) -> std::io::Result<()> {
        let Some(sentinel) = state.sentinel() else {
            return Ok(());
        };
        let content = &sentinel.content;
        if content.len() < self.shown || !content.is_char_boundary(self.shown) {
            // A new reply started after a confirmed one
            writeln!(out)?;
            self.shown = 0;
        }
        out.write_all(content[self.shown..].as_bytes())?;
        out.flush()?;
        self.shown = content.len();
        self.printed_any |= !content.is_empty();
        Ok(())
    }

    /// Print the rest of the final reply and end the line.
    pub fn finish(&mut self, state: &SessionState, out: &mut impl Write) -> std::io::Result<()> {
        let reply = state
            .messages
            .iter()
            .skip(self.baseline)
            .rev()
            .find(|m| m.sender == Sender::Assistant);

        if let Some(reply) = reply {
            let content = &reply.content;
            if !self.printed_any {
                out.write_all(content.as_bytes())?;
            } else if content.len() > self.shown && content.is_char_boundary(self.shown) {
                out.write_all(content[self.shown..].as_bytes())?;
            }
        }
        writeln!(out)?;
        out.flush()
    }
}

fn print_transcript(state: &SessionState) {
    if let Some(conversation) = &state.conversation {
        println!("== {} ==", conversation.display_title());
    }
    for message in &state.messages {
        let who = match message.sender {
            Sender::User => "you",
            Sender::Assistant => "ai",
        };
        println!("{}> {}", who, message.content);
    }
}

fn print_summaries(summaries: &[ConversationSummary]) {
    if summaries.is_empty() {
        println!("No conversations yet.");
        return;
    }
    for summary in summaries {
        let title = if summary.title.trim().is_empty() {
            "New conversation"
        } else {
            summary.title.as_str()
        };
        println!(
            "{:>5}  {:<6}  {}  ({} messages)",
            summary.id,
            format!("{:?}", summary.status).to_lowercase(),
            title,
            summary.message_count
        );
    }
}

fn report_error(state: &SessionState) {
    if let Some(error) = &state.last_error {
        eprintln!("error: {}", error);
    }
}

/// Print the conversation list once.
pub async fn list<H: HttpClient>(client: &ChatClient<H>) -> Result<()> {
    let summaries = client.list_conversations().await?;
    print_summaries(&summaries);
    Ok(())
}

async fn send<H: HttpClient>(session: &mut SessionController<H>, text: &str, streaming: bool) {
    let mut rx = session.subscribe();
    rx.borrow_and_update();
    let mut printer = ReplyPrinter::new(session.state().messages.len());
    let mut stdout = std::io::stdout();
    let mut cancelled = false;

    {
        let exchange = session.send_message(text, streaming);
        tokio::pin!(exchange);
        loop {
            tokio::select! {
                _ = &mut exchange => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = rx.borrow_and_update().clone();
                    if let Err(e) = printer.update(&snapshot, &mut stdout) {
                        debug!(error = %e, "Failed to write reply");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    cancelled = true;
                    break;
                }
            }
        }
    }

    if cancelled {
        session.start_new_conversation();
        println!("\n[cancelled, starting a new conversation]");
        return;
    }

    if let Err(e) = printer.finish(session.state(), &mut stdout) {
        debug!(error = %e, "Failed to write reply");
    }
    report_error(session.state());
}

/// Outcome of waiting at the prompt.
#[derive(Debug, PartialEq)]
enum Input {
    Line(String),
    Interrupted,
    Closed,
}

/// Wait for the next input line, or for `interrupt` to fire first.
///
/// Once a Ctrl-C handler is installed the default SIGINT exit is gone, so the
/// idle prompt has to watch for it too. An `interrupt` that fails is ignored.
async fn next_input<R, I>(lines: &mut Lines<R>, interrupt: I) -> std::io::Result<Input>
where
    R: AsyncBufRead + Unpin,
    I: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        line = lines.next_line() => Ok(match line? {
            Some(line) => Input::Line(line),
            None => Input::Closed,
        }),
        Ok(()) = interrupt => Ok(Input::Interrupted),
    }
}

/// Run the interactive loop until `/quit`, Ctrl-C at the prompt, or end of input.
pub async fn run(config: ClientConfig, resume: Option<i64>) -> Result<()> {
    let streaming = config.streaming;
    let client = ChatClient::from_config(config)?;
    let mut session = SessionController::new(client).with_observer(|| {
        debug!("Conversation list is stale");
    });

    if let Some(id) = resume {
        session.open_conversation(id).await;
        report_error(session.state());
        print_transcript(session.state());
    }

    println!("Type a message, or /help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match next_input(&mut lines, tokio::signal::ctrl_c()).await? {
            Input::Line(line) => line,
            Input::Interrupted => {
                println!();
                break;
            }
            Input::Closed => break,
        };
        match parse_line(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Send(text) => send(&mut session, &text, streaming).await,
            ReplCommand::New => {
                session.start_new_conversation();
                println!("Started a new conversation.");
            }
            ReplCommand::End => {
                if session.state().conversation.is_none() {
                    println!("No conversation to end.");
                    continue;
                }
                session.end_conversation().await;
                if session.state().conversation.is_none() {
                    println!("Conversation ended.");
                } else {
                    report_error(session.state());
                }
            }
            ReplCommand::List => {
                if let Err(e) = list(session.client()).await {
                    eprintln!("error: {}", e);
                }
            }
            ReplCommand::Open(id) => {
                session.open_conversation(id).await;
                report_error(session.state());
                print_transcript(session.state());
            }
            ReplCommand::Refresh => {
                session.refresh_conversation().await;
                print_transcript(session.state());
            }
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Quit => break,
            ReplCommand::Invalid(message) => eprintln!("{}", message),
        }
    }

    Ok(())
}
