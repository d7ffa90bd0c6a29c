//! Line-oriented chat loop over a streaming session client.

use anyhow::Result;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::bootstrap::Assistant;

#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Exit,
    Help,
    Status,
    Sessions,
    Empty,
    Message(&'a str),
}

pub fn parse_command(line: &str) -> Command<'_> {
    match line.trim() {
        "" => Command::Empty,
        "exit" | "quit" => Command::Exit,
        "help" => Command::Help,
        "status" => Command::Status,
        "sessions" => Command::Sessions,
        text => Command::Message(text),
    }
}

/// Write one streamed chunk. Output errors are logged and do not end the turn.
fn write_chunk(out: &mut impl Write, chunk: &str) {
    if let Err(e) = out.write_all(chunk.as_bytes()).and_then(|_| out.flush()) {
        debug!("failed to write streamed chunk: {}", e);
    }
}

pub struct Repl {
    assistant: Assistant,
}

impl Repl {
    pub fn new(assistant: Assistant) -> Self {
        Self { assistant }
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("Safety Assist ({})", self.assistant.context.persona());
        println!("Type 'help' for commands.");
        println!();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("you> ");
            io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_command(&line) {
                Command::Empty => continue,
                Command::Exit => break,
                Command::Help => {
                    println!("  exit, quit  leave the assistant");
                    println!("  status      show session details");
                    println!("  sessions    list your saved sessions");
                    println!("  help        show this message");
                    println!();
                }
                Command::Status => self.print_status(),
                Command::Sessions => self.print_sessions().await,
                Command::Message(text) => {
                    print!("assistant> ");
                    io::stdout().flush()?;
                    let response = self
                        .assistant
                        .client
                        .stream_message(text, &mut |chunk: &str| {
                            write_chunk(&mut io::stdout(), chunk)
                        })
                        .await;
                    println!();
                    if !response.function_calls_performed.is_empty() {
                        let names: Vec<&str> = response
                            .function_calls_performed
                            .iter()
                            .map(|c| c.name.as_str())
                            .collect();
                        println!("  [tools: {}]", names.join(", "));
                    }
                    println!();
                }
            }
        }

        println!("Goodbye.");
        Ok(())
    }

    fn print_status(&self) {
        let ctx = &self.assistant.context;
        println!("  Session: {}", self.assistant.client.session_id().unwrap_or("-"));
        println!("  Persona: {}", ctx.persona());
        println!("  Organization: {}", ctx.organization_id());
        println!("  User: {}", ctx.user_id());
        println!("  Locale: {}", ctx.locale());
        println!("  Tools registered: {}", self.assistant.tool_count);
        println!("  Messages: {}", self.assistant.client.history().len());
        println!();
    }

    async fn print_sessions(&self) {
        let user = self.assistant.context.user_id();
        match self.assistant.store.list_sessions_for_user(user).await {
            Ok(sessions) if sessions.is_empty() => println!("  No saved sessions."),
            Ok(sessions) => {
                for meta in sessions {
                    println!(
                        "  {}  {}  {}",
                        meta.id,
                        meta.persona,
                        meta.created_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
            Err(e) => eprintln!("  Failed to list sessions: {}", e),
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("  exit "), Command::Exit);
        assert_eq!(parse_command("quit"), Command::Exit);
        assert_eq!(parse_command(""), Command::Empty);
        assert_eq!(parse_command("sessions"), Command::Sessions);
        assert_eq!(
            parse_command(" Any open incidents? "),
            Command::Message("Any open incidents?")
        );
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_write_chunk_appends_text() {
        let mut out = Vec::new();
        write_chunk(&mut out, "Two open ");
        write_chunk(&mut out, "incidents.");
        assert_eq!(String::from_utf8(out).unwrap(), "Two open incidents.");
    }

    #[test]
    fn test_write_chunk_tolerates_closed_output() {
        let mut out = BrokenPipe;
        write_chunk(&mut out, "ignored");
        write_chunk(&mut out, "still ignored");
    }
}
