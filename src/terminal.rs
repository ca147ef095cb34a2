use std::io;
use std::io::{IsTerminal, Write};
use async_trait::async_trait;
use log::trace;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use crate::data::Note;
use crate::workspace::Confirm;

pub mod render;

/// Line-oriented user interaction.
#[async_trait]
pub trait Console: Send {
    /// `None` at end of input. Cancel safe.
    async fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Must not be raced against anything: a cancelled read may still
    /// consume the password.
    async fn read_password(&mut self) -> io::Result<Option<String>>;

    fn write(&mut self, text: &str) -> io::Result<()>;
}

pub struct Terminal {
    lines: Lines<BufReader<Stdin>>,
    interactive: bool,
}

impl Terminal {
    pub fn new() -> Self {
        let interactive = io::stdin().is_terminal();
        trace!("terminal is interactive: {interactive}");
        Terminal {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            interactive,
        }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for Terminal {
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }

    async fn read_password(&mut self) -> io::Result<Option<String>> {
        if !self.interactive {
            return self.lines.next_line().await
        }
        // the prompt has already been written
        tokio::task::spawn_blocking(rpassword::read_password)
            .await
            .map_err(io::Error::other)?
            .map(Some)
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()
    }
}

/// Asks for a deletion confirmation on a console, anything but `y`/`yes`
/// (and any I/O failure) means no.
pub struct ConsoleConfirm<'a, C: Console> {
    console: &'a mut C,
}

impl<'a, C: Console> ConsoleConfirm<'a, C> {
    pub fn new(console: &'a mut C) -> Self {
        ConsoleConfirm { console }
    }
}

#[async_trait]
impl<C: Console> Confirm for ConsoleConfirm<'_, C> {
    async fn confirm_delete(&mut self, note: &Note) -> bool {
        if self.console.write(&render::delete_prompt(note)).is_err() {
            return false
        }
        match self.console.read_line().await {
            Ok(Some(answer)) => matches!(
                answer.trim().to_lowercase().as_str(),
                "y" | "yes",
            ),
            _ => false,
        }
    }
}
