//! Line-oriented console I/O.
//!
//! Everything the user sees goes through [`Console`]: listings, dry-run
//! notices and confirmation prompts. Input is read through a [`Prompter`]
//! so a fixed set of answers can stand in for a terminal.

use std::collections::VecDeque;
use std::fmt::Display;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::{Arc, Mutex};

use tracing::warn;

/// The only answer that counts as consent.
pub const AFFIRMATIVE: &str = "yes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

impl Confirmation {
    /// Only the line terminator is ignored; `" yes"` does not confirm.
    pub fn from_answer(answer: &str) -> Self {
        if answer.trim_end_matches(['\r', '\n']) == AFFIRMATIVE {
            Confirmation::Confirmed
        } else {
            Confirmation::Cancelled
        }
    }
}

/// Reads one line of user input for a prompt.
pub trait Prompter: Send {
    fn ask(&mut self, prompt: &str) -> io::Result<String>;
}

/// Prompter for the real process.
///
/// With stdin and stderr both on a terminal the prompt goes through
/// `dialoguer`. Otherwise the prompt is written to stdout and the answer is read as one
/// line from stdin, so `echo yes | schoolcal delete doit` works.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        // dialoguer draws on stderr and reads keys from the terminal
        if io::stdin().is_terminal() && ::console::user_attended_stderr() {
            return dialoguer::Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .map_err(io::Error::other);
        }

        LinePrompter::new(io::stdin().lock(), io::stdout()).read_answer(prompt)
    }
}

/// Writes the prompt to `out` and reads the answer as one line of `input`.
pub struct LinePrompter<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, out: W) -> Self {
        LinePrompter { input, out }
    }

    /// End of input is an error, which the console treats as a refusal.
    pub fn read_answer(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.out, "{} ", prompt)?;
        self.out.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no answer on input"));
        }
        // keep the prompt and whatever follows on separate lines
        writeln!(self.out)?;

        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: BufRead + Send, W: Write + Send> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        self.read_answer(prompt)
    }
}

/// Answers prompts from a fixed list; an exhausted list answers empty.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompter {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Arc::default(),
        }
    }

    /// Handle to the prompts shown so far.
    pub fn asked(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.asked)
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(prompt.to_string());
        }
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}

/// In-memory output that can be read back after the console is gone.
#[derive(Clone, Default)]
pub struct MemoryOutput(Arc<Mutex<Vec<u8>>>);

impl MemoryOutput {
    pub fn contents(&self) -> String {
        self.0
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for MemoryOutput {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("output buffer poisoned"))?
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct Console {
    out: Box<dyn Write + Send>,
    prompter: Box<dyn Prompter>,
}

impl Console {
    pub fn new(out: impl Write + Send + 'static, prompter: impl Prompter + 'static) -> Self {
        Console {
            out: Box::new(out),
            prompter: Box::new(prompter),
        }
    }

    /// Standard output plus interactive terminal prompts.
    pub fn stdio() -> Self {
        Console::new(io::stdout(), TerminalPrompter)
    }

    pub fn line(&mut self, msg: impl Display) {
        if let Err(e) = writeln!(self.out, "{}", msg) {
            warn!(error = %e, "failed to write console output");
        }
    }

    /// Ask for explicit consent. Anything but `yes` cancels, including
    /// a prompt that cannot be shown.
    pub fn confirm(&mut self, prompt: &str) -> Confirmation {
        let _ = self.out.flush();

        match self.prompter.ask(prompt) {
            Ok(answer) => Confirmation::from_answer(&answer),
            Err(e) => {
                warn!(error = %e, "could not read confirmation, treating as cancelled");
                Confirmation::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn only_yes_confirms() {
        assert_eq!(Confirmation::from_answer("yes"), Confirmation::Confirmed);
        assert_eq!(Confirmation::from_answer("yes\n"), Confirmation::Confirmed);
        assert_eq!(Confirmation::from_answer("yes\r\n"), Confirmation::Confirmed);
        for answer in ["", "y", "Yes", "YES", "yes please", "no", " yes", "yes ", " yes\n"] {
            assert_eq!(Confirmation::from_answer(answer), Confirmation::Cancelled, "{answer:?}");
        }
    }

    #[test]
    fn scripted_answers_run_out_as_cancel() {
        let mut console = Console::new(MemoryOutput::default(), ScriptedPrompter::new(["yes"]));
        assert_eq!(console.confirm("first?"), Confirmation::Confirmed);
        assert_eq!(console.confirm("second?"), Confirmation::Cancelled);
    }

    #[test]
    fn lines_are_captured() {
        let out = MemoryOutput::default();
        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        let asked = prompter.asked();
        let mut console = Console::new(out.clone(), prompter);

        console.line("Dry run: true");
        console.line(format_args!("Week {}", 2));
        console.confirm("Proceed? [yes/*]");

        assert_eq!(out.lines(), vec!["Dry run: true", "Week 2"]);
        assert_eq!(*asked.lock().unwrap(), vec!["Proceed? [yes/*]"]);
    }

    #[test]
    fn piped_answer_confirms() {
        let out = MemoryOutput::default();
        let prompter = LinePrompter::new(Cursor::new("yes\n"), out.clone());
        let mut console = Console::new(out.clone(), prompter);

        console.line("Found 1 Outlook events to be deleted:");
        assert_eq!(console.confirm("Proceed? [yes/*]"), Confirmation::Confirmed);
        console.line("Deleted 1 Outlook events.");

        assert_eq!(
            out.lines(),
            vec![
                "Found 1 Outlook events to be deleted:",
                "Proceed? [yes/*] ",
                "Deleted 1 Outlook events.",
            ]
        );
    }

    #[test]
    fn piped_answers_are_read_one_line_at_a_time() {
        let mut prompter = LinePrompter::new(Cursor::new("no\r\nyes\n"), io::sink());
        assert_eq!(prompter.ask("first?").unwrap(), "no");
        assert_eq!(prompter.ask("second?").unwrap(), "yes");
        assert_eq!(prompter.ask("third?").unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn closed_input_cancels() {
        let prompter = LinePrompter::new(Cursor::new(""), io::sink());
        let mut console = Console::new(MemoryOutput::default(), prompter);
        assert_eq!(console.confirm("Proceed? [yes/*]"), Confirmation::Cancelled);
    }

    #[test]
    fn padded_piped_answer_cancels() {
        let prompter = LinePrompter::new(Cursor::new(" yes \n"), io::sink());
        let mut console = Console::new(MemoryOutput::default(), prompter);
        assert_eq!(console.confirm("Proceed? [yes/*]"), Confirmation::Cancelled);
    }
}
