use std::{
    fmt::Display,
    io::{BufRead, Write},
};

use anyhow::Result;

/// Stdin reached end of file while a prompt was waiting.
#[derive(Debug, thiserror::Error)]
#[error("input closed")]
pub(crate) struct InputClosed;

const TIME_PROMPT: &str =
    "How much time do you have right now? Please enter in minutes. (e.g., 30, 60, 90): ";

// ── Line prompter ─────────────────────────────────────────────────────────────

/// Line-oriented questions with validation. Invalid answers re-prompt here and
/// never reach the session.
pub(crate) struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub(crate) fn into_output(self) -> W {
        self.output
    }

    pub(crate) fn say(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    pub(crate) fn say_lines(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            writeln!(self.output, "{line}")?;
        }
        self.output.flush()?;
        Ok(())
    }

    /// Print `prompt` and read one trimmed line.
    pub(crate) fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputClosed.into());
        }
        Ok(line.trim().to_string())
    }

    /// Non-empty goal text. Whether it makes sense is checked by the caller.
    pub(crate) fn goal(&mut self) -> Result<String> {
        loop {
            let goal = self.ask("Your goal: ")?;
            if !goal.is_empty() {
                return Ok(goal);
            }
            self.say("No goal entered.")?;
        }
    }

    pub(crate) fn time_available(&mut self) -> Result<u32> {
        self.say("")?;
        loop {
            let raw = self.ask(TIME_PROMPT)?;
            if raw.is_empty() {
                self.say("No time entered. Please enter.")?;
                continue;
            }
            match raw.parse::<i64>() {
                Ok(n) if n > 0 => match u32::try_from(n) {
                    Ok(minutes) => return Ok(minutes),
                    Err(_) => self.say("That's more time than I can plan for.")?,
                },
                Ok(_) => self.say("Please enter a positive number.")?,
                Err(_) => self.say("Please enter a number (e.g., 30, 60, 90).")?,
            }
        }
    }

    /// Lowercased answer that is one of `options`.
    pub(crate) fn menu_choice(&mut self, options: &[&str], prompt: &str) -> Result<String> {
        loop {
            let choice = self.ask(prompt)?.to_lowercase();
            if options.contains(&choice.as_str()) {
                return Ok(choice);
            }
            self.say("Invalid choice. Please try again.")?;
        }
    }

    /// 1-based task number, or `None` when the user types `back`.
    pub(crate) fn task_number(&mut self, max: usize) -> Result<Option<u32>> {
        self.say("")?;
        self.say("Type 'back' to go back")?;
        self.say("")?;
        loop {
            let raw = self.ask("Enter task number: ")?;
            if raw.eq_ignore_ascii_case("back") {
                return Ok(None);
            }
            match raw.parse::<usize>() {
                Ok(n) if (1..=max).contains(&n) => return Ok(Some(n as u32)),
                Ok(_) => self.say(format!("Please enter a number between 1 and {max}."))?,
                Err(_) => self.say("Invalid input. Please enter a number.")?,
            }
        }
    }

    /// New duration for a task. `None` leaves it unchanged.
    pub(crate) fn new_time(&mut self, description: &str, current: u32) -> Result<Option<u32>> {
        let raw = self.ask(&format!(
            "New time for '{description}' (current: {current} min): "
        ))?;
        self.positive_minutes(&raw)
    }

    pub(crate) fn extra_time(&mut self) -> Result<Option<u32>> {
        self.say("")?;
        let raw = self.ask("How many more minutes do you need? ")?;
        self.positive_minutes(&raw)
    }

    /// Focus area for a regeneration, `None` on a blank answer.
    pub(crate) fn focus(&mut self) -> Result<Option<String>> {
        self.say("")?;
        let focus = self.ask("What would you like to focus on instead? (Press Enter to cancel): ")?;
        Ok((!focus.is_empty()).then_some(focus))
    }

    fn positive_minutes(&mut self, raw: &str) -> Result<Option<u32>> {
        match raw.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            Ok(_) => {
                self.say("Invalid time.")?;
                Ok(None)
            }
            Err(_) => {
                self.say("Invalid input. Please enter a number.")?;
                Ok(None)
            }
        }
    }
}
