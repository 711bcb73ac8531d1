use std::{
    io::{self, IsTerminal, Write},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    style::Stylize,
    terminal::{self, Clear, ClearType},
};
use tracing::debug;

use crate::types::TimerOutcome;
use crate::ui::symbols::Symbols;

const TICK: Duration = Duration::from_secs(1);
const BAR_WIDTH: usize = 20;

// ── Countdown state machine ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CountdownState {
    Running,
    Paused,
    Elapsed,
    StoppedEarly,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyAction {
    FinishEarly,
    TogglePause,
    Cancel,
}

/// Seconds left on one task, advanced by whole-second ticks.
#[derive(Debug, Clone)]
pub(crate) struct Countdown {
    total_secs: u64,
    remaining_secs: u64,
    state: CountdownState,
}

impl Countdown {
    pub(crate) fn new(minutes: u32) -> Self {
        let total_secs = u64::from(minutes) * 60;
        Self {
            total_secs,
            remaining_secs: total_secs,
            state: if total_secs == 0 {
                CountdownState::Elapsed
            } else {
                CountdownState::Running
            },
        }
    }

    pub(crate) fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// One second passes. Only a running countdown moves.
    pub(crate) fn tick(&mut self) {
        if self.state != CountdownState::Running {
            return;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.state = CountdownState::Elapsed;
        }
    }

    pub(crate) fn toggle_pause(&mut self) {
        self.state = match self.state {
            CountdownState::Running => CountdownState::Paused,
            CountdownState::Paused => CountdownState::Running,
            other => other,
        };
    }

    pub(crate) fn finish_early(&mut self) {
        if self.is_live() {
            self.state = CountdownState::StoppedEarly;
        }
    }

    pub(crate) fn cancel(&mut self) {
        if self.is_live() {
            self.state = CountdownState::Cancelled;
        }
    }

    pub(crate) fn apply(&mut self, action: KeyAction) {
        match action {
            KeyAction::FinishEarly => self.finish_early(),
            KeyAction::TogglePause => self.toggle_pause(),
            KeyAction::Cancel => self.cancel(),
        }
    }

    fn is_live(&self) -> bool {
        matches!(self.state, CountdownState::Running | CountdownState::Paused)
    }

    /// `None` while the countdown can still change.
    pub(crate) fn outcome(&self) -> Option<TimerOutcome> {
        match self.state {
            CountdownState::Running | CountdownState::Paused => None,
            CountdownState::Elapsed => Some(TimerOutcome::Elapsed),
            CountdownState::StoppedEarly => Some(TimerOutcome::StoppedEarly),
            CountdownState::Cancelled => Some(TimerOutcome::Cancelled),
        }
    }

    /// Whole percent of the countdown that has elapsed.
    pub(crate) fn percent(&self) -> u64 {
        if self.total_secs == 0 {
            return 100;
        }
        (self.total_secs - self.remaining_secs) * 100 / self.total_secs
    }

    pub(crate) fn clock(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }

    pub(crate) fn bar(&self, width: usize) -> String {
        let sym = Symbols::current();
        let filled = if self.total_secs == 0 {
            width
        } else {
            let elapsed = self.total_secs - self.remaining_secs;
            (width as u64 * elapsed / self.total_secs) as usize
        };
        format!(
            "{}{}",
            sym.bar_filled.repeat(filled),
            sym.bar_empty.repeat(width - filled.min(width))
        )
    }

    pub(crate) fn status_line(&self) -> String {
        let mut line = format!(
            "  {} {}% complete | Time left: {}",
            self.bar(BAR_WIDTH),
            self.percent(),
            self.clock()
        );
        if self.state == CountdownState::Paused {
            line.push_str(&format!("  {} paused", Symbols::current().pause));
        }
        line
    }
}

pub(crate) fn key_action(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyAction> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(code, KeyCode::Char('c') | KeyCode::Char('C')).then_some(KeyAction::Cancel);
    }
    match code {
        KeyCode::Enter => Some(KeyAction::FinishEarly),
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => Some(KeyAction::TogglePause),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(KeyAction::Cancel),
        _ => None,
    }
}

// ── Terminal driver ───────────────────────────────────────────────────────────

/// Runs one countdown to completion.
pub(crate) trait TaskTimer {
    fn run(&mut self, minutes: u32) -> Result<TimerOutcome>;
}

/// Countdown drawn on stdout, controlled from the keyboard.
pub(crate) struct TerminalTimer;

impl TaskTimer for TerminalTimer {
    fn run(&mut self, minutes: u32) -> Result<TimerOutcome> {
        run_countdown(minutes)
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw terminal mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Count down `minutes` on the terminal, reacting to keys between ticks.
pub(crate) fn run_countdown(minutes: u32) -> Result<TimerOutcome> {
    let mut countdown = Countdown::new(minutes);
    let mut out = io::stdout();

    println!();
    println!(
        "    {}",
        "Enter = finish early · p/space = pause · q/Esc = stop".dark_grey()
    );
    println!();

    let outcome = if io::stdin().is_terminal() {
        drive_interactive(&mut countdown, &mut out)?
    } else {
        drive_unattended(&mut countdown, &mut out)?
    };

    let sym = Symbols::current();
    match outcome {
        TimerOutcome::Elapsed => {
            println!("\r  {} 100% complete | Time left: 00:00", countdown.bar(BAR_WIDTH));
            println!();
            println!("{} Time's up! {}", sym.alarm, sym.alarm);
        }
        TimerOutcome::StoppedEarly => {
            println!();
            println!();
            println!("{} Timer stopped!", sym.stop);
        }
        TimerOutcome::Cancelled => {
            println!();
            println!();
        }
    }
    debug!(minutes, remaining = countdown.remaining_secs(), ?outcome, "countdown finished");
    Ok(outcome)
}

fn drive_interactive(countdown: &mut Countdown, out: &mut io::Stdout) -> Result<TimerOutcome> {
    let _guard = RawModeGuard::enable()?;
    let mut next_tick = Instant::now() + TICK;
    draw(countdown, out)?;

    loop {
        if let Some(outcome) = countdown.outcome() {
            return Ok(outcome);
        }
        let timeout = next_tick.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = key_action(key.code, key.modifiers) {
                        countdown.apply(action);
                        draw(countdown, out)?;
                    }
                }
            }
            continue;
        }
        countdown.tick();
        next_tick += TICK;
        draw(countdown, out)?;
    }
}

/// Piped stdin has no keys to read; just let the clock run out.
fn drive_unattended(countdown: &mut Countdown, out: &mut io::Stdout) -> Result<TimerOutcome> {
    loop {
        if let Some(outcome) = countdown.outcome() {
            return Ok(outcome);
        }
        draw(countdown, out)?;
        thread::sleep(TICK);
        countdown.tick();
    }
}

fn draw(countdown: &Countdown, out: &mut io::Stdout) -> Result<()> {
    execute!(out, Clear(ClearType::CurrentLine))?;
    write!(out, "\r{}", countdown.status_line())?;
    out.flush()?;
    Ok(())
}
