use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::agent::provider::Generator;
use crate::config::LlmConfig;
use crate::model::{Session, Task};
use crate::plan::breakdown::Planner;
use crate::store::SessionStore;
use crate::types::{Adjustment, TaskStatus, TimerOutcome};
use crate::ui::{
    input::{InputClosed, Prompter},
    quotes, screen,
    timer::TaskTimer,
};

const CHOICE_PROMPT: &str = "Your choice: ";
const READY_PROMPT: &str = "Ready to start? (yes/skip/quit): ";

/// Drives one user through goals, plans and timed tasks.
///
/// The working session is always saved before the next question is asked, so
/// quitting at any prompt leaves a resumable record behind.
pub(crate) struct Coach<G, R, W, T> {
    store: SessionStore,
    planner: Planner<G>,
    prompter: Prompter<R, W>,
    timer: T,
    max_regenerations: u32,
}

impl<G, R, W, T> Coach<G, R, W, T>
where
    G: Generator,
    R: BufRead,
    W: Write,
    T: TaskTimer,
{
    pub(crate) fn new(
        store: SessionStore,
        planner: Planner<G>,
        prompter: Prompter<R, W>,
        timer: T,
        max_regenerations: u32,
    ) -> Self {
        Self {
            store,
            planner,
            prompter,
            timer,
            max_regenerations,
        }
    }

    pub(crate) async fn run(&mut self, llm: &LlmConfig) -> Result<()> {
        let welcome = screen::welcome_lines(self.store.completed_count(), llm.model(), llm.base_url());
        self.prompter.say_lines(&welcome)?;

        match self.main_menu().await {
            Err(e) if e.is::<InputClosed>() => {
                info!("input closed, leaving");
                self.prompter.say("")?;
                self.prompter.say("See you next time!")?;
                Ok(())
            }
            other => other,
        }
    }

    // ── Menus ─────────────────────────────────────────────────────────────────

    async fn main_menu(&mut self) -> Result<()> {
        loop {
            let unfinished = self.store.first_unfinished();

            self.prompter.say("What would you like to do?")?;
            self.prompter.say("1. Start a new goal")?;
            self.prompter.say("2. View completed goals (history)")?;
            if let Some(session) = &unfinished {
                self.prompter
                    .say(format!("3. Continue previous session: \"{}\"", session.goal()))?;
            }
            self.prompter.say("q. Quit")?;
            self.prompter.say("")?;

            let mut options = vec!["1", "2", "q"];
            if unfinished.is_some() {
                options.push("3");
            }

            let choice = self.prompter.menu_choice(&options, CHOICE_PROMPT)?;
            match (choice.as_str(), unfinished) {
                ("1", Some(existing)) => self.handle_existing_session(existing).await?,
                ("1", None) => self.start_new_session().await?,
                ("2", _) => {
                    let lines = screen::history_lines(&self.store.completed());
                    self.prompter.say_lines(&lines)?;
                }
                ("3", Some(session)) => self.continue_session(session)?,
                _ => {
                    self.prompter.say("See you next time!")?;
                    return Ok(());
                }
            }
        }
    }

    async fn handle_existing_session(&mut self, existing: Session) -> Result<()> {
        self.prompter.say("")?;
        self.prompter
            .say(format!("You have an existing session: \"{}\"", existing.goal()))?;
        self.prompter.say("Starting a new goal will delete this session.")?;
        self.prompter.say("")?;
        self.prompter.say("1. Delete and start new")?;
        self.prompter.say("2. Go back to menu")?;
        self.prompter.say("")?;

        if self.prompter.menu_choice(&["1", "2"], CHOICE_PROMPT)? == "1" {
            self.store.delete(existing.id())?;
            info!(session = existing.id(), "discarded unfinished session");
            self.start_new_session().await?;
        }
        Ok(())
    }

    fn continue_session(&mut self, mut session: Session) -> Result<()> {
        session.resume();
        self.store.save(&session)?;
        info!(session = session.id(), cursor = session.cursor(), "resuming session");

        self.prompter.say("")?;
        self.prompter.say(format!("Resuming: {}", session.goal()))?;
        self.show_plan(session.tasks())?;
        self.run_session(&mut session)
    }

    // ── Planning ──────────────────────────────────────────────────────────────

    async fn start_new_session(&mut self) -> Result<()> {
        let goal = self.ask_goal().await?;
        let minutes = self.prompter.time_available()?;

        self.prompter.say("")?;
        self.prompter.say("Let me break that down for you...")?;
        self.prompter.say("")?;

        let tasks = match self.planner.break_down(&goal, minutes, None).await {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "breakdown failed");
                self.prompter.say(
                    "Sorry, I couldn't break down your goal. Please try again with a different description.",
                )?;
                return Ok(());
            }
        };

        let mut session = Session::new(goal, minutes, tasks);
        self.store.save(&session)?;
        info!(
            session = session.id(),
            minutes,
            planned = session.total_minutes(),
            steps = session.tasks().len(),
            "session created"
        );

        self.confirm_tasks(&mut session).await
    }

    async fn ask_goal(&mut self) -> Result<String> {
        self.prompter.say("")?;
        self.prompter.say("What do you want to accomplish today?")?;
        self.prompter.say(
            "(Tip: Be specific! e.g., 'study chapter 3 of discrete math' instead of 'study math')",
        )?;
        self.prompter.say("")?;

        loop {
            let goal = self.prompter.goal()?;
            match self.planner.validate_goal(&goal).await {
                Ok(true) => return Ok(goal),
                Ok(false) => {
                    self.prompter
                        .say("I didn't understand that. Please describe your goal more clearly.")?;
                    self.prompter.say("")?;
                }
                Err(e) => {
                    warn!(error = %format!("{e:#}"), "goal validation unavailable, accepting input");
                    return Ok(goal);
                }
            }
        }
    }

    async fn confirm_tasks(&mut self, session: &mut Session) -> Result<()> {
        let mut regenerations = 0;
        loop {
            self.show_plan(session.tasks())?;

            let can_regenerate = regenerations < self.max_regenerations;
            self.prompter.say("Are these tasks okay?")?;
            if can_regenerate {
                self.prompter.say(format!(
                    "(You can regenerate up to {} times. Remaining: {})",
                    self.max_regenerations,
                    self.max_regenerations - regenerations
                ))?;
            } else {
                self.prompter.say(format!(
                    "(You already used all {} regenerate attempts.)",
                    self.max_regenerations
                ))?;
            }
            self.prompter.say("1. Yes, let's start!")?;
            self.prompter.say("2. Adjust time for a task")?;
            let mut options = vec!["1", "2"];
            if can_regenerate {
                self.prompter.say("3. Too hard - make simpler")?;
                self.prompter.say("4. Not enough - need more detail")?;
                self.prompter
                    .say("5. Different focus - let me specify what to work on")?;
                options.extend(["3", "4", "5"]);
            }
            self.prompter.say("q. Quit")?;
            self.prompter.say("")?;
            options.push("q");

            let adjustment = match self.prompter.menu_choice(&options, CHOICE_PROMPT)?.as_str() {
                "1" => return self.run_session(session),
                "2" => {
                    self.adjust_time(session)?;
                    continue;
                }
                "3" => Adjustment::Simpler,
                "4" => Adjustment::MoreComprehensive,
                "5" => match self.ask_focus().await? {
                    Some(focus) => Adjustment::Focus(focus),
                    None => {
                        self.prompter.say("No focus entered. Going back.")?;
                        continue;
                    }
                },
                _ => return self.quit_session(session),
            };

            if self.regenerate(session, &adjustment).await? {
                regenerations += 1;
            }
        }
    }

    /// A focus the collaborator does not recognise counts as a cancel.
    async fn ask_focus(&mut self) -> Result<Option<String>> {
        let Some(focus) = self.prompter.focus()? else {
            return Ok(None);
        };
        match self.planner.validate_goal(&focus).await {
            Ok(true) => Ok(Some(focus)),
            Ok(false) => Ok(None),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "focus validation unavailable, accepting input");
                Ok(Some(focus))
            }
        }
    }

    async fn regenerate(&mut self, session: &mut Session, adjustment: &Adjustment) -> Result<bool> {
        let (intro, failure) = match adjustment {
            Adjustment::Focus(_) => (
                "Let me adjust the focus...",
                "Sorry, I couldn't adjust the focus. Let's keep the current plan.",
            ),
            _ => (
                "Let me try a different approach...",
                "Sorry, I couldn't regenerate. Let's keep the current plan.",
            ),
        };
        self.prompter.say("")?;
        self.prompter.say(intro)?;
        self.prompter.say("")?;

        match self
            .planner
            .break_down(session.goal(), session.time_budget(), Some(adjustment))
            .await
        {
            Ok(tasks) => {
                session.regenerate_tasks(tasks);
                self.store.save(session)?;
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, adjustment = adjustment.as_str(), "regeneration failed");
                self.prompter.say(failure)?;
                Ok(false)
            }
        }
    }

    fn adjust_time(&mut self, session: &mut Session) -> Result<()> {
        self.prompter.say("")?;
        self.prompter.say("Which task do you want to adjust?")?;
        self.prompter
            .say_lines(&screen::task_choice_lines(session.tasks()))?;

        let Some(ordinal) = self.prompter.task_number(session.tasks().len())? else {
            return Ok(());
        };
        let Some(task) = session.tasks().iter().find(|t| t.ordinal() == ordinal) else {
            return Ok(());
        };
        let (description, current) = (task.description().to_string(), task.duration_minutes());

        if let Some(minutes) = self.prompter.new_time(&description, current)? {
            session.set_task_duration(ordinal, minutes)?;
            self.store.save(session)?;
            self.prompter.say(format!("Updated to {minutes} mins!"))?;
        }
        Ok(())
    }

    // ── Running ───────────────────────────────────────────────────────────────

    fn run_session(&mut self, session: &mut Session) -> Result<()> {
        self.prompter.say("")?;
        self.prompter.say("Let's get started! 💪")?;
        self.prompter.say("")?;

        loop {
            let Some(task) = session.current_task().cloned() else {
                return self.complete_session(session);
            };
            if !self.handle_task(session, &task)? {
                return Ok(());
            }
        }
    }

    /// Returns `false` when the user leaves the session.
    fn handle_task(&mut self, session: &mut Session, task: &Task) -> Result<bool> {
        self.prompter
            .say_lines(&screen::task_header_lines(session, task))?;

        let ready = self
            .prompter
            .menu_choice(&["yes", "y", "", "skip", "quit"], READY_PROMPT)?;
        match ready.as_str() {
            "skip" => {
                self.finish_task(session, TaskStatus::Skipped)?;
                Ok(true)
            }
            "quit" => {
                self.quit_session(session)?;
                Ok(false)
            }
            _ => {
                if self.timer.run(task.duration_minutes())? == TimerOutcome::Cancelled {
                    self.quit_session(session)?;
                    return Ok(false);
                }
                self.after_timer(session)
            }
        }
    }

    fn after_timer(&mut self, session: &mut Session) -> Result<bool> {
        loop {
            self.prompter.say("")?;
            self.prompter.say("How did it go?")?;
            self.prompter.say("1. Done ✅")?;
            self.prompter.say("2. Need more time ⏰")?;
            self.prompter.say("3. Skip ⏭️")?;
            self.prompter.say("")?;

            match self.prompter.menu_choice(&["1", "2", "3"], CHOICE_PROMPT)?.as_str() {
                "1" => {
                    self.finish_task(session, TaskStatus::Completed)?;
                    return Ok(true);
                }
                "3" => {
                    self.finish_task(session, TaskStatus::Skipped)?;
                    return Ok(true);
                }
                _ => {
                    let Some(extra) = self.prompter.extra_time()? else {
                        continue;
                    };
                    session.extend_current_task(extra);
                    self.store.save(session)?;
                    self.prompter
                        .say(format!("Adding {extra} minutes. Keep going! 💪"))?;
                    if self.timer.run(extra)? == TimerOutcome::Cancelled {
                        self.quit_session(session)?;
                        return Ok(false);
                    }
                }
            }
        }
    }

    fn finish_task(&mut self, session: &mut Session, status: TaskStatus) -> Result<()> {
        match status {
            TaskStatus::Skipped => session.skip_current(),
            _ => session.complete_current(),
        };
        self.store.save(session)?;
        debug!(session = session.id(), cursor = session.cursor(), status = status.as_str(), "task resolved");
        self.prompter.say("")?;
        self.prompter.say(format!("  {}", quotes::encouragement(status)))?;
        self.prompter.say("")?;
        Ok(())
    }

    fn quit_session(&mut self, session: &mut Session) -> Result<()> {
        session.pause();
        self.store.save(session)?;
        info!(session = session.id(), cursor = session.cursor(), "session paused");
        self.prompter.say("Session saved. See you next time!")?;
        Ok(())
    }

    fn complete_session(&mut self, session: &Session) -> Result<()> {
        self.store.save(session)?;
        info!(
            session = session.id(),
            completed = session.completed_count(),
            skipped = session.skipped_count(),
            "session completed"
        );
        self.prompter.say_lines(&screen::summary_lines(session))?;
        self.prompter.say(format!("  🎉 {}", quotes::compliment()))?;
        self.prompter.say("")?;
        Ok(())
    }

    fn show_plan(&mut self, tasks: &[Task]) -> Result<()> {
        let lines = screen::plan_lines(tasks, screen::terminal_width());
        self.prompter.say_lines(&lines)
    }
}
