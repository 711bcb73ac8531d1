use anyhow::Result;
use regex::Regex;
use tracing::{info, warn};

use crate::agent::provider::Generator;
use crate::error::BreakdownError;
use crate::model::Task;
use crate::plan::{fit::fit_to_budget, parse::parse_response, prompt};
use crate::types::Adjustment;

/// Turns goals into fitted task lists through a bounded number of
/// collaborator calls.
pub(crate) struct Planner<G> {
    generator: G,
    max_retries: u32,
    yes_pattern: Regex,
}

impl<G: Generator> Planner<G> {
    pub(crate) fn new(generator: G, max_retries: u32) -> Self {
        Self {
            generator,
            max_retries,
            yes_pattern: Regex::new(r"(?i)\byes\b").expect("static regex"),
        }
    }

    pub(crate) async fn break_down(
        &self,
        goal: &str,
        minutes: u32,
        adjustment: Option<&Adjustment>,
    ) -> Result<Vec<Task>, BreakdownError> {
        if self.max_retries == 0 {
            return Err(BreakdownError::NoAttempts);
        }
        let prompt = prompt::build_breakdown_prompt(goal, minutes, adjustment);
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.attempt(&prompt, minutes).await {
                Ok(tasks) => {
                    info!(
                        attempt,
                        steps = tasks.len(),
                        minutes,
                        adjustment = adjustment.map(Adjustment::as_str),
                        "goal broken down"
                    );
                    return Ok(tasks);
                }
                Err(reason) => {
                    warn!(attempt, max = self.max_retries, %reason, "breakdown attempt failed");
                    last_error = Some(reason);
                }
            }
        }

        Err(BreakdownError::Exhausted {
            attempts: self.max_retries,
            last_error,
        })
    }

    async fn attempt(&self, prompt: &str, minutes: u32) -> Result<Vec<Task>, String> {
        let text = match self.generator.generate(prompt).await {
            Ok(Some(text)) => text,
            Ok(None) => return Err("collaborator returned no text".to_string()),
            Err(e) => return Err(format!("{e:#}")),
        };
        let mut tasks = parse_response(&text);
        if tasks.is_empty() {
            return Err("reply did not contain a valid plan".to_string());
        }
        fit_to_budget(&mut tasks, minutes).map_err(|e| e.to_string())?;
        Ok(tasks)
    }

    /// Ask the collaborator whether `input` reads like an actionable goal.
    pub(crate) async fn validate_goal(&self, input: &str) -> Result<bool> {
        if input.trim().is_empty() {
            return Ok(false);
        }
        let reply = self
            .generator
            .generate(&prompt::build_validation_prompt(input))
            .await?;
        Ok(reply.is_some_and(|r| self.yes_pattern.is_match(&r)))
    }
}
