use std::{cell::RefCell, collections::VecDeque};

use anyhow::{Result, anyhow};

use crate::agent::provider::Generator;

/// Replays canned replies in order and records every prompt it saw.
pub(crate) struct ScriptedGenerator {
    replies: RefCell<VecDeque<Result<Option<String>>>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedGenerator {
    pub(crate) fn new(replies: Vec<Result<Option<String>>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Generator for &ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<Option<String>> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("script exhausted")))
    }
}

pub(crate) fn reply(text: &str) -> Result<Option<String>> {
    Ok(Some(text.to_string()))
}
