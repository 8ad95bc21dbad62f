//! Scripted `Completion` backend for tests.
//!
//! Replies are keyed by system prompt, optionally narrowed to prompts built from
//! one prompt template (steps that share a system prompt differ by template).

use std::sync::Mutex;

use async_trait::async_trait;

use super::{Completion, LlmError};

struct Rule {
    system: String,
    /// Fixed text a prompt starts with; `None` matches any prompt.
    opening: Option<String>,
    reply: String,
}

#[derive(Default)]
pub struct ScriptedCompletion {
    rules: Vec<Rule>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every request carrying `system` with `reply`.
    pub fn reply(mut self, system: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push(Rule {
            system: system.into(),
            opening: None,
            reply: reply.into(),
        });
        self
    }

    /// Answers requests carrying `system` whose prompt was built from `prompt_template`.
    /// Takes precedence over a plain `reply` for the same system prompt.
    pub fn reply_to(
        mut self,
        system: impl Into<String>,
        prompt_template: &str,
        reply: impl Into<String>,
    ) -> Self {
        let opening = prompt_template
            .split('{')
            .next()
            .unwrap_or(prompt_template)
            .to_string();
        self.rules.push(Rule {
            system: system.into(),
            opening: Some(opening),
            reply: reply.into(),
        });
        self
    }

    /// Every `(system, prompt)` pair received so far, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn prompts_for(&self, system: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(s, _)| s == system)
            .map(|(_, p)| p)
            .collect()
    }

    fn lookup(&self, prompt: &str, system: &str) -> Option<&str> {
        let candidates = || self.rules.iter().rev().filter(|r| r.system == system);
        candidates()
            .find(|r| r.opening.as_deref().is_some_and(|o| prompt.starts_with(o)))
            .or_else(|| candidates().find(|r| r.opening.is_none()))
            .map(|r| r.reply.as_str())
    }
}

#[async_trait]
impl Completion for ScriptedCompletion {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));
        match self.lookup(prompt, system) {
            Some(reply) => Ok(reply.trim().to_string()),
            None => Err(LlmError::Api {
                status: 500,
                message: format!("no scripted reply for system prompt {system:?}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prompt_template_narrows_shared_system_prompt() {
        let llm = ScriptedCompletion::new()
            .reply("sys", "fallback")
            .reply_to("sys", "Draft {kind} now", "drafted");

        assert_eq!(llm.complete("Draft a lease now", "sys").await.unwrap(), "drafted");
        assert_eq!(llm.complete("Review this", "sys").await.unwrap(), "fallback");
        assert!(llm.complete("Draft a lease now", "other").await.is_err());
    }
}
