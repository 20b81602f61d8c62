//! Operator prompts.

use crate::error::{ReleaseError, Result};
use async_trait::async_trait;
use dialoguer::{Input, Select};
use std::io;

/// Asks the operator questions.
///
/// `Ok(None)` means the operator backed out of the question.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Pick one of `items`; returns its index
    async fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>>;

    /// Free-text answer, possibly empty
    async fn text(&self, prompt: &str) -> Result<Option<String>>;
}

/// Terminal prompts via `dialoguer`, run on a blocking thread.
///
/// Escape or `q` backs out of a menu.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        let prompt = prompt.to_string();
        let items = items.to_vec();

        tokio::task::spawn_blocking(move || {
            Select::new()
                .with_prompt(prompt)
                .items(&items)
                .default(0)
                .interact_opt()
        })
        .await
        .map_err(|e| ReleaseError::Prompt(e.to_string()))?
        .or_else(interrupted_as_none)
    }

    async fn text(&self, prompt: &str) -> Result<Option<String>> {
        let prompt = prompt.to_string();

        tokio::task::spawn_blocking(move || {
            Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .map(Some)
        })
        .await
        .map_err(|e| ReleaseError::Prompt(e.to_string()))?
        .or_else(interrupted_as_none)
    }
}

/// Ctrl-C inside a raw-mode prompt surfaces as an interrupted read.
fn interrupted_as_none<T>(err: dialoguer::Error) -> Result<Option<T>> {
    match err {
        dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
        other => Err(ReleaseError::Prompt(other.to_string())),
    }
}
