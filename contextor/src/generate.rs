//! Answer generation with bounded retry and a fixed delay.

use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::collaborators::{AnswerGenerator, Sleeper};
use crate::error::ContextorError;
use crate::prompt::chat_prompt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Wait between attempts; never applied after the last one.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// Calls the model until it returns non-blank text.
///
/// Both errors and blank answers count as failed attempts. After the last
/// failed attempt returns [`ContextorError::GenerationExhausted`].
#[instrument(skip_all, fields(max_attempts = policy.max_attempts))]
pub async fn generate_answer(
    llm: &dyn AnswerGenerator,
    sleeper: &dyn Sleeper,
    policy: &RetryPolicy,
    message: &str,
    system_prompt: &str,
) -> Result<String, ContextorError> {
    let attempts = policy.max_attempts.max(1);
    let prompt = chat_prompt(system_prompt, message);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match llm.invoke(&prompt).await {
            Ok(answer) if !answer.trim().is_empty() => {
                info!(attempt, "generated chat response");
                return Ok(answer);
            }
            Ok(_) => {
                warn!(attempt, "empty response from AI model");
                last_error = ContextorError::EmptyResponse.to_string();
            }
            Err(e) => {
                warn!(attempt, error = %e, "chat attempt failed");
                last_error = e.to_string();
            }
        }

        if attempt < attempts {
            sleeper.sleep(policy.delay).await;
        }
    }

    Err(ContextorError::GenerationExhausted {
        attempts,
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeLlm, RecordingSleeper, Reply};

    #[tokio::test]
    async fn third_attempt_wins_and_no_fourth_call() {
        let llm = FakeLlm::scripted(vec![Reply::Fail, Reply::Fail, Reply::Text("third".into())]);
        let sleeper = RecordingSleeper::default();

        let out = generate_answer(&llm, &sleeper, &RetryPolicy::default(), "q", "sys")
            .await
            .unwrap();

        assert_eq!(out, "third");
        assert_eq!(llm.calls(), 3);
        assert_eq!(sleeper.delays(), vec![Duration::from_secs(1); 2]);
    }

    #[tokio::test]
    async fn blank_answers_are_retried() {
        let llm = FakeLlm::scripted(vec![Reply::Text("  \n".into()), Reply::Text("ok".into())]);
        let sleeper = RecordingSleeper::default();
        let out = generate_answer(&llm, &sleeper, &RetryPolicy::default(), "q", "sys")
            .await
            .unwrap();
        assert_eq!(out, "ok");
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn exhaustion_is_terminal_and_skips_last_delay() {
        let llm = FakeLlm::scripted(vec![
            Reply::Fail,
            Reply::Text(String::new()),
            Reply::Fail,
            Reply::Text("late".into()),
        ]);
        let sleeper = RecordingSleeper::default();

        let err = generate_answer(&llm, &sleeper, &RetryPolicy::default(), "q", "sys")
            .await
            .unwrap_err();

        assert!(matches!(err, ContextorError::GenerationExhausted { attempts: 3, .. }));
        assert_eq!(llm.calls(), 3);
        assert_eq!(sleeper.delays().len(), 2);
    }

    #[tokio::test]
    async fn success_on_first_attempt_does_not_sleep() {
        let llm = FakeLlm::scripted(vec![Reply::Text("Hello".into())]);
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy {
            max_attempts: 5,
            delay: Duration::from_millis(10),
        };
        let out = generate_answer(&llm, &sleeper, &policy, "Hi", "SYS").await.unwrap();
        assert_eq!(out, "Hello");
        assert!(sleeper.delays().is_empty());
        assert_eq!(
            llm.prompts(),
            vec!["SYS\n\nUser Question: Hi\n\nProvide a helpful, concise answer:".to_string()]
        );
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let llm = FakeLlm::scripted(vec![Reply::Fail]);
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy {
            max_attempts: 0,
            delay: Duration::from_secs(1),
        };
        let err = generate_answer(&llm, &sleeper, &policy, "q", "s").await.unwrap_err();
        assert!(matches!(err, ContextorError::GenerationExhausted { attempts: 1, .. }));
        assert_eq!(llm.calls(), 1);
    }
}
