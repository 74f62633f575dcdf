//! Task poller: turns an asynchronous server-side operation into a blocking wait.
//!
//! The poller repeatedly fetches a task by id and stops on the first terminal
//! state it observes. Timing comes from a [`PollPolicy`]; the overall bound is
//! measured from the first fetch and never overshot by more than one request,
//! because each sleep is clipped to the time remaining.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use urlencoding::encode;

use crate::client::{PollPolicy, RestClient};
use crate::error::{Error, Result};
use crate::task::{Task, TaskError, TaskState};

/// Anything that can fetch the current state of a task.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetch the task with the given id.
    async fn get_task(&self, task_id: &str) -> Result<Task>;
}

#[async_trait]
impl TaskSource for RestClient {
    async fn get_task(&self, task_id: &str) -> Result<Task> {
        self.get_json(&format!("/tasks/{}", encode(task_id))).await
    }
}

/// Where a wait currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No poll has completed yet
    Pending,
    /// Last observed state was non-terminal
    InProgress,
    /// Last observed state was a success state
    Done,
    /// Last observed state was a failure state
    Failed,
}

/// Timing plus terminal-state classification for a wait.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOptions {
    /// Interval, backoff and timeout
    pub policy: PollPolicy,
    /// States that end the wait successfully
    pub success_states: Vec<TaskState>,
    /// States that end the wait with [`Error::TaskFailed`]
    pub failure_states: Vec<TaskState>,
}

impl PollOptions {
    /// Default options: `COMPLETED` succeeds, `ERROR` fails.
    #[must_use]
    pub fn new() -> Self {
        Self::from_policy(PollPolicy::new())
    }

    /// Default terminal states with the given timing.
    #[must_use]
    pub fn from_policy(policy: PollPolicy) -> Self {
        Self {
            policy,
            success_states: vec![TaskState::completed()],
            failure_states: vec![TaskState::error()],
        }
    }

    /// Set the poll interval. A zero interval is raised to one millisecond.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.policy = self.policy.with_interval(interval);
        self
    }

    /// Set the overall bound. Zero waits indefinitely.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.policy = self.policy.with_timeout(timeout);
        self
    }

    /// Wait until a terminal state, however long it takes.
    #[must_use]
    pub fn without_timeout(mut self) -> Self {
        self.policy = self.policy.without_timeout();
        self
    }

    /// Replace the success states.
    #[must_use]
    pub fn with_success_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskState>,
    {
        self.success_states = states.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the failure states.
    #[must_use]
    pub fn with_failure_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskState>,
    {
        self.failure_states = states.into_iter().map(Into::into).collect();
        self
    }

    /// Classify a task state. Success wins if a state is listed in both sets.
    #[must_use]
    pub fn classify(&self, state: &TaskState) -> PollState {
        if self.success_states.contains(state) {
            PollState::Done
        } else if self.failure_states.contains(state) {
            PollState::Failed
        } else {
            PollState::InProgress
        }
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Polls a [`TaskSource`] until a task reaches a terminal state.
#[derive(Debug)]
pub struct TaskPoller<'a, S: ?Sized> {
    source: &'a S,
    options: PollOptions,
}

impl<'a, S> TaskPoller<'a, S>
where
    S: TaskSource + ?Sized,
{
    /// Create a poller over `source`.
    #[must_use]
    pub fn new(source: &'a S, options: PollOptions) -> Self {
        Self { source, options }
    }

    /// Options in effect.
    #[must_use]
    pub fn options(&self) -> &PollOptions {
        &self.options
    }

    /// Wait for `task_id` to reach a terminal state.
    pub async fn wait(&self, task_id: &str) -> Result<Task> {
        self.watch(task_id, None, |_, _| {}).await
    }

    /// Like [`wait`](Self::wait), but gives up with [`Error::Cancelled`] as soon
    /// as `cancel` fires, whether a fetch or a sleep is in flight.
    pub async fn wait_cancellable(&self, task_id: &str, cancel: &CancellationToken) -> Result<Task> {
        self.watch(task_id, Some(cancel), |_, _| {}).await
    }

    /// Wait for `task_id`, calling `on_progress` after every poll.
    pub async fn watch<F>(
        &self,
        task_id: &str,
        cancel: Option<&CancellationToken>,
        mut on_progress: F,
    ) -> Result<Task>
    where
        F: FnMut(&Task, PollState) + Send,
    {
        let started = Instant::now();
        let mut current = PollState::Pending;
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);

            let task = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    () = token.cancelled() => return Err(cancelled(task_id)),
                    result = self.source.get_task(task_id) => result?,
                },
                None => self.source.get_task(task_id).await?,
            };

            let next = self.options.classify(&task.state);
            trace!(task_id, state = %task.state, attempt, "Polled task");
            if next != current {
                debug!(task_id, from = ?current, to = ?next, "Task poll state changed");
                current = next;
            }
            on_progress(&task, current);

            match current {
                PollState::Done => return Ok(task),
                PollState::Failed => {
                    let error = TaskError::with_failure_states(task, &self.options.failure_states);
                    return Err(error.into());
                }
                PollState::Pending | PollState::InProgress => {}
            }

            let mut delay = self.options.policy.delay_for_attempt(attempt);
            if let Some(timeout) = self.options.policy.timeout {
                let elapsed = started.elapsed();
                if elapsed >= timeout {
                    return Err(Error::PollTimeout {
                        task_id: task_id.to_string(),
                        timeout,
                    });
                }
                delay = delay.min(timeout - elapsed);
            }

            match cancel {
                Some(token) => tokio::select! {
                    biased;
                    () = token.cancelled() => return Err(cancelled(task_id)),
                    () = tokio::time::sleep(delay) => {}
                },
                None => tokio::time::sleep(delay).await,
            }
        }
    }
}

fn cancelled(task_id: &str) -> Error {
    Error::Cancelled(format!("Wait for task '{task_id}' was cancelled"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::task::Step;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_options() -> PollOptions {
        PollOptions::new()
            .with_interval(Duration::from_millis(10))
            .with_timeout(Duration::from_secs(60))
    }

    fn sequence(states: &'static [&'static str]) -> MockTaskSource {
        let calls = Arc::new(AtomicU32::new(0));
        let mut source = MockTaskSource::new();
        source.expect_get_task().returning(move |id| {
            let n = calls.fetch_add(1, Ordering::SeqCst) as usize;
            let state = states[n.min(states.len() - 1)];
            Ok(Task::new(id, "CREATE_DEPLOYMENT", state))
        });
        source
    }

    #[tokio::test(start_paused = true)]
    async fn returns_first_terminal_success() {
        let source = sequence(&["QUEUED", "STARTED", "COMPLETED"]);
        let poller = TaskPoller::new(&source, fast_options());

        let mut observed = Vec::new();
        let task = poller
            .watch("t-1", None, |task, state| {
                observed.push((task.state.to_string(), state));
            })
            .await
            .unwrap();

        assert_eq!(task.id, "t-1");
        assert_eq!(task.state, TaskState::completed());
        assert_eq!(
            observed,
            vec![
                ("QUEUED".to_string(), PollState::InProgress),
                ("STARTED".to_string(), PollState::InProgress),
                ("COMPLETED".to_string(), PollState::Done),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_still_sleeps_between_polls() {
        let source = sequence(&["QUEUED", "STARTED", "COMPLETED"]);
        let options = PollOptions::new()
            .with_interval(Duration::ZERO)
            .without_timeout();
        assert_eq!(options.policy.interval, Duration::from_millis(1));

        let started = Instant::now();
        let task = TaskPoller::new(&source, options).wait("t-2").await.unwrap();
        assert_eq!(task.state, TaskState::completed());
        assert!(started.elapsed() >= Duration::from_millis(2));
    }

    #[tokio::test(start_paused = true)]
    async fn already_terminal_task_is_fetched_once() {
        let mut source = MockTaskSource::new();
        source
            .expect_get_task()
            .times(1)
            .returning(|id| Ok(Task::new(id, "DELETE_VM", "COMPLETED")));

        let task = TaskPoller::new(&source, fast_options())
            .wait("t-9")
            .await
            .unwrap();
        assert_eq!(task.operation, "DELETE_VM");
    }

    #[tokio::test(start_paused = true)]
    async fn failure_state_yields_task_failed() {
        let mut source = MockTaskSource::new();
        source.expect_get_task().times(1).returning(|id| {
            let mut step = Step::new("PROVISION_HOST", "ERROR");
            step.errors
                .push(ApiError::new("HostUnreachable", "no route to host", 0));
            let mut task = Task::new(id, "CREATE_HOST", "ERROR");
            task.steps.push(step);
            Ok(task)
        });

        let err = TaskPoller::new(&source, fast_options())
            .wait("t-2")
            .await
            .unwrap_err();

        let failure = err.task_error().expect("task failure");
        assert_eq!(failure.task_id(), "t-2");
        assert_eq!(failure.step.as_ref().unwrap().operation, "PROVISION_HOST");
        assert_eq!(failure.api_error().unwrap().code, "HostUnreachable");
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_without_overshooting() {
        let source = sequence(&["STARTED"]);
        let options = PollOptions::new()
            .with_interval(Duration::from_millis(300))
            .with_timeout(Duration::from_secs(1));

        let started = Instant::now();
        let err = TaskPoller::new(&source, options)
            .wait("t-3")
            .await
            .unwrap_err();
        let elapsed = started.elapsed();

        match err {
            Error::PollTimeout { task_id, timeout } => {
                assert_eq!(task_id, "t-3");
                assert_eq!(timeout, Duration::from_secs(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_millis(1300));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_polls_until_terminal() {
        let mut states = vec!["STARTED"; 500];
        states.push("COMPLETED");
        let states: &'static [&'static str] = Box::leak(states.into_boxed_slice());
        let source = sequence(states);

        let options = PollOptions::new()
            .with_interval(Duration::from_secs(10))
            .with_timeout(Duration::ZERO);

        let task = TaskPoller::new(&source, options).wait("t-4").await.unwrap();
        assert_eq!(task.state, TaskState::completed());
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_errors_are_returned_immediately() {
        let mut source = MockTaskSource::new();
        source
            .expect_get_task()
            .times(1)
            .returning(|_| Err(Error::TransportUnavailable("connection refused".into())));

        let err = TaskPoller::new(&source, fast_options())
            .wait("t-5")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TransportUnavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn custom_terminal_states() {
        let source = sequence(&["QUEUED", "CANCELLED"]);
        let options = fast_options().with_failure_states(["ERROR", "CANCELLED"]);

        let err = TaskPoller::new(&source, options)
            .wait("t-6")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "TASK_FAILED");

        let source = sequence(&["QUEUED", "STARTED"]);
        let options = fast_options().with_success_states(["STARTED"]);
        let task = TaskPoller::new(&source, options).wait("t-7").await.unwrap();
        assert_eq!(task.state, TaskState::started());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_sleep() {
        let source = sequence(&["STARTED"]);
        let options = PollOptions::new()
            .with_interval(Duration::from_secs(60))
            .without_timeout();
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let err = TaskPoller::new(&source, options)
            .wait_cancellable("t-8", &token)
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "CANCELLED");
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn already_cancelled_token_skips_fetch() {
        let mut source = MockTaskSource::new();
        source.expect_get_task().times(0);
        let token = CancellationToken::new();
        token.cancel();

        let err = TaskPoller::new(&source, fast_options())
            .wait_cancellable("t-10", &token)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled(_)));
    }

    #[test]
    fn classify_prefers_success() {
        let options = PollOptions::new()
            .with_success_states(["DONE"])
            .with_failure_states(["DONE", "ERROR"]);
        assert_eq!(options.classify(&TaskState::new("DONE")), PollState::Done);
        assert_eq!(options.classify(&TaskState::error()), PollState::Failed);
        assert_eq!(options.classify(&TaskState::queued()), PollState::InProgress);
    }
}
