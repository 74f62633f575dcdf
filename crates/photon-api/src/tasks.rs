//! Task lookup and waiting.

use photon_core::{CancellationToken, PollOptions, PollState, RestClient, Task, TaskPoller};
use std::time::Duration;
use urlencoding::encode;

use crate::models::TaskListParams;
use crate::Result;

const TASKS_PATH: &str = "/tasks";

/// Operations on `/tasks`.
#[derive(Debug, Clone)]
pub struct TasksApi {
    client: RestClient,
}

impl TasksApi {
    pub(crate) fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// Fetch a task by id.
    pub async fn get(&self, id: &str) -> Result<Task> {
        self.client.get_json(&format!("{TASKS_PATH}/{}", encode(id))).await
    }

    /// List tasks matching `params`, across all pages.
    pub async fn list(&self, params: &TaskListParams) -> Result<Vec<Task>> {
        self.client.get_list(TASKS_PATH, &params.to_pairs()).await
    }

    /// Poll options derived from the client configuration.
    #[must_use]
    pub fn poll_options(&self) -> PollOptions {
        PollOptions::from_policy(self.client.poll_policy())
    }

    /// Wait for a task using the client's configured poll settings.
    pub async fn wait(&self, id: &str) -> Result<Task> {
        self.wait_with(id, self.poll_options()).await
    }

    /// Wait for a task with an explicit overall bound. Zero waits indefinitely.
    pub async fn wait_timeout(&self, id: &str, timeout: Duration) -> Result<Task> {
        self.wait_with(id, self.poll_options().with_timeout(timeout))
            .await
    }

    /// Wait for a task with explicit poll options.
    pub async fn wait_with(&self, id: &str, options: PollOptions) -> Result<Task> {
        let poller = TaskPoller::new(&self.client, options);
        self.client.scoped(poller.wait(id)).await
    }

    /// Wait for a task until it finishes or `cancel` fires.
    pub async fn wait_cancellable(
        &self,
        id: &str,
        options: PollOptions,
        cancel: &CancellationToken,
    ) -> Result<Task> {
        let poller = TaskPoller::new(&self.client, options);
        self.client
            .scoped(poller.wait_cancellable(id, cancel))
            .await
    }

    /// Wait for a task, reporting every observed state to `on_progress`.
    pub async fn watch<F>(
        &self,
        id: &str,
        options: PollOptions,
        cancel: Option<&CancellationToken>,
        on_progress: F,
    ) -> Result<Task>
    where
        F: FnMut(&Task, PollState) + Send,
    {
        let poller = TaskPoller::new(&self.client, options);
        self.client
            .scoped(poller.watch(id, cancel, on_progress))
            .await
    }
}
