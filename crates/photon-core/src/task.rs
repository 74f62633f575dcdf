//! Task records returned by every mutating Photon operation.
//!
//! A task is created by the service, mutated only by the service, and observed by
//! the client through polling. Its state is an open set of strings: the well-known
//! values have constructors here, anything else the service introduces is kept
//! verbatim.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::ApiError;

/// State of a task or of one of its steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskState(String);

impl TaskState {
    /// Accepted by the service, not yet started
    pub const QUEUED: &'static str = "QUEUED";
    /// Running
    pub const STARTED: &'static str = "STARTED";
    /// Finished successfully
    pub const COMPLETED: &'static str = "COMPLETED";
    /// Finished with an error
    pub const ERROR: &'static str = "ERROR";

    /// Wrap an arbitrary state string.
    #[must_use]
    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    /// The `QUEUED` state.
    #[must_use]
    pub fn queued() -> Self {
        Self::new(Self::QUEUED)
    }

    /// The `STARTED` state.
    #[must_use]
    pub fn started() -> Self {
        Self::new(Self::STARTED)
    }

    /// The `COMPLETED` state.
    #[must_use]
    pub fn completed() -> Self {
        Self::new(Self::COMPLETED)
    }

    /// The `ERROR` state.
    #[must_use]
    pub fn error() -> Self {
        Self::new(Self::ERROR)
    }

    /// Returns the raw state string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskState {
    fn from(state: &str) -> Self {
        Self::new(state)
    }
}

impl From<String> for TaskState {
    fn from(state: String) -> Self {
        Self(state)
    }
}

impl PartialEq<str> for TaskState {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TaskState {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Reference to the resource a task acts upon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Resource identifier
    #[serde(default)]
    pub id: String,
    /// Resource kind (e.g. `deployment`, `host`)
    #[serde(default)]
    pub kind: String,
}

/// One sub-operation of a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Position of the step within the task
    #[serde(default)]
    pub sequence: u32,
    /// Step operation name
    #[serde(default)]
    pub operation: String,
    /// Step state
    #[serde(default)]
    pub state: TaskState,
    /// Errors recorded by the service for this step
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiError>,
    /// Warnings recorded by the service for this step
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ApiError>,
    /// Step options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<HashMap<String, serde_json::Value>>,
    /// Queue time, epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queued_time: Option<i64>,
    /// Start time, epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_time: Option<i64>,
    /// End time, epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

impl Step {
    /// Create a step with an operation and state.
    #[must_use]
    pub fn new(operation: impl Into<String>, state: impl Into<TaskState>) -> Self {
        Self {
            operation: operation.into(),
            state: state.into(),
            ..Self::default()
        }
    }
}

/// Asynchronous operation handle returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned identifier
    pub id: String,
    /// Operation tag, e.g. `CREATE_DEPLOYMENT`
    #[serde(default)]
    pub operation: String,
    /// Current state
    pub state: TaskState,
    /// Resource the task acts upon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<Entity>,
    /// Ordered sub-operations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
    /// Queue time, epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queued_time: Option<i64>,
    /// Start time, epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_time: Option<i64>,
    /// End time, epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    /// Canonical URL of the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// Operation-specific result properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_properties: Option<serde_json::Value>,
}

impl Task {
    /// Create a task with the given identifier, operation and state.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        operation: impl Into<String>,
        state: impl Into<TaskState>,
    ) -> Self {
        Self {
            id: id.into(),
            operation: operation.into(),
            state: state.into(),
            ..Self::default()
        }
    }

    /// Identifier of the entity the task acts upon, if reported.
    #[must_use]
    pub fn entity_id(&self) -> Option<&str> {
        self.entity.as_ref().map(|entity| entity.id.as_str())
    }

    /// First step whose state is one of `failure_states`, in sequence order.
    #[must_use]
    pub fn first_failed_step(&self, failure_states: &[TaskState]) -> Option<&Step> {
        let mut steps: Vec<&Step> = self.steps.iter().collect();
        steps.sort_by_key(|step| step.sequence);
        steps
            .into_iter()
            .find(|step| failure_states.contains(&step.state))
    }
}

/// A task that finished in a failure state.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskError {
    /// Final task as reported by the service
    pub task: Task,
    /// First failed step, if the service marked one
    pub step: Option<Step>,
}

impl TaskError {
    /// Build from a task in the `ERROR` state.
    #[must_use]
    pub fn new(task: Task) -> Self {
        Self::with_failure_states(task, &[TaskState::error()])
    }

    /// Build from a task, locating the failed step with a custom set of failure states.
    #[must_use]
    pub fn with_failure_states(task: Task, failure_states: &[TaskState]) -> Self {
        let step = task.first_failed_step(failure_states).cloned();
        Self { task, step }
    }

    /// Identifier of the failed task.
    #[must_use]
    pub fn task_id(&self) -> &str {
        &self.task.id
    }

    /// First error recorded on the failed step.
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiError> {
        self.step.as_ref().and_then(|step| step.errors.first())
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task '{}' ({}) is in {} state",
            self.task.id, self.task.operation, self.task.state
        )?;
        if let Some(error) = self.api_error() {
            write!(f, ": {}: {}", error.code, error.message)?;
        }
        f.write_str(". Examine task for full details.")
    }
}

impl std::error::Error for TaskError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_task_envelope() {
        let task: Task = serde_json::from_value(json!({
            "id": "t-1",
            "operation": "CREATE_DEPLOYMENT",
            "state": "QUEUED",
            "entity": {"id": "dep-1", "kind": "deployment"},
            "steps": [
                {"sequence": 0, "operation": "SCHEDULE", "state": "QUEUED"}
            ],
            "queuedTime": 1_480_000_000_000_i64,
            "selfLink": "https://photon/tasks/t-1"
        }))
        .unwrap();

        assert_eq!(task.id, "t-1");
        assert_eq!(task.state, TaskState::queued());
        assert_eq!(task.entity_id(), Some("dep-1"));
        assert_eq!(task.steps.len(), 1);
        assert_eq!(task.queued_time, Some(1_480_000_000_000));
    }

    #[test]
    fn unknown_states_are_preserved() {
        let task: Task =
            serde_json::from_value(json!({"id": "t-2", "state": "CANCELLING"})).unwrap();
        assert_eq!(task.state, "CANCELLING");
        assert_eq!(task.state.to_string(), "CANCELLING");
    }

    #[test]
    fn missing_id_is_rejected() {
        let result = serde_json::from_value::<Task>(json!({"state": "QUEUED"}));
        assert!(result.is_err());
    }

    #[test]
    fn task_error_picks_first_failed_step() {
        let mut failing = Step::new("PROVISION_HOST", TaskState::error());
        failing.sequence = 1;
        failing.errors.push(ApiError::new("HostUnreachable", "no route to host", 0));

        let mut later = Step::new("CLEANUP", TaskState::error());
        later.sequence = 2;

        let mut task = Task::new("t-3", "CREATE_HOST", TaskState::error());
        task.steps = vec![later, Step::new("VALIDATE", TaskState::completed()), failing];

        let error = TaskError::new(task);
        assert_eq!(error.task_id(), "t-3");
        assert_eq!(error.step.as_ref().unwrap().operation, "PROVISION_HOST");
        assert_eq!(error.api_error().unwrap().code, "HostUnreachable");
        assert_eq!(
            error.to_string(),
            "Task 't-3' (CREATE_HOST) is in ERROR state: HostUnreachable: no route to host. \
             Examine task for full details."
        );
    }

    #[test]
    fn task_error_without_steps() {
        let error = TaskError::new(Task::new("t-4", "DELETE_VM", TaskState::error()));
        assert!(error.step.is_none());
        assert!(error.api_error().is_none());
    }
}
