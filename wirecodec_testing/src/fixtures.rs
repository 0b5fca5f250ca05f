//! `rstest` fixtures and sample messages shared by the test suites.

use bincode::{Decode, Encode};
use rstest::fixture;
use serde::{Deserialize, Serialize};
use wirecodec::{
    CodecRegistry,
    frame::{LengthFormat, LengthPrefixedCodec},
};

/// Lifecycle state reported for a task.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    #[default]
    Staging,
    Running,
    Finished,
    Failed,
}

/// Sample message supporting both the binary and the textual representation.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskStatus {
    pub task_id: String,
    pub state: TaskState,
    pub message: Option<String>,
    pub data: Vec<u8>,
}

impl TaskStatus {
    /// A running task with no attached data.
    #[must_use]
    pub fn running(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_owned(),
            state: TaskState::Running,
            ..Self::default()
        }
    }

    /// Attach `len` bytes of opaque data.
    #[must_use]
    pub fn with_data(mut self, len: usize) -> Self {
        self.data = (0..len).map(|i| (i % 251) as u8).collect();
        self
    }
}

/// Registry holding the built-in codecs.
#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn registry() -> CodecRegistry { CodecRegistry::with_defaults() }

/// Default four byte big-endian length-prefixed framing.
#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn length_codec() -> LengthPrefixedCodec {
    LengthPrefixedCodec::new(LengthFormat::u32_be(), 1024 * 1024)
}

/// A batch of statuses covering every state and a range of data sizes.
#[fixture]
pub fn task_statuses() -> Vec<TaskStatus> {
    vec![
        TaskStatus::default(),
        TaskStatus::running("web-1"),
        TaskStatus {
            task_id: "batch-7".into(),
            state: TaskState::Finished,
            message: Some("exit 0".into()),
            data: Vec::new(),
        },
        TaskStatus {
            task_id: "batch-8".into(),
            state: TaskState::Failed,
            message: Some("oom".into()),
            data: vec![0xFF; 3],
        },
        TaskStatus::running("cache").with_data(70 * 1024),
    ]
}
