use core::num::NonZeroU32;
use rustc_hash::FxBuildHasher;
use std::collections::HashMap;

/// Dense identifier of a task slot, assigned at registration and stable for
/// the duration of one step. Never reused mid-step; invalidated by
/// `reset_dependencies`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TaskId(pub(crate) u32);

impl TaskId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// GPU execution-stream identifier carried by the stream-hint optimization.
pub type StreamId = NonZeroU32;

/// Execution back-end for an attached unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Submitted to the CPU work-stealing dispatcher.
    Cpu,
    /// Submitted to the GPU command-stream dispatcher.
    Gpu,
}

/// Lifecycle state of a slot within one step.
///
/// `Placeholder` covers both a named forward reference awaiting its real
/// submission and a pure synchronization node that is never attached at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotState {
    Placeholder,
    Cpu,
    Gpu,
    Completed,
}

impl From<TaskKind> for SlotState {
    fn from(kind: TaskKind) -> Self {
        match kind {
            TaskKind::Cpu => Self::Cpu,
            TaskKind::Gpu => Self::Gpu,
        }
    }
}

pub(crate) type NameMap = HashMap<String, TaskId, FxBuildHasher>;
