use crate::{config::Config, scheduler::Completion, types::StreamId};

/// CPU work-stealing dispatcher.
///
/// `submit` must be asynchronous: it hands the work to a worker pool and
/// returns, and the worker eventually invokes the completion handle once the
/// work body has run. Running the work or finishing the completion
/// synchronously on the submitting thread is a contract violation; the
/// scheduler may be holding its state lock across the call.
pub trait CpuDispatcher<C: Config>: Send + Sync {
    /// Hand one unit of work to the pool.
    fn submit(&self, work: C::Work, completion: Completion<C>);
}

/// Stream placement for one GPU submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpuExecHint {
    /// Execution stream inherited from the producing task, if any. Lets the
    /// consumer skip an explicit cross-stream synchronization with its
    /// producer.
    pub stream: Option<StreamId>,
    /// Set when the submission must synchronize with its producer before
    /// launching: either a second consumer on the same row, or a consumer
    /// already pinned to a different stream.
    pub pre_sync_required: bool,
}

/// GPU command-stream dispatcher.
///
/// Consecutive GPU dispatches within one resolution pass are bracketed by
/// exactly one `start_group`/`finish_group` pair to amortize submission
/// overhead. Step-boundary notifications are forwarded unchanged from the
/// scheduler's `start_simulation`/`stop_simulation`.
pub trait GpuDispatcher<C: Config>: Send + Sync {
    /// Open a submission group.
    fn start_group(&self);
    /// Submit one unit of work into the currently open group.
    fn submit(&self, work: C::Work, hint: GpuExecHint, completion: Completion<C>);
    /// Close the submission group opened by `start_group`.
    fn finish_group(&self);
    /// The owning loop is starting a step.
    fn start_simulation(&self) {}
    /// The owning loop is ending a step.
    fn stop_simulation(&self) {}
}

/// A work handle that can run itself to completion on a worker thread.
///
/// Only required by [`ThreadPoolDispatcher`]; the scheduler itself never
/// inspects work handles.
pub trait Runnable {
    /// Execute the work body.
    fn run(self);
}

/// Convenience CPU dispatcher backed by the global rayon thread pool.
#[cfg(not(feature = "loom"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPoolDispatcher;

#[cfg(not(feature = "loom"))]
impl<C: Config> CpuDispatcher<C> for ThreadPoolDispatcher
where
    C::Work: Runnable,
{
    fn submit(&self, work: C::Work, completion: Completion<C>) {
        rayon::spawn(move || {
            work.run();
            completion.finish();
        });
    }
}
