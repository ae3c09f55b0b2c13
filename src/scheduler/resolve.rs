//! Run-phase engine: the initial readiness scan, resolution passes triggered
//! by completion callbacks, and dispatch coordination across the CPU and GPU
//! back-ends.

use super::{Edge, Scheduler, Tables};
use crate::{
    config::Config,
    report::{Anomaly, Severity},
    sync::{lock, Ordering},
    task::GpuExecHint,
    types::{SlotState, TaskId},
};
use core::mem;
use tracing::{debug, trace};

impl<C: Config> Scheduler<C> {
    /// Start the step: perform the one-time initial scan and dispatch every
    /// task whose only outstanding readiness unit was the implicit self
    /// reference. This is how zero-dependency tasks become runnable without
    /// any predecessor ever completing.
    pub fn start_simulation(&self) {
        if let Some(gpu) = &self.gpu {
            gpu.start_simulation();
        }
        // Empty task graph: nothing to scan, nothing to dispatch.
        if self.pending_tasks() == 0 {
            return;
        }
        let mut tables = lock(&self.state);
        let mut ready = mem::take(&mut tables.start_queue);
        for (index, slot) in tables.slots.iter().enumerate() {
            if slot.state == SlotState::Completed {
                continue;
            }
            if slot.ready.release() {
                ready.push(TaskId(index as u32));
            }
        }
        debug!(
            roots = ready.len(),
            pending = self.pending_tasks(),
            "simulation step started"
        );
        let mut gpu_open = false;
        for &id in &ready {
            gpu_open = self.dispatch_task(&mut tables, id, gpu_open);
        }
        ready.clear();
        tables.start_queue = ready;
        if gpu_open {
            if let Some(gpu) = &self.gpu {
                gpu.finish_group();
            }
        }
    }

    /// End the step: forward the notification to the GPU dispatcher.
    pub fn stop_simulation(&self) {
        if let Some(gpu) = &self.gpu {
            gpu.stop_simulation();
        }
    }

    /// Signal that `id`'s work body has run. Walks the slot's outgoing edges,
    /// releases each dependent, dispatches every dependent that reaches zero
    /// readiness, and closes the GPU batch group if this pass opened one.
    ///
    /// Callable concurrently from any worker thread; each call runs one
    /// resolution pass synchronously on the reporting thread.
    pub fn task_completed(&self, id: TaskId) {
        let mut tables = lock(&self.state);
        if self.resolve_row(&mut tables, id, false) {
            if let Some(gpu) = &self.gpu {
                gpu.finish_group();
            }
        }
    }

    /// Manually release one readiness unit, dispatching `id` on the zero
    /// transition exactly like a completed prerequisite would. Intended for
    /// completions signalled outside the normal worker-callback path, such as
    /// a polled external event.
    pub fn decr_reference(&self, id: TaskId) {
        let mut tables = lock(&self.state);
        if tables.slots[id.index()].ready.release() {
            if self.dispatch_task(&mut tables, id, false) {
                if let Some(gpu) = &self.gpu {
                    gpu.finish_group();
                }
            }
        }
    }

    /// One resolution pass: release every dependent of `id`, dispatching the
    /// ones that become ready, then retire `id` from the pending counter.
    /// Returns whether a GPU batch group is open after the pass.
    fn resolve_row(&self, tables: &mut Tables<C>, id: TaskId, mut gpu_open: bool) -> bool {
        let stream = tables.slots[id.index()].stream;
        let mut edge = tables.slots[id.index()].edges_head;
        // The producer's stream goes to at most one dependent on this row;
        // every further GPU dependent must synchronize explicitly.
        let mut stream_claimed = false;
        while let Some(index) = edge {
            let Edge { target, next } = tables.edges[index as usize];
            let became_ready = {
                let dependent = &mut tables.slots[target.index()];
                if let Some(stream) = stream {
                    if dependent.work.is_some() && dependent.state == SlotState::Gpu {
                        if dependent.stream.is_some() || stream_claimed {
                            dependent.pre_sync_required = true;
                        } else {
                            dependent.stream = Some(stream);
                            stream_claimed = true;
                        }
                    }
                }
                dependent.ready.release()
            };
            if became_ready {
                gpu_open = self.dispatch_task(tables, target, gpu_open);
            }
            edge = next;
        }
        self.pending.fetch_sub(1, Ordering::AcqRel);
        trace!(task = ?id, pending = self.pending_tasks(), "task resolved");
        gpu_open
    }

    /// Route a ready slot to its back-end. Returns the GPU batch flag after
    /// this dispatch: `true` once a group has been opened in the current
    /// pass.
    fn dispatch_task(&self, tables: &mut Tables<C>, id: TaskId, gpu_open: bool) -> bool {
        let slot = &mut tables.slots[id.index()];
        match slot.state {
            SlotState::Completed => {
                // Re-dispatch of a finished slot: report and skip. Its
                // dependents were already released the first time around, so
                // walking the row again would double-release them.
                self.errors
                    .report(Severity::Warning, &Anomaly::DoubleDispatch(id));
                gpu_open
            }
            SlotState::Cpu => {
                slot.state = SlotState::Completed;
                let work = slot.work.take();
                trace!(task = ?id, "dispatching CPU task");
                if let Some(work) = work {
                    self.cpu.submit(work, self.completion(id));
                }
                gpu_open
            }
            SlotState::Gpu => {
                slot.state = SlotState::Completed;
                let hint = GpuExecHint {
                    stream: slot.stream,
                    pre_sync_required: slot.pre_sync_required,
                };
                let work = slot.work.take();
                match &self.gpu {
                    Some(gpu) => {
                        if let Some(work) = work {
                            if !gpu_open {
                                gpu.start_group();
                            }
                            trace!(task = ?id, ?hint, "dispatching GPU task");
                            gpu.submit(work, hint, self.completion(id));
                            true
                        } else {
                            // Unreachable through the public API: the GPU
                            // state is only ever set together with the work.
                            self.resolve_row(tables, id, gpu_open)
                        }
                    }
                    None => {
                        // No back-end to execute on: fail open so dependents
                        // are not stalled behind work that can never run.
                        self.errors
                            .report(Severity::Warning, &Anomaly::MissingGpuDispatcher(id));
                        self.resolve_row(tables, id, gpu_open)
                    }
                }
            }
            SlotState::Placeholder => {
                // Pure synchronization node: nothing to execute, its
                // dependents are unblocked immediately.
                slot.state = SlotState::Completed;
                self.resolve_row(tables, id, gpu_open)
            }
        }
    }
}
