mod resolve;

use crate::{
    config::Config,
    latch::Countdown,
    report::ErrorSink,
    sync::{lock, AtomicI32, Mutex, Ordering},
    task::{CpuDispatcher, GpuDispatcher},
    types::{NameMap, SlotState, StreamId, TaskId, TaskKind},
};
use derive_more::Debug;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Per-step task graph scheduler.
///
/// Lifecycle of one step:
/// - **Build phase** (single-threaded): [`Scheduler::reset_dependencies`],
///   then task submission ([`Scheduler::register_task`],
///   [`Scheduler::attach`], [`Scheduler::submit`]) and dependency wiring
///   ([`Scheduler::finish_before`], [`Scheduler::start_after`]).
/// - **Run phase**: [`Scheduler::start_simulation`] performs the initial
///   readiness scan; worker threads then report completions concurrently
///   through [`Scheduler::task_completed`] or manual
///   [`Scheduler::decr_reference`] calls, each of which may dispatch further
///   tasks, until the pending counter drains to zero.
///
/// The scheduler is purely reactive: it owns no threads and never blocks.
/// Structural state lives behind one mutex taken once per entry point;
/// readiness counters are atomic countdowns whose decrement-to-zero race
/// resolution guarantees at-most-once dispatch.
#[must_use]
#[derive(Debug)]
pub struct Scheduler<C: Config> {
    #[debug(skip)]
    state: Mutex<Tables<C>>,
    /// Number of registered tasks that have not yet resolved this step.
    pending: AtomicI32,
    #[debug(skip)]
    cpu: Arc<dyn CpuDispatcher<C>>,
    #[debug(skip)]
    gpu: Option<Arc<dyn GpuDispatcher<C>>>,
    #[debug(skip)]
    errors: Arc<dyn ErrorSink>,
    #[debug(skip)]
    weak_self: Weak<Self>,
}

/// All structural state of one step. Slots, edges, and names grow append-only
/// during the build phase and are cleared wholesale by the next reset; ids
/// stay valid for the whole step.
#[derive(Debug)]
pub(crate) struct Tables<C: Config> {
    pub(crate) slots: Vec<Slot<C>>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) names: NameMap,
    /// Scratch list reused by the initial readiness scan.
    pub(crate) start_queue: Vec<TaskId>,
}

/// One task's bookkeeping record for the current step.
#[derive(Debug)]
pub(crate) struct Slot<C: Config> {
    #[debug(skip)]
    pub(crate) work: Option<C::Work>,
    pub(crate) state: SlotState,
    pub(crate) ready: Countdown,
    pub(crate) edges_head: Option<u32>,
    pub(crate) edges_tail: Option<u32>,
    pub(crate) stream: Option<StreamId>,
    pub(crate) pre_sync_required: bool,
}

impl<C: Config> Slot<C> {
    fn placeholder() -> Self {
        Self {
            work: None,
            state: SlotState::Placeholder,
            ready: Countdown::new(),
            edges_head: None,
            edges_tail: None,
            stream: None,
            pre_sync_required: false,
        }
    }
}

/// "When the owning slot completes, release `target`". `next` links the
/// owner's outgoing-edge list inside the edge arena.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Edge {
    pub(crate) target: TaskId,
    pub(crate) next: Option<u32>,
}

/// Handle minted at dispatch time and passed to the executing back-end.
///
/// Invoking [`Completion::finish`] signals that the task's work body has run,
/// triggering a resolution pass on the reporting thread. A completion that
/// outlives its scheduler is a silent no-op.
#[derive(Debug)]
pub struct Completion<C: Config> {
    scheduler: Weak<Scheduler<C>>,
    id: TaskId,
}

impl<C: Config> Completion<C> {
    /// The task this handle completes.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Signal completion of the task's work body.
    pub fn finish(self) {
        if let Some(scheduler) = self.scheduler.upgrade() {
            scheduler.task_completed(self.id);
        }
    }
}

impl<C: Config> Scheduler<C> {
    /// Create a scheduler wired to its diagnostic sink and execution
    /// back-ends. The dispatchers are fixed for the scheduler's lifetime.
    pub fn new(
        errors: Arc<dyn ErrorSink>,
        cpu: Arc<dyn CpuDispatcher<C>>,
        gpu: Option<Arc<dyn GpuDispatcher<C>>>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            state: Mutex::new(Tables {
                slots: Vec::new(),
                edges: Vec::new(),
                names: NameMap::default(),
                start_queue: Vec::new(),
            }),
            pending: AtomicI32::new(0),
            cpu,
            gpu,
            errors,
            weak_self: weak_self.clone(),
        })
    }

    /// Register a task slot and return its id.
    ///
    /// A known name returns the existing id, placeholder or real. Otherwise a
    /// fresh placeholder slot is allocated with one readiness unit (the
    /// implicit self reference consumed by the initial scan) and the pending
    /// counter is bumped.
    pub fn register_task(&self, name: Option<&str>) -> TaskId {
        let mut tables = lock(&self.state);
        if let Some(name) = name {
            if let Some(&id) = tables.names.get(name) {
                return id;
            }
        }
        let id = TaskId(tables.slots.len() as u32);
        tables.slots.push(Slot::placeholder());
        self.pending.fetch_add(1, Ordering::AcqRel);
        if let Some(name) = name {
            tables.names.insert(name.to_owned(), id);
        }
        trace!(task = ?id, name = ?name, "registered task slot");
        id
    }

    /// Look up a task id by name, creating a placeholder slot on first
    /// reference. This is intentional: it lets dependency wiring precede the
    /// submission of the real task.
    pub fn named_task(&self, name: &str) -> TaskId {
        self.register_task(Some(name))
    }

    /// Attach the work handle and execution kind to a previously registered
    /// slot, preserving its id and any edges already pointing at it.
    ///
    /// # Panics
    /// If the slot already has work attached.
    pub fn attach(&self, id: TaskId, work: C::Work, kind: TaskKind) {
        let mut tables = lock(&self.state);
        let slot = &mut tables.slots[id.index()];
        assert!(
            slot.state == SlotState::Placeholder && slot.work.is_none(),
            "task {id:?} already has work attached"
        );
        slot.work = Some(work);
        slot.state = kind.into();
    }

    /// Register and attach an unnamed task in one call.
    pub fn submit(&self, work: C::Work, kind: TaskKind) -> TaskId {
        let id = self.register_task(None);
        self.attach(id, work, kind);
        id
    }

    /// Register and attach a named task in one call. If the name was forward
    /// referenced, the existing placeholder is filled in.
    pub fn submit_named(&self, name: &str, work: C::Work, kind: TaskKind) -> TaskId {
        let id = self.register_task(Some(name));
        self.attach(id, work, kind);
        id
    }

    /// Require `task` to complete before `before` may be dispatched.
    pub fn finish_before(&self, task: TaskId, before: TaskId) {
        self.add_edge(task, before);
    }

    /// Require `task` to wait for `after`'s completion before it may be
    /// dispatched. The same edge as [`Scheduler::finish_before`], expressed
    /// from the other endpoint.
    pub fn start_after(&self, task: TaskId, after: TaskId) {
        self.add_edge(after, task);
    }

    fn add_edge(&self, owner: TaskId, target: TaskId) {
        let mut tables = lock(&self.state);
        debug_assert_ne!(
            tables.slots[target.index()].state,
            SlotState::Completed,
            "dependency added on a completed task"
        );
        let edge = tables.edges.len() as u32;
        tables.edges.push(Edge { target, next: None });
        let prev_tail = {
            let owner_slot = &mut tables.slots[owner.index()];
            let prev = owner_slot.edges_tail.replace(edge);
            if prev.is_none() {
                owner_slot.edges_head = Some(edge);
            }
            prev
        };
        if let Some(tail) = prev_tail {
            tables.edges[tail as usize].next = Some(edge);
        }
        tables.slots[target.index()].ready.arm();
    }

    /// Seed a GPU slot's execution-stream hint. During resolution the hint is
    /// handed to at most one forward GPU consumer; any further candidate is
    /// flagged as requiring an explicit pre-synchronization instead.
    pub fn set_stream_hint(&self, id: TaskId, stream: StreamId) {
        let mut tables = lock(&self.state);
        tables.slots[id.index()].stream = Some(stream);
    }

    /// Clear all slots, edges, and names for the next step.
    ///
    /// The previous step must be fully drained; calling this with a nonzero
    /// pending counter is a programmer contract violation checked in debug
    /// builds only.
    pub fn reset_dependencies(&self) {
        debug_assert_eq!(
            self.pending.load(Ordering::Acquire),
            0,
            "reset_dependencies called with undrained tasks"
        );
        let mut tables = lock(&self.state);
        tables.slots.clear();
        tables.edges.clear();
        tables.names.clear();
        tables.start_queue.clear();
        self.pending.store(0, Ordering::Release);
        debug!("dependency graph reset");
    }

    /// Add one readiness unit to a slot, deferring its dispatch until a
    /// matching [`Scheduler::decr_reference`].
    pub fn add_reference(&self, id: TaskId) {
        let tables = lock(&self.state);
        tables.slots[id.index()].ready.arm();
    }

    /// Current readiness count of a slot: unresolved prerequisites plus
    /// manual references, plus the implicit self unit before the initial
    /// scan.
    pub fn reference_count(&self, id: TaskId) -> i32 {
        let tables = lock(&self.state);
        tables.slots[id.index()].ready.count()
    }

    /// Number of registered tasks that have not yet resolved this step.
    pub fn pending_tasks(&self) -> i32 {
        self.pending.load(Ordering::Acquire)
    }

    pub(crate) fn completion(&self, id: TaskId) -> Completion<C> {
        Completion {
            scheduler: self.weak_self.clone(),
            id,
        }
    }
}
