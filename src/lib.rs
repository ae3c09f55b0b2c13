//! Per-simulation-step task graph scheduler with mixed CPU/GPU dispatch.
//!
//! This crate provides the dependency-resolution core of a stepped simulation
//! loop. It:
//! - Keeps one slot per submitted task with an atomic readiness countdown and
//!   an append-only outgoing-edge list, both stable for the duration of a
//!   step.
//! - Supports forward references: declaring a dependency on a named task that
//!   has not been submitted yet creates a placeholder slot which is later
//!   filled in by the real submission, keeping its id and edges.
//! - Resolves completions reactively on whichever worker thread reports them;
//!   exactly one of the concurrent decrements on a shared countdown observes
//!   the zero transition, so each dependent is dispatched at most once and
//!   only after all of its prerequisites.
//! - Routes ready tasks to a CPU or GPU back-end, batching consecutive GPU
//!   dispatches of one resolution pass into a single group and handing a
//!   producer's execution-stream hint to at most one forward consumer.
//!
//! Key modules:
//! - `config`: binds a concrete work-handle type to the scheduler via the
//!   `Config` trait.
//! - `task`: the `CpuDispatcher`/`GpuDispatcher` collaborator interfaces and a
//!   rayon-backed convenience dispatcher.
//! - `scheduler`: the `Scheduler` itself, covering build-phase submission and
//!   wiring plus run-phase resolution and dispatch coordination.
//! - `latch`: the `Countdown` primitive backing every slot's readiness
//!   counter, also usable for ad hoc caller-side synchronization.
//! - `report`: the diagnostic sink through which recoverable anomalies are
//!   reported.
//!
//! Quick start:
//! 1. Implement [`config::Config`] with your work-handle type and the
//!    dispatcher traits in [`task`] for your execution back-ends.
//! 2. Create a [`scheduler::Scheduler`] wired to the dispatchers.
//! 3. Once per step: `reset_dependencies`, submit tasks and edges, then
//!    `start_simulation`; workers report back through `task_completed` (or a
//!    [`scheduler::Completion`] handle) until the step drains.
//!
//! The scheduler owns no worker threads and never blocks: its code runs
//! synchronously and briefly on whichever thread calls into it. Task bodies
//! execute entirely on threads owned by the external dispatchers.

/// Public interface to configure a scheduler instantiation.
///
/// Exposes the `Config` trait which binds the work-handle type for a concrete
/// instantiation of the scheduler.
pub mod config;
/// Atomic countdown latch used for every slot's readiness counter.
pub mod latch;
/// Diagnostic sink: anomaly taxonomy, severities, and the default
/// tracing-backed sink.
pub mod report;
/// The per-step task graph scheduler.
///
/// Contains the task registry, dependency graph, and name table behind the
/// build-phase API, plus the run-phase resolution engine and dispatch
/// coordinator.
pub mod scheduler;
mod sync;
/// Collaborator interfaces consumed by the scheduler: CPU and GPU dispatchers
/// and the stream-placement hint passed with GPU submissions.
pub mod task;
/// Core identifier and kind types shared across the crate.
pub mod types;
