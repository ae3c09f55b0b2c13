#![allow(missing_docs)]
#![cfg(feature = "loom")]

use loom::sync::Mutex;
use std::sync::Arc;
use stepgraph::{
    config::Config,
    report::TracingSink,
    scheduler::{Completion, Scheduler},
    task::CpuDispatcher,
    types::TaskKind,
};

#[derive(Debug)]
struct NoWork;

struct TestConfig;

impl Config for TestConfig {
    type Work = NoWork;
}

/// Queues completions instead of running anything, so the model can drive
/// them from concurrently scheduled threads.
struct QueueDispatcher {
    queue: Mutex<Vec<Completion<TestConfig>>>,
}

impl QueueDispatcher {
    fn new() -> Self {
        Self {
            queue: Mutex::new(Vec::new()),
        }
    }

    fn take_all(&self) -> Vec<Completion<TestConfig>> {
        std::mem::take(&mut *self.queue.lock().unwrap())
    }
}

impl CpuDispatcher<TestConfig> for QueueDispatcher {
    fn submit(&self, _work: NoWork, completion: Completion<TestConfig>) {
        self.queue.lock().unwrap().push(completion);
    }
}

#[test]
fn loom_diamond_single_dispatch_under_concurrent_completions() {
    loom::model(|| {
        // Graph:
        //   A   B
        //    \ /
        //     C
        // A's and B's completions race from two threads; C must be submitted
        // exactly once, strictly after both.
        let dispatcher = Arc::new(QueueDispatcher::new());
        let scheduler =
            Scheduler::<TestConfig>::new(Arc::new(TracingSink), dispatcher.clone(), None);

        let a = scheduler.submit(NoWork, TaskKind::Cpu);
        let b = scheduler.submit(NoWork, TaskKind::Cpu);
        let c = scheduler.submit(NoWork, TaskKind::Cpu);
        scheduler.finish_before(a, c);
        scheduler.finish_before(b, c);

        scheduler.start_simulation();

        let mut roots = dispatcher.take_all();
        assert_eq!(roots.len(), 2);
        let second = roots.pop().unwrap();
        let first = roots.pop().unwrap();

        let t1 = loom::thread::spawn(move || first.finish());
        let t2 = loom::thread::spawn(move || second.finish());
        t1.join().unwrap();
        t2.join().unwrap();

        let mut remaining = dispatcher.take_all();
        assert_eq!(remaining.len(), 1);
        let last = remaining.pop().unwrap();
        assert_eq!(last.id(), c);

        last.finish();
        assert_eq!(scheduler.pending_tasks(), 0);
    });
}

#[test]
fn loom_racing_manual_releases_dispatch_once() {
    loom::model(|| {
        let dispatcher = Arc::new(QueueDispatcher::new());
        let scheduler =
            Scheduler::<TestConfig>::new(Arc::new(TracingSink), dispatcher.clone(), None);

        let task = scheduler.submit(NoWork, TaskKind::Cpu);
        // Two external references on top of the self unit.
        scheduler.add_reference(task);
        scheduler.add_reference(task);

        scheduler.start_simulation();
        assert!(dispatcher.take_all().is_empty());

        let lhs = scheduler.clone();
        let rhs = scheduler.clone();
        let t1 = loom::thread::spawn(move || lhs.decr_reference(task));
        let t2 = loom::thread::spawn(move || rhs.decr_reference(task));
        t1.join().unwrap();
        t2.join().unwrap();

        let mut submitted = dispatcher.take_all();
        assert_eq!(submitted.len(), 1);
        submitted.pop().unwrap().finish();
        assert_eq!(scheduler.pending_tasks(), 0);
    });
}
