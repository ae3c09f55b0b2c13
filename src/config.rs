/// Configuration entry-point for instantiating the scheduler.
///
/// A concrete `Config` binds the caller-owned work-handle type that the
/// scheduler routes to its dispatchers. The handle is opaque to the scheduler
/// itself: it is stored at submission, handed to a back-end at dispatch, and
/// never inspected.
pub trait Config: Sized + 'static {
    /// The unit of work attached to a task slot. Must be sendable because
    /// dispatch may hand it to a worker thread owned by a back-end.
    type Work: Send + 'static;
}
