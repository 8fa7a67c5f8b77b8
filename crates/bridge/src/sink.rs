use airlift_protocol::envelope::{Event, Reply};

/// Delivery channel back to the host shell.
///
/// Implementations route replies to the pending JS promise and events to
/// the shell's listener registry. Both methods are fire-and-forget: a
/// sink that can no longer deliver drops the message.
pub trait HostSink: Send + Sync + 'static {
    /// Delivers the terminal reply for a call.
    fn send(&self, reply: Reply);

    /// Emits a named out-of-band event.
    fn emit(&self, event: Event);
}
