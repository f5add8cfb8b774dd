// texpect - tag-routed trace capture for golden-master tests
// Emitters route messages by tag set; approval sessions capture selected
// tag sets and compare them against checked-in reference files.

// Module declarations
pub mod approval;
pub mod artifacts;
pub mod config;
pub mod emitter;
pub mod error;
pub mod naming;
pub mod registry;
pub mod sink;
pub mod tags;

// Re-exports for convenience
pub use approval::{Approval, ApprovalSession, SessionState};
pub use config::ApprovalConfig;
pub use emitter::Emitter;
pub use error::{ApprovalError, ErrorCode};
pub use naming::{ApprovalPaths, TestIdentity};
pub use registry::Registry;
pub use sink::{SharedBuffer, StreamSink};
pub use tags::DimensionKey;

/// Install a `tracing` subscriber for the crate's diagnostics.
///
/// Output goes through the test writer so it is captured per test. Records
/// emitted through the `log` facade are bridged. Calling this more than
/// once is harmless.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_target(false)
        .try_init();
}
