//! Approval sessions: capture routed output and compare it against a
//! golden-master reference file.
//!
//! A session binds an in-memory capture to a set of dimension keys for the
//! duration of a test. When the session ends normally the capture is
//! compared with `<dir>/<filebase>.<name>.ok`; on any difference the capture
//! is written verbatim to `<dir>/<filebase>.<name>.nok` and the session
//! fails with a unified diff.
//!
//! Two equivalent forms are supported:
//! - scoped: `let session = approval.start();` ... the comparison runs when
//!   `session` is finished or dropped
//! - wrapped: `approval.verify(|| { ... })` around a whole test body
//!
//! If the test body panics, the comparison is skipped and the original
//! panic propagates unchanged.

use std::fs;
use std::io::ErrorKind;
use std::sync::Arc;
use std::thread;

use crate::config::ApprovalConfig;
use crate::error::{log_approval_error, ApprovalError, ErrorCode};
use crate::naming::{ApprovalPaths, TestIdentity};
use crate::registry::Registry;
use crate::sink::{SharedBuffer, StreamSink};
use crate::tags::DimensionKey;

pub mod compare;

/// Build an [`Approval`] for the test function enclosing the macro call.
///
/// ```ignore
/// let session = texpect::approval!(registry, "SINGLE", ["LOG", "TEST"]).start();
/// ```
#[macro_export]
macro_rules! approval {
    ($registry:expr $(, $key:expr)* $(,)?) => {
        $crate::approval::Approval::new(($registry).clone(), $crate::test_identity!())
            $(.dimension($key))*
    };
}

/// Lifecycle of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Keys bound to the capture buffer
    Capturing,
    /// Capture matched the reference file
    Passed,
    /// Capture differed from the reference file
    FailedMismatch,
    /// Reference file did not exist
    FailedMissingReference,
    /// Comparison skipped or aborted by an I/O failure
    Done,
}

/// Configuration of an approval: which keys to capture and for which test.
#[derive(Debug, Clone)]
pub struct Approval {
    registry: Arc<Registry>,
    identity: TestIdentity,
    keys: Vec<DimensionKey>,
    config: ApprovalConfig,
}

impl Approval {
    /// Approval for `identity`, configured from the nearest `texpect.json`
    /// above the identity's directory.
    pub fn new(registry: Arc<Registry>, identity: TestIdentity) -> Self {
        let config = ApprovalConfig::discover(identity.directory());
        Self {
            registry,
            identity,
            keys: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &ApprovalConfig {
        &self.config
    }

    /// Capture messages routed through `key` as well.
    pub fn dimension(mut self, key: impl Into<DimensionKey>) -> Self {
        self.keys.push(key.into());
        self
    }

    pub fn with_config(mut self, config: ApprovalConfig) -> Self {
        self.config = config;
        self
    }

    /// Re-target this approval at another test, keeping keys and config.
    ///
    /// Lets one configured approval wrap many distinctly named tests without
    /// their reference files colliding.
    pub fn for_identity(mut self, identity: TestIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn identity(&self) -> &TestIdentity {
        &self.identity
    }

    pub fn keys(&self) -> &[DimensionKey] {
        &self.keys
    }

    pub fn paths(&self) -> ApprovalPaths {
        self.identity.paths(&self.config)
    }

    /// Bind every key to a fresh capture buffer and start capturing.
    pub fn start(self) -> ApprovalSession {
        let paths = self.paths();
        let buffer = SharedBuffer::new();
        self.registry
            .bind(&self.keys, StreamSink::shared(buffer.clone()));
        log::debug!(
            "[Approval] Capturing {} dimension(s) for {}",
            self.keys.len(),
            paths.approved.display()
        );

        ApprovalSession {
            paths,
            keys: self.keys,
            context_lines: self.config.context_lines,
            buffer,
            state: SessionState::Capturing,
            verdict: None,
        }
    }

    /// Run `body` under a capture and compare afterwards.
    ///
    /// A panic in `body` propagates unchanged and skips the comparison.
    pub fn run<R>(self, body: impl FnOnce() -> R) -> Result<R, ApprovalError> {
        let mut session = self.start();
        let value = body();
        session.finish().map(|()| value)
    }

    /// Like [`run`](Self::run), but fails the test by panicking with the
    /// approval message.
    pub fn verify<R>(self, body: impl FnOnce() -> R) -> R {
        match self.run(body) {
            Ok(value) => value,
            Err(err) => panic!("{}", err.message()),
        }
    }
}

/// An active capture bound into the registry.
///
/// Dropping an unfinished session performs the comparison and panics on
/// failure, unless the thread is already panicking.
#[derive(Debug)]
pub struct ApprovalSession {
    paths: ApprovalPaths,
    keys: Vec<DimensionKey>,
    context_lines: usize,
    buffer: SharedBuffer,
    state: SessionState,
    verdict: Option<Result<(), ApprovalError>>,
}

impl ApprovalSession {
    pub fn paths(&self) -> &ApprovalPaths {
        &self.paths
    }

    pub fn keys(&self) -> &[DimensionKey] {
        &self.keys
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Everything captured so far.
    pub fn captured(&self) -> String {
        self.buffer.contents()
    }

    /// Compare the capture with the reference file.
    ///
    /// Runs once; later calls return the first verdict.
    pub fn finish(&mut self) -> Result<(), ApprovalError> {
        if let Some(verdict) = &self.verdict {
            return verdict.clone();
        }

        let verdict = self.judge();
        self.state = match &verdict {
            Ok(()) => SessionState::Passed,
            Err(ApprovalError::ContentMismatch { .. }) => SessionState::FailedMismatch,
            Err(ApprovalError::MissingReference { .. }) => SessionState::FailedMissingReference,
            Err(_) => SessionState::Done,
        };
        if let Err(err) = &verdict {
            log_approval_error(err, &self.paths.approved.display().to_string());
        }
        self.verdict = Some(verdict.clone());
        verdict
    }

    fn judge(&self) -> Result<(), ApprovalError> {
        let captured = self.buffer.bytes();
        let approved = &self.paths.approved;

        let reference = match fs::read(approved) {
            Ok(reference) => reference,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.write_received(&captured)?;
                return Err(ApprovalError::MissingReference {
                    approved: approved.clone(),
                    received: self.paths.received.clone(),
                });
            }
            Err(err) => return Err(ApprovalError::io(approved, err)),
        };

        let expected = String::from_utf8_lossy(&reference);
        let actual = String::from_utf8_lossy(&captured);
        match compare::changes(&expected, &actual, self.context_lines) {
            None => {
                log::debug!("[Approval] {} approved", approved.display());
                Ok(())
            }
            Some(diff) => {
                self.write_received(&captured)?;
                Err(ApprovalError::ContentMismatch {
                    diff,
                    received: self.paths.received.clone(),
                })
            }
        }
    }

    fn write_received(&self, captured: &[u8]) -> Result<(), ApprovalError> {
        let received = &self.paths.received;
        fs::write(received, captured).map_err(|err| ApprovalError::io(received, err))?;
        log::info!("[Approval] Wrote received output to {}", received.display());
        Ok(())
    }
}

impl Drop for ApprovalSession {
    fn drop(&mut self) {
        if self.verdict.is_some() {
            return;
        }
        if thread::panicking() {
            log::debug!(
                "[Approval] Test body failed, skipping comparison for {}",
                self.paths.approved.display()
            );
            self.state = SessionState::Done;
            return;
        }
        if let Err(err) = self.finish() {
            panic!("{}", err.message());
        }
    }
}
