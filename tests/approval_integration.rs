//! Integration tests for approval sessions
//!
//! Reference files for tests that pass live next to this file as
//! `approval_integration.<test>.ok`. Failing cases are retargeted into a
//! scratch directory so no received artifacts land in the source tree.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use texpect::{approval, emit, Approval, ApprovalError, Emitter, ErrorCode, Registry, TestIdentity};

fn single_logger(registry: &Arc<Registry>) -> Emitter {
    Emitter::new(Arc::clone(registry), "SINGLE")
}

fn test_logger(registry: &Arc<Registry>) -> Emitter {
    Emitter::new(Arc::clone(registry), ["TEST", "LOG"])
}

#[test]
fn approve_exists_and_works() {
    texpect::init_logging();
    let registry = Arc::new(Registry::new());
    approval!(registry, "SINGLE").verify(|| {
        emit!(single_logger(&registry), "This is {:?}!", "ok");
        emit!(test_logger(&registry), "And this wont show up!");
    });
}

#[test]
fn scoped_session_passes_on_drop() {
    let registry = Arc::new(Registry::new());
    let _session = approval!(registry, "SINGLE").start();
    emit!(single_logger(&registry), "scoped capture");
    emit!(test_logger(&registry), "not captured");
}

#[test]
fn fails_with_missing_ok_file() {
    let scratch = tempfile::tempdir().unwrap();
    let registry = Arc::new(Registry::new());
    let approval = approval!(registry, "SINGLE");

    assert!(approval
        .paths()
        .approved
        .ends_with("tests/approval_integration.fails_with_missing_ok_file.ok"));

    let identity = TestIdentity::new(
        scratch.path(),
        approval.identity().file_base(),
        approval.identity().name(),
    );
    let err = approval
        .for_identity(identity)
        .run(|| {
            emit!(single_logger(&registry), "This content should not exist as ok file!");
        })
        .unwrap_err();

    let approved = scratch
        .path()
        .join("approval_integration.fails_with_missing_ok_file.ok");
    let received = scratch
        .path()
        .join("approval_integration.fails_with_missing_ok_file.nok");
    assert_eq!(err.message(), format!("Missing {} file!", approved.display()));
    assert_eq!(
        fs::read_to_string(received).unwrap(),
        "SINGLE: This content should not exist as ok file!\n"
    );
}

#[test]
fn fails_when_content_differs() {
    let scratch = tempfile::tempdir().unwrap();
    fs::write(scratch.path().join("suite.differs.ok"), "LOG TEST: hello").unwrap();
    let registry = Arc::new(Registry::new());

    let err = Approval::new(
        Arc::clone(&registry),
        TestIdentity::new(scratch.path(), "suite", "differs"),
    )
    .dimension(["LOG", "TEST"])
    .run(|| {
        emit!(test_logger(&registry), "goodbye");
    })
    .unwrap_err();

    assert!(matches!(err, ApprovalError::ContentMismatch { .. }));
    let message = err.message();
    assert!(message.starts_with("Content does not match:\n"));
    assert!(message.contains("-LOG TEST: hello"));
    assert!(message.contains("+LOG TEST: goodbye"));
    assert_eq!(
        fs::read_to_string(scratch.path().join("suite.differs.nok")).unwrap(),
        "LOG TEST: goodbye\n"
    );
}

#[test]
fn failing_scope_panics_with_message() {
    let scratch = tempfile::tempdir().unwrap();
    let registry = Arc::new(Registry::new());
    let approval = Approval::new(
        Arc::clone(&registry),
        TestIdentity::new(scratch.path(), "suite", "scoped"),
    )
    .dimension("SINGLE");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _session = approval.start();
        emit!(single_logger(&registry), "nothing approved yet");
    }));

    let payload = outcome.unwrap_err();
    let message = payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default();
    assert!(message.starts_with("Missing "));
    assert!(message.ends_with("suite.scoped.ok file!"));
}

#[test]
fn test_prefix_is_stripped_from_reference_name() {
    let registry = Arc::new(Registry::new());
    let approval = approval!(registry);
    assert_eq!(approval.identity().name(), "test_prefix_is_stripped_from_reference_name");
    assert!(approval
        .paths()
        .received
        .ends_with("approval_integration.prefix_is_stripped_from_reference_name.nok"));
}

#[test]
fn parallel_sessions_capture_independently() {
    let scratch = tempfile::tempdir().unwrap();
    let registry = Arc::new(Registry::new());
    for worker in 0..4 {
        fs::write(
            scratch.path().join(format!("suite.worker{worker}.ok")),
            format!("worker{worker}: line 0\nworker{worker}: line 1\n"),
        )
        .unwrap();
    }

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let registry = Arc::clone(&registry);
            let directory = scratch.path().to_path_buf();
            scope.spawn(move || {
                let tag = format!("worker{worker}");
                Approval::new(
                    Arc::clone(&registry),
                    TestIdentity::new(directory, "suite", tag.as_str()),
                )
                .dimension(tag.as_str())
                .verify(|| {
                    let log = Emitter::new(Arc::clone(&registry), tag.as_str());
                    emit!(log, "line {}", 0);
                    emit!(log, "line {}", 1);
                });
            });
        }
    });
}
