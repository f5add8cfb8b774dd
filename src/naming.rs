//! Test identity resolution.
//!
//! Reference files are named after the test that owns them. The identity is
//! captured at compile time at the call site (`file!()`, the crate manifest
//! directory and the enclosing function's name) instead of by inspecting the
//! call stack at runtime.

use std::path::{Path, PathBuf};

use crate::config::ApprovalConfig;

/// Conventional prefix stripped from test and file names.
pub const TEST_PREFIX: &str = "test_";

/// Strip `prefix` from `name`, if present.
pub fn strip_prefix_with<'a>(name: &'a str, prefix: &str) -> &'a str {
    name.strip_prefix(prefix).unwrap_or(name)
}

/// Reduce the type name of a marker fn nested inside a function to that
/// function's bare name.
///
/// Closure and async-block segments are skipped, so a marker expanded inside
/// a closure still resolves to the function that contains the closure.
#[doc(hidden)]
pub fn function_leaf(marker_path: &'static str) -> &'static str {
    let mut path = marker_path
        .rsplit_once("::")
        .map(|(owner, _marker)| owner)
        .unwrap_or(marker_path);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path.rsplit("::").next().unwrap_or(path)
}

/// Name of the function enclosing the macro call, prefix not stripped.
#[macro_export]
macro_rules! caller_name {
    () => {{
        fn __texpect_marker() {}
        fn __texpect_type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::naming::function_leaf(__texpect_type_name_of(__texpect_marker))
    }};
}

/// [`TestIdentity`] of the test function enclosing the macro call.
///
/// `test_identity!("name")` overrides the logical test name.
#[macro_export]
macro_rules! test_identity {
    () => {
        $crate::naming::TestIdentity::from_source(
            ::core::env!("CARGO_MANIFEST_DIR"),
            ::core::file!(),
            $crate::caller_name!(),
        )
    };
    ($name:expr) => {
        $crate::test_identity!().with_name($name)
    };
}

/// Reference and received file locations for one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalPaths {
    pub approved: PathBuf,
    pub received: PathBuf,
}

/// Explicit identity of the running test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestIdentity {
    directory: PathBuf,
    file_base: String,
    name: String,
}

impl TestIdentity {
    pub fn new(
        directory: impl Into<PathBuf>,
        file_base: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            file_base: file_base.into(),
            name: name.into(),
        }
    }

    /// Build an identity from a `file!()` path relative to the manifest
    /// directory or to one of its ancestors (workspace members).
    pub fn from_source(manifest_dir: &str, source_file: &str, function: &str) -> Self {
        let source = resolve_source(Path::new(manifest_dir), Path::new(source_file));
        let directory = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(manifest_dir));
        let file_base = source
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        Self::new(directory, file_base, function)
    }

    /// Override the logical test name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_base(&self) -> &str {
        &self.file_base
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<dir>/<filebase>.<name>.<ext>` for both artifacts.
    pub fn paths(&self, config: &ApprovalConfig) -> ApprovalPaths {
        let stem = format!(
            "{}.{}",
            strip_prefix_with(&self.file_base, &config.test_prefix),
            strip_prefix_with(&self.name, &config.test_prefix)
        );
        ApprovalPaths {
            approved: self
                .directory
                .join(format!("{}.{}", stem, config.approved_extension)),
            received: self
                .directory
                .join(format!("{}.{}", stem, config.received_extension)),
        }
    }
}

fn resolve_source(manifest_dir: &Path, source: &Path) -> PathBuf {
    if source.is_absolute() {
        return source.to_path_buf();
    }
    manifest_dir
        .ancestors()
        .map(|root| root.join(source))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| manifest_dir.join(source))
}
