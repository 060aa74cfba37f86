//! Companion toolkit locator
//!
//! Some resources are not on `PATH` but are produced or located by the
//! companion toolkit build: the well-known protobuf include root and
//! the Java gRPC plugin. Those are resolved by running the toolkit's
//! gradle wrapper and parsing its conventional output line.

use crate::runner::{CommandRunner, Invocation};
use proto_client_gen_common::{PipelineError, Result};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

/// Handle to a toolkit checkout, with a memoized protobuf root.
///
/// The protobuf root is resolved at most once per process; plugin and
/// include locations are assumed stable for the process lifetime.
pub struct Toolkit {
    path: PathBuf,
    protobuf_root: OnceCell<PathBuf>,
}

impl Toolkit {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            protobuf_root: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a gradle task in the toolkit directory and return the value
    /// of its `output: `-prefixed line. Toolkit tasks print their
    /// result with that prefix by convention.
    pub fn gradle_output(&self, runner: &dyn CommandRunner, task: &str) -> Result<String> {
        let invocation =
            Invocation::new("./gradlew", vec![task.to_string()]).in_dir(self.path.clone());
        let stdout = runner.capture(&invocation)?;
        stdout
            .lines()
            .find_map(|line| line.strip_prefix("output: "))
            .map(str::to_string)
            .ok_or_else(|| {
                PipelineError::PluginNotFound(format!(
                    "gradle task {task} printed no 'output:' line"
                ))
            })
    }

    /// Location of the well-known protobuf source root, passed as an
    /// extra `--proto_path` on every compiler invocation.
    pub fn protobuf_root(&self, runner: &dyn CommandRunner) -> Result<&Path> {
        if let Some(root) = self.protobuf_root.get() {
            return Ok(root);
        }
        let root = PathBuf::from(self.gradle_output(runner, "showProtobufPath")?);
        Ok(self.protobuf_root.get_or_init(|| root))
    }

    /// Location of the standalone Java gRPC plugin binary.
    pub fn grpc_java_plugin(&self, runner: &dyn CommandRunner) -> Result<PathBuf> {
        Ok(PathBuf::from(
            self.gradle_output(runner, "showGrpcJavaPluginPath")?,
        ))
    }
}
