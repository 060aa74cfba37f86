//! gRPC plugin path resolution and caching

use crate::runner::{CommandRunner, Invocation};
use crate::strategy::{PluginKind, Strategy};
use crate::toolkit::Toolkit;
use proto_client_gen_common::{Language, PipelineError, Result};
use std::collections::HashMap;
use std::path::PathBuf;

/// Process-local cache of resolved plugin paths, keyed by language.
///
/// Resolution shells out (to `which` or to the toolkit) at most once
/// per language; the result, including "this language has no plugin",
/// is reused for the remainder of the process. The cache is owned by
/// the caller and passed by reference into invocations, never global.
#[derive(Default)]
pub struct PluginCache {
    resolved: HashMap<Language, Option<PathBuf>>,
}

impl PluginCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the standalone gRPC plugin for a language, or `None`
    /// where gRPC generation needs no separate plugin.
    pub fn resolve(
        &mut self,
        strategy: &Strategy,
        toolkit: &Toolkit,
        runner: &dyn CommandRunner,
    ) -> Result<Option<PathBuf>> {
        if let Some(cached) = self.resolved.get(&strategy.language()) {
            return Ok(cached.clone());
        }

        let path = match strategy.plugin_kind() {
            PluginKind::None => None,
            PluginKind::Which(name) => Some(which(name, runner)?),
            PluginKind::Toolkit => Some(toolkit.grpc_java_plugin(runner)?),
        };

        self.resolved.insert(strategy.language(), path.clone());
        Ok(path)
    }
}

fn which(name: &str, runner: &dyn CommandRunner) -> Result<PathBuf> {
    let stdout = runner
        .capture(&Invocation::new("which", vec![name.to_string()]))
        .map_err(|_| PipelineError::PluginNotFound(name.to_string()))?;
    if stdout.is_empty() {
        return Err(PipelineError::PluginNotFound(name.to_string()));
    }
    Ok(PathBuf::from(stdout))
}
