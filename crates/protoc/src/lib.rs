//! protoc invocation engine
//!
//! This crate turns a set of `.proto` source trees into per-language
//! generated source trees by composing and executing protoc invocations.
//! It owns proto discovery, directory grouping, the per-language
//! invocation strategies, gRPC plugin resolution, descriptor-set
//! assembly, and the codegen driver itself.
//!
//! Everything runs single-threaded and fail-fast: the first non-zero
//! compiler exit aborts the run and surfaces to the caller. Retrying is
//! the job of whatever schedules the pipeline, not this crate.

mod codegen;
mod descriptor;
mod discovery;
mod plugin;
mod runner;
mod strategy;
mod toolkit;

pub use codegen::{CodeGenInvoker, CodeGenRequest};
pub use descriptor::{build_descriptor_set, DescriptorConfig};
pub use discovery::{find_protos, group_by_dirname, DirectoryGroup};
pub use plugin::PluginCache;
pub use runner::{CommandRunner, Invocation, SystemRunner};
pub use strategy::Strategy;
pub use toolkit::Toolkit;

use proto_client_gen_common::Result;
use std::path::PathBuf;

/// One `--proto_path` flag per root, with the toolkit's well-known
/// protobuf root appended last.
pub(crate) fn proto_path_args(
    roots: &[PathBuf],
    toolkit: &Toolkit,
    runner: &dyn CommandRunner,
) -> Result<Vec<String>> {
    let mut args: Vec<String> = roots
        .iter()
        .map(|root| format!("--proto_path={}", root.display()))
        .collect();
    args.push(format!(
        "--proto_path={}",
        toolkit.protobuf_root(runner)?.display()
    ));
    Ok(args)
}
