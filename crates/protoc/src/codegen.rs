//! Per-language code generation driver

use crate::discovery::{find_protos, group_by_dirname};
use crate::plugin::PluginCache;
use crate::runner::{CommandRunner, Invocation};
use crate::strategy::Strategy;
use crate::toolkit::Toolkit;
use proto_client_gen_common::{pkg_root_dir, Language, Result};
use std::fs;
use std::path::PathBuf;

/// One immutable generation job
#[derive(Debug, Clone)]
pub struct CodeGenRequest {
    pub language: Language,
    pub src_proto_paths: Vec<PathBuf>,
    pub import_proto_paths: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub api_name: String,
    /// Generate message/serialization code.
    pub gen_proto: bool,
    /// Generate gRPC client stubs.
    pub gen_grpc: bool,
}

/// Composes and executes the compiler invocations for one language.
///
/// Given identical inputs and a clean output directory the invoker is
/// idempotent; it never clears stale output itself. On a compiler
/// failure the partial output is left in place and the caller should
/// regenerate from clean state.
pub struct CodeGenInvoker<'a> {
    toolkit: &'a Toolkit,
    runner: &'a dyn CommandRunner,
    plugins: &'a mut PluginCache,
}

impl<'a> CodeGenInvoker<'a> {
    pub fn new(
        toolkit: &'a Toolkit,
        runner: &'a dyn CommandRunner,
        plugins: &'a mut PluginCache,
    ) -> Self {
        Self {
            toolkit,
            runner,
            plugins,
        }
    }

    /// Run code generation and return the populated package directory,
    /// `<output_dir>/<api_name>-gen-<language>`.
    ///
    /// One compiler invocation per directory group, in group order,
    /// aborting on the first non-zero exit. Later groups are not
    /// invoked after a failure.
    pub fn generate(&mut self, request: &CodeGenRequest) -> Result<PathBuf> {
        let strategy = Strategy::for_language(request.language);
        let pkg_dir = prepare_pkg_dir(&strategy, request)?;

        let mut flags = Vec::new();
        if request.gen_proto {
            // with_grpc folds Go's in-process plugin into the output flag.
            flags.push(strategy.lang_out_flag(&pkg_dir, request.gen_grpc));
        }
        if request.gen_grpc {
            if let Some(plugin) = self.plugins.resolve(&strategy, self.toolkit, self.runner)? {
                flags.push(format!("--plugin=protoc-gen-grpc={}", plugin.display()));
                if let Some(grpc_out) = strategy.grpc_out_flag(&pkg_dir) {
                    flags.push(grpc_out);
                }
            }
        }

        let mut header_roots = request.import_proto_paths.clone();
        header_roots.extend(request.src_proto_paths.iter().cloned());
        let header = crate::proto_path_args(&header_roots, self.toolkit, self.runner)?;

        let compiler = strategy.compiler_command();
        let (program, prefix) = compiler
            .split_first()
            .map(|(program, rest)| (program.clone(), rest.to_vec()))
            .unwrap_or_else(|| ("protoc".to_string(), Vec::new()));

        let protos = find_protos(&request.src_proto_paths)?;
        for group in group_by_dirname(&protos) {
            let mut args: Vec<String> = prefix.clone();
            args.extend(header.iter().cloned());
            args.extend(flags.iter().cloned());
            args.extend(group.protos.iter().map(|proto| proto.display().to_string()));
            self.runner.run(&Invocation::new(program.clone(), args))?;
        }

        Ok(pkg_dir)
    }
}

fn prepare_pkg_dir(strategy: &Strategy, request: &CodeGenRequest) -> Result<PathBuf> {
    let pkg_dir = pkg_root_dir(&request.output_dir, &request.api_name, request.language);
    fs::create_dir_all(strategy.code_root(&pkg_dir))?;
    Ok(pkg_dir)
}
