//! Descriptor set assembly

use crate::discovery::find_protos;
use crate::runner::{CommandRunner, Invocation};
use crate::toolkit::Toolkit;
use proto_client_gen_common::Result;
use std::fs;
use std::path::PathBuf;

/// Inputs for one descriptor-set build
#[derive(Debug, Clone)]
pub struct DescriptorConfig {
    pub src_proto_paths: Vec<PathBuf>,
    pub import_proto_paths: Vec<PathBuf>,
    /// Extra roots whose protos belong in the descriptor set but not in
    /// generated code (service config descriptors and the like).
    pub desc_proto_paths: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub api_name: String,
}

/// Compile the whole API surface into a single serialized descriptor
/// set at `<output_dir>/<api_name>.desc` and return that path.
///
/// Unlike codegen this is deliberately one protoc invocation with no
/// directory grouping: nothing requires it here, and a second
/// invocation would overwrite the output file.
pub fn build_descriptor_set(
    config: &DescriptorConfig,
    toolkit: &Toolkit,
    runner: &dyn CommandRunner,
) -> Result<PathBuf> {
    let mut discovery_roots = config.src_proto_paths.clone();
    discovery_roots.extend(config.desc_proto_paths.iter().cloned());
    let protos = find_protos(&discovery_roots)?;

    let mut header_roots = config.import_proto_paths.clone();
    header_roots.extend(config.desc_proto_paths.iter().cloned());
    header_roots.extend(config.src_proto_paths.iter().cloned());

    fs::create_dir_all(&config.output_dir)?;
    let desc_file = config.output_dir.join(format!("{}.desc", config.api_name));

    let mut args = crate::proto_path_args(&header_roots, toolkit, runner)?;
    args.push("--include_imports".to_string());
    args.push("--include_source_info".to_string());
    args.push("-o".to_string());
    args.push(desc_file.display().to_string());
    args.extend(protos.iter().map(|proto| proto.display().to_string()));

    runner.run(&Invocation::new("protoc", args))?;
    Ok(desc_file)
}
