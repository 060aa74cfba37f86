//! proto-client-gen CLI
//!
//! Command-line interface for generating client-library source trees
//! from protocol-buffer service definitions.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use proto_client_gen_common::{api_name, pkg_root_dir, Language};
use proto_client_gen_protoc::{
    build_descriptor_set, CodeGenInvoker, CodeGenRequest, DescriptorConfig, PluginCache,
    SystemRunner, Toolkit,
};
use proto_client_gen_rewrite::{go_imports, GoImportRewriter, PythonPackageTransformer};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "proto-client-gen")]
#[command(version, about = "Generate client library source trees from .proto definitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the full API surface into one serialized descriptor set
    #[command(after_help = "EXAMPLES:\n  \
        proto-client-gen descriptor \\\n    \
        --src googleapis/google/pubsub/v1 \\\n    \
        --imports googleapis \\\n    \
        --name pubsub --api-version v1 \\\n    \
        --output ./build --toolkit ./toolkit")]
    Descriptor {
        /// Source proto roots
        #[arg(long = "src", value_delimiter = ',', required = true)]
        src_proto_paths: Vec<PathBuf>,

        /// Import-only proto roots
        #[arg(long = "imports", value_delimiter = ',')]
        import_proto_paths: Vec<PathBuf>,

        /// Extra descriptor-only proto roots
        #[arg(long = "desc-protos", value_delimiter = ',')]
        desc_proto_paths: Vec<PathBuf>,

        #[command(flatten)]
        api: ApiArgs,

        /// Output directory for the descriptor set
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Toolkit checkout used to locate the well-known protos
        #[arg(long)]
        toolkit: PathBuf,
    },

    /// Generate one language's client sources
    #[command(after_help = "EXAMPLES:\n  \
        # Messages and gRPC stubs for Go\n  \
        proto-client-gen generate --language go \\\n    \
        --src googleapis/google/pubsub/v1 --imports googleapis \\\n    \
        --name pubsub --api-version v1 \\\n    \
        --output ./build --toolkit ./toolkit --proto --grpc\n\n  \
        # Python, with the package rename applied first\n  \
        proto-client-gen generate --language python \\\n    \
        --src googleapis/google/pubsub/v1 --imports googleapis \\\n    \
        --name pubsub --api-version v1 \\\n    \
        --output ./build --toolkit ./toolkit --proto --grpc")]
    Generate {
        /// Target language
        #[arg(short, long)]
        language: LanguageArg,

        /// Source proto roots
        #[arg(long = "src", value_delimiter = ',', required = true)]
        src_proto_paths: Vec<PathBuf>,

        /// Import-only proto roots
        #[arg(long = "imports", value_delimiter = ',')]
        import_proto_paths: Vec<PathBuf>,

        #[command(flatten)]
        api: ApiArgs,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Toolkit checkout used to locate well-known protos and plugins
        #[arg(long)]
        toolkit: PathBuf,

        /// Generate message/serialization code
        #[arg(long)]
        proto: bool,

        /// Generate gRPC client stubs
        #[arg(long)]
        grpc: bool,
    },

    /// Rewrite generated Go import paths into a destination repository
    #[command(name = "go-imports")]
    GoImports {
        /// Import base, e.g. github.com/org/repo (extracted from the
        /// GAPIC config when omitted)
        #[arg(long)]
        import_base: Option<String>,

        /// GAPIC config YAML files to extract the import base from
        #[arg(long = "gapic-yaml", value_delimiter = ',')]
        gapic_yaml: Vec<PathBuf>,

        #[command(flatten)]
        api: ApiArgs,

        /// Output directory holding the generated Go package
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Destination repository root
        #[arg(long)]
        final_repo: PathBuf,
    },

    /// Copy source protos into a Python-safe renamed package tree
    #[command(name = "python-package")]
    PythonPackage {
        /// Source proto roots
        #[arg(long = "src", value_delimiter = ',', required = true)]
        src_proto_paths: Vec<PathBuf>,

        /// Import-only proto roots
        #[arg(long = "imports", value_delimiter = ',')]
        import_proto_paths: Vec<PathBuf>,

        /// Destination root (a fresh timestamped temp directory when
        /// omitted); must not already exist
        #[arg(long)]
        destination: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct ApiArgs {
    /// Organization owning the API
    #[arg(long, default_value = "google")]
    organization: String,

    /// API short name, e.g. pubsub
    #[arg(long)]
    name: String,

    /// API version, e.g. v1
    #[arg(long = "api-version", default_value = "v1")]
    version: String,
}

impl ApiArgs {
    fn api_name(&self) -> String {
        api_name(&self.organization, &self.name, &self.version)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LanguageArg {
    Csharp,
    Go,
    Java,
    Php,
    Python,
    Ruby,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::Csharp => Language::Csharp,
            LanguageArg::Go => Language::Go,
            LanguageArg::Java => Language::Java,
            LanguageArg::Php => Language::Php,
            LanguageArg::Python => Language::Python,
            LanguageArg::Ruby => Language::Ruby,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Descriptor {
            src_proto_paths,
            import_proto_paths,
            desc_proto_paths,
            api,
            output,
            toolkit,
        } => descriptor_command(
            DescriptorConfig {
                src_proto_paths,
                import_proto_paths,
                desc_proto_paths,
                output_dir: output,
                api_name: api.api_name(),
            },
            toolkit,
        ),
        Commands::Generate {
            language,
            src_proto_paths,
            import_proto_paths,
            api,
            output,
            toolkit,
            proto,
            grpc,
        } => generate_command(GenerateConfig {
            language: language.into(),
            src_proto_paths,
            import_proto_paths,
            api_name: api.api_name(),
            output,
            toolkit,
            gen_proto: proto,
            gen_grpc: grpc,
            verbose: cli.verbose,
        }),
        Commands::GoImports {
            import_base,
            gapic_yaml,
            api,
            output,
            final_repo,
        } => go_imports_command(import_base, &gapic_yaml, &api, &output, &final_repo),
        Commands::PythonPackage {
            src_proto_paths,
            import_proto_paths,
            destination,
        } => python_package_command(&src_proto_paths, &import_proto_paths, destination),
    }
}

fn descriptor_command(config: DescriptorConfig, toolkit_path: PathBuf) -> Result<()> {
    println!(
        "{} Compiling descriptor set for {}",
        "→".cyan(),
        config.api_name.yellow()
    );

    let toolkit = Toolkit::new(toolkit_path);
    let desc_file = build_descriptor_set(&config, &toolkit, &SystemRunner)
        .context("Failed to build descriptor set")?;

    println!(
        "{} Descriptor set written to {}",
        "✓".green(),
        desc_file.display()
    );
    Ok(())
}

struct GenerateConfig {
    language: Language,
    src_proto_paths: Vec<PathBuf>,
    import_proto_paths: Vec<PathBuf>,
    api_name: String,
    output: PathBuf,
    toolkit: PathBuf,
    gen_proto: bool,
    gen_grpc: bool,
    verbose: bool,
}

fn generate_command(config: GenerateConfig) -> Result<()> {
    println!(
        "{} Generating {} client for {}",
        "→".cyan(),
        config.language.to_string().yellow(),
        config.api_name.yellow()
    );

    // Python protos are compiled out of a renamed package tree so the
    // generated namespace cannot collide with the public API surface.
    let (src_proto_paths, import_proto_paths) = if config.language == Language::Python {
        println!("{} Applying Python package rename", "→".cyan());
        let transformer = PythonPackageTransformer::new();
        let (new_src, new_imports) = transformer
            .transform_roots(&config.src_proto_paths, &config.import_proto_paths, None)
            .context("Failed to transform Python package tree")?;
        if config.verbose {
            for root in &new_src {
                println!("  Renamed source root: {}", root.display());
            }
        }
        (new_src, new_imports)
    } else {
        (config.src_proto_paths, config.import_proto_paths)
    };

    let toolkit = Toolkit::new(config.toolkit);
    let runner = SystemRunner;
    let mut plugins = PluginCache::new();
    let mut invoker = CodeGenInvoker::new(&toolkit, &runner, &mut plugins);

    let request = CodeGenRequest {
        language: config.language,
        src_proto_paths,
        import_proto_paths,
        output_dir: config.output,
        api_name: config.api_name,
        gen_proto: config.gen_proto,
        gen_grpc: config.gen_grpc,
    };
    let pkg_dir = invoker
        .generate(&request)
        .context("Code generation failed")?;

    println!(
        "\n{} Generated sources in {}",
        "✓".green().bold(),
        pkg_dir.display()
    );
    Ok(())
}

fn go_imports_command(
    import_base: Option<String>,
    gapic_yaml: &[PathBuf],
    api: &ApiArgs,
    output: &PathBuf,
    final_repo: &PathBuf,
) -> Result<()> {
    let import_base = match import_base {
        Some(base) => base,
        None => go_imports::go_import_base(gapic_yaml)
            .context("Failed to read GAPIC config")?
            .context("No import base given and none found in GAPIC config")?,
    };

    let pkg_dir = pkg_root_dir(output, &api.api_name(), Language::Go);
    println!(
        "{} Rewriting Go imports under {} with base {}",
        "→".cyan(),
        pkg_dir.display(),
        import_base.yellow()
    );

    let rewriter = GoImportRewriter::new(&import_base);
    let written = rewriter
        .rewrite_tree(&pkg_dir, final_repo)
        .context("Failed to rewrite Go imports")?;

    println!("{} Rewrote {} generated files", "✓".green(), written.len());
    Ok(())
}

fn python_package_command(
    src_proto_paths: &[PathBuf],
    import_proto_paths: &[PathBuf],
    destination: Option<PathBuf>,
) -> Result<()> {
    let transformer = PythonPackageTransformer::new();
    let (new_src, new_imports) = transformer
        .transform_roots(src_proto_paths, import_proto_paths, destination)
        .context("Failed to transform Python package tree")?;

    println!("{}", "New source proto roots:".bold());
    for root in &new_src {
        println!("  {}", root.display());
    }
    println!("{}", "New import proto roots:".bold());
    for root in &new_imports {
        println!("  {}", root.display());
    }
    Ok(())
}
