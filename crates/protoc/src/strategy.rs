//! Per-language invocation strategies
//!
//! Each target language differs in where generated code lands, how the
//! primary output flag is spelled, whether gRPC support comes from a
//! standalone plugin or an in-process one, and which compiler binary is
//! invoked. The strategy collapses those differences behind one type.

use proto_client_gen_common::Language;
use std::path::{Path, PathBuf};

/// How a language obtains its standalone gRPC plugin binary, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PluginKind {
    /// gRPC support is generated in-process (or by the compiler module
    /// itself); no separate plugin exists.
    None,
    /// Resolve by name on `PATH` via a `which`-style lookup.
    Which(&'static str),
    /// Resolve through the companion toolkit build.
    Toolkit,
}

/// Invocation policy for one target language
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    language: Language,
}

impl Strategy {
    pub fn for_language(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Output subdirectory for generated files:
    /// `<output_dir>/<language token>`
    pub fn code_root(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.language.token())
    }

    /// The primary codegen output flag.
    ///
    /// Go generates gRPC support in-process, activated as a modifier on
    /// this same flag rather than through a separate plugin.
    pub fn lang_out_flag(&self, output_dir: &Path, with_grpc: bool) -> String {
        let code_root = self.code_root(output_dir);
        match self.language {
            Language::Go if with_grpc => {
                format!("--go_out=plugins=grpc:{}", code_root.display())
            }
            language => format!("--{}_out={}", language.token(), code_root.display()),
        }
    }

    /// The standalone gRPC output flag; `None` for Go, whose output
    /// directory is already carried by `lang_out_flag`.
    pub fn grpc_out_flag(&self, output_dir: &Path) -> Option<String> {
        match self.language {
            Language::Go => None,
            _ => Some(format!("--grpc_out={}", self.code_root(output_dir).display())),
        }
    }

    /// The compiler argv prefix. Python invokes protoc as a module
    /// inside the language runtime; Ruby ships a wrapped compiler.
    pub fn compiler_command(&self) -> Vec<String> {
        match self.language {
            Language::Ruby => vec!["grpc_tools_ruby_protoc".to_string()],
            Language::Python => vec![
                "python".to_string(),
                "-m".to_string(),
                "grpc.tools.protoc".to_string(),
            ],
            _ => vec!["protoc".to_string()],
        }
    }

    pub(crate) fn plugin_kind(&self) -> PluginKind {
        match self.language {
            Language::Csharp => PluginKind::Which("grpc_csharp_plugin"),
            Language::Ruby => PluginKind::Which("grpc_ruby_plugin"),
            Language::Php => PluginKind::Which("protoc-gen-php"),
            Language::Java => PluginKind::Toolkit,
            Language::Go | Language::Python => PluginKind::None,
        }
    }
}
