//! Go import-path correction
//!
//! Generated `.pb.go` files spell imports of other proto packages
//! relative to a `google/` root, but the Go compiler resolves imports
//! relative to `$GOPATH/src`, so the final repository needs them
//! prefixed with the repository's own import base. The rewrite is
//! line-oriented and applied exactly once per file while copying into
//! the destination repository; a rewritten line no longer matches the
//! pattern, so the pass cannot double-apply.

use proto_client_gen_common::{PipelineError, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static IMPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^import ([A-Za-z0-9_]* )?"google/"#).expect("import pattern compiles")
});

/// Rewrites `import "google/…"` lines to carry a repository import base
pub struct GoImportRewriter {
    replacement: String,
}

impl GoImportRewriter {
    /// `import_base` is the repository's import path as the Go compiler
    /// sees it, e.g. `github.com/org/repo`.
    pub fn new(import_base: &str) -> Self {
        Self {
            replacement: format!("import ${{1}}\"{import_base}/proto/google/"),
        }
    }

    /// Rewrite a single line; non-matching lines pass through unchanged.
    /// An optional import alias is preserved verbatim.
    pub fn rewrite_line(&self, line: &str) -> String {
        IMPORT_LINE
            .replace(line, self.replacement.as_str())
            .into_owned()
    }

    /// Copy every generated `.pb.go` file under `pkg_dir` into
    /// `<final_repo_dir>/proto/<relative path>`, rewriting import lines
    /// on the way. Returns the files written.
    pub fn rewrite_tree(&self, pkg_dir: &Path, final_repo_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for pb_file in find_pb_files(pkg_dir)? {
            let relative = pb_file.strip_prefix(pkg_dir).map_err(|_| {
                PipelineError::InvalidInput(format!(
                    "{} is outside {}",
                    pb_file.display(),
                    pkg_dir.display()
                ))
            })?;
            let out_file = final_repo_dir.join("proto").join(relative);
            if let Some(parent) = out_file.parent() {
                fs::create_dir_all(parent)?;
            }

            let text = fs::read_to_string(&pb_file)?;
            let mut rewritten = String::with_capacity(text.len());
            for line in text.lines() {
                rewritten.push_str(&self.rewrite_line(line));
                rewritten.push('\n');
            }
            fs::write(&out_file, rewritten)?;
            written.push(out_file);
        }
        Ok(written)
    }
}

/// Files matching the generated double-extension convention, `*.pb.go`
fn find_pb_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && is_pb_go(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_pb_go(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "go")
        && path
            .file_stem()
            .map(Path::new)
            .and_then(Path::extension)
            .is_some_and(|ext| ext == "pb")
}

#[derive(Deserialize)]
struct GapicConfig {
    language_settings: Option<LanguageSettings>,
}

#[derive(Deserialize)]
struct LanguageSettings {
    go: Option<GoSettings>,
}

#[derive(Deserialize)]
struct GoSettings {
    package_name: Option<String>,
}

/// Extract the Go import base from GAPIC config YAML:
/// `language_settings.go.package_name` of the first file that carries
/// one. Missing files and unparsable configs are skipped.
pub fn go_import_base(gapic_yaml_paths: &[PathBuf]) -> Result<Option<String>> {
    for path in gapic_yaml_paths {
        if !path.exists() {
            continue;
        }
        let text = fs::read_to_string(path)?;
        let Ok(config) = serde_yaml::from_str::<GapicConfig>(&text) else {
            continue;
        };
        if let Some(package_name) = config
            .language_settings
            .and_then(|settings| settings.go)
            .and_then(|go| go.package_name)
        {
            return Ok(Some(package_name));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rewrite_line_with_alias() {
        let rewriter = GoImportRewriter::new("github.com/x/y");
        assert_eq!(
            rewriter.rewrite_line("import pb \"google/foo/bar.proto\""),
            "import pb \"github.com/x/y/proto/google/foo/bar.proto\""
        );
    }

    #[test]
    fn test_rewrite_line_without_alias() {
        let rewriter = GoImportRewriter::new("github.com/x/y");
        assert_eq!(
            rewriter.rewrite_line("import \"google/foo/bar.pb\""),
            "import \"github.com/x/y/proto/google/foo/bar.pb\""
        );
    }

    #[test]
    fn test_non_matching_lines_pass_through() {
        let rewriter = GoImportRewriter::new("github.com/x/y");
        assert_eq!(rewriter.rewrite_line("some other text"), "some other text");
        assert_eq!(
            rewriter.rewrite_line("import \"fmt\""),
            "import \"fmt\""
        );
    }

    #[test]
    fn test_rewrite_is_single_pass() {
        // A rewritten line no longer starts with `import "google/`.
        let rewriter = GoImportRewriter::new("github.com/x/y");
        let once = rewriter.rewrite_line("import \"google/foo/bar.proto\"");
        assert_eq!(rewriter.rewrite_line(&once), once);
    }

    #[test]
    fn test_is_pb_go() {
        assert!(is_pb_go(Path::new("a/foo.pb.go")));
        assert!(!is_pb_go(Path::new("a/foo.go")));
        assert!(!is_pb_go(Path::new("a/foo.pb")));
        assert!(!is_pb_go(Path::new("a/foo.pb.rs")));
    }

    #[test]
    fn test_rewrite_tree_copies_into_proto_subdir() {
        let pkg = TempDir::new().unwrap();
        let repo = TempDir::new().unwrap();
        let nested = pkg.path().join("google/example/v1");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            nested.join("a.pb.go"),
            "package example\n\nimport pb \"google/example/v1/b.pb\"\nvar x = 1\n",
        )
        .unwrap();
        fs::write(nested.join("helper.go"), "package example\n").unwrap();

        let rewriter = GoImportRewriter::new("github.com/org/repo");
        let written = rewriter.rewrite_tree(pkg.path(), repo.path()).unwrap();

        let expected = repo.path().join("proto/google/example/v1/a.pb.go");
        assert_eq!(written, vec![expected.clone()]);
        let text = fs::read_to_string(expected).unwrap();
        assert!(text.contains("import pb \"github.com/org/repo/proto/google/example/v1/b.pb\""));
        assert!(text.contains("var x = 1"));
        // Non-generated files are not copied.
        assert!(!repo.path().join("proto/google/example/v1/helper.go").exists());
    }

    #[test]
    fn test_go_import_base_from_gapic_yaml() {
        let tmp = TempDir::new().unwrap();
        let yaml = tmp.path().join("example_gapic.yaml");
        fs::write(
            &yaml,
            "type: com.google.api.codegen.ConfigProto\nlanguage_settings:\n  go:\n    package_name: github.com/org/repo\n  java:\n    package_name: com.org.repo\n",
        )
        .unwrap();

        let base = go_import_base(&[tmp.path().join("missing.yaml"), yaml]).unwrap();
        assert_eq!(base.as_deref(), Some("github.com/org/repo"));
    }

    #[test]
    fn test_go_import_base_absent() {
        let tmp = TempDir::new().unwrap();
        let yaml = tmp.path().join("example_gapic.yaml");
        fs::write(&yaml, "language_settings:\n  java:\n    package_name: com.org\n").unwrap();
        assert_eq!(go_import_base(&[yaml]).unwrap(), None);
    }
}
