//! Python package renaming
//!
//! Generated Python code must not land in the same namespace as the
//! public API surface, so source protos are copied into a renamed
//! package tree before generation: `google.foo` becomes
//! `google.cloud.grpc.foo` (and `google.cloud.foo` becomes
//! `google.cloud.grpc.foo`), while the well-known cross-ecosystem
//! packages keep their names. Both the on-disk layout and every
//! `import "…";` statement are rewritten through the same transform.

use chrono::Utc;
use proto_client_gen_common::{PipelineError, Result};
use proto_client_gen_protoc::find_protos;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

// E.g. `package google.foo.bar;`
static PACKAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^package ([A-Za-z_][A-Za-z_0-9]*(?:\.[A-Za-z_][A-Za-z_0-9]*)*);")
        .expect("package pattern compiles")
});

// E.g. `import "google/foo/bar.proto";`
static IMPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^import "([A-Za-z_][A-Za-z_0-9]*(?:/[A-Za-z_][A-Za-z_0-9.]*)*\.proto)";"#)
        .expect("import pattern compiles")
});

/// Shared cross-ecosystem packages that are never renamed
pub const COMMON_PROTOS: [&str; 6] = [
    "google.api",
    "google.longrunning",
    "google.rpc",
    "google.type",
    "google.logging.type",
    "google.protobuf",
];

/// Copies proto trees into a renamed package layout
pub struct PythonPackageTransformer {
    common_protos: Vec<String>,
}

impl Default for PythonPackageTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonPackageTransformer {
    pub fn new() -> Self {
        Self::with_common_protos(COMMON_PROTOS.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_common_protos(common_protos: Vec<String>) -> Self {
        Self { common_protos }
    }

    /// Copy `src_proto_paths` and `import_proto_paths` into a renamed
    /// tree under `destination` (a fresh timestamped directory under
    /// the system temp root when `None`). Returns the new source roots
    /// and the new import roots for downstream generation.
    ///
    /// A caller-supplied destination must not exist yet; reusing a
    /// populated destination would silently mix runs.
    pub fn transform_roots(
        &self,
        src_proto_paths: &[PathBuf],
        import_proto_paths: &[PathBuf],
        destination: Option<PathBuf>,
    ) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        let destination = match destination {
            Some(dest) => {
                if dest.exists() {
                    return Err(PipelineError::DestinationConflict(dest));
                }
                dest
            }
            None => default_destination(),
        };

        let mut new_src_paths = BTreeSet::new();
        self.copy_and_transform(src_proto_paths, &destination, Some(&mut new_src_paths))?;
        if !import_proto_paths.is_empty() {
            self.copy_and_transform(import_proto_paths, &destination, None)?;
        }

        Ok((new_src_paths.into_iter().collect(), vec![destination]))
    }

    /// Apply the package rename to a separated name. Works with any
    /// separator: `.` for package statements, `/` for import paths and
    /// directory fragments.
    pub fn transform(&self, name: &str, separator: char) -> String {
        let segments: Vec<&str> = name.split(separator).collect();
        if self.is_common(&segments) || segments.first() != Some(&"google") || segments.len() < 2 {
            return name.to_string();
        }

        let separator = separator.to_string();
        if segments.get(1) == Some(&"cloud") {
            let mut renamed = vec!["google", "cloud", "grpc"];
            renamed.extend(&segments[2..]);
            renamed.join(&separator)
        } else {
            let mut renamed = vec!["google", "cloud", "grpc"];
            renamed.extend(&segments[1..]);
            renamed.join(&separator)
        }
    }

    // Exact segment-aligned dotted-prefix match; `google.apiextensions`
    // must not be spared by `google.api`.
    fn is_common(&self, segments: &[&str]) -> bool {
        self.common_protos.iter().any(|common| {
            let common: Vec<&str> = common.split('.').collect();
            segments.len() >= common.len() && segments[..common.len()] == common[..]
        })
    }

    /// Recover the on-disk path fragment corresponding to the declared
    /// package: with `k` dots in the package name, the last `k + 1`
    /// components of the file's parent directory. A file with no
    /// package declaration yields an empty path.
    pub fn extract_base_dirs(&self, proto_file: &Path) -> Result<PathBuf> {
        let text = fs::read_to_string(proto_file)?;
        let Some(package) = first_package_declaration(&text) else {
            return Ok(PathBuf::new());
        };

        let depth = package.matches('.').count() + 1;
        let components: Vec<Component> = proto_file
            .parent()
            .unwrap_or(Path::new(""))
            .components()
            .collect();
        let start = components.len().saturating_sub(depth);
        Ok(components[start..].iter().collect())
    }

    /// Strict package read: exactly one declaration expected.
    pub fn package_of(&self, proto_file: &Path) -> Result<String> {
        let text = fs::read_to_string(proto_file)?;
        let mut declarations = text
            .lines()
            .filter_map(|line| PACKAGE_LINE.captures(line).map(|c| c[1].to_string()));
        match (declarations.next(), declarations.next()) {
            (Some(package), None) => Ok(package),
            (None, _) => Err(PipelineError::AmbiguousPackageDeclaration(format!(
                "no package declaration in {}",
                proto_file.display()
            ))),
            (Some(_), Some(_)) => Err(PipelineError::AmbiguousPackageDeclaration(format!(
                "multiple package declarations in {}",
                proto_file.display()
            ))),
        }
    }

    /// Copy one proto, rewriting `import "…";` lines through the rename
    /// transform and leaving every other line unchanged.
    pub fn copy_proto(&self, src: &Path, dest: &Path) -> Result<()> {
        let text = fs::read_to_string(src)?;
        let mut rewritten = String::with_capacity(text.len());
        for line in text.lines() {
            match IMPORT_LINE.captures(line) {
                Some(captures) => {
                    rewritten.push_str("import \"");
                    rewritten.push_str(&self.transform(&captures[1], '/'));
                    rewritten.push_str("\";");
                }
                None => rewritten.push_str(line),
            }
            rewritten.push('\n');
        }
        fs::write(dest, rewritten)?;
        Ok(())
    }

    fn copy_and_transform(
        &self,
        roots: &[PathBuf],
        destination: &Path,
        mut new_paths: Option<&mut BTreeSet<PathBuf>>,
    ) -> Result<()> {
        for root in roots {
            for proto in find_protos(std::slice::from_ref(root))? {
                let base_dirs = self.extract_base_dirs(&proto)?;
                let renamed_dir = self.renamed_dir(destination, &base_dirs);
                fs::create_dir_all(&renamed_dir)?;
                if let Some(paths) = new_paths.as_deref_mut() {
                    paths.insert(renamed_dir.clone());
                }

                let Some(basename) = proto.file_name() else {
                    continue;
                };
                self.copy_proto(&proto, &renamed_dir.join(basename))?;
            }
        }
        Ok(())
    }

    fn renamed_dir(&self, destination: &Path, base_dirs: &Path) -> PathBuf {
        let fragment = base_dirs
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let renamed = self.transform(&fragment, '/');
        let mut dir = destination.to_path_buf();
        dir.extend(renamed.split('/').filter(|segment| !segment.is_empty()));
        dir
    }
}

fn first_package_declaration(text: &str) -> Option<String> {
    text.lines()
        .find_map(|line| PACKAGE_LINE.captures(line).map(|c| c[1].to_string()))
}

/// A process-unique destination keyed by time, mirroring the fresh-path
/// requirement of `transform_roots`.
fn default_destination() -> PathBuf {
    std::env::temp_dir()
        .join("proto-client-gen-python")
        .join(Utc::now().timestamp().to_string())
        .join("proto")
}
