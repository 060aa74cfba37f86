//! Proto file discovery and directory grouping

use proto_client_gen_common::{PipelineError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collect every `.proto` file under the given roots.
///
/// The result follows filesystem walk order, which is not stable across
/// platforms; callers that need determinism must sort. Discovery is
/// recomputed on every call, nothing is cached.
pub fn find_protos(proto_paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if proto_paths.is_empty() {
        return Err(PipelineError::InvalidInput(
            "at least one proto root is required".to_string(),
        ));
    }

    let mut protos = Vec::new();
    for root in proto_paths {
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "proto")
            {
                protos.push(entry.into_path());
            }
        }
    }
    Ok(protos)
}

/// Proto files sharing one parent directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryGroup {
    pub dir: PathBuf,
    pub protos: Vec<PathBuf>,
}

/// Partition proto paths by direct parent directory.
///
/// protoc-gen-go must see all protos of one package in a single protoc
/// invocation, and only those; grouping by directory satisfies that as
/// long as the directory layout matches the package layout. File order
/// within a group and first-seen group order are both preserved.
pub fn group_by_dirname(protos: &[PathBuf]) -> Vec<DirectoryGroup> {
    let mut groups: Vec<DirectoryGroup> = Vec::new();
    for proto in protos {
        let dir = proto.parent().unwrap_or(Path::new("")).to_path_buf();
        match groups.iter_mut().find(|group| group.dir == dir) {
            Some(group) => group.protos.push(proto.clone()),
            None => groups.push(DirectoryGroup {
                dir,
                protos: vec![proto.clone()],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_find_protos_filters_extension() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("a/one.proto"));
        touch(&tmp.path().join("a/b/two.proto"));
        touch(&tmp.path().join("a/readme.md"));

        let mut found = find_protos(&[tmp.path().to_path_buf()]).unwrap();
        found.sort();
        assert_eq!(
            found,
            vec![tmp.path().join("a/b/two.proto"), tmp.path().join("a/one.proto")]
        );
    }

    #[test]
    fn test_find_protos_multiple_roots() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(&first.path().join("one.proto"));
        touch(&second.path().join("two.proto"));

        let found =
            find_protos(&[first.path().to_path_buf(), second.path().to_path_buf()]).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_find_protos_rejects_empty_roots() {
        assert!(matches!(
            find_protos(&[]),
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_grouping_partitions_without_loss() {
        let protos = vec![
            PathBuf::from("x/a.proto"),
            PathBuf::from("y/b.proto"),
            PathBuf::from("x/c.proto"),
            PathBuf::from("z/d.proto"),
        ];
        let groups = group_by_dirname(&protos);

        assert_eq!(groups.len(), 3);
        let total: usize = groups.iter().map(|g| g.protos.len()).sum();
        assert_eq!(total, protos.len());
        for proto in &protos {
            assert!(groups
                .iter()
                .any(|g| g.protos.contains(proto) && g.dir == proto.parent().unwrap()));
        }
    }

    #[test]
    fn test_grouping_preserves_first_seen_order() {
        let protos = vec![
            PathBuf::from("y/b.proto"),
            PathBuf::from("x/a.proto"),
            PathBuf::from("y/c.proto"),
        ];
        let groups = group_by_dirname(&protos);
        assert_eq!(groups[0].dir, PathBuf::from("y"));
        assert_eq!(groups[1].dir, PathBuf::from("x"));
        assert_eq!(
            groups[0].protos,
            vec![PathBuf::from("y/b.proto"), PathBuf::from("y/c.proto")]
        );
    }
}
