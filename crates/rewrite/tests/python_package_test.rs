//! On-disk tests for the Python package transformation

use proto_client_gen_common::PipelineError;
use proto_client_gen_rewrite::PythonPackageTransformer;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PROTO_FILE: &str = "\
// Comment line
package google.service.v1;
import \"google/service/a.proto\";
import \"google/cloud/otherapi/b.proto\";
import \"google/api/annotations.proto\";
Some other text referencing google.service.v1
";

fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn extract_base_dirs_recovers_package_path() {
    let tmp = TempDir::new().unwrap();
    let proto = tmp
        .path()
        .join("a/test/path/to/google/service/v1/a.proto");
    write_file(&proto, PROTO_FILE);

    let transformer = PythonPackageTransformer::new();
    let base_dirs = transformer.extract_base_dirs(&proto).unwrap();
    assert_eq!(base_dirs, PathBuf::from("google/service/v1"));
}

#[test]
fn extract_base_dirs_without_declaration_is_empty() {
    let tmp = TempDir::new().unwrap();
    let proto = tmp.path().join("google/service/v1/a.proto");
    write_file(&proto, "syntax = \"proto3\";\n");

    let transformer = PythonPackageTransformer::new();
    let base_dirs = transformer.extract_base_dirs(&proto).unwrap();
    assert_eq!(base_dirs, PathBuf::new());
}

#[test]
fn copy_proto_rewrites_only_import_lines() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("a.proto");
    let dest = tmp.path().join("out.proto");
    write_file(&src, PROTO_FILE);

    let transformer = PythonPackageTransformer::new();
    transformer.copy_proto(&src, &dest).unwrap();

    let expected = "\
// Comment line
package google.service.v1;
import \"google/cloud/grpc/service/a.proto\";
import \"google/cloud/grpc/otherapi/b.proto\";
import \"google/api/annotations.proto\";
Some other text referencing google.service.v1
";
    assert_eq!(fs::read_to_string(dest).unwrap(), expected);
}

#[test]
fn transform_roots_builds_renamed_tree() {
    let tmp = TempDir::new().unwrap();
    let src_root = tmp.path().join("src");
    let import_root = tmp.path().join("imports");
    let dest = tmp.path().join("transformed");
    write_file(
        &src_root.join("google/service/v1/a.proto"),
        PROTO_FILE,
    );
    write_file(
        &import_root.join("google/api/annotations.proto"),
        "package google.api;\n",
    );

    let transformer = PythonPackageTransformer::new();
    let (new_src, new_imports) = transformer
        .transform_roots(
            &[src_root],
            &[import_root],
            Some(dest.clone()),
        )
        .unwrap();

    assert_eq!(
        new_src,
        vec![dest.join("google/cloud/grpc/service/v1")]
    );
    assert_eq!(new_imports, vec![dest.clone()]);
    assert!(dest
        .join("google/cloud/grpc/service/v1/a.proto")
        .is_file());
    // Common protos keep their layout.
    assert!(dest.join("google/api/annotations.proto").is_file());
}

#[test]
fn transform_roots_rejects_existing_destination() {
    let tmp = TempDir::new().unwrap();
    let src_root = tmp.path().join("src");
    write_file(&src_root.join("google/x/v1/a.proto"), "package google.x.v1;\n");
    let dest = tmp.path().join("occupied");
    fs::create_dir_all(&dest).unwrap();

    let transformer = PythonPackageTransformer::new();
    let result = transformer.transform_roots(&[src_root], &[], Some(dest));
    assert!(matches!(
        result,
        Err(PipelineError::DestinationConflict(_))
    ));
}

#[test]
fn package_of_requires_exactly_one_declaration() {
    let tmp = TempDir::new().unwrap();
    let transformer = PythonPackageTransformer::new();

    let single = tmp.path().join("single.proto");
    write_file(&single, "package google.x.v1;\n");
    assert_eq!(transformer.package_of(&single).unwrap(), "google.x.v1");

    let none = tmp.path().join("none.proto");
    write_file(&none, "syntax = \"proto3\";\n");
    assert!(matches!(
        transformer.package_of(&none),
        Err(PipelineError::AmbiguousPackageDeclaration(_))
    ));

    let double = tmp.path().join("double.proto");
    write_file(&double, "package google.x.v1;\npackage google.y.v1;\n");
    assert!(matches!(
        transformer.package_of(&double),
        Err(PipelineError::AmbiguousPackageDeclaration(_))
    ));
}
