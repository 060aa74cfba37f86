//! Source rewriting passes around code generation
//!
//! Two languages need their trees adjusted to match the final
//! repository layout:
//!
//! - Go: generated `.pb.go` files import other proto packages relative
//!   to a root that does not exist in the destination repository; the
//!   import lines are rewritten once while copying (post-generation).
//! - Python: source protos are copied into a renamed package tree so
//!   generated code lives under a `grpc` namespace that cannot collide
//!   with the hand-written public API (pre-generation).

pub mod go_imports;
pub mod python_package;

pub use go_imports::GoImportRewriter;
pub use python_package::PythonPackageTransformer;
