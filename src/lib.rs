//! In-browser playground module compiler.
//!
//! Given a virtual set of source files and an entry point, produce one
//! executable ES module string with no server-side build step. Local imports
//! resolve against a caller-supplied virtual file set, bare package imports
//! are rewritten to CDN module URLs, stylesheets become self-installing
//! scripts, and single-file components are reduced to plain script before the
//! bundling engine sees them.
//!
//! The bundling engine and the component compiler are external collaborators
//! behind the [`engine::traits::BundleEngine`] and
//! [`sfc::traits::ComponentCompiler`] traits; this crate owns the
//! resolve/load pipeline between them and the caller.

pub mod cdn;
pub mod compiler;
pub mod engine;
pub mod manifest;
pub mod paths;
pub mod plugin;
pub mod sfc;
pub mod styles;
pub mod vfs;

#[cfg(test)]
mod integration_test;

pub use compiler::{BuildOverrides, CompileFailure, CompileResult, Compiler, CompilerOptions};
pub use manifest::{DependencyMap, PackageManifest};
pub use vfs::memory::InMemoryFiles;
pub use vfs::traits::{FileError, FileResolver};
