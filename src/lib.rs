//! Reader/writer for Illumina IDAT files: the per-probe intensity container
//! BeadChip scanners emit, one per microarray/color channel.
//!
//! The core codec lives in [`primitives`], [`section`], [`model`], [`reader`]
//! and [`writer`]; [`mixer`] composes two parsed samples into a new one.

mod error;
mod primitives;
mod mixer;
mod model;
mod reader;
mod section;
mod writer;

#[macro_use]
extern crate log;

#[cfg(test)]
mod test_support;

pub use error::{Error, FormatError, InvariantError, Result, UsageError};
pub use mixer::mix;
pub use model::{
    ArrayMeta, FileHeader, Model, ProbeMatrix, RunInfoEntry, SectionEntry, SectionTable,
    MAX_PROBES, MAX_RUN_INFO_ENTRIES,
};
pub use reader::Reader;
pub use section::{BodyKind, SectionCode};
pub use writer::{write_to, write_to_path};

use std::path::Path;

/// Reads an IDAT file from `path`. Convenience wrapper over [`Reader`].
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Model> {
    Reader::open(path)?.read()
}

/// Writes `model` to `path`. Convenience wrapper over [`write_to_path`].
pub fn write_file<P: AsRef<Path>>(path: P, model: &Model) -> Result<()> {
    write_to_path(path, model)
}
