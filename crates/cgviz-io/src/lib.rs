//! cgviz-io: decoding of ray-tracing simulation output.
//!
//! Every source file is a `(file name, text)` pair. The file name selects
//! the reader and, for most files, also carries the keys of the content.
//!
//! # Supported Files
//!
//! | File | Reader | Content |
//! |------|--------|---------|
//! | `qcmPov.Rx22.json` | `pov` | One point-of-view descriptor |
//! | `qcmPov.Rx.json` | `pov` | `{id: descriptor}` for one pov type |
//! | `qcmTrace.Tx01-Rx17.json` | `trace` | The paths of one pair |
//! | `qcmTrace.Tx01.json` | `trace` | `{rx: [paths]}` for one transmitter |
//! | `qcmKpis*.json` | `kpis` | Kpi samples per transmitter |
//! | `*.obj` | `obj` | Universe geometry, one object per `o`/`g` |
//! | `*.mtl` | `mtl` | Universe materials |
//!
//! # Quick Start
//!
//! ```ignore
//! use cgviz_io::{decode, SourceFile};
//!
//! match decode("qcmPov.Tx1.json", &text)? {
//!     SourceFile::Povs(entries) => { /* insert into the store */ }
//!     _ => {}
//! }
//! ```

pub mod formats;
pub mod registry;
pub mod report;
pub mod source;

pub use registry::{ReaderRegistry, SourceReader};
pub use report::{LoadFailure, LoadReport};
pub use source::{
    base_name, file_stem, MtlMaterial, ObjModel, ObjObject, PovEntry, SourceFile, TraceEntry,
};

use cgviz_core::VizError;

/// Decode a file with the built-in readers.
pub fn decode(file_name: &str, content: &str) -> Result<SourceFile, VizError> {
    ReaderRegistry::with_defaults().decode(file_name, content)
}
