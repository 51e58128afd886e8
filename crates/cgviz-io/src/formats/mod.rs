//! Source file readers.

pub mod json;
pub mod mtl;
pub mod obj;

pub use json::{KpiReader, PovReader, TraceReader};
pub use mtl::{parse_mtl, MtlReader};
pub use obj::{parse_obj, ObjReader};
