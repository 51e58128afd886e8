//! Identifier parsing for file-name encoded keys.
//!
//! Simulation output encodes its keys in file names:
//! - `qcmPov.Rx22.json` holds point of view `Rx` / `22`
//! - `qcmTrace.Tx01-Rx17.json` holds the paths from `Tx01` to `Rx17`
//! - `qcmTrace.BS-1-UE-1.json` holds the paths from `BS-1` to `UE-1`

use crate::errors::ParseError;
use crate::types::PovCategory;

/// Name of the ground plane entity in the universe container.
pub const GROUND_PLANE: &str = "GroundPlane";

const TRANSMITTER_KEYWORDS: [&str; 8] = ["bs", "enb", "nb", "tx", "polearray", "gnb", "enodeb", "gnodeb"];
const RECEIVER_KEYWORDS: [&str; 3] = ["ms", "ue", "rx"];

/// A point-of-view tag split into its type and id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PovTag {
    pub pov_type: String,
    pub id: String,
}

/// The transmitter/receiver pair encoded in a trace file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracePair {
    pub tx: String,
    pub rx: String,
}

/// Split a raw tag such as `Rx22` into type `Rx` and id `22`.
///
/// The type keeps every non-digit character and the id every digit, in order.
pub fn parse_pov_tag(tag: &str) -> Result<PovTag, ParseError> {
    let pov_type: String = tag.chars().filter(|c| !c.is_ascii_digit()).collect();
    let id: String = tag.chars().filter(|c| c.is_ascii_digit()).collect();

    if pov_type.is_empty() || id.is_empty() {
        return Err(ParseError::MalformedTag { tag: tag.to_string() });
    }

    Ok(PovTag { pov_type, id })
}

/// The second dot-delimited segment of a file name, e.g. `Rx22` in `qcmPov.Rx22.json`.
pub fn file_segment(name: &str) -> Option<&str> {
    name.split('.').nth(1)
}

/// Extract the transmitter and receiver ids from a trace file name.
///
/// Ids may contain a hyphen themselves, so the segment must split into
/// exactly 2 parts (`Tx01-Rx17`) or 4 parts (`BS-1-UE-1`).
pub fn parse_trace_file_name(name: &str) -> Result<TracePair, ParseError> {
    let ambiguous = |parts: usize| ParseError::AmbiguousTraceName {
        name: name.to_string(),
        parts,
    };

    let segment = file_segment(name).ok_or_else(|| ambiguous(0))?;
    let parts: Vec<&str> = segment.split('-').collect();

    match parts.as_slice() {
        [tx, rx] if !tx.is_empty() && !rx.is_empty() => Ok(TracePair {
            tx: tx.to_string(),
            rx: rx.to_string(),
        }),
        [tx_a, tx_b, rx_a, rx_b] if parts.iter().all(|p| !p.is_empty()) => Ok(TracePair {
            tx: format!("{}-{}", tx_a, tx_b),
            rx: format!("{}-{}", rx_a, rx_b),
        }),
        _ => Err(ambiguous(parts.len())),
    }
}

/// Pick the mesh template for a point-of-view type.
///
/// Transmitter keywords win over receiver keywords; anything unrecognized
/// is drawn as a receiver.
pub fn classify_pov_category(pov_type: &str) -> PovCategory {
    let lower = pov_type.to_lowercase();
    if TRANSMITTER_KEYWORDS.iter().any(|k| lower.contains(k)) {
        PovCategory::Transmitter
    } else {
        PovCategory::Receiver
    }
}

/// Whether a point-of-view type matches any transmitter or receiver keyword.
pub fn is_known_pov_type(pov_type: &str) -> bool {
    let lower = pov_type.to_lowercase();
    TRANSMITTER_KEYWORDS
        .iter()
        .chain(RECEIVER_KEYWORDS.iter())
        .any(|k| lower.contains(k))
}

/// Scene name of a point-of-view entity, e.g. `Tx_1`.
pub fn pov_entity_name(pov_type: &str, id: &str) -> String {
    format!("{}_{}", pov_type, id)
}

/// Scene name of the mast under a point of view, e.g. `mast_Tx_1`.
pub fn mast_entity_name(pov_type: &str, id: &str) -> String {
    format!("mast_{}_{}", pov_type, id)
}

/// Scene name of the trace group between two points of view, e.g. `Tx1_Rx1`.
pub fn trace_entity_name(tx: &str, rx: &str) -> String {
    format!("{}_{}", tx, rx)
}

/// Scene name of a kpi heatmap, e.g. `SINR_Tx_Best`.
pub fn heatmap_entity_name(kpi: &str, pov_type: &str, source: &str) -> String {
    format!("{}_{}_{}", kpi, pov_type, source)
}
