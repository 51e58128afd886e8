//! Error types for the cgviz visualizer.

use std::fmt;

use thiserror::Error;

/// Top-level error type for the visualizer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VizError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// The abstract error kinds surfaced to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedTag,
    AmbiguousTraceName,
    DuplicateScenario,
    AlreadyRegistered,
    UnknownEntity,
    DecodeError,
    /// Registry or renderer failures that indicate a broken caller invariant.
    Scene,
}

impl VizError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VizError::Parse(ParseError::MalformedTag { .. }) => ErrorKind::MalformedTag,
            VizError::Parse(ParseError::AmbiguousTraceName { .. }) => ErrorKind::AmbiguousTraceName,
            VizError::Decode(_) => ErrorKind::DecodeError,
            VizError::Store(StoreError::DuplicateScenario(_)) => ErrorKind::DuplicateScenario,
            VizError::Store(StoreError::UnknownEntity { .. }) => ErrorKind::UnknownEntity,
            VizError::Scene(SceneError::AlreadyRegistered(_)) => ErrorKind::AlreadyRegistered,
            VizError::Scene(_) => ErrorKind::Scene,
        }
    }

    /// Shorthand for an unknown entity lookup failure.
    pub fn unknown(kind: EntityKind, scenario: &str, name: impl Into<String>) -> Self {
        VizError::Store(StoreError::UnknownEntity {
            kind,
            scenario: scenario.to_string(),
            name: name.into(),
        })
    }
}

/// Errors while parsing file-name encoded identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Malformed point-of-view tag {tag:?}: expected letters followed by digits")]
    MalformedTag { tag: String },

    #[error("Ambiguous trace file name {name:?}: expected 2 or 4 '-' separated ids, found {parts}")]
    AmbiguousTraceName { name: String, parts: usize },
}

/// Errors while decoding the content of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Invalid JSON in {file}: {reason}")]
    Json { file: String, reason: String },

    #[error("Invalid geometry in {file} at line {line}: {reason}")]
    Geometry { file: String, line: usize, reason: String },

    #[error("Unexpected content in {file}: {reason}")]
    Shape { file: String, reason: String },

    #[error("Unrecognized source file: {file}")]
    UnknownFile { file: String },
}

/// Errors raised by the scenario store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Scenario {0} is already loaded; delete it first")]
    DuplicateScenario(String),

    #[error("Unknown {kind} {name:?} in scenario {scenario:?}")]
    UnknownEntity {
        kind: EntityKind,
        scenario: String,
        name: String,
    },
}

/// Errors raised by the scene group registry and renderers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("Scenario {0} is already registered in the scene")]
    AlreadyRegistered(String),

    #[error("Scenario {0} is not registered in the scene")]
    NotRegistered(String),

    #[error("Entity {name} already exists in the {category} container of {scenario}")]
    EntityExists {
        scenario: String,
        category: String,
        name: String,
    },

    #[error("Unknown scene node #{0}")]
    UnknownNode(u32),

    #[error("Renderer failure: {reason}")]
    Renderer { reason: String },
}

/// What kind of entity a lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Scenario,
    PovType,
    Pov,
    Transmitter,
    Trace,
    UniverseObject,
    UniverseBounds,
    Kpi,
    KpiSource,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Scenario => "scenario",
            EntityKind::PovType => "point-of-view type",
            EntityKind::Pov => "point of view",
            EntityKind::Transmitter => "transmitter",
            EntityKind::Trace => "trace",
            EntityKind::UniverseObject => "universe object",
            EntityKind::UniverseBounds => "universe bounds",
            EntityKind::Kpi => "kpi",
            EntityKind::KpiSource => "kpi source",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err: VizError = ParseError::MalformedTag { tag: "42".into() }.into();
        assert_eq!(err.kind(), ErrorKind::MalformedTag);

        let err: VizError = StoreError::DuplicateScenario("s".into()).into();
        assert_eq!(err.kind(), ErrorKind::DuplicateScenario);

        let err = VizError::unknown(EntityKind::Pov, "s", "Tx_1");
        assert_eq!(err.kind(), ErrorKind::UnknownEntity);

        let err: VizError = SceneError::AlreadyRegistered("s".into()).into();
        assert_eq!(err.kind(), ErrorKind::AlreadyRegistered);

        let err: VizError = DecodeError::UnknownFile { file: "x".into() }.into();
        assert_eq!(err.kind(), ErrorKind::DecodeError);
    }

    #[test]
    fn test_error_messages() {
        let err = ParseError::AmbiguousTraceName { name: "qcmTrace.a-b-c.json".into(), parts: 3 };
        assert!(err.to_string().contains("found 3"));

        let err = VizError::unknown(EntityKind::Transmitter, "dummy", "Tx9");
        assert_eq!(err.to_string(), "Unknown transmitter \"Tx9\" in scenario \"dummy\"");
    }
}
