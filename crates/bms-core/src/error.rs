//! Engine error type.

use bms_logic::sensors::SensorType;
use bms_logic::LogicError;
use hecs::Entity;
use thiserror::Error;

/// Errors returned by simulation operations, save files and snapshots.
#[derive(Debug, Error)]
pub enum BmsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("room already has a {0}")]
    DuplicateSensorKind(SensorType),
    #[error("room number {0} is already taken on this floor")]
    DuplicateRoom(u32),
    #[error("floor {0} already exists in this building")]
    DuplicateFloor(i32),
    #[error("there is no floor below floor {0} to support it")]
    NoFloorBelow(i32),
    #[error("floor too small: {0}")]
    FloorTooSmall(String),
    #[error("insufficient space: {0}")]
    InsufficientSpace(String),
    #[error("cannot conduct fire drill: {0}")]
    FireDrill(String),
    /// A handle does not name an entity of the expected kind.
    #[error("entity {entity:?} is not a {expected}")]
    WrongEntity { entity: Entity, expected: &'static str },
    #[error("line {line}: {reason}")]
    FileFormat { line: usize, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

impl BmsError {
    pub(crate) fn wrong_entity(entity: Entity, expected: &'static str) -> Self {
        BmsError::WrongEntity { entity, expected }
    }

    pub(crate) fn file_format(line: usize, reason: impl Into<String>) -> Self {
        BmsError::FileFormat {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        BmsError::InvalidArgument(msg.into())
    }
}

impl From<LogicError> for BmsError {
    fn from(e: LogicError) -> Self {
        match e {
            LogicError::InvalidArgument(msg) => BmsError::InvalidArgument(msg),
            LogicError::FileFormat(reason) => BmsError::FileFormat { line: 0, reason },
        }
    }
}
