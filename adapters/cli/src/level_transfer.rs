#![allow(clippy::missing_errors_doc)]

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use snake_escape_core::{GridSize, LevelIndex, LevelLayout, Obstacle, Snake};
use thiserror::Error;

const TRANSFER_DOMAIN: &str = "snake";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded level payload.
pub(crate) const TRANSFER_HEADER: &str = "snake:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Shareable snapshot of a generated level and its grid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LevelSnapshot {
    /// Side length of the square grid.
    pub grid: u32,
    /// Level index the layout was generated for.
    pub level: u32,
    /// Whether the level uses the challenge perturbation and palette.
    pub challenge: bool,
    /// Move-buffer value from the difficulty profile.
    pub move_buffer: u32,
    /// Snakes composing the layout.
    pub snakes: Vec<Snake>,
    /// Obstacles composing the layout.
    pub obstacles: Vec<Obstacle>,
}

impl LevelSnapshot {
    /// Captures a snapshot of the provided layout.
    pub(crate) fn from_layout(layout: &LevelLayout) -> Self {
        Self {
            grid: layout.grid.get(),
            level: layout.level.get(),
            challenge: layout.challenge,
            move_buffer: layout.move_buffer,
            snakes: layout.snakes.clone(),
            obstacles: layout.obstacles.clone(),
        }
    }

    /// Rebuilds the plain layout record from the snapshot.
    pub(crate) fn into_layout(self) -> LevelLayout {
        LevelLayout {
            level: LevelIndex::new(self.level),
            grid: GridSize::new(self.grid),
            snakes: self.snakes,
            obstacles: self.obstacles,
            challenge: self.challenge,
            move_buffer: self.move_buffer,
        }
    }

    /// Encodes the snapshot into a single-line string suitable for sharing.
    pub(crate) fn encode(&self) -> String {
        let payload = SerializablePayload {
            level: self.level,
            challenge: self.challenge,
            move_buffer: self.move_buffer,
            snakes: self.snakes.clone(),
            obstacles: self.obstacles.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("level snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{TRANSFER_HEADER}:{0}x{0}:{encoded}", self.grid)
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LevelTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LevelTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LevelTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LevelTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LevelTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LevelTransferError::MissingPayload)?;

        if domain != TRANSFER_DOMAIN {
            return Err(LevelTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != TRANSFER_VERSION {
            return Err(LevelTransferError::UnsupportedVersion(version.to_owned()));
        }

        let grid = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LevelTransferError::InvalidEncoding)?;
        let decoded: SerializablePayload =
            serde_json::from_slice(&bytes).map_err(LevelTransferError::InvalidPayload)?;

        Ok(Self {
            grid,
            level: decoded.level,
            challenge: decoded.challenge,
            move_buffer: decoded.move_buffer,
            snakes: decoded.snakes,
            obstacles: decoded.obstacles,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializablePayload {
    level: u32,
    challenge: bool,
    move_buffer: u32,
    snakes: Vec<Snake>,
    obstacles: Vec<Obstacle>,
}

/// Errors that can occur while decoding level transfer strings.
#[derive(Debug, Error)]
pub(crate) enum LevelTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("transfer payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded level.
    #[error("transfer string is missing the prefix")]
    MissingPrefix,
    /// The encoded level did not contain a version segment.
    #[error("transfer string is missing the version")]
    MissingVersion,
    /// The encoded level did not include grid dimensions.
    #[error("transfer string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded level did not include the payload segment.
    #[error("transfer string is missing the payload")]
    MissingPayload,
    /// The encoded level used an unexpected prefix segment.
    #[error("transfer prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded level used an unsupported version identifier.
    #[error("transfer version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed or were not square.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode transfer payload: {0}")]
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse transfer payload: {0}")]
    InvalidPayload(serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<u32, LevelTransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LevelTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| LevelTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| LevelTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || columns != rows {
        return Err(LevelTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake_escape_core::{CellCoord, Direction, SnakeColor, SnakeId};

    fn sample_snapshot() -> LevelSnapshot {
        LevelSnapshot {
            grid: 6,
            level: 14,
            challenge: false,
            move_buffer: 4,
            snakes: vec![Snake::new(
                SnakeId::new(0),
                vec![CellCoord::new(2, 2), CellCoord::new(2, 3)],
                Direction::Up,
                SnakeColor::from_rgb(0x00, 0xf2, 0xfe),
            )],
            obstacles: vec![Obstacle::at(4, 1)],
        }
    }

    #[test]
    fn round_trip_empty_level() {
        let snapshot = LevelSnapshot {
            grid: 5,
            level: 1,
            challenge: false,
            move_buffer: 5,
            snakes: Vec::new(),
            obstacles: Vec::new(),
        };

        let encoded = snapshot.encode();
        assert!(encoded.starts_with(&format!("{TRANSFER_HEADER}:5x5:")));

        let decoded = LevelSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn round_trip_populated_level() {
        let snapshot = sample_snapshot();
        let encoded = snapshot.encode();
        assert!(encoded.starts_with(&format!("{TRANSFER_HEADER}:6x6:")));

        let decoded = LevelSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
        assert_eq!(decoded.into_layout().move_allowance(), 3);
    }

    #[test]
    fn rejects_foreign_prefixes_and_versions() {
        assert!(matches!(
            LevelSnapshot::decode("ladder:v1:5x5:e30"),
            Err(LevelTransferError::InvalidPrefix(_))
        ));
        assert!(matches!(
            LevelSnapshot::decode("snake:v2:5x5:e30"),
            Err(LevelTransferError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn rejects_malformed_dimensions() {
        assert!(matches!(
            LevelSnapshot::decode("snake:v1:5x6:e30"),
            Err(LevelTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            LevelSnapshot::decode("snake:v1:0x0:e30"),
            Err(LevelTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            LevelSnapshot::decode("snake:v1:wide:e30"),
            Err(LevelTransferError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn rejects_empty_and_truncated_strings() {
        assert!(matches!(
            LevelSnapshot::decode("   "),
            Err(LevelTransferError::EmptyPayload)
        ));
        assert!(matches!(
            LevelSnapshot::decode("snake:v1:5x5"),
            Err(LevelTransferError::MissingPayload)
        ));
        assert!(matches!(
            LevelSnapshot::decode("snake:v1:5x5:!!!"),
            Err(LevelTransferError::InvalidEncoding(_))
        ));
    }
}
