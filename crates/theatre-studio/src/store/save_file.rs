//! Save-file snapshots of a project.
//!
//! [`OnDiskState`] is the typed form of one project's historic sub-document.
//! It is a plain value: once created it shares nothing mutable with the store.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use theatre_dataverse::Value;

use crate::error::ModelError;
use crate::ids::{KeyframeId, ObjectKey, SequenceTrackId, SheetId};

// =============================================================================
// REVISIONS
// =============================================================================

/// Save-file revision marker.
///
/// Microseconds since the Unix epoch, rendered as 20 zero-padded digits so
/// that string order matches numeric order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiskStateRevision(u64);

impl DiskStateRevision {
    pub fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub fn as_micros(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DiskStateRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:020}", self.0)
    }
}

impl FromStr for DiskStateRevision {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Hands out strictly increasing revisions, even when the wall clock stalls
/// or steps back.
#[derive(Debug, Clone, Default)]
pub(crate) struct RevisionClock {
    last: u64,
}

impl RevisionClock {
    pub(crate) fn next(&mut self) -> DiskStateRevision {
        let now = u64::try_from(Utc::now().timestamp_micros()).unwrap_or(0);
        self.last = now.max(self.last.saturating_add(1));
        DiskStateRevision(self.last)
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

/// A project's state as written to a save file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnDiskState {
    pub definition_version: String,
    /// Oldest first.
    #[serde(default)]
    pub revision_history: Vec<String>,
    #[serde(default)]
    pub sheets_by_id: BTreeMap<SheetId, SheetState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetState {
    #[serde(default)]
    pub static_overrides: StaticOverrides,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<SequenceState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticOverrides {
    /// Prop values per object, shaped like the object's props.
    #[serde(default)]
    pub by_object: BTreeMap<ObjectKey, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceState {
    #[serde(rename = "type")]
    pub kind: String,
    pub length: f64,
    pub sub_units_per_unit: u32,
    #[serde(default)]
    pub tracks_by_object: BTreeMap<ObjectKey, TracksOfObject>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracksOfObject {
    /// Keyed by the JSON-encoded prop path.
    #[serde(default)]
    pub track_id_by_prop_path: BTreeMap<String, SequenceTrackId>,
    #[serde(default)]
    pub track_data: BTreeMap<SequenceTrackId, TrackData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackData {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    pub id: KeyframeId,
    pub position: f64,
    pub value: Value,
    pub handles: [f64; 4],
    pub connected_right: bool,
}

impl OnDiskState {
    /// Decode a project sub-document from the historic partition.
    pub fn from_value(value: &Value) -> Result<Self, ModelError> {
        serde_json::from_value(serde_json::Value::from(value)).map_err(|source| {
            ModelError::Decode {
                what: "project",
                source,
            }
        })
    }

    pub fn to_value(&self) -> Result<Value, ModelError> {
        serde_json::to_value(self)
            .map(Value::from)
            .map_err(|source| ModelError::Encode {
                what: "project",
                source,
            })
    }

    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        serde_json::to_string_pretty(self).map_err(|source| ModelError::Encode {
            what: "project",
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        serde_json::from_str(text).map_err(|source| ModelError::Decode {
            what: "save file",
            source,
        })
    }

    /// The newest revision, if it is one of ours.
    pub fn revision(&self) -> Option<DiskStateRevision> {
        self.revision_history.last()?.parse().ok()
    }

    pub fn sequence_tracks(&self) -> impl Iterator<Item = &TrackData> {
        self.sheets_by_id
            .values()
            .filter_map(|sheet| sheet.sequence.as_ref())
            .flat_map(|sequence| sequence.tracks_by_object.values())
            .flat_map(|tracks| tracks.track_data.values())
    }

    pub fn keyframe_count(&self) -> usize {
        self.sequence_tracks().map(|track| track.keyframes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revisions_are_strictly_increasing() {
        let mut clock = RevisionClock::default();
        let mut previous = clock.next();
        for _ in 0..1000 {
            let next = clock.next();
            assert!(next > previous);
            assert!(next.to_string() > previous.to_string());
            previous = next;
        }
    }

    #[test]
    fn revision_text_is_fixed_width() {
        let revision = DiskStateRevision::from_micros(42);
        assert_eq!(revision.to_string(), "00000000000000000042");
        assert_eq!("00000000000000000042".parse::<DiskStateRevision>().unwrap(), revision);
    }

    #[test]
    fn decodes_a_project_document() {
        let json = r#"{
            "definitionVersion": "0.4.0",
            "revisionHistory": ["00000000000000000007", "someone-else"],
            "sheetsById": {
                "Scene": {
                    "staticOverrides": {"byObject": {"box": {"size": 3}}},
                    "sequence": {
                        "type": "PositionalSequence",
                        "length": 10,
                        "subUnitsPerUnit": 30,
                        "tracksByObject": {
                            "box": {
                                "trackIdByPropPath": {"[\"x\"]": "t1"},
                                "trackData": {
                                    "t1": {
                                        "type": "BasicKeyframedTrack",
                                        "keyframes": [{
                                            "id": "k1",
                                            "position": 0,
                                            "value": 1,
                                            "handles": [0.5, 1, 0.5, 0],
                                            "connectedRight": true
                                        }]
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }"#;
        let state = OnDiskState::from_json(json).unwrap();
        assert_eq!(state.revision(), Some(DiskStateRevision::from_micros(7)));
        assert_eq!(state.keyframe_count(), 1);

        let back = OnDiskState::from_value(&state.to_value().unwrap()).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn missing_definition_version_is_a_decode_error() {
        assert!(matches!(
            OnDiskState::from_json("{}"),
            Err(ModelError::Decode { what: "save file", .. })
        ));
    }
}
