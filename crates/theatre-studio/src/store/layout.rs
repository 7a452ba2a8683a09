//! Keys and paths of the historic document layout.
//!
//! ```text
//! coreByProject.<projectId>
//!   definitionVersion
//!   revisionHistory[]
//!   sheetsById.<sheetId>
//!     staticOverrides.byObject.<objectKey>.<prop path>
//!     sequence
//!       type, length, subUnitsPerUnit
//!       tracksByObject.<objectKey>
//!         trackIdByPropPath.<encoded prop path> = <trackId>
//!         trackData.<trackId> = {type, keyframes[]}
//! ```

use theatre_dataverse::{PathSegment, encode_path};

use crate::ids::{ProjectId, SequenceTrackId, SheetObjectAddress};

pub(crate) const CORE_BY_PROJECT: &str = "coreByProject";
pub(crate) const DEFINITION_VERSION: &str = "definitionVersion";
pub(crate) const REVISION_HISTORY: &str = "revisionHistory";
pub(crate) const SHEETS_BY_ID: &str = "sheetsById";
pub(crate) const SEQUENCE: &str = "sequence";
pub(crate) const TRACK_ID_BY_PROP_PATH: &str = "trackIdByPropPath";
pub(crate) const TRACK_DATA: &str = "trackData";
pub(crate) const KEYFRAMES: &str = "keyframes";
pub(crate) const INITIALISED: &str = "initialised";

/// Version written into freshly created projects.
pub const CURRENT_DEFINITION_VERSION: &str = "0.4.0";
pub(crate) const SEQUENCE_TYPE: &str = "PositionalSequence";
pub(crate) const TRACK_TYPE: &str = "BasicKeyframedTrack";
pub(crate) const DEFAULT_HANDLES: [f64; 4] = [0.5, 1.0, 0.5, 0.0];

fn key(k: &str) -> PathSegment {
    PathSegment::Key(k.to_string())
}

pub(crate) fn project(project_id: &ProjectId) -> Vec<PathSegment> {
    vec![key(CORE_BY_PROJECT), key(project_id.as_str())]
}

pub(crate) fn revision_history(project_id: &ProjectId) -> Vec<PathSegment> {
    let mut path = project(project_id);
    path.push(key(REVISION_HISTORY));
    path
}

fn sheet(address: &SheetObjectAddress) -> Vec<PathSegment> {
    let mut path = project(&address.project_id);
    path.extend([key(SHEETS_BY_ID), key(address.sheet_id.as_str())]);
    path
}

/// The object's entry in the static override table.
pub(crate) fn static_overrides_of_object(address: &SheetObjectAddress) -> Vec<PathSegment> {
    let mut path = sheet(address);
    path.extend([
        key("staticOverrides"),
        key("byObject"),
        key(address.object_key.as_str()),
    ]);
    path
}

pub(crate) fn static_override(address: &SheetObjectAddress, prop: &[PathSegment]) -> Vec<PathSegment> {
    let mut path = static_overrides_of_object(address);
    path.extend_from_slice(prop);
    path
}

pub(crate) fn sequence(address: &SheetObjectAddress) -> Vec<PathSegment> {
    let mut path = sheet(address);
    path.push(key(SEQUENCE));
    path
}

pub(crate) fn tracks_of_object(address: &SheetObjectAddress) -> Vec<PathSegment> {
    let mut path = sequence(address);
    path.extend([key("tracksByObject"), key(address.object_key.as_str())]);
    path
}

pub(crate) fn track_id_of_prop(address: &SheetObjectAddress, prop: &[PathSegment]) -> Vec<PathSegment> {
    let mut path = tracks_of_object(address);
    path.extend([key(TRACK_ID_BY_PROP_PATH), PathSegment::Key(encode_path(prop))]);
    path
}

pub(crate) fn track_data(address: &SheetObjectAddress, track_id: &SequenceTrackId) -> Vec<PathSegment> {
    let mut path = tracks_of_object(address);
    path.extend([key(TRACK_DATA), key(track_id.as_str())]);
    path
}

pub(crate) fn keyframes(address: &SheetObjectAddress, track_id: &SequenceTrackId) -> Vec<PathSegment> {
    let mut path = track_data(address, track_id);
    path.push(key(KEYFRAMES));
    path
}
