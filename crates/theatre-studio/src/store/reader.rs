//! Reading through studio pointers.

use theatre_dataverse::path::try_for_each_leaf;
use theatre_dataverse::{AtomId, DataverseError, Draft, PathSegment, Traverse, Value};

use super::editors::{keyframe_position, track_id_in};
use super::layout;
use super::state::StoreState;
use crate::error::{Result, StoreError};
use crate::sheet_object::{PointerRoot, SheetObject, StudioPointer};

/// Resolve `pointer` against `state`.
///
/// Store pointers must belong to the store whose atom is `store`. Sheet object
/// pointers yield the effective prop values.
pub(crate) fn read_pointer(
    pointer: &StudioPointer,
    state: &StoreState,
    store: AtomId,
) -> Result<Option<Value>> {
    match pointer.root() {
        PointerRoot::Store(atom) if *atom == store => Ok(state.traverse(pointer.path())),
        PointerRoot::Store(atom) => Err(DataverseError::ForeignPointer {
            atom: store,
            pointer_root: *atom,
        }
        .into()),
        PointerRoot::SheetObject(object) => read_props(&state.historic, object, pointer.path()),
    }
}

/// Effective values of the props at `path`: a sequenced prop holds the value
/// of the last keyframe at or before the playhead (the first keyframe before
/// it), otherwise the static override applies, otherwise the default.
fn read_props(
    historic: &Value,
    object: &SheetObject,
    path: &[PathSegment],
) -> Result<Option<Value>> {
    let Some(defaults) = object.template().default_at(path) else {
        return Ok(None);
    };
    let mut out = Draft::new(&defaults);
    try_for_each_leaf(&defaults, path, |default, prop| {
        let value = effective_value(historic, object, prop).unwrap_or_else(|| default.clone());
        out.set(&prop[path.len()..], value).map_err(StoreError::from)
    })?;
    Ok(Some(out.finish()))
}

fn effective_value(historic: &Value, object: &SheetObject, prop: &[PathSegment]) -> Option<Value> {
    let address = object.address();
    if let Some(track_id) = track_id_in(historic, address, prop) {
        let keyframes = historic
            .get_path(&layout::keyframes(address, &track_id))
            .and_then(Value::as_array)
            .unwrap_or_default();
        if !keyframes.is_empty() {
            let position = object.sequence().position();
            let keyframe = keyframes
                .iter()
                .rev()
                .find(|kf| keyframe_position(kf).is_some_and(|p| p <= position))
                .unwrap_or(&keyframes[0]);
            return keyframe.get_key("value").cloned();
        }
    }
    historic
        .get_path(&layout::static_override(address, prop))
        .filter(|v| !v.is_null())
        .cloned()
}
