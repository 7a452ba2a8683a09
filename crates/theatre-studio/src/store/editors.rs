//! Typed mutations of studio state.
//!
//! [`StateEditors`] wraps the drafts of an open transaction. Everything the
//! transaction API's `set`/`unset` do goes through here, and privileged
//! callers can use it directly via
//! [`TransactionApi::editors`](super::TransactionApi::editors).

use theatre_dataverse::{PathSegment, Value};

use super::layout::{
    self, CURRENT_DEFINITION_VERSION, DEFAULT_HANDLES, DEFINITION_VERSION, KEYFRAMES,
    REVISION_HISTORY, SEQUENCE_TYPE, SHEETS_BY_ID, TRACK_TYPE,
};
use super::save_file::{DiskStateRevision, OnDiskState};
use super::state::Drafts;
use crate::error::{Result, StoreError};
use crate::ids::{KeyframeId, ProjectId, SequenceTrackId, SheetObjectAddress};
use crate::sheet_object::Sequence;

pub struct StateEditors<'a> {
    drafts: &'a mut Drafts,
}

impl<'a> StateEditors<'a> {
    pub(crate) fn new(drafts: &'a mut Drafts) -> Self {
        Self { drafts }
    }

    // =========================================================================
    // PROJECTS
    // =========================================================================

    /// Create an empty project, or fill in the top-level fields an existing
    /// one is missing.
    pub fn ensure_project(&mut self, project_id: &ProjectId) -> Result<()> {
        let path = layout::project(project_id);
        let created = self.drafts.historic.get(&path).is_none();
        for (field, empty) in [
            (DEFINITION_VERSION, Value::from(CURRENT_DEFINITION_VERSION)),
            (REVISION_HISTORY, Value::from(Vec::<Value>::new())),
            (SHEETS_BY_ID, Value::object()),
        ] {
            let mut field_path = path.clone();
            field_path.push(PathSegment::from(field));
            if self.drafts.historic.get(&field_path).is_none() {
                self.drafts.historic.set(&field_path, empty)?;
            }
        }
        if created {
            tracing::debug!(%project_id, "created project");
        }
        Ok(())
    }

    /// Replace a project's state with a loaded save file.
    pub fn set_project_state(&mut self, project_id: &ProjectId, state: &OnDiskState) -> Result<()> {
        self.drafts
            .historic
            .set(&layout::project(project_id), state.to_value()?)?;
        Ok(())
    }

    /// Append `revision` to the project's revision history, dropping the
    /// oldest entries beyond `max_kept`.
    pub fn add_revision(
        &mut self,
        project_id: &ProjectId,
        revision: &DiskStateRevision,
        max_kept: usize,
    ) -> Result<()> {
        let path = layout::revision_history(project_id);
        let mut history: Vec<Value> = self
            .drafts
            .historic
            .get(&path)
            .and_then(Value::as_array)
            .map(<[Value]>::to_vec)
            .unwrap_or_default();
        history.push(Value::from(revision.to_string()));
        let excess = history.len().saturating_sub(max_kept);
        history.drain(..excess);
        self.drafts.historic.set(&path, history)?;
        Ok(())
    }

    // =========================================================================
    // STATIC OVERRIDES
    // =========================================================================

    pub fn set_value_of_primitive_prop(
        &mut self,
        address: &SheetObjectAddress,
        prop: &[PathSegment],
        value: impl Into<Value>,
    ) -> Result<()> {
        self.drafts
            .historic
            .set(&layout::static_override(address, prop), value)?;
        Ok(())
    }

    /// Remove a static override. Objects left empty by the removal are removed
    /// too, up to the object's entry.
    pub fn unset_value_of_primitive_prop(&mut self, address: &SheetObjectAddress, prop: &[PathSegment]) {
        let keep_depth = layout::static_overrides_of_object(address).len() - 1;
        self.drafts
            .historic
            .remove_and_prune(&layout::static_override(address, prop), keep_depth);
    }

    // =========================================================================
    // SEQUENCE TRACKS
    // =========================================================================

    pub fn track_id_for_prop(
        &self,
        address: &SheetObjectAddress,
        prop: &[PathSegment],
    ) -> Option<SequenceTrackId> {
        track_id_in(self.drafts.historic.current(), address, prop)
    }

    /// Put a prop under sequence control. Returns the new track's id, or the
    /// existing one if the prop is already sequenced.
    pub fn set_primitive_prop_as_sequenced(
        &mut self,
        address: &SheetObjectAddress,
        prop: &[PathSegment],
        sequence: &Sequence,
    ) -> Result<SequenceTrackId> {
        if let Some(track_id) = self.track_id_for_prop(address, prop) {
            return Ok(track_id);
        }

        self.ensure_project(&address.project_id)?;
        let sequence_path = layout::sequence(address);
        if self.drafts.historic.get(&sequence_path).is_none() {
            self.drafts.historic.set(
                &sequence_path,
                Value::from_entries([
                    ("type", Value::from(SEQUENCE_TYPE)),
                    ("length", Value::from(sequence.length())),
                    ("subUnitsPerUnit", Value::from(sequence.subunits_per_unit())),
                ]),
            )?;
        }

        let track_id = SequenceTrackId::generate();
        self.drafts
            .historic
            .set(&layout::track_id_of_prop(address, prop), track_id.as_str())?;
        self.drafts.historic.set(
            &layout::track_data(address, &track_id),
            Value::from_entries([
                ("type", Value::from(TRACK_TYPE)),
                (KEYFRAMES, Value::from(Vec::<Value>::new())),
            ]),
        )?;
        self.unset_value_of_primitive_prop(address, prop);
        tracing::debug!(%address, %track_id, "prop sequenced");
        Ok(track_id)
    }

    /// Take a prop out of sequence control, dropping its track, and give it a
    /// static value.
    pub fn set_primitive_prop_as_static(
        &mut self,
        address: &SheetObjectAddress,
        prop: &[PathSegment],
        value: impl Into<Value>,
    ) -> Result<()> {
        if let Some(track_id) = self.track_id_for_prop(address, prop) {
            self.drafts
                .historic
                .remove(&layout::track_id_of_prop(address, prop));
            self.drafts
                .historic
                .remove(&layout::track_data(address, &track_id));
        }
        self.set_value_of_primitive_prop(address, prop, value)
    }

    /// Set the value of the keyframe at `snap(position)`, inserting a keyframe
    /// there if there is none.
    pub fn set_keyframe_at_position<F>(
        &mut self,
        address: &SheetObjectAddress,
        track_id: &SequenceTrackId,
        position: f64,
        value: impl Into<Value>,
        snap: F,
    ) -> Result<()>
    where
        F: Fn(f64) -> f64,
    {
        let path = layout::keyframes(address, track_id);
        let mut keyframes = self.keyframes(&path, track_id)?;
        let position = snap(position);
        let value = value.into();

        let left = keyframes
            .iter()
            .rposition(|kf| keyframe_position(kf).is_some_and(|p| p <= position));
        match left {
            Some(index) if keyframe_position(&keyframes[index]) == Some(position) => {
                let mut value_path = path;
                value_path.extend([PathSegment::Index(index), PathSegment::from("value")]);
                self.drafts.historic.set(&value_path, value)?;
                return Ok(());
            }
            Some(index) => {
                let connected_right = keyframes[index]
                    .get_key("connectedRight")
                    .and_then(Value::as_bool)
                    .unwrap_or(true);
                keyframes.insert(index + 1, new_keyframe(position, value, connected_right));
            }
            None => keyframes.insert(0, new_keyframe(position, value, true)),
        }
        self.drafts.historic.set(&path, keyframes)?;
        Ok(())
    }

    /// Remove the keyframe at exactly `position`, if any.
    pub fn unset_keyframe_at_position(
        &mut self,
        address: &SheetObjectAddress,
        track_id: &SequenceTrackId,
        position: f64,
    ) -> Result<()> {
        let path = layout::keyframes(address, track_id);
        let keyframes = self.keyframes(&path, track_id)?;
        let kept: Vec<Value> = keyframes
            .iter()
            .filter(|kf| keyframe_position(kf) != Some(position))
            .cloned()
            .collect();
        if kept.len() != keyframes.len() {
            self.drafts.historic.set(&path, kept)?;
        }
        Ok(())
    }

    fn keyframes(&self, path: &[PathSegment], track_id: &SequenceTrackId) -> Result<Vec<Value>> {
        let keyframes = self
            .drafts
            .historic
            .get(path)
            .ok_or_else(|| StoreError::TrackNotFound {
                track_id: track_id.clone(),
            })?;
        Ok(keyframes.as_array().map(<[Value]>::to_vec).unwrap_or_default())
    }

    // =========================================================================
    // EPHEMERAL
    // =========================================================================

    pub fn set_initialised(&mut self, initialised: bool) -> Result<()> {
        self.drafts
            .ephemeral
            .set(&[PathSegment::from(layout::INITIALISED)], initialised)?;
        Ok(())
    }
}

pub(crate) fn track_id_in(
    historic: &Value,
    address: &SheetObjectAddress,
    prop: &[PathSegment],
) -> Option<SequenceTrackId> {
    historic
        .get_path(&layout::track_id_of_prop(address, prop))
        .and_then(Value::as_str)
        .and_then(|id| SequenceTrackId::new(id).ok())
}

pub(crate) fn keyframe_position(keyframe: &Value) -> Option<f64> {
    keyframe.get_key("position")?.as_f64()
}

fn new_keyframe(position: f64, value: Value, connected_right: bool) -> Value {
    Value::from_entries([
        ("id", Value::from(KeyframeId::generate().as_str())),
        ("position", Value::from(position)),
        ("value", value),
        ("handles", Value::from(DEFAULT_HANDLES.map(Value::from).to_vec())),
        ("connectedRight", Value::from(connected_right)),
    ])
}
