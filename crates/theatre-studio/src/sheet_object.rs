//! Sheet objects: the only pointer roots a transaction may write through.
//!
//! A [`SheetObject`] pairs an address in the historic state with an
//! [`ObjectTemplate`] describing its props and a handle on the sheet's
//! [`Sequence`]. Pointers reach either the raw store or a sheet object's
//! props; [`PointerRoot`] names both, and the transaction API matches on it
//! when routing writes.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use theatre_dataverse::{AtomId, PathSegment, Pointer, Value, display_path};

use crate::error::StoreError;
use crate::ids::SheetObjectAddress;

/// Pointer into studio state or into a sheet object's props.
pub type StudioPointer = Pointer<PointerRoot>;

// =============================================================================
// PROP TYPES
// =============================================================================

/// Type of one prop in an object template.
#[derive(Debug, Clone, PartialEq)]
pub enum PropType {
    Number {
        default: f64,
        /// Inclusive bounds.
        range: Option<(f64, f64)>,
    },
    String {
        default: String,
    },
    Boolean {
        default: bool,
    },
    Compound(BTreeMap<String, PropType>),
}

impl PropType {
    pub fn number(default: f64) -> Self {
        Self::Number {
            default,
            range: None,
        }
    }

    pub fn number_in_range(default: f64, min: f64, max: f64) -> Self {
        Self::Number {
            default,
            range: Some((min, max)),
        }
    }

    pub fn string(default: impl Into<String>) -> Self {
        Self::String {
            default: default.into(),
        }
    }

    pub fn boolean(default: bool) -> Self {
        Self::Boolean { default }
    }

    pub fn compound<K: Into<String>>(props: impl IntoIterator<Item = (K, PropType)>) -> Self {
        Self::Compound(props.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn default_value(&self) -> Value {
        match self {
            Self::Number { default, .. } => Value::from(*default),
            Self::String { default } => Value::from(default.as_str()),
            Self::Boolean { default } => Value::from(*default),
            Self::Compound(props) => Value::from_entries(
                props
                    .iter()
                    .map(|(key, prop)| (key.as_str(), prop.default_value())),
            ),
        }
    }

    /// Type of the prop at `path` below this one.
    pub fn at_path(&self, path: &[PathSegment]) -> Option<&PropType> {
        let Some((head, rest)) = path.split_first() else {
            return Some(self);
        };
        match (self, head) {
            (Self::Compound(props), PathSegment::Key(key)) => props.get(key)?.at_path(rest),
            _ => None,
        }
    }

    /// Check `value` against this type. `Null` is accepted anywhere.
    fn validate(&self, value: &Value, path: &mut Vec<PathSegment>) -> Result<(), StoreError> {
        match (self, value) {
            (_, Value::Null) => Ok(()),
            (Self::Number { range, .. }, Value::Number(n)) => {
                if !n.is_finite() {
                    return Err(invalid(path, format!("{n} is not a finite number")));
                }
                match range {
                    Some((min, max)) if *n < *min || *n > *max => Err(invalid(
                        path,
                        format!("{n} is outside the range [{min}, {max}]"),
                    )),
                    _ => Ok(()),
                }
            }
            (Self::String { .. }, Value::String(_)) | (Self::Boolean { .. }, Value::Bool(_)) => {
                Ok(())
            }
            (Self::Compound(props), Value::Object(map)) => {
                for (key, child) in map.iter() {
                    path.push(PathSegment::Key(key.clone()));
                    match props.get(key) {
                        Some(prop) => prop.validate(child, path)?,
                        None => return Err(invalid(path, "unknown prop".to_string())),
                    }
                    path.pop();
                }
                Ok(())
            }
            (expected, found) => Err(invalid(
                path,
                format!("expected {}, found {}", expected.kind(), found.kind()),
            )),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Number { .. } => "number",
            Self::String { .. } => "string",
            Self::Boolean { .. } => "boolean",
            Self::Compound(_) => "object",
        }
    }
}

/// The props of an object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTemplate {
    props: PropType,
}

impl ObjectTemplate {
    pub fn new<K: Into<String>>(props: impl IntoIterator<Item = (K, PropType)>) -> Self {
        Self {
            props: PropType::compound(props),
        }
    }

    pub fn props(&self) -> &PropType {
        &self.props
    }

    pub fn default_values(&self) -> Value {
        self.props.default_value()
    }

    /// Default value at `path`, or `None` if no prop lives there.
    pub fn default_at(&self, path: &[PathSegment]) -> Option<Value> {
        self.props.at_path(path).map(PropType::default_value)
    }

    /// Validate a value about to be written at `path`.
    pub fn validate_value(&self, path: &[PathSegment], value: &Value) -> Result<(), StoreError> {
        let prop = self
            .props
            .at_path(path)
            .ok_or_else(|| invalid(path, "unknown prop".to_string()))?;
        prop.validate(value, &mut path.to_vec())
    }
}

fn invalid(path: &[PathSegment], reason: String) -> StoreError {
    StoreError::InvalidValue {
        path: display_path(path),
        reason,
    }
}

// =============================================================================
// SEQUENCE
// =============================================================================

/// Playback handle of a sheet's sequence.
#[derive(Debug)]
pub struct Sequence {
    length: f64,
    subunits_per_unit: u32,
    position: Cell<f64>,
}

impl Sequence {
    /// A zero `subunits_per_unit` is treated as 1.
    pub fn new(length: f64, subunits_per_unit: u32) -> Self {
        Self {
            length: length.max(0.0),
            subunits_per_unit: subunits_per_unit.max(1),
            position: Cell::new(0.0),
        }
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn subunits_per_unit(&self) -> u32 {
        self.subunits_per_unit
    }

    pub fn position(&self) -> f64 {
        self.position.get()
    }

    /// Move the playhead, clamped to the sequence.
    pub fn set_position(&self, position: f64) {
        self.position.set(position.clamp(0.0, self.length));
    }

    /// `position` rounded to the nearest subunit, clamped to `[0, length]`,
    /// with three decimals.
    pub fn closest_grid_position(&self, position: f64) -> f64 {
        let subunits = f64::from(self.subunits_per_unit);
        let snapped = ((position * subunits).round() / subunits).clamp(0.0, self.length);
        (snapped * 1000.0).round() / 1000.0
    }

    pub fn position_snapped_to_grid(&self) -> f64 {
        self.closest_grid_position(self.position())
    }
}

// =============================================================================
// SHEET OBJECT
// =============================================================================

#[derive(Debug)]
pub struct SheetObject {
    address: SheetObjectAddress,
    template: ObjectTemplate,
    sequence: Rc<Sequence>,
}

impl SheetObject {
    pub fn new(address: SheetObjectAddress, template: ObjectTemplate, sequence: Rc<Sequence>) -> Self {
        Self {
            address,
            template,
            sequence,
        }
    }

    pub fn address(&self) -> &SheetObjectAddress {
        &self.address
    }

    pub fn template(&self) -> &ObjectTemplate {
        &self.template
    }

    pub fn sequence(&self) -> &Rc<Sequence> {
        &self.sequence
    }

    /// Pointer to all of this object's props.
    pub fn props_pointer(self: &Rc<Self>) -> StudioPointer {
        Pointer::new(PointerRoot::SheetObject(Rc::clone(self)))
    }
}

// =============================================================================
// POINTER ROOTS
// =============================================================================

/// Every kind of root a [`StudioPointer`] can have.
#[derive(Debug, Clone)]
pub enum PointerRoot {
    /// The store's own state atom. Readable; not writable through `set`.
    Store(AtomId),
    SheetObject(Rc<SheetObject>),
}

impl PartialEq for PointerRoot {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Store(a), Self::Store(b)) => a == b,
            (Self::SheetObject(a), Self::SheetObject(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for PointerRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(atom) => write!(f, "store({atom})"),
            Self::SheetObject(object) => write!(f, "object({})", object.address()),
        }
    }
}
