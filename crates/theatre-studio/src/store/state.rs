//! The three partitions of studio state.

use std::fmt;

use theatre_dataverse::{Draft, PathSegment, Traverse, Value};

use super::layout;

/// One section of [`StoreState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Undo-tracked document state.
    Historic,
    /// Persisted, but outside undo history.
    Ahistoric,
    /// Runtime flags. Never persisted, never undone.
    Ephemeral,
}

impl Partition {
    pub const ALL: [Partition; 3] = [Self::Historic, Self::Ahistoric, Self::Ephemeral];

    pub fn key(self) -> &'static str {
        match self {
            Self::Historic => "historic",
            Self::Ahistoric => "ahistoric",
            Self::Ephemeral => "ephemeral",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Whole studio state. Cloning is cheap; partitions share structure.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState {
    pub historic: Value,
    pub ahistoric: Value,
    pub ephemeral: Value,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            historic: Value::object(),
            ahistoric: Value::object(),
            ephemeral: Value::object(),
        }
    }
}

impl StoreState {
    pub fn partition(&self, partition: Partition) -> &Value {
        match partition {
            Partition::Historic => &self.historic,
            Partition::Ahistoric => &self.ahistoric,
            Partition::Ephemeral => &self.ephemeral,
        }
    }

    /// True if every partition is the very same node as in `other`.
    pub fn same_as(&self, other: &StoreState) -> bool {
        Partition::ALL
            .into_iter()
            .all(|p| Value::same_node(self.partition(p), other.partition(p)))
    }

    pub fn is_initialised(&self) -> bool {
        self.ephemeral
            .get_key(layout::INITIALISED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub(crate) fn with_historic(&self, historic: Value) -> Self {
        Self {
            historic,
            ..self.clone()
        }
    }
}

impl Traverse for StoreState {
    fn traverse(&self, path: &[PathSegment]) -> Option<Value> {
        let Some((head, rest)) = path.split_first() else {
            return Some(Value::from_entries(
                Partition::ALL.map(|p| (p.key(), self.partition(p).clone())),
            ));
        };
        let PathSegment::Key(key) = head else {
            return None;
        };
        self.partition(Partition::from_key(key)?)
            .get_path(rest)
            .cloned()
    }
}

/// One open draft per partition.
///
/// Reachable from inside a transaction through
/// [`TransactionApi::with_drafts`](super::TransactionApi::with_drafts).
#[derive(Debug)]
pub struct Drafts {
    pub historic: Draft,
    pub ahistoric: Draft,
    pub ephemeral: Draft,
}

impl Drafts {
    pub(crate) fn open(state: &StoreState) -> Self {
        Self {
            historic: Draft::new(&state.historic),
            ahistoric: Draft::new(&state.ahistoric),
            ephemeral: Draft::new(&state.ephemeral),
        }
    }

    pub fn partition_mut(&mut self, partition: Partition) -> &mut Draft {
        match partition {
            Partition::Historic => &mut self.historic,
            Partition::Ahistoric => &mut self.ahistoric,
            Partition::Ephemeral => &mut self.ephemeral,
        }
    }

    /// Snapshot of the drafts as they stand.
    pub fn current_state(&self) -> StoreState {
        StoreState {
            historic: self.historic.current().clone(),
            ahistoric: self.ahistoric.current().clone(),
            ephemeral: self.ephemeral.current().clone(),
        }
    }

    pub(crate) fn finish(self) -> StoreState {
        StoreState {
            historic: self.historic.finish(),
            ahistoric: self.ahistoric.finish(),
            ephemeral: self.ephemeral.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use theatre_dataverse::keys;

    #[test]
    fn traverse_selects_partition_first() {
        let state = StoreState {
            historic: Value::from_entries([("a", 1)]),
            ..StoreState::default()
        };
        assert_eq!(state.traverse(&keys(["historic", "a"])), Some(Value::from(1)));
        assert_eq!(state.traverse(&keys(["ahistoric", "a"])), None);
        assert_eq!(state.traverse(&keys(["elsewhere"])), None);
        assert!(state.traverse(&[]).unwrap().get_key("ephemeral").is_some());
    }

    #[test]
    fn unmodified_drafts_finish_to_the_same_nodes() {
        let state = StoreState::default();
        let mut drafts = Drafts::open(&state);
        drafts.ephemeral.set(&keys(["initialised"]), true).unwrap();
        let next = drafts.finish();
        assert!(Value::same_node(&next.historic, &state.historic));
        assert!(Value::same_node(&next.ahistoric, &state.ahistoric));
        assert!(!next.same_as(&state));
        assert!(next.is_initialised());
    }
}
