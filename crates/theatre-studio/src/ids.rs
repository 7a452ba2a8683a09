//! String identifiers used as keys in studio state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Fails on empty or whitespace-only ids.
            pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ModelError::EmptyId { kind: $kind });
                }
                Ok(Self(id))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ModelError;

            fn try_from(id: String) -> Result<Self, Self::Error> {
                Self::new(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }
    };
}

string_id!(
    /// Identifies a project; the key under `coreByProject`.
    ProjectId,
    "project id"
);
string_id!(SheetId, "sheet id");
string_id!(SheetInstanceId, "sheet instance id");
string_id!(
    /// Key of an object within its sheet.
    ObjectKey,
    "object key"
);
string_id!(SequenceTrackId, "sequence track id");
string_id!(KeyframeId, "keyframe id");

fn short_random_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(10);
    id
}

impl SequenceTrackId {
    pub fn generate() -> Self {
        Self(short_random_id())
    }
}

impl KeyframeId {
    pub fn generate() -> Self {
        Self(short_random_id())
    }
}

/// Where a sheet object lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetObjectAddress {
    pub project_id: ProjectId,
    pub sheet_id: SheetId,
    pub sheet_instance_id: SheetInstanceId,
    pub object_key: ObjectKey,
}

impl SheetObjectAddress {
    pub fn new(
        project_id: ProjectId,
        sheet_id: SheetId,
        sheet_instance_id: SheetInstanceId,
        object_key: ObjectKey,
    ) -> Self {
        Self {
            project_id,
            sheet_id,
            sheet_instance_id,
            object_key,
        }
    }
}

impl fmt::Display for SheetObjectAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.project_id, self.sheet_id, self.sheet_instance_id, self.object_key
        )
    }
}
