//! Newtype domain identifiers.
//!
//! Every concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`RunId`] with a [`JobId`] even though both are `u64` under the hood.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `Display` that prints the wrapped value unchanged.
macro_rules! display_inner {
    ($($name:ident),+ $(,)?) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(&self.0, f)
                }
            }
        )+
    };
}

/// Names chosen by the user on the command line. Blank input is rejected and
/// surrounding whitespace is dropped.
macro_rules! name_id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates the name from trimmed input, returning `None` if it is blank.
            pub fn new(value: impl AsRef<str>) -> Option<Self> {
                let trimmed = value.as_ref().trim();
                (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
            }

            /// Returns the name as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        display_inner!($name);
    };
}

/// Numbers assigned by GitHub. They travel as bare JSON integers.
macro_rules! github_number {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a number assigned by GitHub.
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        display_inner!($name);
    };
}

// ---------------------------------------------------------------------------
// Identifiers: GitHub-integer-backed
// ---------------------------------------------------------------------------

github_number! {
    /// Identifies one workflow run (one execution of a workflow).
    ///
    /// Resolved once after the dispatch and reused for every poll.
    RunId
}

github_number! {
    /// Identifies a job within a run.
    ///
    /// The same number addresses the job's check run, which is where
    /// annotations are attached.
    JobId
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single CLI invocation.
///
/// Generated fresh for every invocation and recorded on the root tracing span
/// so all HTTP calls made for one dispatch can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

display_inner!(InvocationId, RepositoryId);

// ---------------------------------------------------------------------------
// Identifiers: String-backed
// ---------------------------------------------------------------------------

/// Identifies a GitHub repository in `"owner/name"` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryId(String);

impl RepositoryId {
    /// Creates a repository identifier.
    ///
    /// Returns `None` unless `value` is exactly `owner/name` with both halves
    /// non-empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        let (owner, name) = v.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self(v))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Browser URL of a run in this repository.
    pub fn run_permalink(&self, run: RunId) -> String {
        format!("https://github.com/{}/actions/runs/{}", self.0, run)
    }
}

name_id! {
    /// Identifies a workflow: its file name (`ci.yml`), numeric id, or display name.
    ///
    /// Used both in the workflow dispatch path and as the `name` filter of the
    /// run listing.
    WorkflowRef
}

name_id! {
    /// The `event_type` of a repository dispatch event.
    EventType
}

name_id! {
    /// A branch or tag name the workflow dispatch runs against.
    GitRef
}
