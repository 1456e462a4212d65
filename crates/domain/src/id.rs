//! Typed identifier newtypes backed by registry strings.
//!
//! Registry ids are opaque slugs (`living_room`, `light.kitchen`, …) handed
//! out by the upstream registry, so they wrap a `String` rather than a UUID.

use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing registry id.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw id.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the id is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for an [`Entity`](crate::entity::Entity), `domain.object_id`.
    EntityId
);

define_id!(
    /// Unique identifier for a [`Device`](crate::device::Device).
    DeviceId
);

define_id!(
    /// Unique identifier for an [`Area`](crate::area::Area).
    AreaId
);

define_id!(
    /// Unique identifier for a [`Floor`](crate::floor::Floor).
    FloorId
);

define_id!(
    /// Unique identifier for a [`Label`](crate::label::Label).
    LabelId
);

impl EntityId {
    /// The domain part of the id (`light` for `light.kitchen`).
    ///
    /// Returns an empty string when the id has no `.` separator.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('.').map_or("", |(domain, _)| domain)
    }

    /// The object part of the id (`kitchen` for `light.kitchen`).
    #[must_use]
    pub fn object_id(&self) -> &str {
        self.0.split_once('.').map_or(&self.0, |(_, object_id)| object_id)
    }

    /// Whether the id has the `domain.object_id` shape with both parts non-empty.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        matches!(self.0.split_once('.'), Some((domain, object_id)) if !domain.is_empty() && !object_id.is_empty())
    }
}
