//! Typed identifier newtypes for Matter addressing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident($inner:ty)) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Wrap a raw value.
            #[must_use]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Access the raw value.
            #[must_use]
            pub const fn get(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

define_id!(
    /// Handle the control utility uses to address one commissioned device.
    NodeId(u64)
);

define_id!(
    /// Sub-addressable unit within a device (cluster host).
    Endpoint(u16)
);

impl NodeId {
    /// Node id of the controller itself; never handed out to a device.
    pub const CONTROLLER: Self = Self(1);

    /// First node id available for commissioned devices.
    pub const FIRST_DEVICE: Self = Self(2);

    /// The id directly after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Endpoint {
    /// Endpoint hosting the basic-information cluster.
    pub const ROOT: Self = Self(0);

    /// Endpoint hosting the lighting clusters of a single bulb.
    pub const LIGHT: Self = Self(1);
}
