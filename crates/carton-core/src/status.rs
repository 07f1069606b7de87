//! Component status and state tags
//!
//! Both are free-form strings owned by the provisioning engine. `Status`
//! tracks operational progress (`launching`, `running`, ...), `State` tracks
//! the provisioning lifecycle phase (`bootstrapped`, `deployed`, ...). They
//! are independent axes and are persisted to separate columns.

use serde::{Deserialize, Serialize};

macro_rules! tag_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(tag: impl Into<String>) -> Self {
                Self(tag.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(tag: &str) -> Self {
                Self::new(tag)
            }
        }

        impl From<String> for $name {
            fn from(tag: String) -> Self {
                Self(tag)
            }
        }
    };
}

tag_type!(
    /// Operational status of a component
    Status
);

tag_type!(
    /// Provisioning lifecycle phase of a component
    State
);
