//! Operation descriptors and execution hooks
//!
//! Operations are stored on the component as encoded descriptors. The
//! provisioning side selects a subset of them per execution category to form a
//! [`Hook`]; after a run, the descriptors that actually ran are written back as
//! the component's audit trail.

use serde::{Deserialize, Serialize};

use crate::pairs::Pairs;
use crate::traits::HookBuilder;

/// Category tag for continuous-integration triggers
pub const CI_HOOK: &str = "ci";

/// A stored operation descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operation_type")]
    pub op_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub properties: Pairs,
    #[serde(default)]
    pub status: String,
}

impl Operation {
    pub fn new(op_type: impl Into<String>) -> Self {
        Self {
            op_type: op_type.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_properties(mut self, properties: Pairs) -> Self {
        self.properties = properties;
        self
    }

    /// Property lookup, `""` when absent
    pub fn property(&self, key: &str) -> &str {
        self.properties.matching(key)
    }
}

/// An operation as executed by the upgrade engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RanOperation {
    /// Descriptor exactly as it was executed
    pub raw: Operation,
    /// Error text when the run failed
    pub error: Option<String>,
}

impl RanOperation {
    pub fn succeeded(raw: Operation) -> Self {
        Self { raw, error: None }
    }

    pub fn failed(raw: Operation, error: impl Into<String>) -> Self {
        Self {
            raw,
            error: Some(error.into()),
        }
    }

    /// Error text if this run failed
    pub fn failure(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Ordered operations selected for one execution category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    pub category: String,
    pub enabled: bool,
    pub operations: Vec<Operation>,
}

/// Selects operations whose type equals the category, in stored order
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryHookBuilder;

impl HookBuilder for CategoryHookBuilder {
    fn build_hook(&self, operations: &[Operation], category: &str) -> Hook {
        let selected: Vec<Operation> = operations
            .iter()
            .filter(|op| op.op_type == category)
            .cloned()
            .collect();

        Hook {
            category: category.to_string(),
            enabled: !selected.is_empty(),
            operations: selected,
        }
    }
}
