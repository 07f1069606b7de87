//! Persisted and decoded component records
//!
//! A [`ComponentRow`] is what the table store holds: composite columns are
//! lists of encoded strings (or a single encoded string). A [`Component`] is
//! the decoded form used by the rest of the system.
//!
//! ```text
//! ComponentRow ──dig()──▶ (Component, DecodeReport)
//!      ▲                         │
//!      └──────to_row()───────────┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{self, DecodeReport};
use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::pairs::Pairs;
use crate::status::{State, Status};
use crate::traits::Row;

/// Table holding component rows
pub const COMPONENTS_TABLE: &str = "components";

/// Column names written by the lifecycle layer
pub mod columns {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const TOSCA_TYPE: &str = "tosca_type";
    pub const RELATED_COMPONENTS: &str = "related_components";
    pub const CREATED_AT: &str = "created_at";
    pub const INPUTS: &str = "inputs";
    pub const OUTPUTS: &str = "outputs";
    pub const ENVS: &str = "envs";
    pub const REPO: &str = "repo";
    pub const ARTIFACTS: &str = "artifacts";
    pub const OPERATIONS: &str = "operations";
    pub const STATUS: &str = "status";
    pub const STATE: &str = "state";
}

/// Storage-native component row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentRow {
    pub id: String,
    pub name: String,
    pub tosca_type: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub envs: Vec<String>,
    pub repo: String,
    pub artifacts: String,
    pub related_components: Vec<String>,
    pub operations: Vec<String>,
    pub status: String,
    pub state: String,
    pub created_at: String,
}

/// Source repository a component is built from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    #[serde(default)]
    pub rtype: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub oneclick: String,
    #[serde(rename = "url", default)]
    pub rurl: String,
}

impl Repo {
    /// True when every field is empty or whitespace
    pub fn is_blank(&self) -> bool {
        [&self.rtype, &self.source, &self.oneclick, &self.rurl]
            .iter()
            .all(|f| f.trim().is_empty())
    }
}

/// Deployable artifacts attached to a component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    #[serde(default)]
    pub artifact_type: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub requirements: Pairs,
}

/// Decoded component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub name: String,
    #[serde(rename = "tosca_type")]
    pub tosca: String,
    pub inputs: Pairs,
    pub outputs: Pairs,
    pub envs: Pairs,
    pub repo: Option<Repo>,
    pub artifacts: Option<Artifacts>,
    pub related_components: Vec<String>,
    pub operations: Vec<Operation>,
    pub status: Status,
    pub state: State,
    pub created_at: String,
}

impl ComponentRow {
    /// Build a row from a raw store row
    ///
    /// Never fails. A missing or `null` column reads as its empty value.
    /// A column of the wrong JSON type, or a non-string element inside a
    /// list column, is dropped and recorded in `report`. List indices refer
    /// to the stored position.
    pub fn from_row(row: &Row, report: &mut DecodeReport) -> Self {
        Self {
            id: text_column(row, columns::ID, report),
            name: text_column(row, columns::NAME, report),
            tosca_type: text_column(row, columns::TOSCA_TYPE, report),
            inputs: list_column(row, columns::INPUTS, report),
            outputs: list_column(row, columns::OUTPUTS, report),
            envs: list_column(row, columns::ENVS, report),
            repo: text_column(row, columns::REPO, report),
            artifacts: text_column(row, columns::ARTIFACTS, report),
            related_components: list_column(row, columns::RELATED_COMPONENTS, report),
            operations: list_column(row, columns::OPERATIONS, report),
            status: text_column(row, columns::STATUS, report),
            state: text_column(row, columns::STATE, report),
            created_at: text_column(row, columns::CREATED_AT, report),
        }
    }

    /// Convert into a raw store row
    pub fn into_row(self) -> Result<Row> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(Error::store(format!(
                "Component row serialized to non-object: {}",
                other
            ))),
        }
    }

    /// Decode every composite column
    ///
    /// Never fails. Elements that do not match their target shape are
    /// dropped and listed in the returned report.
    pub fn dig(&self) -> (Component, DecodeReport) {
        let mut report = DecodeReport::new();

        let repo = codec::decode_optional::<Repo>(columns::REPO, &self.repo, &mut report)
            .filter(|r| !r.is_blank());

        let component = Component {
            id: self.id.clone(),
            name: self.name.clone(),
            tosca: self.tosca_type.clone(),
            inputs: Pairs::decode(columns::INPUTS, &self.inputs, &mut report),
            outputs: Pairs::decode(columns::OUTPUTS, &self.outputs, &mut report),
            envs: Pairs::decode(columns::ENVS, &self.envs, &mut report),
            repo,
            artifacts: codec::decode_optional(columns::ARTIFACTS, &self.artifacts, &mut report),
            related_components: self.related_components.clone(),
            operations: codec::decode_each(columns::OPERATIONS, &self.operations, &mut report),
            status: Status::new(self.status.clone()),
            state: State::new(self.state.clone()),
            created_at: self.created_at.clone(),
        };

        (component, report)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn text_column(row: &Row, name: &str, report: &mut DecodeReport) -> String {
    match row.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            report.push(name, None, format!("expected a string, got {}", json_type(other)));
            String::new()
        }
    }
}

fn list_column(row: &Row, name: &str, report: &mut DecodeReport) -> Vec<String> {
    match row.get(name) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match item {
                Value::String(s) => Some(s.clone()),
                other => {
                    let reason = format!("expected a string, got {}", json_type(other));
                    report.push(name, Some(i), reason);
                    None
                }
            })
            .collect(),
        Some(other) => {
            report.push(name, None, format!("expected a list, got {}", json_type(other)));
            Vec::new()
        }
    }
}

impl Component {
    /// Encode back into the storage-native shape
    pub fn to_row(&self) -> Result<ComponentRow> {
        Ok(ComponentRow {
            id: self.id.clone(),
            name: self.name.clone(),
            tosca_type: self.tosca.clone(),
            inputs: self.inputs.to_encoded()?,
            outputs: self.outputs.to_encoded()?,
            envs: self.envs.to_encoded()?,
            repo: match &self.repo {
                Some(repo) => codec::encode(repo)?,
                None => String::new(),
            },
            artifacts: match &self.artifacts {
                Some(artifacts) => codec::encode(artifacts)?,
                None => String::new(),
            },
            related_components: self.related_components.clone(),
            operations: codec::encode_each(&self.operations)?,
            status: self.status.to_string(),
            state: self.state.to_string(),
            created_at: self.created_at.clone(),
        })
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string_pretty(self) {
            Ok(s) => f.write_str(&s),
            Err(e) => write!(f, "<component {}: {}>", self.id, e),
        }
    }
}
