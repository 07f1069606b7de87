//! Provisioning view of a component
//!
//! The provisioning engine does not work on [`Component`] directly; it gets a
//! [`ProvisionBox`], a flattened read-only view with a few derived fields
//! (domain, provider, public address, one-click flag) and, when the component
//! has a repository, the CI hook built from its stored operations.
//!
//! Building a box is pure: missing inputs degrade to empty values and nothing
//! is written anywhere.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::operation::{CI_HOOK, CategoryHookBuilder, Hook, Operation};
use crate::record::Component;
use crate::status::State;
use crate::traits::HookBuilder;

/// Input key holding the component's domain
pub const DOMAIN: &str = "domain";
/// Input key holding the infrastructure provider
pub const PROVIDER: &str = "provider";
/// Output key holding the public IPv4 address
pub const PUBLICIPV4: &str = "publicipv4";
/// Output key holding the private IPv4 address
pub const PRIVATEIPV4: &str = "privateipv4";
/// Env key that marks a one-click deployment
pub const ONECLICK: &str = "oneclick";

/// How much of a component the box describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxLevel {
    /// A single component of a larger assembly
    Some,
    /// The whole assembly
    All,
}

/// Environment variable handed to the provisioner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// Repository section of a box
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoView {
    #[serde(rename = "type")]
    pub rtype: String,
    pub source: String,
    pub one_click: bool,
    pub url: String,
    pub hook: Hook,
}

/// Flattened component view consumed by the provisioning engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionBox {
    pub id: String,
    pub level: BoxLevel,
    pub name: String,
    pub domain_name: String,
    pub inputs: BTreeMap<String, String>,
    pub envs: Vec<EnvVar>,
    pub tosca: String,
    pub operations: Vec<Operation>,
    /// Filled in by the caller once a build commit is known
    pub commit: String,
    pub provider: String,
    pub public_ip: String,
    pub state: State,
    pub repo: Option<RepoView>,
}

impl Component {
    pub fn domain(&self) -> &str {
        self.inputs.matching(DOMAIN)
    }

    pub fn provider(&self) -> &str {
        self.inputs.matching(PROVIDER)
    }

    pub fn public_ip(&self) -> &str {
        self.outputs.matching(PUBLICIPV4)
    }

    pub fn private_ip(&self) -> &str {
        self.outputs.matching(PRIVATEIPV4)
    }

    /// True when the `oneclick` env value is non-blank
    pub fn with_one_click(&self) -> bool {
        !self.envs.matching(ONECLICK).trim().is_empty()
    }

    pub fn inputs_map(&self) -> BTreeMap<String, String> {
        self.inputs.to_map()
    }

    /// All env pairs, in stored order
    pub fn env_vars(&self) -> Vec<EnvVar> {
        self.envs
            .iter()
            .map(|p| EnvVar {
                name: p.key.clone(),
                value: p.value.clone(),
            })
            .collect()
    }

    /// Build the provisioning view using `hooks` for the CI hook
    pub fn mk_box_with(&self, hooks: &dyn HookBuilder) -> ProvisionBox {
        let repo = self.repo.as_ref().map(|repo| RepoView {
            rtype: repo.rtype.clone(),
            source: repo.source.clone(),
            one_click: self.with_one_click(),
            url: repo.rurl.clone(),
            hook: hooks.build_hook(&self.operations, CI_HOOK),
        });

        ProvisionBox {
            id: self.id.clone(),
            level: BoxLevel::Some,
            name: self.name.clone(),
            domain_name: self.domain().to_string(),
            inputs: self.inputs_map(),
            envs: self.env_vars(),
            tosca: self.tosca.clone(),
            operations: self.operations.clone(),
            commit: String::new(),
            provider: self.provider().to_string(),
            public_ip: self.public_ip().to_string(),
            state: self.state.clone(),
            repo,
        }
    }

    /// Build the provisioning view with the default hook builder
    pub fn mk_box(&self) -> ProvisionBox {
        self.mk_box_with(&CategoryHookBuilder)
    }
}
