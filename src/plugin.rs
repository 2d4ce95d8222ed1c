// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Registration of post-build actions with a pipeline host.
//!
//! A host discovers actions through [`registry`], shows their display names,
//! and validates form fields with [`PostBuildAction::check_field`] before a
//! configuration is accepted. The registry is immutable.
//!
//! # Example
//!
//! ```rust
//! use rollout_canceller::plugin::{lookup, ConfigField, FieldValidation};
//!
//! let action = lookup("openshift-deploy-canceller").unwrap();
//! assert_eq!(action.display_name(), "Cancel OpenShift Deployment");
//! assert!(matches!(
//!     action.check_field(ConfigField::Namespace, ""),
//!     FieldValidation::Error(_)
//! ));
//! ```

use crate::config::CancellerConfig;
use crate::constants::{ACTION_NAME, DISPLAY_NAME};
use std::fmt;

/// Outcome of validating a single form field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValidation {
    Ok,
    /// The value is usable but probably not what was intended
    Warning(String),
    /// The value cannot be used
    Error(String),
}

impl FieldValidation {
    /// Whether the value must be rejected
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Configuration fields a host may ask an action to validate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigField {
    ApiUrl,
    DepCfg,
    Namespace,
}

impl ConfigField {
    /// Form field name as used by the host
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApiUrl => "apiURL",
            Self::DepCfg => "depCfg",
            Self::Namespace => "namespace",
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline step a host can register and configure.
pub trait PostBuildAction: Sync {
    /// Stable registry name
    fn name(&self) -> &'static str;

    /// Human readable name shown by the host
    fn display_name(&self) -> &'static str;

    /// Whether the action can be attached to a project of the given kind
    fn is_applicable(&self, _project_kind: &str) -> bool {
        true
    }

    /// Validate one form field value.
    fn check_field(&self, field: ConfigField, value: &str) -> FieldValidation;

    /// Validate every field of a configuration, skipping fields that pass.
    fn validate(&self, config: &CancellerConfig) -> Vec<(ConfigField, FieldValidation)> {
        [
            (ConfigField::ApiUrl, config.api_url.as_str()),
            (ConfigField::DepCfg, config.dep_cfg.as_str()),
            (ConfigField::Namespace, config.namespace.as_str()),
        ]
        .into_iter()
        .map(|(field, value)| (field, self.check_field(field, value)))
        .filter(|(_, result)| *result != FieldValidation::Ok)
        .collect()
    }
}

/// The "Cancel OpenShift Deployment" action.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeployCanceller;

impl PostBuildAction for DeployCanceller {
    fn name(&self) -> &'static str {
        ACTION_NAME
    }

    fn display_name(&self) -> &'static str {
        DISPLAY_NAME
    }

    fn check_field(&self, field: ConfigField, value: &str) -> FieldValidation {
        let value = value.trim();
        match field {
            ConfigField::ApiUrl => check_api_url(value),
            ConfigField::DepCfg if value.is_empty() => {
                FieldValidation::Error("Please set depCfg".to_string())
            }
            ConfigField::Namespace if value.is_empty() => {
                FieldValidation::Error("Please set namespace".to_string())
            }
            ConfigField::DepCfg | ConfigField::Namespace => FieldValidation::Ok,
        }
    }
}

fn check_api_url(value: &str) -> FieldValidation {
    if value.is_empty() {
        return FieldValidation::Warning(
            "apiURL is not set; the oc CLI session will be used".to_string(),
        );
    }
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => FieldValidation::Ok,
        Ok(url) => FieldValidation::Error(format!(
            "apiURL must use http or https, not '{}'",
            url.scheme()
        )),
        Err(e) => FieldValidation::Error(format!("apiURL is not a valid URL: {e}")),
    }
}

static REGISTRY: &[&dyn PostBuildAction] = &[&DeployCanceller];

/// Every registered post-build action
#[must_use]
pub fn registry() -> &'static [&'static dyn PostBuildAction] {
    REGISTRY
}

/// Find a registered action by its registry name
#[must_use]
pub fn lookup(name: &str) -> Option<&'static dyn PostBuildAction> {
    REGISTRY.iter().copied().find(|action| action.name() == name)
}
