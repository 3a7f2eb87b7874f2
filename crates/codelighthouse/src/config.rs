// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reporter configuration.

use codelighthouse_core::{CoreError, Environment, ResourceIdentity};
use serde::Deserialize;

use crate::error::Result;

/// Options accepted by [`crate::Reporter::initialize`].
///
/// Deserialization rejects unknown keys, so a misspelled option fails
/// loudly instead of being ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReporterConfig {
	/// Collector environment. Defaults to `prod`.
	pub environment: Environment,
	pub resource_group: Option<String>,
	pub resource_name: Option<String>,
	pub github_repo: Option<String>,
	/// Install the panic hook and the unhandled task failure handler.
	pub enable_global_handler: bool,
}

impl Default for ReporterConfig {
	fn default() -> Self {
		Self {
			environment: Environment::Prod,
			resource_group: None,
			resource_name: None,
			github_repo: None,
			enable_global_handler: true,
		}
	}
}

impl ReporterConfig {
	/// Parses a configuration object, e.g. `{"environment": "dev"}`.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json).map_err(CoreError::from)?)
	}

	/// Converts an already-parsed configuration object.
	pub fn from_value(value: serde_json::Value) -> Result<Self> {
		Ok(serde_json::from_value(value).map_err(CoreError::from)?)
	}

	/// Sets the collector environment.
	pub fn environment(mut self, environment: Environment) -> Self {
		self.environment = environment;
		self
	}

	/// Sets the logical group of the reporting resource.
	pub fn resource_group(mut self, group: impl Into<String>) -> Self {
		self.resource_group = Some(group.into());
		self
	}

	/// Sets the name of the reporting resource.
	pub fn resource_name(mut self, name: impl Into<String>) -> Self {
		self.resource_name = Some(name.into());
		self
	}

	/// Sets the source repository, e.g. `acme/payments`.
	pub fn github_repo(mut self, repo: impl Into<String>) -> Self {
		self.github_repo = Some(repo.into());
		self
	}

	/// Enables or disables the global failure handlers.
	pub fn enable_global_handler(mut self, enabled: bool) -> Self {
		self.enable_global_handler = enabled;
		self
	}

	pub(crate) fn identity(&self) -> ResourceIdentity {
		ResourceIdentity {
			resource_group: self.resource_group.clone(),
			resource_name: self.resource_name.clone(),
			github_repo: self.github_repo.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::LighthouseError;
	use serde_json::json;

	#[test]
	fn defaults() {
		let config = ReporterConfig::default();
		assert_eq!(config.environment, Environment::Prod);
		assert!(config.enable_global_handler);
		assert_eq!(config.identity(), ResourceIdentity::default());
	}

	#[test]
	fn builder_setters() {
		let config = ReporterConfig::default()
			.environment(Environment::Local)
			.resource_group("payments")
			.resource_name("worker-1")
			.github_repo("acme/payments")
			.enable_global_handler(false);

		assert_eq!(config.environment, Environment::Local);
		assert!(!config.enable_global_handler);
		assert_eq!(config.identity().resource_group.as_deref(), Some("payments"));
		assert_eq!(config.identity().resource_name.as_deref(), Some("worker-1"));
		assert_eq!(config.identity().github_repo.as_deref(), Some("acme/payments"));
	}

	#[test]
	fn from_json_fills_defaults() {
		let config = ReporterConfig::from_json(r#"{"environment": "dev"}"#).unwrap();
		assert_eq!(config.environment, Environment::Dev);
		assert!(config.enable_global_handler);
		assert_eq!(config.resource_name, None);
	}

	#[test]
	fn from_value_reads_all_keys() {
		let config = ReporterConfig::from_value(json!({
			"environment": "local",
			"resource_group": "g",
			"resource_name": "n",
			"github_repo": "r",
			"enable_global_handler": false,
		}))
		.unwrap();
		assert_eq!(config.environment, Environment::Local);
		assert_eq!(config.github_repo.as_deref(), Some("r"));
		assert!(!config.enable_global_handler);
	}

	#[test]
	fn rejects_unknown_keys() {
		let result = ReporterConfig::from_json(r#"{"enviroment": "dev"}"#);
		assert!(matches!(result, Err(LighthouseError::Core(CoreError::Serialization(_)))));
	}

	#[test]
	fn rejects_unknown_environment() {
		let result = ReporterConfig::from_value(json!({"environment": "staging"}));
		assert!(result.is_err());
	}
}
