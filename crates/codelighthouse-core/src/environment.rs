// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deployment environment of the collector the SDK talks to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Collector environment. Each variant maps to a base URL and a debug flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
	/// A collector running on the developer's machine.
	Local,
	/// The staging collector.
	#[serde(alias = "development")]
	Dev,
	/// The production collector.
	#[default]
	#[serde(alias = "production")]
	Prod,
}

impl Environment {
	/// Base URL of the collector, without the API version segment.
	pub fn base_url(self) -> &'static str {
		match self {
			Self::Local => "http://localhost:5000",
			Self::Dev => "https://dev.codelighthouse.io",
			Self::Prod => "https://codelighthouse.io",
		}
	}

	/// Whether verbose transport logging is enabled.
	pub fn debug(self) -> bool {
		matches!(self, Self::Local | Self::Dev)
	}
}

impl fmt::Display for Environment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Local => write!(f, "local"),
			Self::Dev => write!(f, "dev"),
			Self::Prod => write!(f, "prod"),
		}
	}
}

impl FromStr for Environment {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"local" => Ok(Self::Local),
			"dev" | "development" => Ok(Self::Dev),
			"prod" | "production" => Ok(Self::Prod),
			_ => Err(CoreError::InvalidEnvironment(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn base_urls_match_collectors() {
		assert_eq!(Environment::Local.base_url(), "http://localhost:5000");
		assert_eq!(Environment::Dev.base_url(), "https://dev.codelighthouse.io");
		assert_eq!(Environment::Prod.base_url(), "https://codelighthouse.io");
	}

	#[test]
	fn only_non_production_is_debug() {
		assert!(Environment::Local.debug());
		assert!(Environment::Dev.debug());
		assert!(!Environment::Prod.debug());
	}

	#[test]
	fn default_is_prod() {
		assert_eq!(Environment::default(), Environment::Prod);
	}

	#[test]
	fn parses_aliases_case_insensitively() {
		assert_eq!("DEV".parse::<Environment>().unwrap(), Environment::Dev);
		assert_eq!("development".parse::<Environment>().unwrap(), Environment::Dev);
		assert_eq!(" Production ".parse::<Environment>().unwrap(), Environment::Prod);
	}

	#[test]
	fn rejects_unknown_environment() {
		let err = "staging".parse::<Environment>().unwrap_err();
		assert!(matches!(err, CoreError::InvalidEnvironment(ref s) if s == "staging"));
	}

	#[test]
	fn deserializes_from_snake_case_and_alias() {
		let env: Environment = serde_json::from_str("\"local\"").unwrap();
		assert_eq!(env, Environment::Local);
		let env: Environment = serde_json::from_str("\"production\"").unwrap();
		assert_eq!(env, Environment::Prod);
	}

	proptest! {
		#[test]
		fn environment_roundtrip(env in prop_oneof![
			Just(Environment::Local),
			Just(Environment::Dev),
			Just(Environment::Prod),
		]) {
			let parsed: Environment = env.to_string().parse().unwrap();
			prop_assert_eq!(env, parsed);
		}
	}
}
