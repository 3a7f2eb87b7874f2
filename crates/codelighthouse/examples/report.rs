// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: Report an error to CodeLighthouse.
//!
//! Run with:
//!   cargo run --example report -p codelighthouse

use codelighthouse::{Environment, RaisedError, ReporterConfig};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env().add_directive("codelighthouse=debug".parse()?))
		.init();

	let organization = std::env::var("CODELIGHTHOUSE_ORGANIZATION")
		.map_err(|_| "CODELIGHTHOUSE_ORGANIZATION environment variable required")?;
	let api_key = std::env::var("CODELIGHTHOUSE_API_KEY")
		.map_err(|_| "CODELIGHTHOUSE_API_KEY environment variable required")?;
	let environment: Environment = std::env::var("CODELIGHTHOUSE_ENVIRONMENT")
		.unwrap_or_else(|_| "dev".to_string())
		.parse()?;

	println!("Initializing reporter...");
	println!("  Organization: {}", organization);
	println!("  Collector: {}", environment.base_url());

	codelighthouse::init(
		organization,
		api_key,
		"example@example.com",
		ReporterConfig::default()
			.environment(environment)
			.resource_group("examples")
			.resource_name("report"),
	)?;

	let error = RaisedError::new(
		"TypeError",
		"Cannot read properties of undefined (reading 'id')",
		codelighthouse::capture_stack(),
	);

	println!("Reporting error...");
	let outcome = codelighthouse::report_error(&error, None, Some(json!({ "example": true })))?
		.outcome()
		.await;
	println!("Outcome: {:?}", outcome);

	let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
	let outcome = codelighthouse::global().report(&io_error)?.outcome().await;
	println!("Outcome: {:?}", outcome);

	codelighthouse::global().shutdown();
	Ok(())
}
