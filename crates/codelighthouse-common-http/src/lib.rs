// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for CodeLighthouse.
//!
//! This crate provides:
//! - A pre-configured HTTP client with the collector's expected User-Agent
//! - The default header set every collector request carries

mod client;
mod headers;

pub use client::{builder, new_client, USER_AGENT};
pub use headers::{collector_headers, API_KEY_HEADER, ORGANIZATION_HEADER};
