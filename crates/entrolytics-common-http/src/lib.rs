// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for the Entrolytics SDK.
//!
//! This crate provides:
//! - A pre-configured HTTP client builder with the SDK User-Agent header
//! - The default bearer/JSON header set every collector request carries

mod client;

pub use client::{builder, default_headers, user_agent, SDK_NAME, SDK_VERSION};
