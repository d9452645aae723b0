// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use stk_hub_config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{HubError, Result};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.level` when it parses.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
	let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
	let registry = tracing_subscriber::registry().with(build_filter(env.as_deref(), &config.level));

	let result = if config.json {
		registry.with(tracing_subscriber::fmt::layer().json()).try_init()
	} else {
		registry.with(tracing_subscriber::fmt::layer()).try_init()
	};
	result.map_err(|e| HubError::Logging(e.to_string()))
}

fn build_filter(env_directives: Option<&str>, level: &str) -> EnvFilter {
	env_directives
		.and_then(|directives| EnvFilter::try_new(directives).ok())
		.unwrap_or_else(|| EnvFilter::new(level))
}
