// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use entrolytics::SecretString;
use entrolytics_config::EntrolyticsConfigLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::{FormArgs, PropertyArg, VitalArgs};

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum LogFormat {
	Json,
	#[default]
	Compact,
	Pretty,
}

/// Entrolytics - send analytics events from scripts and CI pipelines
#[derive(Parser, Debug)]
#[command(name = "entrolytics", version, about, long_about = None)]
struct Args {
	/// Path to a TOML config file
	#[arg(short, long, global = true, env = "ENTROLYTICS_CONFIG")]
	config: Option<PathBuf>,

	/// Collector host, overrides config
	#[arg(long, global = true)]
	host: Option<String>,

	/// API key, overrides config
	#[arg(long, global = true, env = "ENTROLYTICS_API_KEY", hide_env_values = true)]
	api_key: Option<String>,

	/// Website ID, overrides config
	#[arg(short, long, global = true)]
	website_id: Option<String>,

	/// Log output format
	#[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
	log_format: LogFormat,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
	/// Send a custom event
	Track {
		/// Event name
		event: String,
		/// Event property (repeatable: -d KEY=VALUE, VALUE parsed as JSON when possible)
		#[arg(long = "data", short = 'd', value_name = "KEY=VALUE")]
		data: Vec<PropertyArg>,
		#[arg(long)]
		url: Option<String>,
		#[arg(long)]
		referrer: Option<String>,
		#[arg(long)]
		user_id: Option<String>,
		#[arg(long)]
		session_id: Option<String>,
	},
	/// Send a page view
	#[command(name = "pageview")]
	PageView {
		/// Page URL
		url: String,
		#[arg(long)]
		referrer: Option<String>,
		#[arg(long)]
		title: Option<String>,
		#[arg(long)]
		user_id: Option<String>,
		#[arg(long)]
		session_id: Option<String>,
	},
	/// Associate traits with a user
	Identify {
		user_id: String,
		/// User trait (repeatable: -t KEY=VALUE)
		#[arg(long = "trait", short = 't', value_name = "KEY=VALUE")]
		traits: Vec<PropertyArg>,
	},
	/// Report a Core Web Vitals measurement
	Vital(VitalArgs),
	/// Report a form interaction
	Form(FormArgs),
	/// Record a deployment marker
	Deploy {
		/// Deployment identifier
		deploy_id: String,
		#[arg(long, env = "GITHUB_SHA")]
		git_sha: Option<String>,
		#[arg(long, env = "GITHUB_REF_NAME")]
		git_branch: Option<String>,
		#[arg(long)]
		deploy_url: Option<String>,
		/// Deploy origin, e.g. github-actions
		#[arg(long)]
		source: Option<String>,
	},
}

fn init_tracing(format: LogFormat) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

	match format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().pretty().with_writer(std::io::stderr))
				.init();
		}
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();
	init_tracing(args.log_format);

	let config = entrolytics_config::load_config_with_overrides(
		args.config.as_deref(),
		overrides(&args),
	)
	.context("failed to load configuration")?;

	commands::run(args.command, &config).await
}

/// Command-line values, applied over file and environment configuration.
fn overrides(args: &Args) -> EntrolyticsConfigLayer {
	EntrolyticsConfigLayer {
		website_id: args.website_id.clone(),
		api_key: args
			.api_key
			.as_deref()
			.filter(|k| !k.is_empty())
			.map(SecretString::from),
		host: args.host.clone(),
		..Default::default()
	}
}
