//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

#![deny(
    anonymous_parameters,
    deprecated_in_future,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    non_ascii_idents,
    unsafe_code,
    path_statements,
    trivial_numeric_casts,
    unstable_features,
    unused_extern_crates,
    unused_allocation,
    unused_import_braces,
    unused_must_use,
    while_true,
)]

mod cli;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::generate;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use assetforge::asset::Asset;
use assetforge::asset::AssetId;
use assetforge::asset::EngineType;
use assetforge::asset::InMemoryAssetRegistry;
use assetforge::builder::demo::PassthroughBuilderFactory;
use assetforge::builder::BuilderRegistry;
use assetforge::cache::FilesystemContentCache;
use assetforge::config::load_config;
use assetforge::graph::FileDependencyGraph;
use assetforge::log::ConsoleSink;
use assetforge::log::FileSink;
use assetforge::log::LogSink;
use assetforge::orchestrator::Orchestrator;
use assetforge::pool::WorkerPool;
use assetforge::telemetry::TelemetrySink;

use crate::cli::Cli;
use crate::cli::Command;

fn main() -> Result<()> {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(?cli, "Parsed CLI arguments");

    match cli.command {
        Command::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            generate(shell, &mut command, name, &mut io::stdout());
            Ok(())
        }
        Command::Build {
            asset_id,
            full_name,
            engine_type,
        } => run_build(
            &cli.config,
            cli.threads,
            cli.nice,
            cli.single_thread,
            cli.halt_on_error,
            asset_id,
            full_name,
            engine_type,
        ),
    }
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "assetforge=info",
        1 => "assetforge=debug",
        _ => "assetforge=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[allow(clippy::too_many_arguments)]
fn run_build(
    config_path: &Option<PathBuf>,
    threads_override: Option<usize>,
    nice_override: Option<usize>,
    single_thread: bool,
    halt_on_error: bool,
    asset_id: u64,
    full_name: String,
    engine_type: String,
) -> Result<()> {
    let config_path = config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("assetforge.toml"));
    let config = load_config(&config_path)?.validate()?;

    let mut registry = InMemoryAssetRegistry::new();
    registry.insert(Asset::new(AssetId::new(asset_id), EngineType::new(engine_type), full_name));

    let mut builders = BuilderRegistry::new();
    builders.register(Arc::new(PassthroughBuilderFactory));

    let dependency_graph = Arc::new(FileDependencyGraph::open(config.graph_store_path())?);
    let content_cache: Arc<dyn assetforge::cache::ContentCache> = Arc::new(FilesystemContentCache::new(config.cache_dir()));

    let log_sinks: Vec<Arc<dyn LogSink>> = vec![Arc::new(ConsoleSink), Arc::new(FileSink::new(config.log_dir()))];

    let thread_count = threads_override.unwrap_or(*config.thread_count());
    let nice_count = nice_override.unwrap_or(*config.nice_count());
    let halt_on_error = halt_on_error || *config.halt_on_error();
    let orchestrator = Orchestrator::new(
        Arc::new(registry),
        Arc::new(builders),
        dependency_graph,
        content_cache,
        WorkerPool::resolve(thread_count, nice_count, single_thread),
        log_sinks,
        Arc::new(TelemetrySink::new()),
    );

    let result = orchestrator.build(AssetId::new(asset_id), halt_on_error)?;
    println!("{result}");

    if result.is_failure() {
        std::process::exit(1);
    }
    Ok(())
}
