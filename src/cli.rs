//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;

/// Content-addressed, cached, parallel build scheduler for game asset
/// pipelines.
#[derive(Parser, Debug)]
#[command(name = "assetforge", author, version, about)]
pub struct Cli {
    /// Path to the configuration file (defaults to ./assetforge.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured/auto-detected background thread count.
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Give up this many worker threads to leave headroom on the
    /// machine (spec §6).
    #[arg(long, global = true)]
    pub nice: Option<usize>,

    /// Force every job onto the caller thread, equivalent to setting
    /// `ASSET_BUILDER_SINGLE_THREAD=1`.
    #[arg(long, global = true)]
    pub single_thread: bool,

    /// Promote every optional job failure to a fatal abort.
    #[arg(long, global = true)]
    pub halt_on_error: bool,

    /// Increase log verbosity; repeat for more (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build one asset (and its transitive dependencies).
    Build {
        /// Numeric id of the asset to build.
        asset_id: u64,

        /// The asset's registry-supplied name, used by the demo
        /// builders as a literal source path. Real deployments resolve
        /// this from an external asset registry instead (spec §6).
        #[arg(long)]
        full_name: String,

        /// Which builder family handles this asset.
        #[arg(long, default_value = "demo.passthrough")]
        engine_type: String,
    },

    /// Print a shell completion script to stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
