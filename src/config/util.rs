//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use config::Config;
use config::Environment;
use config::File;
use config::FileFormat;

use crate::config::NotValidatedConfiguration;

/// Load configuration the way the CLI does: a TOML file, overridden by
/// `ASSETFORGE_*` environment variables (e.g. `ASSETFORGE_THREAD_COUNT`).
/// The file itself is optional — a fresh checkout with no config file at
/// all still gets sane defaults via [`NotValidatedConfiguration::validate`].
pub fn load_config(path: &Path) -> Result<NotValidatedConfiguration> {
    let mut builder = Config::builder();
    if path.exists() {
        builder = builder.add_source(File::new(&path.to_string_lossy(), FileFormat::Toml));
    }
    builder = builder.add_source(Environment::with_prefix("ASSETFORGE").separator("_"));

    let config = builder.build().with_context(|| format!("Loading configuration from {}", path.display()))?;
    config
        .try_deserialize()
        .context("Deserializing configuration")
}
