//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! A couple of trivial builders used to exercise the scheduler in tests
//! and as a worked example for anyone wiring up a real one. Neither
//! produces meaningful game assets; [`PassthroughBuilder`] just registers
//! its single input as its only output, and [`ComposeBuilder`] shows how
//! a builder requests sub-builds via [`crate::job::JobSpec`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::asset::Asset;
use crate::asset::AssetId;
use crate::asset::EngineType;
use crate::builder::BuildOutcome;
use crate::builder::Builder;
use crate::builder::BuilderFactory;
use crate::builder::BuilderOptions;
use crate::builder::BuilderTypeId;
use crate::graph::DependencyInfo;
use crate::job::JobSpec;

/// Copies a single input straight to its output directory, recording it
/// as both the job's sole input and its sole output.
#[derive(Debug, Default)]
pub struct PassthroughBuilder;

impl Builder for PassthroughBuilder {
    fn builder_type_id(&self) -> BuilderTypeId {
        BuilderTypeId::new("demo.passthrough")
    }

    fn asset_class(&self) -> &str {
        "demo.passthrough"
    }

    fn initialize(&self, _asset: &Asset, _options: &dyn BuilderOptions) -> Result<()> {
        Ok(())
    }

    fn build_string(&self, _asset: &Asset, _options: &dyn BuilderOptions) -> Result<String> {
        Ok("default".to_string())
    }

    fn register_inputs(&self, asset: &Asset, _options: &dyn BuilderOptions) -> Result<Vec<DependencyInfo>> {
        // `full_name` doubles as the source path for this toy builder;
        // a real builder would resolve it through the asset registry's
        // own source-tree layout instead.
        Ok(vec![DependencyInfo::file(PathBuf::from(asset.full_name()), 1)])
    }

    fn output_directory(&self, asset: &Asset) -> PathBuf {
        PathBuf::from(format!("output/{}", asset.id()))
    }

    fn build(&self, asset: &Asset, _options: &dyn BuilderOptions, output_dir: &PathBuf) -> Result<BuildOutcome> {
        let file_name = std::path::Path::new(asset.full_name())
            .file_name()
            .map(|n| n.to_owned())
            .unwrap_or_else(|| std::ffi::OsString::from(asset.full_name()));
        let output_path = output_dir.join(file_name);
        Ok(BuildOutcome {
            outputs: vec![DependencyInfo::file(output_path, 1)],
            success: true,
        })
    }
}

pub fn passthrough_builder() -> Arc<dyn Builder> {
    Arc::new(PassthroughBuilder)
}

pub struct PassthroughBuilderFactory;

impl BuilderFactory for PassthroughBuilderFactory {
    fn engine_type(&self) -> EngineType {
        EngineType::new("demo.passthrough")
    }

    fn builder_type_id(&self) -> BuilderTypeId {
        BuilderTypeId::new("demo.passthrough")
    }

    fn create(&self) -> Arc<dyn Builder> {
        passthrough_builder()
    }
}

/// Requests a build of a fixed set of sub-assets before running, showing
/// the shape of [`Builder::gather_jobs`] without any real asset content
/// behind it.
#[derive(Debug)]
pub struct ComposeBuilder {
    pub sub_assets: Vec<AssetId>,
}

impl Builder for ComposeBuilder {
    fn builder_type_id(&self) -> BuilderTypeId {
        BuilderTypeId::new("demo.compose")
    }

    fn asset_class(&self) -> &str {
        "demo.compose"
    }

    fn initialize(&self, _asset: &Asset, _options: &dyn BuilderOptions) -> Result<()> {
        Ok(())
    }

    fn build_string(&self, _asset: &Asset, _options: &dyn BuilderOptions) -> Result<String> {
        Ok("default".to_string())
    }

    fn register_inputs(&self, _asset: &Asset, _options: &dyn BuilderOptions) -> Result<Vec<DependencyInfo>> {
        Ok(Vec::new())
    }

    fn gather_jobs(&self, _asset: &Asset, _options: &dyn BuilderOptions) -> Result<Vec<JobSpec>> {
        Ok(self.sub_assets.iter().map(|id| JobSpec::required(*id)).collect())
    }

    fn output_directory(&self, asset: &Asset) -> PathBuf {
        PathBuf::from(format!("output/{}", asset.id()))
    }

    fn build(&self, _asset: &Asset, _options: &dyn BuilderOptions, _output_dir: &PathBuf) -> Result<BuildOutcome> {
        Ok(BuildOutcome {
            outputs: Vec::new(),
            success: true,
        })
    }
}

pub struct ComposeBuilderFactory {
    pub sub_assets: Vec<AssetId>,
}

impl BuilderFactory for ComposeBuilderFactory {
    fn engine_type(&self) -> EngineType {
        EngineType::new("demo.compose")
    }

    fn builder_type_id(&self) -> BuilderTypeId {
        BuilderTypeId::new("demo.compose")
    }

    fn create(&self) -> Arc<dyn Builder> {
        Arc::new(ComposeBuilder {
            sub_assets: self.sub_assets.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_builder_gathers_one_job_per_sub_asset() {
        let builder = ComposeBuilder {
            sub_assets: vec![AssetId::new(1), AssetId::new(2)],
        };
        let asset = Asset::new(AssetId::new(99), EngineType::new("demo.compose"), "root".into());
        let options = crate::builder::DefaultBuilderOptions;
        let jobs = builder.gather_jobs(&asset, &options).unwrap();
        assert_eq!(jobs.len(), 2);
    }
}
