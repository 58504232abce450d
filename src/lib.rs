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

pub mod asset;
pub mod builder;
pub mod cache;
pub mod config;
pub mod consts;
pub mod graph;
pub mod job;
pub mod log;
pub mod orchestrator;
pub mod pool;
pub mod telemetry;
pub mod util;
