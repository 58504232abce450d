//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The recursive, multi-phase build orchestrator (spec §4.1): the piece
//! that turns a requested top-level asset into a fully resolved tree of
//! [`crate::job::BuildJob`]s, driving each through dependency discovery,
//! staleness checks, execution, and required/optional failure
//! propagation.

mod context;
pub use context::*;

mod orchestrator;
pub use orchestrator::*;
