//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The worker pool (spec §4.2): partitions a level's ready jobs into
//! thread-affine foreground work (run on the calling thread) and
//! background work (dispatched to a bounded pool of OS threads), and
//! guards against nested concurrent builds re-entering the pool.

mod worker_pool;
pub use worker_pool::*;
