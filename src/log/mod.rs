//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Per-job build output capture, supplementing `tracing`'s process-wide
//! logging with the per-job trace/warning/error files the original
//! implementation's `Console::Bullet` kept (spec §9).

mod item;
pub use item::*;

mod sink;
pub use sink::*;

mod console;
pub use console::*;

mod filesink;
pub use filesink::*;
