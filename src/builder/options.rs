//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::any::Any;
use std::fmt::Debug;

/// A polymorphic, builder-specific configuration bag.
///
/// When a job is created without options, the orchestrator installs
/// [`DefaultBuilderOptions`] in its place (spec §4.1, Phase A).
pub trait BuilderOptions: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// The options installed when a job is created without any.
#[derive(Debug, Default, Clone)]
pub struct DefaultBuilderOptions;

impl BuilderOptions for DefaultBuilderOptions {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Downcast a type-erased options bag back to its concrete type, the way a
/// builder implementation typically does at the top of `initialize`.
pub fn downcast_options<T: BuilderOptions + 'static>(
    options: &dyn BuilderOptions,
) -> Option<&T> {
    options.as_any().downcast_ref::<T>()
}
