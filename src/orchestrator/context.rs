//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::asset::AssetId;

thread_local! {
    /// Per-thread recursion stack (originally `g_BuildStack`): every asset
    /// currently being built on this thread, used both to compute the
    /// current depth (for `RequiredOnlyInTopLevelBuild` promotion, spec
    /// §3) and to detect a cycle before it becomes infinite recursion.
    static BUILD_STACK: RefCell<Vec<AssetId>> = RefCell::new(Vec::new());
}

/// RAII guard pushing `asset_id` onto the current thread's build stack
/// for the lifetime of one recursive build call.
pub struct StackGuard;

impl StackGuard {
    pub fn push(asset_id: AssetId) -> Result<Self, AssetId> {
        let cycle = BUILD_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&asset_id) {
                Some(asset_id)
            } else {
                stack.push(asset_id);
                None
            }
        });

        match cycle {
            Some(id) => Err(id),
            None => Ok(StackGuard),
        }
    }

    pub fn depth() -> u32 {
        BUILD_STACK.with(|stack| stack.borrow().len() as u32)
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        BUILD_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Build-wide state shared across every recursion level and every worker
/// thread for the duration of one top-level build (spec §4.1).
#[derive(Default)]
pub struct BuildContext {
    /// Assets whose build failed with `Required` set, originally
    /// `g_FailedAssets`. Once an asset is in here, any job depending on
    /// it (required or not) is short-circuited to `Failure` without
    /// re-invoking its builder.
    failed_assets: Mutex<HashSet<AssetId>>,

    /// Stop launching new jobs once any required job has failed, rather
    /// than continuing to build everything that's still independently
    /// reachable (spec §4.1).
    pub halt_on_error: bool,
}

impl BuildContext {
    pub fn new(halt_on_error: bool) -> Self {
        BuildContext {
            failed_assets: Mutex::new(HashSet::new()),
            halt_on_error,
        }
    }

    pub fn mark_failed(&self, asset_id: AssetId) {
        self.failed_assets.lock().expect("failed-assets lock poisoned").insert(asset_id);
    }

    pub fn has_failed(&self, asset_id: AssetId) -> bool {
        self.failed_assets.lock().expect("failed-assets lock poisoned").contains(&asset_id)
    }

    pub fn any_failed(&self) -> bool {
        !self.failed_assets.lock().expect("failed-assets lock poisoned").is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushing_the_same_asset_twice_detects_a_cycle() {
        let _outer = StackGuard::push(AssetId::new(1)).unwrap();
        let inner = StackGuard::push(AssetId::new(1));
        assert!(inner.is_err());
    }

    #[test]
    fn depth_tracks_nesting() {
        assert_eq!(StackGuard::depth(), 0);
        let _a = StackGuard::push(AssetId::new(1)).unwrap();
        assert_eq!(StackGuard::depth(), 1);
        let _b = StackGuard::push(AssetId::new(2)).unwrap();
        assert_eq!(StackGuard::depth(), 2);
    }
}
