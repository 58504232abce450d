//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::fmt;
use std::ops::BitOr;

/// A set of [`JobFlags`] bits.
///
/// Kept as a hand-rolled bitset (rather than pulling in `bitflags`) since
/// the only operations the scheduler ever performs are "contains",
/// "insert", "remove", and "mask to a single flag" (spec §9's open question
/// about the `RequiredOnlyInTopLevelBuild` promotion hinges on exactly this
/// distinction between "mask" and "set").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct JobFlags(u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobFlag {
    /// Failure of this job must fail the enclosing build.
    Required = 0b01,
    /// Promoted to `Required` iff the current recursion depth is 1;
    /// otherwise the flag is stripped (spec §3).
    RequiredOnlyInTopLevelBuild = 0b10,
}

impl JobFlags {
    pub const NONE: JobFlags = JobFlags(0);
    pub const REQUIRED: JobFlags = JobFlags(JobFlag::Required as u8);
    pub const REQUIRED_ONLY_IN_TOP_LEVEL_BUILD: JobFlags =
        JobFlags(JobFlag::RequiredOnlyInTopLevelBuild as u8);

    pub fn empty() -> Self {
        JobFlags(0)
    }

    pub fn contains(&self, flag: JobFlags) -> bool {
        (self.0 & flag.0) == flag.0 && flag.0 != 0
    }

    pub fn insert(&mut self, flag: JobFlags) {
        self.0 |= flag.0;
    }

    pub fn remove(&mut self, flag: JobFlags) {
        self.0 &= !flag.0;
    }

    /// Keep only the bits also present in `other` — the merge operator
    /// for two requesters of the same fingerprint (spec §8's flag
    /// monotonicity: a job's flags may only lose `Required` over time,
    /// never gain it back from a later, weaker request).
    pub fn intersect(&mut self, other: JobFlags) {
        self.0 &= other.0;
    }

    /// Mask the set down to exactly `flag` (clearing every other bit).
    ///
    /// This is the literal behavior of the original implementation's
    /// `Flags &= JobFlags::Required` when promoting
    /// `RequiredOnlyInTopLevelBuild`, which the design notes (spec §9) flag
    /// as probably-a-bug (`|=` was almost certainly intended) but require
    /// *not* be silently "fixed". See [`crate::job::process_new_jobs`].
    pub fn mask_to(&mut self, flag: JobFlags) {
        self.0 &= flag.0;
    }

    pub fn is_required(&self) -> bool {
        self.contains(JobFlags::REQUIRED)
    }
}

impl BitOr for JobFlags {
    type Output = JobFlags;

    fn bitor(self, rhs: JobFlags) -> JobFlags {
        JobFlags(self.0 | rhs.0)
    }
}

impl From<JobFlag> for JobFlags {
    fn from(f: JobFlag) -> Self {
        JobFlags(f as u8)
    }
}

impl fmt::Display for JobFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.contains(JobFlags::REQUIRED) {
            parts.push("Required");
        }
        if self.contains(JobFlags::REQUIRED_ONLY_IN_TOP_LEVEL_BUILD) {
            parts.push("RequiredOnlyInTopLevelBuild");
        }
        if parts.is_empty() {
            write!(f, "Optional")
        } else {
            write!(f, "{}", parts.join("|"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_only_in_top_level_is_not_required_by_default() {
        let flags = JobFlags::REQUIRED_ONLY_IN_TOP_LEVEL_BUILD;
        assert!(!flags.is_required());
    }

    #[test]
    fn mask_to_clears_other_bits() {
        let mut flags = JobFlags::REQUIRED | JobFlags::REQUIRED_ONLY_IN_TOP_LEVEL_BUILD;
        flags.mask_to(JobFlags::REQUIRED);
        assert!(flags.is_required());
        assert!(!flags.contains(JobFlags::REQUIRED_ONLY_IN_TOP_LEVEL_BUILD));
    }

    #[test]
    fn remove_clears_only_named_bit() {
        let mut flags = JobFlags::REQUIRED | JobFlags::REQUIRED_ONLY_IN_TOP_LEVEL_BUILD;
        flags.remove(JobFlags::REQUIRED_ONLY_IN_TOP_LEVEL_BUILD);
        assert!(flags.is_required());
        assert!(!flags.contains(JobFlags::REQUIRED_ONLY_IN_TOP_LEVEL_BUILD));
    }

    #[test]
    fn intersect_can_only_clear_bits_never_set_them() {
        let mut flags = JobFlags::REQUIRED;
        flags.intersect(JobFlags::empty());
        assert!(!flags.is_required());

        let mut flags = JobFlags::empty();
        flags.intersect(JobFlags::REQUIRED);
        assert!(!flags.is_required());

        let mut flags = JobFlags::REQUIRED;
        flags.intersect(JobFlags::REQUIRED);
        assert!(flags.is_required());
    }
}
