//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use anyhow::Result;
use sha2::Digest;
use sha2::Sha256;

use crate::graph::DependencyInfo;

/// Fold the ordered, transitive inputs of a single output into one
/// content signature (spec §4.3: "stream the *ordered* content hashes of
/// its declared inputs through a cryptographic hash").
///
/// Order matters: two outputs with the same input *set* but different
/// input *order* get different signatures, mirroring the original
/// implementation's append-as-you-go hashing rather than a
/// order-independent combiner.
pub fn compute_signature(inputs: &mut [DependencyInfo]) -> Result<String> {
    let mut hasher = Sha256::new();
    for input in inputs.iter_mut() {
        input.append_to_signature(&mut hasher)?;
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn signature_is_order_sensitive() {
        let mut forward = vec![
            DependencyInfo::blob(PathBuf::from("a"), 1, vec![1]),
            DependencyInfo::blob(PathBuf::from("b"), 1, vec![2]),
        ];
        let mut backward = vec![
            DependencyInfo::blob(PathBuf::from("b"), 1, vec![2]),
            DependencyInfo::blob(PathBuf::from("a"), 1, vec![1]),
        ];

        let forward_sig = compute_signature(&mut forward).unwrap();
        let backward_sig = compute_signature(&mut backward).unwrap();
        assert_ne!(forward_sig, backward_sig);
    }

    #[test]
    fn empty_input_set_hashes_to_fixed_value() {
        let mut empty: Vec<DependencyInfo> = Vec::new();
        let first = compute_signature(&mut empty).unwrap();
        let second = compute_signature(&mut empty).unwrap();
        assert_eq!(first, second);
    }
}
