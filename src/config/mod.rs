//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Configuration loading: a TOML file plus environment overrides, parsed
//! into an unchecked [`NotValidatedConfiguration`] and then validated and
//! defaulted into a [`Configuration`] (spec §9).

mod not_validated;
pub use not_validated::*;

mod configuration;
pub use configuration::*;

mod util;
pub use util::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in_when_nothing_is_set() {
        let config = NotValidatedConfiguration::default().validate().unwrap();
        assert!(*config.thread_count() >= 1);
    }

    #[test]
    fn zero_thread_count_is_rejected() {
        let mut not_validated = NotValidatedConfiguration::default();
        not_validated.thread_count = Some(0);
        assert!(not_validated.validate().is_err());
    }

    #[test]
    fn invalid_remote_cache_url_is_rejected() {
        let mut not_validated = NotValidatedConfiguration::default();
        not_validated.remote_cache_url = Some("not a url".to_string());
        assert!(not_validated.validate().is_err());
    }

    #[test]
    fn nice_count_and_halt_on_error_default_to_off() {
        let config = NotValidatedConfiguration::default().validate().unwrap();
        assert_eq!(*config.nice_count(), 0);
        assert!(!config.halt_on_error());
    }
}
