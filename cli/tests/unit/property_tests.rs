//! Property-based tests for the install decision rule, state predicates,
//! and input validation.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use outline_gcp::domain::attributes::keys;
use outline_gcp::domain::config::{VALID_CONFIG_KEYS, validate_config_key, validate_config_value};
use outline_gcp::domain::instance::{region_of, validate_instance_name};
use outline_gcp::domain::{CertFingerprint, GuestAttributes, InstallDecision, InstallState, decide};

/// Any subset of the four known keys, with arbitrary values.
fn attribute_bag() -> impl Strategy<Value = GuestAttributes> {
    (
        proptest::option::of("[a-z0-9:]{1,16}"),
        proptest::option::of("[a-f0-9]{1,64}"),
        proptest::option::of("https://[a-z0-9.]{1,20}:[0-9]{2,5}/[a-zA-Z0-9]{0,12}"),
        proptest::option::of("[a-z ]{1,30}"),
    )
        .prop_map(|(outline, cert, api, error)| {
            let mut bag = GuestAttributes::new();
            for (key, value) in [
                (keys::OUTLINE, outline),
                (keys::CERT_SHA256, cert),
                (keys::API_URL, api),
                (keys::INSTALL_ERROR, error),
            ] {
                if let Some(value) = value {
                    bag.insert(key, value);
                }
            }
            bag
        })
}

fn any_state() -> impl Strategy<Value = InstallState> {
    proptest::sample::select(InstallState::ALL.to_vec())
}

// ============================================================================
// decide() priority
// ============================================================================

proptest! {
    /// apiUrl + certSha256 always wins, whatever else is present.
    #[test]
    fn prop_api_url_and_cert_always_install(bag in attribute_bag()) {
        let installed = bag.contains(keys::API_URL) && bag.contains(keys::CERT_SHA256);
        let is_installed = matches!(decide(&bag), InstallDecision::Installed { .. });
        prop_assert_eq!(installed, is_installed);
    }

    /// Each rule applies only when every higher-priority rule does not.
    #[test]
    fn prop_decision_follows_priority(bag in attribute_bag()) {
        let installed = bag.contains(keys::API_URL) && bag.contains(keys::CERT_SHA256);
        let expected = if installed {
            Some(InstallState::Success)
        } else if bag.contains(keys::INSTALL_ERROR) {
            Some(InstallState::Error)
        } else if bag.contains(keys::CERT_SHA256) {
            Some(InstallState::HasCertificate)
        } else if bag.contains(keys::OUTLINE) {
            Some(InstallState::Booted)
        } else {
            None
        };
        prop_assert_eq!(decide(&bag).target_state(), expected);
    }

    /// Unrelated keys never change the decision.
    #[test]
    fn prop_unknown_keys_are_ignored(bag in attribute_bag(), key in "x-[a-z]{1,8}", value in "[a-z]{0,8}") {
        let mut noisy = bag.clone();
        noisy.insert(key, value);
        prop_assert_eq!(decide(&bag), decide(&noisy));
    }
}

// ============================================================================
// InstallState predicates
// ============================================================================

proptest! {
    #[test]
    fn prop_completed_iff_success_error_or_deleted(state in any_state()) {
        let expected = matches!(state, InstallState::Success | InstallState::Error | InstallState::Deleted);
        prop_assert_eq!(state.is_completed(), expected);
    }

    #[test]
    fn prop_progress_is_a_fraction(state in any_state()) {
        prop_assert!((0.0..=1.0).contains(&state.progress()));
    }

    #[test]
    fn prop_progress_monotonic_along_happy_path(i in 0usize..6, j in 0usize..6) {
        let (lo, hi) = (i.min(j), i.max(j));
        prop_assert!(
            InstallState::HAPPY_PATH[lo].progress() <= InstallState::HAPPY_PATH[hi].progress()
        );
    }
}

// ============================================================================
// CertFingerprint normalisation
// ============================================================================

proptest! {
    #[test]
    fn prop_hex_fingerprints_are_lowercase_without_separators(bytes in proptest::collection::vec(any::<u8>(), 1..32)) {
        let raw = bytes.iter().map(|b| format!("{b:02X}")).collect::<Vec<_>>().join(":");
        let fp = CertFingerprint::parse(&raw).expect("non-empty");
        prop_assert_eq!(fp.as_str().len(), bytes.len() * 2);
        prop_assert!(fp.as_str().chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn prop_blank_fingerprint_is_rejected(spaces in " {0,8}") {
        prop_assert!(CertFingerprint::parse(&spaces).is_none());
    }
}

// ============================================================================
// Validation
// ============================================================================

proptest! {
    /// Arbitrary keys outside the whitelist are rejected.
    #[test]
    fn prop_arbitrary_keys_rejected(key in "[a-z]{1,20}\\.[a-z_]{1,20}") {
        if !VALID_CONFIG_KEYS.contains(&key.as_str()) {
            prop_assert!(validate_config_key(&key).is_err(), "accepted invalid key: {key}");
        }
    }

    #[test]
    fn prop_positive_poll_intervals_accepted(secs in 1u64..100_000) {
        prop_assert!(validate_config_value("install.poll_interval_secs", &secs.to_string()).is_ok());
    }

    #[test]
    fn prop_valid_instance_names_accepted(name in "[a-z][-a-z0-9]{0,61}[a-z0-9]") {
        prop_assert!(validate_instance_name(&name).is_ok(), "rejected {name}");
    }

    #[test]
    fn prop_uppercase_instance_names_rejected(name in "[A-Z][a-z0-9]{0,10}") {
        prop_assert!(validate_instance_name(&name).is_err());
    }

    #[test]
    fn prop_region_is_zone_without_suffix(region in "[a-z]{2,10}-[a-z]{2,10}[0-9]", suffix in "[a-f]") {
        let zone = format!("{region}-{suffix}");
        prop_assert_eq!(region_of(&zone), region.as_str());
    }
}
