//! Checkout configuration loaded from environment variables.
//!
//! Required:
//! - `CHECKOUT_CLIENT_ID`: merchant client id sent to the shipping patch API
//! - `CHECKOUT_FACILITATOR_ACCESS_TOKEN`: token for facilitator-scoped calls
//!
//! Optional:
//! - `CHECKOUT_PARTNER_ATTRIBUTION_ID`
//! - `CHECKOUT_LSAT_UPGRADABLE`: forces the REST order patch path
//! - `CHECKOUT_USE_SHIPPING_CHANGE_CALLBACK_MUTATION`: enables the dedicated
//!   shipping patch API for eligible apps

use crate::CheckoutError;
use crate::models::AccessToken;

/// Feature flags resolved for the checkout session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    pub is_lsat_upgradable: bool,
}

/// Experiment treatments resolved for the checkout session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Experiments {
    pub use_shipping_change_callback_mutation: bool,
}

/// Top-level checkout configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub client_id: String,
    pub partner_attribution_id: Option<String>,
    pub facilitator_access_token: AccessToken,
    pub feature_flags: FeatureFlags,
    pub experiments: Experiments,
}

/// Loads the checkout configuration from environment variables.
///
/// Empty variables are treated as absent.
///
/// # Errors
///
/// Returns [`CheckoutError::Config`] if a required variable is missing or a
/// flag is not a recognized boolean.
pub fn fetch_config() -> crate::Result<CheckoutConfig> {
    let client_id = required_var("CHECKOUT_CLIENT_ID")?;
    let facilitator_access_token = required_var("CHECKOUT_FACILITATOR_ACCESS_TOKEN")?;
    let partner_attribution_id = non_empty_var("CHECKOUT_PARTNER_ATTRIBUTION_ID");

    Ok(CheckoutConfig {
        client_id,
        partner_attribution_id,
        facilitator_access_token: AccessToken::new(facilitator_access_token),
        feature_flags: FeatureFlags {
            is_lsat_upgradable: bool_var("CHECKOUT_LSAT_UPGRADABLE")?,
        },
        experiments: Experiments {
            use_shipping_change_callback_mutation: bool_var(
                "CHECKOUT_USE_SHIPPING_CHANGE_CALLBACK_MUTATION",
            )?,
        },
    })
}

fn required_var(name: &str) -> crate::Result<String> {
    non_empty_var(name).ok_or_else(|| CheckoutError::Config(format!("{name} is not set")))
}

fn bool_var(name: &str) -> crate::Result<bool> {
    match non_empty_var(name) {
        None => Ok(false),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(CheckoutError::Config(format!(
                "{name} must be a boolean, got {value:?}"
            ))),
        },
    }
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that touch the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Temporarily sets env vars, runs `f`, then restores originals.
    fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let originals: Vec<(&str, Option<String>)> = vars
            .iter()
            .map(|(k, _)| (*k, std::env::var(k).ok()))
            .collect();

        for (k, v) in vars {
            // SAFETY: env mutation is serialized by ENV_LOCK.
            unsafe {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }

        f();

        for (k, original) in originals {
            // SAFETY: restoring original values under the same lock.
            unsafe {
                match original {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    const ALL_VARS: [&str; 5] = [
        "CHECKOUT_CLIENT_ID",
        "CHECKOUT_FACILITATOR_ACCESS_TOKEN",
        "CHECKOUT_PARTNER_ATTRIBUTION_ID",
        "CHECKOUT_LSAT_UPGRADABLE",
        "CHECKOUT_USE_SHIPPING_CHANGE_CALLBACK_MUTATION",
    ];

    fn env(values: [Option<&'static str>; 5]) -> Vec<(&'static str, Option<&'static str>)> {
        ALL_VARS.into_iter().zip(values).collect()
    }

    #[test]
    fn loads_required_values_with_default_flags() {
        with_env(
            &env([Some("client-1"), Some("facilitator"), None, None, None]),
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.client_id, "client-1");
                assert_eq!(config.facilitator_access_token.expose(), "facilitator");
                assert!(config.partner_attribution_id.is_none());
                assert_eq!(config.feature_flags, FeatureFlags::default());
                assert_eq!(config.experiments, Experiments::default());
            },
        );
    }

    #[test]
    fn parses_flags() {
        with_env(
            &env([
                Some("client-1"),
                Some("facilitator"),
                Some("bn-code"),
                Some("TRUE"),
                Some("1"),
            ]),
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.partner_attribution_id.as_deref(), Some("bn-code"));
                assert!(config.feature_flags.is_lsat_upgradable);
                assert!(config.experiments.use_shipping_change_callback_mutation);
            },
        );
    }

    #[test]
    fn rejects_missing_client_id() {
        with_env(&env([Some(""), Some("facilitator"), None, None, None]), || {
            let err = fetch_config().unwrap_err();
            assert!(err.to_string().contains("CHECKOUT_CLIENT_ID is not set"));
        });
    }

    #[test]
    fn rejects_non_boolean_flag() {
        with_env(
            &env([Some("client-1"), Some("facilitator"), None, Some("yes"), None]),
            || {
                let err = fetch_config().unwrap_err();
                assert!(err.to_string().contains("CHECKOUT_LSAT_UPGRADABLE"));
            },
        );
    }

    #[test]
    fn facilitator_token_is_redacted_in_debug() {
        with_env(
            &env([Some("client-1"), Some("tok-secret"), None, None, None]),
            || {
                let config = fetch_config().unwrap();
                assert!(!format!("{config:?}").contains("tok-secret"));
            },
        );
    }
}
