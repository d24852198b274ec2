//! Diagnostic validation of patch paths.
//!
//! Malformed paths are reported, never rejected: the backend is the
//! authority on what it accepts, so the patch is always submitted as-is.
//! Accepted paths look like:
//!
//! - `/purchase_units/@reference_id=='default'/amount`
//! - `/purchase_units/@reference_id=='default'/shipping/address`
//! - `/purchase_units/@reference_id=='default'/shipping/options`
//! - `/purchase_units/@reference_id=='d9f80740-38f0-11e8-b467-0ed5f89f718b'/amount`

use std::sync::LazyLock;

use regex::Regex;
use tracing::{error, info};

use crate::models::Query;

static PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/purchase_units/@reference_id=='(?:\w|-)*'/(?:amount|shipping/(?:options|address))$")
        .expect("Invalid patch path regex pattern")
});

/// Returns `true` if `path` matches the allow-listed patch path grammar.
pub fn is_valid_patch_path(path: &str) -> bool {
    PATH_PATTERN.is_match(path)
}

/// Returns `true` for the application identity that may use the dedicated
/// shipping patch API.
pub fn is_weasley(app_name: &str) -> bool {
    app_name == "weasley"
}

/// Splits typed queries into those with valid and invalid paths.
pub fn sanitize_patch(patch: &[Query]) -> (Vec<&Query>, Vec<&Query>) {
    patch.iter().partition(|q| is_valid_patch_path(&q.path))
}

/// Outcome of inspecting raw patch data supplied by a merchant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchDiagnostic {
    /// Every entry has an allow-listed path.
    Clean,
    /// Paths of the entries that failed the grammar, in patch order.
    InvalidPaths(Vec<String>),
    /// The patch data is not an array of operations.
    NotAnArray,
}

/// Inspects raw patch data without altering it. Entries without a string
/// `path` are reported with an empty path.
pub fn inspect_patch_data(data: &serde_json::Value) -> PatchDiagnostic {
    let Some(entries) = data.as_array() else {
        return PatchDiagnostic::NotAnArray;
    };

    let rejected: Vec<String> = entries
        .iter()
        .map(|entry| entry.get("path").and_then(|p| p.as_str()).unwrap_or_default())
        .filter(|path| !is_valid_patch_path(path))
        .map(String::from)
        .collect();

    if rejected.is_empty() {
        PatchDiagnostic::Clean
    } else {
        PatchDiagnostic::InvalidPaths(rejected)
    }
}

/// Context attached to every diagnostic log line.
#[derive(Debug, Clone, Copy)]
pub struct PatchLogContext<'a> {
    pub app_name: &'a str,
    pub has_buyer_access_token: bool,
    pub should_use_patch_shipping: bool,
}

/// Logs invalid or non-array patch data. Never fails and never affects
/// submission; returns the diagnostic for callers that want it.
pub fn log_invalid_shipping_change_patches(
    context: PatchLogContext<'_>,
    data: &serde_json::Value,
) -> PatchDiagnostic {
    let diagnostic = inspect_patch_data(data);

    match &diagnostic {
        PatchDiagnostic::Clean => {}
        PatchDiagnostic::InvalidPaths(rejected) => match serde_json::to_string(rejected) {
            Ok(rejected) => info!(
                event = %format!(
                    "button_shipping_change_patch_data_has_invalid_path_{}",
                    context.app_name
                ),
                app_name = context.app_name,
                rejected = %rejected,
                has_buyer_access_token = context.has_buyer_access_token,
                should_use_patch_shipping = context.should_use_patch_shipping,
                "Shipping change patch has invalid paths"
            ),
            Err(e) => error!(
                event = "button_shipping_change_patch_data_logging_failed",
                app_name = context.app_name,
                err_message = %e,
                has_buyer_access_token = context.has_buyer_access_token,
                should_use_patch_shipping = context.should_use_patch_shipping,
                "Failed to log shipping change patch diagnostics"
            ),
        },
        PatchDiagnostic::NotAnArray => info!(
            event = "button_shipping_change_patch_data_is_object",
            app_name = context.app_name,
            has_buyer_access_token = context.has_buyer_access_token,
            should_use_patch_shipping = context.should_use_patch_shipping,
            "Shipping change patch data is not an array"
        ),
    }

    diagnostic
}
