//! Environment resolution.
//!
//! Pure business logic: the probe is the only source of ambient state.

use crate::descriptor::{Environment, EnvironmentHints, HostFlavor, HostKind};
use crate::error::EnvironmentError;
use crate::probe::HostProbe;

/// Query parameter marking a detached popup window.
pub const POPOUT_QUERY_KEY: &str = "popout";

/// Resolve the descriptor for the current context.
///
/// Priority for the vendor flavor:
/// 1. `browser` namespace (Firefox)
/// 2. `chrome` namespace (Chromium)
///
/// A host API without a role hint resolves to `HostKind::None`; the flavor is
/// still recorded. A role hint without a host API is a misconfigured context
/// and fails.
pub fn resolve(
    hints: &EnvironmentHints,
    probe: &dyn HostProbe,
) -> Result<Environment, EnvironmentError> {
    let frame_has_parent = probe.has_parent_frame();

    let host_flavor = if probe.has_browser_namespace() {
        Some(HostFlavor::Firefox)
    } else if probe.has_chrome_namespace() {
        Some(HostFlavor::Chromium)
    } else {
        None
    };

    let Some(host_flavor) = host_flavor else {
        if let Some(role) = hints.extension {
            return Err(EnvironmentError::HostMissing { role });
        }
        tracing::debug!(frame_has_parent, "no extension host, resolved plain web context");
        return Ok(Environment::web(frame_has_parent));
    };

    let Some(role) = hints.extension else {
        tracing::debug!(?host_flavor, "host API bound without extension role");
        return Ok(Environment {
            host_flavor,
            ..Environment::web(frame_has_parent)
        });
    };

    let env = Environment {
        host_kind: HostKind::from(role),
        is_extension: true,
        is_popout: is_popout(&probe.location_search()),
        frame_has_parent,
        host_flavor,
        dev_mode: !probe.manifest_has_update_url(),
    };

    tracing::debug!(
        host_kind = %env.host_kind,
        ?host_flavor,
        is_popout = env.is_popout,
        frame_has_parent,
        "resolved extension context"
    );

    Ok(env)
}

/// Whether a query string marks a popout window.
///
/// The marker must be present with a non-empty value.
pub fn is_popout(search: &str) -> bool {
    let query = search.strip_prefix('?').unwrap_or(search);
    url::form_urlencoded::parse(query.as_bytes())
        .any(|(key, value)| key == POPOUT_QUERY_KEY && !value.is_empty())
}
