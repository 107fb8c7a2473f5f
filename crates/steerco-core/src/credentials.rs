//! Credential list parser — flat `secret[:role]` entries into a secret→role map.

use crate::role::Role;
use std::collections::HashMap;

/// Parse a comma-separated credential list into a secret→role map.
///
/// Entry format is `secret` or `secret:role`. A missing role defaults to
/// viewer, an unrecognized role string downgrades to viewer with a warning,
/// and blank entries are skipped. Total: never panics, any input yields a map.
///
/// A duplicated secret keeps the last occurrence; each overwrite is logged so
/// a conflicting list is visible without failing startup.
pub fn parse_credentials(raw: &str) -> HashMap<String, Role> {
    let mut map = HashMap::new();

    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (secret, role) = match entry.split_once(':') {
            None => (entry, Role::Viewer),
            Some((secret, role_str)) => {
                let role = role_str.parse::<Role>().unwrap_or_else(|unknown| {
                    tracing::warn!(
                        key = %redact(secret),
                        "{unknown}, downgrading to viewer"
                    );
                    Role::Viewer
                });
                (secret.trim(), role)
            }
        };

        if secret.is_empty() {
            continue;
        }
        if map.insert(secret.to_string(), role).is_some() {
            tracing::warn!(key = %redact(secret), "duplicate API key in credential list, last entry wins");
        }
    }

    map
}

/// Reduce a secret to a short prefix for log lines.
pub fn redact(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}…")
}
