//! Authentication decision pipeline — an ordered guard chain, first match wins.
//!
//! Guards run strictly in order over a [`RequestFacts`] snapshot; each either
//! passes the request along or produces a terminal decision. The chain is
//! linear, never cyclic, and every denial is final for that request.
//!
//! The same-origin and basic-auth bypasses grant the admin role outright, as
//! the deployment contract requires; that conflates "authenticated" with
//! "fully privileged" and is worth revisiting before widening either bypass.

use crate::context::AuthContext;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HOST, REFERER};
use http::{HeaderMap, Method, Uri};
use steerco_core::credentials::redact;
use steerco_core::{AppConfig, AuthError};

/// Paths probes may hit without credentials: health, readiness, liveness,
/// metrics and the diagnostics endpoint.
const BYPASS_PATHS: &[&str] = &[
    "/health",
    "/healthz",
    "/ready",
    "/live",
    "/metrics",
    "/api/v1/info",
];

/// Header carrying the per-integration API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Weaker query-parameter fallback for clients that cannot set headers.
/// Keys passed this way can end up in proxy and access logs.
pub const API_KEY_PARAM: &str = "api_key";
/// The structured-data content type mutating requests must declare.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Everything the guards are allowed to look at, snapshotted from the request.
#[derive(Debug)]
pub struct RequestFacts<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub headers: &'a HeaderMap,
    pub content_length: u64,
}

impl<'a> RequestFacts<'a> {
    pub fn new(method: &'a Method, uri: &'a Uri, headers: &'a HeaderMap) -> Self {
        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);
        Self {
            method,
            path: uri.path(),
            query: uri.query(),
            headers,
            content_length,
        }
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Terminal outcome of the pipeline.
#[derive(Debug, PartialEq, Eq)]
pub enum Decision {
    /// Probe or preflight traffic: proceed unauthenticated, no context.
    Bypass,
    /// Proceed with this context published to the request scope.
    Allow(AuthContext),
    /// Refuse with the mapped status; nothing reaches domain code.
    Deny(AuthError),
}

/// One link of the chain: pass the request on, or end it.
enum Gate {
    Continue,
    Terminal(Decision),
}

type Guard = fn(&AppConfig, &RequestFacts) -> Gate;

/// The chain itself. Order is the contract: bypass paths, preflight, payload
/// shape, kill-switch, same-origin, site-wide basic pair, keyed auth.
const GUARDS: &[Guard] = &[
    bypass_path_guard,
    preflight_guard,
    content_type_guard,
    kill_switch_guard,
    same_origin_guard,
    basic_bypass_guard,
    keyed_auth_guard,
];

/// Evaluate the full guard chain for one request.
pub fn authorize(config: &AppConfig, facts: &RequestFacts) -> Decision {
    for guard in GUARDS {
        if let Gate::Terminal(decision) = guard(config, facts) {
            return decision;
        }
    }
    // The keyed-auth guard is always terminal; this is the chain's backstop.
    Decision::Deny(AuthError::InvalidCredential)
}

/// Re-evaluation for routes outside the global pipeline: kill-switch, then
/// keyed auth. Deliberately narrower, with no same-origin or basic bypass.
pub fn authorize_direct(config: &AppConfig, facts: &RequestFacts) -> Result<AuthContext, AuthError> {
    if let Some(ctx) = kill_switch(config) {
        return Ok(ctx);
    }
    keyed_auth(config, facts)
}

/// Whether a path is exempt from authentication and tenant resolution.
pub fn is_bypass_path(path: &str) -> bool {
    BYPASS_PATHS.contains(&path)
}

fn bypass_path_guard(_config: &AppConfig, facts: &RequestFacts) -> Gate {
    if is_bypass_path(facts.path) {
        Gate::Terminal(Decision::Bypass)
    } else {
        Gate::Continue
    }
}

fn preflight_guard(_config: &AppConfig, facts: &RequestFacts) -> Gate {
    if facts.method == Method::OPTIONS {
        Gate::Terminal(Decision::Bypass)
    } else {
        Gate::Continue
    }
}

/// CSRF surface: a plain HTML form cannot declare `application/json`, so a
/// mutating request with a body must, before any credential is even read.
fn content_type_guard(_config: &AppConfig, facts: &RequestFacts) -> Gate {
    let mutating = matches!(facts.method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE");
    if !mutating || facts.content_length == 0 {
        return Gate::Continue;
    }

    let essence = facts
        .header(CONTENT_TYPE.as_str())
        .unwrap_or("")
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if essence == JSON_CONTENT_TYPE {
        Gate::Continue
    } else {
        tracing::warn!(
            method = %facts.method,
            path = facts.path,
            content_type = %essence,
            "rejecting mutating request with non-JSON body"
        );
        Gate::Terminal(Decision::Deny(AuthError::PayloadShape(essence)))
    }
}

fn kill_switch_guard(config: &AppConfig, _facts: &RequestFacts) -> Gate {
    match kill_switch(config) {
        Some(ctx) => Gate::Terminal(Decision::Allow(ctx)),
        None => Gate::Continue,
    }
}

/// The administrative kill-switch. Shared with [`authorize_direct`] so both
/// enforcement surfaces agree on what "auth disabled" means.
pub fn kill_switch(config: &AppConfig) -> Option<AuthContext> {
    if config.auth_enabled {
        None
    } else {
        Some(AuthContext::new(steerco_core::Role::Admin, "dev-mode"))
    }
}

/// Same-origin heuristic: the SPA is served by this same process, so a
/// forbidden-to-forge fetch-metadata signal (or a Referer matching our own
/// origin) already implies an authenticated browser session. Blind cross-site
/// form posts are stopped earlier by the content-type guard.
fn same_origin_guard(_config: &AppConfig, facts: &RequestFacts) -> Gate {
    let same_origin = match facts.header("sec-fetch-site") {
        Some(site) => site.eq_ignore_ascii_case("same-origin"),
        None => match (facts.header(REFERER.as_str()), facts.header(HOST.as_str())) {
            (Some(referer), Some(host)) => referer_matches_host(referer, host),
            _ => false,
        },
    };

    if same_origin {
        Gate::Terminal(Decision::Allow(AuthContext::new(
            steerco_core::Role::Admin,
            "spa-session",
        )))
    } else {
        Gate::Continue
    }
}

fn referer_matches_host(referer: &str, host: &str) -> bool {
    let rest = match referer.find("://") {
        Some(i) => &referer[i + 3..],
        None => return false,
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    !authority.is_empty() && authority.eq_ignore_ascii_case(host.trim())
}

/// Site-wide HTTP Basic pair for scripted tools without per-integration keys.
fn basic_bypass_guard(config: &AppConfig, facts: &RequestFacts) -> Gate {
    let Some((site_user, site_pass)) = config.site_basic_pair() else {
        return Gate::Continue;
    };
    let Some(value) = facts.header(AUTHORIZATION.as_str()) else {
        return Gate::Continue;
    };
    let Some((user, pass)) = decode_basic(value) else {
        return Gate::Continue;
    };

    if user == site_user && pass == site_pass {
        Gate::Terminal(Decision::Allow(AuthContext::new(
            steerco_core::Role::Admin,
            "basic-auth",
        )))
    } else {
        // Not a terminal refusal: a non-matching Basic header may still carry
        // an API key elsewhere on the request.
        Gate::Continue
    }
}

fn decode_basic(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value
        .trim()
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("basic"))
        .map(|(_, rest)| rest.trim())?;
    let decoded = BASE64.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn keyed_auth_guard(config: &AppConfig, facts: &RequestFacts) -> Gate {
    Gate::Terminal(match keyed_auth(config, facts) {
        Ok(ctx) => Decision::Allow(ctx),
        Err(err) => Decision::Deny(err),
    })
}

/// Keyed authentication: dedicated header first, query parameter fallback.
/// Shared with [`authorize_direct`] so both enforcement surfaces resolve
/// keys identically.
pub fn keyed_auth(config: &AppConfig, facts: &RequestFacts) -> Result<AuthContext, AuthError> {
    let key = facts
        .header(API_KEY_HEADER)
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| query_param(facts.query, API_KEY_PARAM));

    let Some(key) = key else {
        tracing::warn!(path = facts.path, "denied: no API key presented");
        return Err(AuthError::InvalidCredential);
    };

    if config.credentials.is_empty() {
        // Auth is on but nobody can ever pass: operator error, not caller error.
        tracing::error!(path = facts.path, "authentication enabled but no API keys configured");
        return Err(AuthError::Configuration(
            "authentication is enabled but no API keys are configured".to_string(),
        ));
    }

    match config.credentials.get(key.as_str()) {
        Some(&role) => Ok(AuthContext::new(role, redact(&key))),
        None => {
            tracing::warn!(path = facts.path, key = %redact(&key), "denied: unknown API key");
            Err(AuthError::InvalidCredential)
        }
    }
}

/// Look up one query parameter, percent-decoding its value. Clients that
/// reach for the query fallback tend to URL-encode the key.
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    let raw = query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)?;
    let value = urlencoding::decode(raw)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::HeaderName;
    use steerco_core::{parse_credentials, Role};

    fn config() -> AppConfig {
        AppConfig {
            credentials: parse_credentials("k1:admin,k2:viewer,k3:editor"),
            ..AppConfig::default()
        }
    }

    fn run(config: &AppConfig, method: Method, uri: &str, headers: &[(&str, &str)]) -> Decision {
        let uri: Uri = uri.parse().unwrap();
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                value.parse().unwrap(),
            );
        }
        let facts = RequestFacts::new(&method, &uri, &map);
        authorize(config, &facts)
    }

    fn allowed_role(decision: Decision) -> Role {
        match decision {
            Decision::Allow(ctx) => ctx.role,
            other => panic!("expected Allow, got {other:?}"),
        }
    }

    #[test]
    fn test_bypass_paths_skip_auth_entirely() {
        for path in ["/health", "/healthz", "/ready", "/live", "/metrics", "/api/v1/info"] {
            assert_eq!(run(&config(), Method::GET, path, &[]), Decision::Bypass);
        }
    }

    #[test]
    fn test_preflight_bypasses_without_role() {
        assert_eq!(
            run(&config(), Method::OPTIONS, "/api/v1/tenants", &[]),
            Decision::Bypass
        );
    }

    #[test]
    fn test_csrf_guard_rejects_non_json_body() {
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            let decision = run(
                &config(),
                method.clone(),
                "/api/v1/tenants",
                &[
                    ("content-type", "text/plain"),
                    ("content-length", "5"),
                    ("x-api-key", "k1"),
                ],
            );
            assert_eq!(
                decision,
                Decision::Deny(AuthError::PayloadShape("text/plain".into())),
                "{method}"
            );
        }
    }

    #[test]
    fn test_csrf_guard_runs_before_credentials() {
        // Even a valid admin key cannot rescue a malformed payload.
        let decision = run(
            &config(),
            Method::POST,
            "/api/v1/tenants",
            &[("content-length", "5"), ("x-api-key", "k1")],
        );
        assert!(matches!(decision, Decision::Deny(AuthError::PayloadShape(_))));
    }

    #[test]
    fn test_csrf_guard_passes_json_and_empty_bodies() {
        let decision = run(
            &config(),
            Method::POST,
            "/api/v1/tenants",
            &[
                ("content-type", "application/json; charset=utf-8"),
                ("content-length", "5"),
                ("x-api-key", "k1"),
            ],
        );
        assert_eq!(allowed_role(decision), Role::Admin);

        // No body, no guard: a bare DELETE goes straight to credentials.
        let decision = run(
            &config(),
            Method::DELETE,
            "/api/v1/tenants/x",
            &[("x-api-key", "k1")],
        );
        assert_eq!(allowed_role(decision), Role::Admin);
    }

    #[test]
    fn test_kill_switch_dominates_invalid_key() {
        let cfg = AppConfig {
            auth_enabled: false,
            ..config()
        };
        let decision = run(&cfg, Method::GET, "/api/v1/whoami", &[("x-api-key", "bogus")]);
        match decision {
            Decision::Allow(ctx) => {
                assert_eq!(ctx.role, Role::Admin);
                assert_eq!(ctx.credential_id, "dev-mode");
            }
            other => panic!("expected Allow, got {other:?}"),
        }
    }

    #[test]
    fn test_same_origin_fetch_metadata_grants_admin() {
        let decision = run(
            &config(),
            Method::GET,
            "/api/v1/whoami",
            &[("sec-fetch-site", "same-origin")],
        );
        match decision {
            Decision::Allow(ctx) => {
                assert_eq!(ctx.role, Role::Admin);
                assert_eq!(ctx.credential_id, "spa-session");
            }
            other => panic!("expected Allow, got {other:?}"),
        }
    }

    #[test]
    fn test_cross_site_fetch_metadata_falls_through_to_keys() {
        let decision = run(
            &config(),
            Method::GET,
            "/api/v1/whoami",
            &[("sec-fetch-site", "cross-site"), ("x-api-key", "k2")],
        );
        assert_eq!(allowed_role(decision), Role::Viewer);
    }

    #[test]
    fn test_referer_fallback_matches_own_origin_only() {
        let own = run(
            &config(),
            Method::GET,
            "/api/v1/whoami",
            &[("referer", "http://app.local:8080/cutover"), ("host", "app.local:8080")],
        );
        assert_eq!(allowed_role(own), Role::Admin);

        let foreign = run(
            &config(),
            Method::GET,
            "/api/v1/whoami",
            &[("referer", "http://evil.example/"), ("host", "app.local:8080")],
        );
        assert_eq!(foreign, Decision::Deny(AuthError::InvalidCredential));
    }

    #[test]
    fn test_basic_bypass_with_site_pair() {
        let cfg = AppConfig {
            site_user: Some("ops".into()),
            site_pass: Some("hunter2".into()),
            ..config()
        };
        let encoded = BASE64.encode("ops:hunter2");
        let decision = run(
            &cfg,
            Method::GET,
            "/api/v1/whoami",
            &[("authorization", &format!("Basic {encoded}"))],
        );
        match decision {
            Decision::Allow(ctx) => {
                assert_eq!(ctx.role, Role::Admin);
                assert_eq!(ctx.credential_id, "basic-auth");
            }
            other => panic!("expected Allow, got {other:?}"),
        }

        // Wrong pair falls through to keyed auth rather than terminating.
        let encoded = BASE64.encode("ops:wrong");
        let decision = run(
            &cfg,
            Method::GET,
            "/api/v1/whoami",
            &[
                ("authorization", &format!("Basic {encoded}")),
                ("x-api-key", "k3"),
            ],
        );
        assert_eq!(allowed_role(decision), Role::Editor);
    }

    #[test]
    fn test_basic_bypass_ignored_without_configured_pair() {
        let encoded = BASE64.encode("ops:hunter2");
        let decision = run(
            &config(),
            Method::GET,
            "/api/v1/whoami",
            &[("authorization", &format!("Basic {encoded}"))],
        );
        assert_eq!(decision, Decision::Deny(AuthError::InvalidCredential));
    }

    #[test]
    fn test_keyed_auth_header_and_query_fallback() {
        let decision = run(&config(), Method::GET, "/api/v1/whoami", &[("x-api-key", "k2")]);
        assert_eq!(allowed_role(decision), Role::Viewer);

        let decision = run(&config(), Method::GET, "/api/v1/whoami?api_key=k1", &[]);
        assert_eq!(allowed_role(decision), Role::Admin);

        // Header wins over the query parameter.
        let decision = run(
            &config(),
            Method::GET,
            "/api/v1/whoami?api_key=k1",
            &[("x-api-key", "k2")],
        );
        assert_eq!(allowed_role(decision), Role::Viewer);
    }

    #[test]
    fn test_query_parameter_key_is_percent_decoded() {
        let cfg = AppConfig {
            credentials: parse_credentials("svc key+1:editor"),
            ..AppConfig::default()
        };
        let decision = run(&cfg, Method::GET, "/api/v1/whoami?api_key=svc%20key%2B1", &[]);
        assert_eq!(allowed_role(decision), Role::Editor);
    }

    #[test]
    fn test_missing_and_unknown_keys_deny_uniformly() {
        let missing = run(&config(), Method::GET, "/api/v1/whoami", &[]);
        let unknown = run(&config(), Method::GET, "/api/v1/whoami", &[("x-api-key", "bogus")]);
        assert_eq!(missing, Decision::Deny(AuthError::InvalidCredential));
        assert_eq!(unknown, Decision::Deny(AuthError::InvalidCredential));
    }

    #[test]
    fn test_key_with_empty_registry_is_an_operator_error() {
        let cfg = AppConfig::default();
        assert!(cfg.auth_enabled);
        let decision = run(&cfg, Method::GET, "/api/v1/whoami", &[("x-api-key", "k1")]);
        assert!(matches!(decision, Decision::Deny(AuthError::Configuration(_))));
    }

    #[test]
    fn test_direct_evaluation_skips_bypasses() {
        // Same-origin signal means nothing to the per-route path.
        let method = Method::GET;
        let uri: Uri = "/exports/run".parse().unwrap();
        let mut map = HeaderMap::new();
        map.insert("sec-fetch-site", "same-origin".parse().unwrap());
        let facts = RequestFacts::new(&method, &uri, &map);
        assert_eq!(
            authorize_direct(&config(), &facts),
            Err(AuthError::InvalidCredential)
        );

        map.insert("x-api-key", "k3".parse().unwrap());
        let facts = RequestFacts::new(&method, &uri, &map);
        assert_eq!(
            authorize_direct(&config(), &facts).unwrap().role,
            Role::Editor
        );

        // Kill-switch still dominates the direct path.
        let cfg = AppConfig { auth_enabled: false, ..config() };
        let empty = HeaderMap::new();
        let facts = RequestFacts::new(&method, &uri, &empty);
        assert_eq!(authorize_direct(&cfg, &facts).unwrap().role, Role::Admin);
    }
}
