use axum::{
    extract::Request,
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Redirect, Response},
};
use serde_json::json;

use crate::config::get_config;
use crate::middleware::auth;
use crate::models::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// No session required.
    Public,
    /// Requires a session but passes before a role is chosen.
    Onboarding,
    EmployerOnly,
    CandidateOnly,
    /// Any signed-in user with a role.
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated { role: Option<Role> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    RequireAuth,
    RequireOnboarding,
    /// Denied; carries the caller's actual role so navigation can land on
    /// their own dashboard.
    WrongRole(Role),
}

pub fn classify_route(method: &Method, path: &str) -> RouteClass {
    if *method == Method::OPTIONS {
        return RouteClass::Public;
    }

    let segments: Vec<&str> = path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] | ["health"] => RouteClass::Public,
        ["sign-in", ..] | ["sign-up", ..] => RouteClass::Public,
        ["api", "auth", ..] | ["api", "webhooks", ..] => RouteClass::Public,
        ["api", "discovery"] => RouteClass::Public,
        ["api", "jobs"] if *method == Method::GET => RouteClass::Public,
        ["api", "jobs"] => RouteClass::EmployerOnly,
        ["api", "jobs", _] if *method == Method::GET => RouteClass::Public,
        ["api", "jobs", _] => RouteClass::EmployerOnly,
        ["api", "jobs", _, "apply"] => RouteClass::CandidateOnly,
        ["onboarding", ..] => RouteClass::Onboarding,
        ["api", "users", "register"] => RouteClass::Onboarding,
        ["api", "users", "me"] => RouteClass::Onboarding,
        ["api", "employer", ..] => RouteClass::EmployerOnly,
        ["api", "applications", ..] => RouteClass::EmployerOnly,
        ["api", "payments", ..] => RouteClass::EmployerOnly,
        ["api", "uploads", "logo"] => RouteClass::EmployerOnly,
        ["api", "uploads", "resume"] => RouteClass::CandidateOnly,
        ["api", "candidate", ..] => RouteClass::CandidateOnly,
        ["employer", ..] => RouteClass::EmployerOnly,
        ["candidate", ..] => RouteClass::CandidateOnly,
        _ => RouteClass::Authenticated,
    }
}

pub fn gate_verdict(class: RouteClass, identity: &Identity) -> Verdict {
    if class == RouteClass::Public {
        return Verdict::Allow;
    }

    match identity {
        Identity::Anonymous => Verdict::RequireAuth,
        Identity::Authenticated { role: None } => match class {
            RouteClass::Onboarding => Verdict::Allow,
            _ => Verdict::RequireOnboarding,
        },
        Identity::Authenticated { role: Some(role) } => match class {
            RouteClass::Public | RouteClass::Onboarding | RouteClass::Authenticated => {
                Verdict::Allow
            }
            RouteClass::EmployerOnly if *role == Role::Employer => Verdict::Allow,
            RouteClass::CandidateOnly if *role == Role::Candidate => Verdict::Allow,
            RouteClass::EmployerOnly | RouteClass::CandidateOnly => Verdict::WrongRole(*role),
        },
    }
}

// Best-effort role resolution: the session claim when present, else the
// referring page's prefix. Authenticated route groups re-check against the
// user directory, so this stays a coarse first gate.
fn resolve_identity(req: &Request) -> Identity {
    let Some(token) = auth::session_token(req) else {
        return Identity::Anonymous;
    };
    let Some(claims) = auth::decode_session(&token) else {
        return Identity::Anonymous;
    };

    let role = claims
        .role
        .as_deref()
        .and_then(Role::parse)
        .or_else(|| referer_role(req));
    Identity::Authenticated { role }
}

fn referer_role(req: &Request) -> Option<Role> {
    let referer = req.headers().get(header::REFERER)?.to_str().ok()?;
    if referer.contains("/employer") {
        Some(Role::Employer)
    } else if referer.contains("/candidate") {
        Some(Role::Candidate)
    } else {
        None
    }
}

/// Gates every request before it reaches a handler. API paths get JSON error
/// statuses; browser navigation is redirected to the right frontend page.
pub async fn access_control(req: Request, next: Next) -> Response {
    let class = classify_route(req.method(), req.uri().path());
    let identity = resolve_identity(&req);
    let verdict = gate_verdict(class, &identity);

    let path = req.uri().path().to_string();
    let is_api = path.starts_with("/api");
    let config = get_config();

    match verdict {
        Verdict::Allow => next.run(req).await,
        Verdict::RequireAuth => {
            if is_api {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "Authentication required"})),
                )
                    .into_response()
            } else {
                let back = req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or(&path);
                let back: String = url::form_urlencoded::byte_serialize(back.as_bytes()).collect();
                Redirect::temporary(&format!(
                    "{}/sign-in?redirect_url={}",
                    config.frontend_url, back
                ))
                .into_response()
            }
        }
        Verdict::RequireOnboarding => {
            if is_api {
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({"error": "Role selection required"})),
                )
                    .into_response()
            } else {
                Redirect::temporary(&format!("{}/onboarding", config.frontend_url)).into_response()
            }
        }
        Verdict::WrongRole(role) => {
            if is_api {
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({"error": "You do not have access to this area"})),
                )
                    .into_response()
            } else {
                Redirect::temporary(&format!(
                    "{}/{}/dashboard",
                    config.frontend_url,
                    role.as_str()
                ))
                .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anonymous() -> Identity {
        Identity::Anonymous
    }

    fn no_role() -> Identity {
        Identity::Authenticated { role: None }
    }

    fn as_role(role: Role) -> Identity {
        Identity::Authenticated { role: Some(role) }
    }

    #[test]
    fn public_surface_stays_open() {
        assert_eq!(classify_route(&Method::GET, "/health"), RouteClass::Public);
        assert_eq!(classify_route(&Method::GET, "/api/jobs"), RouteClass::Public);
        assert_eq!(
            classify_route(&Method::GET, "/api/jobs/9b2d"),
            RouteClass::Public
        );
        assert_eq!(
            classify_route(&Method::GET, "/api/discovery"),
            RouteClass::Public
        );
        assert_eq!(
            classify_route(&Method::POST, "/api/webhooks/stripe"),
            RouteClass::Public
        );
        assert_eq!(
            gate_verdict(RouteClass::Public, &anonymous()),
            Verdict::Allow
        );
    }

    #[test]
    fn job_mutations_are_employer_routes() {
        assert_eq!(
            classify_route(&Method::POST, "/api/jobs"),
            RouteClass::EmployerOnly
        );
        assert_eq!(
            classify_route(&Method::PUT, "/api/jobs/9b2d"),
            RouteClass::EmployerOnly
        );
        assert_eq!(
            classify_route(&Method::DELETE, "/api/jobs/9b2d"),
            RouteClass::EmployerOnly
        );
        assert_eq!(
            classify_route(&Method::POST, "/api/jobs/9b2d/apply"),
            RouteClass::CandidateOnly
        );
        assert_eq!(
            classify_route(&Method::POST, "/api/payments/create-checkout-session"),
            RouteClass::EmployerOnly
        );
    }

    #[test]
    fn anonymous_callers_need_a_session() {
        assert_eq!(
            gate_verdict(RouteClass::EmployerOnly, &anonymous()),
            Verdict::RequireAuth
        );
        assert_eq!(
            gate_verdict(RouteClass::Onboarding, &anonymous()),
            Verdict::RequireAuth
        );
    }

    #[test]
    fn role_less_sessions_go_to_onboarding() {
        assert_eq!(
            gate_verdict(RouteClass::Onboarding, &no_role()),
            Verdict::Allow
        );
        assert_eq!(
            gate_verdict(RouteClass::EmployerOnly, &no_role()),
            Verdict::RequireOnboarding
        );
        assert_eq!(
            gate_verdict(RouteClass::Authenticated, &no_role()),
            Verdict::RequireOnboarding
        );
    }

    #[test]
    fn cross_role_access_is_denied_with_own_role() {
        assert_eq!(
            gate_verdict(RouteClass::CandidateOnly, &as_role(Role::Employer)),
            Verdict::WrongRole(Role::Employer)
        );
        assert_eq!(
            gate_verdict(RouteClass::EmployerOnly, &as_role(Role::Candidate)),
            Verdict::WrongRole(Role::Candidate)
        );
        assert_eq!(
            gate_verdict(RouteClass::EmployerOnly, &as_role(Role::Employer)),
            Verdict::Allow
        );
        assert_eq!(
            gate_verdict(RouteClass::CandidateOnly, &as_role(Role::Candidate)),
            Verdict::Allow
        );
    }

    #[test]
    fn onboarding_routes_pass_for_both_roles() {
        assert_eq!(
            classify_route(&Method::GET, "/api/users/me"),
            RouteClass::Onboarding
        );
        assert_eq!(
            classify_route(&Method::POST, "/api/users/register"),
            RouteClass::Onboarding
        );
        assert_eq!(
            gate_verdict(RouteClass::Onboarding, &as_role(Role::Candidate)),
            Verdict::Allow
        );
        assert_eq!(
            gate_verdict(RouteClass::Onboarding, &as_role(Role::Employer)),
            Verdict::Allow
        );
    }
}
