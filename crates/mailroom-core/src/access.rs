//! Route access guard
//!
//! Decides whether a page path may render for the current session or where
//! to redirect instead.

use serde::Serialize;

use crate::model::UserAuthData;

pub const SIGN_IN_PATH: &str = "/signin";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const ONBOARDING_PATH: &str = "/onboarding";

const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/mail", "/admin", "/settings", "/onboarding"];
const SUBSCRIBER_PREFIXES: &[&str] = &["/dashboard", "/mail"];
const GUEST_ONLY: &[&str] = &["/signin", "/signup"];

/// Guard decision
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(&'static str),
}

impl Access {
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::Redirect(target) => Some(*target),
        }
    }
}

/// Wire form of [`Access`]
#[derive(Clone, Debug, Serialize)]
pub struct AccessDecision {
    pub allow: bool,
    pub redirect: Option<&'static str>,
}

impl From<Access> for AccessDecision {
    fn from(access: Access) -> Self {
        Self {
            allow: access == Access::Allow,
            redirect: access.redirect_target(),
        }
    }
}

/// `true` when `path` is `prefix` or nested beneath it
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn under_any(path: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| under(path, p))
}

/// Decide access to `path` for an optional session
pub fn guard(path: &str, session: Option<&UserAuthData>) -> Access {
    let path = path.split(['?', '#']).next().unwrap_or(path);

    let Some(auth) = session else {
        return if under_any(path, PROTECTED_PREFIXES) {
            Access::Redirect(SIGN_IN_PATH)
        } else {
            Access::Allow
        };
    };

    if under_any(path, GUEST_ONLY) {
        return Access::Redirect(DASHBOARD_PATH);
    }

    if under(path, "/admin") && !auth.role.is_back_office() {
        return Access::Redirect(DASHBOARD_PATH);
    }

    if under_any(path, SUBSCRIBER_PREFIXES)
        && !auth.role.is_back_office()
        && !auth.has_active_subscription
    {
        return Access::Redirect(ONBOARDING_PATH);
    }

    Access::Allow
}
