//! Route permission table.
//!
//! One static table answers "may this principal see this path?" for both the
//! client guard and the edge guard. Both layers call [`RouteTable::decide`];
//! they differ only in the fallback used when a role is refused.

use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const LOGIN_PATH: &str = "/login";
pub const FORGOT_PASSWORD_PATH: &str = "/forgot-password";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const SUPERADMIN_PATH: &str = "/superadmin";

/// How a rule matches a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// The path itself, nothing below it
    Exact(String),
    /// The path and everything under it (`/a` matches `/a` and `/a/b`, not `/ab`)
    Prefix(String),
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == p,
            Self::Prefix(p) => path
                .strip_prefix(p.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

/// Roles allowed below a path, plus an optional rule-specific redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub pattern: PathPattern,
    pub roles: BTreeSet<Role>,
    pub redirect: Option<String>,
}

impl RouteRule {
    pub fn new(pattern: PathPattern, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            pattern,
            roles: roles.into_iter().collect(),
            redirect: None,
        }
    }

    /// Send refused principals to `target` instead of the layer fallback
    #[must_use]
    pub fn redirect_to(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Outcome of a permission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(String),
}

impl RouteDecision {
    pub const fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::Redirect(target) => Some(target),
        }
    }
}

/// Static pathname → roles mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    login_path: String,
    public_paths: Vec<PathPattern>,
    rules: Vec<RouteRule>,
}

impl Default for RouteTable {
    /// The dashboard's table: login and password recovery are public, the
    /// superadmin area needs superadmin, the root needs either role, and
    /// every other page needs any session.
    fn default() -> Self {
        Self::new(LOGIN_PATH)
            .public(PathPattern::Exact(FORGOT_PASSWORD_PATH.to_string()))
            .rule(RouteRule::new(
                PathPattern::Prefix(SUPERADMIN_PATH.to_string()),
                [Role::Superadmin],
            ))
            .rule(RouteRule::new(
                PathPattern::Exact("/".to_string()),
                [Role::Admin, Role::Superadmin],
            ))
    }
}

impl RouteTable {
    /// Empty table with `login_path` as its only public page
    pub fn new(login_path: impl Into<String>) -> Self {
        let login_path = login_path.into();
        Self {
            public_paths: vec![PathPattern::Exact(login_path.clone())],
            login_path,
            rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn public(mut self, pattern: PathPattern) -> Self {
        self.public_paths.push(pattern);
        self
    }

    /// Add a rule; the first matching rule wins
    #[must_use]
    pub fn rule(mut self, rule: RouteRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn is_public(&self, path: &str) -> bool {
        let path = normalize(path);
        self.public_paths.iter().any(|p| p.matches(path))
    }

    pub fn rule_for(&self, path: &str) -> Option<&RouteRule> {
        let path = normalize(path);
        self.rules.iter().find(|rule| rule.pattern.matches(path))
    }

    /// Decide what `principal` gets at `path`.
    ///
    /// `fallback` is where a principal lands when a rule refuses its role and
    /// the rule has no redirect of its own.
    pub fn decide(&self, path: &str, principal: Option<Role>, fallback: &str) -> RouteDecision {
        let path = normalize(path);

        if self.is_public(path) {
            return match principal {
                Some(role) if path == self.login_path => {
                    RouteDecision::Redirect(role.home_path().to_string())
                }
                _ => RouteDecision::Allow,
            };
        }

        let Some(role) = principal else {
            return RouteDecision::Redirect(self.login_path.clone());
        };

        if path == "/" && role == Role::Superadmin {
            return RouteDecision::Redirect(Role::Superadmin.home_path().to_string());
        }

        match self.rule_for(path) {
            Some(rule) if !rule.allows(role) => RouteDecision::Redirect(
                rule.redirect.clone().unwrap_or_else(|| fallback.to_string()),
            ),
            _ => RouteDecision::Allow,
        }
    }
}

/// Drop a trailing slash so `/superadmin/` and `/superadmin` agree
fn normalize(path: &str) -> &str {
    if path.is_empty() {
        return "/";
    }
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}

/// Where each layer sends a principal whose role a rule refuses.
///
/// The client guard and the edge guard historically disagree here
/// (`/unauthorized` versus `/`). Both defaults are kept; operators can align
/// them through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectPolicy {
    pub client_fallback: String,
    pub edge_fallback: String,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self {
            client_fallback: UNAUTHORIZED_PATH.to_string(),
            edge_fallback: "/".to_string(),
        }
    }
}

impl RedirectPolicy {
    /// Same fallback on both layers
    pub fn aligned(target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            client_fallback: target.clone(),
            edge_fallback: target,
        }
    }
}
