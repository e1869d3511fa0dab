//! Static route table mapping external route names to upstream actions.
//!
//! The table is fixed at deploy time. The capability column is enforced at
//! the edge in addition to whatever the upstream enforces itself.

/// How the gateway satisfies a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Credential check and token mint, no relaying of the result.
    Login,
    /// Answered locally from verified claims.
    Whoami,
    /// Forwarded to the upstream after the configured gates pass.
    Proxy,
}

/// One routable action.
#[derive(Debug, Clone, Copy)]
pub struct RouteDescriptor {
    /// External path segment under `/api/`.
    pub route: &'static str,
    /// Action name sent to the upstream.
    pub action: &'static str,
    /// Whether a verified token is required.
    pub requires_auth: bool,
    /// Whether the `canViewLogs` capability is additionally required.
    pub requires_can_view_logs: bool,
    /// Local or proxied handling.
    pub kind: RouteKind,
}

/// The deploy-time route table.
pub const ROUTES: &[RouteDescriptor] = &[
    RouteDescriptor {
        route: "admin-login",
        action: "adminLogin",
        requires_auth: false,
        requires_can_view_logs: false,
        kind: RouteKind::Login,
    },
    RouteDescriptor {
        route: "whoami",
        action: "whoami",
        requires_auth: true,
        requires_can_view_logs: false,
        kind: RouteKind::Whoami,
    },
    RouteDescriptor {
        route: "submit",
        action: "submitForm",
        requires_auth: false,
        requires_can_view_logs: false,
        kind: RouteKind::Proxy,
    },
    RouteDescriptor {
        route: "files",
        action: "listFiles",
        requires_auth: true,
        requires_can_view_logs: false,
        kind: RouteKind::Proxy,
    },
    RouteDescriptor {
        route: "delete-file",
        action: "deleteFile",
        requires_auth: true,
        requires_can_view_logs: false,
        kind: RouteKind::Proxy,
    },
    RouteDescriptor {
        route: "logs",
        action: "listLogs",
        requires_auth: true,
        requires_can_view_logs: true,
        kind: RouteKind::Proxy,
    },
    RouteDescriptor {
        route: "send-welcome",
        action: "sendWelcomeEmail",
        requires_auth: true,
        requires_can_view_logs: false,
        kind: RouteKind::Proxy,
    },
    RouteDescriptor {
        route: "log-action",
        action: "logAction",
        requires_auth: true,
        requires_can_view_logs: false,
        kind: RouteKind::Proxy,
    },
];

/// Looks up a descriptor by its external route name.
#[must_use]
pub fn find(route: &str) -> Option<&'static RouteDescriptor> {
    ROUTES.iter().find(|descriptor| descriptor.route == route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_known_routes_resolve() {
        let logs = find("logs").unwrap();
        assert_eq!(logs.action, "listLogs");
        assert!(logs.requires_auth);
        assert!(logs.requires_can_view_logs);

        let submit = find("submit").unwrap();
        assert!(!submit.requires_auth);

        let login = find("admin-login").unwrap();
        assert_eq!(login.kind, RouteKind::Login);
        assert!(!login.requires_auth);
    }

    #[test]
    fn test_unknown_route_is_none() {
        assert!(find("nope").is_none());
        assert!(find("").is_none());
        assert!(find("LOGS").is_none());
    }

    #[test]
    fn test_route_and_action_names_are_unique() {
        let routes: HashSet<_> = ROUTES.iter().map(|d| d.route).collect();
        let actions: HashSet<_> = ROUTES.iter().map(|d| d.action).collect();
        assert_eq!(routes.len(), ROUTES.len());
        assert_eq!(actions.len(), ROUTES.len());
    }

    #[test]
    fn test_capability_routes_also_require_auth() {
        for descriptor in ROUTES {
            if descriptor.requires_can_view_logs {
                assert!(descriptor.requires_auth, "{} must require auth", descriptor.route);
            }
        }
    }

    #[test]
    fn test_mutating_routes_require_auth() {
        for route in ["delete-file", "send-welcome", "files", "log-action"] {
            assert!(find(route).unwrap().requires_auth, "{route} must require auth");
        }
    }
}
