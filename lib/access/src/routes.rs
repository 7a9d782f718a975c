//! The application's view table and the role each view requires.

use serde::Serialize;

use crate::guard::{AccessContext, GuardDecision, RoleGuard};
use crate::role::RoleSet;

/// A guarded view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    path: String,
    title: String,
    allowed: RoleSet,
}

impl Route {
    #[must_use]
    pub fn new(path: impl Into<String>, title: impl Into<String>, allowed: RoleSet) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            allowed,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn allowed(&self) -> &RoleSet {
        &self.allowed
    }

    /// Returns true if `path` is this route or nested under it.
    fn covers(&self, path: &str) -> bool {
        if self.path == "/" {
            return path.starts_with('/');
        }
        path == self.path
            || path
                .strip_prefix(self.path.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Ordered set of guarded views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl Default for RouteTable {
    /// The club administration views.
    fn default() -> Self {
        Self::new(vec![
            Route::new("/", "Dashboard", RoleSet::any()),
            Route::new("/feed", "Feed", RoleSet::any()),
            Route::new("/progress", "Progress", RoleSet::any()),
            Route::new("/members", "Members", RoleSet::staff_tier()),
            Route::new("/units", "Units", RoleSet::staff_tier()),
            Route::new("/events", "Events", RoleSet::staff_tier()),
            Route::new("/inventory", "Inventory", RoleSet::staff_tier()),
            Route::new("/finance", "Finance", RoleSet::admin_tier()),
            Route::new("/users", "Users", RoleSet::admin_tier()),
        ])
    }
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Finds the most specific route covering `path`.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .filter(|r| r.covers(path))
            .max_by_key(|r| r.path.len())
    }

    /// Checks navigation to `path`. Paths outside the table need only a session.
    #[must_use]
    pub fn check(&self, guard: &RoleGuard, ctx: &AccessContext, path: &str) -> GuardDecision {
        let any = RoleSet::any();
        let allowed = self.find(path).map_or(&any, Route::allowed);
        guard.check(ctx, allowed)
    }

    /// Returns the routes the viewer may open.
    #[must_use]
    pub fn accessible<'a>(&'a self, guard: &RoleGuard, ctx: &AccessContext) -> Vec<&'a Route> {
        self.routes
            .iter()
            .filter(|r| guard.check(ctx, r.allowed()).is_allowed())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    fn ctx(role: &str) -> AccessContext {
        AccessContext::authenticated(Some(Role::new(role)))
    }

    #[test]
    fn nested_paths_use_most_specific_route() {
        let table = RouteTable::default();
        assert_eq!(table.find("/finance/accounts/3").map(Route::path), Some("/finance"));
        assert_eq!(table.find("/members").map(Route::path), Some("/members"));
        assert_eq!(table.find("/").map(Route::path), Some("/"));
    }

    #[test]
    fn prefix_must_end_on_segment_boundary() {
        let table = RouteTable::default();
        assert_eq!(table.find("/financed").map(Route::path), Some("/"));
    }

    #[test]
    fn finance_is_admin_tier_only() {
        let table = RouteTable::default();
        let guard = RoleGuard::default();
        assert!(table.check(&guard, &ctx("director"), "/finance").is_allowed());
        assert!(!table.check(&guard, &ctx("leader"), "/finance/fees").is_allowed());
    }

    #[test]
    fn leaders_reach_staff_views() {
        let table = RouteTable::default();
        let guard = RoleGuard::default();
        assert!(table.check(&guard, &ctx("Leader"), "/members/12").is_allowed());
        assert!(!table.check(&guard, &ctx("member"), "/members").is_allowed());
    }

    #[test]
    fn accessible_routes_for_member() {
        let table = RouteTable::default();
        let guard = RoleGuard::default();
        let paths: Vec<&str> = table
            .accessible(&guard, &ctx("MEMBER"))
            .into_iter()
            .map(Route::path)
            .collect();
        assert_eq!(paths, vec!["/", "/feed", "/progress"]);
    }

    #[test]
    fn anonymous_sees_nothing() {
        let table = RouteTable::default();
        let guard = RoleGuard::default();
        assert!(table.accessible(&guard, &AccessContext::anonymous()).is_empty());
        assert!(
            !table
                .check(&guard, &AccessContext::anonymous(), "/unknown")
                .is_allowed()
        );
    }
}
