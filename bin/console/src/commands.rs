//! Command handlers.

use clubhouse_access::{GuardDecision, RoleGuard, RouteTable, SessionSnapshot};
use clubhouse_core::Result;
use clubhouse_session::SessionStore;
use tracing::debug;

use crate::entity::EntityKind;
use crate::error::ConsoleError;

/// Everything a command needs.
pub struct Console {
    pub session: SessionStore,
    pub guard: RoleGuard,
    pub routes: RouteTable,
    pub json: bool,
}

impl Console {
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ConsoleError> {
        let user = self
            .session
            .login(email, password)
            .await
            .map_err(|e| ConsoleError::Login {
                message: e.to_string(),
            })?;
        match user.role() {
            Some(role) => println!("Signed in as {} ({role})", user.display_label()),
            None => println!("Signed in as {}", user.display_label()),
        }
        Ok(())
    }

    pub async fn logout(&self) {
        self.session.logout().await;
        println!("Signed out");
    }

    pub async fn status(&self) -> Result<(), ConsoleError> {
        let snapshot = self.session.snapshot().await;
        if self.json {
            return print_json(&snapshot);
        }

        println!("phase: {}", snapshot.phase);
        if let Some(user) = &snapshot.user {
            println!("user:  {}", user.display_label());
            if let Some(role) = user.role() {
                println!("role:  {role}");
            }
        }
        if let Some(at) = snapshot.authenticated_at {
            println!("since: {}", at.to_rfc3339());
        }
        if let Some(error) = &snapshot.error {
            println!("last error: {error}");
        }
        Ok(())
    }

    /// Lists the views the current session may open.
    pub async fn routes(&self) -> Result<(), ConsoleError> {
        let ctx = self.session.snapshot().await.access_context();
        let accessible = self.routes.accessible(&self.guard, &ctx);
        if self.json {
            let paths: Vec<&str> = accessible.iter().map(|r| r.path()).collect();
            return print_json(&paths);
        }
        for route in accessible {
            println!("{:<12} {}", route.path(), route.title());
        }
        Ok(())
    }

    pub async fn can(&self, path: &str) -> Result<(), ConsoleError> {
        let decision = self.decide(path).await;
        if self.json {
            return print_json(&decision);
        }
        match decision {
            GuardDecision::Allow => println!("allow {path}"),
            GuardDecision::RedirectToLogin { to } | GuardDecision::Redirect { to } => {
                println!("deny {path} -> {to}");
            }
        }
        Ok(())
    }

    pub async fn list(
        &self,
        kind: EntityKind,
        filters: &[(String, String)],
    ) -> Result<(), ConsoleError> {
        self.require(kind).await?;
        let query: Vec<(&str, &str)> = filters
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let items = kind.list(self.session.api(), &query).await?;
        print_json(&items)
    }

    pub async fn get(&self, kind: EntityKind, id: &str) -> Result<(), ConsoleError> {
        self.require(kind).await?;
        let item = kind.get(self.session.api(), id).await?;
        print_json(&item)
    }

    pub async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), ConsoleError> {
        self.require(kind).await?;
        kind.delete(self.session.api(), id).await?;
        println!("deleted {id}");
        Ok(())
    }

    async fn decide(&self, path: &str) -> GuardDecision {
        let snapshot: SessionSnapshot = self.session.snapshot().await;
        self.routes
            .check(&self.guard, &snapshot.access_context(), path)
    }

    /// Applies the route guard of the entity's view.
    async fn require(&self, kind: EntityKind) -> Result<(), ConsoleError> {
        let path = kind.view_path();
        match self.decide(path).await {
            GuardDecision::Allow => Ok(()),
            GuardDecision::RedirectToLogin { to } | GuardDecision::Redirect { to } => {
                debug!(path, redirect = %to, "entity command refused by route guard");
                Err(ConsoleError::Denied {
                    path: path.to_string(),
                    redirect: to,
                }
                .into())
            }
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), ConsoleError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| ConsoleError::Output {
        details: e.to_string(),
    })?;
    println!("{text}");
    Ok(())
}

/// Parses a `key=value` query filter.
pub fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}
