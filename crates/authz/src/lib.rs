//! Authorization hooks: who the caller is and what they may do.
//!
//! Handlers never check roles themselves. The HTTP layer resolves a
//! [`Principal`] from the bearer token and calls [`authorize`] with the
//! [`Capability`] a route requires before the handler runs.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use bookshop_kernel::settings::AuthSettings;

/// Role attached to a resolved principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

/// Operation classes a route can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageCatalog,
    ManageStock,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageCatalog => "manage_catalog",
            Capability::ManageStock => "manage_stock",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Role {
    /// Capabilities granted to this role.
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Admin => &[Capability::ManageCatalog, Capability::ManageStock],
            // The storefront is public; customers hold no admin capability.
            Role::Customer => &[],
        }
    }
}

/// A caller whose token has been resolved to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub role: Role,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("missing or unknown bearer token")]
    Unauthenticated,

    #[error("forbidden: missing capability '{0}'")]
    Forbidden(Capability),
}

/// Pure policy check. No IO.
pub fn authorize(principal: &Principal, required: Capability) -> Result<(), AuthzError> {
    if principal.role.capabilities().contains(&required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required))
    }
}

/// Maps static bearer tokens to principals.
#[derive(Debug, Clone, Default)]
pub struct TokenResolver {
    tokens: HashMap<String, Role>,
}

impl TokenResolver {
    pub fn from_settings(settings: &AuthSettings) -> Self {
        let mut tokens = HashMap::new();
        for token in &settings.customer_tokens {
            tokens.insert(token.clone(), Role::Customer);
        }
        // A token listed twice resolves to the stronger role.
        for token in &settings.admin_tokens {
            tokens.insert(token.clone(), Role::Admin);
        }

        if tokens.is_empty() {
            tracing::warn!(target: "bookshop-authz", "no bearer tokens configured; admin routes are closed");
        }

        Self { tokens }
    }

    /// Resolve a raw bearer token. Empty tokens never resolve.
    pub fn resolve(&self, token: &str) -> Result<Principal, AuthzError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthzError::Unauthenticated);
        }
        self.tokens
            .get(token)
            .map(|role| Principal { role: *role })
            .ok_or(AuthzError::Unauthenticated)
    }
}
