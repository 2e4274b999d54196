use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{LoanError, Result};
use crate::types::{CustomerId, Role};

/// authenticated caller identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub customer_id: CustomerId,
    pub role: Role,
}

impl Principal {
    pub fn customer(customer_id: CustomerId) -> Self {
        Self { customer_id, role: Role::Customer }
    }

    pub fn admin(customer_id: CustomerId) -> Self {
        Self { customer_id, role: Role::Admin }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// credentials attached to an incoming request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub bearer_token: Option<String>,
}

impl RequestContext {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self { bearer_token: Some(token.into()) }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// resolves request credentials into a principal; token verification lives behind this seam
pub trait PrincipalResolver {
    fn resolve(&self, ctx: &RequestContext) -> Option<Principal>;
}

/// maps fixed bearer tokens to principals
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticPrincipalResolver {
    tokens: HashMap<String, Principal>,
}

impl StaticPrincipalResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens.insert(token.into(), principal);
        self
    }
}

impl PrincipalResolver for StaticPrincipalResolver {
    fn resolve(&self, ctx: &RequestContext) -> Option<Principal> {
        let token = ctx.bearer_token.as_deref()?;
        if token.is_empty() {
            return None;
        }
        self.tokens.get(token).copied()
    }
}

/// customer-scoped access checks shared by every operation
pub struct AccessGate;

impl AccessGate {
    /// admins reach every customer, customers only themselves
    pub fn can_access(caller: &Principal, target: CustomerId) -> bool {
        caller.is_admin() || caller.customer_id == target
    }

    pub fn ensure(caller: &Principal, target: CustomerId) -> Result<()> {
        if Self::can_access(caller, target) {
            return Ok(());
        }

        tracing::warn!(
            caller_id = caller.customer_id,
            target_id = target,
            "customer access denied"
        );
        Err(LoanError::AccessDenied {
            target,
            caller: Some(caller.customer_id),
        })
    }
}

/// resolve the caller or fail with AuthenticationRequired
pub fn authenticate<R: PrincipalResolver + ?Sized>(
    resolver: &R,
    ctx: &RequestContext,
) -> Result<Principal> {
    resolver.resolve(ctx).ok_or(LoanError::AuthenticationRequired)
}
