//! Authenticated principal and its role model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";

/// Capability tier gating dashboards and server-side authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Coach,
    Admin,
    Superadmin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Member, Role::Coach, Role::Admin, Role::Superadmin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Coach => "coach",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "coach" => Ok(Role::Coach),
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::Superadmin),
            other => Err(ClientError::Decode(format!("unknown role '{}'", other))),
        }
    }
}

/// Deterministic avatar URI used when the server supplies none.
pub fn avatar_for(email: &str) -> String {
    format!("{}{}", AVATAR_BASE_URL, email)
}

/// The authenticated principal's profile and authorization attributes.
///
/// `role` is always contained in `roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
    pub avatar: String,
    /// Active (primary) role.
    pub role: Role,
    /// Roles the principal may switch into.
    pub roles: Vec<Role>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
}

impl Identity {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Re-establish `role ∈ roles` after a mutation.
    pub(crate) fn normalize_roles(&mut self) {
        if !self.roles.contains(&self.role) {
            self.roles.insert(0, self.role);
        }
    }

    /// Shallow-merge every populated field of `patch`.
    pub fn apply(&mut self, patch: IdentityPatch) {
        let IdentityPatch {
            email,
            name,
            avatar,
            role,
            roles,
            permissions,
            is_admin,
            phone,
            status,
            branch_id,
        } = patch;

        if let Some(email) = email {
            self.email = email;
        }
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(avatar) = avatar {
            self.avatar = avatar;
        }
        if let Some(role) = role {
            self.role = role;
        }
        if let Some(roles) = roles {
            self.roles = roles;
        }
        if let Some(permissions) = permissions {
            self.permissions = permissions;
        }
        if let Some(is_admin) = is_admin {
            self.is_admin = is_admin;
        }
        if phone.is_some() {
            self.phone = phone;
        }
        if status.is_some() {
            self.status = status;
        }
        if branch_id.is_some() {
            self.branch_id = branch_id;
        }
        self.normalize_roles();
    }
}

/// Partial identity update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<Role>,
    pub roles: Option<Vec<Role>>,
    pub permissions: Option<Vec<String>>,
    pub is_admin: Option<bool>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub branch_id: Option<String>,
}

impl IdentityPatch {
    pub fn is_empty(&self) -> bool {
        *self == IdentityPatch::default()
    }
}

/// User object as returned by `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerUser {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    pub role: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Either a plain id or a populated branch document.
    #[serde(default, alias = "branch")]
    pub branch_id: Option<serde_json::Value>,
}

impl TryFrom<ServerUser> for Identity {
    type Error = ClientError;

    fn try_from(user: ServerUser) -> Result<Self, Self::Error> {
        let role: Role = user.role.parse()?;

        let mut roles: Vec<Role> = Vec::with_capacity(user.roles.len() + 1);
        for raw in &user.roles {
            match raw.parse::<Role>() {
                Ok(r) if !roles.contains(&r) => roles.push(r),
                Ok(_) => {}
                Err(_) => tracing::debug!(role = %raw, "Ignoring unknown role in login payload"),
            }
        }

        let name = match (user.name, user.first_name, user.last_name) {
            (Some(name), _, _) if !name.trim().is_empty() => name,
            (_, Some(first), Some(last)) => format!("{} {}", first, last).trim().to_string(),
            (_, Some(first), None) => first,
            _ => user.email.clone(),
        };

        let avatar = user
            .avatar
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| avatar_for(&user.email));

        let is_admin = user
            .is_admin
            .unwrap_or(matches!(role, Role::Admin | Role::Superadmin));

        let branch_id = match user.branch_id {
            Some(serde_json::Value::String(id)) => Some(id),
            Some(serde_json::Value::Object(branch)) => branch
                .get("_id")
                .or_else(|| branch.get("id"))
                .and_then(|v| v.as_str())
                .map(str::to_string),
            _ => None,
        };

        let mut identity = Identity {
            id: user.id,
            email: user.email,
            name,
            avatar,
            role,
            roles,
            permissions: user.permissions,
            is_admin,
            phone: user.phone,
            status: user.status,
            branch_id,
        };
        identity.normalize_roles();
        Ok(identity)
    }
}
