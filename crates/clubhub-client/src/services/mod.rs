//! Endpoint wrappers over the request pipeline.

pub mod auth;
pub mod resources;

pub use auth::{AuthService, LoginData};
pub use resources::{AdminApi, CoachApi, MemberApi, RoleApi};
