//! Terminal rendering.

use anyhow::Result;
use serde::Serialize;

use clubhub_client::Identity;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_identity(identity: &Identity) {
    let roles: Vec<&str> = identity.roles.iter().map(|r| r.as_str()).collect();

    println!("{} <{}>", identity.name, identity.email);
    println!("  id:          {}", identity.id);
    println!("  active role: {}", identity.role);
    println!("  roles:       {}", roles.join(", "));
    if !identity.permissions.is_empty() {
        println!("  permissions: {}", identity.permissions.join(", "));
    }
    if let Some(phone) = &identity.phone {
        println!("  phone:       {}", phone);
    }
    if let Some(status) = &identity.status {
        println!("  status:      {}", status);
    }
    if let Some(branch) = &identity.branch_id {
        println!("  branch:      {}", branch);
    }
    println!("  avatar:      {}", identity.avatar);
}
