//! Well-known role name constants.
//!
//! These must match the seed data in `20261001000001_create_users.sql`.

pub const ROLE_CUSTOMER: &str = "customer";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_ADMIN: &str = "admin";

/// Whether the role may operate counters (staff members and admins).
pub fn can_operate_counters(role: &str) -> bool {
    role == ROLE_STAFF || role == ROLE_ADMIN
}
