//! The role policy table.
//!
//! One central mapping from operation class to permitted roles, referenced by
//! every gated route registration in `create_router`. Read endpoints admit both
//! roles; mutating endpoints admit Admin only. Nothing else in the crate is
//! allowed to hard-code a role comparison.

use crate::auth::Role;

/// Roles permitted on read endpoints: trail and point listing, features, logs.
pub const TRAIL_READ: &[Role] = &[Role::Admin, Role::User];

/// Roles permitted on mutating endpoints: create/update/delete of trails and
/// location points.
pub const TRAIL_MUTATE: &[Role] = &[Role::Admin];

/// Membership check used by the auth gate. An empty set places no role
/// restriction beyond authentication itself.
pub fn permits(allowed: &[Role], role: Role) -> bool {
    allowed.is_empty() || allowed.contains(&role)
}
