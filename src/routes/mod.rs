/// Router Module Index
///
/// Organizes the application's routing into policy-segregated modules. Each
/// protected module maps to exactly one entry in the central role policy table
/// (`policy.rs`); the auth gate with that policy is attached once per module
/// in `create_router`, so no individual route can forget its access rule.

/// Unauthenticated routes: health probe and the login gateway.
pub mod public;

/// Read routes, gated by `policy::TRAIL_READ` (Admin and User).
pub mod authenticated;

/// Mutating routes, gated by `policy::TRAIL_MUTATE` (Admin only).
pub mod admin;
