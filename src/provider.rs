//! Provider-facing configuration (data) and strategies (behavior).
//!
//! `descriptor` exposes validated, immutable [`OAuth1Config`] and [`OAuth2Config`] values
//! built through builders. `strategy` defines [`UserInfoStrategy`], the hook that turns a
//! provider's user-info JSON into a canonical [`UserData`](crate::auth::UserData).

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
