//! Auth-domain identifiers, token pairs, and the normalized user record.

pub mod id;
pub mod token;
pub mod user;

pub use id::*;
pub use token::{secret::*, *};
pub use user::*;
