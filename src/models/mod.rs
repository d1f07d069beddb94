//! Data models for the UniUnity content management backend.
//!
//! Wire names are camelCase to match the admin console's TypeScript interfaces.

mod admin;
mod post;
mod site_config;

pub use admin::*;
pub use post::*;
pub use site_config::*;
