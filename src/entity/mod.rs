//! Entity module for database models

pub mod agents;
pub mod api_keys;
pub mod prelude;
pub mod projects;
pub mod sponsored_spots;
pub mod subscriptions;
pub mod upvotes;
