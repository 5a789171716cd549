//! Prelude module for convenient imports

pub use super::agents::Entity as Agents;
pub use super::api_keys::Entity as ApiKeys;
pub use super::projects::Entity as Projects;
pub use super::sponsored_spots::Entity as SponsoredSpots;
pub use super::subscriptions::Entity as Subscriptions;
pub use super::upvotes::Entity as Upvotes;
