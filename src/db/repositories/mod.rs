// Database repository management

mod agent_repository;
mod project_repository;
mod sponsored_repository;
mod subscription_repository;

pub use agent_repository::AgentRepository;
pub use project_repository::{ProjectRepository, ProjectSort};
pub use sponsored_repository::SponsoredRepository;
pub use subscription_repository::SubscriptionRepository;

use sea_orm::DatabaseConnection;

/// Container for all database repositories
pub struct Repositories {
    pub agents: AgentRepository,
    pub projects: ProjectRepository,
    pub sponsored: SponsoredRepository,
    pub subscriptions: SubscriptionRepository,
}

impl Repositories {
    /// Creates a new repositories container sharing one connection pool
    pub fn new(conn: DatabaseConnection) -> Self {
        Repositories {
            agents: AgentRepository::new(conn.clone()),
            projects: ProjectRepository::new(conn.clone()),
            sponsored: SponsoredRepository::new(conn.clone()),
            subscriptions: SubscriptionRepository::new(conn),
        }
    }
}
