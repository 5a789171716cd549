// Service layer business logic

pub mod auth_service;
pub mod payment_service;
pub mod project_service;
pub mod rate_limit_service;
pub mod sponsored_service;
pub mod subscription_service;
