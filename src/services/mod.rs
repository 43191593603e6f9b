// All service modules
pub mod cache_gateway;
pub mod goal_service;
pub mod user_service;
pub mod wallet_service;

// Re-export for convenience
pub use cache_gateway::{CacheGateway, CacheStore, RedisCacheStore};
pub use goal_service::GoalService;
pub use user_service::UserService;
pub use wallet_service::WalletService;
