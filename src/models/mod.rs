// src/models/mod.rs
pub mod cache;
pub mod goal;
pub mod response;
pub mod user;
pub mod wallet;

// Re-export commonly used types so other modules can use `crate::models::X`
pub use cache::{CacheEntry, CacheStats};
pub use goal::{
    CreateGoalRequest, Goal, GoalResponse, GoalType, UpdateGoalRequest, UpdateProgressRequest,
};
pub use response::ApiResponse;
pub use user::{CreateUserRequest, User, UserTier};
pub use wallet::{CreateWalletRequest, UpdateWalletRequest, Wallet};
