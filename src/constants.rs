/// Application constants

// API version
pub const API_VERSION: &str = "v1";

// Goals
pub const DEFAULT_GOAL_STATUS: &str = "active";

// Users
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 32;
pub const DEFAULT_USER_TIER: &str = "free";

// Cache layout (Redis)
pub const WALLET_CACHE_PREFIX: &str = "wallet_data_cache";
pub const WALLET_CACHE_INDEX_KEY: &str = "wallet_data_cache:index";
pub const METADATA_CACHE_KEY: &str = "metadata_cache";
