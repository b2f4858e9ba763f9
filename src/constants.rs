// Audit actions recorded against a group
pub const GROUP_CREATED: &str = "GROUP_CREATED";
pub const MEMBER_ADDED: &str = "MEMBER_ADDED";
pub const MEMBER_JOINED: &str = "MEMBER_JOINED";
pub const EXPENSE_ADDED: &str = "EXPENSE_ADDED";
pub const SETTLEMENT_CONFIRMED: &str = "SETTLEMENT_CONFIRMED";
pub const SETTLEMENT_FAILED: &str = "SETTLEMENT_FAILED";
pub const INVITE_ISSUED: &str = "INVITE_ISSUED";

/// Balances within this distance of zero are treated as settled.
pub const BALANCE_EPSILON: f64 = 0.0001;

/// Transfers are quantized to this many decimal places.
pub const TRANSFER_DECIMALS: i32 = 2;

pub const USDC_DECIMALS: u32 = 6;
pub const APT_DECIMALS: u32 = 8;
pub const DEFAULT_DECIMALS: u32 = USDC_DECIMALS;

/// Discriminator carried in every group invite payload.
pub const INVITE_TYPE: &str = "bundleflow_group";

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Application log entries kept in memory before the oldest are evicted.
pub const MAX_APP_LOG_ENTRIES: usize = 10_000;
