pub mod audit;
pub mod expense;
pub mod group;
pub mod member;
pub mod settlement;
pub mod transfer;

pub use audit::{AppLog, GroupAudit};
pub use expense::Expense;
pub use group::Group;
pub use member::Member;
pub use settlement::{SettlementBatch, SettlementStatus};
pub use transfer::Transfer;
