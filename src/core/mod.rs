pub mod amount;
pub mod errors;
pub mod invite;
pub mod ledger;
pub mod models;
pub mod reconciler;
pub mod services;
pub mod settlement;
