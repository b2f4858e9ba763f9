pub mod logging;
pub mod relay;
pub mod signer;
pub mod storage;
