pub mod aircraft;
pub mod engine;
pub mod memory;
pub mod repository;
pub mod selector;
pub mod voucher;

pub use aircraft::Aircraft;
pub use engine::{AssignmentRules, VoucherEngine};
pub use memory::MemoryVoucherStore;
pub use repository::VoucherStore;
pub use voucher::{AssignmentRequest, Voucher};

#[derive(Debug, thiserror::Error)]
pub enum VoucherError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

pub type VoucherResult<T> = Result<T, VoucherError>;
