//! Merchant interface messages (`MPI_Interface/<type>`)

pub mod authorization;
pub mod error;
pub mod verification;

pub use authorization::{PaymentAuthReq, PaymentAuthRes};
pub use error::MpiError;
pub use verification::{PaymentVerifReq, PaymentVerifRes};
