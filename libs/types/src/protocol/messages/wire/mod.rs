//! External 3-D Secure wire messages (`ThreeDSecure/Message/<type>`)

pub mod authentication;
pub mod card_range;
pub mod enrollment;
pub mod error;

pub use authentication::{PAReq, PARes, TransactionResult};
pub use card_range::{CRReq, CRRes};
pub use enrollment::{VEReq, VERes};
pub use error::ErrorMessage;
