//! Wire `Error` message
//!
//! Sent by either side when a request cannot be processed. An `errorCode` of
//! 6 names the version the peer is willing to use in `errorDetail`, which
//! drives version renegotiation.

crate::define_error_message!(ErrorMessage, "Error", "threeds.Error");
