//! Interface `MPIError`: failure report returned to the merchant

crate::define_error_message!(MpiError, "MPIError", "mpi.MPIError");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_codes_are_rendered() {
        let source = MessagingError::abandoned("tx-5", "publisher unavailable");
        let error = MpiError::from_error(&source, "1.0");
        assert_eq!(error.error_code.as_deref(), Some("97"));
        assert_eq!(error.error_message.as_deref(), Some("Transaction abandoned"));
        assert_eq!(error.message_type(), "MPIError");
        assert_eq!(error.code(), Some(ErrorCode::TransactionAbandoned));
    }
}
