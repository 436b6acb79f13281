/// Failures of the checkout initiation flow, grouped the way callers report them
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("Room not found")]
    RoomNotFound,

    #[error("Checkout provider failure: {0}")]
    Upstream(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl CheckoutError {
    pub fn missing_fields() -> Self {
        CheckoutError::Validation("Missing required fields".to_string())
    }
}
