pub mod error;
pub mod initiator;
pub mod signature;
pub mod events;
pub mod reconciler;
pub mod mock;

pub use error::CheckoutError;
pub use initiator::{CheckoutInitiator, CheckoutRequest, CheckoutResponse};
pub use signature::{SignatureError, WebhookVerifier};
pub use events::{EventKind, ProviderEvent};
pub use reconciler::{PaymentReconciler, ReconcileError, ReconcileOutcome};
pub use mock::MockCheckoutProvider;
