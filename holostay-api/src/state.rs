use std::sync::Arc;
use holostay_checkout::{CheckoutInitiator, PaymentReconciler, WebhookVerifier};
use holostay_core::identity::IdentityResolver;
use holostay_core::payment::CheckoutProvider;
use holostay_core::repository::{BookingRepository, PaymentRepository, RoomRepository};

#[derive(Clone)]
pub struct CheckoutSettings {
    /// Redirect origin used when the caller sends no Origin header
    pub public_url: String,
    pub currency: String,
    pub enforce_server_pricing: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<dyn RoomRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub identity: Arc<dyn IdentityResolver>,
    pub initiator: Arc<CheckoutInitiator>,
    pub reconciler: Arc<PaymentReconciler>,
    pub public_url: String,
}

impl AppState {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        bookings: Arc<dyn BookingRepository>,
        payments: Arc<dyn PaymentRepository>,
        identity: Arc<dyn IdentityResolver>,
        provider: Arc<dyn CheckoutProvider>,
        verifier: WebhookVerifier,
        settings: CheckoutSettings,
    ) -> Self {
        let initiator = CheckoutInitiator::new(rooms.clone(), bookings.clone(), payments.clone(), provider)
            .with_currency(&settings.currency)
            .with_server_pricing(settings.enforce_server_pricing);
        let reconciler = PaymentReconciler::new(verifier, bookings.clone(), payments.clone());

        Self {
            rooms,
            bookings,
            payments,
            identity,
            initiator: Arc::new(initiator),
            reconciler: Arc::new(reconciler),
            public_url: settings.public_url,
        }
    }
}
