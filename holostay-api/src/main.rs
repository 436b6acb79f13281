use std::net::SocketAddr;
use std::sync::Arc;
use holostay_api::{app, state::{AppState, CheckoutSettings}};
use holostay_api::middleware::JwtIdentityResolver;
use holostay_checkout::{MockCheckoutProvider, WebhookVerifier};
use holostay_core::payment::CheckoutProvider;
use holostay_core::repository::{BookingRepository, PaymentRepository, RoomRepository};
use holostay_store::app_config::{Config, PaymentProviderKind, StoreBackend};
use holostay_store::{
    DbClient, MemoryBookingRepository, MemoryPaymentRepository, MemoryRoomRepository,
    StoreBookingRepository, StorePaymentRepository, StoreRoomRepository, StripeCheckoutClient,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Repositories = (
    Arc<dyn RoomRepository>,
    Arc<dyn BookingRepository>,
    Arc<dyn PaymentRepository>,
);

async fn repositories(config: &Config) -> anyhow::Result<Repositories> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let db = DbClient::connect(&config.database).await?;
            db.migrate().await?;

            let rooms = db.catalog_size().await?;
            if rooms == 0 {
                tracing::warn!("Room catalog is empty");
            } else {
                tracing::info!("Room catalog has {} rooms", rooms);
            }

            Ok((
                Arc::new(StoreRoomRepository::new(db.pool.clone())),
                Arc::new(StoreBookingRepository::new(db.pool.clone())),
                Arc::new(StorePaymentRepository::new(db.pool)),
            ))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; bookings are lost on restart");
            Ok((
                Arc::new(MemoryRoomRepository::seeded()),
                Arc::new(MemoryBookingRepository::new()),
                Arc::new(MemoryPaymentRepository::new()),
            ))
        }
    }
}

fn checkout_provider(config: &Config) -> anyhow::Result<Arc<dyn CheckoutProvider>> {
    let provider: Arc<dyn CheckoutProvider> = match config.payments.provider {
        PaymentProviderKind::Stripe => Arc::new(StripeCheckoutClient::new(
            &config.payments.api_base,
            config.payments.secret_key.clone(),
            config.payments.request_timeout(),
        )?),
        PaymentProviderKind::Mock => {
            tracing::warn!("Using mock checkout provider");
            Arc::new(MockCheckoutProvider::new(&config.checkout.public_url))
        }
    };
    Ok(provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "holostay_api=debug,holostay_checkout=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting HoloStay API on port {}", config.server.port);

    let (rooms, bookings, payments) = repositories(&config).await?;

    let verifier = WebhookVerifier::new(config.payments.webhook_secret.clone())
        .with_tolerance(config.payments.webhook_tolerance()?);
    let identity = Arc::new(JwtIdentityResolver::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_audience.clone(),
    ));

    let app_state = AppState::new(
        rooms,
        bookings,
        payments,
        identity,
        checkout_provider(&config)?,
        verifier,
        CheckoutSettings {
            public_url: config.checkout.public_url.clone(),
            currency: config.payments.currency.clone(),
            enforce_server_pricing: config.checkout.enforce_server_pricing,
        },
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
