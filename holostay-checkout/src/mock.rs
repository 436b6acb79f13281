use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;
use holostay_core::payment::{CheckoutProvider, CheckoutSession, CheckoutSessionRequest};

/// Provider stand-in for local development and tests. Records every request.
pub struct MockCheckoutProvider {
    base_url: String,
    fail: bool,
    requests: Mutex<Vec<CheckoutSessionRequest>>,
}

impl MockCheckoutProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose every call fails, for exercising upstream errors
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    pub async fn requests(&self) -> Vec<CheckoutSessionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl CheckoutProvider for MockCheckoutProvider {
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, Box<dyn std::error::Error + Send + Sync>> {
        self.requests.lock().await.push(request.clone());

        if self.fail {
            return Err("Simulated checkout provider failure".into());
        }

        let id = format!("cs_test_{}", Uuid::new_v4().simple());
        tracing::info!("Mock checkout session {} for {} minor units", id, request.unit_amount);

        Ok(CheckoutSession {
            url: Some(format!("{}/c/pay/{}", self.base_url, id)),
            id,
        })
    }
}
