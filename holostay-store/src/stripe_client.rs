use async_trait::async_trait;
use std::time::Duration;
use serde::Deserialize;
use holostay_core::payment::{CheckoutProvider, CheckoutSession, CheckoutSessionRequest};
use holostay_shared::Masked;

/// Hosted-checkout client speaking the provider's form-encoded REST API
pub struct StripeCheckoutClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: Masked<String>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    type_: Option<String>,
}

impl StripeCheckoutClient {
    /// `timeout` bounds each provider call so a stalled request cannot hold
    /// a checkout open indefinitely
    pub fn new(api_base: &str, secret_key: Masked<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key,
        })
    }

    /// Form fields for a single card line item in payment mode
    pub fn form_fields(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
        let mut fields = vec![
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("mode".to_string(), "payment".to_string()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("line_items[0][price_data][currency]".to_string(), request.currency.clone()),
            ("line_items[0][price_data][unit_amount]".to_string(), request.unit_amount.to_string()),
            ("line_items[0][price_data][product_data][name]".to_string(), request.product_name.clone()),
            ("line_items[0][price_data][product_data][description]".to_string(), request.product_description.clone()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
        ];

        for (key, value) in request.metadata.entries() {
            fields.push((format!("metadata[{}]", key), value.to_string()));
        }

        fields
    }
}

#[async_trait]
impl CheckoutProvider for StripeCheckoutClient {
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(self.secret_key.expose())
            .form(&Self::form_fields(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .map(|e| format!("{}: {}", e.error.type_.unwrap_or_default(), e.error.message.unwrap_or_default()))
                .unwrap_or(body);
            tracing::error!("Checkout session creation failed ({}): {}", status, detail);
            return Err(format!("checkout provider returned {}: {}", status, detail).into());
        }

        let session: SessionResponse = response.json().await?;
        tracing::info!("Created checkout session {}", session.id);

        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holostay_core::payment::CorrelationMetadata;
    use uuid::Uuid;

    #[test]
    fn test_form_fields_carry_amount_and_metadata() {
        let booking_id = Uuid::new_v4();
        let request = CheckoutSessionRequest {
            product_name: "Jedi Suite".to_string(),
            product_description: "Coruscant District, New York • 2024-02-15 to 2024-02-18".to_string(),
            unit_amount: 45000,
            currency: "usd".to_string(),
            success_url: "https://holostay.test/booking-success?session_id={CHECKOUT_SESSION_ID}".to_string(),
            cancel_url: "https://holostay.test/booking-cancelled".to_string(),
            metadata: CorrelationMetadata::new(booking_id, Uuid::new_v4(), Uuid::new_v4()),
        };

        let fields = StripeCheckoutClient::form_fields(&request);
        let get = |key: &str| fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("45000"));
        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("metadata[booking_id]"), Some(booking_id.to_string().as_str()));
        assert!(get("metadata[user_id]").is_some());
        assert!(get("metadata[room_id]").is_some());
    }

    #[tokio::test]
    async fn test_stalled_provider_times_out() {
        // Accepts the connection but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = StripeCheckoutClient::new(
            &format!("http://{}", addr),
            Masked::from("sk_test_123"),
            Duration::from_millis(200),
        )
        .unwrap();

        let request = CheckoutSessionRequest {
            product_name: "Jedi Suite".to_string(),
            product_description: "Coruscant District, New York".to_string(),
            unit_amount: 45000,
            currency: "usd".to_string(),
            success_url: "https://holostay.test/booking-success".to_string(),
            cancel_url: "https://holostay.test/booking-cancelled".to_string(),
            metadata: CorrelationMetadata::default(),
        };

        let result = tokio::time::timeout(Duration::from_secs(5), client.create_session(&request))
            .await
            .expect("client should give up before the outer deadline");
        assert!(result.is_err());
    }
}
