//! REST implementations of the users and orders collaborators.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use brickyard_commerce::{AddressId, CreatedOrder, OrderRequest, ShippingAddress};
use brickyard_data::{FetchClient, Response};

use crate::collaborators::{OrdersApi, SavedAddressRecord, UsersApi};
use crate::config::CheckoutConfig;
use crate::error::{ApiError, CheckoutError, VerificationKind};

/// Header carrying the per-session dedup key on order creation.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Build the HTTP client for the marketplace API from config.
pub fn client_from_config(config: &CheckoutConfig) -> Result<FetchClient, CheckoutError> {
    let client = FetchClient::with_policy(config.fetch_policy())
        .map_err(|e| CheckoutError::Config(e.to_string()))?
        .with_base_url(config.api.base_url.trim())
        .with_default_header("Accept", "application/json");

    Ok(match &config.api.token {
        Some(token) => client.with_bearer_token(token),
        None => client,
    })
}

/// Error payload returned by the marketplace API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    requires_verification: bool,
    #[serde(default)]
    verification_type: Option<String>,
}

/// Decode a non-2xx response into an [`ApiError`].
///
/// A verification demand without a recognizable type is treated as phone
/// verification, the check the marketplace requires first.
pub(crate) fn decode_error(response: &Response) -> ApiError {
    let body: Option<ErrorBody> = response.json_lossy();
    let message = body
        .as_ref()
        .and_then(|b| b.message.clone())
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status {}", response.status));

    let error = ApiError::new(response.status, message);
    match body {
        Some(b) if b.requires_verification => {
            let kind = b
                .verification_type
                .as_deref()
                .and_then(VerificationKind::from_wire)
                .unwrap_or(VerificationKind::Phone);
            error.with_verification(kind)
        }
        _ => error,
    }
}

/// `POST /users/addresses`.
#[derive(Debug, Clone)]
pub struct RestUsersApi {
    client: FetchClient,
}

impl RestUsersApi {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }
}

#[derive(Deserialize)]
struct AddressEnvelope {
    address: WireAddress,
}

#[derive(Deserialize)]
struct WireAddress {
    #[serde(rename = "_id", alias = "id")]
    id: AddressId,
    #[serde(flatten)]
    address: ShippingAddress,
}

#[async_trait]
impl UsersApi for RestUsersApi {
    async fn add_address(&self, address: &ShippingAddress) -> Result<SavedAddressRecord, ApiError> {
        let response = self
            .client
            .post("/users/addresses")
            .json(address)
            .map_err(ApiError::from)?
            .send()
            .await?;

        if !response.is_success() {
            let error = decode_error(&response);
            warn!(status = response.status, error = %error, "address save rejected");
            return Err(error);
        }

        let envelope: AddressEnvelope = response.json().map_err(|e| {
            ApiError::new(response.status, format!("Unexpected address response: {}", e))
        })?;
        debug!(address_id = %envelope.address.id, "address saved");

        Ok(SavedAddressRecord {
            id: envelope.address.id,
            address: envelope.address.address,
        })
    }
}

/// `POST /orders/checkout`.
#[derive(Debug, Clone)]
pub struct RestOrdersApi {
    client: FetchClient,
}

impl RestOrdersApi {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }
}

#[derive(Deserialize)]
struct OrderEnvelope {
    order: CreatedOrder,
}

#[async_trait]
impl OrdersApi for RestOrdersApi {
    async fn checkout(
        &self,
        request: &OrderRequest,
        idempotency_key: &str,
    ) -> Result<CreatedOrder, ApiError> {
        let response = self
            .client
            .post("/orders/checkout")
            .header(IDEMPOTENCY_HEADER, idempotency_key)
            .json(request)
            .map_err(ApiError::from)?
            .send()
            .await?;

        if !response.is_success() {
            let error = decode_error(&response);
            warn!(
                status = response.status,
                verification = ?error.verification,
                error = %error,
                "order creation rejected"
            );
            return Err(error);
        }

        let envelope: OrderEnvelope = response.json().map_err(|e| {
            ApiError::new(response.status, format!("Unexpected order response: {}", e))
        })?;
        Ok(envelope.order)
    }
}
