/// API request type definitions
///
/// Order bodies (`NewOrder`, `OrderUpdate`) live with the order repository.

use serde::Deserialize;

/// Query string of `GET /api/sql/dashboard/orders`
///
/// Kept as raw strings: an unparseable `limit` falls back to the default
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardOrdersQuery {
    #[serde(rename = "customerId")]
    pub customer_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<String>,
}

/// Body of `POST /api/prompts`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendPromptRequest {
    pub prompt: Option<String>,
    pub metadata: Option<serde_json::Value>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}
