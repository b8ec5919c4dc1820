use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order totals across the whole store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesMetrics {
    pub total_orders: i64,
    pub total_revenue: f64,
    pub avg_order_value: f64,
    /// `None` while there are no orders
    pub first_order_date: Option<DateTime<Utc>>,
    pub last_order_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_name: String,
    pub total_quantity: i64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
    pub order_id: i64,
    pub order_date: DateTime<Utc>,
    pub total_due: f64,
    pub customer_name: String,
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomersMetrics {
    pub total_customers: i64,
    pub customers_with_orders: i64,
    /// Customers with a company name
    pub business_customers: i64,
    pub individual_customers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographicEntry {
    pub country: String,
    pub state_province: String,
    pub order_count: i64,
    pub total_revenue: f64,
}

/// Composite dashboard result.
///
/// Built once per aggregation and never mutated afterwards; a refresh
/// replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    pub sales_metrics: SalesMetrics,
    /// Descending by `total_revenue`, bounded
    pub top_products: Vec<TopProduct>,
    /// Descending by `order_date`, bounded
    pub recent_orders: Vec<RecentOrder>,
    pub customers_metrics: CustomersMetrics,
    /// Descending by `total_revenue`
    pub geographic_data: Vec<GeographicEntry>,
    pub last_updated: DateTime<Utc>,
}
