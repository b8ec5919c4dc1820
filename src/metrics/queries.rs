/// The five dashboard aggregates
///
/// Each function is read-only and takes the port as its only dependency.
/// Data access failures propagate unchanged. Shaping re-sorts and truncates
/// the bounded lists so ordering never depends on the store honouring
/// `ORDER BY`.
use std::cmp::Ordering;

use super::types::{CustomersMetrics, GeographicEntry, RecentOrder, SalesMetrics, TopProduct};
use super::MetricQuery;
use crate::database::{DataAccess, QueryParams, Row};
use crate::errors::DataAccessError;

pub const SALES_SUMMARY_SQL: &str = "
SELECT
    COUNT(*) AS totalOrders,
    COALESCE(SUM(TotalDue), 0) AS totalRevenue,
    COALESCE(AVG(TotalDue), 0) AS avgOrderValue,
    MIN(OrderDate) AS firstOrderDate,
    MAX(OrderDate) AS lastOrderDate
FROM SalesOrderHeader";

pub const TOP_PRODUCTS_SQL: &str = "
SELECT
    p.Name AS productName,
    SUM(sod.OrderQty) AS totalQuantity,
    SUM(sod.LineTotal) AS totalRevenue
FROM SalesOrderDetail sod
JOIN Product p ON sod.ProductID = p.ProductID
GROUP BY p.ProductID, p.Name
ORDER BY totalRevenue DESC
LIMIT :limit";

// Orders without a ship-to address fall back to the customer's first address
pub const RECENT_ORDERS_SQL: &str = "
SELECT
    soh.SalesOrderID AS orderId,
    soh.OrderDate AS orderDate,
    soh.TotalDue AS totalDue,
    c.FirstName || ' ' || c.LastName AS customerName,
    a.City AS city
FROM SalesOrderHeader soh
JOIN Customer c ON soh.CustomerID = c.CustomerID
LEFT JOIN Address a ON a.AddressID = COALESCE(
    soh.ShipToAddressID,
    (SELECT MIN(ca.AddressID) FROM CustomerAddress ca WHERE ca.CustomerID = soh.CustomerID)
)
ORDER BY soh.OrderDate DESC, soh.SalesOrderID DESC
LIMIT :limit";

pub const CUSTOMER_SUMMARY_SQL: &str = "
SELECT
    COUNT(*) AS totalCustomers,
    (SELECT COUNT(DISTINCT CustomerID) FROM SalesOrderHeader) AS customersWithOrders,
    COALESCE(SUM(CASE WHEN TRIM(COALESCE(CompanyName, '')) <> '' THEN 1 ELSE 0 END), 0) AS businessCustomers,
    COALESCE(SUM(CASE WHEN TRIM(COALESCE(CompanyName, '')) = '' THEN 1 ELSE 0 END), 0) AS individualCustomers
FROM Customer";

pub const GEOGRAPHIC_BREAKDOWN_SQL: &str = "
SELECT
    a.CountryRegion AS country,
    a.StateProvince AS stateProvince,
    COUNT(DISTINCT soh.SalesOrderID) AS orderCount,
    SUM(soh.TotalDue) AS totalRevenue
FROM SalesOrderHeader soh
JOIN Address a ON a.AddressID = COALESCE(
    soh.ShipToAddressID,
    (SELECT MIN(ca.AddressID) FROM CustomerAddress ca WHERE ca.CustomerID = soh.CustomerID)
)
GROUP BY a.CountryRegion, a.StateProvince
ORDER BY totalRevenue DESC";

/// Statement text issued for a query
pub fn sql_for(query: MetricQuery) -> &'static str {
    match query {
        MetricQuery::SalesSummary => SALES_SUMMARY_SQL,
        MetricQuery::TopProducts => TOP_PRODUCTS_SQL,
        MetricQuery::RecentOrders => RECENT_ORDERS_SQL,
        MetricQuery::CustomerSummary => CUSTOMER_SUMMARY_SQL,
        MetricQuery::GeographicBreakdown => GEOGRAPHIC_BREAKDOWN_SQL,
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn single_row(rows: Vec<Row>, query: MetricQuery) -> Result<Row, DataAccessError> {
    rows.into_iter().next().ok_or_else(|| {
        DataAccessError::decode(query.as_str(), "aggregate query returned no rows")
    })
}

pub async fn sales_summary(port: &dyn DataAccess) -> Result<SalesMetrics, DataAccessError> {
    let rows = port.execute(SALES_SUMMARY_SQL, QueryParams::new()).await?;
    shape_sales_summary(rows)
}

pub async fn top_products(port: &dyn DataAccess, limit: usize) -> Result<Vec<TopProduct>, DataAccessError> {
    let params = QueryParams::new().bind("limit", limit as i64);
    let rows = port.execute(TOP_PRODUCTS_SQL, params).await?;
    shape_top_products(rows, limit)
}

pub async fn recent_orders(port: &dyn DataAccess, limit: usize) -> Result<Vec<RecentOrder>, DataAccessError> {
    let params = QueryParams::new().bind("limit", limit as i64);
    let rows = port.execute(RECENT_ORDERS_SQL, params).await?;
    shape_recent_orders(rows, limit)
}

pub async fn customer_summary(port: &dyn DataAccess) -> Result<CustomersMetrics, DataAccessError> {
    let rows = port.execute(CUSTOMER_SUMMARY_SQL, QueryParams::new()).await?;
    shape_customer_summary(rows)
}

pub async fn geographic_breakdown(port: &dyn DataAccess) -> Result<Vec<GeographicEntry>, DataAccessError> {
    let rows = port.execute(GEOGRAPHIC_BREAKDOWN_SQL, QueryParams::new()).await?;
    shape_geographic_breakdown(rows)
}

// =============================================================================
// SHAPING
// =============================================================================

fn shape_sales_summary(rows: Vec<Row>) -> Result<SalesMetrics, DataAccessError> {
    let row = single_row(rows, MetricQuery::SalesSummary)?;
    Ok(SalesMetrics {
        total_orders: row.i64("totalOrders")?,
        total_revenue: row.f64("totalRevenue")?,
        avg_order_value: row.f64("avgOrderValue")?,
        first_order_date: row.opt_datetime("firstOrderDate")?,
        last_order_date: row.opt_datetime("lastOrderDate")?,
    })
}

fn shape_top_products(rows: Vec<Row>, limit: usize) -> Result<Vec<TopProduct>, DataAccessError> {
    let mut products = rows
        .iter()
        .map(|row| {
            Ok(TopProduct {
                product_name: row.text("productName")?,
                total_quantity: row.i64("totalQuantity")?,
                total_revenue: row.f64("totalRevenue")?,
            })
        })
        .collect::<Result<Vec<_>, DataAccessError>>()?;

    products.sort_by(|a, b| descending(a.total_revenue, b.total_revenue));
    products.truncate(limit);
    Ok(products)
}

fn shape_recent_orders(rows: Vec<Row>, limit: usize) -> Result<Vec<RecentOrder>, DataAccessError> {
    let mut orders = rows
        .iter()
        .map(|row| {
            Ok(RecentOrder {
                order_id: row.i64("orderId")?,
                order_date: row.datetime("orderDate")?,
                total_due: row.f64("totalDue")?,
                customer_name: row.text("customerName")?,
                city: row.opt_text("city")?,
            })
        })
        .collect::<Result<Vec<_>, DataAccessError>>()?;

    orders.sort_by(|a, b| {
        b.order_date
            .cmp(&a.order_date)
            .then_with(|| b.order_id.cmp(&a.order_id))
    });
    orders.truncate(limit);
    Ok(orders)
}

fn shape_customer_summary(rows: Vec<Row>) -> Result<CustomersMetrics, DataAccessError> {
    let row = single_row(rows, MetricQuery::CustomerSummary)?;
    Ok(CustomersMetrics {
        total_customers: row.i64("totalCustomers")?,
        customers_with_orders: row.i64("customersWithOrders")?,
        business_customers: row.i64("businessCustomers")?,
        individual_customers: row.i64("individualCustomers")?,
    })
}

fn shape_geographic_breakdown(rows: Vec<Row>) -> Result<Vec<GeographicEntry>, DataAccessError> {
    let mut entries = rows
        .iter()
        .map(|row| {
            Ok(GeographicEntry {
                country: row.text("country")?,
                state_province: row.text("stateProvince")?,
                order_count: row.i64("orderCount")?,
                total_revenue: row.f64("totalRevenue")?,
            })
        })
        .collect::<Result<Vec<_>, DataAccessError>>()?;

    entries.sort_by(|a, b| descending(a.total_revenue, b.total_revenue));
    Ok(entries)
}
