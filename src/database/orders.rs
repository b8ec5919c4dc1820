/// Sales order CRUD over the data access port
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::port::DataAccess;
use super::values::{format_timestamp, parse_timestamp, QueryParams, Row};
use crate::config::OrdersConfig;
use crate::errors::{DataAccessError, OrderError};
use crate::logger::{self, LogTag};

/// Valid `SalesOrderHeader.Status` codes (in process .. cancelled)
const STATUS_RANGE: std::ops::RangeInclusive<i64> = 1..=6;
const SHIP_METHOD_MAX_LEN: usize = 50;

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Filters for the dashboard order listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub customer_id: Option<i64>,
    pub status: Option<i64>,
    pub limit: usize,
}

impl OrderFilter {
    /// Build from raw query string values.
    ///
    /// A missing or unparseable `limit` falls back to the default; ids that do
    /// not parse are rejected.
    pub fn from_query(
        customer_id: Option<&str>,
        status: Option<&str>,
        limit: Option<&str>,
        bounds: &OrdersConfig,
    ) -> Result<Self, OrderError> {
        let customer_id = parse_optional_int("customerId", customer_id)?;
        let status = parse_optional_int("status", status)?;
        let limit = limit
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(bounds.default_limit)
            .min(bounds.max_limit);

        Ok(Self {
            customer_id,
            status,
            limit,
        })
    }
}

fn parse_optional_int(field: &'static str, raw: Option<&str>) -> Result<Option<i64>, OrderError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| OrderError::invalid(field, format!("'{}' is not an integer", raw))),
    }
}

/// Body of `POST /api/sql/orders`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewOrder {
    #[serde(rename = "CustomerID")]
    pub customer_id: Option<i64>,
    #[serde(rename = "OrderDate")]
    pub order_date: Option<String>,
    #[serde(rename = "DueDate")]
    pub due_date: Option<String>,
    #[serde(rename = "ShipMethod")]
    pub ship_method: Option<String>,
    #[serde(rename = "SubTotal")]
    pub sub_total: Option<f64>,
    #[serde(rename = "TaxAmt")]
    pub tax_amt: Option<f64>,
    #[serde(rename = "Freight")]
    pub freight: Option<f64>,
    #[serde(rename = "TotalDue")]
    pub total_due: Option<f64>,
}

/// Body of `PUT /api/sql/orders/:orderId`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderUpdate {
    #[serde(rename = "Status")]
    pub status: Option<i64>,
    #[serde(rename = "ShipMethod")]
    pub ship_method: Option<String>,
}

/// Order header with its line items
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub header: Row,
    pub items: Vec<Row>,
}

fn validate_ship_method(ship_method: &Option<String>) -> Result<(), OrderError> {
    if let Some(method) = ship_method {
        if method.trim().is_empty() {
            return Err(OrderError::invalid("ShipMethod", "must not be empty"));
        }
        if method.chars().count() > SHIP_METHOD_MAX_LEN {
            return Err(OrderError::invalid(
                "ShipMethod",
                format!("must be at most {} characters", SHIP_METHOD_MAX_LEN),
            ));
        }
    }
    Ok(())
}

fn normalize_date(field: &'static str, raw: &str) -> Result<String, OrderError> {
    parse_timestamp(raw.trim())
        .map(|dt| format_timestamp(&dt))
        .ok_or_else(|| OrderError::invalid(field, format!("'{}' is not a valid date", raw)))
}

// =============================================================================
// REPOSITORY
// =============================================================================

const DASHBOARD_ORDERS_SQL: &str = "
SELECT
    soh.SalesOrderID,
    soh.OrderDate,
    soh.Status,
    c.FirstName || ' ' || c.LastName AS CustomerName,
    a.City, a.StateProvince, a.CountryRegion,
    p.Name AS ProductName,
    sod.OrderQty, sod.UnitPrice, sod.LineTotal
FROM SalesOrderHeader soh
JOIN Customer c ON soh.CustomerID = c.CustomerID
JOIN CustomerAddress ca ON c.CustomerID = ca.CustomerID
JOIN Address a ON ca.AddressID = a.AddressID
JOIN SalesOrderDetail sod ON soh.SalesOrderID = sod.SalesOrderID
JOIN Product p ON sod.ProductID = p.ProductID";

const INSERT_ORDER_SQL: &str = "
INSERT INTO SalesOrderHeader
    (RevisionNumber, OrderDate, DueDate, ShipDate, Status, OnlineOrderFlag,
     SalesOrderNumber, PurchaseOrderNumber, AccountNumber, CustomerID,
     ShipToAddressID, BillToAddressID, ShipMethod, SubTotal, TaxAmt, Freight, TotalDue,
     rowguid, ModifiedDate)
VALUES
    (1, :orderDate, :dueDate, NULL, 1, 1,
     :salesOrderNumber, NULL, NULL, :customerId,
     NULL, NULL, :shipMethod, :subTotal, :taxAmt, :freight, :totalDue,
     :rowguid, :modifiedDate)
RETURNING SalesOrderID";

const ORDER_HEADER_SQL: &str = "SELECT * FROM SalesOrderHeader WHERE SalesOrderID = :orderId";

const ORDER_ITEMS_SQL: &str = "
SELECT p.Name AS ProductName, sod.OrderQty, sod.UnitPrice, sod.LineTotal
FROM SalesOrderDetail sod
JOIN Product p ON sod.ProductID = p.ProductID
WHERE sod.SalesOrderID = :orderId
ORDER BY sod.SalesOrderDetailID";

const UPDATE_ORDER_SQL: &str = "
UPDATE SalesOrderHeader
SET Status = COALESCE(:status, Status),
    ShipMethod = COALESCE(:shipMethod, ShipMethod),
    ModifiedDate = :modifiedDate
WHERE SalesOrderID = :orderId";

/// Order CRUD operations
#[derive(Clone)]
pub struct OrderRepository {
    port: Arc<dyn DataAccess>,
    bounds: OrdersConfig,
}

impl OrderRepository {
    pub fn new(port: Arc<dyn DataAccess>, bounds: OrdersConfig) -> Self {
        Self { port, bounds }
    }

    pub fn bounds(&self) -> &OrdersConfig {
        &self.bounds
    }

    /// Joined order lines for the dashboard table, newest orders first
    pub async fn list_dashboard_orders(&self, filter: &OrderFilter) -> Result<Vec<Row>, DataAccessError> {
        let mut clauses = Vec::new();
        let mut params = QueryParams::new();
        if let Some(customer_id) = filter.customer_id {
            clauses.push("soh.CustomerID = :customerId");
            params = params.bind("customerId", customer_id);
        }
        if let Some(status) = filter.status {
            clauses.push("soh.Status = :status");
            params = params.bind("status", status);
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "{}{} ORDER BY soh.OrderDate DESC, soh.SalesOrderID DESC, sod.SalesOrderDetailID LIMIT :limit",
            DASHBOARD_ORDERS_SQL, where_sql
        );
        let limit = filter.limit.min(self.bounds.max_limit) as i64;

        self.port.execute(&sql, params.bind("limit", limit)).await
    }

    /// Insert an order header; returns the new `SalesOrderID`
    pub async fn create_order(&self, order: NewOrder) -> Result<i64, OrderError> {
        let mut missing = Vec::new();
        if order.customer_id.is_none() {
            missing.push("CustomerID");
        }
        if order.order_date.as_deref().map_or(true, |d| d.trim().is_empty()) {
            missing.push("OrderDate");
        }
        if order.total_due.is_none() {
            missing.push("TotalDue");
        }
        if !missing.is_empty() {
            return Err(OrderError::MissingFields(missing));
        }

        let customer_id = order.customer_id.unwrap_or_default();
        if customer_id <= 0 {
            return Err(OrderError::invalid("CustomerID", "must be a positive integer"));
        }
        let order_date = normalize_date("OrderDate", order.order_date.as_deref().unwrap_or_default())?;
        let due_date = order
            .due_date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(|d| normalize_date("DueDate", d))
            .transpose()?;
        validate_ship_method(&order.ship_method)?;
        for (field, amount) in [
            ("SubTotal", order.sub_total),
            ("TaxAmt", order.tax_amt),
            ("Freight", order.freight),
            ("TotalDue", order.total_due),
        ] {
            if amount.map_or(false, |v| !v.is_finite() || v < 0.0) {
                return Err(OrderError::invalid(field, "must be a non-negative amount"));
            }
        }

        let exists = self
            .port
            .execute(
                "SELECT 1 AS found FROM Customer WHERE CustomerID = :customerId",
                QueryParams::new().bind("customerId", customer_id),
            )
            .await?;
        if exists.is_empty() {
            return Err(OrderError::invalid(
                "CustomerID",
                format!("customer {} does not exist", customer_id),
            ));
        }

        let params = QueryParams::new()
            .bind("orderDate", order_date)
            .bind("dueDate", due_date)
            .bind("salesOrderNumber", format!("SO{}", uuid::Uuid::new_v4()))
            .bind("customerId", customer_id)
            .bind("shipMethod", order.ship_method.map(|m| m.trim().to_string()))
            .bind("subTotal", order.sub_total.unwrap_or(0.0))
            .bind("taxAmt", order.tax_amt.unwrap_or(0.0))
            .bind("freight", order.freight.unwrap_or(0.0))
            .bind("totalDue", order.total_due.unwrap_or_default())
            .bind("rowguid", uuid::Uuid::new_v4().to_string())
            .bind("modifiedDate", Utc::now());

        let rows = self.port.execute(INSERT_ORDER_SQL, params).await?;
        let id = rows
            .first()
            .ok_or_else(|| DataAccessError::MissingColumn("SalesOrderID".to_string()))?
            .i64("SalesOrderID")?;

        logger::info(
            LogTag::Database,
            &format!("Created order {} for customer {}", id, customer_id),
        );
        Ok(id)
    }

    /// Header plus line items, `None` when the order does not exist
    pub async fn get_order(&self, order_id: i64) -> Result<Option<OrderDetails>, DataAccessError> {
        let params = QueryParams::new().bind("orderId", order_id);
        let (headers, items) = tokio::try_join!(
            self.port.execute(ORDER_HEADER_SQL, params.clone()),
            self.port.execute(ORDER_ITEMS_SQL, params),
        )?;

        Ok(headers
            .into_iter()
            .next()
            .map(|header| OrderDetails { header, items }))
    }

    /// Change status and/or ship method; `false` when the order does not exist
    pub async fn update_order(&self, order_id: i64, update: OrderUpdate) -> Result<bool, OrderError> {
        if update.status.is_none() && update.ship_method.is_none() {
            return Err(OrderError::EmptyUpdate);
        }
        if let Some(status) = update.status {
            if !STATUS_RANGE.contains(&status) {
                return Err(OrderError::invalid(
                    "Status",
                    format!(
                        "must be between {} and {}",
                        STATUS_RANGE.start(),
                        STATUS_RANGE.end()
                    ),
                ));
            }
        }
        validate_ship_method(&update.ship_method)?;

        let params = QueryParams::new()
            .bind("status", update.status)
            .bind("shipMethod", update.ship_method.map(|m| m.trim().to_string()))
            .bind("modifiedDate", Utc::now())
            .bind("orderId", order_id);
        let affected = self.port.execute_write(UPDATE_ORDER_SQL, params).await?;

        if affected > 0 {
            logger::info(LogTag::Database, &format!("Updated order {}", order_id));
        }
        Ok(affected > 0)
    }

    /// Remove an order and its lines; `false` when the order does not exist
    pub async fn delete_order(&self, order_id: i64) -> Result<bool, DataAccessError> {
        let params = QueryParams::new().bind("orderId", order_id);
        let affected = self
            .port
            .execute_batch(vec![
                (
                    "DELETE FROM SalesOrderDetail WHERE SalesOrderID = :orderId".to_string(),
                    params.clone(),
                ),
                (
                    "DELETE FROM SalesOrderHeader WHERE SalesOrderID = :orderId".to_string(),
                    params,
                ),
            ])
            .await?;

        let deleted = affected.get(1).copied().unwrap_or(0) > 0;
        if deleted {
            logger::info(LogTag::Database, &format!("Deleted order {}", order_id));
        }
        Ok(deleted)
    }
}
