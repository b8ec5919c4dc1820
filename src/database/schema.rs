/// Table definitions for the sales and prompt history databases
///
/// The sales tables follow the AdventureWorksLT layout (same table and
/// column names) so the queries also run unchanged against a full AdventureWorksLT copy.
use super::sqlite::SqliteStore;
use crate::errors::DataAccessError;

const SALES_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS Customer (
    CustomerID   INTEGER PRIMARY KEY,
    Title        TEXT,
    FirstName    TEXT NOT NULL,
    LastName     TEXT NOT NULL,
    CompanyName  TEXT,
    EmailAddress TEXT,
    ModifiedDate TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);

CREATE TABLE IF NOT EXISTS Address (
    AddressID     INTEGER PRIMARY KEY,
    AddressLine1  TEXT NOT NULL,
    City          TEXT NOT NULL,
    StateProvince TEXT NOT NULL,
    CountryRegion TEXT NOT NULL,
    PostalCode    TEXT NOT NULL,
    ModifiedDate  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);

CREATE TABLE IF NOT EXISTS CustomerAddress (
    CustomerID  INTEGER NOT NULL REFERENCES Customer(CustomerID),
    AddressID   INTEGER NOT NULL REFERENCES Address(AddressID),
    AddressType TEXT NOT NULL DEFAULT 'Main Office',
    PRIMARY KEY (CustomerID, AddressID)
);

CREATE TABLE IF NOT EXISTS Product (
    ProductID     INTEGER PRIMARY KEY,
    Name          TEXT NOT NULL UNIQUE,
    ProductNumber TEXT NOT NULL UNIQUE,
    Color         TEXT,
    ListPrice     REAL NOT NULL,
    ModifiedDate  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);

CREATE TABLE IF NOT EXISTS SalesOrderHeader (
    SalesOrderID        INTEGER PRIMARY KEY AUTOINCREMENT,
    RevisionNumber      INTEGER NOT NULL DEFAULT 1,
    OrderDate           TEXT NOT NULL,
    DueDate             TEXT,
    ShipDate            TEXT,
    Status              INTEGER NOT NULL DEFAULT 1,
    OnlineOrderFlag     INTEGER NOT NULL DEFAULT 1,
    SalesOrderNumber    TEXT NOT NULL UNIQUE,
    PurchaseOrderNumber TEXT,
    AccountNumber       TEXT,
    CustomerID          INTEGER NOT NULL REFERENCES Customer(CustomerID),
    ShipToAddressID     INTEGER REFERENCES Address(AddressID),
    BillToAddressID     INTEGER REFERENCES Address(AddressID),
    ShipMethod          TEXT,
    SubTotal            REAL NOT NULL DEFAULT 0,
    TaxAmt              REAL NOT NULL DEFAULT 0,
    Freight             REAL NOT NULL DEFAULT 0,
    TotalDue            REAL NOT NULL,
    rowguid             TEXT NOT NULL UNIQUE,
    ModifiedDate        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS SalesOrderDetail (
    SalesOrderDetailID INTEGER PRIMARY KEY AUTOINCREMENT,
    SalesOrderID       INTEGER NOT NULL REFERENCES SalesOrderHeader(SalesOrderID),
    OrderQty           INTEGER NOT NULL,
    ProductID          INTEGER NOT NULL REFERENCES Product(ProductID),
    UnitPrice          REAL NOT NULL,
    UnitPriceDiscount  REAL NOT NULL DEFAULT 0,
    LineTotal          REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_soh_customer ON SalesOrderHeader(CustomerID);
CREATE INDEX IF NOT EXISTS idx_soh_order_date ON SalesOrderHeader(OrderDate);
CREATE INDEX IF NOT EXISTS idx_sod_order ON SalesOrderDetail(SalesOrderID);
CREATE INDEX IF NOT EXISTS idx_sod_product ON SalesOrderDetail(ProductID);
";

const HISTORY_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS PromptHistory (
    id               TEXT PRIMARY KEY,
    userId           TEXT,
    prompt           TEXT NOT NULL,
    externalRequest  TEXT,
    externalResponse TEXT,
    createdAt        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_prompt_history_created ON PromptHistory(createdAt);
";

pub async fn ensure_sales_schema(store: &SqliteStore) -> Result<(), DataAccessError> {
    store.execute_script(SALES_SCHEMA).await
}

pub async fn ensure_history_schema(store: &SqliteStore) -> Result<(), DataAccessError> {
    store.execute_script(HISTORY_SCHEMA).await
}
