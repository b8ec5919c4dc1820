/// Small deterministic sales data set
///
/// Used by `--seed-demo`, the debug tools and the test suites. Totals:
/// 5 orders, revenue 11200.00, 5 customers (3 business, 4 with orders),
/// best product "Mountain-200 Black, 38" at 6000.00, newest order 71784.
use super::sqlite::SqliteStore;
use crate::errors::DataAccessError;
use crate::logger::{self, LogTag};

const DEMO_DATA: &str = "
INSERT OR IGNORE INTO Customer (CustomerID, Title, FirstName, LastName, CompanyName, EmailAddress) VALUES
    (1, 'Mr.', 'Orlando', 'Gee', 'A Bike Store', 'orlando0@adventure-works.com'),
    (2, 'Mr.', 'Keith', 'Harris', 'Progressive Sports', 'keith0@adventure-works.com'),
    (3, 'Ms.', 'Donna', 'Carreras', NULL, 'donna0@adventure-works.com'),
    (4, 'Ms.', 'Janet', 'Gates', 'Modular Cycle Systems', 'janet1@adventure-works.com'),
    (5, 'Ms.', 'Lucy', 'Harrington', '', 'lucy0@adventure-works.com');

INSERT OR IGNORE INTO Address (AddressID, AddressLine1, City, StateProvince, CountryRegion, PostalCode) VALUES
    (1, '2251 Elliot Avenue', 'Toronto', 'Ontario', 'Canada', 'M4B 1V7'),
    (2, '7943 Walnut Ave', 'Seattle', 'Washington', 'United States', '98104'),
    (3, '9178 Jumping St.', 'Bothell', 'Washington', 'United States', '98011'),
    (4, '99 Dean Street', 'London', 'England', 'United Kingdom', 'SW6 SBY'),
    (5, '2681 Eagle Peak', 'Portland', 'Oregon', 'United States', '97205');

INSERT OR IGNORE INTO CustomerAddress (CustomerID, AddressID) VALUES
    (1, 1), (2, 2), (3, 3), (4, 4), (5, 5);

INSERT OR IGNORE INTO Product (ProductID, Name, ProductNumber, Color, ListPrice) VALUES
    (1, 'Mountain-200 Black, 38', 'BK-M68B-38', 'Black', 2294.99),
    (2, 'Road-250 Red, 44', 'BK-R89R-44', 'Red', 2443.35),
    (3, 'Sport-100 Helmet, Red', 'HL-U509-R', 'Red', 34.99),
    (4, 'Long-Sleeve Logo Jersey, L', 'LJ-0192-L', 'Multi', 49.99);

INSERT OR IGNORE INTO SalesOrderHeader
    (SalesOrderID, OrderDate, DueDate, Status, SalesOrderNumber, CustomerID,
     ShipToAddressID, BillToAddressID, ShipMethod, SubTotal, TaxAmt, Freight, TotalDue,
     rowguid, ModifiedDate)
VALUES
    (71774, '2008-06-01T00:00:00Z', '2008-06-13T00:00:00Z', 5, 'SO71774', 1, 1, 1,
     'CARGO TRANSPORT 5', 2120.00, 0, 0, 2120.00, 'seed-71774', '2008-06-08T00:00:00Z'),
    (71776, '2008-06-02T00:00:00Z', '2008-06-14T00:00:00Z', 5, 'SO71776', 2, 2, 2,
     'CARGO TRANSPORT 5', 4800.00, 0, 0, 4800.00, 'seed-71776', '2008-06-09T00:00:00Z'),
    (71780, '2008-06-03T00:00:00Z', '2008-06-15T00:00:00Z', 5, 'SO71780', 3, 3, 3,
     'CARGO TRANSPORT 5', 180.00, 0, 0, 180.00, 'seed-71780', '2008-06-10T00:00:00Z'),
    (71782, '2008-06-04T00:00:00Z', '2008-06-16T00:00:00Z', 5, 'SO71782', 1, 1, 1,
     'CARGO TRANSPORT 5', 4000.00, 0, 0, 4000.00, 'seed-71782', '2008-06-11T00:00:00Z'),
    (71784, '2008-06-05T00:00:00Z', '2008-06-17T00:00:00Z', 1, 'SO71784', 4, 4, 4,
     'OVERNIGHT J-FAST', 100.00, 0, 0, 100.00, 'seed-71784', '2008-06-12T00:00:00Z');

INSERT OR IGNORE INTO SalesOrderDetail
    (SalesOrderDetailID, SalesOrderID, OrderQty, ProductID, UnitPrice, LineTotal)
VALUES
    (1, 71774, 1, 1, 2000.00, 2000.00),
    (2, 71774, 4, 3, 30.00, 120.00),
    (3, 71776, 2, 2, 2400.00, 4800.00),
    (4, 71780, 1, 3, 30.00, 30.00),
    (5, 71780, 3, 4, 50.00, 150.00),
    (6, 71782, 2, 1, 2000.00, 4000.00),
    (7, 71784, 2, 4, 50.00, 100.00);
";

/// Insert the demo data set; rows that already exist are left untouched
pub async fn seed_demo_data(store: &SqliteStore) -> Result<(), DataAccessError> {
    store.execute_script(DEMO_DATA).await?;
    logger::info(
        LogTag::Database,
        &format!("Demo sales data present in {}", store.path().display()),
    );
    Ok(())
}
