/// OpenAPI 3.0 description of the HTTP API
use axum::{response::Response, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::webserver::{state::AppState, utils::success_response};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api-docs/openapi.json", get(openapi_document))
}

async fn openapi_document() -> Response {
    success_response(openapi_spec())
}

fn error_ref(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Error"}}}
    })
}

fn order_id_param() -> Value {
    json!({
        "in": "path",
        "name": "orderId",
        "required": true,
        "schema": {"type": "integer", "minimum": 1},
        "example": 71774
    })
}

pub fn openapi_spec() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Salesboard API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Sales dashboard metrics, order CRUD and prompt forwarding"
        },
        "servers": [{"url": "/api"}],
        "tags": [
            {"name": "Dashboard", "description": "Sales metrics and statistics"},
            {"name": "Orders", "description": "Sales order operations"},
            {"name": "Prompts", "description": "Prompt forwarding and history"}
        ],
        "paths": {
            "/health": {
                "get": {
                    "summary": "Liveness check",
                    "responses": {"200": {"description": "Service is up"}}
                }
            },
            "/sql/dashboard/metrics": {
                "get": {
                    "tags": ["Dashboard"],
                    "summary": "Complete dashboard metrics (cached for the configured TTL)",
                    "responses": {
                        "200": {
                            "description": "Metrics snapshot",
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/MetricSnapshot"}}}
                        },
                        "500": error_ref("Metrics could not be computed")
                    }
                }
            },
            "/sql/dashboard/orders": {
                "get": {
                    "tags": ["Dashboard"],
                    "summary": "Order lines joined with customer, address and product",
                    "parameters": [
                        {"in": "query", "name": "customerId", "schema": {"type": "integer"}},
                        {"in": "query", "name": "status", "schema": {"type": "integer"}},
                        {"in": "query", "name": "limit", "schema": {"type": "integer", "default": 100}}
                    ],
                    "responses": {
                        "200": {"description": "Order lines, newest first"},
                        "400": error_ref("Invalid filter"),
                        "500": error_ref("Query failed")
                    }
                }
            },
            "/sql/orders": {
                "post": {
                    "tags": ["Orders"],
                    "summary": "Create a sales order",
                    "requestBody": {
                        "required": true,
                        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/NewOrder"}}}
                    },
                    "responses": {
                        "200": {"description": "Order created"},
                        "400": error_ref("Invalid input data"),
                        "500": error_ref("Order could not be created")
                    }
                }
            },
            "/sql/orders/{orderId}": {
                "get": {
                    "tags": ["Orders"],
                    "summary": "Order header with line items",
                    "parameters": [order_id_param()],
                    "responses": {
                        "200": {"description": "Order details"},
                        "400": error_ref("Invalid order id"),
                        "404": error_ref("Order not found"),
                        "500": error_ref("Query failed")
                    }
                },
                "put": {
                    "tags": ["Orders"],
                    "summary": "Update status and/or ship method",
                    "parameters": [order_id_param()],
                    "requestBody": {
                        "required": true,
                        "content": {"application/json": {"schema": {
                            "type": "object",
                            "properties": {
                                "Status": {"type": "integer", "minimum": 1, "maximum": 6, "example": 2},
                                "ShipMethod": {"type": "string", "maxLength": 50, "example": "EXPRESS"}
                            }
                        }}}
                    },
                    "responses": {
                        "200": {"description": "Order updated"},
                        "400": error_ref("Invalid input data"),
                        "404": error_ref("Order not found"),
                        "500": error_ref("Update failed")
                    }
                },
                "delete": {
                    "tags": ["Orders"],
                    "summary": "Delete an order and its lines",
                    "parameters": [order_id_param()],
                    "responses": {
                        "200": {"description": "Order deleted"},
                        "404": error_ref("Order not found"),
                        "500": error_ref("Delete failed")
                    }
                }
            },
            "/prompts": {
                "post": {
                    "tags": ["Prompts"],
                    "summary": "Forward a prompt to the external API and record it",
                    "requestBody": {
                        "required": true,
                        "content": {"application/json": {"schema": {
                            "type": "object",
                            "required": ["prompt"],
                            "properties": {
                                "prompt": {"type": "string"},
                                "metadata": {"type": "object"},
                                "userId": {"type": "string"}
                            }
                        }}}
                    },
                    "responses": {
                        "200": {"description": "External response with the history id"},
                        "400": error_ref("Missing prompt"),
                        "500": error_ref("Forwarding failed")
                    }
                }
            },
            "/prompts/history": {
                "get": {
                    "tags": ["Prompts"],
                    "summary": "Most recent prompt history entries",
                    "responses": {"200": {"description": "Entries, newest first"}}
                }
            }
        },
        "components": {
            "schemas": {
                "Error": {
                    "type": "object",
                    "properties": {"error": {"type": "string"}, "detail": {"type": "string"}}
                },
                "NewOrder": {
                    "type": "object",
                    "required": ["CustomerID", "OrderDate", "TotalDue"],
                    "properties": {
                        "CustomerID": {"type": "integer", "example": 1},
                        "OrderDate": {"type": "string", "format": "date-time"},
                        "DueDate": {"type": "string", "format": "date-time"},
                        "ShipMethod": {"type": "string", "example": "STANDARD"},
                        "SubTotal": {"type": "number"},
                        "TaxAmt": {"type": "number"},
                        "Freight": {"type": "number"},
                        "TotalDue": {"type": "number", "example": 1210.0}
                    }
                },
                "MetricSnapshot": {
                    "type": "object",
                    "properties": {
                        "salesMetrics": {
                            "type": "object",
                            "properties": {
                                "totalOrders": {"type": "integer"},
                                "totalRevenue": {"type": "number"},
                                "avgOrderValue": {"type": "number"},
                                "firstOrderDate": {"type": "string", "format": "date-time", "nullable": true},
                                "lastOrderDate": {"type": "string", "format": "date-time", "nullable": true}
                            }
                        },
                        "topProducts": {"type": "array", "items": {"type": "object", "properties": {
                            "productName": {"type": "string"},
                            "totalQuantity": {"type": "integer"},
                            "totalRevenue": {"type": "number"}
                        }}},
                        "recentOrders": {"type": "array", "items": {"type": "object", "properties": {
                            "orderId": {"type": "integer"},
                            "orderDate": {"type": "string", "format": "date-time"},
                            "totalDue": {"type": "number"},
                            "customerName": {"type": "string"},
                            "city": {"type": "string", "nullable": true}
                        }}},
                        "customersMetrics": {"type": "object", "properties": {
                            "totalCustomers": {"type": "integer"},
                            "customersWithOrders": {"type": "integer"},
                            "businessCustomers": {"type": "integer"},
                            "individualCustomers": {"type": "integer"}
                        }},
                        "geographicData": {"type": "array", "items": {"type": "object", "properties": {
                            "country": {"type": "string"},
                            "stateProvince": {"type": "string"},
                            "orderCount": {"type": "integer"},
                            "totalRevenue": {"type": "number"}
                        }}},
                        "lastUpdated": {"type": "string", "format": "date-time"}
                    }
                }
            }
        }
    })
}
