//! API documentation endpoints
//!
//! GET /api-docs               - OpenAPI 3.0 document (JSON)
//! GET /api-docs/openapi.json  - same document
//!
//! Only the JSON document is served. There is no bundled Swagger UI; point any
//! OpenAPI viewer at `/api-docs/openapi.json` instead.

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::state::AppState;

/// OpenAPI description of the routes clients reach through the gateway.
pub fn openapi_document(server_url: &str) -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "E-Commerce Microservices API",
            "version": "1.0.0",
            "description": "API documentation for Auth and Product services"
        },
        "servers": [{ "url": server_url }],
        "components": {
            "securitySchemes": {
                "bearerAuth": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" }
            }
        },
        "paths": {
            "/auth/register": {
                "post": {
                    "summary": "Register new user",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": {
                                        "name": { "type": "string" },
                                        "email": { "type": "string" },
                                        "password": { "type": "string" },
                                        "role": { "type": "string" }
                                    }
                                }
                            }
                        }
                    },
                    "responses": { "200": { "description": "User registered successfully" } }
                }
            },
            "/auth/login": {
                "post": {
                    "summary": "Login user",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": {
                                        "email": { "type": "string" },
                                        "password": { "type": "string" }
                                    }
                                }
                            }
                        }
                    },
                    "responses": { "200": { "description": "JWT token returned" } }
                }
            },
            "/products": {
                "get": {
                    "summary": "Get all products (Token required)",
                    "security": [{ "bearerAuth": [] }],
                    "responses": {
                        "200": { "description": "List of products" },
                        "401": { "description": "No token provided" },
                        "403": { "description": "Invalid token" }
                    }
                },
                "post": {
                    "summary": "Create new product (Token required)",
                    "security": [{ "bearerAuth": [] }],
                    "responses": {
                        "200": { "description": "Product created" },
                        "401": { "description": "No token provided" },
                        "403": { "description": "Invalid token" }
                    }
                }
            },
            "/products/{id}": {
                "delete": {
                    "summary": "Delete product (Admin only)",
                    "security": [{ "bearerAuth": [] }],
                    "parameters": [{
                        "name": "id",
                        "in": "path",
                        "required": true,
                        "schema": { "type": "string" }
                    }],
                    "responses": {
                        "200": { "description": "Product deleted" },
                        "401": { "description": "No token provided" },
                        "403": { "description": "Invalid token or admin access required" }
                    }
                }
            }
        }
    })
}

/// GET /api-docs
pub async fn openapi(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.docs.as_ref().clone())
}

/// Build the docs router sub-tree
pub fn docs_router() -> axum::Router<Arc<AppState>> {
    use axum::routing::get;
    axum::Router::new()
        .route("/api-docs", get(openapi))
        .route("/api-docs/", get(openapi))
        .route("/api-docs/openapi.json", get(openapi))
}
