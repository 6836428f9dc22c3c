//! HTTP shell: one `GET /` route that runs the table pipeline, plus health
//! and OpenAPI documentation.

pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
