pub mod api_middleware;

pub use api_middleware::{auth_gate, logging_middleware, security_headers_middleware};
