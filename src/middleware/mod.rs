// Middleware modules for the scan API

pub mod cors;

pub use cors::dynamic_cors_middleware;
