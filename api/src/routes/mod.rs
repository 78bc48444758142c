pub mod chat_route;
pub mod health_route;
pub mod query_route;
pub mod upload_route;
