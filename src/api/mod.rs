mod handlers;
mod routes;

pub use handlers::{AnalyticsQueryParams, ErrorResponse, MAX_EVENT_BATCH};
pub use routes::create_api_router;
