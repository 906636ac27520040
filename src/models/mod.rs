mod entity;

pub use entity::{ContentEntity, RecordEventsRequest, RecordEventsResponse};
