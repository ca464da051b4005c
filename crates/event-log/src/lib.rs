pub mod error;
pub mod query;
pub mod record;
pub mod sink;
pub mod store;

pub use error::{EventLogError, Result};
pub use query::{EventQueryService, OrderEventSummary};
pub use record::{OrderEventInfo, OrderEventRecord, RETENTION_SECONDS};
pub use sink::EventLogSink;
pub use store::{EventLogStore, InMemoryEventLogStore, ORDER_KEY_NAMESPACE};
