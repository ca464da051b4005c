pub mod types;

pub use types::{MessageId, OrderId, RequestId};
