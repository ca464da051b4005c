pub mod email;
pub mod error;
pub mod payment;
pub mod worker;

pub use email::{EmailSender, RecordingEmailSender, SentEmail};
pub use error::NotifierError;
pub use payment::PaymentNotifier;
pub use worker::{EmailWorker, BATCH_SIZE, BATCH_WINDOW};
