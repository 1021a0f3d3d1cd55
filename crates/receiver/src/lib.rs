// Module structure for the stdin log receiver.

// Core infrastructure
pub mod component;
pub mod error;
pub mod record;
pub mod status;
pub mod obsreport;
pub mod consumer;

// Domain modules
pub mod conf;
pub mod source;
pub mod receiver;
pub mod factory;
pub mod runtime;

pub use component::ComponentId;
pub use error::ReceiverError;
pub use factory::StdinReceiverFactory;
pub use receiver::{LifecycleState, ReceiverSettings, StdinReceiver};
pub use record::{LogBatch, LogRecord};
pub use source::{InputStream, Mode};
pub use status::{StatusEvent, StatusKind, StatusReporter};
