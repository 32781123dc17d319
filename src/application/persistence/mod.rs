pub mod gateway;
pub mod record_writer;

pub use gateway::{DEFAULT_HISTORY_LIMIT, DisabledGateway, PersistenceGateway, StoreGateway};
pub use record_writer::{DEFAULT_QUEUE_CAPACITY, RecordSink, RecordWriter};
