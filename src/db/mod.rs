pub mod memory;
pub mod mongo;
pub mod pool;
pub mod store;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;
pub use pool::connect;
pub use store::{DocumentStore, UpdateOutcome};
