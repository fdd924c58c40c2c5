pub mod file_store;
pub mod grader;
pub mod host;
pub mod ids;
pub mod memory_store;
pub mod store;

pub use file_store::JsonFileStore;
pub use grader::{GradeResult, Grader, LocalGrader};
pub use host::{Host, HostEvent};
pub use ids::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use memory_store::InMemoryStore;
pub use store::DocumentStore;
