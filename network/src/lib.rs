pub mod discovery;
pub mod message;
pub mod queue;
pub mod types;
