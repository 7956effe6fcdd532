// Application layer - task orchestration over the domain rules
pub mod progress;
pub mod scheduler;
pub mod sinks;
pub mod task;
