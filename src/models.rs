pub mod lead;
pub mod portal;
pub mod progress;
pub mod quote;
pub mod task;
