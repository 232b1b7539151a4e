pub mod leads;
pub mod portal;
pub mod tasks;
