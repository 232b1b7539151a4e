pub mod lead_service;
pub use lead_service::LeadService;
pub mod task_service;
pub use task_service::TaskService;
