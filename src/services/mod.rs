pub mod extract_service;
pub mod dataset_service;
pub mod summary_service;
pub mod chart_service;
pub mod pipeline_service;
