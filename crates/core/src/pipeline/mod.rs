pub mod chunk_executor;
pub mod chunk_merger;
pub mod chunk_planner;
pub mod infrastructure;
pub mod pipeline_logger;
pub mod transcribe_use_case;
pub mod tuning_profile;
