// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod csv_frame_source;
pub mod outlier_writer;
pub mod report_writer;
pub mod table_renderer;
