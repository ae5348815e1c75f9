pub mod camera_models;
pub mod capture_request;
pub mod config;
pub mod error;
pub mod recording_result;
pub mod state;
pub mod surface;
