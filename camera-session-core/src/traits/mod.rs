pub mod camera_device;
pub mod camera_listener;
pub mod capture_session;
pub mod clock;
pub mod device_service;
pub mod host_context;
