pub mod callbacks;
pub(crate) mod coordinator;
pub mod device_handle;
pub mod manager;
pub mod shared;
pub mod surface_registry;
pub(crate) mod worker;

#[cfg(test)]
pub(crate) mod test_support;
