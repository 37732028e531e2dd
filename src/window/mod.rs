pub mod error;
pub mod frame;
pub mod manager;
pub mod registry;
