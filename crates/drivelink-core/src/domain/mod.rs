//! Domain types for DriveLink:
//! - The `RemoteObject` snapshot record returned by remote operations
//! - Configuration error types

pub mod errors;
pub mod remote_object;

pub use errors::ConfigError;
pub use remote_object::RemoteObject;
