//! DriveLink Core - Domain logic for the remote object-storage integration
//!
//! This crate contains the provider-independent pieces of DriveLink:
//! - **Configuration** - process-level settings resolved once at startup
//! - **Domain types** - the `RemoteObject` snapshot record
//! - **Domain errors** - configuration failures as a closed, tagged set
//!
//! The network-facing adapter (session management, streaming transfers,
//! catalog operations) lives in the `drivelink-gdrive` crate and depends
//! on this one, never the other way around.

pub mod config;
pub mod domain;

pub use config::DriveConfig;
pub use domain::errors::ConfigError;
pub use domain::remote_object::RemoteObject;
