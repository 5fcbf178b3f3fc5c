//! The block synchronization engine.
//!
//! Brings the local chain up to a target height by downloading blocks from
//! peers, validating them, and committing them in strict height order.
//! See the module-level docs on [`registry`], [`downloader`], [`inbox`],
//! [`processor`], [`validator`], and [`controller`] for each component.

pub mod constants;
pub mod controller;
pub mod downloader;
pub mod error;
pub mod inbox;
pub mod processor;
pub mod registry;
pub mod validator;

pub use controller::Controller;
pub use error::SyncError;
pub use registry::Registry;
