//! # libcsi: the CSI controller client surface
//!
//! `libcsi` models the controller half of the [Container Storage
//! Interface][csi] as seen from a client: the protobuf messages, an async
//! trait with one method per controller RPC, and a gRPC implementation of
//! that trait built on [`tonic`].
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |---|---|
//! | [`types`] | Wire model: `VolumeId`, `VolumeInfo`, capabilities, requests. |
//! | [`error`] | [`CsiError`] enum for endpoint and channel setup failures. |
//! | [`controller`] | [`CsiController`] trait: the eight controller RPCs. |
//! | [`transport`] | gRPC client over unix or TCP endpoints. |
//!
//! [csi]: https://github.com/container-storage-interface/spec

pub mod controller;
pub mod error;
pub mod transport;
pub mod types;

// Re-export the most commonly used items at crate root for convenience.
pub use controller::CsiController;
pub use error::CsiError;
pub use tonic::Status;
pub use transport::client::GrpcController;
pub use types::*;
