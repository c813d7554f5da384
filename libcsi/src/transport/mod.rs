//! gRPC transport for the controller service.
//!
//! This module provides [`client::GrpcController`], a [`tonic`]-based
//! implementation of [`crate::CsiController`], and [`client::connect`] for
//! building the channel it runs on.

pub mod client;
