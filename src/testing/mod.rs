//! Testing utilities for idcapture
//!
//! Synthetic frames with known sharpness and a scripted submitter, so the
//! whole capture flow can be exercised without a camera or a server.

pub mod mocks;
pub mod synthetic_data;

pub use mocks::{sample_fields, StaticSubmitter};
pub use synthetic_data::{
    checkerboard, corrupt_frame, encode_jpeg, flat_frame, gradient_frame, horizontal_gradient,
    sharp_frame, uniform_gray,
};
