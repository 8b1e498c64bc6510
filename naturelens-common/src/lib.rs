//! # NatureLens Common Library
//!
//! Shared code for the NatureLens identification service and its clients:
//! - The normalized detection result contract and its sentinel names
//! - The internal tagged identification outcome
//! - Detection domains and validated image references
//! - Configuration loading

pub mod config;
pub mod error;
pub mod image;
pub mod model;

pub use error::{Error, Result};
pub use image::{ImageFormat, ImageSource};
pub use model::{Attributes, DetectionResult, Domain, Identification, Label, Outcome};
