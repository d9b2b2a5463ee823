//! Export modules
//!
//! - Image: PNG screenshots and GPU frame readback

pub mod image_export;

pub use image_export::export_frame;
