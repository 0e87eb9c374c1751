//! Core types shared by every pass

pub mod cloud_type;
pub mod wind;

pub use cloud_type::CloudType;
pub use wind::Wind;
