//! `burgerbot-perception` – colour-blob detection.
//!
//! Turns a camera frame into a bearing towards the largest blob of a given
//! colour.
//!
//! # Modules
//!
//! - [`hsv`] – [`HsvImage`][hsv::HsvImage]: full-range 8-bit HSV conversion.
//! - [`color`] – the closed [`ColorThreshold`][color::ColorThreshold] lookup
//!   table and binary [`ColorMask`][color::ColorMask] segmentation.
//! - [`blob`] – connected components, their contours, convex hulls and
//!   bounding boxes.
//! - [`bearing`] – [`BearingEstimator`][bearing::BearingEstimator]: picks the
//!   largest blob and converts its horizontal offset into radians.
//! - [`overlay`] – draws detection boxes onto a frame.

pub mod bearing;
pub mod blob;
pub mod color;
pub mod hsv;
pub mod overlay;

pub use bearing::{BearingEstimator, DEFAULT_DEG_PER_PIXEL, Detection};
pub use blob::{Blob, Point, find_blobs};
pub use color::{ColorMask, ColorThreshold, HueBand, threshold};
pub use hsv::{Hsv, HsvImage};
