//! `burgerbot-hal` – driver traits for the robot's sensors.
//!
//! # Modules
//!
//! - [`camera`] – [`Camera`] trait and raw [`CameraFrame`] decoding into an
//!   RGB image.
//! - [`range`] – [`RangeSensor`] trait for laser scanners.
//! - [`sim`] – simulated drivers for headless runs and tests.

pub mod camera;
pub mod range;
pub mod sim;

pub use camera::{Camera, CameraFrame, PixelEncoding};
pub use range::{LaserScan, RangeSensor};
