//! Domain models shared across the tubely crates

pub mod aspect;
pub mod locator;
pub mod strategy;
pub mod video;

pub use aspect::AspectRatio;
pub use locator::ObjectLocator;
pub use strategy::{ProbeFailurePolicy, ThumbnailStrategy, VideoUrlStrategy};
pub use video::Video;
