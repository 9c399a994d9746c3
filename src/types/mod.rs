// ABOUTME: Validated domain types shared by the pipeline and manifest generator.
// ABOUTME: Service names, environments, semantic versions, and image tags.

mod environment;
mod image_ref;
mod service_name;
mod version;

pub use environment::Environment;
pub use image_ref::{ImageRef, TagPair};
pub use service_name::{ServiceName, ServiceNameError};
pub use version::{DEFAULT_VERSION, ParseVersionError, Version, increment_patch};
