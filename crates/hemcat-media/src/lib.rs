pub mod client;
pub mod error;
mod retry;
pub mod transform;
pub mod types;

pub use client::{MediaClient, MediaClientOptions};
pub use error::MediaError;
pub use transform::{optimized_url, DEFAULT_IMAGE_TRANSFORM};
pub use types::{MediaResource, ResourcesPage};
