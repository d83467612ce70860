//! Built-in document transforms.
//!
//! 1. **TitleTransform** - Fill a missing `title` from the first heading
//! 2. **CdnPrefixTransform** - Serve root-relative images from a CDN

mod cdn;
mod title;

pub use cdn::{CdnPrefixTransform, rewrite_image_sources};
pub use title::TitleTransform;
