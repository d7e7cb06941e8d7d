mod extension;
mod metadata;
mod timespec;

pub use extension::Extension;
pub use metadata::Metadata;
pub use timespec::TimeRange;
