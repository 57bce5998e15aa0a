//! Scoped ownership of GPU objects.

mod handle;

pub use handle::{GpuHandle, GpuRelease};
