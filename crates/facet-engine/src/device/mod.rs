//! Device, queue and window surface.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::{classify_surface_error, SurfaceErrorAction};
