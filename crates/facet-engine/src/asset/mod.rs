//! Geometry and image loading behind narrow traits.

mod error;
mod image;
mod importer;

pub use error::{DecodeError, ImportError};
pub use self::image::{DecodedImage, ImageCrateDecoder, ImageDecoder, RowOrder};
pub use importer::{GeometryImporter, ImportedGeometry, IndexGroup, MaterialRecord, TobjImporter};
