mod format;
mod grayscale;
mod rename;

pub use format::{convert_folder, convert_image};
pub use grayscale::{grayscale_folder, grayscale_image, GRAYSCALE_SUFFIX};
pub use rename::rename_with_uuid;
