mod data_uri;
mod error;
mod key;
mod store;

pub mod filesystem;

pub use data_uri::{DecodedImage, ImageFormat, decode_data_uri};
pub use error::StorageError;
pub use key::MediaKey;
pub use filesystem::FilesystemMediaStore;
pub use store::MediaStore;
