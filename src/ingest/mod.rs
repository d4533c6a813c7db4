pub mod normalize;
pub mod reader;
pub mod schema;

pub use self::normalize::{forward_fill, normalize, total};
pub use self::reader::{parse, UploadFormat};
