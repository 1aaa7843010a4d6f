pub mod publisher;
pub mod render;

pub use publisher::Publisher;
pub use render::{clean_filename, document_filename, IndexStats, INDEX_FILE};
