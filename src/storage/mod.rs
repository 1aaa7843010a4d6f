pub mod json;

pub use json::Storage;
