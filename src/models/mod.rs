pub mod content;
pub mod repo;
pub mod state;

pub use content::*;
pub use repo::*;
pub use state::*;
