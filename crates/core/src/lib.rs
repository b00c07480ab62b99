pub mod models;
pub mod news;
pub mod traits;

pub use models::*;
pub use news::*;
pub use traits::*;
