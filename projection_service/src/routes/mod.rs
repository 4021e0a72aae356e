pub mod health_check;
pub mod sessions;
pub mod visualization;

pub use health_check::*;
pub use sessions::*;
