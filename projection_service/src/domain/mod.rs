pub mod entities;
pub mod projection_error;
pub mod services;
