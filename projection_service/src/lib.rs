pub mod configuration;
pub mod domain;
pub mod encoder;
pub mod middlewares;
pub mod repositories;
pub mod routes;
pub mod startup;
