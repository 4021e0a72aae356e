mod cross_attention;
mod health_check;
mod helpers;
mod projections;
mod semantic;
mod sessions;
