// Tutorgate - Normalized multi-provider tutoring-request gateway
// Library exports

pub mod config;
pub mod error;
pub mod normalize;
pub mod providers;
pub mod server;
pub mod session;
