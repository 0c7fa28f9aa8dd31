pub mod deny;
pub mod health;
pub mod ipv4;
pub mod metrics;
