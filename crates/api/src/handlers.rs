//! HTTP surface. Handlers stay thin: parameter parsing, rate limiting, and
//! delegation to the stores/repos/services behind `AppState`.

pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod recommendations;
pub mod search;
