// Pharmacy flow: location → places search (or static fallback) → list + map URLs.

pub mod geo;
pub mod handlers;
pub mod locator;
pub mod places;
