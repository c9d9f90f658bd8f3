pub mod api;
pub mod health;

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;
