pub mod auth;
pub mod cart;
pub mod loose;
pub mod orders;
pub mod restaurants;
pub mod review;
