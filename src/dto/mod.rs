pub mod auth;
pub mod authors;
pub mod catalog;
pub mod categories;
pub mod customers;
pub mod products;
pub mod profile;
pub mod rankings;
pub mod storefront;
