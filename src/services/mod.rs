pub mod auth_service;
pub mod author_service;
pub mod catalog_service;
pub mod category_service;
pub mod customer_service;
pub mod product_service;
pub mod profile_service;
pub mod purchase_service;
pub mod ranking_service;
pub mod storefront_service;
pub mod validation;
