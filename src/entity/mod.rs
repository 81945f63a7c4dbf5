pub mod administrators;
pub mod audit_logs;
pub mod authors;
pub mod categories;
pub mod customers;
pub mod product_comments;
pub mod product_details;
pub mod product_images;
pub mod product_ratings;
pub mod products;
pub mod purchases;
pub mod users;

pub use administrators::Entity as Administrators;
pub use audit_logs::Entity as AuditLogs;
pub use authors::Entity as Authors;
pub use categories::Entity as Categories;
pub use customers::Entity as Customers;
pub use product_comments::Entity as ProductComments;
pub use product_details::Entity as ProductDetails;
pub use product_images::Entity as ProductImages;
pub use product_ratings::Entity as ProductRatings;
pub use products::Entity as Products;
pub use purchases::Entity as Purchases;
pub use users::Entity as Users;
