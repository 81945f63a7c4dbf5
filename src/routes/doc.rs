use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, UpdateAccountRequest},
        authors::{AuthorList, SaveAuthorRequest},
        catalog::CatalogList,
        categories::{CategoryList, SaveCategoryRequest},
        customers::{BalanceView, CustomerList, SaveBalanceRequest},
        products::{
            AdminProductDetail, AdminProductList, FileStored, ReorderImageRequest,
            SaveProductRequest, SavedId,
        },
        profile::{ProfileView, PurchaseHistory},
        rankings::{BestRatedList, MostPurchasedList, TopBuyerList},
        storefront::{
            CommentCreated, CommentRequest, ProductView, PurchaseReceipt, RateRequest, RatingView,
        },
    },
    models::{
        AdminProduct, Author, BestRated, CatalogItem, Category, Comment, CustomerDetail,
        CustomerSummary, MostPurchased, ProductImage, PurchaseRecord, Role, TopBuyer, UserProfile,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin, admin_authors, admin_categories, admin_products, admin_users, auth, catalog,
        health, products, profile, rankings,
        upload::{FileUpload, ImageUpload},
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        catalog::list_catalog,
        catalog::get_image,
        products::get_product,
        products::purchase_product,
        products::download_product,
        products::rate_product,
        products::comment_product,
        profile::get_profile,
        profile::update_profile,
        profile::list_purchases,
        rankings::most_purchased,
        rankings::top_buyers,
        rankings::best_rated,
        admin::update_profile,
        admin_products::list_products,
        admin_products::save_product,
        admin_products::get_product,
        admin_products::delete_product,
        admin_products::upload_file,
        admin_products::add_image,
        admin_products::get_image,
        admin_products::reorder_image,
        admin_products::delete_image,
        admin_categories::list_categories,
        admin_categories::save_category,
        admin_categories::get_category,
        admin_categories::delete_category,
        admin_authors::list_authors,
        admin_authors::save_author,
        admin_users::list_customers,
        admin_users::get_customer,
        admin_users::save_balance,
        admin_users::delete_customer
    ),
    components(
        schemas(
            Role,
            UserProfile,
            CatalogItem,
            Comment,
            PurchaseRecord,
            MostPurchased,
            TopBuyer,
            BestRated,
            AdminProduct,
            ProductImage,
            Category,
            Author,
            CustomerSummary,
            CustomerDetail,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateAccountRequest,
            CatalogList,
            ProductView,
            PurchaseReceipt,
            RateRequest,
            RatingView,
            CommentRequest,
            CommentCreated,
            ProfileView,
            PurchaseHistory,
            MostPurchasedList,
            TopBuyerList,
            BestRatedList,
            AdminProductList,
            AdminProductDetail,
            SaveProductRequest,
            ReorderImageRequest,
            SavedId,
            FileStored,
            FileUpload,
            ImageUpload,
            CategoryList,
            SaveCategoryRequest,
            AuthorList,
            SaveAuthorRequest,
            CustomerList,
            SaveBalanceRequest,
            BalanceView,
            health::HealthData,
            Meta,
            ApiResponse<CatalogList>,
            ApiResponse<ProductView>,
            ApiResponse<PurchaseReceipt>,
            ApiResponse<AdminProductList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Catalog", description = "Public catalog and images"),
        (name = "Products", description = "Product page, purchase, download, rating and comments"),
        (name = "Profile", description = "Signed-in customer"),
        (name = "Rankings", description = "Most purchased, top buyers, best rated"),
        (name = "Admin", description = "Administrator endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
