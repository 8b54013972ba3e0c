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
    cart::CartLine,
    dto::{
        addresses::{AddressList, CreateAddressRequest},
        auth::{ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest, UserSummary},
        cart::{AddToCartRequest, CartCount, CartSummary, UpdateCartNoteRequest},
        catalog::{CategoryList, ProductList},
        orders::{CheckoutRequest, OrderList, OrderWithItems},
    },
    models::{Address, Category, Order, OrderItem, Product},
    response::{ApiResponse, Meta},
    routes::{addresses, admin, auth, cart, health, menu, orders, params},
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
        auth::change_own_password,
        menu::list_categories,
        menu::list_category_products,
        cart::show_cart,
        cart::add_to_cart,
        cart::update_note,
        cart::remove_item,
        cart::clear_cart,
        cart::cart_count,
        orders::checkout,
        orders::list_orders,
        orders::get_order,
        addresses::list_addresses,
        addresses::add_address,
        addresses::set_principal,
        addresses::remove_address,
        admin::dashboard,
        admin::list_all_orders,
        admin::get_order,
        admin::update_order_status,
        admin::delete_order,
        admin::list_users,
        admin::list_categories,
        admin::create_category,
        admin::update_category,
        admin::toggle_category,
        admin::list_products,
        admin::create_product,
        admin::update_product,
        admin::toggle_product
    ),
    components(
        schemas(
            Address,
            Category,
            Product,
            Order,
            OrderItem,
            CartLine,
            UserSummary,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ChangePasswordRequest,
            AddToCartRequest,
            UpdateCartNoteRequest,
            CartSummary,
            CartCount,
            CheckoutRequest,
            OrderList,
            OrderWithItems,
            CreateAddressRequest,
            AddressList,
            CategoryList,
            ProductList,
            admin::DashboardStats,
            admin::UserList,
            admin::UpdateOrderStatusRequest,
            admin::CategoryPayload,
            params::Pagination,
            params::SortOrder,
            params::OrderListQuery,
            health::HealthData,
            Meta,
            ApiResponse<UserSummary>,
            ApiResponse<LoginResponse>,
            ApiResponse<CartSummary>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<AddressList>,
            ApiResponse<CategoryList>,
            ApiResponse<ProductList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Menu", description = "Customer-facing menu endpoints"),
        (name = "Cart", description = "Session cart endpoints"),
        (name = "Orders", description = "Checkout and order history endpoints"),
        (name = "Addresses", description = "Delivery address endpoints"),
        (name = "Admin", description = "Restaurant management endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
