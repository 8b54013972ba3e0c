use axum_restaurant_api::{
    routes::params::Pagination,
    services::{admin_service, auth_service, order_service},
    upload,
};

#[test]
fn email_validation_needs_user_domain_and_tld() {
    assert!(auth_service::validate_email("ana@example.com"));
    assert!(auth_service::validate_email("a.b-c@sub.example.org"));

    assert!(!auth_service::validate_email("not-an-email"));
    assert!(!auth_service::validate_email("@example.com"));
    assert!(!auth_service::validate_email("ana@"));
    assert!(!auth_service::validate_email("ana@example"));
    assert!(!auth_service::validate_email(""));
}

#[test]
fn password_needs_minimum_length() {
    assert!(auth_service::validate_password("123456"));
    assert!(auth_service::validate_password("longer-password"));
    assert!(!auth_service::validate_password("12345"));
    assert!(!auth_service::validate_password(""));
}

#[test]
fn only_known_payment_methods_are_accepted() {
    for method in ["cash", "card", "pix"] {
        assert!(order_service::valid_payment_method(method), "{method}");
    }
    assert!(!order_service::valid_payment_method("check"));
    assert!(!order_service::valid_payment_method("CASH"));
    assert!(!order_service::valid_payment_method(""));
}

#[test]
fn only_known_order_statuses_are_accepted() {
    for status in ["pending", "preparing", "ready", "delivered", "cancelled"] {
        assert!(admin_service::validate_order_status(status).is_ok(), "{status}");
    }
    assert!(admin_service::validate_order_status("shipped").is_err());
    assert!(admin_service::validate_order_status("Pending").is_err());
    assert!(admin_service::validate_order_status("").is_err());
}

#[test]
fn image_extension_whitelist() {
    assert!(upload::allowed_file("burger.png"));
    assert!(upload::allowed_file("menu.JPEG"));
    assert!(upload::allowed_file("photo.webp"));

    assert!(!upload::allowed_file("script.sh"));
    assert!(!upload::allowed_file("noextension"));
    assert!(!upload::allowed_file(".png"));
}

#[test]
fn filenames_are_flattened_and_scrubbed() {
    assert_eq!(upload::sanitize_filename("burger.png"), "burger.png");
    assert_eq!(upload::sanitize_filename("../../etc/passwd"), "passwd");
    assert_eq!(
        upload::sanitize_filename("c:\\uploads\\my photo!.png"),
        "my_photo_.png"
    );
}

#[test]
fn stored_filenames_keep_the_extension() {
    let stored = upload::timestamped_filename("burger.png");
    assert!(stored.starts_with("burger_"));
    assert!(stored.ends_with(".png"));
}

#[test]
fn pagination_clamps_page_and_per_page() {
    let (page, per_page, offset) = Pagination {
        page: None,
        per_page: None,
    }
    .normalize();
    assert_eq!((page, per_page, offset), (1, 20, 0));

    let (page, per_page, offset) = Pagination {
        page: Some(0),
        per_page: Some(1000),
    }
    .normalize();
    assert_eq!((page, per_page, offset), (1, 100, 0));

    let (page, per_page, offset) = Pagination {
        page: Some(3),
        per_page: Some(10),
    }
    .normalize();
    assert_eq!((page, per_page, offset), (3, 10, 20));
}
