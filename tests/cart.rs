use axum_restaurant_api::cart::Cart;
use rust_decimal::Decimal;
use uuid::Uuid;

#[test]
fn empty_cart_has_zero_total() {
    let cart = Cart::default();
    assert!(cart.is_empty());
    assert_eq!(cart.len(), 0);
    assert_eq!(cart.total(), Decimal::ZERO);
}

#[test]
fn totals_are_exact_decimal_sums() {
    let mut cart = Cart::default();
    cart.add_or_update(Uuid::new_v4(), "Burger", Decimal::new(1590, 2), "");
    cart.add_or_update(Uuid::new_v4(), "Soda", Decimal::new(590, 2), "");

    assert_eq!(cart.len(), 2);
    assert_eq!(cart.total(), Decimal::new(2180, 2));
}

#[test]
fn re_adding_a_product_replaces_the_note_only() {
    let product_id = Uuid::new_v4();
    let mut cart = Cart::default();

    let added = cart.add_or_update(product_id, "Burger", Decimal::new(1590, 2), "no onions");
    assert!(added);

    let added_again = cart.add_or_update(product_id, "Burger", Decimal::new(1590, 2), "extra cheese");
    assert!(!added_again);

    assert_eq!(cart.len(), 1);
    assert_eq!(cart.total(), Decimal::new(1590, 2));
    assert_eq!(cart.lines()[0].note, "extra cheese");
}

#[test]
fn update_note_rejects_out_of_bounds_index() {
    let mut cart = Cart::default();
    cart.add_or_update(Uuid::new_v4(), "Burger", Decimal::new(1590, 2), "");

    assert!(cart.update_note(0, "well done"));
    assert_eq!(cart.lines()[0].note, "well done");
    assert!(!cart.update_note(1, "nope"));
}

#[test]
fn remove_shifts_following_lines_down() {
    let mut cart = Cart::default();
    cart.add_or_update(Uuid::new_v4(), "Burger", Decimal::new(1590, 2), "");
    cart.add_or_update(Uuid::new_v4(), "Soda", Decimal::new(590, 2), "");
    cart.add_or_update(Uuid::new_v4(), "Fries", Decimal::new(1990, 2), "");

    let removed = cart.remove(1).expect("line at index 1");
    assert_eq!(removed.name, "Soda");
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.lines()[1].name, "Fries");

    assert!(cart.remove(5).is_none());
}

#[test]
fn clear_empties_the_cart() {
    let mut cart = Cart::default();
    cart.add_or_update(Uuid::new_v4(), "Burger", Decimal::new(1590, 2), "");
    cart.clear();
    assert!(cart.is_empty());
    assert_eq!(cart.total(), Decimal::ZERO);
}

#[test]
fn cart_round_trips_through_json_as_a_plain_list() {
    let mut cart = Cart::default();
    cart.add_or_update(Uuid::new_v4(), "Burger", Decimal::new(1590, 2), "no pickles");

    let json = serde_json::to_value(&cart).expect("serialize");
    assert!(json.is_array(), "cart should serialize as a bare list");

    let restored: Cart = serde_json::from_value(json).expect("deserialize");
    assert_eq!(restored, cart);
}
