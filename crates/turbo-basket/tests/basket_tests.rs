//! End-to-end basket behaviour across storage and identifier backends.

use http::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use rand::Rng;
use serde_json::json;
use turbo_basket::prelude::*;
use turbo_basket::BasketConfig;
use turbo_cache::SessionId;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn basket() -> Basket {
    Basket::new(RuntimeStorage::new(), RuntimeIdentifier::new()).unwrap()
}

fn foo() -> NewItem {
    NewItem::new()
        .id("foo")
        .name("bar")
        .price(100.0)
        .quantity(1)
        .weight(200.0)
}

#[test]
fn insert_returns_md5_key() {
    let mut basket = basket();
    let key = basket.insert(foo()).unwrap();

    assert_eq!(key.as_str(), format!("{:x}", md5::compute("foo[]")));
    assert!(basket.has(&key));
    assert_eq!(basket.item(&key).unwrap().name(), "bar");
}

#[test]
fn insert_from_json_record() {
    let mut basket = basket();
    let record: NewItem = serde_json::from_value(json!({
        "id": "foo",
        "name": "bar",
        "price": 100,
        "quantity": 2,
        "weight": 200,
        "tax": "20",
        "color": "red"
    }))
    .unwrap();

    let key = basket.insert(record).unwrap();
    let item = basket.item(&key).unwrap();
    assert_eq!(item.quantity(), 2);
    assert_eq!(item.attribute("color"), Some(&json!("red")));
    assert!(approx(basket.total(true), 240.0));
}

#[test]
fn insert_from_form_record() {
    let mut basket = basket();
    let record: NewItem = serde_json::from_value(json!({
        "id": 7,
        "name": "bar",
        "price": "100",
        "quantity": "3",
        "weight": "200",
        "options": [{"name": "Size", "value": "L", "price": "5"}]
    }))
    .unwrap();

    let key = basket.insert(record).unwrap();
    let item = basket.item(&key).unwrap();
    assert_eq!(item.id().as_str(), "7");
    assert_eq!(item.quantity(), 3);
    assert!(approx(basket.total(false), 315.0));
    assert!(approx(basket.weight(), 600.0));

    // The same record typed through the builder lands on the same line.
    let again = basket
        .insert(
            NewItem::new()
                .id("7")
                .name("bar")
                .price(100.0)
                .quantity(1)
                .weight(200.0)
                .option(ItemOption::new().field("name", "Size").field("value", "L").price(5.0)),
        )
        .unwrap();
    assert_eq!(again, key);
    assert_eq!(basket.total_items(false), 4);
}

#[test]
fn missing_fields_are_rejected_by_name() {
    let mut basket = basket();
    for (item, field) in [
        (NewItem::new().name("bar").price(1.0).quantity(1).weight(1.0), "id"),
        (NewItem::new().id("foo").price(1.0).quantity(1).weight(1.0), "name"),
        (NewItem::new().id("foo").name("bar").price(1.0).weight(1.0), "quantity"),
        (NewItem::new().id("foo").name("bar").quantity(1).weight(1.0), "price"),
        (NewItem::new().id("foo").name("bar").quantity(1).price(1.0), "weight"),
    ] {
        let err = basket.insert(item).unwrap_err();
        assert_eq!(err.to_string(), format!("The '{}' field is required", field));
    }
    assert!(basket.is_empty());
}

#[test]
fn repeated_insert_sums_quantities() {
    let mut basket = basket();
    let first = basket.insert(foo().quantity(3)).unwrap();
    let second = basket.insert(foo().quantity(5)).unwrap();

    assert_eq!(first, second);
    assert_eq!(basket.total_items(false), 8);
    assert_eq!(basket.total_items(true), 1);
}

#[test]
fn huge_quantities_do_not_overflow_totals() {
    let mut basket = basket();
    basket.insert(foo().quantity(i64::MAX)).unwrap();
    basket.insert(foo().id("x").quantity(1)).unwrap();

    assert_eq!(basket.total_items(false), i64::MAX);
    assert_eq!(basket.summary().total_items, i64::MAX);
}

#[test]
fn random_quantities_accumulate() {
    let mut rng = rand::thread_rng();
    let mut basket = basket();
    let mut expected = 0;

    for _ in 0..20 {
        let quantity = rng.gen_range(1..50);
        expected += quantity;
        basket.insert(foo().quantity(quantity)).unwrap();
    }

    assert_eq!(basket.total_items(false), expected);
    assert_eq!(basket.total_items(true), 1);
    assert!(approx(basket.total(false), 100.0 * expected as f64));
}

#[test]
fn totals_with_tax() {
    let mut basket = basket();
    basket.insert(foo().tax(20.0)).unwrap();

    assert!(approx(basket.total(false), 100.0));
    assert!(approx(basket.total(true), 120.0));
    assert!(approx(basket.tax(), 20.0));
}

#[test]
fn option_prices_and_weights_roll_up() {
    let mut basket = basket();
    let key = basket
        .insert(
            foo()
                .quantity(2)
                .option(ItemOption::new().field("size", "L").price(10.0).weight(50.0))
                .option(ItemOption::new().field("gift", true).weight(5.0)),
        )
        .unwrap();

    let item = basket.item(&key).unwrap();
    assert!(approx(item.single(false), 110.0));
    assert!(approx(basket.total(false), 220.0));
    assert!(approx(basket.weight(), (200.0 + 55.0) * 2.0));
}

#[test]
fn option_order_does_not_change_key() {
    let mut basket = basket();
    let size = ItemOption::new().field("size", "L");
    let gift = ItemOption::new().field("gift", true);

    let a = basket.insert(foo().option(size.clone()).option(gift.clone())).unwrap();
    let b = basket.insert(foo().option(gift).option(size)).unwrap();

    assert_eq!(a, b);
    assert_eq!(basket.item(&a).unwrap().quantity(), 2);
}

#[test]
fn remove_and_destroy() {
    let mut basket = basket();
    let keep = basket.insert(foo()).unwrap();
    let gone = basket.insert(foo().id("other")).unwrap();

    assert!(basket.remove(&gone));
    assert!(!basket.remove(&gone));
    assert!(basket.has(&keep));

    basket.destroy();
    assert!(basket.is_empty());
    assert_eq!(basket.total_items(false), 0);
    assert!(approx(basket.total(true), 0.0));
}

#[test]
fn find_returns_first_line_for_catalog_id() {
    let mut basket = basket();
    let first = basket
        .insert(foo().option(ItemOption::new().field("size", "S")))
        .unwrap();
    basket
        .insert(foo().option(ItemOption::new().field("size", "M")))
        .unwrap();

    let found = basket.find(&ProductId::new("foo")).unwrap();
    assert_eq!(found.identifier(), Some(&first));
    assert!(basket.find(&ProductId::new("nope")).is_none());
}

#[test]
fn live_contents_write_through() {
    let mut basket = basket();
    let key = basket.insert(foo()).unwrap();

    basket.contents_mut()[0].set_price(50.0);
    basket.item_mut(&key).unwrap().set_quantity(4);

    assert!(approx(basket.total(false), 200.0));
}

#[test]
fn summary_matches_basket_totals() {
    let mut basket = basket();
    basket.insert(foo().quantity(2).tax(20.0)).unwrap();
    basket.insert(foo().id("other").price(10.0).weight(1.0)).unwrap();

    let summary = basket.summary();
    assert_eq!(&summary.basket, basket.identifier());
    assert!(approx(summary.total, basket.total(true)));
    assert!(approx(summary.subtotal, basket.total(false)));
    assert!(approx(summary.tax, basket.tax()));
    assert!(approx(summary.weight, basket.weight()));
    assert_eq!(summary.total_items, 3);
    assert_eq!(summary.unique_items, 2);
}

#[test]
fn session_storage_round_trip() {
    let session = SessionId::generate();

    let storage = SessionStorage::open("basket-tests", session.clone()).unwrap();
    let mut basket = Basket::new(storage, RuntimeIdentifier::with_id("visitor")).unwrap();
    let key = basket.insert(foo().quantity(2).tax(20.0)).unwrap();
    basket.save().unwrap();

    let storage = SessionStorage::open("basket-tests", session).unwrap();
    let basket = Basket::new(storage, RuntimeIdentifier::with_id("visitor")).unwrap();
    assert!(basket.has(&key));
    assert_eq!(basket.total_items(false), 2);
    assert!(approx(basket.total(true), 240.0));
}

#[test]
fn option_deltas_survive_session_round_trip() {
    let session = SessionId::generate();

    let storage = SessionStorage::open("basket-option-deltas", session.clone()).unwrap();
    let mut basket = Basket::new(storage, RuntimeIdentifier::with_id("visitor")).unwrap();
    basket
        .insert(foo().option(ItemOption::new().field("price", 5).field("weight", 7)))
        .unwrap();
    let before = (basket.total(false), basket.weight());
    basket.save().unwrap();

    let storage = SessionStorage::open("basket-option-deltas", session).unwrap();
    let basket = Basket::new(storage, RuntimeIdentifier::with_id("visitor")).unwrap();
    let after = (basket.total(false), basket.weight());

    assert_eq!(before, after);
    assert!(approx(after.0, 105.0));
    assert!(approx(after.1, 207.0));
}

#[test]
fn session_storage_from_config() {
    let config = BasketConfig::from_toml_str("[session]\nstore = \"configured-baskets\"").unwrap();
    let session = SessionId::generate();

    let storage = SessionStorage::open_with_config(&config, session.clone()).unwrap();
    let mut basket = Basket::new(storage, RuntimeIdentifier::with_id("b")).unwrap();
    basket.insert(foo()).unwrap();
    basket.save().unwrap();

    let storage = SessionStorage::open("configured-baskets", session).unwrap();
    let basket = Basket::new(storage, RuntimeIdentifier::with_id("b")).unwrap();
    assert_eq!(basket.total_items(true), 1);
}

#[test]
fn cookie_identifier_flow() {
    // First request: no cookie, a new id is issued.
    let ids = CookieIdentifier::new().with_request_headers(&HeaderMap::new());
    let mut basket = Basket::new(RuntimeStorage::new(), ids).unwrap();
    basket.insert(foo()).unwrap();

    let mut response = HeaderMap::new();
    basket
        .identifier_provider_mut()
        .write_response_headers(&mut response)
        .unwrap();
    let set_cookie = response[SET_COOKIE].to_str().unwrap().to_string();
    assert_eq!(set_cookie, format!("cart_identifier={}; Path=/", basket.identifier()));

    // Second request: the browser sends the cookie back.
    let (storage, _) = basket.into_parts();
    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let mut request = HeaderMap::new();
    request.insert(COOKIE, HeaderValue::from_str(&cookie).unwrap());

    let ids = CookieIdentifier::new().with_request_headers(&request);
    let mut basket = Basket::new(storage, ids).unwrap();
    assert_eq!(basket.total_items(false), 1);
    assert!(basket.identifier_provider().pending_cookies().is_empty());

    // Logout: the cookie is expired and a fresh basket starts.
    basket.forget_identifier();
    assert!(basket.is_empty());
    let pending = basket.identifier_provider().pending_cookies();
    assert!(pending[0].contains("Max-Age=0"));
    assert!(pending[1].starts_with("cart_identifier="));
}
