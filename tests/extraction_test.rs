//! Fixture-driven extraction scenarios: captured listing, product, and review
//! pages run through the same pure extraction entry points the live
//! operations use.

use market_scout::extract::assemble::{
    products_from_listing, product_from_page, reviews_from_page, sellers_from_page,
};
use market_scout::site::SiteProfile;

static SEARCH_LISTING: &str = include_str!("fixtures/search_listing.html");
static PRODUCT_PAGE: &str = include_str!("fixtures/product_page.html");
static REVIEWS_PAGE: &str = include_str!("fixtures/reviews_page.html");

fn site() -> SiteProfile {
    SiteProfile::wildberries()
}

#[test]
fn listing_dedupes_and_stops_at_limit_in_dom_order() {
    // Seven cards, one a verbatim repeat of the first: five unique products
    // come back, in DOM order, and the sixth distinct card is never reached.
    let products = products_from_listing(SEARCH_LISTING, &site(), 5);

    let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "146837693",
            "151209844",
            "149988201",
            "153401777",
            "148112933"
        ]
    );
}

#[test]
fn listing_never_returns_duplicate_identifiers() {
    let products = products_from_listing(SEARCH_LISTING, &site(), 50);
    let mut ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
    // Six distinct cards exist, so a generous limit yields exactly six.
    assert_eq!(total, 6);
}

#[test]
fn listing_card_fields_are_independently_optional() {
    let products = products_from_listing(SEARCH_LISTING, &site(), 50);
    let glass = products
        .iter()
        .find(|p| p.id == "153401777")
        .expect("card present");
    assert_eq!(glass.brand.as_deref(), Some("Borofone"));
    assert_eq!(glass.price, Some(212));
    assert_eq!(glass.rating, None); // no rating element on this card

    let phone = &products[0];
    assert_eq!(phone.name.as_deref(), Some("Смартфон iPhone 15 128 ГБ"));
    assert_eq!(phone.price, Some(72990));
    assert_eq!(phone.rating, Some(4.9));
    assert_eq!(
        phone.url,
        "https://www.wildberries.ru/catalog/146837693/detail.aspx"
    );
}

#[test]
fn product_page_missing_rating_degrades_to_absent() {
    let url = "https://www.wildberries.ru/catalog/146837693/detail.aspx";
    let product = product_from_page(PRODUCT_PAGE, &site(), "146837693", url);

    assert_eq!(product.name.as_deref(), Some("Смартфон iPhone 15 128 ГБ"));
    assert_eq!(product.brand.as_deref(), Some("Apple"));
    assert_eq!(product.price, Some(72990));
    assert_eq!(product.old_price, Some(89990));
    assert_eq!(product.reviews_count, Some(12487));
    assert_eq!(product.seller.as_deref(), Some("Цифровые технологии"));
    assert_eq!(product.rating, None);
}

#[test]
fn product_gallery_images_deduplicate() {
    let url = "https://www.wildberries.ru/catalog/146837693/detail.aspx";
    let product = product_from_page(PRODUCT_PAGE, &site(), "146837693", url);
    // Three img tags, one a repeat.
    assert_eq!(product.images.len(), 2);
    assert!(product.images.iter().all(|i| i.starts_with("https://")));
}

#[test]
fn reviews_drop_textless_blocks_and_cap_at_limit() {
    // Five blocks, the second without text: the collection is built from
    // blocks 1, 3, and 4 once the limit of three is reached.
    let reviews = reviews_from_page(REVIEWS_PAGE, &site(), 3);

    let authors: Vec<&str> = reviews
        .iter()
        .map(|r| r.author.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(authors, vec!["Анна", "Мария", "Игорь"]);
}

#[test]
fn review_ratings_count_active_stars() {
    let reviews = reviews_from_page(REVIEWS_PAGE, &site(), 30);
    assert_eq!(reviews.len(), 4);
    assert_eq!(reviews[0].rating, Some(5));
    assert_eq!(reviews[1].rating, Some(3));
    assert_eq!(reviews[3].rating, Some(4));
    assert!(reviews.iter().all(|r| !r.text.is_empty()));
}

#[test]
fn sellers_come_from_the_same_product_snapshot() {
    let sellers = sellers_from_page(PRODUCT_PAGE, &site());
    // Only the main seller is present before the expander renders its list.
    assert_eq!(sellers.len(), 1);
    assert_eq!(sellers[0].name, "Цифровые технологии");
    assert_eq!(sellers[0].price, Some(72990));
}
