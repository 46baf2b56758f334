//! Per-field selector tables.
//!
//! Selector strings are configuration data for a target site, kept apart from
//! the extraction algorithm. Each semantic field carries an ordered fallback
//! list; markup on the target shifts between releases, and the first selector
//! that matches wins.

use scraper::Selector;
use std::sync::OnceLock;

use crate::core::site::SiteProfile;

/// An ordered list of compiled selectors tried in sequence.
pub struct SelectorList {
    compiled: Vec<Selector>,
}

impl SelectorList {
    pub fn new(patterns: &[&str]) -> Self {
        Self {
            compiled: patterns
                .iter()
                .map(|p| Selector::parse(p).expect("valid static selector"))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.compiled.iter()
    }
}

pub struct SiteSelectors {
    // Listing cards
    pub product_card: SelectorList,
    /// Structural identifier attribute on the card element itself.
    pub card_id_attr: &'static str,
    /// Links inspected for an identifier when the attribute is absent.
    pub card_link: SelectorList,
    pub card_name: SelectorList,
    pub card_brand: SelectorList,
    pub card_price: SelectorList,
    pub card_rating: SelectorList,

    // Product page
    pub product_name: SelectorList,
    pub product_brand: SelectorList,
    pub product_price: SelectorList,
    pub product_old_price: SelectorList,
    pub product_rating: SelectorList,
    pub product_reviews_count: SelectorList,
    pub product_seller: SelectorList,
    pub product_images: SelectorList,

    // Review blocks
    pub review_block: SelectorList,
    pub review_text: SelectorList,
    pub review_star_active: SelectorList,
    pub review_author: SelectorList,
    pub review_date: SelectorList,

    // Seller list entries
    pub seller_item: SelectorList,
    pub seller_item_name: SelectorList,
    pub seller_item_price: SelectorList,

    // Live-page selectors: settle polls and interactions over CDP.
    pub listing_ready: &'static str,
    pub product_ready: &'static str,
    pub reviews_ready: &'static str,
    pub sellers_expander: &'static str,
}

impl SiteSelectors {
    fn wildberries() -> Self {
        Self {
            product_card: SelectorList::new(&["article.product-card"]),
            card_id_attr: "data-nm-id",
            card_link: SelectorList::new(&[
                "a.product-card__link",
                "a[href*='/product/']",
                "a[href*='/catalog/']",
            ]),
            card_name: SelectorList::new(&["span.product-card__name"]),
            card_brand: SelectorList::new(&["span.product-card__brand"]),
            card_price: SelectorList::new(&["ins.price__lower-price"]),
            card_rating: SelectorList::new(&["span.address-rate-mini"]),

            product_name: SelectorList::new(&["h1.product-page__title", "h1"]),
            product_brand: SelectorList::new(&["a.product-page__header-brand"]),
            product_price: SelectorList::new(&["ins.price-block__final-price"]),
            product_old_price: SelectorList::new(&["del.price-block__old-price"]),
            product_rating: SelectorList::new(&["span.product-review__rating"]),
            product_reviews_count: SelectorList::new(&["span.product-review__count-review"]),
            product_seller: SelectorList::new(&["a.seller-info__name"]),
            product_images: SelectorList::new(&[
                "div.product-page__gallery img",
                "img.photo-zoom__preview",
            ]),

            review_block: SelectorList::new(&[".feedback"]),
            review_text: SelectorList::new(&[".feedback__text"]),
            review_star_active: SelectorList::new(&[".feedback__rating svg.active"]),
            review_author: SelectorList::new(&[".feedback__header-author"]),
            review_date: SelectorList::new(&[".feedback__date"]),

            seller_item: SelectorList::new(&[".sellers-list__item"]),
            seller_item_name: SelectorList::new(&[".seller-name"]),
            seller_item_price: SelectorList::new(&[".price"]),

            listing_ready: "article.product-card",
            product_ready: ".product-page",
            reviews_ready: ".feedback",
            sellers_expander: "button.seller-info__more",
        }
    }
}

static WILDBERRIES: OnceLock<SiteSelectors> = OnceLock::new();

/// Selector table for a site profile. One profile ships today; the lookup
/// keeps extraction call sites site-agnostic.
pub fn for_site(_site: &SiteProfile) -> &'static SiteSelectors {
    WILDBERRIES.get_or_init(SiteSelectors::wildberries)
}
