//! Record assembly: fragments in, deduplicated records out.
//!
//! The assembler walks fragments in DOM order, drops anything without an
//! identifier, skips identifiers already seen, and stops at the caller's
//! limit. The page-level entry points below are pure functions over captured
//! HTML; the same code path serves live operations and fixture tests.

use scraper::{ElementRef, Html};
use std::collections::HashSet;

use crate::core::site::SiteProfile;
use crate::core::types::{Product, Review, Seller};
use crate::extract::{
    self, count_field, first_attr, float_field, fragments, int_field, own_attr, text_field,
};
use crate::extract::selectors::{self, SiteSelectors};

/// Fold fragments into at most `limit` records, keyed by the identifier the
/// extractor returns. A fragment the extractor rejects contributes nothing; a
/// duplicate identifier is skipped, not replaced.
pub fn assemble<'a, T, I, F>(fragments: I, mut extract: F, limit: usize) -> Vec<T>
where
    I: IntoIterator<Item = ElementRef<'a>>,
    F: FnMut(ElementRef<'a>) -> Option<(String, T)>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();

    for fragment in fragments {
        if records.len() >= limit {
            break;
        }
        let Some((id, record)) = extract(fragment) else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        records.push(record);
    }
    records
}

/// Product records from a search or category listing.
pub fn products_from_listing(html: &str, site: &SiteProfile, limit: usize) -> Vec<Product> {
    let doc = Html::parse_document(html);
    let sel = selectors::for_site(site);
    let cards = fragments(doc.root_element(), &sel.product_card);

    assemble(cards, |card| product_from_card(card, site, sel), limit)
}

fn product_from_card(
    card: ElementRef<'_>,
    site: &SiteProfile,
    sel: &SiteSelectors,
) -> Option<(String, Product)> {
    // Identifier: structural attribute on the card, else a pattern capture
    // from a link URL. Neither present ⇒ this element is not a product record.
    let id = own_attr(card, sel.card_id_attr).or_else(|| {
        first_attr(card, &sel.card_link, "href")
            .and_then(|href| extract::product_id_from_url(&href))
    })?;

    let mut product = Product::new(id.clone(), site.product_url(&id).to_string());
    product.name = text_field(card, &sel.card_name);
    product.brand = text_field(card, &sel.card_brand);
    product.price = int_field(card, &sel.card_price);
    product.rating = float_field(card, &sel.card_rating);

    Some((id, product))
}

/// Best-effort product detail from a product page. The identifier and URL are
/// already known from the navigation; every page field is optional.
pub fn product_from_page(html: &str, site: &SiteProfile, id: &str, url: &str) -> Product {
    let doc = Html::parse_document(html);
    let sel = selectors::for_site(site);
    let root = doc.root_element();

    let mut product = Product::new(id, url);
    product.name = text_field(root, &sel.product_name);
    product.brand = text_field(root, &sel.product_brand);
    product.price = int_field(root, &sel.product_price);
    product.old_price = int_field(root, &sel.product_old_price);
    product.rating = float_field(root, &sel.product_rating);
    product.reviews_count = int_field(root, &sel.product_reviews_count);
    product.seller = text_field(root, &sel.product_seller);
    product.images = gallery_images(root, sel, site);
    product
}

fn gallery_images(root: ElementRef<'_>, sel: &SiteSelectors, site: &SiteProfile) -> Vec<String> {
    let mut seen = HashSet::new();
    fragments(root, &sel.product_images)
        .into_iter()
        .filter_map(|img| img.value().attr("src"))
        .map(|src| site.absolute(src))
        .filter(|src| seen.insert(src.clone()))
        .collect()
}

/// Review records; a block without text is not a review. The text doubles as
/// the identity key, so verbatim duplicates collapse.
pub fn reviews_from_page(html: &str, site: &SiteProfile, limit: usize) -> Vec<Review> {
    let doc = Html::parse_document(html);
    let sel = selectors::for_site(site);
    let blocks = fragments(doc.root_element(), &sel.review_block);

    assemble(
        blocks,
        |block| {
            let text = text_field(block, &sel.review_text)?;
            let stars = count_field(block, &sel.review_star_active);
            let review = Review {
                text: text.clone(),
                rating: (stars > 0).then_some(stars as u32),
                author: text_field(block, &sel.review_author),
                date: text_field(block, &sel.review_date),
            };
            Some((text, review))
        },
        limit,
    )
}

/// Sellers offering the product: the page-level main seller first, then the
/// expanded seller-list entries, deduplicated by name.
pub fn sellers_from_page(html: &str, site: &SiteProfile) -> Vec<Seller> {
    let doc = Html::parse_document(html);
    let sel = selectors::for_site(site);
    let root = doc.root_element();

    let mut seen: HashSet<String> = HashSet::new();
    let mut sellers = Vec::new();

    if let Some(name) = text_field(root, &sel.product_seller) {
        seen.insert(name.clone());
        sellers.push(Seller {
            name,
            price: int_field(root, &sel.product_price),
        });
    }

    let items = fragments(root, &sel.seller_item);
    sellers.extend(assemble(
        items,
        |item| {
            let name = text_field(item, &sel.seller_item_name)?;
            if seen.contains(&name) {
                return None;
            }
            let seller = Seller {
                price: int_field(item, &sel.seller_item_price),
                name: name.clone(),
            };
            Some((name, seller))
        },
        usize::MAX,
    ));

    sellers
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn site() -> SiteProfile {
        SiteProfile::wildberries()
    }

    #[test]
    fn assemble_drops_identifierless_and_duplicate_fragments() {
        let html = Html::parse_document(
            "<ul>\
             <li data-id='1'>a</li>\
             <li>no id</li>\
             <li data-id='2'>b</li>\
             <li data-id='1'>dup</li>\
             <li data-id='3'>c</li>\
             </ul>",
        );
        let sel = scraper::Selector::parse("li").unwrap();
        let items = html.root_element().select(&sel);

        let out = assemble(
            items,
            |li| {
                let id = li.value().attr("data-id")?.to_string();
                Some((id.clone(), id))
            },
            10,
        );
        assert_eq!(out, vec!["1", "2", "3"]);
    }

    #[test]
    fn assemble_stops_at_limit_in_dom_order() {
        let html = Html::parse_document(
            "<ul><li data-id='1'/><li data-id='2'/><li data-id='3'/></ul>",
        );
        let sel = scraper::Selector::parse("li").unwrap();
        let items = html.root_element().select(&sel);

        let out = assemble(
            items,
            |li| {
                let id = li.value().attr("data-id")?.to_string();
                Some((id.clone(), id))
            },
            2,
        );
        assert_eq!(out, vec!["1", "2"]);
    }

    #[test]
    fn card_without_identifier_is_not_a_product() {
        let html = r#"
            <main>
              <article class="product-card">
                <span class="product-card__name">Безымянный товар</span>
              </article>
            </main>"#;
        assert!(products_from_listing(html, &site(), 10).is_empty());
    }

    #[test]
    fn card_identifier_falls_back_to_link_capture() {
        let html = r#"
            <main>
              <article class="product-card">
                <a class="product-card__link"
                   href="/product/smartfon-apple-iphone-15-146837693"></a>
                <span class="product-card__name">Apple iPhone 15</span>
              </article>
            </main>"#;
        let products = products_from_listing(html, &site(), 10);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "146837693");
        assert!(products[0].url.contains("/catalog/146837693/"));
    }

    #[test]
    fn main_seller_price_comes_from_the_price_block() {
        let html = r#"
            <div class="product-page">
              <a class="seller-info__name">ТехноМир</a>
              <ins class="price-block__final-price">54 990 ₽</ins>
              <div class="sellers-list__item">
                <span class="seller-name">ТехноМир</span>
                <span class="price">54 990 ₽</span>
              </div>
              <div class="sellers-list__item">
                <span class="seller-name">ГаджетПро</span>
                <span class="price">55 400 ₽</span>
              </div>
            </div>"#;
        let sellers = sellers_from_page(html, &site());
        assert_eq!(sellers.len(), 2);
        assert_eq!(sellers[0].name, "ТехноМир");
        assert_eq!(sellers[0].price, Some(54990));
        assert_eq!(sellers[1].name, "ГаджетПро");
        assert_eq!(sellers[1].price, Some(55400));
    }
}
