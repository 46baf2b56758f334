//! Field extraction over parsed HTML.
//!
//! Every lookup returns `Option`: a missing element, an empty text node, or a
//! value that fails to normalize all degrade the field to absent. Nothing at
//! this layer can abort an operation; per-field faults stop here.

pub mod assemble;
pub mod selectors;

use regex::Regex;
use scraper::ElementRef;
use std::sync::OnceLock;

use self::selectors::SelectorList;

/// First element matching any selector in the list, in fallback order,
/// searched among the scope's descendants.
pub fn first_match<'a>(scope: ElementRef<'a>, list: &SelectorList) -> Option<ElementRef<'a>> {
    list.iter().find_map(|sel| scope.select(sel).next())
}

/// All elements for the first selector in the list that matches anything.
pub fn fragments<'a>(scope: ElementRef<'a>, list: &SelectorList) -> Vec<ElementRef<'a>> {
    for sel in list.iter() {
        let found: Vec<_> = scope.select(sel).collect();
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

/// Trimmed, whitespace-collapsed element text; empty ⇒ absent.
pub fn text_field(scope: ElementRef<'_>, list: &SelectorList) -> Option<String> {
    first_match(scope, list).and_then(|el| clean_text(&el.text().collect::<String>()))
}

/// Integer amount field (prices, counters); see [`ruble_amount`].
pub fn int_field(scope: ElementRef<'_>, list: &SelectorList) -> Option<i64> {
    text_field(scope, list).and_then(|t| ruble_amount(&t))
}

/// Floating-point field (ratings); parse failure ⇒ absent.
pub fn float_field(scope: ElementRef<'_>, list: &SelectorList) -> Option<f64> {
    text_field(scope, list).and_then(|t| t.replace(',', ".").parse::<f64>().ok())
}

/// Count of elements matched by the first selector that matches anything
/// (star glyphs and similar count-encoded values).
pub fn count_field(scope: ElementRef<'_>, list: &SelectorList) -> usize {
    for sel in list.iter() {
        let count = scope.select(sel).count();
        if count > 0 {
            return count;
        }
    }
    0
}

/// Attribute on the scope element itself (card-level structural identifiers).
pub fn own_attr(scope: ElementRef<'_>, name: &str) -> Option<String> {
    scope
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Attribute of the first matched descendant that actually carries it.
pub fn first_attr(scope: ElementRef<'_>, list: &SelectorList, name: &str) -> Option<String> {
    list.iter()
        .flat_map(|sel| scope.select(sel))
        .find_map(|el| el.value().attr(name))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Trim and collapse internal whitespace runs; empty ⇒ absent.
pub fn clean_text(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Normalize a rendered integer amount: "1 234 ₽" parses to 1234, grouping
/// spaces and currency symbols stripped. A fraction marker (`,` or `.`
/// directly followed by a digit) makes the whole value absent; digit-stripping
/// "1 234,56" would yield 123456.
pub fn ruble_amount(text: &str) -> Option<i64> {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if (c == ',' || c == '.') && chars.peek().is_some_and(|n| n.is_ascii_digit()) {
            return None;
        }
    }
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok()
}

/// Identifier capture from a product URL path.
///
/// Two shapes are recognized: the slug form `/product/<slug>-<digits>` and the
/// canonical catalog form `/catalog/<digits>/`. No match means the link does
/// not reference a product record at all.
pub fn product_id_from_url(href: &str) -> Option<String> {
    static SLUG: OnceLock<Regex> = OnceLock::new();
    static CATALOG: OnceLock<Regex> = OnceLock::new();
    let slug = SLUG.get_or_init(|| Regex::new(r"/product/[^/]+-(\d+)").expect("valid id pattern"));
    let catalog =
        CATALOG.get_or_init(|| Regex::new(r"/catalog/(\d+)(?:/|$)").expect("valid id pattern"));

    slug.captures(href)
        .or_else(|| catalog.captures(href))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn list(patterns: &[&str]) -> SelectorList {
        SelectorList::new(patterns)
    }

    #[test]
    fn ruble_amount_strips_grouping_and_currency() {
        assert_eq!(ruble_amount("1 234 ₽"), Some(1234));
        assert_eq!(ruble_amount("12\u{a0}990 ₽"), Some(12990));
        assert_eq!(ruble_amount("549 ₽"), Some(549));
    }

    #[test]
    fn ruble_amount_refuses_decimal_fractions() {
        // The source would have produced 123456 here; documented redesign.
        assert_eq!(ruble_amount("1 234,56 ₽"), None);
        assert_eq!(ruble_amount("99.90"), None);
    }

    #[test]
    fn ruble_amount_treats_empty_as_absent_not_zero() {
        assert_eq!(ruble_amount("₽"), None);
        assert_eq!(ruble_amount(""), None);
        assert_eq!(ruble_amount("цена по запросу"), None);
    }

    #[test]
    fn product_id_captures_both_url_shapes() {
        assert_eq!(
            product_id_from_url("/product/smartfon-apple-iphone-15-128gb-146837693"),
            Some("146837693".to_string())
        );
        assert_eq!(
            product_id_from_url("https://www.wildberries.ru/catalog/482257013/detail.aspx"),
            Some("482257013".to_string())
        );
        assert_eq!(product_id_from_url("/brands/apple"), None);
    }

    #[test]
    fn text_field_collapses_whitespace_and_drops_empty() {
        let html = Html::parse_document(
            "<div><span class='name'>  Смартфон\n  Apple </span><span class='empty'>   </span></div>",
        );
        let root = html.root_element();
        assert_eq!(
            text_field(root, &list(&["span.name"])),
            Some("Смартфон Apple".to_string())
        );
        assert_eq!(text_field(root, &list(&["span.empty"])), None);
        assert_eq!(text_field(root, &list(&["span.missing"])), None);
    }

    #[test]
    fn fallback_selectors_try_in_order() {
        let html = Html::parse_document("<div><h1>Заголовок</h1></div>");
        let root = html.root_element();
        assert_eq!(
            text_field(root, &list(&["h1.product-page__title", "h1"])),
            Some("Заголовок".to_string())
        );
    }

    #[test]
    fn float_field_accepts_comma_decimal_and_rejects_garbage() {
        let html = Html::parse_document("<i><b class='r'>4,8</b><b class='x'>нет</b></i>");
        let root = html.root_element();
        assert_eq!(float_field(root, &list(&["b.r"])), Some(4.8));
        assert_eq!(float_field(root, &list(&["b.x"])), None);
    }
}
