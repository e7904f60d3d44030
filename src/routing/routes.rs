//! The product listing route table.

use crate::routing::router::{RouteEntry, RouteError, RouteTable, View};

/// Landing path of the listing.
pub const PRODUCTS_PATH: &str = "/products";

/// Unfiltered listing, driven by the filter panel.
pub const PRODUCTS_ROUTE: &str = "products";

/// Listing narrowed to a category and subcategory.
pub const PRODUCT_LIST_ROUTE: &str = "product-list";

/// Build the route table served by the application.
///
/// | Path | Target |
/// |---|---|
/// | `/` | redirect to `/products` |
/// | `/products` | `ProductList`, no params |
/// | `/products/:categoryId/:slug` | `ProductList` with `categoryId`, `slug` |
pub fn product_listing() -> Result<RouteTable, RouteError> {
    RouteTable::new(vec![
        RouteEntry::redirect("/", PRODUCTS_PATH)?,
        RouteEntry::view(PRODUCTS_PATH, PRODUCTS_ROUTE, View::ProductList)?,
        RouteEntry::view(
            "/products/:categoryId/:slug",
            PRODUCT_LIST_ROUTE,
            View::ProductList,
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::router::{Params, Resolution};

    fn matched(path: &str) -> (String, View, Params) {
        match product_listing().unwrap().resolve(path) {
            Resolution::Matched(m) => (m.route, m.view, m.params),
            other => panic!("{} did not match a view: {:?}", path, other),
        }
    }

    #[test]
    fn test_root_redirects_to_products() {
        let table = product_listing().unwrap();
        assert_eq!(
            table.resolve("/"),
            Resolution::Redirect {
                to: "/products".into()
            }
        );
    }

    #[test]
    fn test_products_has_no_params() {
        let (route, view, params) = matched("/products");
        assert_eq!(route, PRODUCTS_ROUTE);
        assert_eq!(view, View::ProductList);
        assert!(params.is_empty());
    }

    #[test]
    fn test_category_listing_binds_segments() {
        let (route, view, params) = matched("/products/electronics/smart-phones");
        assert_eq!(route, PRODUCT_LIST_ROUTE);
        assert_eq!(view, View::ProductList);
        assert_eq!(params.len(), 2);
        assert_eq!(params["categoryId"], "electronics");
        assert_eq!(params["slug"], "smart-phones");
    }

    #[test]
    fn test_segments_are_taken_literally() {
        for (category, slug) in [("1", "a"), ("42", "mobile-accessories"), ("x_y", "Z9")] {
            let (_, _, params) = matched(&format!("/products/{}/{}", category, slug));
            assert_eq!(params["categoryId"], category);
            assert_eq!(params["slug"], slug);
        }
    }

    #[test]
    fn test_unmatched_paths() {
        let table = product_listing().unwrap();
        for path in ["/products/electronics", "/cart", "/products/a/b/c"] {
            assert!(
                matches!(table.resolve(path), Resolution::NotFound { .. }),
                "{} should not match",
                path
            );
        }
    }

    #[test]
    fn test_links_round_trip() {
        let table = product_listing().unwrap();
        let mut params = Params::new();
        params.insert("categoryId".into(), "electronics".into());
        params.insert("slug".into(), "smart-phones".into());

        let href = table.url_for(PRODUCT_LIST_ROUTE, &params).unwrap();
        assert_eq!(href, "/products/electronics/smart-phones");
        assert_eq!(matched(&href).2, params);
        assert_eq!(table.url_for(PRODUCTS_ROUTE, &Params::new()).unwrap(), "/products");
    }
}
