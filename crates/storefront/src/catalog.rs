//! Static product catalog.
//!
//! The catalog is loaded once at startup and never mutated. By default it is
//! the built-in product list shipped with the crate; a JSON or YAML file with
//! the same shape can replace it.
//!
//! ```
//! use corner_shop_storefront::catalog::{Catalog, CategoryFilter, SortOrder};
//!
//! let catalog = Catalog::builtin();
//! let cheapest = catalog.browse(&CategoryFilter::All, SortOrder::PriceLowToHigh);
//! assert_eq!(cheapest[0].name, "Water Bottle");
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use corner_shop_core::ProductId;

use crate::models::Product;

const BUILTIN_PRODUCTS: &str = include_str!("../data/products.json");

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("cannot read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON.
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is not valid YAML.
    #[error("invalid catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Two products share an ID.
    #[error("duplicate product id in catalog: {0}")]
    DuplicateProduct(ProductId),
}

/// Which categories to list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    fn accepts(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => &product.category == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Category(s.to_owned()))
        }
    }
}

/// Listing order for [`Catalog::browse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Catalog order.
    #[default]
    Default,
    PriceLowToHigh,
    PriceHighToLow,
    /// Alphabetical by name.
    Name,
    /// Highest rated first.
    Rating,
}

impl SortOrder {
    /// Every order, in the order a picker would offer them.
    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::PriceLowToHigh,
        Self::PriceHighToLow,
        Self::Name,
        Self::Rating,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriceLowToHigh => "price-low",
            Self::PriceHighToLow => "price-high",
            Self::Name => "name",
            Self::Rating => "rating",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Default => Ordering::Equal,
            Self::PriceLowToHigh => a.price.cmp(&b.price),
            Self::PriceHighToLow => b.price.cmp(&a.price),
            Self::Name => a
                .name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
            Self::Rating => b.rating.total_cmp(&a.rating),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|o| o.as_str()).collect();
                format!("invalid sort order: {s} (expected one of {})", valid.join(", "))
            })
    }
}

/// Read-only product list, cheap to clone.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Arc<[Product]>,
}

impl Catalog {
    /// Build a catalog from products, rejecting duplicate IDs.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateProduct` if two products share an ID.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for product in &products {
            if !seen.insert(&product.id) {
                return Err(CatalogError::DuplicateProduct(product.id.clone()));
            }
        }
        Ok(Self {
            products: products.into(),
        })
    }

    /// The product list bundled with the crate.
    ///
    /// # Panics
    ///
    /// Panics if the bundled document is invalid, which the tests rule out.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_PRODUCTS).expect("bundled catalog is valid")
    }

    /// Parse a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the document is invalid or has duplicate IDs.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Parse a YAML sequence of products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the document is invalid or has duplicate IDs.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        Self::new(serde_yaml::from_str(yaml)?)
    }

    /// Load a catalog file; `.json` files are parsed as JSON, anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let catalog = if is_json {
            Self::from_json(&contents)?
        } else {
            Self::from_yaml(&contents)?
        };

        tracing::info!(path = %path.display(), products = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Distinct categories in order of first appearance.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for product in self.products.iter() {
            if !categories.contains(&product.category.as_str()) {
                categories.push(&product.category);
            }
        }
        categories
    }

    /// Products matching `filter`, ordered by `sort`.
    ///
    /// Sorting is stable: ties keep catalog order.
    #[must_use]
    pub fn browse(&self, filter: &CategoryFilter, sort: SortOrder) -> Vec<&Product> {
        let mut products: Vec<&Product> =
            self.products.iter().filter(|p| filter.accepts(p)).collect();
        products.sort_by(|a, b| sort.compare(a, b));
        products
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn names(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 12);

        let headphones = catalog.get(&ProductId::new("prod_001")).unwrap();
        assert_eq!(headphones.name, "Wireless Headphones");
        assert_eq!(headphones.price.to_string(), "$79.99");
        assert!(headphones.in_stock);

        let coffee = catalog.get(&ProductId::new("prod_005")).unwrap();
        assert!(!coffee.in_stock);

        assert!(catalog.get(&ProductId::new("prod_999")).is_none());
    }

    #[test]
    fn test_categories_in_first_appearance_order() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.categories(),
            vec![
                "Electronics",
                "Accessories",
                "Footwear",
                "Home & Kitchen",
                "Sports",
                "Clothing"
            ]
        );
    }

    #[test]
    fn test_browse_filter() {
        let catalog = Catalog::builtin();
        let sports = catalog.browse(
            &CategoryFilter::Category("Sports".to_owned()),
            SortOrder::Default,
        );
        assert_eq!(names(&sports), vec!["Yoga Mat", "Water Bottle"]);

        let none = catalog.browse(
            &CategoryFilter::Category("Garden".to_owned()),
            SortOrder::Default,
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_browse_sorts() {
        let catalog = Catalog::builtin();

        let by_price = catalog.browse(&CategoryFilter::All, SortOrder::PriceHighToLow);
        assert_eq!(by_price.first().unwrap().name, "Smart Watch");
        assert_eq!(by_price.last().unwrap().name, "Water Bottle");

        let by_name = catalog.browse(&CategoryFilter::All, SortOrder::Name);
        assert_eq!(by_name.first().unwrap().name, "Bluetooth Speaker");
        assert_eq!(by_name.last().unwrap().name, "Yoga Mat");

        let by_rating = catalog.browse(&CategoryFilter::All, SortOrder::Rating);
        assert_eq!(by_rating.first().unwrap().name, "Sunglasses");
    }

    #[test]
    fn test_price_sort_is_stable() {
        // Headphones and Denim Jacket are both 79.99; catalog order wins.
        let catalog = Catalog::builtin();
        let by_price = catalog.browse(&CategoryFilter::All, SortOrder::PriceLowToHigh);
        let names = names(&by_price);
        let headphones = names.iter().position(|n| n == "Wireless Headphones");
        let jacket = names.iter().position(|n| n == "Denim Jacket");
        assert!(headphones < jacket);
    }

    #[test]
    fn test_sort_order_parse() {
        for order in SortOrder::ALL {
            assert_eq!(order.to_string().parse::<SortOrder>().unwrap(), order);
        }
        assert!("cheapest".parse::<SortOrder>().is_err());
        assert_eq!("ALL".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
- id: tea_01
  name: Green Tea
  price: 4.5
  description: Loose leaf
  image: ""
  category: Grocery
  inStock: true
  rating: 4.0
"#;
        let catalog = Catalog::from_yaml(yaml).unwrap();
        let tea = catalog.get(&ProductId::new("tea_01")).unwrap();
        assert_eq!(tea.price.to_string(), "$4.50");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let product = Catalog::builtin().products()[0].clone();
        let result = Catalog::new(vec![product.clone(), product]);
        assert!(matches!(result, Err(CatalogError::DuplicateProduct(_))));
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, BUILTIN_PRODUCTS).unwrap();
        assert_eq!(Catalog::load(&path).unwrap().len(), 12);

        let missing = Catalog::load(&dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(CatalogError::Io { .. })));
    }
}
