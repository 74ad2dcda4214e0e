//! Demo product catalog used to embed product details in cart lines.

use std::collections::HashMap;

use storefront_core::cart::ProductSnapshot;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: HashMap<String, ProductSnapshot>,
}

impl Catalog {
    pub fn new(products: impl IntoIterator<Item = ProductSnapshot>) -> Self {
        Self {
            products: products
                .into_iter()
                .map(|product| (product.id.clone(), product))
                .collect(),
        }
    }

    /// A handful of products for local development and tests.
    pub fn demo() -> Self {
        let product = |id: &str, name: &str, price: &str| ProductSnapshot {
            id: id.to_string(),
            name: name.to_string(),
            price: price.to_string(),
            images: vec![format!("/images/products/{}.jpg", id)],
        };
        Self::new([
            product("p-lamp", "Desk Lamp", "39.90"),
            product("p-chair", "Oak Chair", "149.00"),
            product("p-mug", "Stoneware Mug", "12.50"),
            product("p-rug", "Wool Rug", "219.99"),
        ])
    }

    pub fn get(&self, product_id: &str) -> Option<&ProductSnapshot> {
        self.products.get(product_id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
