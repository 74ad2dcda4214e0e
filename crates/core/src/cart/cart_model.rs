//! Cart domain models and pure derivations over line items.

use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Prefix of client-generated ids for lines the server has not confirmed yet.
pub const TEMP_LINE_ID_PREFIX: &str = "temp_";

/// Product details embedded in a cart line by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    /// Decimal string as sent by the server, e.g. "19.99".
    pub price: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductSnapshot {
    /// Parsed unit price, `None` if the server sent something unparsable.
    pub fn unit_price(&self) -> Option<Decimal> {
        Decimal::from_str(self.price.trim()).ok()
    }
}

/// Product details of a line: known from the server, or pending until the
/// line has been reconciled.
///
/// Serialized as the product object or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<ProductSnapshot>", into = "Option<ProductSnapshot>")]
pub enum ProductRef {
    Known(ProductSnapshot),
    #[default]
    Pending,
}

impl ProductRef {
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn snapshot(&self) -> Option<&ProductSnapshot> {
        match self {
            Self::Known(product) => Some(product),
            Self::Pending => None,
        }
    }

    /// Unit price if the product is known and its price parses.
    pub fn unit_price(&self) -> Option<Decimal> {
        self.snapshot().and_then(ProductSnapshot::unit_price)
    }
}

impl From<Option<ProductSnapshot>> for ProductRef {
    fn from(value: Option<ProductSnapshot>) -> Self {
        value.map_or(Self::Pending, Self::Known)
    }
}

impl From<ProductRef> for Option<ProductSnapshot> {
    fn from(value: ProductRef) -> Self {
        match value {
            ProductRef::Known(product) => Some(product),
            ProductRef::Pending => None,
        }
    }
}

/// One line item of a session cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(alias = "_id")]
    pub id: String,
    pub session_id: String,
    pub product_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub product: ProductRef,
}

impl CartLine {
    /// A line created locally before the server has seen it.
    pub fn pending(id: String, session_id: &str, product_id: &str, quantity: u32) -> Self {
        Self {
            id,
            session_id: session_id.to_string(),
            product_id: product_id.to_string(),
            quantity,
            product: ProductRef::Pending,
        }
    }

    /// True for optimistic lines carrying a client-generated id.
    pub fn is_temporary(&self) -> bool {
        self.id.starts_with(TEMP_LINE_ID_PREFIX)
    }

    /// `quantity * unit price`, or `None` when the price is unknown or the
    /// product does not fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        self.product
            .unit_price()
            .and_then(|price| price.checked_mul(Decimal::from(self.quantity)))
    }
}

/// Aggregates derived from a line sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    pub item_count: u32,
    pub total: Decimal,
    /// Lines whose price is unknown and therefore counted as zero in `total`.
    pub unpriced_lines: usize,
}

/// Derives item count and total from `items`.
///
/// Lines without a known, parsable price contribute zero to `total` and are
/// counted in `unpriced_lines`. So are lines whose amount overflows.
pub fn derive_totals(items: &[CartLine]) -> CartTotals {
    items.iter().fold(CartTotals::default(), |mut acc, line| {
        acc.item_count = acc.item_count.saturating_add(line.quantity);
        let priced = line
            .line_total()
            .and_then(|amount| acc.total.checked_add(amount));
        match priced {
            Some(total) => acc.total = total,
            None => {
                if line.product.unit_price().is_some() {
                    warn!(
                        "[Cart] Total of line {} overflows, counting it as unpriced",
                        line.id
                    );
                }
                acc.unpriced_lines += 1;
            }
        }
        acc
    })
}

/// Folds lines sharing a `product_id` into one, summing quantities.
///
/// The surviving line keeps the position of the first occurrence and the id
/// of the first server-confirmed line in the group; a known product wins over
/// a pending one. Zero-quantity lines are dropped.
pub fn merge_duplicate_lines(items: Vec<CartLine>) -> Vec<CartLine> {
    let mut merged: Vec<CartLine> = Vec::with_capacity(items.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for line in items.into_iter().filter(|line| line.quantity > 0) {
        let Some(&index) = positions.get(&line.product_id) else {
            positions.insert(line.product_id.clone(), merged.len());
            merged.push(line);
            continue;
        };

        let existing = &mut merged[index];
        existing.quantity = existing.quantity.saturating_add(line.quantity);
        if existing.is_temporary() && !line.is_temporary() {
            existing.id = line.id;
            existing.session_id = line.session_id;
        }
        if !existing.product.is_known() && line.product.is_known() {
            existing.product = line.product;
        }
    }

    merged
}

/// Durable form of the cart written to local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCartSnapshot {
    pub items: Vec<CartLine>,
    pub item_count: u32,
    pub total: Decimal,
    /// Last local write, epoch milliseconds. Metadata only.
    pub timestamp: i64,
}
