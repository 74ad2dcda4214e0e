use rust_decimal::Decimal;

use super::cart_model::{derive_totals, CartLine, CartTotals};

/// In-memory cart as presented to the UI.
///
/// Totals are recomputed whenever `items` change and are never set on their
/// own. `version` is the tick of the change that produced this state; the
/// engine uses it to drop responses that were requested before a newer
/// change was applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartState {
    items: Vec<CartLine>,
    totals: CartTotals,
    version: u64,
}

impl CartState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<CartLine>) -> Self {
        let totals = derive_totals(&items);
        Self {
            items,
            totals,
            version: 0,
        }
    }

    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartLine> {
        self.items
    }

    pub fn item_count(&self) -> u32 {
        self.totals.item_count
    }

    pub fn total(&self) -> Decimal {
        self.totals.total
    }

    pub fn totals(&self) -> CartTotals {
        self.totals
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines still waiting for product details from the server.
    pub fn pending_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.items.iter().filter(|line| !line.product.is_known())
    }

    pub fn find_line(&self, item_id: &str) -> Option<&CartLine> {
        self.items.iter().find(|line| line.id == item_id)
    }

    /// Replaces all lines and stamps the state with `version`.
    pub(crate) fn replace_items(&mut self, items: Vec<CartLine>, version: u64) {
        self.items = items;
        self.refresh(version);
    }

    pub(crate) fn push_line(&mut self, line: CartLine, version: u64) {
        self.items.push(line);
        self.refresh(version);
    }

    /// Sets the quantity of the line with `item_id`. Returns false if absent.
    pub(crate) fn set_quantity(&mut self, item_id: &str, quantity: u32, version: u64) -> bool {
        let Some(line) = self.items.iter_mut().find(|line| line.id == item_id) else {
            return false;
        };
        line.quantity = quantity;
        self.refresh(version);
        true
    }

    /// Drops the line with `item_id`. Returns false if absent.
    pub(crate) fn remove_line(&mut self, item_id: &str, version: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.id != item_id);
        if self.items.len() == before {
            return false;
        }
        self.refresh(version);
        true
    }

    fn refresh(&mut self, version: u64) {
        self.totals = derive_totals(&self.items);
        self.version = version;
    }
}
