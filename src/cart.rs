use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;

/// Session key the cart is stored under. The session holds nothing else.
pub const CART_KEY: &str = "cart";

/// One entry in the pre-checkout cart. Name and price are snapshots taken when
/// the product was added, so later product edits do not change a held cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub note: String,
}

/// Per-session cart value object. Quantity is implicitly 1 per line; adding a
/// product that is already present replaces its note instead of incrementing
/// a quantity. This mirrors the ordering flow of the restaurant and is
/// intentional, not a defect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Add a line for the product, or replace the note of the existing line.
    /// Returns `true` when a new line was appended.
    pub fn add_or_update(
        &mut self,
        product_id: Uuid,
        name: impl Into<String>,
        price: Decimal,
        note: impl Into<String>,
    ) -> bool {
        let note = note.into();
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.note = note;
            false
        } else {
            self.lines.push(CartLine {
                product_id,
                name: name.into(),
                price,
                note,
            });
            true
        }
    }

    /// Replace the note of the line at `index`. Returns `false` when the index
    /// is out of bounds.
    pub fn update_note(&mut self, index: usize, note: impl Into<String>) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => {
                line.note = note.into();
                true
            }
            None => false,
        }
    }

    /// Remove the line at `index`, returning it if the index was valid.
    pub fn remove(&mut self, index: usize) -> Option<CartLine> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of the captured line prices.
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|l| l.price).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Read the cart out of the session, defaulting to an empty one.
pub async fn load(session: &Session) -> AppResult<Cart> {
    Ok(session.get::<Cart>(CART_KEY).await?.unwrap_or_default())
}

/// Write the cart back into the session.
pub async fn store(session: &Session, cart: &Cart) -> AppResult<()> {
    session.insert(CART_KEY, cart).await?;
    Ok(())
}

/// Drop the cart from the session entirely (logout, clear, successful checkout).
pub async fn clear(session: &Session) -> AppResult<()> {
    session.remove::<Cart>(CART_KEY).await?;
    Ok(())
}
