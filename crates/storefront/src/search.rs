//! Client-side product filter.
//!
//! Filters whatever product cards are currently rendered by case-insensitive
//! substring match. There is no index and no pagination.

use tracing::instrument;

use crate::controller::Storefront;
use crate::notifications::Severity;
use crate::page::{CardVisibility, Page, ProductCard};
use crate::storage::KeyValueStore;

/// Result of a search pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub matched: usize,
    pub total: usize,
}

/// Normalize a raw query. Returns `None` for blank input.
#[must_use]
pub fn normalize_query(raw: &str) -> Option<String> {
    let term = raw.trim().to_lowercase();
    (!term.is_empty()).then_some(term)
}

/// Whether the name of `card` contains an already-normalized `term`.
#[must_use]
pub fn matches(card: &ProductCard, term: &str) -> bool {
    card.name.to_lowercase().contains(term)
}

impl<S: KeyValueStore, P: Page> Storefront<S, P> {
    /// Show cards matching `raw`, hide the rest.
    ///
    /// Blank queries leave the listing untouched and return `None`.
    #[instrument(skip(self))]
    pub fn search(&mut self, raw: &str) -> Option<SearchOutcome> {
        let Some(term) = normalize_query(raw) else {
            self.notify("Please enter a search term!", Severity::Warning);
            return None;
        };

        let cards = self.page.product_cards();
        let mut matched = 0;
        for (index, card) in cards.iter().enumerate() {
            if matches(card, &term) {
                self.page
                    .set_card_visibility(index, CardVisibility::Shown { animate: true });
                matched += 1;
            } else {
                self.page.set_card_visibility(index, CardVisibility::Hidden);
            }
        }

        let outcome = SearchOutcome {
            matched,
            total: cards.len(),
        };
        tracing::info!(matched, total = outcome.total, "Search complete");

        if matched == 0 {
            self.notify("No products found matching your search!", Severity::Info);
        } else {
            self.notify(format!("Found {matched} product(s)!"), Severity::Success);
        }
        Some(outcome)
    }
}
