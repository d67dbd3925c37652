//! Distribution of currency and experience across recipients.
//!
//! These functions only compute: they read balances through the holder traits
//! and return the new balances for the caller to write. None of them fail;
//! clamping keeps every balance non-negative, so a short transfer shows up as a
//! smaller share rather than an error.

mod currency;
mod experience;

pub use currency::{CurrencyAward, award_currency, convert_currency, transfer_currency};
pub use experience::{XpAward, award_xp};

use crate::state::{ActorKind, ActorState, CurrencyBag, ItemState};

/// Anything holding a currency bag: actors, container items, loose bags.
pub trait CurrencyHolder {
    fn currency(&self) -> &CurrencyBag;

    fn balance(&self, denomination: &str) -> i64 {
        self.currency().get(denomination)
    }
}

impl CurrencyHolder for CurrencyBag {
    fn currency(&self) -> &CurrencyBag {
        self
    }
}

impl CurrencyHolder for ActorState {
    fn currency(&self) -> &CurrencyBag {
        &self.currency
    }
}

impl CurrencyHolder for ItemState {
    fn currency(&self) -> &CurrencyBag {
        &self.currency
    }
}

/// Anything that can receive experience points.
pub trait ExperienceHolder {
    fn experience_kind(&self) -> ActorKind;
    fn experience(&self) -> i64;
}

impl ExperienceHolder for ActorState {
    fn experience_kind(&self) -> ActorKind {
        self.kind
    }

    fn experience(&self) -> i64 {
        self.xp
    }
}
