use crate::config::RulesConfig;
use crate::state::CurrencyBag;

use super::CurrencyHolder;

/// Result of a currency award.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurrencyAward {
    /// Amount each destination received, in destination order.
    pub shares: Vec<CurrencyBag>,
    /// New balances of the awarded denominations, in destination order.
    pub balances: Vec<CurrencyBag>,
    /// New balances of the origin, when there is one.
    pub origin: Option<CurrencyBag>,
}

impl CurrencyAward {
    /// Sum of all shares of one denomination.
    pub fn total(&self, denomination: &str) -> i64 {
        self.shares.iter().map(|share| share.get(denomination)).sum()
    }
}

/// Split `amounts` across `destinations`, optionally drawing from `origin`.
///
/// With `each` set every destination is owed the full amount. The owed total is
/// bounded by the origin's stock; it is then walked destination by destination,
/// each taking the remaining amount over the remaining destinations, rounded
/// away from zero so a remainder lands on earlier destinations. A share never
/// takes a destination below zero nor exceeds what the origin still holds.
pub fn award_currency(
    amounts: &CurrencyBag,
    destinations: &[&dyn CurrencyHolder],
    each: bool,
    origin: Option<&dyn CurrencyHolder>,
) -> CurrencyAward {
    let mut award = CurrencyAward {
        shares: vec![CurrencyBag::new(); destinations.len()],
        balances: vec![CurrencyBag::new(); destinations.len()],
        origin: origin.map(|origin| origin.currency().clone()),
    };
    if destinations.is_empty() {
        return award;
    }
    let count = destinations.len() as i64;

    for (key, amount) in amounts.iter() {
        if amount == 0 {
            continue;
        }
        let mut remaining = if each { amount.saturating_mul(count) } else { amount };
        if let Some(stock) = &award.origin {
            remaining = remaining.min(stock.get(key));
        }

        let mut left = count;
        for (index, destination) in destinations.iter().enumerate() {
            let balance = destination.balance(key);
            let mut share = split(remaining, left).max(-balance);
            if let Some(stock) = &award.origin {
                share = share.min(stock.get(key));
            }

            remaining -= share;
            left -= 1;
            if let Some(stock) = award.origin.as_mut() {
                stock.add(key, -share);
            }
            award.shares[index].set(key, share);
            award.balances[index].set(key, balance + share);
        }
    }
    award
}

/// `amount / parts`, rounded away from zero.
fn split(amount: i64, parts: i64) -> i64 {
    let quotient = amount / parts;
    if amount % parts == 0 {
        quotient
    } else {
        quotient + amount.signum()
    }
}

/// Move `amounts` out of `origin` into `destinations`.
pub fn transfer_currency(
    origin: &dyn CurrencyHolder,
    destinations: &[&dyn CurrencyHolder],
    amounts: &CurrencyBag,
) -> CurrencyAward {
    award_currency(amounts, destinations, false, Some(origin))
}

/// Re-issue `bag` in the fewest coins, highest value first.
///
/// Denominations without a conversion rate, or unknown to `rules`, keep their
/// amounts.
pub fn convert_currency(bag: &CurrencyBag, rules: &RulesConfig) -> CurrencyBag {
    let mut rates: Vec<(&str, f64)> = rules
        .currencies
        .iter()
        .filter(|denomination| denomination.conversion > 0.0)
        .map(|denomination| (denomination.key.as_str(), denomination.conversion))
        .collect();
    rates.sort_by(|a, b| a.1.total_cmp(&b.1));
    let Some(&(_, finest)) = rates.last() else {
        return bag.clone();
    };

    // Value of one coin in units of the finest denomination.
    let units: Vec<(&str, i64)> = rates
        .iter()
        .map(|&(key, rate)| (key, ((finest / rate).round() as i64).max(1)))
        .collect();

    let mut basis: i64 = units
        .iter()
        .map(|&(key, unit)| bag.get(key).saturating_mul(unit))
        .sum();

    let mut converted = bag.clone();
    for (key, unit) in units {
        let amount = basis.div_euclid(unit);
        basis -= amount * unit;
        converted.set(key, amount);
    }
    converted
}
