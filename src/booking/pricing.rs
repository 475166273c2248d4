//! Stay pricing. Amounts are integer cents throughout.

use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::constants::policy::{BILLING_CYCLE_DAYS, YEARLY_RATE_MIN_DAYS};
use crate::error::{BookingError, Result};
use crate::models::Room;

/// Which rate a stay was billed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateBasis {
    Monthly,
    Yearly,
}

/// Itemized price for one stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub days: i64,
    pub basis: RateBasis,
    pub base_cents: i64,
    pub discount_percent: u8,
    pub discount_cents: i64,
    pub cleaning_fee_cents: i64,
    pub total_cents: i64,
}

/// Price `days` nights in `room`.
///
/// Monthly rates are pro-rated per day over a 30-day cycle and discounted by
/// the longest matching tier. Stays of a year or more bill at the room's
/// yearly rate when it has one, without a further tier discount. Cleaning is
/// charged once per started billing cycle.
pub fn quote(
    room: &Room,
    days: i64,
    cleaning_service: bool,
    config: &PricingConfig,
) -> Result<PriceQuote> {
    if days <= 0 {
        return Err(BookingError::validation("days", "stay must be at least one day"));
    }

    let yearly_rate = room
        .yearly_rate_cents
        .filter(|_| days >= YEARLY_RATE_MIN_DAYS);

    let (basis, base_cents, discount_percent) = match yearly_rate {
        Some(rate) => (RateBasis::Yearly, prorate(rate, days, YEARLY_RATE_MIN_DAYS), 0),
        None => (
            RateBasis::Monthly,
            prorate(room.monthly_rate_cents, days, BILLING_CYCLE_DAYS),
            discount_for(days, config),
        ),
    };

    let discount_cents = base_cents * i64::from(discount_percent) / 100;
    let cleaning_fee_cents = if cleaning_service {
        started_cycles(days) * config.cleaning_fee_cents
    } else {
        0
    };

    Ok(PriceQuote {
        days,
        basis,
        base_cents,
        discount_percent,
        discount_cents,
        cleaning_fee_cents,
        total_cents: base_cents - discount_cents + cleaning_fee_cents,
    })
}

/// `rate` covers `period` days; round to the nearest cent
fn prorate(rate: i64, days: i64, period: i64) -> i64 {
    (rate * days + period / 2) / period
}

fn discount_for(days: i64, config: &PricingConfig) -> u8 {
    config
        .discounts
        .iter()
        .filter(|tier| days >= tier.min_days)
        .map(|tier| tier.percent_off)
        .max()
        .unwrap_or(0)
}

fn started_cycles(days: i64) -> i64 {
    (days + BILLING_CYCLE_DAYS - 1) / BILLING_CYCLE_DAYS
}
