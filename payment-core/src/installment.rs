//! Installment planner
//!
//! Amortizes a total amount into N monthly payments, optionally with
//! interest.
//!
//! # Rounding policy
//!
//! Every installment is in whole cents. Zero-interest plans floor the
//! equal share to cents and hand the leftover cents to the trailing
//! installments one each, so the schedule sums to the total exactly and no
//! installment can go negative. Interest-bearing plans use the standard
//! amortized-loan formula with monthly rate `annual / 12`, rounded to
//! cents per payment; the last payment clears the residual balance
//! exactly, so principal portions always sum to the total.

use crate::{Error, InstallmentPayment, InstallmentPlan, InstallmentStatus, Result};
use chrono::{DateTime, Months, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Planner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Largest allowed number of payments
    pub max_payments: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { max_payments: 36 }
    }
}

/// Installment plan request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Payment to attach the plan to, if any
    #[serde(default)]
    pub payment_id: Option<Uuid>,

    /// Total amount to amortize
    pub total_amount: Decimal,

    /// Number of monthly payments
    pub number_of_payments: u32,

    /// Annual interest rate as a fraction (0.12 = 12% APR), defaults to 0
    #[serde(default)]
    pub annual_interest_rate: Decimal,

    /// Due date of the first installment
    pub start_date: DateTime<Utc>,
}

/// Installment planner
pub struct InstallmentPlanner {
    config: PlannerConfig,
}

impl InstallmentPlanner {
    /// Create a planner
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Generate a plan from the request
    pub fn build(&self, request: &PlanRequest, now: DateTime<Utc>) -> Result<InstallmentPlan> {
        if request.total_amount <= Decimal::ZERO {
            return Err(Error::Validation(format!(
                "plan total must be positive (got {})",
                request.total_amount
            )));
        }
        if request.number_of_payments == 0 || request.number_of_payments > self.config.max_payments
        {
            return Err(Error::Validation(format!(
                "number of payments {} outside 1..{}",
                request.number_of_payments, self.config.max_payments
            )));
        }
        if request.annual_interest_rate < Decimal::ZERO
            || request.annual_interest_rate >= Decimal::ONE
        {
            return Err(Error::Validation(format!(
                "annual interest rate {} outside [0, 1)",
                request.annual_interest_rate
            )));
        }

        let (monthly_payment, payments) = if request.annual_interest_rate.is_zero() {
            equal_split(request)?
        } else {
            amortize(request)?
        };

        Ok(InstallmentPlan {
            id: Uuid::new_v4(),
            payment_id: request.payment_id,
            total_amount: request.total_amount,
            number_of_payments: request.number_of_payments,
            annual_interest_rate: request.annual_interest_rate,
            monthly_payment,
            payments,
            created_at: now,
        })
    }
}

/// Zero-interest split: equal installments floored to cents, leftover
/// cents on the trailing installments one each
fn equal_split(request: &PlanRequest) -> Result<(Decimal, Vec<InstallmentPayment>)> {
    let n = request.number_of_payments;
    let n_dec = Decimal::from(n);
    let cent = Decimal::new(1, 2);

    // flooring keeps the remainder non-negative, so no installment can
    // come out below the base share
    let base = (request.total_amount / n_dec).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let remainder = request.total_amount - base * n_dec;
    let extra_cents = (remainder / cent).floor().to_u32().unwrap_or(0);

    let mut payments = Vec::with_capacity(n as usize);
    let mut allocated = Decimal::ZERO;
    for sequence in 1..=n {
        let amount = if sequence == n {
            // the final installment also picks up any sub-cent residue
            request.total_amount - allocated
        } else if sequence > n - extra_cents {
            base + cent
        } else {
            base
        };
        allocated += amount;

        payments.push(InstallmentPayment {
            sequence,
            due_date: due_date(request.start_date, sequence)?,
            amount,
            principal: amount,
            interest: Decimal::ZERO,
            status: InstallmentStatus::Scheduled,
        });
    }
    Ok((base, payments))
}

/// Amortized schedule with monthly rate `annual / 12`
fn amortize(request: &PlanRequest) -> Result<(Decimal, Vec<InstallmentPayment>)> {
    let n = request.number_of_payments;
    let rate = request.annual_interest_rate / Decimal::from(12);

    // (1 + r)^n by iterated multiplication; n is small
    let mut factor = Decimal::ONE;
    for _ in 0..n {
        factor *= Decimal::ONE + rate;
    }

    let payment =
        round_cents(request.total_amount * rate * factor / (factor - Decimal::ONE));

    let mut payments = Vec::with_capacity(n as usize);
    let mut balance = request.total_amount;
    for sequence in 1..=n {
        let interest = round_cents(balance * rate);
        let (principal, amount) = if sequence < n {
            (payment - interest, payment)
        } else {
            // final payment clears whatever balance is left
            (balance, round_cents(balance + interest))
        };
        balance -= principal;

        payments.push(InstallmentPayment {
            sequence,
            due_date: due_date(request.start_date, sequence)?,
            amount,
            principal,
            interest,
            status: InstallmentStatus::Scheduled,
        });
    }
    Ok((payment, payments))
}

/// Due date of the `sequence`-th installment, one calendar month apart
fn due_date(start: DateTime<Utc>, sequence: u32) -> Result<DateTime<Utc>> {
    start
        .checked_add_months(Months::new(sequence - 1))
        .ok_or_else(|| Error::Validation("installment due date out of range".to_string()))
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn plan(total: Decimal, n: u32, rate: Decimal) -> InstallmentPlan {
        let planner = InstallmentPlanner::new(PlannerConfig::default());
        let request = PlanRequest {
            payment_id: None,
            total_amount: total,
            number_of_payments: n,
            annual_interest_rate: rate,
            start_date: Utc::now(),
        };
        planner.build(&request, Utc::now()).unwrap()
    }

    #[test]
    fn test_even_split() {
        let plan = plan(dec!(972.00), 6, Decimal::ZERO);

        assert_eq!(plan.payments.len(), 6);
        for payment in &plan.payments {
            assert_eq!(payment.amount, dec!(162.00));
            assert_eq!(payment.interest, Decimal::ZERO);
        }
        let sum: Decimal = plan.payments.iter().map(|p| p.amount).sum();
        assert_eq!(sum, dec!(972.00));
    }

    #[test]
    fn test_uneven_split_remainder_on_last() {
        let plan = plan(dec!(100.00), 3, Decimal::ZERO);

        assert_eq!(plan.payments[0].amount, dec!(33.33));
        assert_eq!(plan.payments[1].amount, dec!(33.33));
        assert_eq!(plan.payments[2].amount, dec!(33.34));
        let sum: Decimal = plan.payments.iter().map(|p| p.amount).sum();
        assert_eq!(sum, dec!(100.00));
    }

    #[test]
    fn test_tiny_total_never_goes_negative() {
        // 1.00 over 36 payments: the floored share is 0.02 and the 28
        // leftover cents land on the trailing installments
        let plan = plan(dec!(1.00), 36, Decimal::ZERO);

        assert!(plan.payments.iter().all(|p| p.amount >= Decimal::ZERO));
        assert_eq!(plan.payments[0].amount, dec!(0.02));
        assert_eq!(plan.payments[35].amount, dec!(0.03));
        let sum: Decimal = plan.payments.iter().map(|p| p.amount).sum();
        assert_eq!(sum, dec!(1.00));
    }

    #[test]
    fn test_amortized_principal_sums_to_total() {
        let plan = plan(dec!(1200.00), 12, dec!(0.12));

        assert_eq!(plan.payments.len(), 12);
        let principal: Decimal = plan.payments.iter().map(|p| p.principal).sum();
        assert_eq!(principal, dec!(1200.00));

        // every installment carries interest at 1% of the running balance
        assert_eq!(plan.payments[0].interest, dec!(12.00));
        assert!(plan.payments.iter().all(|p| p.interest >= Decimal::ZERO));

        // regular payments all equal the amortized amount
        for payment in &plan.payments[..11] {
            assert_eq!(payment.amount, plan.monthly_payment);
        }
    }

    #[test]
    fn test_amortized_costs_more_than_interest_free() {
        let with_interest = plan(dec!(1200.00), 12, dec!(0.12));
        let total_paid: Decimal = with_interest.payments.iter().map(|p| p.amount).sum();
        assert!(total_paid > dec!(1200.00));
    }

    #[test]
    fn test_due_dates_monthly() {
        let planner = InstallmentPlanner::new(PlannerConfig::default());
        let start = "2026-01-31T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let request = PlanRequest {
            payment_id: None,
            total_amount: dec!(300.00),
            number_of_payments: 3,
            annual_interest_rate: Decimal::ZERO,
            start_date: start,
        };
        let plan = planner.build(&request, Utc::now()).unwrap();

        assert_eq!(plan.payments[0].due_date, start);
        // Jan 31 + 1 month clamps to Feb 28
        assert_eq!(
            plan.payments[1].due_date,
            "2026-02-28T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(
            plan.payments[2].due_date,
            "2026-03-31T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert!(plan
            .payments
            .windows(2)
            .all(|w| w[0].due_date < w[1].due_date));
    }

    #[test]
    fn test_validation() {
        let planner = InstallmentPlanner::new(PlannerConfig::default());
        let base = PlanRequest {
            payment_id: None,
            total_amount: dec!(100.00),
            number_of_payments: 6,
            annual_interest_rate: Decimal::ZERO,
            start_date: Utc::now(),
        };

        let zero_total = PlanRequest {
            total_amount: Decimal::ZERO,
            ..base.clone()
        };
        assert!(planner.build(&zero_total, Utc::now()).is_err());

        let zero_count = PlanRequest {
            number_of_payments: 0,
            ..base.clone()
        };
        assert!(planner.build(&zero_count, Utc::now()).is_err());

        let too_many = PlanRequest {
            number_of_payments: 37,
            ..base.clone()
        };
        assert!(planner.build(&too_many, Utc::now()).is_err());

        let negative_rate = PlanRequest {
            annual_interest_rate: dec!(-0.01),
            ..base
        };
        assert!(planner.build(&negative_rate, Utc::now()).is_err());
    }
}
