// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pay slip arithmetic.
//!
//! A month is always 28 days and a day 8 hours. Weekday and Saturday overtime is
//! paid at the plain hourly rate, Sunday and holiday overtime at time and a half.
//! Every figure is carried at full precision; round only for display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::parse_lenient_decimal;

pub const DAYS_PER_MONTH: i64 = 28;
pub const HOURS_PER_DAY: i64 = 8;

pub fn weekday_ot_multiplier() -> Decimal {
    Decimal::ONE
}

pub fn holiday_ot_multiplier() -> Decimal {
    Decimal::new(15, 1)
}

/// Raw payroll inputs. Every field is clamped to zero or above on construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayrollInput {
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub ot_hours_weekday: Decimal,
    pub ot_hours_holiday: Decimal,
    pub epf: Decimal,
    pub etf: Decimal,
    pub loan: Decimal,
    pub tax: Decimal,
}

/// Raw text as it comes off a form or the command line. Missing means blank.
#[derive(Debug, Clone, Default)]
pub struct RawPayrollInput<'a> {
    pub basic_salary: Option<&'a str>,
    pub allowances: Option<&'a str>,
    pub ot_hours_weekday: Option<&'a str>,
    pub ot_hours_holiday: Option<&'a str>,
    pub epf: Option<&'a str>,
    pub etf: Option<&'a str>,
    pub loan: Option<&'a str>,
    pub tax: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaySlip {
    pub daily_rate: Decimal,
    pub hourly_rate: Decimal,
    pub ot_weekday_amount: Decimal,
    pub ot_holiday_amount: Decimal,
    pub gross_pay: Decimal,
    pub net_pay: Decimal,
}

fn clamp(d: Decimal) -> Decimal {
    d.max(Decimal::ZERO)
}

impl PayrollInput {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        basic_salary: Decimal,
        allowances: Decimal,
        ot_hours_weekday: Decimal,
        ot_hours_holiday: Decimal,
        epf: Decimal,
        etf: Decimal,
        loan: Decimal,
        tax: Decimal,
    ) -> Self {
        PayrollInput {
            basic_salary,
            allowances,
            ot_hours_weekday,
            ot_hours_holiday,
            epf,
            etf,
            loan,
            tax,
        }
        .clamped()
    }

    /// Blank, unparsable and negative fields all become zero.
    pub fn from_raw(raw: &RawPayrollInput<'_>) -> Self {
        let f = |v: Option<&str>| v.map(parse_lenient_decimal).unwrap_or_default();
        PayrollInput {
            basic_salary: f(raw.basic_salary),
            allowances: f(raw.allowances),
            ot_hours_weekday: f(raw.ot_hours_weekday),
            ot_hours_holiday: f(raw.ot_hours_holiday),
            epf: f(raw.epf),
            etf: f(raw.etf),
            loan: f(raw.loan),
            tax: f(raw.tax),
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        PayrollInput {
            basic_salary: clamp(self.basic_salary),
            allowances: clamp(self.allowances),
            ot_hours_weekday: clamp(self.ot_hours_weekday),
            ot_hours_holiday: clamp(self.ot_hours_holiday),
            epf: clamp(self.epf),
            etf: clamp(self.etf),
            loan: clamp(self.loan),
            tax: clamp(self.tax),
        }
    }

    pub fn total_deductions(&self) -> Decimal {
        let c = self.clone().clamped();
        c.epf
            .saturating_add(c.etf)
            .saturating_add(c.loan)
            .saturating_add(c.tax)
    }

    pub fn calculate(&self) -> PaySlip {
        calculate(self)
    }
}

/// Computes the full slip. Inputs deserialized from the backend are clamped here too.
///
/// Never fails: sums and products that would overflow saturate at `Decimal::MAX`
/// (or `Decimal::MIN` for net pay).
pub fn calculate(input: &PayrollInput) -> PaySlip {
    let i = input.clone().clamped();
    let daily_rate = i.basic_salary / Decimal::from(DAYS_PER_MONTH);
    let hourly_rate = daily_rate / Decimal::from(HOURS_PER_DAY);
    let ot_weekday_amount = i
        .ot_hours_weekday
        .saturating_mul(hourly_rate)
        .saturating_mul(weekday_ot_multiplier());
    let ot_holiday_amount = i
        .ot_hours_holiday
        .saturating_mul(hourly_rate)
        .saturating_mul(holiday_ot_multiplier());
    let gross_pay = i
        .basic_salary
        .saturating_add(i.allowances)
        .saturating_add(ot_weekday_amount)
        .saturating_add(ot_holiday_amount);
    let net_pay = gross_pay.saturating_sub(i.total_deductions());
    PaySlip {
        daily_rate,
        hourly_rate,
        ot_weekday_amount,
        ot_holiday_amount,
        gross_pay,
        net_pay,
    }
}

impl PaySlip {
    pub fn rounded(&self) -> PaySlip {
        PaySlip {
            daily_rate: self.daily_rate.round_dp(2),
            hourly_rate: self.hourly_rate.round_dp(2),
            ot_weekday_amount: self.ot_weekday_amount.round_dp(2),
            ot_holiday_amount: self.ot_holiday_amount.round_dp(2),
            gross_pay: self.gross_pay.round_dp(2),
            net_pay: self.net_pay.round_dp(2),
        }
    }

    /// Label/value pairs in slip order, formatted to 2 dp.
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Daily Rate", format!("{:.2}", self.daily_rate)),
            ("Hourly Rate", format!("{:.2}", self.hourly_rate)),
            ("OT Weekday", format!("{:.2}", self.ot_weekday_amount)),
            ("OT Holiday", format!("{:.2}", self.ot_holiday_amount)),
            ("Gross Pay", format!("{:.2}", self.gross_pay)),
            ("Net Pay", format!("{:.2}", self.net_pay)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn holiday_hours_pay_time_and_a_half() {
        let input = PayrollInput {
            basic_salary: d("5600"),
            ot_hours_holiday: d("2"),
            ..Default::default()
        };
        let slip = input.calculate();
        assert_eq!(slip.hourly_rate, d("25"));
        assert_eq!(slip.ot_holiday_amount, d("75"));
    }

    #[test]
    fn net_can_go_below_zero_when_deductions_exceed_gross() {
        let input = PayrollInput {
            basic_salary: d("100"),
            loan: d("150"),
            ..Default::default()
        };
        assert_eq!(input.calculate().net_pay, d("-50"));
    }

    #[test]
    fn rounding_only_applies_to_display() {
        let input = PayrollInput {
            basic_salary: d("1000"),
            ..Default::default()
        };
        let slip = input.calculate();
        assert_ne!(slip.daily_rate, slip.daily_rate.round_dp(2));
        assert_eq!(slip.rounded().daily_rate, d("35.71"));
    }

    #[test]
    fn extreme_inputs_saturate_instead_of_panicking() {
        let max = "79228162514264337593543950335";
        let slip = PayrollInput::from_raw(&RawPayrollInput {
            basic_salary: Some(max),
            ot_hours_holiday: Some(max),
            ..Default::default()
        })
        .calculate();
        assert_eq!(slip.ot_holiday_amount, Decimal::MAX);
        assert_eq!(slip.gross_pay, Decimal::MAX);
        assert_eq!(slip.net_pay, Decimal::MAX);

        let slip = PayrollInput::from_raw(&RawPayrollInput {
            basic_salary: Some("50000000000000000000000000000"),
            allowances: Some("50000000000000000000000000000"),
            loan: Some(max),
            tax: Some(max),
            ..Default::default()
        })
        .calculate();
        assert_eq!(slip.gross_pay, Decimal::MAX);
        assert_eq!(slip.net_pay, Decimal::ZERO);
        assert_eq!(slip.rounded().gross_pay, Decimal::MAX);
    }
}
