// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use aqualink::commands::{payroll, salaries};
use aqualink::payroll::{PayrollInput, RawPayrollInput};
use aqualink::cli;
use common::dec;
use rust_decimal::Decimal;

fn input(basic: &str, ot_weekday: &str, ot_holiday: &str) -> PayrollInput {
    PayrollInput {
        basic_salary: dec(basic),
        ot_hours_weekday: dec(ot_weekday),
        ot_hours_holiday: dec(ot_holiday),
        ..Default::default()
    }
}

#[test]
fn slip_for_standard_month_with_overtime() {
    let slip = input("2800", "10", "4").calculate().rounded();
    assert_eq!(slip.daily_rate, dec("100"));
    assert_eq!(slip.hourly_rate, dec("12.5"));
    assert_eq!(slip.ot_weekday_amount, dec("125.00"));
    assert_eq!(slip.ot_holiday_amount, dec("75.00"));
    assert_eq!(slip.gross_pay, dec("3000.00"));
    assert_eq!(slip.net_pay, dec("3000.00"));
}

#[test]
fn deductions_come_off_gross() {
    let mut i = input("2800", "10", "4");
    i.epf = dec("200");
    i.etf = dec("50");
    i.loan = dec("100");
    let slip = i.calculate();
    assert_eq!(slip.gross_pay, dec("3000"));
    assert_eq!(i.total_deductions(), dec("350"));
    assert_eq!(slip.net_pay, dec("2650.00"));
}

#[test]
fn garbled_and_negative_fields_become_zero() {
    let raw = RawPayrollInput {
        basic_salary: Some("2800"),
        allowances: Some("abc"),
        ot_hours_weekday: Some("-5"),
        ot_hours_holiday: Some(""),
        epf: Some("-200"),
        etf: None,
        loan: Some("NaN"),
        tax: Some("  "),
    };
    let i = PayrollInput::from_raw(&raw);
    assert_eq!(i.basic_salary, dec("2800"));
    for v in [i.allowances, i.ot_hours_weekday, i.ot_hours_holiday, i.epf, i.etf, i.loan, i.tax] {
        assert_eq!(v, Decimal::ZERO);
    }
    let slip = i.calculate();
    assert!(slip.daily_rate >= Decimal::ZERO);
    assert!(slip.hourly_rate >= Decimal::ZERO);
    assert_eq!(slip.net_pay, dec("2800"));
}

#[test]
fn direct_construction_clamps_too() {
    let i = PayrollInput::new(
        dec("-1"),
        dec("10"),
        Decimal::ZERO,
        Decimal::ZERO,
        dec("-3"),
        Decimal::ZERO,
        Decimal::ZERO,
        Decimal::ZERO,
    );
    assert_eq!(i.basic_salary, Decimal::ZERO);
    assert_eq!(i.epf, Decimal::ZERO);
    assert_eq!(i.calculate().gross_pay, dec("10"));
}

#[test]
fn cli_payroll_args_feed_the_calculation() {
    let matches = cli::build_cli().get_matches_from([
        "aqualink", "payroll", "calc", "--basic", "2800", "--ot-weekday", "10", "--ot-holiday",
        "4", "--epf", "200", "--etf", "50", "--loan", "100", "--tax", "oops",
    ]);
    let (_, pay) = matches.subcommand().unwrap();
    let (_, calc) = pay.subcommand().unwrap();
    let i = PayrollInput::from_raw(&payroll::raw_input(calc));
    assert_eq!(i.tax, Decimal::ZERO);
    assert_eq!(i.calculate().rounded().net_pay, dec("2650.00"));
}

#[test]
fn salary_add_rejects_reversed_period() {
    let matches = cli::build_cli().get_matches_from([
        "aqualink", "salary", "add", "--staff-id", "S1", "--staff-name", "Nimal", "--from",
        "2025-03-31", "--to", "2025-03-01", "--basic", "2800",
    ]);
    let (_, sal) = matches.subcommand().unwrap();
    let (_, add) = sal.subcommand().unwrap();
    let err = salaries::record_from_args(add).unwrap_err();
    assert!(err.to_string().contains("before it starts"));
}

#[test]
fn salary_rows_recompute_from_inputs() {
    let matches = cli::build_cli().get_matches_from([
        "aqualink", "salary", "add", "--staff-id", "S1", "--staff-name", "Nimal", "--from",
        "2025-03-01", "--to", "2025-03-31", "--basic", "2800", "--ot-holiday", "4", "--epf", "200",
    ]);
    let (_, sal) = matches.subcommand().unwrap();
    let (_, add) = sal.subcommand().unwrap();
    let record = salaries::record_from_args(add).unwrap();
    let rows = salaries::salary_rows(&[record]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].staff_name, "Nimal");
    assert_eq!(rows[0].gross_pay, "2875.00");
    assert_eq!(rows[0].net_pay, "2675.00");
}

#[test]
fn cli_accepts_negative_values_and_clamps_them() {
    let matches = cli::build_cli()
        .try_get_matches_from([
            "aqualink", "payroll", "calc", "--basic", "2800", "--epf", "-200", "--ot-weekday",
            "-5",
        ])
        .unwrap();
    let (_, pay) = matches.subcommand().unwrap();
    let (_, calc) = pay.subcommand().unwrap();
    let i = PayrollInput::from_raw(&payroll::raw_input(calc));
    assert_eq!(i.epf, Decimal::ZERO);
    assert_eq!(i.ot_hours_weekday, Decimal::ZERO);
    assert_eq!(i.calculate().net_pay, dec("2800"));
}
