// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::payroll::{PayrollInput, PaySlip, RawPayrollInput};
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("calc", sub)) => calc(sub)?,
        _ => {}
    }
    Ok(())
}

pub fn raw_input(sub: &clap::ArgMatches) -> RawPayrollInput<'_> {
    let f = |k: &str| sub.get_one::<String>(k).map(|s| s.as_str());
    RawPayrollInput {
        basic_salary: f("basic"),
        allowances: f("allowances"),
        ot_hours_weekday: f("ot-weekday"),
        ot_hours_holiday: f("ot-holiday"),
        epf: f("epf"),
        etf: f("etf"),
        loan: f("loan"),
        tax: f("tax"),
    }
}

pub fn slip_table(input: &PayrollInput, slip: &PaySlip) -> comfy_table::Table {
    let mut rows = vec![
        vec!["Basic Salary".to_string(), format!("{:.2}", input.basic_salary)],
        vec!["Allowances".to_string(), format!("{:.2}", input.allowances)],
    ];
    for (label, value) in slip.lines() {
        if label == "Net Pay" {
            rows.push(vec![
                "Deductions".to_string(),
                format!("{:.2}", input.total_deductions()),
            ]);
        }
        rows.push(vec![label.to_string(), value]);
    }
    pretty_table(&["Item", "Amount"], rows)
}

fn calc(sub: &clap::ArgMatches) -> Result<()> {
    let input = PayrollInput::from_raw(&raw_input(sub));
    let slip = input.calculate();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &slip.rounded())? {
        println!("{}", slip_table(&input, &slip));
    }
    Ok(())
}
