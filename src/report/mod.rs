//! Presentation of plan savings: currency strings, the text report and the
//! JSON shape shared by the CLI and the HTTP API.

mod chart;

pub use chart::render_svg_chart;

use serde::Serialize;
use std::fmt::Write;

use crate::core::{
    PlanInputs, PlanKind, SavingsResult, SweepPoint, compute_result, generate_sweep,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsReport {
    pub plan: PlanKind,
    pub inputs: PlanInputs,
    pub result: SavingsResult,
    pub sweep: Vec<SweepPoint>,
}

impl SavingsReport {
    pub fn build(inputs: &PlanInputs) -> Self {
        Self {
            plan: inputs.kind(),
            inputs: *inputs,
            result: compute_result(inputs),
            sweep: generate_sweep(inputs).collect(),
        }
    }
}

/// Format a currency value with thousands separators and cents, e.g.
/// `$27,500.00`.
///
/// Cents follow `{:.2}` formatting of the binary value, so ties such as
/// `478.125` round half-to-even (`$478.12`).
pub fn format_currency(value: f64) -> String {
    let digits = format!("{:.2}", value.abs());
    let (dollars, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, c) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let is_zero = digits.bytes().all(|b| b == b'0' || b == b'.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

/// Compact axis label, e.g. `$2.1M`, `$450K`, `$50`.
pub fn format_compact_currency(value: f64) -> String {
    let abs_value = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    if abs_value >= 1_000_000.0 {
        format!("{sign}${:.1}M", abs_value / 1_000_000.0)
    } else if abs_value >= 1_000.0 {
        format!("{sign}${:.0}K", abs_value / 1_000.0)
    } else {
        format!("{sign}${abs_value:.0}")
    }
}

fn title(plan: PlanKind) -> &'static str {
    match plan {
        PlanKind::RateBased => "Tax-Advantaged Savings Impact Tool",
        PlanKind::FixedAmount => "FSA Tax Savings Impact Tool",
    }
}

fn intro(plan: PlanKind) -> &'static str {
    match plan {
        PlanKind::RateBased => {
            "This tool calculates how changes in employee participation and contributions to \
             tax-advantaged savings accounts (such as 401(k) or HSA) impact federal taxes for \
             employees and payroll taxes for employers."
        }
        PlanKind::FixedAmount => {
            "This tool calculates how employee participation in a flexible spending account \
             (FSA) with a fixed annual contribution impacts federal taxes for employees and \
             payroll taxes for employers."
        }
    }
}

fn contributions_label(plan: PlanKind) -> &'static str {
    match plan {
        PlanKind::RateBased => "Total Contributions to Tax-Advantaged Accounts",
        PlanKind::FixedAmount => "Total FSA Contributions",
    }
}

pub fn render_text(report: &SavingsReport) -> String {
    let mut out = String::new();
    let result = &report.result;

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", title(report.plan));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", intro(report.plan));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Results for {} Employees ({} participating):",
        report.inputs.employee_count, result.participants
    );
    let _ = writeln!(
        out,
        "- Total Employee Tax Savings: {}",
        format_currency(result.employee_tax_savings)
    );
    let _ = writeln!(
        out,
        "- Total Employer Payroll Tax Savings: {}",
        format_currency(result.employer_tax_savings)
    );
    let _ = writeln!(
        out,
        "- {}: {}",
        contributions_label(report.plan),
        format_currency(result.total_contributions)
    );
    out
}
