use std::fmt::Write;

use super::format_compact_currency;
use crate::core::{PlanKind, SweepPoint};

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 24.0;
const MARGIN_BOTTOM: f64 = 56.0;
const TICKS: usize = 5;

const EMPLOYEE_COLOR: &str = "#1f77b4";
const EMPLOYER_COLOR: &str = "#ff7f0e";

fn x_label(plan: PlanKind) -> &'static str {
    match plan {
        PlanKind::RateBased => "Contribution Rate",
        PlanKind::FixedAmount => "Contribution Amount ($)",
    }
}

fn x_tick_label(plan: PlanKind, value: f64) -> String {
    match plan {
        PlanKind::RateBased => format!("{:.0}%", value * 100.0),
        PlanKind::FixedAmount => format_compact_currency(value),
    }
}

struct Frame {
    x_min: f64,
    x_span: f64,
    y_max: f64,
}

impl Frame {
    fn fit(points: &[SweepPoint]) -> Self {
        let x_min = points.first().map_or(0.0, |p| p.x);
        let x_max = points.last().map_or(1.0, |p| p.x);
        let y_max = points
            .iter()
            .map(|p| p.employee_savings.max(p.employer_savings))
            .fold(0.0_f64, f64::max);
        Self {
            x_min,
            x_span: if x_max > x_min { x_max - x_min } else { 1.0 },
            // A flat zero curve still gets a visible axis.
            y_max: if y_max > 0.0 { y_max } else { 1.0 },
        }
    }

    fn px(&self, x: f64) -> f64 {
        MARGIN_LEFT + (x - self.x_min) / self.x_span * (WIDTH - MARGIN_LEFT - MARGIN_RIGHT)
    }

    fn py(&self, y: f64) -> f64 {
        HEIGHT - MARGIN_BOTTOM - y / self.y_max * (HEIGHT - MARGIN_TOP - MARGIN_BOTTOM)
    }
}

fn polyline(
    out: &mut String,
    frame: &Frame,
    color: &str,
    values: impl Iterator<Item = (f64, f64)>,
) {
    let coords: Vec<String> = values
        .map(|(x, y)| format!("{:.2},{:.2}", frame.px(x), frame.py(y)))
        .collect();
    let _ = writeln!(
        out,
        r#"  <polyline fill="none" stroke="{color}" stroke-width="2" points="{}"/>"#,
        coords.join(" ")
    );
}

/// Renders the savings sweep as a standalone SVG line chart with an
/// employee series, an employer series and a legend.
pub fn render_svg_chart(plan: PlanKind, points: &[SweepPoint]) -> String {
    let frame = Frame::fit(points);
    let bottom = HEIGHT - MARGIN_BOTTOM;
    let right = WIDTH - MARGIN_RIGHT;
    let mut out = String::new();

    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif" font-size="11">"#
    );
    let _ = writeln!(
        out,
        r##"  <rect x="0" y="0" width="{WIDTH}" height="{HEIGHT}" fill="#ffffff"/>"##
    );

    for i in 0..=TICKS {
        let fraction = i as f64 / TICKS as f64;

        let y_value = frame.y_max * fraction;
        let y = frame.py(y_value);
        let _ = writeln!(
            out,
            r##"  <line x1="{MARGIN_LEFT}" y1="{y:.2}" x2="{right}" y2="{y:.2}" stroke="#e0e0e0"/>"##
        );
        let _ = writeln!(
            out,
            r#"  <text x="{:.2}" y="{:.2}" text-anchor="end">{}</text>"#,
            MARGIN_LEFT - 6.0,
            y + 4.0,
            format_compact_currency(y_value)
        );

        let x_value = frame.x_min + frame.x_span * fraction;
        let x = frame.px(x_value);
        let _ = writeln!(
            out,
            r#"  <text x="{x:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
            bottom + 16.0,
            x_tick_label(plan, x_value)
        );
    }

    let _ = writeln!(
        out,
        r##"  <line x1="{MARGIN_LEFT}" y1="{bottom}" x2="{right}" y2="{bottom}" stroke="#333333"/>"##
    );
    let _ = writeln!(
        out,
        r##"  <line x1="{MARGIN_LEFT}" y1="{MARGIN_TOP}" x2="{MARGIN_LEFT}" y2="{bottom}" stroke="#333333"/>"##
    );

    polyline(
        &mut out,
        &frame,
        EMPLOYEE_COLOR,
        points.iter().map(|p| (p.x, p.employee_savings)),
    );
    polyline(
        &mut out,
        &frame,
        EMPLOYER_COLOR,
        points.iter().map(|p| (p.x, p.employer_savings)),
    );

    let _ = writeln!(
        out,
        r#"  <text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="12">{}</text>"#,
        (MARGIN_LEFT + right) / 2.0,
        HEIGHT - 12.0,
        x_label(plan)
    );
    let _ = writeln!(
        out,
        r#"  <text x="16" y="{:.2}" text-anchor="middle" font-size="12" transform="rotate(-90 16 {:.2})">Savings ($)</text>"#,
        (MARGIN_TOP + bottom) / 2.0,
        (MARGIN_TOP + bottom) / 2.0
    );

    for (row, (label, color)) in [
        ("Employee Tax Savings", EMPLOYEE_COLOR),
        ("Employer Tax Savings", EMPLOYER_COLOR),
    ]
    .into_iter()
    .enumerate()
    {
        let y = MARGIN_TOP + 12.0 + row as f64 * 16.0;
        let x = MARGIN_LEFT + 12.0;
        let _ = writeln!(
            out,
            r#"  <line x1="{x}" y1="{:.2}" x2="{}" y2="{:.2}" stroke="{color}" stroke-width="2"/>"#,
            y - 4.0,
            x + 18.0,
            y - 4.0
        );
        let _ = writeln!(out, r#"  <text x="{}" y="{y:.2}">{label}</text>"#, x + 24.0);
    }

    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Contribution, PlanInputs, generate_sweep};

    fn chart_for(contribution: Contribution, participation_rate: f64) -> String {
        let inputs = PlanInputs::new(100, 50_000.0, participation_rate, contribution)
            .expect("valid inputs");
        let points: Vec<_> = generate_sweep(&inputs).collect();
        render_svg_chart(inputs.kind(), &points)
    }

    #[test]
    fn chart_has_two_labelled_series() {
        let svg = chart_for(Contribution::Rate(0.05), 0.5);
        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains(">Employee Tax Savings</text>"));
        assert!(svg.contains(">Employer Tax Savings</text>"));
        assert!(svg.contains(">Contribution Rate</text>"));
        assert!(svg.contains(">Savings ($)</text>"));
        assert!(svg.contains(">15%</text>"));
    }

    #[test]
    fn fixed_plan_chart_uses_amount_axis() {
        let svg = chart_for(Contribution::Amount(3_000.0), 0.5);
        assert!(svg.contains(">Contribution Amount ($)</text>"));
        assert!(svg.contains(">$0</text>"));
    }

    #[test]
    fn polyline_has_one_vertex_per_point() {
        let svg = chart_for(Contribution::Amount(3_000.0), 0.5);
        let line = svg
            .lines()
            .find(|l| l.contains("<polyline"))
            .expect("series present");
        let points = line
            .split("points=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .expect("points attribute");
        assert_eq!(points.split(' ').count(), 40);
    }

    #[test]
    fn zero_participation_chart_has_no_nan_coordinates() {
        let svg = chart_for(Contribution::Rate(0.05), 0.0);
        assert!(!svg.contains("NaN"));
        assert!(!svg.contains("inf"));
    }
}
