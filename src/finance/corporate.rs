use crate::finance::schemas::*;
use crate::utils::error::{FinanceClientError, Result};
use serde_json::Value;

/// Rounds to `digits` decimals on the exact binary value, ties to even.
///
/// `{:.1074}` prints every digit an `f64` can carry, so the decision below
/// sees the true value rather than a product skewed by `value * 10^n`.
fn round_to(value: f64, digits: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let exact = format!("{:.1074}", value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let (kept, rest) = frac_part.split_at(digits.min(frac_part.len()));
    let mut number: Vec<u8> = int_part.bytes().chain(kept.bytes()).collect();

    let mut rest = rest.bytes();
    let round_up = match rest.next() {
        Some(b'6'..=b'9') => true,
        Some(b'5') => {
            rest.any(|b| b != b'0') || number.last().is_some_and(|d| (d - b'0') % 2 == 1)
        }
        _ => false,
    };

    if round_up {
        let mut carry = true;
        for digit in number.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            number.insert(0, b'1');
        }
    }

    let split = number.len() - kept.len();
    let digits_str = String::from_utf8_lossy(&number);
    let rounded = format!(
        "{}{}.{}0",
        if value.is_sign_negative() { "-" } else { "" },
        &digits_str[..split],
        &digits_str[split..]
    );
    rounded.parse().unwrap_or(value)
}

fn money(value: f64) -> f64 {
    round_to(value, 2)
}

fn ratio(value: f64) -> f64 {
    round_to(value, 4)
}

/// A ratio of exactly zero counts as missing, like an undefined one, and is
/// left out of the averages.
fn nonzero_ratio(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0).map(ratio)
}

/// Arithmetic mean over a Neumaier-compensated sum.
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sum = 0.0f64;
    let mut compensation = 0.0f64;
    for &v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    Some((sum + compensation) / values.len() as f64)
}

/// Year-by-year P&L. Growth compounds on the previous year's rounded revenue.
pub fn build_pyg_projection(data: &PygProjectionInput) -> Result<PygProjectionOutput> {
    if data.years == 0 {
        return Err(FinanceClientError::calculation(
            "years must be at least 1 to build a P&L projection",
        ));
    }

    let mut projections: Vec<PygYearProjection> = Vec::with_capacity(data.years as usize);
    for year in 1..=data.years {
        let previous_revenue = projections
            .last()
            .map(|p| p.revenue)
            .unwrap_or(data.current_revenue);
        let revenue = previous_revenue * (1.0 + data.revenue_growth_rate);
        let cogs = revenue * data.cogs_as_percent_of_revenue;
        let gross_profit = revenue - cogs;
        let opex = data.operating_expenses;
        let ebit = gross_profit - opex;
        let tax = (ebit * data.tax_rate).max(0.0);
        let net_income = ebit - tax;
        let net_margin = if revenue > 0.0 { net_income / revenue } else { 0.0 };

        projections.push(PygYearProjection {
            year,
            revenue: money(revenue),
            cogs: money(cogs),
            gross_profit: money(gross_profit),
            operating_expenses: money(opex),
            ebit: money(ebit),
            tax: money(tax),
            net_income: money(net_income),
            net_margin: ratio(net_margin),
        });
    }

    let first = projections[0].revenue;
    let last = projections[projections.len() - 1].revenue;
    Ok(PygProjectionOutput {
        summary: format!(
            "Projected revenue grows from {:?} to {:?} over {} years.",
            first, last, data.years
        ),
        projections,
    })
}

pub fn build_cash_flow_projection(data: &CashFlowProjectionInput) -> Result<CashFlowProjectionOutput> {
    let pyg = build_pyg_projection(&data.pyg_assumptions)?;

    let mut previous_wc =
        data.working_capital_percent_of_revenue * data.pyg_assumptions.current_revenue;
    let mut cash = data.initial_cash_balance;
    let mut years = Vec::with_capacity(pyg.projections.len());

    for pyg_year in &pyg.projections {
        let beginning_cash = cash;
        let wc = data.working_capital_percent_of_revenue * pyg_year.revenue;
        let delta_wc = wc - previous_wc;
        let depreciation = data.depreciation_rate * pyg_year.revenue;
        let cfo = pyg_year.net_income + depreciation - delta_wc;
        let cfi = -data.capex_per_year;
        let cff = data.debt_issued_per_year - data.debt_repayment_per_year;
        let ending_cash = beginning_cash + cfo + cfi + cff;

        years.push(CashFlowYearProjection {
            year: pyg_year.year,
            beginning_cash: money(beginning_cash),
            cash_from_operations: money(cfo),
            cash_from_investing: money(cfi),
            cash_from_financing: money(cff),
            ending_cash: money(ending_cash),
            free_cash_flow: money(cfo + cfi),
        });

        cash = ending_cash;
        previous_wc = wc;
    }

    let first = years[0].beginning_cash;
    let last = years[years.len() - 1].ending_cash;
    Ok(CashFlowProjectionOutput {
        summary: format!("Cash balance evolves from {:?} to {:?}.", first, last),
        years,
    })
}

fn risk_level(avg_fcf: f64) -> &'static str {
    if avg_fcf < 0.0 {
        "high"
    } else if avg_fcf < 0.05 {
        "medium"
    } else {
        "low"
    }
}

pub fn build_financial_health_analysis(data: &CashFlowProjectionInput) -> Result<FinancialHealthOutput> {
    let pyg = build_pyg_projection(&data.pyg_assumptions)?;
    let cash_flow = build_cash_flow_projection(data)?;

    let indicators: Vec<FinancialIndicatorYear> = pyg
        .projections
        .iter()
        .zip(&cash_flow.years)
        .map(|(p, cf)| {
            let per_revenue = |v: f64| (p.revenue > 0.0).then(|| v / p.revenue);
            FinancialIndicatorYear {
                year: p.year,
                revenue: money(p.revenue),
                net_income: money(p.net_income),
                free_cash_flow: money(cf.free_cash_flow),
                operating_cash_flow: money(cf.cash_from_operations),
                ebit_margin: nonzero_ratio(per_revenue(p.ebit)),
                net_margin: nonzero_ratio(per_revenue(p.net_income)),
                fcf_to_revenue: nonzero_ratio(per_revenue(cf.free_cash_flow)),
                ocf_to_net_income: nonzero_ratio(
                    (p.net_income != 0.0).then(|| cf.cash_from_operations / p.net_income),
                ),
            }
        })
        .collect();

    let net_margins: Vec<f64> = indicators.iter().filter_map(|i| i.net_margin).collect();
    let fcf_ratios: Vec<f64> = indicators.iter().filter_map(|i| i.fcf_to_revenue).collect();
    let (avg_net, avg_fcf) = match (mean(&net_margins), mean(&fcf_ratios)) {
        (Some(net), Some(fcf)) => (net, fcf),
        _ => {
            return Err(FinanceClientError::calculation(
                "no year with positive revenue; margins are undefined",
            ))
        }
    };

    let mut recommendations = Vec::new();
    if avg_net < 0.05 {
        recommendations.push("Review pricing and expenses.".to_string());
    }
    if avg_fcf < 0.03 {
        recommendations.push("Optimize working capital and CAPEX.".to_string());
    }
    if cash_flow.years.iter().any(|y| y.ending_cash < 0.0) {
        recommendations.push("Evaluate short-term financing.".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("Company shows healthy cash generation.".to_string());
    }

    Ok(FinancialHealthOutput {
        summary: format!(
            "Average net margin: {:.2}%, free cash flow: {:.2}%, risk: {}",
            round_to(avg_net * 100.0, 2),
            round_to(avg_fcf * 100.0, 2),
            risk_level(avg_fcf)
        ),
        recommendations,
        indicators,
    })
}

/// The three corporate projections, addressable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ProjectionKind {
    Pyg,
    CashFlow,
    FinancialHealth,
}

impl ProjectionKind {
    /// Service path of the matching POST endpoint.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Pyg => "/corporate/pyg-projection",
            Self::CashFlow => "/corporate/cash-flow-projection",
            Self::FinancialHealth => "/corporate/financial-health",
        }
    }

    pub fn target(&self) -> &'static str {
        match self {
            Self::Pyg => "pyg-projection-output",
            Self::CashFlow => "cash-flow-projection-output",
            Self::FinancialHealth => "financial-health-output",
        }
    }

    /// Runs the projection locally on a JSON input document.
    pub fn compute(&self, input: Value) -> Result<Value> {
        let output = match self {
            Self::Pyg => {
                let input: PygProjectionInput = serde_json::from_value(input)?;
                serde_json::to_value(build_pyg_projection(&input)?)?
            }
            Self::CashFlow => {
                let input: CashFlowProjectionInput = serde_json::from_value(input)?;
                serde_json::to_value(build_cash_flow_projection(&input)?)?
            }
            Self::FinancialHealth => {
                let input: CashFlowProjectionInput = serde_json::from_value(input)?;
                serde_json::to_value(build_financial_health_analysis(&input)?)?
            }
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn pyg_input() -> PygProjectionInput {
        PygProjectionInput {
            current_revenue: 1000.0,
            revenue_growth_rate: 0.1,
            cogs_as_percent_of_revenue: 0.4,
            operating_expenses: 200.0,
            tax_rate: 0.25,
            years: 2,
        }
    }

    fn cash_flow_input() -> CashFlowProjectionInput {
        CashFlowProjectionInput {
            pyg_assumptions: pyg_input(),
            working_capital_percent_of_revenue: 0.1,
            initial_cash_balance: 50.0,
            depreciation_rate: 0.05,
            capex_per_year: 100.0,
            debt_issued_per_year: 20.0,
            debt_repayment_per_year: 10.0,
        }
    }

    #[test]
    fn test_pyg_projection_compounds_growth() {
        let output = build_pyg_projection(&pyg_input()).unwrap();

        assert_eq!(output.projections.len(), 2);
        let y1 = &output.projections[0];
        assert_close(y1.revenue, 1100.0);
        assert_close(y1.cogs, 440.0);
        assert_close(y1.ebit, 460.0);
        assert_close(y1.tax, 115.0);
        assert_close(y1.net_income, 345.0);
        assert_close(y1.net_margin, 0.3136);

        let y2 = &output.projections[1];
        assert_close(y2.revenue, 1210.0);
        assert_close(y2.net_income, 394.5);
        assert_close(y2.net_margin, 0.326);

        assert_eq!(
            output.summary,
            "Projected revenue grows from 1100.0 to 1210.0 over 2 years."
        );
    }

    #[test]
    fn test_pyg_projection_never_taxes_losses() {
        let mut input = pyg_input();
        input.operating_expenses = 1000.0;
        input.years = 1;

        let output = build_pyg_projection(&input).unwrap();
        let y1 = &output.projections[0];
        assert_close(y1.ebit, -340.0);
        assert_close(y1.tax, 0.0);
        assert_close(y1.net_income, -340.0);
    }

    #[test]
    fn test_zero_years_is_rejected() {
        let mut input = pyg_input();
        input.years = 0;
        assert!(matches!(
            build_pyg_projection(&input),
            Err(FinanceClientError::Calculation { .. })
        ));
    }

    #[test]
    fn test_cash_flow_projection() {
        let output = build_cash_flow_projection(&cash_flow_input()).unwrap();

        let y1 = &output.years[0];
        assert_close(y1.beginning_cash, 50.0);
        assert_close(y1.cash_from_operations, 390.0);
        assert_close(y1.cash_from_investing, -100.0);
        assert_close(y1.cash_from_financing, 10.0);
        assert_close(y1.ending_cash, 350.0);
        assert_close(y1.free_cash_flow, 290.0);

        let y2 = &output.years[1];
        assert_close(y2.beginning_cash, 350.0);
        assert_close(y2.cash_from_operations, 444.0);
        assert_close(y2.ending_cash, 704.0);

        assert_eq!(output.summary, "Cash balance evolves from 50.0 to 704.0.");
    }

    #[test]
    fn test_financial_health_for_healthy_company() {
        let output = build_financial_health_analysis(&cash_flow_input()).unwrap();

        assert_eq!(output.indicators.len(), 2);
        let y1 = &output.indicators[0];
        assert_close(y1.ebit_margin.unwrap(), 0.4182);
        assert_close(y1.net_margin.unwrap(), 0.3136);
        assert_close(y1.fcf_to_revenue.unwrap(), 0.2636);
        assert_close(y1.ocf_to_net_income.unwrap(), 1.1304);

        assert_eq!(
            output.recommendations,
            vec!["Company shows healthy cash generation.".to_string()]
        );
        assert_eq!(
            output.summary,
            "Average net margin: 31.98%, free cash flow: 27.40%, risk: low"
        );
    }

    #[test]
    fn test_financial_health_for_cash_burning_company() {
        let mut input = cash_flow_input();
        input.pyg_assumptions.operating_expenses = 640.0;
        input.capex_per_year = 500.0;
        input.initial_cash_balance = 0.0;
        input.debt_issued_per_year = 0.0;
        input.debt_repayment_per_year = 0.0;

        let output = build_financial_health_analysis(&input).unwrap();

        assert!(output.summary.ends_with("risk: high"));
        assert_eq!(
            output.recommendations,
            vec![
                "Review pricing and expenses.".to_string(),
                "Optimize working capital and CAPEX.".to_string(),
                "Evaluate short-term financing.".to_string(),
            ]
        );
    }

    #[test]
    fn test_break_even_year_is_left_out_of_averages() {
        let input = CashFlowProjectionInput {
            pyg_assumptions: PygProjectionInput {
                current_revenue: 1000.0,
                revenue_growth_rate: 0.1,
                cogs_as_percent_of_revenue: 0.4,
                operating_expenses: 660.0,
                tax_rate: 0.0,
                years: 2,
            },
            working_capital_percent_of_revenue: 0.0,
            initial_cash_balance: 100.0,
            depreciation_rate: 0.0,
            capex_per_year: 0.0,
            debt_issued_per_year: 0.0,
            debt_repayment_per_year: 0.0,
        };

        let output = build_financial_health_analysis(&input).unwrap();

        let y1 = &output.indicators[0];
        assert_eq!(y1.ebit_margin, None);
        assert_eq!(y1.net_margin, None);
        assert_eq!(y1.fcf_to_revenue, None);
        assert_eq!(y1.ocf_to_net_income, None);

        let y2 = &output.indicators[1];
        assert_eq!(y2.net_margin, Some(0.0545));
        assert_eq!(y2.fcf_to_revenue, Some(0.0545));
        assert_eq!(y2.ocf_to_net_income, Some(1.0));

        assert_eq!(
            output.summary,
            "Average net margin: 5.45%, free cash flow: 5.45%, risk: low"
        );
        assert_eq!(
            output.recommendations,
            vec!["Company shows healthy cash generation.".to_string()]
        );
    }

    #[test]
    fn test_round_to_breaks_ties_to_even() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(0.625, 2), 0.62);
        // 2.675 is stored just below the tie
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(0.3136363636, 4), 0.3136);
        assert_eq!(round_to(99.995, 2), 100.0);
        assert_eq!(round_to(9.9999, 2), 10.0);
        assert_eq!(round_to(-1.005, 2), -1.0);
        assert_eq!(round_to(-0.5, 0), -0.0);
        assert_eq!(round_to(1210.0000000000002, 2), 1210.0);
    }

    #[test]
    fn test_zero_revenue_has_no_margins() {
        let mut input = cash_flow_input();
        input.pyg_assumptions.current_revenue = 0.0;

        let err = build_financial_health_analysis(&input).unwrap_err();
        assert!(matches!(err, FinanceClientError::Calculation { .. }));
    }

    #[test]
    fn test_compute_from_json() {
        let input = serde_json::to_value(pyg_input()).unwrap();
        let output = ProjectionKind::Pyg.compute(input).unwrap();
        assert_eq!(output["projections"][0]["year"], 1);

        let bad = serde_json::json!({"current_revenue": "lots"});
        assert!(matches!(
            ProjectionKind::CashFlow.compute(bad),
            Err(FinanceClientError::Serialization(_))
        ));
    }
}
