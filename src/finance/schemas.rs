use serde::{Deserialize, Serialize};

// --- P&L (PYG) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PygYearProjection {
    pub year: u32,
    pub revenue: f64,
    pub cogs: f64,
    pub gross_profit: f64,
    pub operating_expenses: f64,
    pub ebit: f64,
    pub tax: f64,
    pub net_income: f64,
    pub net_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PygProjectionInput {
    pub current_revenue: f64,
    pub revenue_growth_rate: f64,
    pub cogs_as_percent_of_revenue: f64,
    pub operating_expenses: f64,
    pub tax_rate: f64,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PygProjectionOutput {
    pub summary: String,
    pub projections: Vec<PygYearProjection>,
}

// --- Cash flow ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowYearProjection {
    pub year: u32,
    pub beginning_cash: f64,
    pub cash_from_operations: f64,
    pub cash_from_investing: f64,
    pub cash_from_financing: f64,
    pub ending_cash: f64,
    pub free_cash_flow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowProjectionInput {
    pub pyg_assumptions: PygProjectionInput,
    pub working_capital_percent_of_revenue: f64,
    pub initial_cash_balance: f64,
    pub depreciation_rate: f64,
    pub capex_per_year: f64,
    pub debt_issued_per_year: f64,
    pub debt_repayment_per_year: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowProjectionOutput {
    pub summary: String,
    pub years: Vec<CashFlowYearProjection>,
}

// --- Financial health ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialIndicatorYear {
    pub year: u32,
    pub revenue: f64,
    pub net_income: f64,
    pub free_cash_flow: f64,
    pub operating_cash_flow: f64,
    pub ebit_margin: Option<f64>,
    pub net_margin: Option<f64>,
    pub fcf_to_revenue: Option<f64>,
    pub ocf_to_net_income: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialHealthOutput {
    pub summary: String,
    pub recommendations: Vec<String>,
    pub indicators: Vec<FinancialIndicatorYear>,
}
