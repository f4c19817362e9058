//! Intent routing and response rendering
//!
//! A single classification result drives exactly one branch per turn:
//! greeting, holdings listing, scenario impact, or a clarifying
//! response when the classifier produced no intent at all.

use crate::models::{Entity, Holding, PortfolioImpact};

pub const GREETING_INTENT: &str = "hello";
pub const HOLDINGS_INTENT: &str = "portfolio_holdings";

pub const GREETING_TEXT: &str = "Hello, Welcome to the Personal Wealth Management Portfolio Bot; \
Ask a question such as: How are my portfolio holdings? \
OR What is the impact on my portfolio if the S&P 500 goes down 5%";

pub const EMPTY_PORTFOLIO_TEXT: &str = "Your portfolio is empty";

pub const UNAFFECTED_TEXT: &str = "Under that scenario your portfolio could be unaffected";

pub const UNKNOWN_INTENT_TEXT: &str = "Sorry, I did not catch that. \
Ask me about your portfolio holdings, or what happens to your portfolio under a market scenario.";

/// Which downstream computation a classified message requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteBranch {
    Greeting,
    HoldingsQuery,
    ImpactQuery,
    Unknown,
}

impl RouteBranch {
    /// Select the branch for the classifier's top intent.
    ///
    /// Any recognized intent other than greeting or holdings listing is
    /// treated as a what-if impact query. An absent intent (empty name)
    /// gets its own clarifying branch instead of silently defaulting to
    /// the impact query.
    pub fn for_intent(intent: &str) -> Self {
        match intent {
            "" => RouteBranch::Unknown,
            GREETING_INTENT => RouteBranch::Greeting,
            HOLDINGS_INTENT => RouteBranch::HoldingsQuery,
            _ => RouteBranch::ImpactQuery,
        }
    }
}

/// Resolve the instrument ids implicated by an impact query.
///
/// Entities whose value names a held asset narrow the query to those
/// positions; with no matching entity the whole portfolio is analyzed.
pub fn implicated_instruments(holdings: &[Holding], entities: &[Entity]) -> Vec<String> {
    let named: Vec<&Holding> = holdings
        .iter()
        .filter(|holding| {
            entities
                .iter()
                .any(|entity| entity.value.eq_ignore_ascii_case(&holding.asset))
        })
        .collect();

    let selected: Vec<&Holding> = if named.is_empty() {
        holdings.iter().collect()
    } else {
        named
    };

    selected
        .into_iter()
        .map(|holding| holding.instrument_id.clone())
        .collect()
}

/// Render the holdings listing sentence.
pub fn render_holdings(holdings: &[Holding]) -> String {
    if holdings.is_empty() {
        return EMPTY_PORTFOLIO_TEXT.to_string();
    }

    let positions: Vec<String> = holdings
        .iter()
        .map(|holding| {
            format!(
                "{} shares of {}",
                format_quantity(holding.quantity),
                holding.asset
            )
        })
        .collect();

    format!("Your portfolio consists of {}", positions.join(", "))
}

/// Render the scenario impact sentence.
pub fn render_impact(impact: &PortfolioImpact) -> String {
    if impact.total_value_change == 0.0 {
        return UNAFFECTED_TEXT.to_string();
    }

    let direction = if impact.total_value_change < 0.0 {
        "decrease"
    } else {
        "increase"
    };

    format!(
        "Under that scenario your portfolio could {} by {:.2}%, or {}",
        direction,
        impact.total_percent_change.abs() * 100.0,
        format_currency(impact.total_value_change.abs()),
    )
}

/// Whole share counts print without a decimal point.
fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{:.0}", quantity)
    } else {
        quantity.to_string()
    }
}

/// Dollar magnitude with thousands separators, rounded to the nearest
/// dollar. Direction is rendered separately, so the amount is expected
/// to be non-negative.
fn format_currency(amount: f64) -> String {
    let digits = (amount.round() as u64).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("${}", grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HoldingImpact;

    fn holding(asset: &str, instrument_id: &str, quantity: f64) -> Holding {
        Holding {
            asset: asset.to_string(),
            instrument_id: instrument_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_branch_selection() {
        assert_eq!(RouteBranch::for_intent("hello"), RouteBranch::Greeting);
        assert_eq!(
            RouteBranch::for_intent("portfolio_holdings"),
            RouteBranch::HoldingsQuery
        );
        assert_eq!(
            RouteBranch::for_intent("portfolio_impact"),
            RouteBranch::ImpactQuery
        );
        assert_eq!(
            RouteBranch::for_intent("market_whatif"),
            RouteBranch::ImpactQuery
        );
        assert_eq!(RouteBranch::for_intent(""), RouteBranch::Unknown);
    }

    #[test]
    fn test_render_empty_holdings_exact_text() {
        assert_eq!(render_holdings(&[]), "Your portfolio is empty");
    }

    #[test]
    fn test_render_holdings_listing() {
        let holdings = vec![
            holding("IBM", "X", 36.0),
            holding("LNVGY", "Y", 520.0),
        ];
        assert_eq!(
            render_holdings(&holdings),
            "Your portfolio consists of 36 shares of IBM, 520 shares of LNVGY"
        );
    }

    #[test]
    fn test_render_unaffected_exact_text() {
        let impact = PortfolioImpact {
            total_value_change: 0.0,
            total_percent_change: 0.0,
            impact_by_holding: vec![],
        };
        assert_eq!(
            render_impact(&impact),
            "Under that scenario your portfolio could be unaffected"
        );
    }

    #[test]
    fn test_render_decrease() {
        let impact = PortfolioImpact {
            total_value_change: -360.0,
            total_percent_change: -0.10,
            impact_by_holding: vec![HoldingImpact {
                asset: "IBM".to_string(),
                quantity: 36.0,
                percent_change: -0.10,
                value_change: -360.0,
                portfolio_impact_share: 1.0,
            }],
        };
        assert_eq!(
            render_impact(&impact),
            "Under that scenario your portfolio could decrease by 10.00%, or $360"
        );
    }

    #[test]
    fn test_render_increase_with_grouping() {
        let impact = PortfolioImpact {
            total_value_change: 1234567.4,
            total_percent_change: 0.0523,
            impact_by_holding: vec![],
        };
        assert_eq!(
            render_impact(&impact),
            "Under that scenario your portfolio could increase by 5.23%, or $1,234,567"
        );
    }

    #[test]
    fn test_implicated_instruments_whole_portfolio() {
        let holdings = vec![holding("IBM", "X", 36.0), holding("LNVGY", "Y", 520.0)];
        let ids = implicated_instruments(&holdings, &[]);
        assert_eq!(ids, vec!["X".to_string(), "Y".to_string()]);
    }

    #[test]
    fn test_implicated_instruments_narrowed_by_entity() {
        let holdings = vec![holding("IBM", "X", 36.0), holding("LNVGY", "Y", 520.0)];
        let entities = vec![Entity {
            entity: "asset".to_string(),
            value: "ibm".to_string(),
        }];
        let ids = implicated_instruments(&holdings, &entities);
        assert_eq!(ids, vec!["X".to_string()]);
    }

    #[test]
    fn test_unmatched_entity_falls_back_to_all() {
        let holdings = vec![holding("IBM", "X", 36.0)];
        let entities = vec![Entity {
            entity: "asset".to_string(),
            value: "TSLA".to_string(),
        }];
        let ids = implicated_instruments(&holdings, &entities);
        assert_eq!(ids, vec!["X".to_string()]);
    }

    #[test]
    fn test_fractional_quantity_rendering() {
        let holdings = vec![holding("GLD", "Z", 2.5)];
        assert_eq!(
            render_holdings(&holdings),
            "Your portfolio consists of 2.5 shares of GLD"
        );
    }
}
