//! Portfolio impact aggregation
//!
//! Combines current holdings with normalized scenario analytics into a
//! portfolio-level dollar and percentage impact with a per-holding
//! breakdown.

use crate::models::{Holding, HoldingImpact, NormalizedAnalytic, PortfolioImpact};
use std::collections::HashMap;
use tracing::debug;

/// Aggregate analytics over the current holdings.
///
/// Every holding appears in the breakdown. Holdings without a matching
/// analytic contribute zero to the totals but are not omitted. When the
/// total value change (or total base value) is exactly zero, the
/// derived ratios are reported as zero rather than dividing by zero.
pub fn aggregate_portfolio_impact(
    holdings: &[Holding],
    analytics: &[NormalizedAnalytic],
) -> PortfolioImpact {
    // instrument id → analytic, built once per turn; last write wins
    let by_instrument: HashMap<&str, &NormalizedAnalytic> = analytics
        .iter()
        .map(|analytic| (analytic.instrument_id.as_str(), analytic))
        .collect();

    let mut total_value_change = 0.0;
    let mut total_base_value = 0.0;
    let mut impacts = Vec::with_capacity(holdings.len());

    for holding in holdings {
        let mut percent_change = 0.0;
        let mut value_change = 0.0;

        if let Some(analytic) = by_instrument.get(holding.instrument_id.as_str()) {
            percent_change = analytic.percent_change;
            value_change = (analytic.scenario_value - analytic.base_value) * holding.quantity;
            total_value_change += value_change;
            total_base_value += analytic.base_value * holding.quantity;
        }

        impacts.push(HoldingImpact {
            asset: holding.asset.clone(),
            quantity: holding.quantity,
            percent_change,
            value_change,
            portfolio_impact_share: 0.0,
        });
    }

    // Second pass: each holding's share of the total move.
    for impact in &mut impacts {
        impact.portfolio_impact_share = if total_value_change == 0.0 {
            0.0
        } else {
            impact.value_change / total_value_change
        };
    }

    let total_percent_change = if total_base_value == 0.0 {
        0.0
    } else {
        total_value_change / total_base_value
    };

    debug!(
        total_value_change,
        total_percent_change,
        holding_count = impacts.len(),
        "Aggregated portfolio impact"
    );

    PortfolioImpact {
        total_value_change,
        total_percent_change,
        impact_by_holding: impacts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(asset: &str, instrument_id: &str, quantity: f64) -> Holding {
        Holding {
            asset: asset.to_string(),
            instrument_id: instrument_id.to_string(),
            quantity,
        }
    }

    fn analytic(instrument_id: &str, base: f64, scenario: f64) -> NormalizedAnalytic {
        NormalizedAnalytic {
            instrument_id: instrument_id.to_string(),
            base_value: base,
            scenario_value: scenario,
            percent_change: (scenario - base) / base,
        }
    }

    #[test]
    fn test_single_holding_worked_example() {
        let holdings = vec![holding("IBM", "X", 36.0)];
        let analytics = vec![analytic("X", 100.0, 90.0)];

        let impact = aggregate_portfolio_impact(&holdings, &analytics);

        assert!((impact.total_value_change - (-360.0)).abs() < 1e-9);
        assert!((impact.total_percent_change - (-0.10)).abs() < 1e-12);
        assert_eq!(impact.impact_by_holding.len(), 1);

        let ibm = &impact.impact_by_holding[0];
        assert!((ibm.value_change - (-360.0)).abs() < 1e-9);
        assert!((ibm.percent_change - (-0.10)).abs() < 1e-12);
        assert!((ibm.portfolio_impact_share - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unmatched_holding_still_in_breakdown() {
        let holdings = vec![
            holding("IBM", "X", 36.0),
            holding("LNVGY", "Y", 520.0),
        ];
        // Y never produced a valid analytic pair.
        let analytics = vec![analytic("X", 100.0, 90.0)];

        let impact = aggregate_portfolio_impact(&holdings, &analytics);

        assert_eq!(impact.impact_by_holding.len(), 2);
        let lnvgy = &impact.impact_by_holding[1];
        assert_eq!(lnvgy.value_change, 0.0);
        assert_eq!(lnvgy.percent_change, 0.0);
        assert_eq!(lnvgy.portfolio_impact_share, 0.0);
        assert!((impact.total_value_change - (-360.0)).abs() < 1e-9);
    }

    #[test]
    fn test_value_changes_sum_to_total() {
        let holdings = vec![
            holding("IBM", "X", 36.0),
            holding("LNVGY", "Y", 520.0),
        ];
        let analytics = vec![analytic("X", 100.0, 90.0), analytic("Y", 91.18, 89.0)];

        let impact = aggregate_portfolio_impact(&holdings, &analytics);

        let sum: f64 = impact
            .impact_by_holding
            .iter()
            .map(|h| h.value_change)
            .sum();
        assert!((sum - impact.total_value_change).abs() < 1e-9);
    }

    #[test]
    fn test_zero_total_change_zeroes_every_share() {
        let holdings = vec![
            holding("UP", "X", 10.0),
            holding("DOWN", "Y", 10.0),
        ];
        // Moves cancel exactly.
        let analytics = vec![analytic("X", 100.0, 110.0), analytic("Y", 100.0, 90.0)];

        let impact = aggregate_portfolio_impact(&holdings, &analytics);

        assert_eq!(impact.total_value_change, 0.0);
        for h in &impact.impact_by_holding {
            assert_eq!(h.portfolio_impact_share, 0.0);
        }
    }

    #[test]
    fn test_empty_analytics_zero_totals() {
        let holdings = vec![holding("IBM", "X", 36.0)];

        let impact = aggregate_portfolio_impact(&holdings, &[]);

        assert_eq!(impact.total_value_change, 0.0);
        assert_eq!(impact.total_percent_change, 0.0);
        assert_eq!(impact.impact_by_holding.len(), 1);
    }

    #[test]
    fn test_short_position_propagates() {
        let holdings = vec![holding("IBM", "X", -36.0)];
        let analytics = vec![analytic("X", 100.0, 90.0)];

        let impact = aggregate_portfolio_impact(&holdings, &analytics);

        // Short position gains when the instrument falls.
        assert!((impact.total_value_change - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_instrument_last_write_wins() {
        let holdings = vec![holding("IBM", "X", 1.0)];
        let analytics = vec![analytic("X", 100.0, 90.0), analytic("X", 100.0, 80.0)];

        let impact = aggregate_portfolio_impact(&holdings, &analytics);
        assert!((impact.total_value_change - (-20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_reaggregation_is_idempotent() {
        let holdings = vec![
            holding("IBM", "X", 36.0),
            holding("LNVGY", "Y", 520.0),
        ];
        let analytics = vec![analytic("X", 100.0, 90.0), analytic("Y", 91.18, 89.0)];

        let first = aggregate_portfolio_impact(&holdings, &analytics);
        let second = aggregate_portfolio_impact(&holdings, &analytics);

        assert_eq!(first.total_value_change, second.total_value_change);
        assert_eq!(first.total_percent_change, second.total_percent_change);
    }
}
