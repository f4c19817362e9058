//! Scenario analytics parser
//!
//! Turns the raw per-instrument scenario observations returned by the
//! instrument analytics service into normalized
//! (base value, scenario value, percent change) triples.

use crate::models::{NormalizedAnalytic, ScenarioObservation};
use tracing::warn;

/// Recognized scenario label prefixes.
///
/// The upstream service embeds a numeric suffix in each label
/// (e.g. `"Base Scenario (0.0000)"`, `"CONDITIONAL_1 (1.0000)"`), so
/// matching is a case-sensitive prefix match rather than equality.
#[derive(Debug, Clone)]
pub struct ScenarioLabels {
    pub base_prefix: String,
    pub conditional_prefix: String,
}

impl Default for ScenarioLabels {
    fn default() -> Self {
        Self {
            base_prefix: "Base".to_string(),
            conditional_prefix: "CONDITIONAL".to_string(),
        }
    }
}

/// Extract the leading numeric token from a value string shaped like
/// `"131.1828 USD"`. The currency suffix is discarded, not validated.
fn leading_number(raw: &str) -> Option<f64> {
    raw.split_whitespace().next()?.parse().ok()
}

fn observed_price(observation: &ScenarioObservation) -> Option<f64> {
    observation
        .values
        .first()?
        .price
        .as_deref()
        .and_then(leading_number)
}

/// Normalize one instrument's observation sequence into a
/// (base, conditional) pair, or `None` when the pair is incomplete.
///
/// The first observation matching each prefix wins. Labels matching
/// neither prefix are logged and skipped; they do not abort the rest
/// of the sequence.
fn normalize_instrument(
    observations: &[ScenarioObservation],
    labels: &ScenarioLabels,
) -> Option<NormalizedAnalytic> {
    let instrument = observations.first()?.instrument.clone();

    let mut base_value: Option<f64> = None;
    let mut scenario_value: Option<f64> = None;
    let mut base_seen = false;
    let mut conditional_seen = false;

    for observation in observations {
        if observation.scenario.starts_with(&labels.base_prefix) {
            // Strictly the first matching observation; a later one never
            // fills in for an unparsable price.
            if !base_seen {
                base_seen = true;
                base_value = observed_price(observation);
            }
        } else if observation.scenario.starts_with(&labels.conditional_prefix) {
            if !conditional_seen {
                conditional_seen = true;
                scenario_value = observed_price(observation);
            }
        } else {
            warn!(
                instrument = %observation.instrument,
                scenario = %observation.scenario,
                "Invalid scenario label, skipping"
            );
        }
    }

    match (base_value, scenario_value) {
        (Some(base), Some(scenario)) if base != 0.0 && scenario != 0.0 => {
            Some(NormalizedAnalytic {
                instrument_id: instrument,
                base_value: base,
                scenario_value: scenario,
                percent_change: (scenario - base) / base,
            })
        }
        _ => {
            // Data-quality condition, not a turn failure.
            warn!(
                instrument = %instrument,
                "Instrument does not have values for base and conditional scenarios, skipping it"
            );
            None
        }
    }
}

/// Parse the fan-out results, one observation sequence per instrument.
///
/// Output ordering follows input ordering; instruments without a
/// usable base/conditional pair simply do not appear.
pub fn parse_risk_analytics(
    results: &[Vec<ScenarioObservation>],
    labels: &ScenarioLabels,
) -> Vec<NormalizedAnalytic> {
    results
        .iter()
        .filter_map(|observations| normalize_instrument(observations, labels))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ObservationValues;

    fn observation(instrument: &str, scenario: &str, price: &str) -> ScenarioObservation {
        ScenarioObservation {
            instrument: instrument.to_string(),
            scenario: scenario.to_string(),
            values: vec![ObservationValues {
                price: Some(price.to_string()),
                date: Some("2017/03/10".to_string()),
            }],
        }
    }

    #[test]
    fn test_percent_change_formula() {
        let results = vec![vec![
            observation("X", "Base Scenario (0.0000)", "100.0 USD"),
            observation("X", "CONDITIONAL_1 (1.0000)", "90.0 USD"),
        ]];

        let analytics = parse_risk_analytics(&results, &ScenarioLabels::default());
        assert_eq!(analytics.len(), 1);
        assert_eq!(analytics[0].base_value, 100.0);
        assert_eq!(analytics[0].scenario_value, 90.0);
        assert!((analytics[0].percent_change - (-0.10)).abs() < 1e-12);
    }

    #[test]
    fn test_currency_suffix_discarded() {
        let results = vec![vec![
            observation("X", "Base Scenario (0.0000)", "131.1828 EUR"),
            observation("X", "CONDITIONAL_1 (1.0000)", "131.1718 EUR"),
        ]];

        let analytics = parse_risk_analytics(&results, &ScenarioLabels::default());
        assert_eq!(analytics[0].base_value, 131.1828);
    }

    #[test]
    fn test_missing_conditional_drops_instrument() {
        let results = vec![vec![observation("X", "Base Scenario (0.0000)", "100.0 USD")]];

        let analytics = parse_risk_analytics(&results, &ScenarioLabels::default());
        assert!(analytics.is_empty());
    }

    #[test]
    fn test_zero_base_drops_instrument() {
        let results = vec![vec![
            observation("X", "Base Scenario (0.0000)", "0 USD"),
            observation("X", "CONDITIONAL_1 (1.0000)", "90.0 USD"),
        ]];

        let analytics = parse_risk_analytics(&results, &ScenarioLabels::default());
        assert!(analytics.is_empty());
    }

    #[test]
    fn test_unrecognized_label_skipped_not_fatal() {
        let results = vec![vec![
            observation("X", "Stressed Spread (2.0000)", "55.0 USD"),
            observation("X", "Base Scenario (0.0000)", "100.0 USD"),
            observation("X", "CONDITIONAL_1 (1.0000)", "110.0 USD"),
        ]];

        let analytics = parse_risk_analytics(&results, &ScenarioLabels::default());
        assert_eq!(analytics.len(), 1);
        assert!((analytics[0].percent_change - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_first_matching_observation_wins() {
        let results = vec![vec![
            observation("X", "Base Scenario (0.0000)", "100.0 USD"),
            observation("X", "Base Scenario (0.0000)", "200.0 USD"),
            observation("X", "CONDITIONAL_1 (1.0000)", "90.0 USD"),
        ]];

        let analytics = parse_risk_analytics(&results, &ScenarioLabels::default());
        assert_eq!(analytics[0].base_value, 100.0);
    }

    #[test]
    fn test_unparsable_first_base_price_drops_instrument() {
        // The first base observation decides; a later base observation
        // does not paper over its bad price.
        let results = vec![vec![
            observation("X", "Base Scenario (0.0000)", "n/a"),
            observation("X", "Base Scenario (0.0000)", "100.0 USD"),
            observation("X", "CONDITIONAL_1 (1.0000)", "90.0 USD"),
        ]];

        let analytics = parse_risk_analytics(&results, &ScenarioLabels::default());
        assert!(analytics.is_empty());
    }

    #[test]
    fn test_output_order_follows_input_order() {
        let results = vec![
            vec![
                observation("B", "Base Scenario (0.0000)", "10.0 USD"),
                observation("B", "CONDITIONAL_1 (1.0000)", "11.0 USD"),
            ],
            // Incomplete pair disappears without disturbing the order.
            vec![observation("M", "Base Scenario (0.0000)", "10.0 USD")],
            vec![
                observation("A", "Base Scenario (0.0000)", "20.0 USD"),
                observation("A", "CONDITIONAL_1 (1.0000)", "19.0 USD"),
            ],
        ];

        let analytics = parse_risk_analytics(&results, &ScenarioLabels::default());
        let ids: Vec<&str> = analytics.iter().map(|a| a.instrument_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn test_configurable_prefixes() {
        let labels = ScenarioLabels {
            base_prefix: "Baseline".to_string(),
            conditional_prefix: "Shock".to_string(),
        };
        let results = vec![vec![
            observation("X", "Baseline (0.0000)", "100.0 USD"),
            observation("X", "Shock_1 (1.0000)", "95.0 USD"),
        ]];

        let analytics = parse_risk_analytics(&results, &labels);
        assert_eq!(analytics.len(), 1);
    }
}
