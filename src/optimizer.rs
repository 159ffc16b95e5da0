//! Budget reallocation scenarios derived from a fitted model.
//!
//! Three deterministic profiles reshape the current spend mix using each
//! spend channel's ROI relative to the run's blended ROI. This is a
//! what-if layer over a [`ModelRun`], not a re-fit: projected figures are
//! directional, meant to seed a planning conversation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::ModelRun;

/// Per-channel line of a reallocation scenario. Spend figures are in the
/// caller's currency units (typically mean weekly spend).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioChannel {
    pub channel: String,
    pub current_spend: f64,
    pub recommended_spend: f64,
    /// Percent change from current to recommended spend.
    pub change: f64,
    pub projected_roi: f64,
}

/// One budget scenario across all spend channels of a run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptimizerScenario {
    pub id: String,
    pub title: String,
    pub recommended_spend: f64,
    pub projected_roi: f64,
    pub net_revenue: f64,
    pub channels: Vec<ScenarioChannel>,
}

struct Profile {
    id: &'static str,
    title: &'static str,
    roi_adjustment: f64,
    multiplier: fn(channel_roi: f64, blended: f64) -> f64,
}

const PROFILES: [Profile; 3] = [
    Profile {
        id: "maximize_roi",
        title: "Maximize ROI",
        roi_adjustment: 0.15,
        multiplier: |roi, blended| {
            if roi > blended * 1.1 {
                1.5
            } else if roi < blended * 0.9 {
                0.5
            } else {
                0.8
            }
        },
    },
    Profile {
        id: "maximize_contribution",
        title: "Maximize Contribution",
        roi_adjustment: -0.1,
        multiplier: |roi, blended| if roi > blended * 0.5 { 1.5 } else { 1.1 },
    },
    Profile {
        id: "balanced",
        title: "Balanced Approach",
        roi_adjustment: 0.05,
        multiplier: |roi, blended| {
            if roi > blended * 1.1 {
                1.25
            } else if roi < blended * 0.9 {
                0.75
            } else {
                1.0
            }
        },
    },
];

/// Generate the three reallocation scenarios for a run.
///
/// Only included spend channels (those with a defined ROI) participate.
/// `current_spend` maps channel name to its present spend level; channels
/// missing from the map are treated as unfunded. Returns an empty list when
/// the run has no blended ROI to steer by.
pub fn generate_scenarios(
    model: &ModelRun,
    current_spend: &HashMap<String, f64>,
) -> Vec<OptimizerScenario> {
    let Some(blended) = model.blended_roi else {
        return Vec::new();
    };

    PROFILES
        .iter()
        .map(|profile| {
            let channels: Vec<ScenarioChannel> = model
                .details
                .iter()
                .filter(|d| d.included)
                .filter_map(|d| d.roi.map(|roi| (d, roi)))
                .map(|(detail, roi)| {
                    let current = current_spend
                        .get(&detail.channel)
                        .copied()
                        .unwrap_or(0.0);
                    let multiplier = (profile.multiplier)(roi, blended);
                    let recommended = current * multiplier;
                    let change = if current == 0.0 {
                        0.0
                    } else {
                        (recommended - current) / current * 100.0
                    };

                    ScenarioChannel {
                        channel: detail.channel.clone(),
                        current_spend: current,
                        recommended_spend: recommended,
                        change,
                        projected_roi: roi
                            * (1.0 + profile.roi_adjustment + (multiplier - 1.0) * 0.1),
                    }
                })
                .collect();

            let recommended_spend: f64 = channels.iter().map(|c| c.recommended_spend).sum();
            let projected_roi = blended + profile.roi_adjustment;

            OptimizerScenario {
                id: profile.id.to_string(),
                title: profile.title.to_string(),
                recommended_spend,
                projected_roi,
                net_revenue: recommended_spend * (projected_roi - 1.0),
                channels,
            }
        })
        .collect()
}
