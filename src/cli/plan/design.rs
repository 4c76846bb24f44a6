//! JSON design file accepted by the `plan` command

use serde::Deserialize;

use crate::config::DesignConfig;
use crate::domain::experiment::{
    DesignError, ExperimentDraft, MetricCatalog, PowerAnalysisInput, MIN_VARIANTS,
};
use crate::domain::DomainError;
use crate::infrastructure::experiment::StaticAnalyticsProvider;

/// A variant as written in the design file; the first entry is the control
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantSpec {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Everything a designer fills in across the wizard steps
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DesignFile {
    pub name: String,
    pub statement: String,
    #[serde(rename = "type")]
    pub experiment_type: Option<String>,
    pub variants: Vec<VariantSpec>,
    pub primary_metric: Option<String>,
    pub secondary_metrics: Vec<String>,
    pub traffic_allocation_percent: Option<u32>,
    pub minimum_detectable_effect: Option<f64>,
    pub desired_power: Option<f64>,
    pub significance_level: Option<f64>,
    pub analytics: StaticAnalyticsProvider,
}

impl DesignFile {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build a draft holding every field of the file
    pub fn to_draft(
        &self,
        catalog: MetricCatalog,
        defaults: &DesignConfig,
    ) -> Result<ExperimentDraft, DesignError> {
        let traffic = self
            .traffic_allocation_percent
            .unwrap_or(defaults.traffic_allocation_percent);
        let mut draft = ExperimentDraft::new(catalog).with_traffic_allocation(traffic);

        let hypothesis = draft.hypothesis_mut()?;
        hypothesis.set_name(self.name.as_str())?;
        hypothesis.set_statement(self.statement.as_str())?;

        if let Some(ref value) = self.experiment_type {
            hypothesis.set_type_value(value)?;
        }

        self.apply_variants(&mut draft)?;

        if let Some(ref primary) = self.primary_metric {
            draft.metrics_mut()?.set_primary(primary)?;
        }

        for metric in &self.secondary_metrics {
            draft.metrics_mut()?.toggle_secondary(metric)?;
        }

        Ok(draft)
    }

    /// Statistical input for the primary metric, if one is chosen
    pub fn power_input(
        &self,
        defaults: &DesignConfig,
    ) -> Result<Option<PowerAnalysisInput>, DomainError> {
        let Some(ref metric) = self.primary_metric else {
            return Ok(None);
        };

        // A missing effect stays unset so the calculator reports it
        let effect = self.minimum_detectable_effect.unwrap_or_default();
        let mut input = PowerAnalysisInput::from_analytics(&self.analytics, metric, effect)?
            .with_power(self.desired_power.unwrap_or(defaults.desired_power))
            .with_significance(
                self.significance_level
                    .unwrap_or(defaults.significance_level),
            );
        input.minimum_detectable_effect = self.minimum_detectable_effect;

        Ok(Some(input))
    }

    /// Grow or shrink the default arms to the file's count, then relabel them together
    fn apply_variants(&self, draft: &mut ExperimentDraft) -> Result<(), DesignError> {
        if self.variants.is_empty() {
            return Ok(());
        }

        let variants = draft.variants_mut()?;

        while variants.len() < self.variants.len() {
            variants.add_variant()?;
        }

        while variants.len() > self.variants.len().max(MIN_VARIANTS) {
            let Some(last) = variants.variants().last().map(|v| v.id().clone()) else {
                break;
            };
            variants.remove_variant(&last)?;
        }

        let edits = variants
            .variants()
            .iter()
            .zip(&self.variants)
            .map(|(variant, spec)| {
                (
                    variant.id().clone(),
                    spec.label.clone(),
                    spec.description.clone(),
                )
            })
            .collect();

        variants.edit_variants(edits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::ExperimentType;

    const DESIGN: &str = r#"{
        "name": "Checkout CTA Color Test",
        "statement": "If we change the checkout button to blue, then conversion will increase",
        "type": "ab",
        "variants": [
            {"label": "Green Button"},
            {"label": "Blue Button", "description": "Trust-conveying blue"},
            {"label": "Orange Button"}
        ],
        "primary_metric": "conversion",
        "secondary_metrics": ["aov", "ctr"],
        "traffic_allocation_percent": 40,
        "minimum_detectable_effect": 0.2,
        "analytics": {"baseline_rates": {"conversion": 0.1}, "daily_eligible_traffic": 10000}
    }"#;

    mod draft_tests {
        use super::*;

        #[test]
        fn test_full_design_builds_draft() {
            let design = DesignFile::from_json(DESIGN).unwrap();
            let draft = design
                .to_draft(MetricCatalog::default(), &DesignConfig::default())
                .unwrap();

            assert_eq!(draft.hypothesis().name(), "Checkout CTA Color Test");
            assert_eq!(draft.hypothesis().experiment_type(), Some(ExperimentType::Ab));
            assert_eq!(
                draft.variants().labels(),
                vec!["Green Button", "Blue Button", "Orange Button"]
            );
            assert!(draft.variants().variants()[0].is_control());
            assert_eq!(draft.variants().variants()[1].description(), "Trust-conveying blue");
            assert_eq!(draft.metrics().primary(), Some("conversion"));
            assert_eq!(draft.metrics().secondary(), ["aov", "ctr"]);
            assert_eq!(draft.traffic_allocation().percent(), 40);
        }

        #[test]
        fn test_empty_design_keeps_defaults() {
            let design = DesignFile::from_json("{}").unwrap();
            let draft = design
                .to_draft(MetricCatalog::default(), &DesignConfig::default())
                .unwrap();

            assert_eq!(draft.variants().labels(), vec!["Control", "Variant A"]);
            assert_eq!(draft.traffic_allocation().percent(), 50);
            assert!(draft.metrics().primary().is_none());
        }

        #[test]
        fn test_single_variant_keeps_floor() {
            let design = DesignFile {
                variants: vec![VariantSpec {
                    label: Some("Baseline".to_string()),
                    description: None,
                }],
                ..DesignFile::default()
            };
            let draft = design
                .to_draft(MetricCatalog::default(), &DesignConfig::default())
                .unwrap();

            assert_eq!(draft.variants().labels(), vec!["Baseline", "Variant A"]);
        }

        #[test]
        fn test_labels_matching_default_arms_are_applied() {
            let design = DesignFile {
                variants: ["Baseline", "Variant B", "Blue"]
                    .into_iter()
                    .map(|label| VariantSpec {
                        label: Some(label.to_string()),
                        description: None,
                    })
                    .collect(),
                ..DesignFile::default()
            };
            let draft = design
                .to_draft(MetricCatalog::default(), &DesignConfig::default())
                .unwrap();

            assert_eq!(draft.variants().labels(), vec!["Baseline", "Variant B", "Blue"]);
            assert!(draft.variants().validate().is_empty());
        }

        #[test]
        fn test_unknown_metric_is_rejected() {
            let design = DesignFile {
                primary_metric: Some("bounce".to_string()),
                ..DesignFile::default()
            };
            let result = design.to_draft(MetricCatalog::default(), &DesignConfig::default());

            assert_eq!(
                result.unwrap_err(),
                DesignError::InvalidMetric("bounce".to_string())
            );
        }

        #[test]
        fn test_duplicate_labels_are_rejected() {
            let design = DesignFile {
                variants: vec![
                    VariantSpec {
                        label: Some("Same".to_string()),
                        description: None,
                    },
                    VariantSpec {
                        label: Some("Same".to_string()),
                        description: None,
                    },
                ],
                ..DesignFile::default()
            };
            let result = design.to_draft(MetricCatalog::default(), &DesignConfig::default());

            assert_eq!(
                result.unwrap_err(),
                DesignError::DuplicateLabel("Same".to_string())
            );
        }
    }

    mod power_input_tests {
        use super::*;

        #[test]
        fn test_power_input_from_analytics() {
            let design = DesignFile::from_json(DESIGN).unwrap();
            let input = design
                .power_input(&DesignConfig::default())
                .unwrap()
                .unwrap();

            assert_eq!(input.baseline_rate, Some(0.1));
            assert_eq!(input.minimum_detectable_effect, Some(0.2));
            assert_eq!(input.estimated_daily_eligible_traffic, Some(10_000));
            assert_eq!(input.desired_power, 0.80);
            assert_eq!(input.significance_level, 0.95);
        }

        #[test]
        fn test_file_overrides_config_defaults() {
            let design = DesignFile {
                primary_metric: Some("conversion".to_string()),
                desired_power: Some(0.9),
                ..DesignFile::default()
            };
            let defaults = DesignConfig {
                significance_level: 0.99,
                ..DesignConfig::default()
            };
            let input = design.power_input(&defaults).unwrap().unwrap();

            assert_eq!(input.desired_power, 0.9);
            assert_eq!(input.significance_level, 0.99);
            assert_eq!(input.baseline_rate, None);
            assert_eq!(input.minimum_detectable_effect, None);
        }

        #[test]
        fn test_no_primary_metric() {
            let design = DesignFile::default();
            assert!(design.power_input(&DesignConfig::default()).unwrap().is_none());
        }
    }
}
