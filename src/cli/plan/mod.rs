//! Plan command - walks a design file through the wizard and launches it

mod design;

pub use design::{DesignFile, VariantSpec};

use std::fmt;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::experiment::{
    DesignError, DesignValidationError, ExperimentRecord, ExperimentRuntime, LaunchSummary,
    PowerCalculator, StepProgress, WizardStateMachine, WizardStep,
};
use crate::infrastructure::experiment::{
    CachedPowerCalculator, InMemoryExperimentRuntime, TwoProportionCalculator,
};

/// Arguments for the plan command
#[derive(Args, Clone)]
pub struct PlanArgs {
    /// Path to the JSON design file
    pub design: PathBuf,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of driving a design through the wizard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlanOutcome {
    Launched {
        summary: LaunchSummary,
        power_summary: String,
        record: ExperimentRecord,
    },
    Refused {
        step: WizardStep,
        errors: Vec<DesignValidationError>,
        progress: Vec<StepProgress>,
    },
}

/// Run the plan command
pub fn run(args: PlanArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let json = std::fs::read_to_string(&args.design)
        .with_context(|| format!("Failed to read design file {}", args.design.display()))?;
    let design = DesignFile::from_json(&json)
        .with_context(|| format!("Invalid design file {}", args.design.display()))?;

    let calculator = CachedPowerCalculator::with_capacity(
        TwoProportionCalculator,
        config.design.power_cache_capacity,
    );
    let runtime = InMemoryExperimentRuntime::new();

    let outcome = plan(&design, &config, &calculator, &runtime)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", render(&outcome));
    }

    if let PlanOutcome::Refused { step, .. } = outcome {
        anyhow::bail!("Design refused at step '{}'", step.label());
    }

    Ok(())
}

/// Drive the design through every step, stopping at the first refused one
pub fn plan(
    design: &DesignFile,
    config: &AppConfig,
    calculator: &dyn PowerCalculator,
    runtime: &dyn ExperimentRuntime,
) -> Result<PlanOutcome, DesignError> {
    let draft = design.to_draft(config.catalog.metrics.clone(), &config.design)?;
    let mut wizard = WizardStateMachine::with_draft(draft);

    while wizard.step() != WizardStep::Launch {
        if wizard.step() == WizardStep::PowerAnalysis {
            let input = design
                .power_input(&config.design)
                .map_err(DesignError::Analytics)?;

            if let Some(input) = input {
                wizard.run_power_analysis(calculator, &input)?;
            }
        }

        match wizard.advance() {
            Ok(step) => info!(step = %step, "Step completed"),
            Err(DesignError::StepIncomplete(errors)) => return Ok(refused(&wizard, errors)),
            Err(e) => return Err(e),
        }
    }

    match wizard.launch(runtime) {
        Ok(record) => Ok(PlanOutcome::Launched {
            summary: record.summary(),
            power_summary: record.power_analysis_result().describe(),
            record: record.clone(),
        }),
        Err(DesignError::NotReady(errors)) => Ok(refused(&wizard, errors)),
        Err(e) => Err(e),
    }
}

fn refused(wizard: &WizardStateMachine, errors: Vec<DesignValidationError>) -> PlanOutcome {
    PlanOutcome::Refused {
        step: wizard.step(),
        errors,
        progress: wizard.progress(),
    }
}

/// Human-readable rendering of an outcome
pub fn render(outcome: &PlanOutcome) -> String {
    outcome.to_string()
}

impl fmt::Display for PlanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanOutcome::Launched {
                summary,
                power_summary,
                record,
            } => {
                let power = record.power_analysis_result();
                writeln!(f, "Launched experiment {}", record.id())?;
                writeln!(f, "  Name:               {}", summary.name)?;
                writeln!(f, "  Hypothesis:         {}", summary.statement)?;
                writeln!(f, "  Variants:           {}", summary.variant_count)?;
                writeln!(
                    f,
                    "  Traffic allocation: {}%",
                    summary.traffic_allocation_percent
                )?;
                writeln!(f, "  Primary metric:     {}", summary.primary_metric)?;
                writeln!(
                    f,
                    "  Sample size:        {} per variant, {} total",
                    power.sample_size_per_variant, power.total_sample_size
                )?;
                writeln!(f, "  Duration:           {} days", summary.duration_days)?;
                writeln!(f, "{}", power_summary)
            }
            PlanOutcome::Refused {
                step,
                errors,
                progress,
            } => {
                let steps: Vec<_> = progress
                    .iter()
                    .map(|p| format!("{} ({:?})", p.label, p.status))
                    .collect();
                writeln!(f, "Progress: {}", steps.join(" > "))?;
                writeln!(f, "Step '{}' is incomplete:", step.label())?;

                for error in errors {
                    writeln!(f, "  - {}", error)?;
                }

                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::{Field, MockExperimentRuntime, PowerAnalysisError};
    use crate::domain::DomainError;
    use crate::infrastructure::experiment::StaticAnalyticsProvider;

    fn scenario() -> DesignFile {
        DesignFile::from_json(
            r#"{
                "name": "Checkout CTA Color Test",
                "statement": "If we change the checkout button to blue, then conversion will increase",
                "primary_metric": "conversion",
                "minimum_detectable_effect": 0.2,
                "analytics": {"baseline_rates": {"conversion": 0.1}, "daily_eligible_traffic": 10000}
            }"#,
        )
        .unwrap()
    }

    mod plan_tests {
        use super::*;

        #[test]
        fn test_complete_design_launches() {
            let runtime = InMemoryExperimentRuntime::new();
            let outcome = plan(
                &scenario(),
                &AppConfig::default(),
                &TwoProportionCalculator,
                &runtime,
            )
            .unwrap();

            let PlanOutcome::Launched { summary, record, .. } = outcome else {
                panic!("expected launch");
            };

            assert_eq!(summary.name, "Checkout CTA Color Test");
            assert_eq!(summary.variant_count, 2);
            assert_eq!(summary.traffic_allocation_percent, 50);
            assert_eq!(summary.primary_metric, "Conversion Rate");
            assert_eq!(summary.duration_days, 2);
            assert_eq!(runtime.get(record.id()).unwrap(), Some(record));
        }

        #[test]
        fn test_missing_name_is_refused_at_hypothesis() {
            let design = DesignFile {
                name: "   ".to_string(),
                ..scenario()
            };
            let runtime = InMemoryExperimentRuntime::new();
            let outcome = plan(
                &design,
                &AppConfig::default(),
                &TwoProportionCalculator,
                &runtime,
            )
            .unwrap();

            assert_eq!(
                outcome,
                PlanOutcome::Refused {
                    step: WizardStep::Hypothesis,
                    errors: vec![DesignValidationError::MissingField(Field::Name)],
                    progress: WizardStateMachine::default().progress(),
                }
            );
            assert!(runtime.is_empty().unwrap());
        }

        #[test]
        fn test_bad_traffic_is_refused_at_variants() {
            let design = DesignFile {
                traffic_allocation_percent: Some(101),
                ..scenario()
            };
            let outcome = plan(
                &design,
                &AppConfig::default(),
                &TwoProportionCalculator,
                &InMemoryExperimentRuntime::new(),
            )
            .unwrap();

            let PlanOutcome::Refused { step, errors, .. } = outcome else {
                panic!("expected refusal");
            };
            assert_eq!(step, WizardStep::Variants);
            assert_eq!(
                errors,
                vec![DesignValidationError::InvalidTrafficAllocation(101)]
            );
        }

        #[test]
        fn test_missing_metric_is_refused_at_metrics() {
            let design = DesignFile {
                primary_metric: None,
                ..scenario()
            };
            let outcome = plan(
                &design,
                &AppConfig::default(),
                &TwoProportionCalculator,
                &InMemoryExperimentRuntime::new(),
            )
            .unwrap();

            let PlanOutcome::Refused { step, errors, .. } = outcome else {
                panic!("expected refusal");
            };
            assert_eq!(step, WizardStep::Metrics);
            assert_eq!(errors, vec![DesignValidationError::MetricNotSelected]);
        }

        #[test]
        fn test_missing_baseline_fails_power_analysis() {
            let design = DesignFile {
                analytics: Default::default(),
                ..scenario()
            };
            let result = plan(
                &design,
                &AppConfig::default(),
                &TwoProportionCalculator,
                &InMemoryExperimentRuntime::new(),
            );

            assert_eq!(
                result.unwrap_err(),
                DesignError::PowerAnalysis(PowerAnalysisError::InsufficientData(
                    "baseline_rate".to_string()
                ))
            );
        }

        #[test]
        fn test_analytics_failure_is_not_a_runtime_failure() {
            let design = DesignFile {
                analytics: StaticAnalyticsProvider::new().with_baseline_rate("conversion", f64::NAN),
                ..scenario()
            };
            let runtime = InMemoryExperimentRuntime::new();
            let result = plan(
                &design,
                &AppConfig::default(),
                &TwoProportionCalculator,
                &runtime,
            );

            assert!(matches!(
                result,
                Err(DesignError::Analytics(DomainError::Validation { .. }))
            ));
            assert!(runtime.is_empty().unwrap());
        }

        #[test]
        fn test_runtime_failure_is_reported() {
            let mut runtime = MockExperimentRuntime::new();
            runtime
                .expect_submit()
                .times(1)
                .returning(|_| Err(DomainError::internal("runtime unavailable")));

            let result = plan(
                &scenario(),
                &AppConfig::default(),
                &TwoProportionCalculator,
                &runtime,
            );

            assert!(matches!(result, Err(DesignError::Runtime(_))));
        }

        #[test]
        fn test_repeated_plans_share_cached_calculator() {
            let calculator = CachedPowerCalculator::new(TwoProportionCalculator);
            let runtime = InMemoryExperimentRuntime::new();

            plan(&scenario(), &AppConfig::default(), &calculator, &runtime).unwrap();
            plan(&scenario(), &AppConfig::default(), &calculator, &runtime).unwrap();

            assert_eq!(runtime.len().unwrap(), 2);
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_render_launch() {
            let outcome = plan(
                &scenario(),
                &AppConfig::default(),
                &TwoProportionCalculator,
                &InMemoryExperimentRuntime::new(),
            )
            .unwrap();
            let text = render(&outcome);

            assert!(text.starts_with("Launched experiment exp-"));
            assert!(text.contains("Primary metric:     Conversion Rate"));
            assert!(text.contains("Duration:           2 days"));
            assert!(text.contains("80% chance of detecting a 20% or greater change"));
        }

        #[test]
        fn test_render_refusal() {
            let outcome = PlanOutcome::Refused {
                step: WizardStep::Metrics,
                errors: vec![DesignValidationError::MetricNotSelected],
                progress: Vec::new(),
            };
            let text = render(&outcome);

            assert!(text.contains("Step 'Metrics' is incomplete:"));
            assert!(text.contains(&format!("  - {}", DesignValidationError::MetricNotSelected)));
        }

        #[test]
        fn test_render_refusal_lists_every_error_in_order() {
            let outcome = PlanOutcome::Refused {
                step: WizardStep::Hypothesis,
                errors: vec![
                    DesignValidationError::MissingField(Field::Name),
                    DesignValidationError::MissingField(Field::Statement),
                ],
                progress: WizardStateMachine::default().progress(),
            };

            let lines: Vec<_> = render(&outcome).lines().map(str::to_string).collect();

            assert_eq!(lines.len(), 4);
            assert!(lines[0].starts_with("Progress: Hypothesis (Current) > Variants (Pending)"));
            assert_eq!(lines[1], "Step 'Hypothesis' is incomplete:");
            assert_eq!(
                lines[2],
                format!("  - {}", DesignValidationError::MissingField(Field::Name))
            );
            assert_eq!(
                lines[3],
                format!("  - {}", DesignValidationError::MissingField(Field::Statement))
            );
            assert_eq!(render(&outcome), outcome.to_string());
        }

        #[test]
        fn test_json_outcome_is_tagged() {
            let outcome = PlanOutcome::Refused {
                step: WizardStep::PowerAnalysis,
                errors: vec![DesignValidationError::PowerAnalysisMissing],
                progress: Vec::new(),
            };
            let json = serde_json::to_value(&outcome).unwrap();

            assert_eq!(json["outcome"], "refused");
            assert_eq!(json["step"], "power_analysis");
            assert_eq!(json["errors"][0]["kind"], "power_analysis_missing");
        }
    }
}
