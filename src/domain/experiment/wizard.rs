//! Forward-validated experiment design wizard

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use super::catalog::MetricCatalog;
use super::draft::ExperimentDraft;
use super::power::{PowerAnalysisInput, PowerAnalysisResult, PowerCalculator};
use super::readiness::{LaunchReadiness, LaunchReadinessGate};
use super::record::ExperimentRecord;
use super::runtime::ExperimentRuntime;
use super::validation::{DesignError, DesignValidationError};

// ============================================================================
// WizardStep
// ============================================================================

/// Wizard states, strictly linear
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Hypothesis,
    Variants,
    Metrics,
    PowerAnalysis,
    Launch,
    Launched,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        Self::Hypothesis,
        Self::Variants,
        Self::Metrics,
        Self::PowerAnalysis,
        Self::Launch,
        Self::Launched,
    ];

    /// Display label of the step
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hypothesis => "Hypothesis",
            Self::Variants => "Variants",
            Self::Metrics => "Metrics",
            Self::PowerAnalysis => "Power Analysis",
            Self::Launch => "Launch",
            Self::Launched => "Launched",
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        match self {
            Self::Hypothesis => Some(Self::Variants),
            Self::Variants => Some(Self::Metrics),
            Self::Metrics => Some(Self::PowerAnalysis),
            Self::PowerAnalysis => Some(Self::Launch),
            Self::Launch => Some(Self::Launched),
            Self::Launched => None,
        }
    }

    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            Self::Hypothesis => None,
            Self::Variants => Some(Self::Hypothesis),
            Self::Metrics => Some(Self::Variants),
            Self::PowerAnalysis => Some(Self::Metrics),
            Self::Launch => Some(Self::PowerAnalysis),
            Self::Launched => Some(Self::Launch),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Launched)
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hypothesis => write!(f, "hypothesis"),
            Self::Variants => write!(f, "variants"),
            Self::Metrics => write!(f, "metrics"),
            Self::PowerAnalysis => write!(f, "power_analysis"),
            Self::Launch => write!(f, "launch"),
            Self::Launched => write!(f, "launched"),
        }
    }
}

/// Position of a step relative to the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Current,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    pub step: WizardStep,
    pub label: &'static str,
    pub status: StepStatus,
}

// ============================================================================
// WizardStateMachine
// ============================================================================

/// Owns one draft and walks it through the design steps
#[derive(Debug, Clone)]
pub struct WizardStateMachine {
    step: WizardStep,
    draft: ExperimentDraft,
    record: Option<ExperimentRecord>,
}

impl WizardStateMachine {
    /// Open the wizard on a fresh draft
    pub fn new(catalog: MetricCatalog) -> Self {
        Self::with_draft(ExperimentDraft::new(catalog))
    }

    /// Open the wizard on an existing draft, at the first step
    pub fn with_draft(draft: ExperimentDraft) -> Self {
        Self {
            step: WizardStep::Hypothesis,
            draft,
            record: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &ExperimentDraft {
        &self.draft
    }

    /// Edit access to the draft; refused with `ImmutableState` once launched
    pub fn draft_mut(&mut self) -> Result<&mut ExperimentDraft, DesignError> {
        if self.step.is_terminal() || self.draft.is_frozen() {
            return Err(DesignError::ImmutableState);
        }
        Ok(&mut self.draft)
    }

    /// The launched record, once `launch` has succeeded
    pub fn record(&self) -> Option<&ExperimentRecord> {
        self.record.as_ref()
    }

    /// Validation errors blocking progress out of the given step
    pub fn validate_step(&self, step: WizardStep) -> Vec<DesignValidationError> {
        match step {
            WizardStep::Hypothesis => self.draft.hypothesis().validate(),
            WizardStep::Variants => {
                let mut errors = self.draft.variants().validate();
                errors.extend(self.draft.traffic_allocation().validate());
                errors
            }
            WizardStep::Metrics => self.draft.metrics().validate(),
            WizardStep::PowerAnalysis => self.draft.validate_power_analysis(),
            WizardStep::Launch => self.readiness().blockers,
            WizardStep::Launched => Vec::new(),
        }
    }

    /// Move forward if the current step validates; otherwise return every error
    pub fn advance(&mut self) -> Result<WizardStep, DesignError> {
        let next = match self.step.next() {
            Some(next) if next != WizardStep::Launched => next,
            _ => return Err(self.illegal_transition(WizardStep::Launched)),
        };

        let errors = self.validate_step(self.step);

        if !errors.is_empty() {
            warn!(
                step = %self.step,
                errors = errors.len(),
                "Refused to advance wizard"
            );
            return Err(DesignError::StepIncomplete(errors));
        }

        debug!(from = %self.step, to = %next, "Advancing wizard");
        self.step = next;

        Ok(self.step)
    }

    /// Move back one step; a no-op at the first step
    pub fn retreat(&mut self) -> Result<WizardStep, DesignError> {
        if self.step.is_terminal() {
            return Err(self.illegal_transition(WizardStep::Launch));
        }

        if let Some(previous) = self.step.previous() {
            debug!(from = %self.step, to = %previous, "Retreating wizard");
            self.step = previous;
        }

        Ok(self.step)
    }

    /// Jump straight back to an earlier step
    pub fn go_to(&mut self, target: WizardStep) -> Result<WizardStep, DesignError> {
        if self.step.is_terminal() || target > self.step {
            return Err(self.illegal_transition(target));
        }

        if target != self.step {
            debug!(from = %self.step, to = %target, "Jumping back in wizard");
            self.step = target;
        }

        Ok(self.step)
    }

    /// Compute the power analysis for the draft's current arms and allocation and store it
    pub fn run_power_analysis(
        &mut self,
        calculator: &dyn PowerCalculator,
        input: &PowerAnalysisInput,
    ) -> Result<&PowerAnalysisResult, DesignError> {
        if self.draft.is_frozen() {
            return Err(DesignError::ImmutableState);
        }

        let result = calculator
            .compute(
                input,
                self.draft.variants().len(),
                self.draft.traffic_allocation().percent(),
            )?
            .with_primary_metric(self.draft.metrics().primary());

        info!(
            sample_size_per_variant = result.sample_size_per_variant,
            duration_days = result.duration_days,
            "Power analysis computed"
        );

        self.draft.set_power_analysis(result)?;

        self.draft
            .power_analysis()
            .ok_or(DesignError::StepIncomplete(vec![
                DesignValidationError::PowerAnalysisMissing,
            ]))
    }

    pub fn readiness(&self) -> LaunchReadiness {
        LaunchReadinessGate::evaluate(&self.draft)
    }

    /// Freeze the draft, hand it to the runtime and enter the terminal state.
    ///
    /// If the runtime refuses the record the wizard stays at `Launch`, untouched.
    pub fn launch(
        &mut self,
        runtime: &dyn ExperimentRuntime,
    ) -> Result<&ExperimentRecord, DesignError> {
        if self.step != WizardStep::Launch {
            return Err(self.illegal_transition(WizardStep::Launched));
        }

        let readiness = self.readiness();

        if !readiness.ready {
            warn!(blockers = readiness.blockers.len(), "Launch refused");
            return Err(DesignError::NotReady(readiness.blockers));
        }

        let Some(power_analysis) = self.draft.power_analysis().cloned() else {
            return Err(DesignError::NotReady(vec![
                DesignValidationError::PowerAnalysisMissing,
            ]));
        };

        let record = ExperimentRecord::freeze(&self.draft, power_analysis, Utc::now());
        runtime.submit(&record)?;

        self.draft.freeze();
        self.step = WizardStep::Launched;
        info!(experiment_id = %record.id(), name = record.hypothesis().name(), "Experiment launched");

        Ok(&*self.record.insert(record))
    }

    /// Every step with its status relative to the current one
    pub fn progress(&self) -> Vec<StepProgress> {
        WizardStep::ALL
            .iter()
            .filter(|s| !s.is_terminal())
            .map(|&step| StepProgress {
                step,
                label: step.label(),
                status: if step < self.step {
                    StepStatus::Completed
                } else if step == self.step {
                    StepStatus::Current
                } else {
                    StepStatus::Pending
                },
            })
            .collect()
    }

    fn illegal_transition(&self, to: WizardStep) -> DesignError {
        DesignError::IllegalTransition {
            from: self.step.to_string(),
            to: to.to_string(),
        }
    }
}

impl Default for WizardStateMachine {
    fn default() -> Self {
        Self::new(MetricCatalog::default())
    }
}
