//! Comparison arms of an experiment

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::validation::{validate_variant_id, DesignError, DesignValidationError};

/// Minimum number of arms in a valid experiment
pub const MIN_VARIANTS: usize = 2;

const CONTROL_ID: &str = "control";
const CONTROL_LABEL: &str = "Control";
const CONTROL_DESCRIPTION: &str = "Current experience";

// ============================================================================
// VariantId
// ============================================================================

/// Unique identifier for a variant within its set
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VariantId(String);

impl VariantId {
    /// Create a new variant ID with validation
    pub fn new(id: impl Into<String>) -> Result<Self, DesignError> {
        let id = id.into();
        validate_variant_id(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn sequential(n: u32) -> Self {
        Self(format!("variant-{}", n))
    }
}

impl TryFrom<String> for VariantId {
    type Error = DesignError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VariantId> for String {
    fn from(id: VariantId) -> Self {
        id.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for VariantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Variant
// ============================================================================

/// One arm of the experiment, including the control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    id: VariantId,
    label: String,
    description: String,
    #[serde(rename = "is_control")]
    control: bool,
}

impl Variant {
    pub fn new(id: VariantId, label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            description: description.into(),
            control: false,
        }
    }

    /// Set whether this is the control variant
    pub fn with_control(mut self, control: bool) -> Self {
        self.control = control;
        self
    }

    pub fn id(&self) -> &VariantId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_control(&self) -> bool {
        self.control
    }
}

// ============================================================================
// VariantSet
// ============================================================================

/// Ordered arms of an experiment; the control always comes first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSet {
    variants: Vec<Variant>,
    next_id: u32,
    #[serde(skip)]
    frozen: bool,
}

impl VariantSet {
    /// Create a set holding the control and a single challenger
    pub fn new() -> Self {
        let mut set = Self {
            variants: Vec::new(),
            next_id: 1,
            frozen: false,
        };
        set.reset();
        set
    }

    /// Build a set from existing variants without enforcing invariants.
    ///
    /// Use `validate` to check the result.
    pub fn from_variants(variants: Vec<Variant>) -> Self {
        Self {
            next_id: variants.len() as u32 + 1,
            variants,
            frozen: false,
        }
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn get(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id() == id)
    }

    pub fn control(&self) -> Option<&Variant> {
        self.variants.iter().find(|v| v.is_control())
    }

    pub fn labels(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.label()).collect()
    }

    /// Discard all arms and recreate the control plus "Variant A"
    pub fn initialize(&mut self) -> Result<(), DesignError> {
        self.ensure_mutable()?;
        self.reset();
        Ok(())
    }

    /// Append a challenger labelled after the number of existing challengers
    pub fn add_variant(&mut self) -> Result<&Variant, DesignError> {
        self.ensure_mutable()?;

        let label = self.next_label();
        let id = self.allocate_id();
        self.variants.push(Variant::new(id, label, ""));

        Ok(&self.variants[self.variants.len() - 1])
    }

    pub fn remove_variant(&mut self, id: &VariantId) -> Result<Variant, DesignError> {
        self.ensure_mutable()?;

        let idx = self.position(id)?;

        if self.variants[idx].is_control() {
            return Err(DesignError::CannotRemoveControl);
        }

        if self.variants.len() <= MIN_VARIANTS {
            return Err(DesignError::VariantFloor {
                minimum: MIN_VARIANTS,
            });
        }

        Ok(self.variants.remove(idx))
    }

    pub fn edit_variant(
        &mut self,
        id: &VariantId,
        label: Option<String>,
        description: Option<String>,
    ) -> Result<&Variant, DesignError> {
        self.ensure_mutable()?;

        let idx = self.position(id)?;

        if let Some(ref label) = label {
            let collides = self
                .variants
                .iter()
                .any(|v| v.id() != id && v.label() == label);

            if collides {
                return Err(DesignError::DuplicateLabel(label.clone()));
            }
        }

        let variant = &mut self.variants[idx];

        if let Some(label) = label {
            variant.label = label;
        }

        if let Some(description) = description {
            variant.description = description;
        }

        Ok(&self.variants[idx])
    }

    /// Apply several edits at once; label uniqueness is checked on the end state only
    pub fn edit_variants(
        &mut self,
        edits: Vec<(VariantId, Option<String>, Option<String>)>,
    ) -> Result<(), DesignError> {
        self.ensure_mutable()?;

        let mut variants = self.variants.clone();

        for (id, label, description) in edits {
            let idx = self.position(&id)?;
            let variant = &mut variants[idx];

            if let Some(label) = label {
                variant.label = label;
            }

            if let Some(description) = description {
                variant.description = description;
            }
        }

        let mut seen = HashSet::new();

        for variant in &variants {
            if !seen.insert(variant.label()) {
                return Err(DesignError::DuplicateLabel(variant.label().to_string()));
            }
        }

        self.variants = variants;
        Ok(())
    }

    pub fn validate(&self) -> Vec<DesignValidationError> {
        let mut errors = Vec::new();

        if self.variants.len() < MIN_VARIANTS {
            errors.push(DesignValidationError::InsufficientVariants(
                self.variants.len(),
            ));
        }

        let controls = self.variants.iter().filter(|v| v.is_control()).count();

        match controls {
            0 => errors.push(DesignValidationError::NoControl),
            1 => {
                if !self.variants[0].is_control() {
                    errors.push(DesignValidationError::ControlNotFirst);
                }
            }
            n => errors.push(DesignValidationError::MultipleControls(n)),
        }

        let mut seen = HashSet::new();
        let mut reported = HashSet::new();

        for variant in &self.variants {
            if variant.label().trim().is_empty() {
                errors.push(DesignValidationError::EmptyLabel(
                    variant.id().to_string(),
                ));
                continue;
            }

            if !seen.insert(variant.label()) && reported.insert(variant.label()) {
                errors.push(DesignValidationError::DuplicateLabel(
                    variant.label().to_string(),
                ));
            }
        }

        errors
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    // Private helpers

    fn reset(&mut self) {
        let control = Variant::new(
            VariantId(CONTROL_ID.to_string()),
            CONTROL_LABEL,
            CONTROL_DESCRIPTION,
        )
        .with_control(true);

        self.variants = vec![control];
        self.next_id = 1;

        let label = self.next_label();
        let id = self.allocate_id();
        self.variants.push(Variant::new(id, label, ""));
    }

    /// `"Variant " + letter(k)` for k challengers, skipping labels already taken
    fn next_label(&self) -> String {
        let mut k = self.variants.iter().filter(|v| !v.is_control()).count();

        loop {
            let label = format!("Variant {}", letter(k));

            if !self.variants.iter().any(|v| v.label() == label) {
                return label;
            }

            k += 1;
        }
    }

    fn allocate_id(&mut self) -> VariantId {
        loop {
            let id = VariantId::sequential(self.next_id);
            self.next_id += 1;

            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn position(&self, id: &VariantId) -> Result<usize, DesignError> {
        self.variants
            .iter()
            .position(|v| v.id() == id)
            .ok_or_else(|| DesignError::NotFound(id.to_string()))
    }

    fn ensure_mutable(&self) -> Result<(), DesignError> {
        if self.frozen {
            return Err(DesignError::ImmutableState);
        }
        Ok(())
    }
}

impl Default for VariantSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Spreadsheet-style column letters: 0 -> A, 25 -> Z, 26 -> AA
fn letter(k: usize) -> String {
    let mut n = k + 1;
    let mut out = Vec::new();

    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }

    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
