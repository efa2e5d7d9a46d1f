use crate::{
    config::{ClassifierConfig, FamilyRule},
    models::offer::RawOffer,
};

/// Maps a raw offer to the product family it is listed under.
///
/// Returning `None` means the offer does not belong to any declared family.
pub trait FamilyClassifier: Send + Sync {
    fn classify(&self, offer: &RawOffer) -> Option<String>;
}

impl<F> FamilyClassifier for F
where
    F: Fn(&RawOffer) -> Option<String> + Send + Sync,
{
    fn classify(&self, offer: &RawOffer) -> Option<String> {
        self(offer)
    }
}

/// Ordered prefix table over product identifiers, first match wins
#[derive(Debug, Clone, Default)]
pub struct PrefixClassifier {
    rules: Vec<FamilyRule>,
}

impl PrefixClassifier {
    pub fn new(rules: Vec<FamilyRule>) -> Self {
        Self { rules }
    }

    pub fn with_rule(mut self, prefix: impl Into<String>, family: impl Into<String>) -> Self {
        self.rules.push(FamilyRule {
            prefix: prefix.into(),
            family: family.into(),
        });
        self
    }
}

impl FamilyClassifier for PrefixClassifier {
    fn classify(&self, offer: &RawOffer) -> Option<String> {
        self.rules
            .iter()
            .find(|rule| offer.product_id.starts_with(&rule.prefix))
            .map(|rule| rule.family.clone())
    }
}

/// Uses the family the provider reports, falling back to the product id
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitFamilyClassifier;

impl FamilyClassifier for ExplicitFamilyClassifier {
    fn classify(&self, offer: &RawOffer) -> Option<String> {
        let family = match offer.product_family.as_deref() {
            Some(family) if !family.is_empty() => family,
            _ => offer.product_id.as_str(),
        };
        (!family.is_empty()).then(|| family.to_string())
    }
}

/// Build the classifier selected in configuration
pub fn from_config(config: &ClassifierConfig) -> Box<dyn FamilyClassifier> {
    match config {
        ClassifierConfig::Prefix { rules } => Box::new(PrefixClassifier::new(rules.clone())),
        ClassifierConfig::Explicit => Box::new(ExplicitFamilyClassifier),
    }
}
