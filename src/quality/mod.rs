//! Rule-based quality labelling from the expiry date, with an optional
//! image-classifier signal blended in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::QualityLabel;
use crate::error::Result;
use crate::scoring::round_to;

const PERISHABLE: [&str; 6] = ["milk", "fish", "meat", "dairy", "yogurt", "cheese"];
const SEMI_PERISHABLE: [&str; 4] = ["bread", "fruits", "vegetables", "eggs"];

/// Predicted label with confidence (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityPrediction {
    pub label: QualityLabel,
    pub confidence: f64,
}

impl QualityPrediction {
    pub fn new(label: QualityLabel, confidence: f64) -> Self {
        Self { label, confidence }
    }

    pub fn unknown() -> Self {
        Self::new(QualityLabel::Unknown, 0.5)
    }
}

/// Image-based quality signal. Model internals live outside this crate.
pub trait ImageClassifier: Send + Sync {
    fn classify(&self, image: &[u8]) -> Result<QualityPrediction>;

    fn name(&self) -> &str;
}

/// Label a donation from days remaining until `expiry`, adjusted by food type
pub fn predict_quality(expiry: NaiveDate, today: NaiveDate, food_name: &str) -> QualityPrediction {
    let days = (expiry - today).num_days();

    let (mut label, mut confidence) = if days < 0 {
        (QualityLabel::Expired, 0.95)
    } else if days == 0 {
        (QualityLabel::ExpiresToday, 0.85)
    } else if days <= 2 {
        (QualityLabel::ExpiresSoon, 0.80)
    } else {
        (QualityLabel::Fresh, 0.90)
    };

    let food_lower = food_name.trim().to_lowercase();
    if !food_lower.is_empty() {
        if PERISHABLE.iter().any(|item| food_lower.contains(item)) {
            if days <= 1 && label == QualityLabel::Fresh {
                label = QualityLabel::ExpiresSoon;
                confidence = 0.75;
            }
        } else if SEMI_PERISHABLE.iter().any(|item| food_lower.contains(item)) {
            confidence = f64::min(confidence, 0.85);
        } else if label == QualityLabel::ExpiresSoon && days >= 1 {
            label = QualityLabel::Fresh;
            confidence = 0.80;
        }
    }

    QualityPrediction::new(label, round_to(confidence, 2))
}

/// Merge an image prediction into the rule-based one
pub fn blend_image(rule: QualityPrediction, image: QualityPrediction) -> QualityPrediction {
    let blended = match image.label {
        QualityLabel::Fresh
            if matches!(rule.label, QualityLabel::Fresh | QualityLabel::ExpiresSoon) =>
        {
            QualityPrediction::new(
                QualityLabel::Fresh,
                rule.confidence * 0.6 + image.confidence * 0.4,
            )
        }
        QualityLabel::Expired => QualityPrediction::new(
            QualityLabel::Expired,
            f64::max(rule.confidence, image.confidence),
        ),
        _ => rule,
    };

    QualityPrediction::new(blended.label, round_to(blended.confidence, 2))
}

/// Quality assessment entry point: rules first, image signal when available
pub struct QualityAssessor {
    classifier: Option<Box<dyn ImageClassifier>>,
}

impl QualityAssessor {
    pub fn new() -> Self {
        Self { classifier: None }
    }

    pub fn with_classifier(classifier: Box<dyn ImageClassifier>) -> Self {
        Self {
            classifier: Some(classifier),
        }
    }

    pub fn assess(
        &self,
        expiry: NaiveDate,
        today: NaiveDate,
        food_name: &str,
        image: Option<&[u8]>,
    ) -> QualityPrediction {
        let rule = predict_quality(expiry, today, food_name);

        let (Some(classifier), Some(bytes)) = (self.classifier.as_ref(), image) else {
            return rule;
        };

        match classifier.classify(bytes) {
            Ok(image_prediction) => {
                tracing::debug!(
                    "{} classified image as {} ({:.2})",
                    classifier.name(),
                    image_prediction.label,
                    image_prediction.confidence
                );
                blend_image(rule, image_prediction)
            }
            Err(e) => {
                tracing::warn!("Image analysis failed, using expiry rules: {}", e);
                rule
            }
        }
    }
}

impl Default for QualityAssessor {
    fn default() -> Self {
        Self::new()
    }
}
