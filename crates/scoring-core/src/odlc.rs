//! Object detection, localization and classification (ODLC) reports.

use crate::models::{GeoPoint, TimePeriod};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OdlcType {
    Standard,
    OffAxis,
    Emergent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Circle,
    Semicircle,
    QuarterCircle,
    Triangle,
    Square,
    Rectangle,
    Trapezoid,
    Pentagon,
    Hexagon,
    Heptagon,
    Octagon,
    Star,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    White,
    Black,
    Gray,
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Brown,
    Orange,
}

/// Compass direction the top of the alphanumeric points toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Orientation {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Orientation {
    const ALL: [Orientation; 8] = [
        Orientation::N,
        Orientation::NE,
        Orientation::E,
        Orientation::SE,
        Orientation::S,
        Orientation::SW,
        Orientation::W,
        Orientation::NW,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Rotate clockwise by a number of 45° steps.
    pub fn rotated(self, eighths: usize) -> Orientation {
        Self::ALL[(self.index() + eighths) % Self::ALL.len()]
    }
}

/// A characteristic that can be compared between two reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Characteristic {
    Shape,
    ShapeColor,
    Alphanumeric,
    AlphanumericColor,
    Orientation,
    DescriptionApproved,
}

const STANDARD_CHARACTERISTICS: &[Characteristic] = &[
    Characteristic::Shape,
    Characteristic::ShapeColor,
    Characteristic::Alphanumeric,
    Characteristic::AlphanumericColor,
    Characteristic::Orientation,
];

const EMERGENT_CHARACTERISTICS: &[Characteristic] = &[Characteristic::DescriptionApproved];

impl OdlcType {
    /// Characteristics compared when classifying reports of this type.
    pub fn characteristics(self) -> &'static [Characteristic] {
        match self {
            OdlcType::Standard | OdlcType::OffAxis => STANDARD_CHARACTERISTICS,
            OdlcType::Emergent => EMERGENT_CHARACTERISTICS,
        }
    }
}

/// Alphanumerics that look the same at every orientation.
const ANY_ORIENTATION: &[&str] = &["O", "0"];
/// Alphanumerics that look the same rotated by 180°.
const HALF_TURN_SYMMETRIC: &[&str] = &["H", "I", "N", "S", "X", "Z", "8"];
/// Alphanumerics that look the same rotated by 90°.
const QUARTER_TURN_SYMMETRIC: &[&str] = &["X"];

/// A submitted or judge-truth object report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdlcReport {
    pub id: u32,
    pub odlc_type: OdlcType,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub orientation: Option<Orientation>,
    #[serde(default)]
    pub shape: Option<Shape>,
    #[serde(default)]
    pub shape_color: Option<Color>,
    #[serde(default)]
    pub alphanumeric: Option<String>,
    #[serde(default)]
    pub alphanumeric_color: Option<Color>,
    #[serde(default)]
    pub description: String,
    /// Judge approval of an emergent object's description
    #[serde(default)]
    pub description_approved: Option<bool>,
    #[serde(default)]
    pub autonomous: bool,
    /// Judge approval of the submitted image
    #[serde(default)]
    pub thumbnail_approved: Option<bool>,
    /// Judge override marking the report actionable regardless of timing
    #[serde(default)]
    pub actionable_override: bool,
    pub creation_time: DateTime<Utc>,
    pub last_modified_time: DateTime<Utc>,
}

impl OdlcReport {
    fn normalized_alphanumeric(&self) -> Option<String> {
        self.alphanumeric
            .as_deref()
            .map(|alpha| alpha.trim().to_uppercase())
    }

    /// Whether the two reports agree on orientation, accounting for
    /// alphanumerics that are ambiguous under rotation.
    ///
    /// `self` is the submission and `real` the judge-truth object.
    pub fn similar_orientation(&self, real: &OdlcReport) -> bool {
        if self.orientation == real.orientation {
            return true;
        }
        let (Some(submitted), Some(truth)) = (self.orientation, real.orientation) else {
            return false;
        };
        let Some(alpha) = real.normalized_alphanumeric() else {
            return false;
        };
        let alpha = alpha.as_str();

        if ANY_ORIENTATION.contains(&alpha) {
            return true;
        }
        if HALF_TURN_SYMMETRIC.contains(&alpha) && submitted == truth.rotated(4) {
            return true;
        }
        QUARTER_TURN_SYMMETRIC.contains(&alpha)
            && (submitted == truth.rotated(2) || submitted == truth.rotated(6))
    }

    fn matches_characteristic(&self, real: &OdlcReport, characteristic: Characteristic) -> bool {
        match characteristic {
            Characteristic::Shape => self.shape == real.shape,
            Characteristic::ShapeColor => self.shape_color == real.shape_color,
            Characteristic::Alphanumeric => {
                self.normalized_alphanumeric() == real.normalized_alphanumeric()
            }
            Characteristic::AlphanumericColor => self.alphanumeric_color == real.alphanumeric_color,
            Characteristic::Orientation => self.similar_orientation(real),
            Characteristic::DescriptionApproved => self.description_approved == Some(true),
        }
    }

    /// Fraction of this type's characteristics on which the reports agree.
    ///
    /// Emergent objects are judged only on whether the submitted description
    /// was approved.
    pub fn similar_classifications_ratio(&self, real: &OdlcReport) -> f64 {
        let characteristics = self.odlc_type.characteristics();
        if characteristics.is_empty() {
            return 0.0;
        }
        let matching = characteristics
            .iter()
            .filter(|&&c| self.matches_characteristic(real, c))
            .count();
        matching as f64 / characteristics.len() as f64
    }

    /// Whether the report counts as actionable intelligence.
    ///
    /// It does when overridden by a judge, or when it was created and last
    /// modified strictly within the team's first flight.
    pub fn actionable_submission(&self, first_flight: Option<&TimePeriod>) -> bool {
        if self.actionable_override {
            return true;
        }
        first_flight.is_some_and(|flight| {
            flight.strictly_within(self.creation_time)
                && flight.strictly_within(self.last_modified_time)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn report(alpha: &str, orientation: Orientation) -> OdlcReport {
        OdlcReport {
            id: 1,
            odlc_type: OdlcType::Standard,
            location: None,
            orientation: Some(orientation),
            shape: Some(Shape::Square),
            shape_color: Some(Color::Red),
            alphanumeric: Some(alpha.to_string()),
            alphanumeric_color: Some(Color::White),
            description: String::new(),
            description_approved: None,
            autonomous: false,
            thumbnail_approved: Some(true),
            actionable_override: false,
            creation_time: at(10),
            last_modified_time: at(20),
        }
    }

    #[test]
    fn rotation_wraps() {
        assert_eq!(Orientation::NW.rotated(1), Orientation::N);
        assert_eq!(Orientation::N.rotated(4), Orientation::S);
        assert_eq!(Orientation::E.rotated(6), Orientation::N);
    }

    #[test]
    fn identical_reports_fully_similar() {
        let real = report("A", Orientation::N);
        assert_eq!(real.similar_classifications_ratio(&real), 1.0);
    }

    #[test]
    fn partial_similarity_counts_fields() {
        let real = report("A", Orientation::N);
        let mut submitted = report("a", Orientation::E);
        submitted.shape_color = Some(Color::Blue);
        // alphanumeric matches case-insensitively; color and orientation differ.
        assert!((submitted.similar_classifications_ratio(&real) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn ambiguous_alphanumerics_accept_rotations() {
        assert!(report("O", Orientation::SE).similar_orientation(&report("O", Orientation::N)));
        assert!(report("H", Orientation::S).similar_orientation(&report("H", Orientation::N)));
        assert!(!report("H", Orientation::E).similar_orientation(&report("H", Orientation::N)));
        assert!(report("X", Orientation::W).similar_orientation(&report("X", Orientation::N)));
        assert!(!report("A", Orientation::S).similar_orientation(&report("A", Orientation::N)));
    }

    #[test]
    fn emergent_compares_description_approval_only() {
        let mut real = report("A", Orientation::N);
        real.odlc_type = OdlcType::Emergent;
        let mut submitted = report("Z", Orientation::S);
        submitted.odlc_type = OdlcType::Emergent;
        submitted.shape = None;

        assert_eq!(submitted.similar_classifications_ratio(&real), 0.0);
        submitted.description_approved = Some(true);
        assert_eq!(submitted.similar_classifications_ratio(&real), 1.0);
    }

    #[test]
    fn actionable_requires_strictly_inside_first_flight() {
        let flight = TimePeriod::new(Some(at(0)), Some(at(100))).unwrap();
        let mut submitted = report("A", Orientation::N);
        assert!(submitted.actionable_submission(Some(&flight)));

        submitted.last_modified_time = at(100);
        assert!(!submitted.actionable_submission(Some(&flight)));
        assert!(!submitted.actionable_submission(None));

        submitted.actionable_override = true;
        assert!(submitted.actionable_submission(None));
    }
}
