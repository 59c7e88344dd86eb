//! Scoring of submitted ODLC reports against judge-truth objects.

use crate::matching::{max_cardinality_matching, max_weight_matching};
use crate::models::TimePeriod;
use crate::odlc::OdlcReport;
use crate::rules::ObjectRules;
use crate::spatial::horizontal_distance_ft;
use serde::{Deserialize, Serialize};

/// Component breakdown of one submitted/real pairing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub classifications_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geolocation_accuracy_ft: Option<f64>,
    pub geolocation_score_ratio: f64,
    pub actionable_score_ratio: f64,
    pub autonomous_score_ratio: f64,
    pub score_ratio: f64,
}

/// Evaluation of one judge-truth object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdlcMatchResult {
    pub real_odlc: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_odlc: Option<u32>,
    pub score: MatchScore,
}

/// Object category results for a team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OdlcEvaluation {
    /// One entry per real object, in input order
    pub odlcs: Vec<OdlcMatchResult>,
    /// Submissions that count toward the extra-object penalty
    pub unmatched_submissions: Vec<u32>,
    pub matched_score_ratio: f64,
    pub unmatched_object_penalty: f64,
    pub score_ratio: f64,
    /// Per-dimension averages over all real objects
    pub classifications_ratio: f64,
    pub geolocation_ratio: f64,
    pub actionable_ratio: f64,
    pub autonomous_ratio: f64,
}

/// Matches a team's submitted objects against the real objects.
pub struct OdlcEvaluator<'a> {
    submitted: &'a [OdlcReport],
    real: &'a [OdlcReport],
    first_flight: Option<&'a TimePeriod>,
    rules: &'a ObjectRules,
}

impl<'a> OdlcEvaluator<'a> {
    pub fn new(
        submitted: &'a [OdlcReport],
        real: &'a [OdlcReport],
        first_flight: Option<&'a TimePeriod>,
        rules: &'a ObjectRules,
    ) -> Self {
        Self {
            submitted,
            real,
            first_flight,
            rules,
        }
    }

    /// Score how well a submission describes a real object.
    ///
    /// A type mismatch or an unapproved image scores zero outright.
    pub fn match_score(&self, submitted: &OdlcReport, real: &OdlcReport) -> MatchScore {
        if submitted.odlc_type != real.odlc_type || submitted.thumbnail_approved != Some(true) {
            return MatchScore::default();
        }

        let classifications_ratio = submitted.similar_classifications_ratio(real);
        let geolocation_accuracy_ft = match (&submitted.location, &real.location) {
            (Some(sub), Some(truth)) => Some(horizontal_distance_ft(sub, truth)),
            _ => None,
        };
        let geolocation_score_ratio = match geolocation_accuracy_ft {
            Some(dist) if self.rules.location_threshold_ft > 0.0 => {
                (1.0 - dist / self.rules.location_threshold_ft).max(0.0)
            }
            _ => 0.0,
        };
        let actionable_score_ratio =
            f64::from(u8::from(submitted.actionable_submission(self.first_flight)));
        let autonomous_score_ratio = f64::from(u8::from(submitted.autonomous));

        let score_ratio = self.rules.characteristics_weight * classifications_ratio
            + self.rules.geolocation_weight * geolocation_score_ratio
            + self.rules.actionable_weight * actionable_score_ratio
            + self.rules.autonomy_weight * autonomous_score_ratio;

        MatchScore {
            classifications_ratio,
            geolocation_accuracy_ft,
            geolocation_score_ratio,
            actionable_score_ratio,
            autonomous_score_ratio,
            score_ratio,
        }
    }

    /// Pair submissions with real objects to maximize the total match score.
    ///
    /// Returns `(submitted_index, real_index)` pairs.
    pub fn match_odlcs(&self) -> Vec<(usize, usize)> {
        let weights: Vec<Vec<f64>> = self
            .submitted
            .iter()
            .map(|sub| {
                self.real
                    .iter()
                    .map(|real| self.match_score(sub, real).score_ratio)
                    .collect()
            })
            .collect();
        max_weight_matching(&weights)
    }

    /// Submissions that count as extra objects after the primary matching.
    ///
    /// A leftover submission escapes the penalty if it resembles a real
    /// object already matched to a submission of the opposite autonomy, since
    /// a manual and an autonomous report of the same object is allowed. Each
    /// real object can excuse at most one leftover.
    pub fn find_unmatched(&self, matches: &[(usize, usize)]) -> Vec<usize> {
        let matched_autonomy: Vec<Option<bool>> = {
            let mut by_real = vec![None; self.real.len()];
            for &(sub, real) in matches {
                by_real[real] = Some(self.submitted[sub].autonomous);
            }
            by_real
        };

        let leftovers: Vec<usize> = (0..self.submitted.len())
            .filter(|sub| !matches.iter().any(|&(matched, _)| matched == *sub))
            .collect();

        let adjacency: Vec<Vec<usize>> = leftovers
            .iter()
            .map(|&sub| {
                let submitted = &self.submitted[sub];
                matched_autonomy
                    .iter()
                    .enumerate()
                    .filter(|(_, matched)| {
                        matched.is_some_and(|other| other != submitted.autonomous)
                    })
                    .map(|(real, _)| real)
                    .filter(|&real| self.match_score(submitted, &self.real[real]).score_ratio > 0.0)
                    .collect()
            })
            .collect();

        let excused = max_cardinality_matching(&adjacency, self.real.len());
        leftovers
            .iter()
            .enumerate()
            .filter(|(left, _)| !excused.iter().any(|&(l, _)| l == *left))
            .map(|(_, &sub)| sub)
            .collect()
    }

    /// Evaluate all submissions against all real objects.
    pub fn evaluate(&self) -> OdlcEvaluation {
        let matches = self.match_odlcs();
        let unmatched = self.find_unmatched(&matches);

        let odlcs: Vec<OdlcMatchResult> = self
            .real
            .iter()
            .enumerate()
            .map(|(ri, real)| {
                let pair = matches.iter().find(|&&(_, r)| r == ri);
                match pair {
                    Some(&(si, _)) => OdlcMatchResult {
                        real_odlc: real.id,
                        submitted_odlc: Some(self.submitted[si].id),
                        score: self.match_score(&self.submitted[si], real),
                    },
                    None => OdlcMatchResult {
                        real_odlc: real.id,
                        submitted_odlc: None,
                        score: MatchScore::default(),
                    },
                }
            })
            .collect();

        let average = |f: fn(&MatchScore) -> f64| {
            if odlcs.is_empty() {
                0.0
            } else {
                odlcs.iter().map(|o| f(&o.score)).sum::<f64>() / odlcs.len() as f64
            }
        };

        let matched_score_ratio = average(|s| s.score_ratio);
        let unmatched_object_penalty = self.rules.extra_object_penalty_ratio * unmatched.len() as f64;

        let evaluation = OdlcEvaluation {
            unmatched_submissions: unmatched.iter().map(|&i| self.submitted[i].id).collect(),
            matched_score_ratio,
            unmatched_object_penalty,
            score_ratio: matched_score_ratio - unmatched_object_penalty,
            classifications_ratio: average(|s| s.classifications_ratio),
            geolocation_ratio: average(|s| s.geolocation_score_ratio),
            actionable_ratio: average(|s| s.actionable_score_ratio),
            autonomous_ratio: average(|s| s.autonomous_score_ratio),
            odlcs,
        };

        tracing::debug!(
            submitted = self.submitted.len(),
            real = self.real.len(),
            matched = matches.len(),
            unmatched = unmatched.len(),
            score = evaluation.score_ratio,
            "evaluated objects"
        );
        evaluation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use crate::odlc::{Color, OdlcType, Orientation, Shape};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn flight() -> TimePeriod {
        TimePeriod::new(Some(at(0)), Some(at(1000))).unwrap()
    }

    fn odlc(id: u32, alpha: &str, lat: f64, lon: f64) -> OdlcReport {
        OdlcReport {
            id,
            odlc_type: OdlcType::Standard,
            location: Some(GeoPoint::new(lat, lon).unwrap()),
            orientation: Some(Orientation::N),
            shape: Some(Shape::Star),
            shape_color: Some(Color::Orange),
            alphanumeric: Some(alpha.to_string()),
            alphanumeric_color: Some(Color::Black),
            description: String::new(),
            description_approved: None,
            autonomous: false,
            thumbnail_approved: Some(true),
            actionable_override: false,
            creation_time: at(10),
            last_modified_time: at(20),
        }
    }

    fn evaluator<'a>(
        submitted: &'a [OdlcReport],
        real: &'a [OdlcReport],
        period: &'a TimePeriod,
        rules: &'a ObjectRules,
    ) -> OdlcEvaluator<'a> {
        OdlcEvaluator::new(submitted, real, Some(period), rules)
    }

    #[test]
    fn identical_autonomous_report_scores_one() {
        let rules = ObjectRules::default();
        let period = flight();
        let real = odlc(1, "A", 38.0, -76.0);
        let mut submitted = real.clone();
        submitted.autonomous = true;

        let eval = evaluator(&[], &[], &period, &rules);
        let score = eval.match_score(&submitted, &real);
        assert!((score.score_ratio - 1.0).abs() < 1e-9);
        assert_eq!(score.geolocation_accuracy_ft, Some(0.0));
    }

    #[test]
    fn type_mismatch_or_unapproved_scores_zero() {
        let rules = ObjectRules::default();
        let period = flight();
        let real = odlc(1, "A", 38.0, -76.0);
        let eval = evaluator(&[], &[], &period, &rules);

        let mut wrong_type = real.clone();
        wrong_type.odlc_type = OdlcType::OffAxis;
        assert_eq!(eval.match_score(&wrong_type, &real), MatchScore::default());

        let mut unapproved = real.clone();
        unapproved.thumbnail_approved = Some(false);
        assert_eq!(eval.match_score(&unapproved, &real), MatchScore::default());

        unapproved.thumbnail_approved = None;
        assert_eq!(eval.match_score(&unapproved, &real), MatchScore::default());
    }

    #[test]
    fn geolocation_falls_off_linearly() {
        let rules = ObjectRules::default();
        let period = flight();
        let real = odlc(1, "A", 38.0, -76.0);
        let eval = evaluator(&[], &[], &period, &rules);

        // ~0.000206 degrees of latitude is ~75 ft.
        let mut near = real.clone();
        near.location = Some(GeoPoint::new(38.000206, -76.0).unwrap());
        let score = eval.match_score(&near, &real);
        assert!((score.geolocation_score_ratio - 0.5).abs() < 0.01);

        let mut far = real.clone();
        far.location = Some(GeoPoint::new(38.01, -76.0).unwrap());
        assert_eq!(eval.match_score(&far, &real).geolocation_score_ratio, 0.0);

        let mut missing = real.clone();
        missing.location = None;
        let score = eval.match_score(&missing, &real);
        assert_eq!(score.geolocation_score_ratio, 0.0);
        assert_eq!(score.geolocation_accuracy_ft, None);
    }

    #[test]
    fn matching_maximizes_total_score() {
        let rules = ObjectRules::default();
        let period = flight();
        let real = vec![odlc(10, "A", 38.0, -76.0), odlc(11, "B", 38.001, -76.0)];
        // Submission 0 is closer to real 0 but only scores well against real 1.
        let mut sub_b = odlc(1, "B", 38.0005, -76.0);
        sub_b.shape = Some(Shape::Circle);
        let sub_a = odlc(2, "A", 38.0, -76.0);
        let submitted = vec![sub_b, sub_a];

        let eval = evaluator(&submitted, &real, &period, &rules);
        let matches = eval.match_odlcs();
        assert_eq!(matches, vec![(0, 1), (1, 0)]);

        let result = eval.evaluate();
        assert_eq!(result.odlcs[0].submitted_odlc, Some(2));
        assert_eq!(result.odlcs[1].submitted_odlc, Some(1));
        assert!(result.unmatched_submissions.is_empty());
    }

    #[test]
    fn extra_zero_value_submission_costs_one_penalty() {
        let rules = ObjectRules::default();
        let period = flight();
        let real = vec![odlc(10, "A", 38.0, -76.0)];
        let base = vec![odlc(1, "A", 38.0, -76.0)];

        let mut junk = odlc(2, "Q", 10.0, 10.0);
        junk.thumbnail_approved = Some(false);
        let mut with_extra = base.clone();
        with_extra.push(junk);

        let before = evaluator(&base, &real, &period, &rules).evaluate();
        let after = evaluator(&with_extra, &real, &period, &rules).evaluate();

        assert_eq!(after.unmatched_submissions, vec![2]);
        assert!(
            (before.score_ratio - after.score_ratio - rules.extra_object_penalty_ratio).abs()
                < 1e-12
        );
    }

    #[test]
    fn opposite_autonomy_duplicate_is_not_penalized() {
        let rules = ObjectRules::default();
        let period = flight();
        let real = vec![odlc(10, "A", 38.0, -76.0)];

        let mut autonomous = odlc(1, "A", 38.0, -76.0);
        autonomous.autonomous = true;
        let manual = odlc(2, "A", 38.0, -76.0);
        let mut second_manual = odlc(3, "A", 38.0, -76.0);
        second_manual.description = "again".into();

        let submitted = vec![autonomous, manual, second_manual];
        let result = evaluator(&submitted, &real, &period, &rules).evaluate();

        assert_eq!(result.odlcs[0].submitted_odlc, Some(1));
        // One manual duplicate is excused by the autonomous match; the other is extra.
        assert_eq!(result.unmatched_submissions.len(), 1);
        assert!((result.unmatched_object_penalty - 0.05).abs() < 1e-12);
    }

    #[test]
    fn no_real_objects_scores_only_penalty() {
        let rules = ObjectRules::default();
        let period = flight();
        let submitted = vec![odlc(1, "A", 38.0, -76.0)];
        let result = evaluator(&submitted, &[], &period, &rules).evaluate();
        assert_eq!(result.matched_score_ratio, 0.0);
        assert!((result.score_ratio + 0.05).abs() < 1e-12);

        let empty = evaluator(&[], &[], &period, &rules).evaluate();
        assert_eq!(empty, OdlcEvaluation::default());
    }
}
