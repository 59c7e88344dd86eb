//! Parallel evaluation of independent teams.

use anyhow::{Context, Result};
use scoring_core::{
    evaluate_team, EvaluationContext, MissionConfig, ScoringRules, TeamEvaluation, TeamSubmission,
};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Evaluate every submission on the blocking pool, at most `workers` at a time.
///
/// Results come back in input order.
pub async fn evaluate_all(
    mission: Arc<MissionConfig>,
    rules: Arc<ScoringRules>,
    submissions: Vec<TeamSubmission>,
    workers: usize,
) -> Result<Vec<TeamEvaluation>> {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut handles = Vec::with_capacity(submissions.len());

    for submission in submissions {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .context("worker pool closed")?;
        let mission = Arc::clone(&mission);
        let rules = Arc::clone(&rules);
        let team = submission.team.clone();

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            evaluate_team(&EvaluationContext::new(&mission, &rules), &submission)
        });
        handles.push((team, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (team, handle) in handles {
        let evaluation = handle
            .await
            .with_context(|| format!("evaluation of team {team} panicked"))?;
        tracing::info!(
            team = %evaluation.team,
            score = evaluation.score.score_ratio,
            warnings = evaluation.warnings.len(),
            "Scored team"
        );
        results.push(evaluation);
    }
    Ok(results)
}
