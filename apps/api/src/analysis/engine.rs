//! Team-fit scoring pipeline.
//!
//! Flow: team_chemistry + coverage (independent) → CoreScores →
//!       narrative (caller, async, may fall back) → overall → visualization.
//!
//! Everything here is synchronous and pure apart from the injected filler source.

use serde::{Deserialize, Serialize};

use crate::analysis::chemistry::team_chemistry;
use crate::analysis::coverage::{assess_coverage, team_skills, technical_coverage, CoverageReport};
use crate::analysis::filler::FillerSource;
use crate::analysis::narrative::{Narrative, NarrativeSource, ResolvedNarrative};
use crate::analysis::visualization::{build_visualization, VisualizationPayload};
use crate::analysis::MemberProfile;

/// Scores computed before the narrative step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreScores {
    pub chemistry: u32,
    pub domain_coverage: u32,
    /// Approximation: domain coverage ± up to 10 points. See `technical_coverage`.
    pub technical_coverage: u32,
}

/// Output of [`score_team`]: the scores plus the coverage breakdown they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamAssessment {
    pub scores: CoreScores,
    pub coverage: CoverageReport,
}

/// A finished analysis. Immutable once built; persisted as one history row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub chemistry_score: u32,
    pub domain_coverage: u32,
    pub technical_coverage: u32,
    pub overall_score: u32,
    pub narrative_score: u32,
    pub recommendations: String,
    pub study_materials: String,
    pub narrative_source: NarrativeSource,
    pub covered_requirements: Vec<String>,
    pub missing_requirements: Vec<String>,
    pub visualization: VisualizationPayload,
}

/// Unweighted mean of the four scores, rounded.
pub fn overall(chemistry: u32, domain: u32, technical: u32, narrative_score: u32) -> u32 {
    let sum = chemistry as f64 + domain as f64 + technical as f64 + narrative_score as f64;
    (sum / 4.0).round() as u32
}

/// Runs chemistry and coverage scoring for a roster against a requirement list.
pub fn score_team(
    requirements: &[String],
    members: &[MemberProfile],
    filler: &mut dyn FillerSource,
) -> TeamAssessment {
    let chemistry = team_chemistry(members);
    let coverage = assess_coverage(requirements, &team_skills(members));
    let technical = technical_coverage(coverage.score, filler);

    TeamAssessment {
        scores: CoreScores {
            chemistry,
            domain_coverage: coverage.score,
            technical_coverage: technical,
        },
        coverage,
    }
}

/// Merges the core scores with the resolved narrative and builds chart data.
pub fn compose(
    assessment: TeamAssessment,
    resolved: ResolvedNarrative,
    requirements: &[String],
    members: &[MemberProfile],
    filler: &mut dyn FillerSource,
) -> AnalysisResult {
    let TeamAssessment { scores, coverage } = assessment;
    let ResolvedNarrative { narrative, source } = resolved;
    let Narrative {
        overall_score: narrative_score,
        recommendations,
        study_materials,
    } = narrative;

    let overall_score = overall(
        scores.chemistry,
        scores.domain_coverage,
        scores.technical_coverage,
        narrative_score,
    );
    let visualization = build_visualization(requirements, members, &scores, filler);

    AnalysisResult {
        chemistry_score: scores.chemistry,
        domain_coverage: scores.domain_coverage,
        technical_coverage: scores.technical_coverage,
        overall_score,
        narrative_score,
        recommendations,
        study_materials,
        narrative_source: source,
        covered_requirements: coverage.covered,
        missing_requirements: coverage.missing,
        visualization,
    }
}
