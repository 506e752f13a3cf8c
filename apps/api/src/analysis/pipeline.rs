//! Team analysis orchestration.
//!
//! Flow: score_team → narrative (timeout, fallback on failure) → compose.
//! No persistence here; handlers decide whether the result is stored.

use std::time::Duration;

use tracing::info;

use crate::analysis::engine::{compose, score_team, AnalysisResult};
use crate::analysis::filler::FillerSource;
use crate::analysis::narrative::{
    generate_with_timeout, resolve_narrative, NarrativeContext, NarrativeGenerator,
};
use crate::analysis::MemberProfile;

/// How much RFP text is forwarded to the narrative generator.
const RFP_SUMMARY_CHARS: usize = 2000;

pub struct AnalysisRequest<'a> {
    pub project_name: &'a str,
    pub rfp_text: Option<&'a str>,
    pub requirements: &'a [String],
    pub members: &'a [MemberProfile],
}

pub async fn run_team_analysis(
    request: AnalysisRequest<'_>,
    generator: &dyn NarrativeGenerator,
    timeout: Duration,
    filler: &mut (dyn FillerSource + Send),
) -> AnalysisResult {
    let AnalysisRequest {
        project_name,
        rfp_text,
        requirements,
        members,
    } = request;

    let assessment = score_team(requirements, members, filler);
    info!(
        "Scored '{}': chemistry={} domain={} technical={} ({} members, {} requirements)",
        project_name,
        assessment.scores.chemistry,
        assessment.scores.domain_coverage,
        assessment.scores.technical_coverage,
        members.len(),
        requirements.len()
    );

    let ctx = NarrativeContext {
        project_name: project_name.to_string(),
        rfp_summary: rfp_text.map(summarize_rfp).filter(|s| !s.is_empty()),
        requirements: requirements.to_vec(),
        members: members.to_vec(),
        scores: assessment.scores,
        missing_requirements: assessment.coverage.missing.clone(),
    };

    let outcome = generate_with_timeout(generator, &ctx, timeout).await;
    let resolved = resolve_narrative(outcome, generator.source(), &ctx);

    let result = compose(assessment, resolved, requirements, members, filler);
    info!(
        "Analysis for '{}' complete: overall={} (narrative {} via {})",
        project_name,
        result.overall_score,
        result.narrative_score,
        result.narrative_source.as_str()
    );
    result
}

fn summarize_rfp(text: &str) -> String {
    text.trim().chars().take(RFP_SUMMARY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::filler::SeededFiller;
    use crate::analysis::narrative::{
        FallbackNarrativeGenerator, Narrative, NarrativeOutcome, NarrativeSource,
    };
    use crate::analysis::topics::requirements_from_text;
    use async_trait::async_trait;

    struct Scripted(u32);

    #[async_trait]
    impl NarrativeGenerator for Scripted {
        async fn generate(&self, ctx: &NarrativeContext) -> NarrativeOutcome {
            NarrativeOutcome::Generated(Narrative {
                overall_score: self.0,
                recommendations: format!("{} members reviewed", ctx.members.len()),
                study_materials: "none".to_string(),
            })
        }
    }

    struct Broken;

    #[async_trait]
    impl NarrativeGenerator for Broken {
        async fn generate(&self, _ctx: &NarrativeContext) -> NarrativeOutcome {
            NarrativeOutcome::Failed("invalid api key".to_string())
        }
    }

    fn members() -> Vec<MemberProfile> {
        vec![
            MemberProfile::new("A", "PM", Some("ENFP"), Some("ESG, 변화 관리")),
            MemberProfile::new("B", "분석가", Some("INTJ"), Some("Python, 탄소 회계")),
        ]
    }

    #[tokio::test]
    async fn test_generated_narrative_score_feeds_overall() {
        let rfp = "ESG 경영 체계 수립";
        let requirements = requirements_from_text(rfp);
        let members = members();
        let request = AnalysisRequest {
            project_name: "ESG",
            rfp_text: Some(rfp),
            requirements: &requirements,
            members: &members,
        };

        let result = run_team_analysis(
            request,
            &Scripted(100),
            Duration::from_secs(5),
            &mut SeededFiller::new(4),
        )
        .await;

        assert_eq!(result.narrative_source, NarrativeSource::Llm);
        assert_eq!(result.narrative_score, 100);
        assert_eq!(result.recommendations, "2 members reviewed");
        assert_eq!(result.chemistry_score, 90);
        let expected = crate::analysis::engine::overall(
            result.chemistry_score,
            result.domain_coverage,
            result.technical_coverage,
            100,
        );
        assert_eq!(result.overall_score, expected);
    }

    #[tokio::test]
    async fn test_failed_narrative_falls_back() {
        let requirements = vec!["탄소중립 전략".to_string(), "공공 정책 이해".to_string()];
        let members = members();
        let request = AnalysisRequest {
            project_name: "ESG",
            rfp_text: None,
            requirements: &requirements,
            members: &members,
        };

        let result =
            run_team_analysis(request, &Broken, Duration::from_secs(5), &mut SeededFiller::new(4))
                .await;

        assert_eq!(result.narrative_source, NarrativeSource::Fallback);
        assert_eq!(result.narrative_score, 80);
        assert_eq!(result.missing_requirements, vec!["공공 정책 이해".to_string()]);
        assert_eq!(result.domain_coverage, 50);
    }

    #[tokio::test]
    async fn test_template_generator_is_labelled_fallback() {
        let requirements = requirements_from_text("");
        let members = members();
        let request = AnalysisRequest {
            project_name: "일반",
            rfp_text: Some("   "),
            requirements: &requirements,
            members: &members,
        };
        let result = run_team_analysis(
            request,
            &FallbackNarrativeGenerator,
            Duration::from_secs(5),
            &mut SeededFiller::new(1),
        )
        .await;
        assert_eq!(result.narrative_score, 80);
        assert_eq!(result.narrative_source, NarrativeSource::Fallback);
        assert_eq!(requirements.len(), 4);
    }

    #[test]
    fn test_summarize_rfp_truncates_on_char_boundary() {
        let long = "가".repeat(RFP_SUMMARY_CHARS + 10);
        assert_eq!(summarize_rfp(&long).chars().count(), RFP_SUMMARY_CHARS);
    }
}
