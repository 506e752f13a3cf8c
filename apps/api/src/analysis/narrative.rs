//! Narrative collaborator: free-text recommendations and study materials.
//!
//! Generators never return an error. They report `NarrativeOutcome::Failed` and the
//! caller substitutes the deterministic fallback via [`resolve_narrative`], so the score
//! composer always receives a number.
//!
//! `AppState` holds an `Arc<dyn NarrativeGenerator>`, chosen at startup from config.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analysis::engine::CoreScores;
use crate::analysis::prompts::{NARRATIVE_PROMPT_TEMPLATE, NARRATIVE_SYSTEM};
use crate::analysis::MemberProfile;
use crate::llm_client::LlmClient;

/// Substituted for the narrative score whenever generation fails.
pub const FALLBACK_NARRATIVE_SCORE: u32 = 80;

/// Everything a generator may look at.
#[derive(Debug, Clone, Serialize)]
pub struct NarrativeContext {
    pub project_name: String,
    pub rfp_summary: Option<String>,
    pub requirements: Vec<String>,
    pub members: Vec<MemberProfile>,
    pub scores: CoreScores,
    pub missing_requirements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub overall_score: u32, // 0-100
    pub recommendations: String,
    pub study_materials: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NarrativeOutcome {
    Generated(Narrative),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeSource {
    Llm,
    Fallback,
}

impl NarrativeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            NarrativeSource::Llm => "llm",
            NarrativeSource::Fallback => "fallback",
        }
    }
}

/// The narrative actually used for an analysis, and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedNarrative {
    pub narrative: Narrative,
    pub source: NarrativeSource,
}

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, ctx: &NarrativeContext) -> NarrativeOutcome;

    /// How a successful narrative from this generator is labelled.
    fn source(&self) -> NarrativeSource {
        NarrativeSource::Llm
    }
}

/// Picks the generated narrative, or the fallback text and score on failure.
/// `generated_by` labels a successful outcome.
pub fn resolve_narrative(
    outcome: NarrativeOutcome,
    generated_by: NarrativeSource,
    ctx: &NarrativeContext,
) -> ResolvedNarrative {
    match outcome {
        NarrativeOutcome::Generated(narrative) => ResolvedNarrative {
            narrative,
            source: generated_by,
        },
        NarrativeOutcome::Failed(reason) => {
            warn!("Narrative generation failed, using fallback: {reason}");
            ResolvedNarrative {
                narrative: fallback_narrative(ctx),
                source: NarrativeSource::Fallback,
            }
        }
    }
}

/// Runs `generator` under `timeout`; an elapsed timer counts as a failure.
pub async fn generate_with_timeout(
    generator: &dyn NarrativeGenerator,
    ctx: &NarrativeContext,
    timeout: Duration,
) -> NarrativeOutcome {
    match tokio::time::timeout(timeout, generator.generate(ctx)).await {
        Ok(outcome) => outcome,
        Err(_) => NarrativeOutcome::Failed(format!(
            "{} narrative timed out after {}s",
            generator.source().as_str(),
            timeout.as_secs()
        )),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LLM backend
// ────────────────────────────────────────────────────────────────────────────

/// Raw LLM reply. The score may come back fractional or out of range.
#[derive(Debug, Deserialize)]
struct LlmNarrativeReply {
    overall_score: f64,
    recommendations: String,
    study_materials: String,
}

pub struct LlmNarrativeGenerator(pub LlmClient);

#[async_trait]
impl NarrativeGenerator for LlmNarrativeGenerator {
    async fn generate(&self, ctx: &NarrativeContext) -> NarrativeOutcome {
        let prompt = match build_narrative_prompt(ctx) {
            Ok(p) => p,
            Err(e) => return NarrativeOutcome::Failed(format!("prompt build failed: {e}")),
        };

        match self
            .0
            .call_json::<LlmNarrativeReply>(&prompt, NARRATIVE_SYSTEM)
            .await
        {
            Ok(reply) => NarrativeOutcome::Generated(Narrative {
                overall_score: reply.overall_score.round().clamp(0.0, 100.0) as u32,
                recommendations: reply.recommendations,
                study_materials: reply.study_materials,
            }),
            Err(e) => NarrativeOutcome::Failed(format!("LLM narrative call failed: {e}")),
        }
    }
}

fn build_narrative_prompt(ctx: &NarrativeContext) -> Result<String, serde_json::Error> {
    let requirements_json = serde_json::to_string(&ctx.requirements)?;
    let missing_json = serde_json::to_string(&ctx.missing_requirements)?;
    let team_json = serde_json::to_string_pretty(
        &ctx.members
            .iter()
            .map(|m| {
                serde_json::json!({
                    "name": m.name,
                    "role": m.role,
                    "mbti": m.mbti_code(),
                    "skills": m.skills_extracted,
                })
            })
            .collect::<Vec<_>>(),
    )?;

    let chemistry = ctx.scores.chemistry.to_string();
    let domain_coverage = ctx.scores.domain_coverage.to_string();
    let technical_coverage = ctx.scores.technical_coverage.to_string();

    Ok(fill_placeholders(
        NARRATIVE_PROMPT_TEMPLATE,
        &[
            ("project_name", ctx.project_name.as_str()),
            (
                "rfp_summary",
                ctx.rfp_summary.as_deref().unwrap_or("(no RFP text provided)"),
            ),
            ("requirements_json", requirements_json.as_str()),
            ("team_json", team_json.as_str()),
            ("chemistry", chemistry.as_str()),
            ("domain_coverage", domain_coverage.as_str()),
            ("technical_coverage", technical_coverage.as_str()),
            ("missing_json", missing_json.as_str()),
        ],
    ))
}

/// Replaces `{key}` tokens of `template` in a single left-to-right pass. Substituted
/// values are never scanned again, and unknown `{...}` text is copied through.
fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|&(_, v)| (v, close))
        });
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Deterministic fallback
// ────────────────────────────────────────────────────────────────────────────

/// Template-based generator. Used when no API key is configured; always succeeds.
pub struct FallbackNarrativeGenerator;

#[async_trait]
impl NarrativeGenerator for FallbackNarrativeGenerator {
    async fn generate(&self, ctx: &NarrativeContext) -> NarrativeOutcome {
        NarrativeOutcome::Generated(fallback_narrative(ctx))
    }

    fn source(&self) -> NarrativeSource {
        NarrativeSource::Fallback
    }
}

/// Builds recommendation and study text from the scores and uncovered requirements.
pub fn fallback_narrative(ctx: &NarrativeContext) -> Narrative {
    let scores = &ctx.scores;
    let mut recommendations = Vec::new();

    if scores.chemistry >= 85 {
        recommendations.push(
            "팀 케미스트리가 우수합니다. 현재 구성을 유지하고 역할 분담을 명확히 하세요.".to_string(),
        );
    } else if scores.chemistry >= 70 {
        recommendations.push(
            "팀 케미스트리가 양호합니다. 킥오프 워크숍으로 협업 방식을 먼저 합의하세요.".to_string(),
        );
    } else {
        recommendations.push(
            "팀 케미스트리 보완이 필요합니다. 정기적인 1:1 미팅과 의사결정 규칙을 도입하세요."
                .to_string(),
        );
    }

    if ctx.missing_requirements.is_empty() {
        recommendations
            .push("모든 요구 역량이 팀 내에서 확보되어 있습니다.".to_string());
    } else {
        let top: Vec<&str> = ctx
            .missing_requirements
            .iter()
            .take(3)
            .map(String::as_str)
            .collect();
        recommendations.push(format!(
            "다음 역량을 보유한 인력 보강 또는 외부 자문을 검토하세요: {}.",
            top.join(", ")
        ));
    }

    if scores.domain_coverage < 60 {
        recommendations.push(format!(
            "도메인 커버리지가 {}%로 낮습니다. 제안서 작성 전 도메인 전문가 리뷰를 받으세요.",
            scores.domain_coverage
        ));
    }

    let study_materials = if ctx.missing_requirements.is_empty() {
        "- 최신 산업 동향 리포트 정기 공유\n- 유사 프로젝트 사례 스터디".to_string()
    } else {
        ctx.missing_requirements
            .iter()
            .map(|r| format!("- {r}: 관련 온라인 강의 및 사례 연구"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    Narrative {
        overall_score: FALLBACK_NARRATIVE_SCORE,
        recommendations: recommendations
            .iter()
            .map(|r| format!("- {r}"))
            .collect::<Vec<_>>()
            .join("\n"),
        study_materials,
    }
}
