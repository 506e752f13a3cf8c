// Prompt constants for the narrative (recommendations / study materials) call.

/// System prompt for team-fit narrative generation.
pub const NARRATIVE_SYSTEM: &str = "You are a senior management consultant who staffs \
    consulting engagements. You review a proposed project team against the client's RFP \
    requirements and give candid, practical advice. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Narrative prompt template. Replace every `{placeholder}` before sending.
pub const NARRATIVE_PROMPT_TEMPLATE: &str = r#"Assess how well this consulting team fits the project below.

PROJECT: {project_name}

RFP SUMMARY:
{rfp_summary}

REQUIREMENTS (JSON array):
{requirements_json}

TEAM (JSON array of {name, role, mbti, skills}):
{team_json}

COMPUTED SCORES (0-100):
- team chemistry: {chemistry}
- domain coverage: {domain_coverage}
- technical coverage: {technical_coverage}

REQUIREMENTS NOT COVERED BY ANY TEAM SKILL:
{missing_json}

Return a JSON object with this EXACT schema:
{
  "overall_score": 82,
  "recommendations": "markdown text",
  "study_materials": "markdown text"
}

Rules:
- overall_score is your own 0-100 judgement of the team's readiness for this project.
- recommendations: 3-5 concrete staffing or collaboration actions, most important first.
- study_materials: books, courses or certifications that close the uncovered requirements.
- Write recommendations and study_materials in Korean.
- Do not restate the computed scores."#;
