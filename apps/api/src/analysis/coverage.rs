//! Domain / technical coverage: how many requirements the team's skills cover.

use serde::{Deserialize, Serialize};

use crate::analysis::filler::FillerSource;
use crate::analysis::MemberProfile;

/// Category → synonym table. A requirement and a skill that both fall under the same
/// category (mention the category name or any of its synonyms) count as a match.
const SKILL_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "ai",
        &["python", "tensorflow", "pytorch", "machine learning", "nlp", "deep learning", "머신러닝", "딥러닝", "인공지능"],
    ),
    (
        "데이터",
        &["sql", "python", "tableau", "spark", "빅데이터", "분석", "통계"],
    ),
    (
        "클라우드",
        &["aws", "azure", "gcp", "kubernetes", "docker", "cloud", "인프라"],
    ),
    (
        "디지털",
        &["dx", "플랫폼", "it 전략", "시스템 구축"],
    ),
    (
        "esg",
        &["지속가능", "탄소", "환경", "사회적 책임", "거버넌스"],
    ),
    (
        "보안",
        &["security", "정보보호", "isms", "개인정보"],
    ),
    (
        "전략",
        &["컨설팅", "기획", "경영", "strategy"],
    ),
    (
        "마케팅",
        &["브랜드", "crm", "고객", "marketing"],
    ),
    (
        "프로세스",
        &["bpr", "pi", "운영", "효율화", "six sigma"],
    ),
    (
        "조직",
        &["인사", "hr", "성과 관리", "변화 관리"],
    ),
];

/// Per-requirement breakdown of a coverage computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub score: u32, // 0-100
    pub covered: Vec<String>,
    pub missing: Vec<String>,
}

/// Percentage of `requirements` covered by at least one of `skills`.
/// An empty requirement list is fully covered by definition.
pub fn coverage(requirements: &[String], skills: &[String]) -> u32 {
    assess_coverage(requirements, skills).score
}

/// Same as [`coverage`] but keeps track of which requirements matched.
pub fn assess_coverage(requirements: &[String], skills: &[String]) -> CoverageReport {
    if requirements.is_empty() {
        return CoverageReport {
            score: 100,
            covered: vec![],
            missing: vec![],
        };
    }

    let skills: Vec<String> = skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let mut covered = Vec::new();
    let mut missing = Vec::new();

    for requirement in requirements {
        let req_lower = requirement.trim().to_lowercase();
        if skills.iter().any(|skill| skill_covers(&req_lower, skill)) {
            covered.push(requirement.clone());
        } else {
            missing.push(requirement.clone());
        }
    }

    let score = ((covered.len() as f64 / requirements.len() as f64) * 100.0).round() as u32;

    CoverageReport {
        score,
        covered,
        missing,
    }
}

/// Both arguments must already be lower-cased.
fn skill_covers(requirement: &str, skill: &str) -> bool {
    if requirement.contains(skill) || skill.contains(requirement) {
        return true;
    }
    SKILL_CATEGORIES
        .iter()
        .any(|(category, synonyms)| {
            falls_under(requirement, category, synonyms) && falls_under(skill, category, synonyms)
        })
}

fn falls_under(text: &str, category: &str, synonyms: &[&str]) -> bool {
    contains_term(text, category) || synonyms.iter().any(|s| contains_term(text, s))
}

/// Substring search where an ASCII term edge may not sit next to another ASCII letter or
/// digit: "pi" is not in "kpi", "ai" is not in "chain". Hangul edges are unrestricted.
fn contains_term(text: &str, term: &str) -> bool {
    let is_word = |c: char| c.is_ascii_alphanumeric();
    let guard_start = term.starts_with(is_word);
    let guard_end = term.ends_with(is_word);

    text.match_indices(term).any(|(start, _)| {
        let end = start + term.len();
        let clear_before = !guard_start || !text[..start].chars().next_back().is_some_and(is_word);
        let clear_after = !guard_end || !text[end..].chars().next().is_some_and(is_word);
        clear_before && clear_after
    })
}

/// Technical coverage is domain coverage nudged by up to ±10 points.
///
/// There is no independent technical signal to measure; this is an approximation kept
/// so the chart has a separate axis, and it should be read as such.
pub fn technical_coverage(domain_coverage: u32, filler: &mut dyn FillerSource) -> u32 {
    let offset = filler.sample(-10, 11);
    (domain_coverage as i32 + offset).clamp(0, 100) as u32
}

/// Flattens the team's skill strings (comma-separated) and role labels into tokens.
pub fn team_skills(members: &[MemberProfile]) -> Vec<String> {
    let mut skills = Vec::new();
    for member in members {
        if let Some(extracted) = member.skills_extracted.as_deref() {
            skills.extend(
                extracted
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            );
        }
        let role = member.role.trim();
        if !role.is_empty() {
            skills.push(role.to_string());
        }
    }
    skills
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(i32);

    impl FillerSource for Fixed {
        fn sample(&mut self, low: i32, high: i32) -> i32 {
            self.0.clamp(low, high - 1)
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_requirements_fully_covered() {
        assert_eq!(coverage(&[], &[]), 100);
        assert_eq!(coverage(&[], &strings(&["python"])), 100);
    }

    #[test]
    fn test_category_match_ai_strategy() {
        assert_eq!(coverage(&strings(&["AI 전략"]), &strings(&["Python, AI 모델링"])), 100);
    }

    #[test]
    fn test_unrelated_skill_is_not_coverage() {
        assert_eq!(coverage(&strings(&["AI 전략"]), &strings(&["마케팅"])), 0);
    }

    #[test]
    fn test_substring_match_either_direction() {
        // skill inside requirement
        assert_eq!(coverage(&strings(&["데이터 분석"]), &strings(&["분석"])), 100);
        // requirement inside skill
        assert_eq!(coverage(&strings(&["재무"]), &strings(&["재무 모델링"])), 100);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(coverage(&strings(&["CRM 데이터 분석"]), &strings(&["crm"])), 100);
    }

    #[test]
    fn test_blank_skills_do_not_match_everything() {
        assert_eq!(coverage(&strings(&["재무 분석"]), &strings(&["", "   "])), 0);
    }

    #[test]
    fn test_partial_coverage_rounds() {
        let reqs = strings(&["재무 분석", "인사 제도 설계", "공공 정책 이해"]);
        let report = assess_coverage(&reqs, &strings(&["재무"]));
        assert_eq!(report.score, 33);
        assert_eq!(report.covered, strings(&["재무 분석"]));
        assert_eq!(report.missing, strings(&["인사 제도 설계", "공공 정책 이해"]));

        let report = assess_coverage(&reqs, &strings(&["재무", "인사"]));
        assert_eq!(report.score, 67);
    }

    #[test]
    fn test_short_ascii_terms_need_word_edges() {
        assert_eq!(coverage(&strings(&["KPI 설계"]), &strings(&["운영 관리"])), 0);
        assert_eq!(coverage(&strings(&["API 연동"]), &strings(&["효율화"])), 0);
        assert_eq!(coverage(&strings(&["supply chain 최적화"]), &strings(&["python"])), 0);
    }

    #[test]
    fn test_short_ascii_terms_still_match_standalone() {
        assert_eq!(coverage(&strings(&["PI 컨설팅"]), &strings(&["운영 관리"])), 100);
        assert_eq!(coverage(&strings(&["HR 제도 개편"]), &strings(&["성과 관리"])), 100);
        assert_eq!(coverage(&strings(&["AI를 활용한 자동화"]), &strings(&["pytorch"])), 100);
    }

    #[test]
    fn test_contains_term_edges() {
        assert!(contains_term("ai 전략", "ai"));
        assert!(contains_term("(ai)", "ai"));
        assert!(!contains_term("chain", "ai"));
        assert!(!contains_term("kpi", "pi"));
        assert!(contains_term("빅데이터 분석", "데이터"));
        assert!(contains_term("it 전략가", "it 전략"));
    }

    #[test]
    fn test_technical_coverage_offset_and_clamp() {
        assert_eq!(technical_coverage(50, &mut Fixed(7)), 57);
        assert_eq!(technical_coverage(50, &mut Fixed(-10)), 40);
        assert_eq!(technical_coverage(95, &mut Fixed(10)), 100);
        assert_eq!(technical_coverage(3, &mut Fixed(-10)), 0);
    }

    #[test]
    fn test_technical_coverage_within_ten_points() {
        let mut filler = crate::analysis::filler::SeededFiller::new(7);
        for _ in 0..200 {
            let t = technical_coverage(60, &mut filler);
            assert!((50..=70).contains(&t), "got {t}");
        }
    }

    #[test]
    fn test_team_skills_splits_and_includes_roles() {
        let members = vec![
            MemberProfile::new("A", "PM", None, Some("Python, SQL ,, Tableau")),
            MemberProfile::new("B", "  ", None, None),
        ];
        assert_eq!(team_skills(&members), strings(&["Python", "SQL", "Tableau", "PM"]));
    }
}
