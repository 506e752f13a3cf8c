//! RFP topic extraction and canonical requirement generation.
//!
//! Pure keyword/regex matching. There is no attempt at understanding the RFP beyond
//! "does this pattern occur anywhere in the text".

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

pub const TOPIC_DIGITAL_TRANSFORMATION: &str = "디지털 전환";
pub const TOPIC_ESG: &str = "ESG 경영";
pub const TOPIC_AI_DATA: &str = "AI/데이터";
pub const TOPIC_CLOUD: &str = "클라우드";
pub const TOPIC_SECURITY: &str = "정보보호";
pub const TOPIC_STRATEGY: &str = "경영 전략";
pub const TOPIC_PROCESS: &str = "프로세스 혁신";
pub const TOPIC_MARKETING: &str = "마케팅/고객";
pub const TOPIC_ORGANIZATION: &str = "조직/인사";
pub const TOPIC_PUBLIC_SECTOR: &str = "공공 사업";

/// Ordered (pattern, topic) rules. Every pattern is matched case-insensitively.
///
/// `<AI>` marks an ASCII acronym. It must not touch other ASCII letters or digits but may
/// touch Hangul, since particles attach directly ("AI를", "AWS로").
const TOPIC_RULES: &[(&str, &str)] = &[
    (r"디지털\s*전환|<DX>|digital\s+transformation", TOPIC_DIGITAL_TRANSFORMATION),
    (r"ESG|지속\s*가능|탄소\s*중립|sustainab", TOPIC_ESG),
    (r"<AI>|인공\s*지능|머신\s*러닝|machine\s+learning|빅\s*데이터|데이터\s*분석|analytics", TOPIC_AI_DATA),
    (r"클라우드|cloud|<AWS>|azure|<GCP>", TOPIC_CLOUD),
    (r"보안|정보\s*보호|security|개인\s*정보", TOPIC_SECURITY),
    (r"경영\s*전략|중장기|전략\s*수립|비전|strategy", TOPIC_STRATEGY),
    (r"프로세스|업무\s*효율|<BPR>|<PI>|운영\s*혁신", TOPIC_PROCESS),
    (r"마케팅|고객\s*경험|<CX>|<CRM>|브랜드", TOPIC_MARKETING),
    (r"조직\s*진단|인사\s*제도|<HR>|성과\s*관리|조직\s*문화", TOPIC_ORGANIZATION),
    (r"공공|정부|지자체|공기업|public\s+sector", TOPIC_PUBLIC_SECTOR),
];

static ACRONYM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Z]+)>").expect("valid acronym marker pattern"));

/// Expands `<XX>` markers into an ASCII-bounded alternative.
fn expand_acronyms(pattern: &str) -> String {
    ACRONYM
        .replace_all(pattern, "(?:^|[^A-Za-z0-9])(?:$1)(?:[^A-Za-z0-9]|$$)")
        .into_owned()
}

static COMPILED_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    TOPIC_RULES
        .iter()
        .filter_map(|&(pattern, topic)| {
            Regex::new(&format!("(?i){}", expand_acronyms(pattern)))
                .ok()
                .map(|re| (re, topic))
        })
        .collect()
});

/// Canonical requirement phrases per topic.
const TOPIC_REQUIREMENTS: &[(&str, &[&str])] = &[
    (
        TOPIC_DIGITAL_TRANSFORMATION,
        &["디지털 전략 수립", "클라우드 플랫폼 이해", "데이터 기반 의사결정", "변화 관리"],
    ),
    (
        TOPIC_ESG,
        &["ESG 평가 체계 이해", "지속가능경영 보고서 작성", "탄소중립 전략", "변화 관리"],
    ),
    (
        TOPIC_AI_DATA,
        &["AI 전략", "데이터 분석", "머신러닝 모델링", "데이터 기반 의사결정"],
    ),
    (
        TOPIC_CLOUD,
        &["클라우드 플랫폼 이해", "클라우드 마이그레이션", "인프라 아키텍처 설계"],
    ),
    (
        TOPIC_SECURITY,
        &["정보보호 관리체계", "보안 리스크 평가", "개인정보 보호 규제 이해"],
    ),
    (
        TOPIC_STRATEGY,
        &["경영 전략 수립", "시장 및 경쟁 분석", "재무 분석"],
    ),
    (
        TOPIC_PROCESS,
        &["업무 프로세스 재설계", "운영 효율화", "변화 관리"],
    ),
    (
        TOPIC_MARKETING,
        &["마케팅 전략", "고객 경험 설계", "CRM 데이터 분석"],
    ),
    (
        TOPIC_ORGANIZATION,
        &["조직 진단", "인사 제도 설계", "변화 관리"],
    ),
    (
        TOPIC_PUBLIC_SECTOR,
        &["공공 정책 이해", "사업 타당성 분석", "이해관계자 관리"],
    ),
];

/// Used when no topic was detected, so coverage always has a non-empty denominator.
pub const GENERIC_REQUIREMENTS: [&str; 4] = [
    "프로젝트 관리",
    "문제 해결 능력",
    "커뮤니케이션",
    "산업 분석",
];

/// Returns every topic whose pattern occurs in `text`, in rule order, without duplicates.
pub fn extract_topics(text: &str) -> Vec<&'static str> {
    let mut topics: Vec<&'static str> = Vec::new();
    for &(ref re, topic) in COMPILED_RULES.iter() {
        if re.is_match(text) && !topics.contains(&topic) {
            topics.push(topic);
        }
    }
    topics
}

/// Maps topics to their canonical requirement phrases, keeping first occurrences only.
/// Unknown topics contribute nothing; an empty topic list yields `GENERIC_REQUIREMENTS`.
pub fn requirements_for<S: AsRef<str>>(topics: &[S]) -> Vec<String> {
    if topics.is_empty() {
        return GENERIC_REQUIREMENTS.iter().map(|s| s.to_string()).collect();
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut requirements = Vec::new();

    for topic in topics {
        let Some((_, phrases)) = TOPIC_REQUIREMENTS
            .iter()
            .find(|(name, _)| *name == topic.as_ref())
        else {
            continue;
        };
        for &phrase in phrases.iter() {
            if seen.insert(phrase) {
                requirements.push(phrase.to_string());
            }
        }
    }

    requirements
}

/// Convenience: RFP text → topics → requirements.
pub fn requirements_from_text(text: &str) -> Vec<String> {
    requirements_for(&extract_topics(text))
}
