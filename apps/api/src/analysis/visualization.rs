//! Chart payloads: radar, compatibility network, coverage heatmap.
//!
//! Several series are filler. The radar "project requirement" values and three heatmap
//! axes (experience, leadership, communication) are not measured anywhere; they are
//! sampled from fixed ranges so the charts render. Only network edges and the
//! chemistry/domain/technical heatmap cells carry computed values.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::compatibility::compatibility;
use crate::analysis::engine::CoreScores;
use crate::analysis::filler::FillerSource;
use crate::analysis::MemberProfile;

pub const RADAR_LABELS: [&str; 8] = [
    "전략 기획",
    "디지털 역량",
    "데이터 분석",
    "산업 전문성",
    "프로젝트 관리",
    "변화 관리",
    "커뮤니케이션",
    "리더십",
];

pub const HEATMAP_LABELS: [&str; 6] = [
    "기술 역량",
    "도메인 지식",
    "경험",
    "팀 케미스트리",
    "리더십",
    "커뮤니케이션",
];

/// Index of each computed (non-filler) heatmap cell.
pub const HEATMAP_TECHNICAL: usize = 0;
pub const HEATMAP_DOMAIN: usize = 1;
pub const HEATMAP_CHEMISTRY: usize = 3;

const REQUIREMENT_RANGE: (i32, i32) = (60, 100);
const CAPABILITY_OFFSET: (i32, i32) = (-15, 15);
const EXPERIENCE_RANGE: (i32, i32) = (75, 95);
const LEADERSHIP_RANGE: (i32, i32) = (70, 95);
const COMMUNICATION_RANGE: (i32, i32) = (80, 95);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarChart {
    pub labels: Vec<String>,
    pub project_requirements: Vec<u32>,
    pub team_capabilities: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    /// The member's name; edges refer to nodes by it.
    pub id: String,
    pub name: String,
    pub mbti: Option<String>,
    /// Row id of a stored member. Disambiguates members that share a name.
    #[serde(default)]
    pub member_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub source: String,
    pub target: String,
    pub compatibility: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkGraph {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub labels: Vec<String>,
    pub values: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationPayload {
    pub radar: RadarChart,
    pub network: NetworkGraph,
    pub heatmap: Heatmap,
}

/// Builds all three chart payloads.
///
/// `requirements` is accepted for parity with the scoring call but does not yet shape the
/// radar: there is no per-axis requirement scoring, so the requirement series is filler.
pub fn build_visualization(
    _requirements: &[String],
    members: &[MemberProfile],
    scores: &CoreScores,
    filler: &mut dyn FillerSource,
) -> VisualizationPayload {
    VisualizationPayload {
        radar: build_radar(filler),
        network: build_network(members),
        heatmap: build_heatmap(scores, filler),
    }
}

fn build_radar(filler: &mut dyn FillerSource) -> RadarChart {
    let project_requirements: Vec<u32> = RADAR_LABELS
        .iter()
        .map(|_| filler.sample(REQUIREMENT_RANGE.0, REQUIREMENT_RANGE.1) as u32)
        .collect();

    let team_capabilities = project_requirements
        .iter()
        .map(|&req| {
            let offset = filler.sample(CAPABILITY_OFFSET.0, CAPABILITY_OFFSET.1);
            (req as i32 + offset).clamp(0, 100) as u32
        })
        .collect();

    RadarChart {
        labels: RADAR_LABELS.iter().map(|s| s.to_string()).collect(),
        project_requirements,
        team_capabilities,
    }
}

/// One node per member, one edge per unordered pair. Members without an MBTI still get
/// edges, at the neutral compatibility.
pub fn build_network(members: &[MemberProfile]) -> NetworkGraph {
    let nodes = members
        .iter()
        .map(|m| NetworkNode {
            id: m.name.clone(),
            name: m.name.clone(),
            mbti: m.mbti_code().map(str::to_string),
            member_id: m.id,
        })
        .collect();

    let mut edges = Vec::new();
    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            edges.push(NetworkEdge {
                source: a.name.clone(),
                target: b.name.clone(),
                compatibility: compatibility(a.mbti_code(), b.mbti_code()),
            });
        }
    }

    NetworkGraph { nodes, edges }
}

fn build_heatmap(scores: &CoreScores, filler: &mut dyn FillerSource) -> Heatmap {
    let experience = filler.sample(EXPERIENCE_RANGE.0, EXPERIENCE_RANGE.1) as u32;
    let leadership = filler.sample(LEADERSHIP_RANGE.0, LEADERSHIP_RANGE.1) as u32;
    let communication = filler.sample(COMMUNICATION_RANGE.0, COMMUNICATION_RANGE.1) as u32;

    Heatmap {
        labels: HEATMAP_LABELS.iter().map(|s| s.to_string()).collect(),
        values: vec![
            scores.technical_coverage,
            scores.domain_coverage,
            experience,
            scores.chemistry,
            leadership,
            communication,
        ],
    }
}
