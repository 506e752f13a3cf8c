//! Team chemistry: mean pairwise MBTI compatibility, as a 0-100 score.

use crate::analysis::compatibility::compatibility;
use crate::analysis::MemberProfile;

/// Returned when the team is too small to form a pair.
pub const SMALL_TEAM_CHEMISTRY: u32 = 80;
/// Returned when no pair has MBTI codes on both sides.
pub const NO_MBTI_CHEMISTRY: u32 = 75;

/// Averages compatibility over every unordered member pair where both members
/// carry an MBTI code. Pairs with a missing code are skipped, not counted as neutral.
pub fn team_chemistry(members: &[MemberProfile]) -> u32 {
    if members.len() < 2 {
        return SMALL_TEAM_CHEMISTRY;
    }

    let mut sum = 0.0_f64;
    let mut pair_count = 0_u32;

    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            let (Some(mbti_a), Some(mbti_b)) = (a.mbti_code(), b.mbti_code()) else {
                continue;
            };
            sum += compatibility(Some(mbti_a), Some(mbti_b));
            pair_count += 1;
        }
    }

    if pair_count == 0 {
        return NO_MBTI_CHEMISTRY;
    }

    ((sum / pair_count as f64) * 100.0).round() as u32
}
