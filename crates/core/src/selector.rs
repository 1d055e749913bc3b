//! Deterministic word selection for a training session.
//!
//! Candidates are filtered by strategy, ranked by a stable hash of the session id
//! and the word, and the lowest ranks are taken in order. The same session id and
//! candidate pool always yield the same list, in the same order.

use std::collections::HashSet;

use crate::model::{Direction, SessionId, Strategy, WordSnapshot, WordStats};

/// Words trained at most this many times count as `new`.
pub const NEW_MAX_TRAINED: u32 = 2;

/// Trained words with a mastery ratio at or below this count as `bad`.
pub const BAD_MAX_MASTERY: f64 = 0.7;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a over `bytes`.
fn fnv1a(bytes: impl IntoIterator<Item = u8>, seed: u64) -> u64 {
    bytes.into_iter().fold(seed, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Stable rank of `word` inside session `session_id`.
///
/// Hashes the decimal session id followed by the word text. Stable across
/// processes, platforms and releases.
#[must_use]
pub fn rank(session_id: SessionId, word: &str) -> u64 {
    let id = session_id.value().to_string();
    let seeded = fnv1a(id.bytes(), FNV_OFFSET_BASIS);
    fnv1a(word.bytes(), seeded)
}

/// Per-turn seed derived from the session, for reproducible option shuffles.
#[must_use]
pub fn turn_seed(session_id: SessionId, step: usize) -> u64 {
    let seeded = fnv1a(session_id.value().to_le_bytes(), FNV_OFFSET_BASIS);
    fnv1a((step as u64).to_le_bytes(), seeded)
}

/// Inputs for one selection.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    pub session_id: SessionId,
    pub strategy: Strategy,
    pub direction: Direction,
    pub duration: u32,
    /// Membership of the chosen group. Required for `Strategy::Group`; an absent
    /// set selects nothing.
    pub group_members: Option<&'a HashSet<String>>,
}

impl SelectionRequest<'_> {
    fn admits(&self, word: &WordStats) -> bool {
        let stats = word.stats(self.direction);
        match self.strategy {
            Strategy::Random => true,
            Strategy::New => stats.trained_count() <= NEW_MAX_TRAINED,
            Strategy::Bad => stats
                .mastery()
                .is_some_and(|ratio| ratio <= BAD_MAX_MASTERY),
            Strategy::Group => self
                .group_members
                .is_some_and(|members| members.contains(&word.word)),
        }
    }
}

/// Orders `words` by rank within `session_id`, ties broken by word text.
pub fn rank_order<'w>(
    session_id: SessionId,
    words: impl IntoIterator<Item = &'w WordStats>,
) -> Vec<&'w WordStats> {
    let mut ranked: Vec<(u64, &WordStats)> = words
        .into_iter()
        .map(|w| (rank(session_id, &w.word), w))
        .collect();
    ranked.sort_by(|(ra, a), (rb, b)| ra.cmp(rb).then_with(|| a.word.cmp(&b.word)));
    ranked.into_iter().map(|(_, w)| w).collect()
}

/// Selects up to `request.duration` words from `candidates`.
///
/// Returns an empty list when nothing passes the strategy filter, and the whole
/// filtered pool when it is smaller than the requested duration.
#[must_use]
pub fn select(request: &SelectionRequest<'_>, candidates: &[WordStats]) -> Vec<WordSnapshot> {
    let take = usize::try_from(request.duration).unwrap_or(usize::MAX);
    rank_order(
        request.session_id,
        candidates.iter().filter(|w| request.admits(w)),
    )
    .into_iter()
    .take(take)
    .map(WordStats::snapshot)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DirectionStats;
    use crate::time::fixed_now;

    fn word(text: &str, to: (u32, u32), from: (u32, u32)) -> WordStats {
        let mut w = WordStats::new(text, vec![format!("{text}-t")], fixed_now()).unwrap();
        w.to = DirectionStats::new(to.0, to.1, None).unwrap();
        w.from = DirectionStats::new(from.0, from.1, None).unwrap();
        w
    }

    fn pool() -> Vec<WordStats> {
        vec![
            word("uno", (0, 0), (0, 0)),
            word("dos", (3, 3), (1, 1)),
            word("tres", (1, 5), (2, 2)),
            word("cuatro", (7, 10), (0, 3)),
            word("cinco", (2, 2), (9, 10)),
        ]
    }

    fn request<'a>(strategy: Strategy, direction: Direction, duration: u32) -> SelectionRequest<'a> {
        SelectionRequest {
            session_id: SessionId::new(1_700_000_000),
            strategy,
            direction,
            duration,
            group_members: None,
        }
    }

    fn texts(words: &[WordSnapshot]) -> Vec<&str> {
        words.iter().map(|w| w.word.as_str()).collect()
    }

    #[test]
    fn fnv_matches_reference_vectors() {
        assert_eq!(fnv1a(*b"", FNV_OFFSET_BASIS), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(*b"a", FNV_OFFSET_BASIS), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a(*b"foobar", FNV_OFFSET_BASIS), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn rank_hashes_id_then_word() {
        let id = SessionId::new(12);
        assert_eq!(rank(id, "ab"), fnv1a(*b"12ab", FNV_OFFSET_BASIS));
    }

    #[test]
    fn duration_larger_than_pool_returns_whole_pool() {
        let picked = select(&request(Strategy::Random, Direction::From, 10), &pool());
        assert_eq!(picked.len(), 5);
    }

    #[test]
    fn duration_caps_result_length() {
        let picked = select(&request(Strategy::Random, Direction::From, 3), &pool());
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn selection_is_deterministic_and_prefix_stable() {
        let a = select(&request(Strategy::Random, Direction::To, 5), &pool());
        let b = select(&request(Strategy::Random, Direction::To, 5), &pool());
        assert_eq!(a, b);

        let mut reversed = pool();
        reversed.reverse();
        let c = select(&request(Strategy::Random, Direction::To, 5), &reversed);
        assert_eq!(a, c);

        let short = select(&request(Strategy::Random, Direction::To, 2), &pool());
        assert_eq!(short[..], a[..2]);
    }

    #[test]
    fn different_sessions_can_reorder() {
        let many: Vec<WordStats> = (0..30)
            .map(|i| word(&format!("w{i}"), (0, 0), (0, 0)))
            .collect();
        let a = select(&request(Strategy::Random, Direction::To, 30), &many);
        let mut other = request(Strategy::Random, Direction::To, 30);
        other.session_id = SessionId::new(1_700_000_001);
        let b = select(&other, &many);
        assert_ne!(texts(&a), texts(&b));
    }

    #[test]
    fn new_strategy_uses_target_direction() {
        let to = select(&request(Strategy::New, Direction::To, 10), &pool());
        let mut to_words = texts(&to);
        to_words.sort_unstable();
        assert_eq!(to_words, vec!["cinco", "uno"]);

        let from = select(&request(Strategy::New, Direction::From, 10), &pool());
        let mut from_words = texts(&from);
        from_words.sort_unstable();
        assert_eq!(from_words, vec!["dos", "tres", "uno"]);
    }

    #[test]
    fn bad_strategy_skips_untrained_and_good_words() {
        let to = select(&request(Strategy::Bad, Direction::To, 10), &pool());
        let mut to_words = texts(&to);
        to_words.sort_unstable();
        // cuatro sits exactly on the 0.7 boundary
        assert_eq!(to_words, vec!["cuatro", "tres"]);

        let from = select(&request(Strategy::Bad, Direction::From, 10), &pool());
        assert_eq!(texts(&from), vec!["cuatro"]);
    }

    #[test]
    fn group_strategy_intersects_membership() {
        let members: HashSet<String> = ["dos", "cinco", "missing"]
            .into_iter()
            .map(String::from)
            .collect();
        let mut req = request(Strategy::Group, Direction::From, 10);
        req.group_members = Some(&members);
        let picked = select(&req, &pool());
        let mut words = texts(&picked);
        words.sort_unstable();
        assert_eq!(words, vec!["cinco", "dos"]);

        let no_group = select(&request(Strategy::Group, Direction::From, 10), &pool());
        assert!(no_group.is_empty());
    }

    #[test]
    fn empty_pool_selects_nothing() {
        assert!(select(&request(Strategy::Random, Direction::From, 10), &[]).is_empty());
    }

    #[test]
    fn turn_seed_varies_by_step() {
        let id = SessionId::new(5);
        assert_eq!(turn_seed(id, 1), turn_seed(id, 1));
        assert_ne!(turn_seed(id, 1), turn_seed(id, 2));
    }
}
