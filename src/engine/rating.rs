//! Overall routine rating.
//!
//! Coarse and monotonic on purpose: any conflict costs two points, any
//! missing essential costs one, and the result never drops below one.

pub const MAX_RATING: u8 = 5;
pub const MIN_RATING: u8 = 1;
const CONFLICT_PENALTY: u8 = 2;
const GAP_PENALTY: u8 = 1;

pub(crate) fn rate(conflicts: usize, missing_essentials: usize) -> u8 {
    let mut penalty = 0;
    if conflicts > 0 {
        penalty += CONFLICT_PENALTY;
    }
    if missing_essentials > 0 {
        penalty += GAP_PENALTY;
    }
    MAX_RATING.saturating_sub(penalty).max(MIN_RATING)
}

pub(crate) fn summary(rating: u8) -> &'static str {
    match rating {
        5 => "Your routine looks solid based on local rules!",
        4 => "Your routine is good, but check the minor gaps.",
        _ => "Your routine has some potential conflicts or gaps.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalties() {
        assert_eq!(rate(0, 0), 5);
        assert_eq!(rate(0, 3), 4);
        assert_eq!(rate(1, 0), 3);
        assert_eq!(rate(7, 2), 2);
    }

    #[test]
    fn summaries_follow_rating() {
        assert!(summary(5).contains("solid"));
        assert!(summary(4).contains("minor gaps"));
        assert_eq!(summary(2), summary(3));
    }
}
