use std::cmp::Ordering;

use crate::models::review::{Review, ReviewSummary};

/// Builds the per-tour summary: average rating to one decimal and the
/// reviews ordered best first.
///
/// Equal ratings are ordered newest first, then by id, so repeated reads of
/// the same set always come back in the same order.
pub fn aggregate(mut reviews: Vec<Review>) -> ReviewSummary {
    if reviews.is_empty() {
        return ReviewSummary::empty();
    }

    let total: f64 = reviews.iter().map(|r| r.rating).sum();
    let average_rating = round_to_tenth(total / reviews.len() as f64);

    reviews.sort_by(compare_reviews);

    ReviewSummary {
        average_rating,
        reviews,
    }
}

/// Rounds to the nearest tenth of the exact binary value, ties away from
/// zero. 3.65 is stored just below the midpoint and becomes 3.6, while an
/// exact tie such as 2.25 becomes 2.3.
pub fn round_to_tenth(value: f64) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    if value < 0.0 {
        return -round_to_tenth(-value);
    }

    // 10 * value == hi + lo exactly
    let hi = value * 10.0;
    let lo = 10.0_f64.mul_add(value, -hi);

    let mut lower = hi.floor();
    if hi == lower && lo < 0.0 {
        lower -= 1.0;
    }
    // Sign of (10 * value) - (lower + 0.5)
    let offset = (hi - (lower + 0.5)) + lo;
    let tenths = if offset >= 0.0 { lower + 1.0 } else { lower };

    tenths / 10.0
}

fn compare_reviews(a: &Review, b: &Review) -> Ordering {
    b.rating
        .total_cmp(&a.rating)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn review(id: &str, rating: f64, minutes: i64) -> Review {
        Review {
            id: id.into(),
            tour_id: "tour".into(),
            email: format!("{id}@example.com"),
            text: format!("review {id}"),
            rating,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    fn ratings(summary: &ReviewSummary) -> Vec<f64> {
        summary.reviews.iter().map(|r| r.rating).collect()
    }

    #[test]
    fn test_empty_set() {
        let summary = aggregate(Vec::new());
        assert_eq!(summary.average_rating, 0.0);
        assert!(summary.reviews.is_empty());
        assert_eq!(summary, ReviewSummary::empty());
    }

    #[test]
    fn test_average_and_order() {
        let summary = aggregate(vec![review("a", 5.0, 0), review("b", 3.0, 1), review("c", 4.0, 2)]);
        assert_eq!(summary.average_rating, 4.0);
        assert_eq!(ratings(&summary), vec![5.0, 4.0, 3.0]);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        let summary = aggregate(vec![review("a", 5.0, 0), review("b", 5.0, 1), review("c", 1.0, 2)]);
        assert_eq!(summary.average_rating, 3.7);
        assert_eq!(ratings(&summary), vec![5.0, 5.0, 1.0]);
        assert_eq!(summary.reviews[2].id, "c");
    }

    #[test]
    fn test_ties_are_newest_first_then_by_id() {
        let summary = aggregate(vec![
            review("old", 4.0, 0),
            review("new", 4.0, 10),
            review("b-same", 4.0, 5),
            review("a-same", 4.0, 5),
        ]);
        let ids: Vec<&str> = summary.reviews.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "a-same", "b-same", "old"]);
    }

    #[test]
    fn test_aggregate_is_repeatable() {
        let input = vec![review("x", 2.0, 3), review("y", 5.0, 1), review("z", 2.0, 2)];
        assert_eq!(aggregate(input.clone()), aggregate(input));
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(3.66666), 3.7);
        assert_eq!(round_to_tenth(2.25), 2.3);
        assert_eq!(round_to_tenth(4.0), 4.0);
        assert_eq!(round_to_tenth(1.04), 1.0);
        assert_eq!(round_to_tenth(0.05), 0.1);
        assert_eq!(round_to_tenth(-2.25), -2.3);
    }

    #[test]
    fn test_round_to_tenth_uses_exact_binary_value() {
        // Each literal sits just below its midpoint once stored as f64
        assert_eq!(round_to_tenth(3.65), 3.6);
        assert_eq!(round_to_tenth(1.45), 1.4);
        assert_eq!(round_to_tenth(1.15), 1.1);
        assert_eq!(round_to_tenth(0.35), 0.3);
        // and this one just above
        assert_eq!(round_to_tenth(4.45), 4.5);
    }

    #[test]
    fn test_mean_of_twenty_integer_ratings() {
        let mut input: Vec<Review> = (0..13).map(|i| review(&format!("four-{i}"), 4.0, i)).collect();
        input.extend((0..7).map(|i| review(&format!("three-{i}"), 3.0, i)));

        let summary = aggregate(input);
        assert_eq!(summary.average_rating, 3.6);
        assert_eq!(summary.reviews.len(), 20);
        assert_eq!(summary.reviews[12].rating, 4.0);
        assert_eq!(summary.reviews[13].rating, 3.0);
    }
}
