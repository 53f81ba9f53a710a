use mddag::state::{center_rewards, normalized_scores};



/// Tests for the reward centering applied to rollout rows.
#[cfg(test)]
pub mod center_tests {
    use super::*;
    #[test]
    fn centered_rewards_are_symmetric_around_zero() {
        let mut rewards = vec![1.0, 3.0, 2.0];
        let usable = center_rewards(&mut rewards);

        assert!(usable);
        assert_eq!(rewards, vec![-1.0, 1.0, 0.0]);

        let max = rewards.iter().cloned().fold(f64::MIN, f64::max);
        let min = rewards.iter().cloned().fold(f64::MAX, f64::min);
        assert!((max + min).abs() < 1e-12);
    }


    #[test]
    fn two_distinct_values_are_usable() {
        let mut rewards = vec![-0.4, -0.9];
        let usable = center_rewards(&mut rewards);

        assert!(usable);
        assert!((rewards[0] + rewards[1]).abs() < 1e-12);
    }


    #[test]
    fn all_equal_rewards_degenerate_to_zero() {
        let mut rewards = vec![0.7; 3];
        let usable = center_rewards(&mut rewards);

        assert!(!usable);
        assert!(rewards.iter().all(|r| *r == 0.0));
    }
}


/// Tests for the score normalization feeding the state builder.
#[cfg(test)]
pub mod normalize_tests {
    use super::*;
    #[test]
    fn round_zero_is_all_zero() {
        let scores = vec![5.0, -2.0, 3.0];
        let (normalized, sum) = normalized_scores(&scores, 0);

        assert_eq!(normalized, vec![0.0; 3]);
        assert_eq!(sum, 0.0);
    }


    #[test]
    fn two_class_scores_pass_through() {
        let scores = vec![0.4, -0.6];
        let (normalized, sum) = normalized_scores(&scores, 3);

        assert_eq!(normalized, scores);
        assert!((sum - 1.0).abs() < 1e-12);
    }


    #[test]
    fn multiclass_scores_divide_by_absolute_sum() {
        let scores = vec![1.0, -1.0, 2.0];
        let (normalized, sum) = normalized_scores(&scores, 3);

        assert_eq!(normalized, vec![0.25, -0.25, 0.5]);
        assert_eq!(sum, 4.0);
    }


    #[test]
    fn zero_sum_scores_pass_through() {
        let scores = vec![0.0, 0.0, 0.0];
        let (normalized, sum) = normalized_scores(&scores, 2);

        assert_eq!(normalized, scores);
        assert_eq!(sum, 0.0);
    }
}
