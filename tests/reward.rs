use mddag::prelude::*;



fn two_class_labels() -> Vec<Label> {
    vec![Label::positive(0), Label::negative(1)]
}


/// Tests for the reward rules.
#[cfg(test)]
pub mod reward_tests {
    use super::*;
    #[test]
    fn names_parse() {
        assert_eq!(
            "zeroone".parse::<RewardRule>().unwrap(),
            RewardRule::ZeroOne,
        );
        assert_eq!(
            "exp".parse::<RewardRule>().unwrap(),
            RewardRule::ExpLoss,
        );
        assert_eq!(
            "mcexp".parse::<RewardRule>().unwrap(),
            RewardRule::MultiExp,
        );
        assert!("logit".parse::<RewardRule>().is_err());
    }


    #[test]
    fn zero_one_rewards_a_winning_margin() {
        let labels = two_class_labels();

        // The positive class strictly beats the negative one.
        let margins = vec![2.0, 1.0];
        let reward = RewardRule::ZeroOne.evaluate(&margins, &labels, 2.0);
        assert_eq!(reward, 1.0);

        // An exact tie is not a win.
        let margins = vec![1.0, 1.0];
        let reward = RewardRule::ZeroOne.evaluate(&margins, &labels, 2.0);
        assert_eq!(reward, 0.0);

        // Neither is a loss.
        let margins = vec![0.5, 1.5];
        let reward = RewardRule::ZeroOne.evaluate(&margins, &labels, 2.0);
        assert_eq!(reward, 0.0);
    }


    #[test]
    fn all_zero_margins_reward_zero_under_every_rule() {
        let labels = two_class_labels();
        let margins = vec![0.0, 0.0];

        let rules = [
            RewardRule::ZeroOne,
            RewardRule::ExpLoss,
            RewardRule::MultiExp,
        ];
        for rule in rules {
            let reward = rule.evaluate(&margins, &labels, 3.0);
            assert_eq!(reward, 0.0, "{} on all-zero margins", rule.name());
        }
    }


    #[test]
    fn exp_loss_uses_the_binary_shortcut() {
        let labels = two_class_labels();
        let margins = vec![1.0, -1.0];

        let reward = RewardRule::ExpLoss.evaluate(&margins, &labels, 2.0);
        let expected = -(-1.0_f64 / 2.0).exp();
        assert!((reward - expected).abs() < 1e-12);
    }


    #[test]
    fn exp_loss_sums_over_classes_beyond_two() {
        let labels = vec![
            Label::positive(0),
            Label::negative(1),
            Label::negative(2),
        ];
        let margins = vec![2.0, -1.0, 0.5];
        let z = 4.0;

        let reward = RewardRule::ExpLoss.evaluate(&margins, &labels, z);
        let expected = -((-2.0_f64 / z).exp()
            + (-1.0_f64 / z).exp()
            + (0.5_f64 / z).exp());
        assert!((reward - expected).abs() < 1e-12);
    }


    #[test]
    fn multi_exp_uses_the_normalized_margin_gap() {
        let labels = vec![
            Label::positive(0),
            Label::negative(1),
            Label::negative(2),
        ];
        let margins = vec![2.0, 1.0, 0.0];
        let z = 2.0;

        // maxNeg = 1, minPos = 2.
        let reward = RewardRule::MultiExp.evaluate(&margins, &labels, z);
        let expected = -((1.0_f64 - 2.0) / z).exp();
        assert!((reward - expected).abs() < 1e-12);
    }


    #[test]
    fn penalty_charges_beta_per_evaluation() {
        let labels = two_class_labels();
        let margins = vec![2.0, 1.0];

        let reward = RewardRule::ZeroOne.penalized(
            &margins, &labels, 2.0, 3, 0.1,
        );
        assert!((reward - 0.7).abs() < 1e-12);
    }
}
