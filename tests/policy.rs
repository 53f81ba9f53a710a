use std::env;

use rand::SeedableRng;
use rand::rngs::StdRng;

use mddag::prelude::*;



/// A trainer that ignores its sample and returns a fixed ensemble,
/// so stage outputs are hand-computable.
struct FixedTrainer {
    stumps: Vec<Stump>,
}


impl EnsembleTrainer for FixedTrainer {
    type Hypothesis = Stump;


    fn name(&self) -> &str {
        "Fixed"
    }


    fn train(&self, _sample: &Sample, _budget: usize)
        -> Result<Ensemble<Stump>, Error>
    {
        Ok(Ensemble::from_hypotheses(self.stumps.clone()))
    }
}


/// A rollout-shaped training sample:
/// three state features, three action classes.
fn rollout_like_sample() -> Sample {
    let rows = vec![
        vec![0.9, -0.3, 0.2],
        vec![0.1,  0.4, 0.8],
        vec![0.6,  0.6, 0.1],
        vec![0.2, -0.5, 0.7],
    ];
    let targets = vec![0, 1, 2, 1];
    Sample::from_rows(&rows, &targets, 3)
}


/// Tests for the policy hierarchy.
#[cfg(test)]
pub mod policy_tests {
    use super::*;
    #[test]
    fn saved_policy_reproduces_its_greedy_action() {
        let sample = rollout_like_sample();
        let trainer = FixedTrainer {
            stumps: vec![
                Stump::new(0, 0.4, vec![1, -1, -1]).with_alpha(0.7),
                Stump::new(1, 0.1, vec![-1, 1, 1]).with_alpha(0.3),
            ],
        };

        let mut policy = BoostedPolicy::<Stump>::new(3);
        policy.train_stage(&sample, &trainer, 2).unwrap();

        let path = env::temp_dir().join("mddag_policy_roundtrip.json");
        policy.save(&path).unwrap();

        let mut restored = BoostedPolicy::<Stump>::new(3);
        let stages = restored.load(&path).unwrap();
        assert_eq!(stages, 1);

        let state = vec![0.9, -0.3, 0.2];
        let mut rng_a = StdRng::seed_from_u64(0);
        let mut rng_b = StdRng::seed_from_u64(0);
        assert_eq!(
            policy.greedy_action(&state, 1, &mut rng_a),
            restored.greedy_action(&state, 1, &mut rng_b),
        );
    }


    #[test]
    fn cascade_aggregates_the_coefficient_weighted_stage_sum() {
        let sample = rollout_like_sample();
        let trainer_a = FixedTrainer {
            stumps: vec![
                Stump::new(0, 0.5, vec![1, -1, 1]).with_alpha(1.0),
            ],
        };
        let trainer_b = FixedTrainer {
            stumps: vec![
                Stump::new(1, 0.0, vec![-1, 1, -1]).with_alpha(0.5),
            ],
        };

        let mut cascade = CascadePolicy::<Stump>::new(0.5, 3);
        cascade.train_stage(&sample, &trainer_a, 1).unwrap();
        cascade.train_stage(&sample, &trainer_b, 1).unwrap();
        assert_eq!(cascade.n_stages(), 2);
        assert_eq!(cascade.coefficients(), &[0.5, 1.0]);

        // The same two stages, trained standalone.
        let mut stage_a = BoostedPolicy::<Stump>::new(3);
        stage_a.train_stage(&sample, &trainer_a, 1).unwrap();
        let mut stage_b = BoostedPolicy::<Stump>::new(3);
        stage_b.train_stage(&sample, &trainer_b, 1).unwrap();

        let state = vec![0.8, -0.1, 0.4];
        let dist_a = stage_a.distribution(&state, 2);
        let dist_b = stage_b.distribution(&state, 2);

        let aggregated = cascade.exploration_distribution(&state, 2);
        for action in 0..3 {
            let expected = 0.5 * dist_a[action] + dist_b[action];
            assert!((aggregated[action] - expected).abs() < 1e-12);
        }

        // The non-aggregated distribution is the newest stage only.
        assert_eq!(cascade.distribution(&state, 2), dist_b);
    }


    #[test]
    fn all_tied_forecast_breaks_ties_uniformly() {
        let policy = RandomPolicy::new(3);
        let mut rng = StdRng::seed_from_u64(11);

        let mut seen = [false; 3];
        for _ in 0..300 {
            let action = Policy::<Stump>::greedy_action(
                &policy, &[0.0, 0.0], 0, &mut rng,
            );
            seen[action.index()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }


    #[test]
    fn full_eval_always_evaluates() {
        let policy = FullEvalPolicy::new(3);
        let mut rng = StdRng::seed_from_u64(5);

        for round in 0..10 {
            let action = Policy::<Stump>::greedy_action(
                &policy, &[0.3, -0.3], round, &mut rng,
            );
            assert_eq!(action, Action::Evaluate);
        }
    }
}
