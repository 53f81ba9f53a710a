use std::env;
use std::fs;

use mddag::prelude::*;



/// A two-class sample whose first feature separates the classes.
fn two_class_sample(n: usize, shift: f64) -> Sample {
    let rows = (0..n)
        .map(|i| {
            let x = (i as f64 + shift) / n as f64;
            vec![x, 1.0 - x, x * x]
        })
        .collect::<Vec<_>>();
    let targets = rows.iter()
        .map(|row| usize::from(row[0] >= 0.5))
        .collect::<Vec<_>>();
    Sample::from_rows(&rows, &targets, 2)
}


/// The gated ensemble: five stumps over the two-class sample.
fn gated_ensemble() -> Ensemble<Stump> {
    let stumps = vec![
        Stump::new(0, 0.5, vec![-1, 1]).with_alpha(1.0),
        Stump::new(1, 0.3, vec![1, -1]).with_alpha(0.7),
        Stump::new(2, 0.1, vec![-1, 1]).with_alpha(0.5),
        Stump::new(0, 0.7, vec![-1, 1]).with_alpha(0.4),
        Stump::new(1, 0.6, vec![1, -1]).with_alpha(0.3),
    ];
    Ensemble::from_hypotheses(stumps)
}


/// Tests for the outer rollout/train/evaluate loop.
#[cfg(test)]
pub mod mddag_tests {
    use super::*;
    #[test]
    fn one_stage_montecarlo_run() {
        let train = two_class_sample(40, 0.0);
        let test = two_class_sample(20, 0.3);
        let ensemble = gated_ensemble();
        let out_dir = env::temp_dir().join("mddag_e2e");

        let mddag = Mddag::init(&ensemble, &train)
            .test_sample(&test)
            .strategy(RolloutStrategy::MonteCarlo)
            .reward(RewardRule::ZeroOne)
            .rollouts(200)
            .beta(0.1)
            .stages(1)
            .policy_budget(10)
            .seed(7)
            .out_dir(&out_dir);

        let trainer = AdaBoostMH::new(StumpLearner::new());
        let policy = mddag.run(&trainer).unwrap();

        let result = PolicyGateEvaluator::new(&ensemble, &test)
            .reward(RewardRule::ZeroOne)
            .beta(0.1)
            .state_space(StateSpace::Margins { summary: true })
            .seed(7)
            .evaluate(policy.as_ref());

        assert!(result.avg_evaluations() <= 5.0);
        assert!((0.0..=1.0).contains(&result.error_rate()));

        // The stage record landed in the step file,
        // with a training error in [0, 1].
        let steps = fs::read_to_string(out_dir.join("steps.csv")).unwrap();
        let record = steps.lines().nth(1).expect("one stage record");
        let policy_error = record.split(',')
            .nth(1)
            .unwrap()
            .parse::<f64>()
            .unwrap();
        assert!((0.0..=1.0).contains(&policy_error));

        // The policy checkpoint was persisted.
        assert!(out_dir.join("policy_1.json").exists());
    }


    #[test]
    fn resumed_run_restarts_at_the_recorded_stage() {
        let train = two_class_sample(30, 0.0);
        let ensemble = gated_ensemble();
        let out_dir = env::temp_dir().join("mddag_resume");

        let trainer = AdaBoostMH::new(StumpLearner::new());

        let first = Mddag::init(&ensemble, &train)
            .strategy(RolloutStrategy::Uniform)
            .rollouts(60)
            .stages(1)
            .policy_budget(5)
            .policy_decay(0.5)
            .seed(3)
            .out_dir(&out_dir);
        let policy = first.run(&trainer).unwrap();
        assert_eq!(policy.n_stages(), 1);

        // Resume from the stage-1 checkpoint and run one more stage.
        let second = Mddag::init(&ensemble, &train)
            .strategy(RolloutStrategy::Uniform)
            .rollouts(60)
            .stages(2)
            .policy_budget(5)
            .policy_decay(0.5)
            .seed(3)
            .out_dir(&out_dir)
            .resume(out_dir.join("policy_1.json"));
        let resumed = second.run(&trainer).unwrap();
        assert_eq!(resumed.n_stages(), 2);
    }


    #[test]
    fn full_rollouts_reject_a_cascaded_policy() {
        let train = two_class_sample(10, 0.0);
        let ensemble = gated_ensemble();

        let mddag = Mddag::init(&ensemble, &train)
            .strategy(RolloutStrategy::Full)
            .policy_decay(0.5)
            .out_dir(env::temp_dir().join("mddag_reject"));

        let trainer = AdaBoostMH::new(StumpLearner::new());
        let result = mddag.run(&trainer);
        assert!(matches!(result, Err(Error::Config(_))));
    }


    #[test]
    fn a_missing_resume_checkpoint_is_fatal() {
        let train = two_class_sample(10, 0.0);
        let ensemble = gated_ensemble();

        let mddag = Mddag::init(&ensemble, &train)
            .out_dir(env::temp_dir().join("mddag_missing"))
            .resume(env::temp_dir().join("mddag_no_such_checkpoint.json"));

        let trainer = AdaBoostMH::new(StumpLearner::new());
        let result = mddag.run(&trainer);
        assert!(matches!(result, Err(Error::Checkpoint(_))));
    }
}
