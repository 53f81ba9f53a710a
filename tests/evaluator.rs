use std::path::Path;

use mddag::prelude::*;



fn three_class_sample() -> Sample {
    let rows = (0..20_usize)
        .map(|i| {
            let x = i as f64;
            vec![x / 10.0, (x - 10.0) / 5.0, (i % 3) as f64]
        })
        .collect::<Vec<_>>();
    let targets = (0..20).map(|i| i % 3).collect::<Vec<_>>();
    Sample::from_rows(&rows, &targets, 3)
}


fn five_stump_ensemble() -> Ensemble<Stump> {
    let stumps = vec![
        Stump::new(0, 0.5, vec![1, -1, -1]).with_alpha(1.0),
        Stump::new(1, 0.0, vec![-1, 1, -1]).with_alpha(0.8),
        Stump::new(2, 1.0, vec![-1, -1, 1]).with_alpha(0.6),
        Stump::new(0, 1.2, vec![1, 1, -1]).with_alpha(0.4),
        Stump::new(1, -1.0, vec![-1, 1, 1]).with_alpha(0.2),
    ];
    Ensemble::from_hypotheses(stumps)
}


/// A policy that skips every round, so nothing is ever evaluated.
struct SkipPolicy;


impl Policy<Stump> for SkipPolicy {
    fn name(&self) -> &str {
        "Skip"
    }


    fn n_actions(&self) -> usize {
        3
    }


    fn n_stages(&self) -> usize {
        1
    }


    fn distribution(&self, _state: &[f64], _round: usize) -> Vec<f64> {
        vec![0.0, 1.0, 0.0]
    }


    fn train_stage(
        &mut self,
        _sample: &Sample,
        _trainer: &dyn EnsembleTrainer<Hypothesis = Stump>,
        _budget: usize,
    ) -> Result<f64, Error>
    {
        Ok(0.0)
    }


    fn save(&self, _path: &Path) -> Result<(), Error> {
        Ok(())
    }


    fn load(&mut self, _path: &Path) -> Result<usize, Error> {
        Ok(1)
    }
}


/// Tests for the sequential and parallel metric evaluators.
#[cfg(test)]
pub mod evaluator_tests {
    use super::*;
    #[test]
    fn parallel_walk_matches_the_sequential_walk() {
        let ensemble = five_stump_ensemble();
        let sample = three_class_sample();

        let evaluator = PolicyGateEvaluator::new(&ensemble, &sample)
            .reward(RewardRule::ZeroOne)
            .beta(0.1)
            .seed(42);

        let full = FullEvalPolicy::new(3);
        let random = RandomPolicy::new(3);
        let policies: [&dyn Policy<Stump>; 2] = [&full, &random];
        for policy in policies {
            let sequential = evaluator.evaluate(policy);
            let parallel = evaluator.evaluate_parallel(policy);

            assert_eq!(
                sequential.error_rate(),
                parallel.error_rate(),
            );
            assert_eq!(
                sequential.avg_reward(),
                parallel.avg_reward(),
            );
            assert_eq!(
                sequential.avg_evaluations(),
                parallel.avg_evaluations(),
            );

            let n_sample = sample.shape().0;
            for i in 0..n_sample {
                assert_eq!(sequential.margins(i), parallel.margins(i));
                assert_eq!(sequential.is_correct(i), parallel.is_correct(i));
                assert_eq!(sequential.evaluated(i), parallel.evaluated(i));
            }
        }
    }


    #[test]
    fn full_eval_walks_the_whole_ensemble() {
        let ensemble = five_stump_ensemble();
        let sample = three_class_sample();

        let result = PolicyGateEvaluator::new(&ensemble, &sample)
            .evaluate(&FullEvalPolicy::new(3));

        assert_eq!(result.avg_evaluations(), 5.0);
    }


    #[test]
    fn an_example_nothing_was_evaluated_on_is_an_error() {
        let ensemble = five_stump_ensemble();
        let sample = three_class_sample();

        let result = PolicyGateEvaluator::new(&ensemble, &sample)
            .evaluate(&SkipPolicy);

        assert_eq!(result.error_rate(), 1.0);
        assert_eq!(result.avg_evaluations(), 0.0);
        // All-zero margins reward exactly zero, and nothing was used.
        assert_eq!(result.avg_reward(), 0.0);
    }


    #[test]
    fn sampling_weights_cover_every_example() {
        let ensemble = five_stump_ensemble();
        let sample = three_class_sample();

        let result = PolicyGateEvaluator::new(&ensemble, &sample)
            .evaluate(&FullEvalPolicy::new(3));

        let weights = result.sampling_weights();
        assert_eq!(weights.len(), sample.shape().0);
        assert!(weights.iter().all(|w| *w > 0.0));
    }
}
