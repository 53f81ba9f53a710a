use std::collections::HashSet;
use std::env;
use std::fs;

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


/// Tests for the rollout sampler and its batch format.
#[cfg(test)]
pub mod rollout_tests {
    use super::*;
    #[test]
    fn strategy_names_parse() {
        assert_eq!(
            "montecarlo".parse::<RolloutStrategy>().unwrap(),
            RolloutStrategy::MonteCarlo,
        );
        assert_eq!(
            "szatymaz".parse::<RolloutStrategy>().unwrap(),
            RolloutStrategy::Uniform,
        );
        assert_eq!(
            "badszatymaz".parse::<RolloutStrategy>().unwrap(),
            RolloutStrategy::Biased,
        );
        assert_eq!(
            "full".parse::<RolloutStrategy>().unwrap(),
            RolloutStrategy::Full,
        );
        assert_eq!(
            "oneshot".parse::<RolloutStrategy>().unwrap(),
            RolloutStrategy::OneShot,
        );
        assert!("exhaustive".parse::<RolloutStrategy>().is_err());
    }


    #[test]
    fn full_enumeration_visits_every_pair_at_most_once() {
        let ensemble = five_stump_ensemble();
        let sample = three_class_sample();
        let policy = RandomPolicy::new(3);

        let batch = RolloutSampler::new(&ensemble, &sample, &policy)
            .strategy(RolloutStrategy::Full)
            .seed(3)
            .run()
            .unwrap();

        assert!(batch.len() <= 20 * 5);

        let mut seen = HashSet::new();
        for row in batch.rows() {
            assert!(seen.insert((row.example, row.round)));
            assert_eq!(row.rewards.len(), 3);
        }

        // The batch is ordered by sample index, not completion order.
        let ordered = batch.rows()
            .windows(2)
            .all(|w| {
                let a = w[0].example * 5 + w[0].round;
                let b = w[1].example * 5 + w[1].round;
                a < b
            });
        assert!(ordered);
    }


    #[test]
    fn one_shot_emits_at_most_one_row_per_example() {
        let ensemble = five_stump_ensemble();
        let sample = three_class_sample();
        let policy = RandomPolicy::new(3);

        let batch = RolloutSampler::new(&ensemble, &sample, &policy)
            .strategy(RolloutStrategy::OneShot)
            .seed(17)
            .run()
            .unwrap();

        assert!(batch.len() <= 20);

        let mut seen = HashSet::new();
        for row in batch.rows() {
            assert!(seen.insert(row.example));
        }
    }


    #[test]
    fn seeded_sampling_is_reproducible() {
        let ensemble = five_stump_ensemble();
        let sample = three_class_sample();
        let policy = RandomPolicy::new(3);

        let run = || {
            RolloutSampler::new(&ensemble, &sample, &policy)
                .strategy(RolloutStrategy::Uniform)
                .rollouts(50)
                .seed(9)
                .run()
                .unwrap()
        };
        let first = run();
        let second = run();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.rows().iter().zip(second.rows()) {
            assert_eq!(a.example, b.example);
            assert_eq!(a.round, b.round);
            assert_eq!(a.state, b.state);
            assert_eq!(a.rewards, b.rewards);
        }
    }


    #[test]
    fn emitted_rows_are_never_degenerate() {
        let ensemble = five_stump_ensemble();
        let sample = three_class_sample();
        let policy = RandomPolicy::new(3);

        let batch = RolloutSampler::new(&ensemble, &sample, &policy)
            .strategy(RolloutStrategy::Uniform)
            .rollouts(100)
            .seed(23)
            .run()
            .unwrap();

        for row in batch.rows() {
            assert!(row.rewards.iter().any(|r| r.abs() > 0.0));
        }
    }


    #[test]
    fn batch_file_declares_states_and_actions() {
        let ensemble = five_stump_ensemble();
        let sample = three_class_sample();
        let policy = RandomPolicy::new(3);

        let batch = RolloutSampler::new(&ensemble, &sample, &policy)
            .strategy(RolloutStrategy::Uniform)
            .rollouts(30)
            .seed(41)
            .run()
            .unwrap();

        let path = env::temp_dir().join("mddag_rollout_batch.txt");
        batch.write(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("@RELATION mddagtrain"));
        assert!(contents.contains("@ATTRIBUTE f0 NUMERIC"));
        assert!(contents.contains("@ATTRIBUTE f2 NUMERIC"));
        assert!(contents.contains("@ATTRIBUTE class {0, 1, 2}"));

        let n_data = contents.lines()
            .skip_while(|line| *line != "@DATA")
            .skip(1)
            .filter(|line| !line.is_empty())
            .count();
        assert_eq!(n_data, batch.len());
    }
}
