//! Statistical refinement (BEN).
//!
//! Tracks the `t`-sized sub-combinations of the failing inputs. Every
//! component (parameter/value pair) gets a suspiciousness score from how
//! often it shows up in failing inputs, in executed inputs and among the
//! suspicious combinations:
//!
//! ```text
//! s(c) = (failed(c) / failed_inputs + failed(c) / executed(c) + suspicious(c) / |S|) / 3
//! ```
//!
//! Candidates are ranked by their own average suspiciousness (descending)
//! combined with the least suspicious environment they were executed in
//! (ascending). For the top candidates a new input is built that keeps the
//! candidate and fills the rest with the least suspicious values.
//!
//! The final answer is ranked strength by strength: all reduced
//! combinations with one set parameter first, then two, and so on.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use weave_model::checker::ConstraintChecker;
use weave_model::combination::{contains, number_of_set_parameters, sub_combinations_of_size};
use weave_model::group::FaultCharacterizationConfiguration;
use weave_model::{Combination, TestModel, TestResults, NO_VALUE};

use crate::reducer::collapse;
use crate::suspicious::SuspiciousSet;
use crate::{CharacterizationError, FaultCharacterizationAlgorithm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenConfig {
    /// Upper bound on new inputs per round.
    pub combinations_per_step: usize,
    /// Perturbations tried per candidate before giving up on it.
    pub max_generation_attempts: usize,
    /// Refinement rounds before the current suspicious set is final.
    pub max_iterations: usize,
    /// Seed for the perturbation RNG.
    pub seed: u64,
}

impl Default for BenConfig {
    fn default() -> Self {
        Self {
            combinations_per_step: 10,
            max_generation_attempts: 50,
            max_iterations: 20,
            seed: 42,
        }
    }
}

impl BenConfig {
    pub fn validate(&self) -> Result<(), CharacterizationError> {
        let bounds = [
            ("combinations_per_step", self.combinations_per_step),
            ("max_generation_attempts", self.max_generation_attempts),
            ("max_iterations", self.max_iterations),
        ];
        for (name, value) in bounds {
            if value == 0 {
                return Err(CharacterizationError::InvalidConfiguration(format!(
                    "{name} must be positive"
                )));
            }
        }
        Ok(())
    }
}

type Suspiciousness = HashMap<(usize, i32), f64>;

fn zero_safe_division(value: f64, divisor: f64) -> f64 {
    if divisor == 0.0 {
        0.0
    } else {
        value / divisor
    }
}

#[derive(Debug)]
pub struct Ben {
    model: TestModel,
    checker: Arc<dyn ConstraintChecker>,
    config: BenConfig,
    round: u64,
    end_in_next_iteration: bool,
    suspicious: SuspiciousSet,
}

impl Ben {
    pub fn new(
        configuration: &FaultCharacterizationConfiguration,
        config: BenConfig,
    ) -> Result<Self, CharacterizationError> {
        config.validate()?;
        Ok(Self {
            model: configuration.model.clone(),
            checker: Arc::clone(&configuration.checker),
            config,
            round: 0,
            end_in_next_iteration: false,
            suspicious: SuspiciousSet::default(),
        })
    }

    fn should_continue(&self) -> bool {
        !self.suspicious.stabilized()
            && !self.end_in_next_iteration
            && self.round < self.config.max_iterations as u64
            && self.model.strength() < self.model.number_of_parameters()
    }

    /// Every round draws from its own stream, so a seed and a sequence of
    /// results always produce the same inputs.
    fn round_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(self.round))
    }

    fn component_suspiciousness(&self, suspicious: &BTreeSet<Combination>) -> Suspiciousness {
        let mut failed_appearances: HashMap<(usize, i32), usize> = HashMap::new();
        let mut test_appearances: HashMap<(usize, i32), usize> = HashMap::new();
        let mut combination_appearances: HashMap<(usize, i32), usize> = HashMap::new();
        let mut failed_inputs = 0usize;

        for (input, result) in &self.suspicious.history {
            let failed = result.is_unsuccessful();
            for (parameter, &value) in input.iter().enumerate() {
                *test_appearances.entry((parameter, value)).or_default() += 1;
                if failed {
                    *failed_appearances.entry((parameter, value)).or_default() += 1;
                }
            }
            if failed {
                failed_inputs += 1;
            }
        }
        for combination in suspicious {
            for (parameter, &value) in combination.iter().enumerate() {
                if value != NO_VALUE {
                    *combination_appearances.entry((parameter, value)).or_default() += 1;
                }
            }
        }

        let mut scores = Suspiciousness::new();
        for (parameter, &size) in self.model.parameter_sizes().iter().enumerate() {
            for value in 0..size as i32 {
                let key = (parameter, value);
                let failed = failed_appearances.get(&key).copied().unwrap_or(0) as f64;
                let tested = test_appearances.get(&key).copied().unwrap_or(0) as f64;
                let listed = combination_appearances.get(&key).copied().unwrap_or(0) as f64;
                let score = (zero_safe_division(failed, failed_inputs as f64)
                    + zero_safe_division(failed, tested)
                    + zero_safe_division(listed, suspicious.len() as f64))
                    / 3.0;
                scores.insert(key, score);
            }
        }
        scores
    }

    /// Candidates ordered by the sum of their two rank positions.
    fn ranking(&self, scores: &Suspiciousness, suspicious: &BTreeSet<Combination>) -> Vec<Combination> {
        let candidates: Vec<&Combination> = suspicious.iter().collect();

        let own: Vec<f64> = candidates
            .iter()
            .map(|c| average(scores, c.iter().enumerate().filter(|(_, v)| **v != NO_VALUE)))
            .collect();
        let environment: Vec<f64> = candidates
            .iter()
            .map(|c| self.minimum_environment_average(scores, c))
            .collect();

        let mut by_own: Vec<usize> = (0..candidates.len()).collect();
        by_own.sort_by(|a, b| own[*b].total_cmp(&own[*a]));
        let mut by_environment: Vec<usize> = (0..candidates.len()).collect();
        by_environment.sort_by(|a, b| environment[*a].total_cmp(&environment[*b]));

        let mut rank_sum = vec![0usize; candidates.len()];
        for (position, &index) in by_own.iter().enumerate() {
            rank_sum[index] += position;
        }
        for (position, &index) in by_environment.iter().enumerate() {
            rank_sum[index] += position;
        }

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by_key(|&index| rank_sum[index]);
        order.into_iter().map(|index| candidates[index].clone()).collect()
    }

    /// Lowest average suspiciousness of the free positions over all
    /// executed inputs containing `combination`.
    fn minimum_environment_average(&self, scores: &Suspiciousness, combination: &[i32]) -> f64 {
        self.suspicious
            .history
            .keys()
            .filter(|input| contains(input, combination))
            .map(|input| {
                average(
                    scores,
                    input
                        .iter()
                        .enumerate()
                        .filter(|(parameter, _)| combination[*parameter] == NO_VALUE),
                )
            })
            .fold(f64::MAX, f64::min)
    }

    /// Values of every parameter, least suspicious first.
    fn value_ranking(&self, scores: &Suspiciousness) -> Vec<Vec<i32>> {
        self.model
            .parameter_sizes()
            .iter()
            .enumerate()
            .map(|(parameter, &size)| {
                let mut values: Vec<i32> = (0..size as i32).collect();
                values.sort_by(|a, b| scores[&(parameter, *a)].total_cmp(&scores[&(parameter, *b)]));
                values
            })
            .collect()
    }

    fn new_input_for(
        &self,
        candidate: &[i32],
        value_ranking: &[Vec<i32>],
        rng: &mut impl Rng,
    ) -> Option<Combination> {
        let environment: Vec<usize> = (0..candidate.len())
            .filter(|&p| candidate[p] == NO_VALUE)
            .collect();
        let mut input: Combination = candidate
            .iter()
            .enumerate()
            .map(|(p, &v)| if v == NO_VALUE { value_ranking[p][0] } else { v })
            .collect();

        let unusable = |input: &Combination| {
            self.suspicious.history.contains_key(input) || !self.checker.is_valid(input)
        };

        let mut attempts = 0;
        while attempts < self.config.max_generation_attempts && !environment.is_empty() && unusable(&input) {
            let parameter = environment[rng.gen_range(0..environment.len())];
            let ranking = &value_ranking[parameter];
            let position = ranking
                .iter()
                .position(|&v| v == input[parameter])
                .unwrap_or(0);
            input[parameter] = ranking[(position + 1) % ranking.len()];
            attempts += 1;
        }

        if unusable(&input) {
            None
        } else {
            Some(input)
        }
    }

    fn generate(&mut self) -> Vec<Combination> {
        let current = self.suspicious.current.clone();
        let scores = self.component_suspiciousness(&current);
        let ranking = self.ranking(&scores, &current);
        let value_ranking = self.value_ranking(&scores);
        let mut rng = self.round_rng();
        self.round += 1;

        let mut inputs = Vec::new();
        for candidate in ranking.iter().take(self.config.combinations_per_step) {
            match self.new_input_for(candidate, &value_ranking, &mut rng) {
                Some(input) => inputs.push(input),
                None => self.end_in_next_iteration = true,
            }
        }
        inputs
    }
}

fn average<'a>(scores: &Suspiciousness, components: impl Iterator<Item = (usize, &'a i32)>) -> f64 {
    let (sum, count) = components.fold((0.0, 0.0), |(sum, count), (parameter, &value)| {
        (sum + scores.get(&(parameter, value)).copied().unwrap_or(0.0), count + 1.0)
    });
    zero_safe_division(sum, count)
}

impl FaultCharacterizationAlgorithm for Ben {
    fn compute_next_test_inputs(
        &mut self,
        results: &TestResults,
    ) -> Result<Vec<Combination>, CharacterizationError> {
        let strength = self.model.strength();
        self.suspicious
            .absorb(&self.model, results, |input| sub_combinations_of_size(input, strength))?;
        debug!(
            round = self.round,
            suspicious = self.suspicious.current.len(),
            "ben round"
        );

        if !self.should_continue() {
            return Ok(Vec::new());
        }
        let candidates = self.generate();
        Ok(self.suspicious.unexecuted(candidates))
    }

    /// The reduced suspicious set, lowest strength first and most
    /// suspicious first within a strength.
    fn compute_failure_inducing_combinations(&self) -> Vec<Combination> {
        let reduced = collapse(self.model.parameter_sizes(), self.suspicious.current.clone());
        if reduced.is_empty() {
            return Vec::new();
        }
        let scores = self.component_suspiciousness(&reduced);

        let mut layers: BTreeMap<usize, BTreeSet<Combination>> = BTreeMap::new();
        for combination in reduced {
            layers
                .entry(number_of_set_parameters(&combination))
                .or_default()
                .insert(combination);
        }
        layers
            .values()
            .flat_map(|layer| self.ranking(&scores, layer))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_model::checker::NoConstraintChecker;
    use weave_model::TestResult;

    fn ben(strength: usize, sizes: Vec<usize>) -> Ben {
        configured(strength, sizes, BenConfig::default())
    }

    fn configured(strength: usize, sizes: Vec<usize>, config: BenConfig) -> Ben {
        let model = TestModel::new(strength, sizes, vec![], vec![]).unwrap();
        Ben::new(
            &FaultCharacterizationConfiguration::new(model, Arc::new(NoConstraintChecker)),
            config,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_zero_bounds() {
        let model = TestModel::new(1, vec![2], vec![], vec![]).unwrap();
        let configuration = FaultCharacterizationConfiguration::new(model, Arc::new(NoConstraintChecker));
        let config = BenConfig {
            combinations_per_step: 0,
            ..BenConfig::default()
        };
        assert!(matches!(
            Ben::new(&configuration, config),
            Err(CharacterizationError::InvalidConfiguration(_))
        ));

        let no_rounds = BenConfig {
            max_iterations: 0,
            ..BenConfig::default()
        };
        match no_rounds.validate() {
            Err(CharacterizationError::InvalidConfiguration(message)) => {
                assert!(message.contains("max_iterations"), "{message}")
            }
            other => panic!("expected an invalid configuration, got {other:?}"),
        }
        assert!(BenConfig::default().validate().is_ok());
    }

    #[test]
    fn test_stops_after_max_iterations() {
        let two_rounds = |max_iterations: usize| {
            let config = BenConfig {
                combinations_per_step: 1,
                max_iterations,
                ..BenConfig::default()
            };
            let mut algorithm = configured(1, vec![3, 3, 3, 3], config);
            let first = TestResults::from([
                (vec![0, 0, 0, 0], TestResult::failed("x")),
                (vec![1, 1, 1, 1], TestResult::Pass),
            ]);
            let next = algorithm.compute_next_test_inputs(&first).unwrap();
            assert_eq!(next.len(), 1);
            let second: TestResults = next.into_iter().map(|input| (input, TestResult::Pass)).collect();
            algorithm.compute_next_test_inputs(&second).unwrap()
        };

        assert!(!two_rounds(20).is_empty());
        assert!(two_rounds(1).is_empty());
    }

    #[test]
    fn test_rounds_draw_distinct_streams() {
        let mut algorithm = ben(1, vec![2]);
        let draw = |algorithm: &Ben| -> Vec<u32> {
            let mut rng = algorithm.round_rng();
            (0..4).map(|_| rng.gen()).collect()
        };
        let first = draw(&algorithm);
        assert_eq!(first, draw(&algorithm));
        algorithm.round += 1;
        assert_ne!(first, draw(&algorithm));
    }

    #[test]
    fn test_new_inputs_keep_candidates_and_are_fresh() {
        let mut algorithm = ben(1, vec![2, 2, 2]);
        let results = TestResults::from([
            (vec![0, 0, 0], TestResult::failed("x")),
            (vec![1, 1, 1], TestResult::Pass),
        ]);
        let next = algorithm.compute_next_test_inputs(&results).unwrap();
        assert!(!next.is_empty());
        for input in &next {
            assert!(!results.contains_key(input));
            // Every new input keeps at least one suspicious component of the failure.
            assert!(input.iter().any(|&v| v == 0));
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let results = TestResults::from([
            (vec![0, 1, 0, 1], TestResult::failed("x")),
            (vec![1, 0, 1, 0], TestResult::Pass),
        ]);
        let mut a = ben(2, vec![2, 2, 2, 2]);
        let mut b = ben(2, vec![2, 2, 2, 2]);
        assert_eq!(
            a.compute_next_test_inputs(&results).unwrap(),
            b.compute_next_test_inputs(&results).unwrap()
        );
    }

    #[test]
    fn test_ranking_prefers_failure_only_components() {
        let mut algorithm = ben(1, vec![2, 2]);
        let results = TestResults::from([
            (vec![0, 0], TestResult::failed("x")),
            (vec![1, 0], TestResult::Pass),
        ]);
        algorithm.compute_next_test_inputs(&results).unwrap();
        // (-, 0) was cleared by the passing input; only (0, -) remains.
        assert_eq!(
            algorithm.compute_failure_inducing_combinations(),
            vec![vec![0, NO_VALUE]]
        );
    }

    #[test]
    fn test_lower_strengths_ranked_first() {
        let mut algorithm = ben(2, vec![2, 2, 2]);
        let results = TestResults::from([
            (vec![0, 0, 0], TestResult::failed("x")),
            (vec![0, 1, 0], TestResult::failed("x")),
        ]);
        algorithm.compute_next_test_inputs(&results).unwrap();

        // (0, 0, -) and (0, 1, -) collapse to (0, -, -), likewise (-, -, 0).
        let found = algorithm.compute_failure_inducing_combinations();
        assert_eq!(found.len(), 3);
        let strengths: Vec<usize> = found.iter().map(|c| number_of_set_parameters(c)).collect();
        assert_eq!(strengths, vec![1, 1, 2]);
        assert_eq!(found[2], vec![0, NO_VALUE, 0]);
    }
}
