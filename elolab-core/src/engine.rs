//! Rating-engine contract and a reference implementation.
//!
//! The harness only relies on [`RatingEngine`]: one call per round that
//! updates the player's and the landmark's state in place. [`TimedElo`] is a
//! small stand-in so experiments run without the production engine; its
//! update rule is versioned and makes no claim about the real algorithm.

use crate::runner::Population;
use crate::types::{LandmarkState, PlayerState};

pub trait RatingEngine {
    /// Update both states after one round.
    ///
    /// Must change `rating` on both sides. Must leave `uncertainty` untouched
    /// when `test_mode` is set.
    fn calculate_elo(
        &mut self,
        player: &mut PlayerState,
        landmark: &mut LandmarkState,
        minutes_used: f64,
        time_limit_minutes: f64,
        correct: bool,
        test_mode: bool,
    );
}

/// Step size applied to the (uncertainty-weighted) surprise.
const DEFAULT_K_FACTOR: f64 = 0.5;
/// Rating difference that moves the expected score from 0.5 to ~0.73.
const DEFAULT_SCALE: f64 = 1.0;
/// Per-interaction multiplicative uncertainty decay outside test mode.
const DEFAULT_UNCERTAINTY_DECAY: f64 = 0.97;
const MIN_UNCERTAINTY: f64 = 0.05;

/// Logistic rating update with a time-weighted answer score.
#[derive(Debug, Clone)]
pub struct TimedElo {
    k_factor: f64,
    scale: f64,
    uncertainty_decay: f64,
    calls: u64,
}

impl Default for TimedElo {
    fn default() -> Self {
        TimedElo {
            k_factor: DEFAULT_K_FACTOR,
            scale: DEFAULT_SCALE,
            uncertainty_decay: DEFAULT_UNCERTAINTY_DECAY,
            calls: 0,
        }
    }
}

impl TimedElo {
    pub const VERSION: &'static str = "timed-elo/1";

    pub fn with_k_factor(k_factor: f64) -> Self {
        TimedElo {
            k_factor,
            ..Self::default()
        }
    }

    /// Factory matching the runner's engine-construction hook. The reference
    /// engine keeps no per-entity data, so the population is not consulted.
    pub fn for_population(_population: &Population) -> Self {
        Self::default()
    }

    /// Probability that the player identifies the landmark.
    pub fn expected_score(&self, player_rating: f64, landmark_rating: f64) -> f64 {
        1.0 / (1.0 + (-(player_rating - landmark_rating) / self.scale).exp())
    }

    /// 0 for a wrong answer; 1.0 down to 0.5 for a correct one as the used
    /// share of the limit goes from 0 to 1. A non-positive limit counts as fully used.
    pub fn answer_score(minutes_used: f64, time_limit_minutes: f64, correct: bool) -> f64 {
        if !correct {
            return 0.0;
        }
        let used = if time_limit_minutes > 0.0 {
            (minutes_used / time_limit_minutes).clamp(0.0, 1.0)
        } else {
            1.0
        };
        1.0 - 0.5 * used
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl RatingEngine for TimedElo {
    fn calculate_elo(
        &mut self,
        player: &mut PlayerState,
        landmark: &mut LandmarkState,
        minutes_used: f64,
        time_limit_minutes: f64,
        correct: bool,
        test_mode: bool,
    ) {
        self.calls += 1;

        let expected = self.expected_score(player.rating, landmark.rating);
        let surprise = Self::answer_score(minutes_used, time_limit_minutes, correct) - expected;

        player.rating += self.k_factor * player.uncertainty * surprise;
        landmark.rating -= self.k_factor * landmark.uncertainty * surprise;

        player.last_interaction = Some(self.calls);
        landmark.last_interaction = Some(self.calls);

        if !test_mode {
            player.uncertainty = (player.uncertainty * self.uncertainty_decay).max(MIN_UNCERTAINTY);
            landmark.uncertainty = (landmark.uncertainty * self.uncertainty_decay).max(MIN_UNCERTAINTY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RatingState;

    #[test]
    fn test_correct_answer_raises_player_and_lowers_landmark() {
        let mut engine = TimedElo::default();
        let mut player = RatingState::fresh("Expert", 0.5);
        let mut landmark = RatingState::fresh("Boole Library", 0.5);
        engine.calculate_elo(&mut player, &mut landmark, 2.0, 10.0, true, true);
        assert!(player.rating > 0.0);
        assert!(landmark.rating < 0.0);
        assert_eq!(player.last_interaction, Some(1));
    }

    #[test]
    fn test_wrong_answer_moves_the_other_way() {
        let mut engine = TimedElo::default();
        let mut player = RatingState::fresh("Novice", 0.5);
        let mut landmark = RatingState::fresh("Student Centre", 0.5);
        engine.calculate_elo(&mut player, &mut landmark, 12.0, 10.0, false, true);
        assert!(player.rating < 0.0);
        assert!(landmark.rating > 0.0);
    }

    #[test]
    fn test_test_mode_holds_uncertainty() {
        let mut engine = TimedElo::default();
        let mut player = RatingState::fresh("Average", 0.7);
        let mut landmark = RatingState::fresh("Geography Building", 0.7);
        for _ in 0..10 {
            engine.calculate_elo(&mut player, &mut landmark, 5.0, 10.0, true, true);
        }
        assert_eq!(player.uncertainty, 0.7);
        assert_eq!(landmark.uncertainty, 0.7);

        engine.calculate_elo(&mut player, &mut landmark, 5.0, 10.0, true, false);
        assert!(player.uncertainty < 0.7);
        assert!(landmark.uncertainty < 0.7);
        assert_eq!(engine.calls(), 11);
    }

    #[test]
    fn test_larger_uncertainty_takes_larger_steps() {
        let mut engine = TimedElo::default();
        let mut low = RatingState::fresh("Low", 0.1);
        let mut high = RatingState::fresh("High", 0.9);
        let mut lm_a = RatingState::fresh("A", 0.5);
        let mut lm_b = RatingState::fresh("B", 0.5);
        engine.calculate_elo(&mut low, &mut lm_a, 3.0, 10.0, true, true);
        engine.calculate_elo(&mut high, &mut lm_b, 3.0, 10.0, true, true);
        assert!(high.rating > low.rating);
    }

    #[test]
    fn test_answer_score_handles_zero_limit() {
        assert_eq!(TimedElo::answer_score(3.0, 0.0, true), 0.5);
        assert_eq!(TimedElo::answer_score(0.0, 10.0, true), 1.0);
        assert_eq!(TimedElo::answer_score(4.0, 10.0, false), 0.0);
    }
}
