//! Scoring for the site feedback survey. Every derived field of a feedback
//! record is a pure function of the submitted answers and a
//! [`SentimentScorer`].

mod sentiment;

pub use sentiment::{KeywordSentiment, SentimentScorer};

use std::sync::Arc;

use crate::models::feedback::{Satisfaction, SubmitFeedback, WouldRecommend};

pub const MAX_POSSIBLE_SCORE: i32 = 165;

/// Wrapper type for Actix-web app data
pub type ScorerData = Arc<dyn SentimentScorer>;

const STAR_WEIGHT: f64 = 0.35;
const CHOICE_WEIGHT: f64 = 0.35;
const SENTIMENT_WEIGHT: f64 = 0.3;

/// Derived scores stored alongside a feedback record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackScores {
    pub sentiment_score: f64,
    pub total_score: i32,
    pub max_possible_score: i32,
    pub average_rating: f64,
}

impl FeedbackScores {
    pub fn compute(input: &SubmitFeedback, scorer: &dyn SentimentScorer) -> Self {
        let sentiment = scorer.score(&input.texts());
        Self {
            sentiment_score: sentiment,
            total_score: total_score(input, sentiment),
            max_possible_score: MAX_POSSIBLE_SCORE,
            average_rating: average_rating(input, sentiment),
        }
    }
}

impl WouldRecommend {
    fn points(self) -> i32 {
        match self {
            WouldRecommend::Definitely => 20,
            WouldRecommend::Probably => 15,
            WouldRecommend::NotSure => 10,
            WouldRecommend::ProbablyNot => 5,
            WouldRecommend::DefinitelyNot => 0,
        }
    }

    fn stars(self) -> f64 {
        match self {
            WouldRecommend::Definitely => 5.0,
            WouldRecommend::Probably => 4.0,
            WouldRecommend::NotSure => 3.0,
            WouldRecommend::ProbablyNot => 2.0,
            WouldRecommend::DefinitelyNot => 1.0,
        }
    }
}

impl Satisfaction {
    fn points(self) -> i32 {
        match self {
            Satisfaction::VerySatisfied => 20,
            Satisfaction::Satisfied => 15,
            Satisfaction::Neutral => 10,
            Satisfaction::Unsatisfied => 5,
            Satisfaction::VeryUnsatisfied => 0,
        }
    }

    fn stars(self) -> f64 {
        match self {
            Satisfaction::VerySatisfied => 5.0,
            Satisfaction::Satisfied => 4.0,
            Satisfaction::Neutral => 3.0,
            Satisfaction::Unsatisfied => 2.0,
            Satisfaction::VeryUnsatisfied => 1.0,
        }
    }
}

fn total_score(input: &SubmitFeedback, sentiment: f64) -> i32 {
    let ratings: i32 = input.ratings().iter().map(|r| r * 4).sum();
    let choices = input.would_recommend.map_or(0, WouldRecommend::points)
        + input.overall_satisfaction.map_or(0, Satisfaction::points);
    (f64::from(ratings + choices) + sentiment * 5.0).round_ties_even() as i32
}

fn average_rating(input: &SubmitFeedback, sentiment: f64) -> f64 {
    let stars: Vec<f64> = input
        .ratings()
        .iter()
        .filter(|r| **r > 0)
        .map(|r| f64::from(*r))
        .collect();
    let stars_avg = mean(&stars);

    let choices: Vec<f64> = [
        input.would_recommend.map(WouldRecommend::stars),
        input.overall_satisfaction.map(Satisfaction::stars),
    ]
    .into_iter()
    .flatten()
    .collect();
    let choice_avg = mean(&choices);

    let mut weighted = 0.0;
    let mut weights = 0.0;
    for (value, weight) in [
        (stars_avg, STAR_WEIGHT),
        (choice_avg, CHOICE_WEIGHT),
        (sentiment, SENTIMENT_WEIGHT),
    ] {
        if value > 0.0 {
            weighted += value * weight;
            weights += weight;
        }
    }

    if weights == 0.0 {
        return 0.0;
    }
    round_to(weighted / weights, 2)
}

/// Share of the maximum score reached, in percent with one decimal.
pub fn score_percentage(total: i32, max: i32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    round_to(f64::from(total) * 100.0 / f64::from(max), 1)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl SentimentScorer for Fixed {
        fn score(&self, _texts: &[&str]) -> f64 {
            self.0
        }
    }

    fn answers() -> SubmitFeedback {
        SubmitFeedback {
            subject: "Site".to_string(),
            message: "Works".to_string(),
            site_design_rating: 5,
            usability_rating: 4,
            content_rating: 3,
            speed_rating: 0,
            would_recommend: Some(WouldRecommend::Probably),
            overall_satisfaction: Some(Satisfaction::Satisfied),
            ..Default::default()
        }
    }

    #[test]
    fn total_score_adds_every_component() {
        let scores = FeedbackScores::compute(&answers(), &Fixed(2.5));
        // 4 * (5 + 4 + 3 + 0) + 2.5 * 5 + 15 + 15 = 90.5, halves to even
        assert_eq!(scores.total_score, 90);
        assert_eq!(scores.max_possible_score, MAX_POSSIBLE_SCORE);
        assert_eq!(scores.sentiment_score, 2.5);
    }

    #[test]
    fn average_ignores_unrated_questions() {
        let scores = FeedbackScores::compute(&answers(), &Fixed(2.5));
        // stars 4.0, choices 4.0, sentiment 2.5
        assert_eq!(scores.average_rating, 3.55);
    }

    #[test]
    fn average_with_only_sentiment() {
        let input = SubmitFeedback {
            subject: "s".to_string(),
            message: "m".to_string(),
            ..Default::default()
        };
        let scores = FeedbackScores::compute(&input, &Fixed(3.2));
        assert_eq!(scores.average_rating, 3.2);
    }

    #[test]
    fn average_is_zero_when_nothing_contributes() {
        let input = SubmitFeedback::default();
        let scores = FeedbackScores::compute(&input, &Fixed(0.0));
        assert_eq!(scores.average_rating, 0.0);
    }

    #[test]
    fn percentage_of_max() {
        assert_eq!(score_percentage(90, 165), 54.5);
        assert_eq!(score_percentage(10, 0), 0.0);
    }
}
