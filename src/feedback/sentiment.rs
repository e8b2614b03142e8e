/// Scores the free-text answers of a survey on a 0..=5 scale.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, texts: &[&str]) -> f64;
}

const NEUTRAL: f64 = 2.5;
const KEYWORD_WEIGHT: f64 = 0.3;
const BASE_SHARE: f64 = 0.3;

const POSITIVE: &[&str] = &[
    "good", "great", "excellent", "awesome", "amazing", "wonderful", "love", "like", "helpful",
    "clear", "easy", "fast", "useful", "interesting", "convenient", "intuitive", "friendly",
    "recommend", "thank", "perfect", "enjoy", "pleasant", "fantastic",
];

const NEGATIVE: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "hate", "slow", "confusing", "difficult", "broken",
    "bug", "error", "crash", "annoying", "useless", "boring", "ugly", "problem", "complicated",
    "disappoint", "frustrat", "not recommend", "doesn't work",
];

/// Keyword counting: every occurrence of a listed word nudges the score
/// away from neutral, and the result is blended with the neutral base.
#[derive(Debug, Clone)]
pub struct KeywordSentiment {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl Default for KeywordSentiment {
    fn default() -> Self {
        Self::new(POSITIVE, NEGATIVE)
    }
}

impl KeywordSentiment {
    pub fn new(positive: &[&str], negative: &[&str]) -> Self {
        Self {
            positive: positive.iter().map(|w| w.to_lowercase()).collect(),
            negative: negative.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    fn occurrences(words: &[String], text: &str) -> usize {
        words.iter().map(|w| text.matches(w.as_str()).count()).sum()
    }
}

impl SentimentScorer for KeywordSentiment {
    fn score(&self, texts: &[&str]) -> f64 {
        let mut positive = 0;
        let mut negative = 0;
        let mut words = 0;

        for text in texts.iter().filter(|t| !t.trim().is_empty()) {
            let lower = text.to_lowercase();
            words += lower.split_whitespace().count();
            positive += Self::occurrences(&self.positive, &lower);
            negative += Self::occurrences(&self.negative, &lower);
        }

        if words == 0 {
            return NEUTRAL;
        }

        let adjusted = (NEUTRAL + KEYWORD_WEIGHT * (positive as f64 - negative as f64))
            .clamp(0.0, 5.0);
        super::round_to(NEUTRAL * BASE_SHARE + adjusted * (1.0 - BASE_SHARE), 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_answers_are_neutral() {
        let scorer = KeywordSentiment::default();
        assert_eq!(scorer.score(&["", "   "]), 2.5);
    }

    #[test]
    fn text_without_keywords_is_neutral() {
        let scorer = KeywordSentiment::new(&["good"], &["bad"]);
        assert_eq!(scorer.score(&["the lessons start at nine"]), 2.5);
    }

    #[test]
    fn positive_words_raise_the_score() {
        let scorer = KeywordSentiment::new(&["good"], &["bad"]);
        // adjusted = 2.5 + 0.3 * 2 = 3.1; 0.75 + 3.1 * 0.7 = 2.92
        assert_eq!(scorer.score(&["Good teacher, good pace"]), 2.92);
    }

    #[test]
    fn negative_words_lower_the_score() {
        let scorer = KeywordSentiment::new(&["good"], &["bad"]);
        // adjusted = 2.5 - 0.3 = 2.2; 0.75 + 2.2 * 0.7 = 2.29
        assert_eq!(scorer.score(&["bad audio"]), 2.29);
    }

    #[test]
    fn adjustment_is_clamped() {
        let scorer = KeywordSentiment::new(&["good"], &["bad"]);
        let text = "bad ".repeat(20);
        // adjusted clamps at 0; 0.75 + 0
        assert_eq!(scorer.score(&[&text]), 0.75);
    }
}
