//! Display classification of scan records.
//!
//! Every classifier is an ordered list of [`Rule`]s evaluated top to bottom;
//! the first rule whose predicate holds decides the outcome. Order encodes
//! priority, so a rule list can be read (and tested) as a precedence table.

pub mod connection;
pub mod device;
pub mod signal;

/// A named predicate paired with the outcome it selects
pub struct Rule<I: ?Sized, O> {
    pub name: &'static str,
    predicate: fn(&I) -> bool,
    pub outcome: O,
}

impl<I: ?Sized, O> Rule<I, O> {
    pub fn new(name: &'static str, predicate: fn(&I) -> bool, outcome: O) -> Self {
        Self {
            name,
            predicate,
            outcome,
        }
    }

    pub fn matches(&self, input: &I) -> bool {
        (self.predicate)(input)
    }
}

/// Evaluate `rules` in order and return the first matching rule
pub fn first_match<'r, I: ?Sized, O>(rules: &'r [Rule<I, O>], input: &I) -> Option<&'r Rule<I, O>> {
    rules.iter().find(|rule| rule.matches(input))
}

/// True when `haystack` contains any of `needles`
pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_respects_order() {
        let rules: Vec<Rule<i32, &str>> = vec![
            Rule::new("negative", |n: &i32| *n < 0, "neg"),
            Rule::new("small", |n: &i32| *n < 10, "small"),
            Rule::new("any", |_: &i32| true, "big"),
        ];

        assert_eq!(first_match(&rules, &-3).map(|r| r.outcome), Some("neg"));
        assert_eq!(first_match(&rules, &3).map(|r| r.outcome), Some("small"));
        assert_eq!(first_match(&rules, &30).map(|r| r.name), Some("any"));
    }

    #[test]
    fn test_first_match_none() {
        let rules: Vec<Rule<str, u8>> = vec![Rule::new("empty", |s: &str| s.is_empty(), 1)];
        assert!(first_match(&rules, "x").is_none());
    }
}
