//! Enumeration of action profiles.

/// Stateful cursor over every profile of a fixed game shape.
///
/// Profiles are produced in mixed-radix order with player 1 varying fastest
/// and player n slowest. The first call to [`next_profile`](Self::next_profile)
/// yields the all-ones profile. Not meant to be shared across threads; create
/// one per traversal.
#[derive(Debug, Clone)]
pub struct OutcomeIterator {
    num_actions: Vec<usize>,
    actions: Vec<usize>,
    first: bool,
}

impl OutcomeIterator {
    /// Create an iterator over the profiles of a game with these action counts.
    pub fn new(num_actions: &[usize]) -> Self {
        Self {
            num_actions: num_actions.to_vec(),
            actions: vec![1; num_actions.len()],
            first: true,
        }
    }

    /// Restart from the all-ones profile.
    pub fn reset(&mut self) {
        self.actions.iter_mut().for_each(|a| *a = 1);
        self.first = true;
    }

    /// The most recently produced profile.
    pub fn current(&self) -> &[usize] {
        &self.actions
    }

    /// True until every dimension has reached its maximum.
    pub fn has_next(&self) -> bool {
        if self.num_actions.iter().any(|&n| n == 0) {
            return false;
        }
        if self.first {
            return true;
        }
        self.actions
            .iter()
            .zip(&self.num_actions)
            .any(|(&a, &n)| a < n)
    }

    /// Advance and return the next profile, or `None` once exhausted.
    pub fn next_profile(&mut self) -> Option<&[usize]> {
        if !self.has_next() {
            return None;
        }
        if self.first {
            self.first = false;
            return Some(&self.actions);
        }
        for (action, &max) in self.actions.iter_mut().zip(&self.num_actions) {
            if *action < max {
                *action += 1;
                break;
            }
            *action = 1;
        }
        Some(&self.actions)
    }
}

impl Iterator for OutcomeIterator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_profile().map(|p| p.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_one_varies_fastest() {
        let profiles: Vec<Vec<usize>> = OutcomeIterator::new(&[2, 3]).collect();
        assert_eq!(
            profiles,
            vec![
                vec![1, 1],
                vec![2, 1],
                vec![1, 2],
                vec![2, 2],
                vec![1, 3],
                vec![2, 3],
            ]
        );
    }

    #[test]
    fn test_has_next_false_at_max() {
        let mut itr = OutcomeIterator::new(&[2, 2]);
        let mut count = 0;
        while itr.has_next() {
            itr.next_profile();
            count += 1;
        }
        assert_eq!(count, 4);
        assert_eq!(itr.current(), &[2, 2]);
        assert!(itr.next_profile().is_none());
    }

    #[test]
    fn test_reset_restarts() {
        let mut itr = OutcomeIterator::new(&[3]);
        assert_eq!(itr.by_ref().count(), 3);
        itr.reset();
        assert_eq!(itr.next(), Some(vec![1]));
    }

    #[test]
    fn test_single_profile_shape() {
        let profiles: Vec<_> = OutcomeIterator::new(&[1, 1, 1]).collect();
        assert_eq!(profiles, vec![vec![1, 1, 1]]);
    }

    #[test]
    fn test_empty_dimension_yields_nothing() {
        assert_eq!(OutcomeIterator::new(&[2, 0]).count(), 0);
    }
}
