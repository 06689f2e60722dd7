/// [Binomial coefficient][binomial] `n choose k`, saturating at `u64::MAX`.
///
/// [binomial]: https://en.wikipedia.org/wiki/Binomial_coefficient
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u64 = 1;
    for i in 0..k {
        // Exact at every step: result * (n - i) is divisible by (i + 1).
        result = match result.checked_mul((n - i) as u64) {
            Some(r) => r / (i as u64 + 1),
            None => return u64::MAX,
        };
    }
    result
}

/// Iterator over all `k`-element index combinations of `0..n`, in lexicographic order.
///
/// ```
/// use liars_rs::utils::Combinations;
///
/// let all: Vec<Vec<usize>> = Combinations::new(4, 2).collect();
/// assert_eq!(all.len(), 6);
/// assert_eq!(all[0], vec![0, 1]);
/// assert_eq!(all[5], vec![2, 3]);
/// ```
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        // Advance: find the rightmost index that can still move.
        let k = self.indices.len();
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.indices[i] < self.n - k + i {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 0), 1);
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(5, 5), 1);
        assert_eq!(binomial(5, 6), 0);
        assert_eq!(binomial(60, 30), 118264581564861424);
        assert_eq!(binomial(200, 100), u64::MAX);
    }

    #[test]
    fn test_combinations_count() {
        for n in 0..8 {
            for k in 0..=n + 1 {
                assert_eq!(Combinations::new(n, k).count() as u64, binomial(n, k), "n={}, k={}", n, k);
            }
        }
    }

    #[test]
    fn test_combinations_order() {
        let all: Vec<Vec<usize>> = Combinations::new(4, 3).collect();
        assert_eq!(all, vec![vec![0, 1, 2], vec![0, 1, 3], vec![0, 2, 3], vec![1, 2, 3]]);
    }

    #[test]
    fn test_empty_combination() {
        let all: Vec<Vec<usize>> = Combinations::new(3, 0).collect();
        assert_eq!(all, vec![Vec::<usize>::new()]);
    }
}
