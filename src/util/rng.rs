/// Source of randomness for placement and direction choices.
///
/// Production code passes a `fastrand::Rng`; tests script exact values.
pub trait RandomSource {
    /// Uniform integer in `lo..=hi`. Returns `lo` when the range is empty.
    fn int_inclusive(&mut self, lo: i64, hi: i64) -> i64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;
}

impl RandomSource for fastrand::Rng {
    fn int_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.i64(lo..=hi)
    }

    fn index(&mut self, len: usize) -> usize {
        self.usize(..len)
    }
}

/// Replays a fixed list of values. Each call consumes one value and clamps
/// (or wraps, for indices) it into the requested range; an exhausted script
/// yields the lowest value.
#[cfg(test)]
pub struct ScriptedRng {
    values: std::collections::VecDeque<i64>,
}

#[cfg(test)]
impl ScriptedRng {
    pub fn new(values: &[i64]) -> Self {
        Self {
            values: values.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRng {
    fn int_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        let v = self.values.pop_front().unwrap_or(lo);
        v.clamp(lo, hi.max(lo))
    }

    fn index(&mut self, len: usize) -> usize {
        let v = self.values.pop_front().unwrap_or(0);
        v.rem_euclid(len as i64) as usize
    }
}
