/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64); // seconds

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn from_millis(ms: u64) -> Self {
        Time(ms as f64 / 1000.0)
    }

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Seconds elapsed since `earlier`, never negative.
    pub fn since(self, earlier: Time) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    pub fn add_seconds(self, s: f64) -> Self {
        Time(self.0 + s)
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn since_is_clamped_at_zero() {
        let a = Time(2.0);
        let b = Time(3.5);
        assert_eq!(b.since(a), 1.5);
        assert_eq!(a.since(b), 0.0);
    }

    #[test]
    fn from_millis_converts_to_seconds() {
        assert_eq!(Time::from_millis(120), Time(0.12));
    }
}
