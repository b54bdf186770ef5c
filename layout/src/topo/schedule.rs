//! The cooling schedule of the simulation. The temperature bounds how far a
//! node may move in one pass, and decays geometrically until it reaches the
//! minimal temperature.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoolingSchedule {
    initial: f64,
    minimal: f64,
    factor: f64,
}

impl CoolingSchedule {
    /// The \p factor must be greater than 1; ForceConfig::validate checks
    /// this.
    pub fn new(initial: f64, minimal: f64, factor: f64) -> Self {
        Self {
            initial,
            minimal,
            factor,
        }
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    pub fn minimal(&self) -> f64 {
        self.minimal
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// \returns the number of passes that the schedule allows:
    /// ceil(log(initial / minimal) / log(factor)).
    pub fn iterations(&self) -> usize {
        if self.initial <= self.minimal {
            return 0;
        }
        let n = (self.initial / self.minimal).ln() / self.factor.ln();
        n.ceil() as usize
    }

    /// \returns an iterator over the temperature of every pass.
    pub fn temperatures(&self) -> Temperatures {
        Temperatures {
            current: self.initial,
            minimal: self.minimal,
            factor: self.factor,
        }
    }
}

impl IntoIterator for CoolingSchedule {
    type Item = f64;
    type IntoIter = Temperatures;

    fn into_iter(self) -> Temperatures {
        self.temperatures()
    }
}

/// The strictly decreasing sequence of temperatures of a schedule.
#[derive(Debug, Clone)]
pub struct Temperatures {
    current: f64,
    minimal: f64,
    factor: f64,
}

impl Iterator for Temperatures {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.current <= self.minimal {
            return None;
        }
        let t = self.current;
        self.current /= self.factor;
        Some(t)
    }
}

#[test]
fn test_schedule_length() {
    let s = CoolingSchedule::new(1000_f64.hypot(1000.), 10., 1.01);
    let temps: Vec<f64> = s.temperatures().collect();
    assert_eq!(temps.len(), s.iterations());
    assert_eq!(temps.len(), 498);
    assert_eq!(temps[0], s.initial());
    for w in temps.windows(2) {
        assert!(w[1] < w[0]);
    }
    assert!(*temps.last().unwrap() > 10.);
    assert!(temps.last().unwrap() / 1.01 <= 10.);

    let s = CoolingSchedule::new(100., 1., 2.);
    assert_eq!(s.iterations(), 7);
    assert_eq!(s.into_iter().count(), 7);
}

#[test]
fn test_schedule_below_floor() {
    let s = CoolingSchedule::new(5., 10., 1.01);
    assert_eq!(s.iterations(), 0);
    assert_eq!(s.temperatures().next(), None);
}
