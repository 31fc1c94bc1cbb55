use core::fmt;

use crate::time::Duration;

const SPEED_OF_SOUND: f32 = 0.0343; // cm/us, ~343 m/s

/// One-way distance to the target
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Centimeters(pub f32);

impl Centimeters {
    /// The echo width covers the round trip, so it gets halved
    pub fn from_echo(width: Duration) -> Self {
        Self(width.ticks() as f32 * SPEED_OF_SOUND / 2.0)
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl fmt::Display for Centimeters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} cm", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Centimeters {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=f32} cm", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_hundred_micros_is_ten_centimeters() {
        let d = Centimeters::from_echo(Duration::micros(600));
        assert!((d.value() - 10.29).abs() < 1e-3);
        assert_eq!(format!("{}", d), "10.29 cm");
    }

    #[test]
    fn zero_width_is_zero() {
        assert_eq!(Centimeters::from_echo(Duration::micros(0)).value(), 0.0);
    }

    #[test]
    fn max_range_echo() {
        // ~23ms is the datasheet's 4m limit
        let d = Centimeters::from_echo(Duration::micros(23_324));
        assert!((d.value() - 400.0).abs() < 0.1);
    }
}
