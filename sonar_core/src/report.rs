use core::fmt;

use crate::calendar::DateTime;
use crate::cycle::Outcome;
use crate::distance::Centimeters;
use crate::error::ClockError;

const FAILURE_MARKER: &str = "Falha";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Distance(Centimeters),
    Failure,
}

impl Reading {
    /// `None` for a cycle that has not resolved yet
    pub fn from_outcome(outcome: Outcome) -> Option<Self> {
        match outcome {
            Outcome::Success(d) => Some(Reading::Distance(d)),
            Outcome::Failed => Some(Reading::Failure),
            Outcome::Pending => None,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Distance(d) => write!(f, "{}", d),
            Reading::Failure => f.write_str(FAILURE_MARKER),
        }
    }
}

/// One console line: `<dia>, <DD> de <mês> <HH>:<MM>:<SS> - <leitura>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    day: &'static str,
    month: &'static str,
    when: DateTime,
    reading: Reading,
}

impl Report {
    pub fn new(when: DateTime, reading: Reading) -> Result<Self, ClockError> {
        when.validate()?;
        Ok(Self {
            day: when.day_name()?,
            month: when.month_name()?,
            when,
            reading,
        })
    }

    pub fn reading(&self) -> Reading {
        self.reading
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {:02} de {} {:02}:{:02}:{:02} - {}",
            self.day,
            self.when.day,
            self.month,
            self.when.hour,
            self.when.minute,
            self.when.second,
            self.reading
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::INITIAL_DATETIME;

    #[test]
    fn success_line() {
        let r = Report::new(INITIAL_DATETIME, Reading::Distance(Centimeters(10.29))).unwrap();
        assert_eq!(r.to_string(), "Domingo, 16 de Março 19:10:00 - 10.29 cm");
    }

    #[test]
    fn failure_line() {
        let when = DateTime {
            day: 3,
            month: 1,
            day_of_week: 5,
            hour: 7,
            minute: 5,
            second: 9,
            ..INITIAL_DATETIME
        };
        let r = Report::new(when, Reading::Failure).unwrap();
        assert_eq!(r.to_string(), "Sexta-feira, 03 de Janeiro 07:05:09 - Falha");
    }

    #[test]
    fn pending_outcome_has_no_reading() {
        assert_eq!(Reading::from_outcome(Outcome::Pending), None);
        assert_eq!(
            Reading::from_outcome(Outcome::Failed),
            Some(Reading::Failure)
        );
    }

    #[test]
    fn invalid_clock_is_an_error() {
        let when = DateTime {
            month: 13,
            ..INITIAL_DATETIME
        };
        assert_eq!(
            Report::new(when, Reading::Failure),
            Err(ClockError::InvalidDateTime)
        );
    }
}
