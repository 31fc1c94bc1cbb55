use crate::error::ClockError;

pub const DAYS_OF_WEEK: [&str; 7] = [
    "Domingo",
    "Segunda-feira",
    "Terça-feira",
    "Quarta-feira",
    "Quinta-feira",
    "Sexta-feira",
    "Sábado",
];

pub const MONTHS: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Wall clock reading as the RTC presents it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    /// 1..=12
    pub month: u8,
    pub day: u8,
    /// 0 = Sunday
    pub day_of_week: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Clock value loaded at boot, there's no battery-backed time source
pub const INITIAL_DATETIME: DateTime = DateTime {
    year: 2025,
    month: 3,
    day: 16,
    day_of_week: 0,
    hour: 19,
    minute: 10,
    second: 0,
};

impl DateTime {
    pub fn validate(&self) -> Result<(), ClockError> {
        let valid = (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.day_of_week < 7
            && self.hour < 24
            && self.minute < 60
            && self.second < 60;

        if valid {
            Ok(())
        } else {
            Err(ClockError::InvalidDateTime)
        }
    }

    pub fn day_name(&self) -> Result<&'static str, ClockError> {
        DAYS_OF_WEEK
            .get(self.day_of_week as usize)
            .copied()
            .ok_or(ClockError::InvalidDateTime)
    }

    pub fn month_name(&self) -> Result<&'static str, ClockError> {
        let idx = (self.month as usize)
            .checked_sub(1)
            .ok_or(ClockError::InvalidDateTime)?;
        MONTHS.get(idx).copied().ok_or(ClockError::InvalidDateTime)
    }
}

pub trait WallClock {
    fn current_time(&mut self) -> Result<DateTime, ClockError>;
    fn set_current_time(&mut self, value: DateTime) -> Result<(), ClockError>;
}
