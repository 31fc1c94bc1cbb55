use stm32f4xx_hal::rtc::{Lsi, Rtc};
use time::{Date, Month, PrimitiveDateTime, Time};

use sonar_core::{calendar::DateTime, error::ClockError, WallClock};

/// The Discovery board has no 32kHz crystal, so the RTC runs off the LSI.
/// Expect a few seconds of drift per hour.
pub struct RtcClock {
    rtc: Rtc<Lsi>,
}

impl RtcClock {
    pub fn new(rtc: Rtc<Lsi>) -> Self {
        Self { rtc }
    }
}

impl WallClock for RtcClock {
    fn current_time(&mut self) -> Result<DateTime, ClockError> {
        let now = self.rtc.get_datetime();
        Ok(DateTime {
            year: now.year() as u16,
            month: u8::from(now.month()),
            day: now.day(),
            day_of_week: now.weekday().number_days_from_sunday(),
            hour: now.hour(),
            minute: now.minute(),
            second: now.second(),
        })
    }

    /// The weekday is derived from the date, `value.day_of_week` is ignored
    fn set_current_time(&mut self, value: DateTime) -> Result<(), ClockError> {
        value.validate()?;
        let month = Month::try_from(value.month).map_err(|_| ClockError::InvalidDateTime)?;
        let date = Date::from_calendar_date(value.year as i32, month, value.day)
            .map_err(|_| ClockError::InvalidDateTime)?;
        let time = Time::from_hms(value.hour, value.minute, value.second)
            .map_err(|_| ClockError::InvalidDateTime)?;

        self.rtc
            .set_datetime(&PrimitiveDateTime::new(date, time))
            .map_err(|_| ClockError::Unavailable)
    }
}
