use chrono::{DateTime, Local, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::AppError;

/// Timezone used to stamp log directories
#[derive(Debug, Clone, Copy)]
pub(crate) enum Timezone {
    Local,
    Named(Tz),
}

impl Timezone {
    /// `None`, empty or "local" is the system zone. "utc" and "z" match in any
    /// case; anything else must be an IANA name.
    pub(crate) fn parse(value: Option<&str>) -> Result<Self, AppError> {
        let raw = value.map(str::trim).unwrap_or_default();
        match raw.to_ascii_lowercase().as_str() {
            "" | "local" => Ok(Timezone::Local),
            "utc" | "z" => Ok(Timezone::Named(chrono_tz::UTC)),
            _ => raw
                .parse::<Tz>()
                .map(Timezone::Named)
                .map_err(|_| AppError::InvalidTimezone {
                    input: raw.to_string(),
                }),
        }
    }

    /// Wall-clock reading of `utc` in this timezone
    pub(crate) fn wall_clock(self, utc: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Timezone::Local => utc.with_timezone(&Local).naive_local(),
            Timezone::Named(tz) => utc.with_timezone(&tz).naive_local(),
        }
    }

    pub(crate) fn now(self) -> NaiveDateTime {
        self.wall_clock(Utc::now())
    }

    pub(crate) fn label(self) -> String {
        match self {
            Timezone::Local => "local".to_string(),
            Timezone::Named(tz) => tz.name().to_string(),
        }
    }
}
