use std::fmt;
use std::str::FromStr;

use super::Error;

/// Value of the `Range` header in normal play time: `npt=start-end`, where
/// either side may be left open.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub start: Option<NptTime>,
    pub end: Option<NptTime>,
}

impl Range {
    #[must_use]
    pub const fn new(start: NptTime, end: NptTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// `npt=now-`, the range a live stream plays.
    #[must_use]
    pub const fn live() -> Self {
        Self {
            start: Some(NptTime::Now),
            end: None,
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "npt=")?;
        if let Some(start) = self.start.as_ref() {
            write!(f, "{start}")?;
        }
        write!(f, "-")?;
        if let Some(end) = self.end.as_ref() {
            write!(f, "{end}")?;
        }
        Ok(())
    }
}

impl FromStr for Range {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::RangeMalformed {
            value: s.to_string(),
        };

        let (spec, time) = match s.split_once(';') {
            Some((spec, time)) => (spec, Some(time)),
            None => (s, None),
        };
        if let Some(time) = time {
            return Err(if time.trim_start().starts_with("time=") {
                Error::RangeTimeNotSupported {
                    value: s.to_string(),
                }
            } else {
                malformed()
            });
        }

        let (unit, value) = spec.split_once('=').ok_or_else(malformed)?;
        if !unit.trim().eq_ignore_ascii_case("npt") {
            return Err(Error::RangeUnitNotSupported {
                value: s.to_string(),
            });
        }

        let (start, end) = value.split_once('-').ok_or_else(malformed)?;
        let bound = |value: &str| -> Result<Option<NptTime>, Error> {
            let value = value.trim();
            if value.is_empty() {
                Ok(None)
            } else {
                value.parse().map(Some)
            }
        };

        Ok(Self {
            start: bound(start)?,
            end: bound(end)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NptTime {
    Now,
    Time(f64),
}

impl fmt::Display for NptTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Now => write!(f, "now"),
            Self::Time(seconds) => write!(f, "{seconds:.3}"),
        }
    }
}

impl FromStr for NptTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::RangeNptTimeMalformed {
            value: s.to_string(),
        };

        if s == "now" {
            return Ok(Self::Now);
        }

        match *s.split(':').collect::<Vec<_>>().as_slice() {
            [seconds] => seconds
                .parse::<f64>()
                .map(Self::Time)
                .map_err(|_| malformed()),
            [hours, minutes, seconds] => {
                let hours = hours.parse::<u32>().map_err(|_| malformed())?;
                let minutes = minutes.parse::<u32>().map_err(|_| malformed())?;
                let seconds = seconds.parse::<f64>().map_err(|_| malformed())?;
                Ok(Self::Time(
                    f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds,
                ))
            }
            _ => Err(malformed()),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::{Error, NptTime, Range};

    #[test]
    fn parse_live() {
        assert_eq!("npt=now-".parse::<Range>().unwrap(), Range::live());
    }

    #[test]
    fn parse_seconds() {
        assert_eq!(
            "npt=0-7.741".parse::<Range>().unwrap(),
            Range::new(NptTime::Time(0.0), NptTime::Time(7.741)),
        );
    }

    #[test]
    fn parse_open_start() {
        let range = "npt=-20".parse::<Range>().unwrap();
        assert_eq!(range.start, None);
        assert_eq!(range.end, Some(NptTime::Time(20.0)));
    }

    #[test]
    fn parse_hhmmss() {
        assert_eq!(
            "npt=00:01:30.5-".parse::<Range>().unwrap().start,
            Some(NptTime::Time(90.5)),
        );
    }

    #[test]
    fn parse_unit_not_supported() {
        assert!(matches!(
            "smpte=10:07:00-10:07:33:05.01".parse::<Range>(),
            Err(Error::RangeUnitNotSupported { .. }),
        ));
    }

    #[test]
    fn parse_time_not_supported() {
        assert!(matches!(
            "npt=0-;time=19970123T143720Z".parse::<Range>(),
            Err(Error::RangeTimeNotSupported { .. }),
        ));
    }

    #[test]
    fn parse_malformed() {
        assert!(matches!("npt".parse::<Range>(), Err(Error::RangeMalformed { .. })));
        assert!(matches!("npt=5".parse::<Range>(), Err(Error::RangeMalformed { .. })));
        assert!(matches!(
            "npt=abc-".parse::<Range>(),
            Err(Error::RangeNptTimeMalformed { .. }),
        ));
    }

    #[test]
    fn format() {
        assert_eq!(Range::live().to_string(), "npt=now-");
        assert_eq!(
            Range::new(NptTime::Time(1.0), NptTime::Time(2.5)).to_string(),
            "npt=1.000-2.500",
        );
    }
}
