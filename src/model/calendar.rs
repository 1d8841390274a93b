//! Hijri date and prayer-time estimates
//!
//! The Hijri conversion is the tabular (arithmetic) calendar and may differ
//! from a sighting-based calendar by a day. Prayer times come from a standard
//! solar-position computation with Muslim World League angles. Both are
//! display estimates only.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};

use super::catalog::City;

const JDN_OFFSET: i64 = 1_721_425;

pub const HIJRI_MONTHS: [&str; 12] = [
    "Muharram",
    "Safar",
    "Rabi al-Awwal",
    "Rabi al-Thani",
    "Jumada al-Ula",
    "Jumada al-Thani",
    "Rajab",
    "Shaban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qadah",
    "Dhu al-Hijjah",
];

const HIJRI_WEEKDAYS: [&str; 7] = [
    "Al-Ahad",
    "Al-Ithnayn",
    "Al-Thulatha",
    "Al-Arba",
    "Al-Khamis",
    "Al-Jumuah",
    "As-Sabt",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HijriDate {
    pub day: u8,
    /// 1-based month number
    pub month: u8,
    pub year: i64,
    pub weekday: &'static str,
}

impl HijriDate {
    pub fn month_name(&self) -> &'static str {
        HIJRI_MONTHS[(self.month as usize).saturating_sub(1) % 12]
    }
}

impl std::fmt::Display for HijriDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} AH", self.day, self.month_name(), self.year)
    }
}

fn julian_day_number(date: NaiveDate) -> i64 {
    date.num_days_from_ce() as i64 + JDN_OFFSET
}

/// Convert a Gregorian date to the tabular Islamic calendar
pub fn to_hijri(date: NaiveDate) -> HijriDate {
    let mut l = julian_day_number(date) - 1_948_440 + 10_632;
    let n = (l - 1) / 10_631;
    l = l - 10_631 * n + 354;
    let j = ((10_985 - l) / 5_316) * ((50 * l) / 17_719) + (l / 5_670) * ((43 * l) / 15_238);
    l = l - ((30 - j) / 15) * ((17_719 * j) / 50) - (j / 16) * ((15_238 * j) / 43) + 29;
    let month = (24 * l) / 709;
    let day = l - (709 * month) / 24;
    let year = 30 * n + j - 30;

    HijriDate {
        day: day as u8,
        month: month as u8,
        year,
        weekday: HIJRI_WEEKDAYS[date.weekday().num_days_from_sunday() as usize],
    }
}

/// New Zealand UTC offset in hours for a civil date (NZDT from the last
/// Sunday of September until the first Sunday of April)
pub fn nz_utc_offset_hours(date: NaiveDate) -> f64 {
    let year = date.year();
    let dst_start = last_weekday_of_month(year, 9, Weekday::Sun);
    let dst_end = NaiveDate::from_weekday_of_month_opt(year, 4, Weekday::Sun, 1);
    let in_dst = match (dst_start, dst_end) {
        (Some(start), Some(end)) => date >= start || date < end,
        _ => false,
    };
    if in_dst { 13.0 } else { 12.0 }
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    (1..=5)
        .rev()
        .find_map(|n| NaiveDate::from_weekday_of_month_opt(year, month, weekday, n))
}

/// Current civil date and time in New Zealand
pub fn nz_now() -> NaiveDateTime {
    let utc = Utc::now().naive_utc();
    let offset = nz_utc_offset_hours(utc.date());
    utc + Duration::minutes((offset * 60.0) as i64)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prayer {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 6] = [
        Prayer::Fajr,
        Prayer::Sunrise,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Sunrise => "Sunrise",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrayerTime {
    pub prayer: Prayer,
    /// `None` when the sun never reaches the required angle that day
    pub time: Option<NaiveTime>,
}

const FAJR_ANGLE: f64 = 18.0;
const ISHA_ANGLE: f64 = 17.0;
const RISE_SET_ANGLE: f64 = 0.833;
const ASR_SHADOW_FACTOR: f64 = 1.0;

fn dsin(d: f64) -> f64 {
    d.to_radians().sin()
}

fn dcos(d: f64) -> f64 {
    d.to_radians().cos()
}

fn fix(value: f64, modulus: f64) -> f64 {
    value.rem_euclid(modulus)
}

/// (declination in degrees, equation of time in hours)
fn sun_position(jd: f64) -> (f64, f64) {
    let d = jd - 2_451_545.0;
    let g = fix(357.529 + 0.985_600_28 * d, 360.0);
    let q = fix(280.459 + 0.985_647_36 * d, 360.0);
    let l = fix(q + 1.915 * dsin(g) + 0.020 * dsin(2.0 * g), 360.0);
    let e = 23.439 - 0.000_000_36 * d;

    let ra = fix((dcos(e) * dsin(l)).atan2(dcos(l)).to_degrees() / 15.0, 24.0);
    let eqt = q / 15.0 - ra;
    let decl = (dsin(e) * dsin(l)).asin().to_degrees();
    (decl, eqt)
}

struct SolarDay {
    jd: f64,
    latitude: f64,
}

impl SolarDay {
    fn mid_day(&self, t: f64) -> f64 {
        let (_, eqt) = sun_position(self.jd + t);
        fix(12.0 - eqt, 24.0)
    }

    /// Time the sun sits `angle` degrees below the horizon, before noon when `before_noon`
    fn sun_angle_time(&self, angle: f64, t: f64, before_noon: bool) -> Option<f64> {
        let (decl, _) = sun_position(self.jd + t);
        let noon = self.mid_day(t);
        let cos_h = (-dsin(angle) - dsin(decl) * dsin(self.latitude))
            / (dcos(decl) * dcos(self.latitude));
        if !(-1.0..=1.0).contains(&cos_h) {
            return None;
        }
        let h = cos_h.acos().to_degrees() / 15.0;
        Some(if before_noon { noon - h } else { noon + h })
    }

    fn asr_time(&self, factor: f64, t: f64) -> Option<f64> {
        let (decl, _) = sun_position(self.jd + t);
        let angle = -(1.0 / (factor + (self.latitude - decl).abs().to_radians().tan()))
            .atan()
            .to_degrees();
        self.sun_angle_time(angle, t, false)
    }
}

fn hours_to_time(hours: f64) -> Option<NaiveTime> {
    let minutes = (fix(hours, 24.0) * 60.0).floor() as u32;
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

/// Prayer times for `city` on `date`, in a zone `utc_offset_hours` from UTC
pub fn prayer_times(city: &City, date: NaiveDate, utc_offset_hours: f64) -> Vec<PrayerTime> {
    let day = SolarDay {
        jd: julian_day_number(date) as f64 - 0.5 - city.longitude / (15.0 * 24.0),
        latitude: city.latitude,
    };

    let raw = [
        day.sun_angle_time(FAJR_ANGLE, 5.0 / 24.0, true),
        day.sun_angle_time(RISE_SET_ANGLE, 6.0 / 24.0, true),
        Some(day.mid_day(12.0 / 24.0)),
        day.asr_time(ASR_SHADOW_FACTOR, 13.0 / 24.0),
        day.sun_angle_time(RISE_SET_ANGLE, 18.0 / 24.0, false),
        day.sun_angle_time(ISHA_ANGLE, 18.0 / 24.0, false),
    ];

    let adjust = utc_offset_hours - city.longitude / 15.0;
    Prayer::ALL
        .iter()
        .zip(raw)
        .map(|(&prayer, hours)| PrayerTime {
            prayer,
            time: hours.and_then(|h| hours_to_time(h + adjust)),
        })
        .collect()
}

/// Index of the first prayer after `now`, wrapping to the first of the day
pub fn next_prayer(times: &[PrayerTime], now: NaiveTime) -> Option<usize> {
    times
        .iter()
        .position(|p| p.time.is_some_and(|t| t > now))
        .or_else(|| times.iter().position(|p| p.time.is_some()))
}
