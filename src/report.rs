use crate::error::{FormatError, ReportError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DAY: &str = "d";

/// Ответ поставщика прогноза: город и ряд точек (часов или дней).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherReport {
    pub city_name: String,
    pub count: i64,
    pub data: Vec<Stat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Stat {
    #[serde(rename = "pod")]
    pub part_of_day: String,
    pub city_name: String,
    pub datetime: String,
    #[serde(rename = "wind_cdir")]
    pub wind_direction: String,
    #[serde(rename = "sunrise")]
    pub sunrise_time: String,
    #[serde(rename = "sunset")]
    pub sunset_time: String,
    #[serde(rename = "rh")]
    pub relative_humidity: f64,
    #[serde(rename = "wind_spd")]
    pub wind_speed_ms: f64,
    #[serde(rename = "uv")]
    pub index_uv: f64,
    #[serde(rename = "precip")]
    pub precipitation: f64,
    #[serde(rename = "pres")]
    pub pressure_mb: f64,
    #[serde(rename = "temp")]
    pub temperature: f64,
    #[serde(rename = "app_temp")]
    pub feels_like_temp: f64,
    pub high_temp: f64,
    pub low_temp: f64,
    pub weather: Weather,
    #[serde(rename = "clouds")]
    pub cloud_coverage: i64,
    pub snow: i64,
    #[serde(rename = "aqi")]
    pub index_air_quality: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Weather {
    pub code: i32,
    pub description: String,
}

/// Отметка времени точки прогноза: `2024-03-07` (дни) или `2024-03-07:15` (часы).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportTime {
    pub date: NaiveDate,
    pub hour: Option<u32>,
}

impl ReportTime {
    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        let bad = || FormatError::BadTimestamp(raw.to_string());
        let (date_part, hour_part) = match raw.split_once(':') {
            Some((date, hour)) => (date, Some(hour)),
            None => (raw, None),
        };

        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| bad())?;
        let hour = match hour_part {
            Some(hour) => {
                let hour = hour.parse::<u32>().map_err(|_| bad())?;
                if hour > 23 {
                    return Err(bad());
                }
                Some(hour)
            }
            None => None,
        };

        Ok(ReportTime { date, hour })
    }

    /// Заголовок даты, например `7 Mar:`.
    pub fn date_heading(&self) -> String {
        self.date.format("%-d %b:").to_string()
    }
}

impl WeatherReport {
    /// Город для заголовка. Ответ `current` кладёт имя только в точку данных.
    pub fn display_city(&self) -> &str {
        if !self.city_name.is_empty() {
            return &self.city_name;
        }
        self.data.first().map(|s| s.city_name.as_str()).unwrap_or_default()
    }

    /// Первые `n` точек или ошибка, если поставщик прислал меньше.
    pub fn points(&self, n: usize) -> Result<&[Stat], FormatError> {
        self.data.get(..n).ok_or(FormatError::NotEnoughData {
            requested: n,
            available: self.data.len(),
        })
    }
}

impl Stat {
    pub fn is_day(&self) -> bool {
        self.part_of_day == DAY
    }

    pub fn timestamp(&self) -> Result<ReportTime, FormatError> {
        ReportTime::parse(&self.datetime)
    }
}

/// Разбирает JSON поставщика в отчёт. Отсутствующие поля получают нулевые значения.
pub fn parse_weather(payload: &[u8]) -> Result<WeatherReport, ReportError> {
    Ok(serde_json::from_slice(payload)?)
}
