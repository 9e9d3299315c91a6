// Форматирование отчёта о погоде в текст ответа
use crate::emoji;
use crate::error::FormatError;
use crate::report::{Stat, WeatherReport};

const NEW_LINE: &str = "\n";

const HUMIDITY_DRY_THRESHOLD: f64 = 30.0;
const HUMIDITY_WET_THRESHOLD: f64 = 50.0;
const PRESSURE_NORMAL_ATMOSPHERIC: f64 = 1013.25;
const MMHG_PER_MILLIBAR: f64 = 0.75;

const UV_PREFIX: &str = "UV Index";
const UV_NO: &str = "No protection needed.";
const UV_LITTLE: &str = "Low danger, light protection needed.";
const UV_HIGH: &str = "High danger, protection needed.";
const UV_VERY_HIGH: &str = "Very high danger, extra protection needed.";
const UV_EXTREME: &str = "Extreme danger, avoid being outside at midday.";
const UV_HAT: &str = "Wear a hat and sunglasses.";
const UV_SPF15: &str = "Use SPF 15+ sunscreen.";
const UV_SPF30: &str = "Use SPF 30+ sunscreen.";
const UV_SPF50: &str = "Use SPF 50+ sunscreen.";
const UV_COVER: &str = "Cover up and stay in the shade.";
const UV_SUNBURN: &str = "Unprotected skin burns in";

type StatFormatter = fn(&Stat) -> Result<String, FormatError>;

// Порядок строк в ответе "Now"
const LINE_FORMATTER_NOW: [StatFormatter; 9] = [
    format_date,
    format_temperature_and_feels,
    format_weather_code,
    format_wind,
    format_humidity,
    format_pressure,
    format_sun,
    format_uv,
    format_aqi,
];

/// Текущая погода по первой точке отчёта.
pub fn format_now(report: &WeatherReport) -> Result<String, FormatError> {
    let stat = &report.points(1)?[0];

    let mut result = format_city(report.display_city());
    for formatter in LINE_FORMATTER_NOW {
        result.push_str(&formatter(stat)?);
        result.push_str(NEW_LINE);
    }
    Ok(result)
}

/// Прогноз по часам. Соседние часы с одинаковым кодом погоды сворачиваются,
/// заголовок даты пишется при смене дня.
pub fn format_hours(report: &WeatherReport, hours: usize) -> Result<String, FormatError> {
    let mut result = format_city(report.display_city());
    let mut last_code: Option<i32> = None;
    let mut prev_date = String::new();

    for stat in report.points(hours)? {
        if last_code == Some(stat.weather.code) {
            continue;
        }

        let current_date = format_date(stat)?;
        if prev_date != current_date {
            result.push_str(&current_date);
            result.push_str(NEW_LINE);
        }

        result.push_str(&format_time(stat)?);
        result.push_str(&format_temperature_small(stat));
        result.push_str(&format_weather_code(stat)?);
        result.push_str(NEW_LINE);

        last_code = Some(stat.weather.code);
        prev_date = current_date;
    }

    Ok(result)
}

/// Прогноз по дням, без свёртки.
pub fn format_days(report: &WeatherReport, days: usize) -> Result<String, FormatError> {
    let mut result = format_city(report.display_city());
    for stat in report.points(days)? {
        result.push_str(&format_date(stat)?);
        result.push_str(NEW_LINE);
        result.push_str(&format_temperature_low_high(stat));
        result.push_str(&format_weather_code(stat)?);
        result.push_str(NEW_LINE);
    }
    Ok(result)
}

fn format_city(city: &str) -> String {
    format!("Weather in {}:\n", city)
}

// Знак "+" только для положительных значений
fn signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

fn format_date(stat: &Stat) -> Result<String, FormatError> {
    Ok(stat.timestamp()?.date_heading())
}

fn format_time(stat: &Stat) -> Result<String, FormatError> {
    let hour = stat
        .timestamp()?
        .hour
        .ok_or_else(|| FormatError::MissingHour(stat.datetime.clone()))?;
    Ok(format!("{:02}h ", hour))
}

fn format_temperature_and_feels(stat: &Stat) -> Result<String, FormatError> {
    Ok(format!(
        "{} {} ({}) ",
        emoji::THERMOMETER,
        signed(stat.temperature),
        signed(stat.feels_like_temp)
    ))
}

fn format_temperature_low_high(stat: &Stat) -> String {
    format!(
        "{} {} {} {} ",
        emoji::GOING_UP,
        signed(stat.high_temp),
        emoji::GOING_DOWN,
        signed(stat.low_temp)
    )
}

fn format_temperature_small(stat: &Stat) -> String {
    format!("{} ", signed(stat.temperature))
}

fn format_weather_code(stat: &Stat) -> Result<String, FormatError> {
    Ok(format!(
        "{} {} ",
        emoji::for_weather_code(stat.weather.code),
        stat.weather.description
    ))
}

fn format_wind(stat: &Stat) -> Result<String, FormatError> {
    Ok(format!(
        "{}  Wind:\n{} {} {} m/sec",
        emoji::WIND,
        emoji::for_wind_direction(&stat.wind_direction),
        stat.wind_direction,
        stat.wind_speed_ms.round()
    ))
}

fn format_humidity(stat: &Stat) -> Result<String, FormatError> {
    let humidity = stat.relative_humidity;
    let (emoji, comment) = if humidity < HUMIDITY_DRY_THRESHOLD {
        (emoji::DRY, "Dry")
    } else if humidity > HUMIDITY_WET_THRESHOLD {
        (emoji::WATER_DROP, "Wet")
    } else {
        (emoji::CHECK_MARK, "Comfortable")
    };

    Ok(format!("Humidity:\n{} {} ({}%)", emoji, comment, humidity.round()))
}

fn format_pressure(stat: &Stat) -> Result<String, FormatError> {
    let pressure = stat.pressure_mb;
    let emoji = if pressure < PRESSURE_NORMAL_ATMOSPHERIC {
        emoji::DOWNWARD_TRIANGLE
    } else if pressure > PRESSURE_NORMAL_ATMOSPHERIC {
        emoji::UPWARD_TRIANGLE
    } else {
        emoji::CHECK_MARK
    };

    let millibars = pressure.round();
    Ok(format!(
        "Pressure:\n{} {} mb ({} mmHg)",
        emoji,
        millibars,
        millibars * MMHG_PER_MILLIBAR
    ))
}

fn format_sun(stat: &Stat) -> Result<String, FormatError> {
    Ok(format!(
        "Sunrise: {}\nSunset: {}",
        stat.sunrise_time, stat.sunset_time
    ))
}

// Советы по УФ-индексу выводятся только днём
fn format_uv(stat: &Stat) -> Result<String, FormatError> {
    if !stat.is_day() {
        return Ok(String::new());
    }

    let uv = stat.index_uv;
    let advice = if uv <= 2.0 {
        format!("{} {}", UV_NO, UV_HAT)
    } else if uv <= 5.0 {
        format!("{} {} {} {} 40 min.", UV_LITTLE, UV_HAT, UV_SPF15, UV_SUNBURN)
    } else if uv <= 7.0 {
        format!(
            "{} {} {} {} {} 30 min.",
            UV_HIGH, UV_HAT, UV_SPF30, UV_COVER, UV_SUNBURN
        )
    } else if uv <= 10.0 {
        format!(
            "{} {} {} {} {} 20 min.",
            UV_VERY_HIGH, UV_HAT, UV_SPF50, UV_COVER, UV_SUNBURN
        )
    } else {
        format!("{} {} 20 min.", UV_EXTREME, UV_SUNBURN)
    };

    Ok(format!("{}:\n{}", UV_PREFIX, advice))
}

fn format_aqi(stat: &Stat) -> Result<String, FormatError> {
    let aqi = stat.index_air_quality;
    let (emoji, comment) = match aqi {
        i64::MIN..=50 => (emoji::CHECK_MARK, "Good"),
        51..=100 => (emoji::CHECK_MARK, "Moderate"),
        101..=150 => (emoji::SMOKING, "Unhealthy for Sensitive Groups"),
        151..=200 => (emoji::WARNING, "Unhealthy"),
        201..=300 => (emoji::WARNING, "Very unhealthy"),
        301..=500 => (emoji::CROSS, "Hazardous"),
        _ => (emoji::QUESTION_MARK, "Unknown"),
    };

    Ok(format!("Air Quality Index:\n{} {} {}", emoji, aqi, comment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Weather;

    fn hour(datetime: &str, code: i32, temp: f64) -> Stat {
        Stat {
            datetime: datetime.to_string(),
            temperature: temp,
            weather: Weather {
                code,
                description: format!("code {}", code),
            },
            ..Stat::default()
        }
    }

    fn report(data: Vec<Stat>) -> WeatherReport {
        WeatherReport {
            city_name: "Tallinn".to_string(),
            count: data.len() as i64,
            data,
        }
    }

    fn now_stat() -> Stat {
        Stat {
            part_of_day: "d".to_string(),
            datetime: "2024-03-07:12".to_string(),
            wind_direction: "NNE".to_string(),
            sunrise_time: "05:40".to_string(),
            sunset_time: "17:21".to_string(),
            relative_humidity: 44.6,
            wind_speed_ms: 3.4,
            index_uv: 4.0,
            pressure_mb: 1020.4,
            temperature: 5.0,
            feels_like_temp: 3.0,
            weather: Weather {
                code: 803,
                description: "Broken clouds".to_string(),
            },
            index_air_quality: 42,
            ..Stat::default()
        }
    }

    #[test]
    fn now_renders_every_line_in_order() {
        let text = format_now(&report(vec![now_stat()])).unwrap();
        let expected = format!(
            "Weather in Tallinn:\n\
             7 Mar:\n\
             {t} +5 (+3) \n\
             {c} Broken clouds \n\
             {w}  Wind:\n{ne} NNE 3 m/sec\n\
             Humidity:\n{ok} Comfortable (45%)\n\
             Pressure:\n{up} 1020 mb (765 mmHg)\n\
             Sunrise: 05:40\nSunset: 17:21\n\
             UV Index:\n{little} {hat} {spf} {burn} 40 min.\n\
             Air Quality Index:\n{ok} 42 Good\n",
            t = emoji::THERMOMETER,
            c = emoji::SUN_WITH_MEDIUM_CLOUD,
            w = emoji::WIND,
            ne = emoji::NORTH_EAST,
            ok = emoji::CHECK_MARK,
            up = emoji::UPWARD_TRIANGLE,
            little = UV_LITTLE,
            hat = UV_HAT,
            spf = UV_SPF15,
            burn = UV_SUNBURN,
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn now_uses_city_of_first_point_when_report_has_none() {
        let mut stat = now_stat();
        stat.city_name = "Narva".to_string();
        let report = WeatherReport {
            data: vec![stat],
            ..WeatherReport::default()
        };
        assert!(format_now(&report).unwrap().starts_with("Weather in Narva:\n"));
    }

    #[test]
    fn now_on_empty_report_is_an_error() {
        let err = format_now(&report(vec![])).unwrap_err();
        assert_eq!(
            err,
            FormatError::NotEnoughData {
                requested: 1,
                available: 0
            }
        );
    }

    #[test]
    fn hours_collapse_repeated_weather_codes() {
        let data = vec![
            hour("2024-03-07:21", 1, 1.0),
            hour("2024-03-07:22", 1, 1.0),
            hour("2024-03-07:23", 2, 0.0),
            hour("2024-03-08:00", 2, -1.0),
            hour("2024-03-08:01", 1, -2.5),
        ];
        let text = format_hours(&report(data), 5).unwrap();

        assert_eq!(text.matches("code ").count(), 3);
        let expected = format!(
            "Weather in Tallinn:\n\
             7 Mar:\n\
             21h +1 {q} code 1 \n\
             23h 0 {q} code 2 \n\
             8 Mar:\n\
             01h -2.5 {q} code 1 \n",
            q = emoji::QUESTION_MARK
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn hours_render_first_point_even_with_zero_code() {
        let text = format_hours(&report(vec![hour("2024-03-07:10", 0, 2.0)]), 1).unwrap();
        assert!(text.contains("10h +2 "));
    }

    #[test]
    fn hours_need_an_hour_in_datetime() {
        let err = format_hours(&report(vec![hour("2024-03-07", 800, 2.0)]), 1).unwrap_err();
        assert_eq!(err, FormatError::MissingHour("2024-03-07".to_string()));
    }

    #[test]
    fn hours_beyond_available_data_is_an_error() {
        let err = format_hours(&report(vec![hour("2024-03-07:10", 800, 2.0)]), 24).unwrap_err();
        assert_eq!(
            err,
            FormatError::NotEnoughData {
                requested: 24,
                available: 1
            }
        );
    }

    #[test]
    fn days_render_one_block_per_day() {
        let data: Vec<Stat> = (1..=5)
            .map(|day| Stat {
                datetime: format!("2024-03-{:02}", day),
                high_temp: 4.5,
                low_temp: -2.0,
                weather: Weather {
                    code: 600,
                    description: "Snow".to_string(),
                },
                ..Stat::default()
            })
            .collect();
        let text = format_days(&report(data), 3).unwrap();

        assert_eq!(text.matches(" Mar:\n").count(), 3);
        assert_eq!(text.matches(emoji::GOING_UP).count(), 3);
        assert!(text.starts_with("Weather in Tallinn:\n1 Mar:\n"));
        assert!(text.contains(&format!(
            "{} +4.5 {} -2 {} Snow \n",
            emoji::GOING_UP,
            emoji::GOING_DOWN,
            emoji::CLOUD_SNOW
        )));
        assert!(!text.contains("4 Mar:"));
    }

    #[test]
    fn days_reject_malformed_dates() {
        let err = format_days(&report(vec![hour("07.03.2024", 800, 1.0)]), 1).unwrap_err();
        assert_eq!(err, FormatError::BadTimestamp("07.03.2024".to_string()));
    }

    #[test]
    fn temperature_sign_only_for_positive_values() {
        assert_eq!(signed(5.0), "+5");
        assert_eq!(signed(0.0), "0");
        assert_eq!(signed(-3.2), "-3.2");
    }

    #[test]
    fn humidity_bands() {
        let mut stat = Stat::default();
        stat.relative_humidity = 29.4;
        assert!(format_humidity(&stat).unwrap().contains("Dry (29%)"));
        stat.relative_humidity = 50.0;
        assert!(format_humidity(&stat).unwrap().contains("Comfortable (50%)"));
        stat.relative_humidity = 81.0;
        assert!(format_humidity(&stat).unwrap().contains("Wet (81%)"));
    }

    #[test]
    fn pressure_compares_with_normal_atmosphere() {
        let mut stat = Stat::default();
        stat.pressure_mb = 1000.2;
        let text = format_pressure(&stat).unwrap();
        assert!(text.contains(emoji::DOWNWARD_TRIANGLE));
        assert!(text.ends_with("1000 mb (750 mmHg)"));

        stat.pressure_mb = PRESSURE_NORMAL_ATMOSPHERIC;
        assert!(format_pressure(&stat).unwrap().contains(emoji::CHECK_MARK));
    }

    #[test]
    fn uv_advice_is_empty_at_night() {
        let mut stat = now_stat();
        stat.part_of_day = "n".to_string();
        assert_eq!(format_uv(&stat).unwrap(), "");
    }

    #[test]
    fn uv_bands_use_inclusive_upper_bounds() {
        let mut stat = now_stat();
        stat.index_uv = 2.0;
        assert!(format_uv(&stat).unwrap().contains(UV_NO));
        stat.index_uv = 7.0;
        assert!(format_uv(&stat).unwrap().ends_with("30 min."));
        stat.index_uv = 10.0;
        assert!(format_uv(&stat).unwrap().contains(UV_SPF50));
        stat.index_uv = 10.5;
        assert!(format_uv(&stat).unwrap().contains(UV_EXTREME));
    }

    #[test]
    fn uv_heading_is_the_same_for_every_band() {
        let mut stat = now_stat();
        for uv in [1.0, 4.0, 6.0, 9.0, 11.0] {
            stat.index_uv = uv;
            assert!(format_uv(&stat).unwrap().starts_with("UV Index:\n"));
        }
    }

    #[test]
    fn aqi_bands_use_inclusive_upper_bounds() {
        let mut stat = Stat::default();
        let cases = [
            (50, "Good"),
            (100, "Moderate"),
            (150, "Unhealthy for Sensitive Groups"),
            (200, "Unhealthy"),
            (300, "Very unhealthy"),
            (500, "Hazardous"),
            (501, "Unknown"),
        ];
        for (aqi, comment) in cases {
            stat.index_air_quality = aqi;
            let text = format_aqi(&stat).unwrap();
            assert!(
                text.ends_with(&format!("{} {}", aqi, comment)),
                "aqi {} rendered as {}",
                aqi,
                text
            );
        }
    }
}
