// Символы, которыми размечаются строки прогноза

pub const BALLOON: char = '\u{1F388}';
pub const CHECK_MARK: char = '\u{2705}';
pub const CLOUD: char = '\u{2601}';
pub const CLOUD_RAIN: char = '\u{1F327}';
pub const CLOUD_SNOW: char = '\u{1F328}';
pub const COMET: char = '\u{2604}';
pub const CROSS: char = '\u{274C}';
pub const DOWNWARD_TRIANGLE: char = '\u{1F53D}';
pub const DRY: char = '\u{1F940}'; // увядший цветок
pub const FOG: char = '\u{1F32B}';
pub const GOING_DOWN: char = '\u{2935}';
pub const GOING_UP: char = '\u{2934}';
pub const QUESTION_MARK: char = '\u{2753}';
pub const SATURN: char = '\u{1FA90}';
pub const SMOKING: char = '\u{1F6AC}';
pub const SUN: char = '\u{2600}';
pub const SUN_WITH_MEDIUM_CLOUD: char = '\u{26C5}';
pub const SUN_WITH_SMALL_CLOUD: char = '\u{1F324}';
pub const THERMOMETER: char = '\u{1F321}';
pub const THUNDER: char = '\u{1F329}';
pub const THUNDER_RAIN: char = '\u{26C8}';
pub const UMBRELLA: char = '\u{2602}';
pub const UMBRELLA_RAIN: char = '\u{2614}';
pub const UPWARD_TRIANGLE: char = '\u{1F53C}';
pub const WARNING: char = '\u{26A0}';
pub const WATER_DROP: char = '\u{1F4A7}';
pub const WIND: char = '\u{1F32C}';

// Стрелки показывают, куда дует ветер, а не откуда
pub const NORTH: char = '\u{2B07}';
pub const NORTH_EAST: char = '\u{2199}';
pub const EAST: char = '\u{2B05}';
pub const SOUTH_EAST: char = '\u{2196}';
pub const SOUTH: char = '\u{2B06}';
pub const SOUTH_WEST: char = '\u{2197}';
pub const WEST: char = '\u{27A1}';
pub const NORTH_WEST: char = '\u{2198}';

/// Значок для кода погоды поставщика.
pub fn for_weather_code(code: i32) -> char {
    match code {
        200..=202 => THUNDER_RAIN,
        230..=233 => THUNDER,
        300..=302 => UMBRELLA,
        500 | 501 => UMBRELLA_RAIN,
        502 | 511 | 520..=522 => CLOUD_RAIN,
        600..=602 | 610 | 621..=623 => CLOUD_SNOW,
        611 | 612 => SATURN,
        700 | 711 | 721 | 731 | 741 | 751 => FOG,
        800 => SUN,
        801 | 802 => SUN_WITH_SMALL_CLOUD,
        803 => SUN_WITH_MEDIUM_CLOUD,
        804 => CLOUD,
        900 => COMET,
        _ => QUESTION_MARK,
    }
}

/// Стрелка для кода направления ветра (16 румбов сводятся к 8 стрелкам).
pub fn for_wind_direction(code: &str) -> char {
    match code {
        "N" => NORTH,
        "NE" | "NNE" | "ENE" => NORTH_EAST,
        "E" => EAST,
        "SE" | "SSE" | "ESE" => SOUTH_EAST,
        "S" => SOUTH,
        "SW" | "SSW" | "WSW" => SOUTH_WEST,
        "W" => WEST,
        "NW" | "NNW" | "WNW" => NORTH_WEST,
        _ => BALLOON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_codes_map_to_their_groups() {
        assert_eq!(for_weather_code(201), THUNDER_RAIN);
        assert_eq!(for_weather_code(233), THUNDER);
        assert_eq!(for_weather_code(521), CLOUD_RAIN);
        assert_eq!(for_weather_code(612), SATURN);
        assert_eq!(for_weather_code(623), CLOUD_SNOW);
        assert_eq!(for_weather_code(800), SUN);
        assert_eq!(for_weather_code(900), COMET);
    }

    #[test]
    fn unknown_weather_code_is_a_question_mark() {
        assert_eq!(for_weather_code(0), QUESTION_MARK);
        assert_eq!(for_weather_code(503), QUESTION_MARK);
    }

    #[test]
    fn intermediate_compass_points_fold_into_neighbours() {
        assert_eq!(for_wind_direction("NNE"), NORTH_EAST);
        assert_eq!(for_wind_direction("WSW"), SOUTH_WEST);
        assert_eq!(for_wind_direction("WNW"), NORTH_WEST);
        assert_eq!(for_wind_direction("ESE"), SOUTH_EAST);
        assert_eq!(for_wind_direction("n"), BALLOON);
    }
}
