use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use reqwest::Url;

// Настройки бота: флаги командной строки или переменные окружения (после загрузки .env).
// Флаг имеет приоритет над переменной.
#[derive(Debug, Clone, Parser)]
#[command(name = "forecast-bot", about = "Telegram bot with weather forecasts")]
pub struct Config {
    /// Token to access Telegram Bot API
    #[arg(long, env = "BOT_TOKEN", value_parser = NonEmptyStringValueParser::new())]
    pub bot_token: String,

    /// Client's key to access weather API
    #[arg(long, env = "WEATHER_API", value_parser = NonEmptyStringValueParser::new())]
    pub weather_api_key: String,

    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL", value_parser = NonEmptyStringValueParser::new())]
    pub database_url: String,

    /// Port to listen to in webhook mode
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Public webhook URL; long polling is used when absent
    #[arg(long = "webhook", env = "WEBHOOK")]
    pub webhook_url: Option<Url>,

    /// Forecast language
    #[arg(long, env = "LANGUAGE", default_value = "en")]
    pub language: String,

    /// CSV file (on the database server) to fill an empty world_cities table from
    #[arg(long, env = "WORLD_CITIES_CSV")]
    pub world_cities_csv: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    // Полный набор обязательных флагов
    fn args(extra: &[&str]) -> Vec<String> {
        let mut args = vec![
            "forecast-bot",
            "--bot-token",
            "123:abc",
            "--weather-api-key",
            "key",
            "--database-url",
            "postgres://localhost/weather",
        ];
        args.extend_from_slice(extra);
        args.into_iter().map(str::to_string).collect()
    }

    #[test]
    fn defaults_apply_to_optional_values() {
        let config = Config::try_parse_from(args(&["--language", "en"])).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.port, 8080);
        assert_eq!(config.language, "en");
        assert!(config.world_cities_csv.is_none());
    }

    #[test]
    fn reads_port_webhook_and_language_flags() {
        let config = Config::try_parse_from(args(&[
            "--port",
            "9000",
            "--webhook",
            "https://example.org/bot",
            "--language",
            "de",
            "--world-cities-csv",
            "/world_cities.csv",
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.language, "de");
        assert_eq!(
            config.webhook_url.map(|url| url.to_string()),
            Some("https://example.org/bot".to_string())
        );
        assert_eq!(config.world_cities_csv.as_deref(), Some("/world_cities.csv"));
    }

    #[test]
    fn token_is_read_from_environment() {
        // Остальные тесты всегда передают токен флагом, поэтому переменная им не мешает
        std::env::set_var("BOT_TOKEN", "456:env");
        let config = Config::try_parse_from([
            "forecast-bot",
            "--weather-api-key",
            "key",
            "--database-url",
            "postgres://localhost/weather",
        ])
        .unwrap();
        assert_eq!(config.bot_token, "456:env");

        let config = Config::try_parse_from(args(&[])).unwrap();
        assert_eq!(config.bot_token, "123:abc");
    }

    #[test]
    fn missing_database_url_is_reported() {
        let err = Config::try_parse_from([
            "forecast-bot",
            "--bot-token",
            "123:abc",
            "--weather-api-key",
            "key",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.to_string().contains("--database-url"));
    }

    #[test]
    fn blank_token_is_rejected() {
        let mut args = args(&[]);
        args[2] = String::new();
        assert!(Config::try_parse_from(args).is_err());
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = Config::try_parse_from(args(&["--port", "eighty"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn bad_webhook_url_is_rejected() {
        let err = Config::try_parse_from(args(&["--webhook", "not a url"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }
}
