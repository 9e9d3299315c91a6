use crate::error::WeatherError;
use crate::service::{Coordinates, ForecastSource};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;

const WEATHERBIT_URL: &str = "https://weatherbit-v1-mashape.p.rapidapi.com/";
const WEATHERBIT_HOST: &str = "weatherbit-v1-mashape.p.rapidapi.com";

/// Какой прогноз запрашивать у поставщика.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastPeriod {
    Current,
    Daily(u32),
    Hourly(u32),
}

impl ForecastPeriod {
    // Путь и параметры периода; остальная часть запроса добавляется в endpoint()
    fn path(self) -> String {
        match self {
            ForecastPeriod::Current => "current?".to_string(),
            ForecastPeriod::Daily(days) => format!("forecast/daily?days={}&", days),
            ForecastPeriod::Hourly(hours) => format!("forecast/hourly?hours={}&", hours),
        }
    }
}

#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    language: String,
}

impl WeatherClient {
    pub fn new(api_key: String, language: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            language,
        }
    }

    fn endpoint(&self, coordinates: Coordinates, period: ForecastPeriod) -> String {
        format!(
            "{}{}lang={}&lat={}&lon={}",
            WEATHERBIT_URL,
            period.path(),
            self.language,
            coordinates.latitude,
            coordinates.longitude
        )
    }
}

#[async_trait]
impl ForecastSource for WeatherClient {
    async fn get_forecast(
        &self,
        coordinates: Coordinates,
        period: ForecastPeriod,
    ) -> Result<Vec<u8>, WeatherError> {
        let url = self.endpoint(coordinates, period);
        debug!("Запрашиваю прогноз {:?} у поставщика", period);

        let response = self
            .client
            .get(&url)
            .header("x-rapidapi-host", WEATHERBIT_HOST)
            .header("x-rapidapi-key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "неизвестная ошибка".to_string());

            error!("Сервис погоды вернул ошибку: {} - {}", status, body);
            return Err(WeatherError::Status { status, body });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
