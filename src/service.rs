// Обработка входящих сообщений: определяем намерение по тексту кнопки,
// обращаемся к хранилищам и поставщику прогноза, отправляем один ответ.
use crate::error::{HandlerError, ReplyError, StorageError, WeatherError};
use crate::formatter;
use crate::report;
use crate::utils::{self, Keyboard};
use crate::weather::ForecastPeriod;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Сохранённая геопозиция пользователя.
#[derive(Debug, Clone, PartialEq)]
pub struct UserCoordinates {
    pub location_id: i64,
    pub user_id: i64,
    pub coordinates: Coordinates,
    pub location_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub language_code: Option<String>,
    pub is_bot: bool,
}

/// Входящее сообщение, уже отвязанное от типов Telegram.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub chat_id: i64,
    pub user: Option<UserProfile>,
    pub text: Option<String>,
    pub location: Option<Coordinates>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn add_user_if_not_exists(&self, user: &UserProfile) -> Result<(), StorageError>;
}

#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn most_recent_location(&self, user_id: i64) -> Result<UserCoordinates, StorageError>;
    async fn add_location_by_coordinates(
        &self,
        user_id: i64,
        coordinates: Coordinates,
    ) -> Result<(), StorageError>;
    async fn save_location_name(&self, user_id: i64, name: &str) -> Result<(), StorageError>;
    /// `None`, если город не найден.
    async fn coordinates_by_city_name(
        &self,
        name: &str,
    ) -> Result<Option<Coordinates>, StorageError>;
}

#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn get_forecast(
        &self,
        coordinates: Coordinates,
        period: ForecastPeriod,
    ) -> Result<Vec<u8>, WeatherError>;
}

#[async_trait]
pub trait Replier: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str, keyboard: Keyboard) -> Result<(), ReplyError>;
}

/// Что пользователь хочет сделать, судя по нажатой кнопке.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Start,
    Stop,
    ShareLocation,
    WeatherElsewhere,
    BackToMain,
    BackToPeriod,
    ByHours,
    ByDays,
    Now,
    Days(u32),
    Hours(u32),
    PlaceName(String),
    Unknown,
}

impl Intent {
    /// Сопоставляет текст сообщения с кнопками меню (точное совпадение с учётом регистра).
    /// Свободный текст считается названием места, только если бот его ждёт.
    pub fn classify(text: Option<&str>, has_location: bool, awaiting_place: bool) -> Intent {
        let text = match text {
            Some(text) if !text.is_empty() => text,
            _ if has_location => return Intent::ShareLocation,
            _ => return Intent::Unknown,
        };

        match text {
            utils::START => Intent::Start,
            utils::STOP => Intent::Stop,
            utils::AT_MY_LOCATION => Intent::ShareLocation,
            utils::ELSEWHERE => Intent::WeatherElsewhere,
            utils::BACK_TO_MAIN => Intent::BackToMain,
            utils::BACK_TO_PERIOD => Intent::BackToPeriod,
            utils::BY_HOURS => Intent::ByHours,
            utils::BY_DAYS => Intent::ByDays,
            utils::NOW => Intent::Now,
            _ => match utils::extract_numerals(text) {
                Some(n) if utils::DAY_PERIODS.contains(&n) && text == utils::days_label(n) => {
                    Intent::Days(n)
                }
                Some(n) if utils::HOUR_PERIODS.contains(&n) && text == utils::hours_label(n) => {
                    Intent::Hours(n)
                }
                _ if awaiting_place => Intent::PlaceName(text.to_string()),
                _ => Intent::Unknown,
            },
        }
    }
}

// Вид прогноза, который нужно отрисовать после запроса к поставщику
#[derive(Debug, Clone, Copy)]
enum View {
    Now,
    Hours(u32),
    Days(u32),
}

impl View {
    fn period(self) -> ForecastPeriod {
        match self {
            View::Now => ForecastPeriod::Current,
            View::Hours(n) => ForecastPeriod::Hourly(n),
            View::Days(n) => ForecastPeriod::Daily(n),
        }
    }

    fn keyboard(self) -> Keyboard {
        match self {
            View::Now => Keyboard::Period,
            View::Hours(_) => Keyboard::Hours,
            View::Days(_) => Keyboard::Days,
        }
    }
}

pub struct MessageService {
    users: Arc<dyn UserStore>,
    locations: Arc<dyn LocationStore>,
    forecasts: Arc<dyn ForecastSource>,
    replier: Arc<dyn Replier>,
    // Чаты, от которых ждём название места после "Weather elsewhere"
    awaiting_place: RwLock<HashSet<i64>>,
}

impl MessageService {
    pub fn new(
        users: Arc<dyn UserStore>,
        locations: Arc<dyn LocationStore>,
        forecasts: Arc<dyn ForecastSource>,
        replier: Arc<dyn Replier>,
    ) -> Self {
        Self {
            users,
            locations,
            forecasts,
            replier,
            awaiting_place: RwLock::new(HashSet::new()),
        }
    }

    /// Обрабатывает одно сообщение. Ошибка означает, что ответ не был отправлен.
    pub async fn handle(&self, message: &Incoming) -> Result<(), HandlerError> {
        let awaiting_place = self.awaiting_place.read().await.contains(&message.chat_id);
        let intent = Intent::classify(
            message.text.as_deref(),
            message.location.is_some(),
            awaiting_place,
        );
        info!("Чат {}: {:?}", message.chat_id, intent);

        // Ожидание названия места сбрасывается любым другим действием
        match intent {
            Intent::WeatherElsewhere | Intent::PlaceName(_) => {}
            _ if awaiting_place => {
                self.awaiting_place.write().await.remove(&message.chat_id);
            }
            _ => {}
        }

        match intent {
            Intent::Start => self.handle_start(message).await,
            Intent::Stop => self.reply(message, utils::END, Keyboard::Hidden).await,
            Intent::ShareLocation => self.handle_location_by_coordinates(message).await,
            Intent::WeatherElsewhere => self.handle_weather_elsewhere(message).await,
            Intent::BackToMain => {
                self.reply(message, utils::CHOOSE_LOCATION, Keyboard::Main)
                    .await
            }
            Intent::BackToPeriod => {
                self.reply(message, utils::CHOOSE_PERIOD_TYPE, Keyboard::Period)
                    .await
            }
            Intent::ByHours => self.reply(message, utils::CHOOSE_PERIOD, Keyboard::Hours).await,
            Intent::ByDays => self.reply(message, utils::CHOOSE_PERIOD, Keyboard::Days).await,
            Intent::Now => self.handle_forecast(message, View::Now).await,
            Intent::Hours(n) => self.handle_forecast(message, View::Hours(n)).await,
            Intent::Days(n) => self.handle_forecast(message, View::Days(n)).await,
            Intent::PlaceName(name) => self.handle_location_by_text(message, &name).await,
            Intent::Unknown => self.reply(message, utils::UNKNOWN, Keyboard::Main).await,
        }
    }

    async fn reply(
        &self,
        message: &Incoming,
        text: &str,
        keyboard: Keyboard,
    ) -> Result<(), HandlerError> {
        self.replier
            .send(message.chat_id, text, keyboard)
            .await
            .map_err(HandlerError::Send)
    }

    async fn handle_start(&self, message: &Incoming) -> Result<(), HandlerError> {
        let user = message.user.as_ref().ok_or(HandlerError::MissingSender)?;
        self.users
            .add_user_if_not_exists(user)
            .await
            .map_err(HandlerError::AddUser)?;

        let greeting = format!("{}\n{}", utils::DEFAULT_MESSAGE, utils::pick_a_saying());
        self.reply(message, &greeting, Keyboard::Main).await
    }

    async fn handle_weather_elsewhere(&self, message: &Incoming) -> Result<(), HandlerError> {
        self.awaiting_place.write().await.insert(message.chat_id);
        self.reply(message, utils::DIFF_PLACE_ACCEPTED, Keyboard::Hidden)
            .await
    }

    async fn handle_location_by_coordinates(&self, message: &Incoming) -> Result<(), HandlerError> {
        let user = message.user.as_ref().ok_or(HandlerError::MissingSender)?;
        let coordinates = message.location.ok_or(HandlerError::MissingLocation)?;

        self.locations
            .add_location_by_coordinates(user.user_id, coordinates)
            .await
            .map_err(HandlerError::AddLocation)?;

        self.reply(message, utils::COORDS_ACCEPTED, Keyboard::Period)
            .await
    }

    async fn handle_location_by_text(
        &self,
        message: &Incoming,
        name: &str,
    ) -> Result<(), HandlerError> {
        let user = message.user.as_ref().ok_or(HandlerError::MissingSender)?;
        let found = self
            .locations
            .coordinates_by_city_name(name)
            .await
            .map_err(|source| HandlerError::ResolveLocation {
                name: name.to_string(),
                source,
            })?;

        let Some(coordinates) = found else {
            debug!("Место '{}' не найдено", name);
            return self.reply(message, utils::TRY_AGAIN, Keyboard::BackToMain).await;
        };

        self.locations
            .add_location_by_coordinates(user.user_id, coordinates)
            .await
            .map_err(HandlerError::AddLocation)?;
        self.awaiting_place.write().await.remove(&message.chat_id);

        self.reply(message, utils::COORDS_ACCEPTED, Keyboard::Period)
            .await
    }

    async fn handle_forecast(&self, message: &Incoming, view: View) -> Result<(), HandlerError> {
        let user = message.user.as_ref().ok_or(HandlerError::MissingSender)?;
        let location = self
            .locations
            .most_recent_location(user.user_id)
            .await
            .map_err(HandlerError::RecentLocation)?;
        debug!(
            "Геопозиция {} пользователя {} ({:?})",
            location.location_id, location.user_id, location.location_name
        );

        let payload = self
            .forecasts
            .get_forecast(location.coordinates, view.period())
            .await
            .map_err(HandlerError::Forecast)?;
        let report = report::parse_weather(&payload).map_err(HandlerError::Parse)?;

        let text = match view {
            View::Now => formatter::format_now(&report),
            View::Hours(n) => formatter::format_hours(&report, n as usize),
            View::Days(n) => formatter::format_days(&report, n as usize),
        }
        .map_err(HandlerError::Format)?;

        self.reply(message, &text, view.keyboard()).await?;

        // Имя места вторично: ответ уже ушёл, поэтому ошибку только логируем
        let city = report.display_city();
        if !city.is_empty() {
            if let Err(e) = self.locations.save_location_name(user.user_id, city).await {
                warn!(
                    "Не удалось сохранить название места для пользователя {}: {}",
                    user.user_id, e
                );
            }
        }
        Ok(())
    }
}
