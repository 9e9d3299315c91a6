// Ошибки бота: по одному перечислению на каждого участника обработки
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("user {0} has no saved locations")]
    NoLocation(i64),
    #[error("cannot parse coordinate '{0}' from db")]
    BadCoordinate(String),
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("cannot perform request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("weather service responded with {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot unmarshal weather report: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("report has {available} data points, {requested} requested")]
    NotEnoughData { requested: usize, available: usize },
    #[error("unexpected datetime '{0}'")]
    BadTimestamp(String),
    #[error("datetime '{0}' carries no hour")]
    MissingHour(String),
}

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),
}

/// Ошибка обработки одного входящего сообщения.
///
/// Каждый вариант соответствует шагу обработчика и несёт его префикс.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("message has no sender")]
    MissingSender,
    #[error("message has no attached location")]
    MissingLocation,
    #[error("cannot add user: {0}")]
    AddUser(#[source] StorageError),
    #[error("cannot add location by coordinates: {0}")]
    AddLocation(#[source] StorageError),
    #[error("cannot get most recent location: {0}")]
    RecentLocation(#[source] StorageError),
    #[error("cannot resolve location '{name}': {source}")]
    ResolveLocation {
        name: String,
        #[source]
        source: StorageError,
    },
    #[error("cannot get forecast: {0}")]
    Forecast(#[source] WeatherError),
    #[error("cannot parse forecast: {0}")]
    Parse(#[source] ReportError),
    #[error("cannot format report: {0}")]
    Format(#[source] FormatError),
    #[error("cannot send message: {0}")]
    Send(#[source] ReplyError),
}
