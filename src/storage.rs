use crate::error::StorageError;
use crate::service::{Coordinates, LocationStore, UserCoordinates, UserProfile, UserStore};
use async_trait::async_trait;
use log::{debug, info};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS users (
        user_id BIGINT PRIMARY KEY,
        username TEXT,
        first_name TEXT,
        last_name TEXT,
        language_code TEXT,
        is_bot BOOLEAN NOT NULL DEFAULT FALSE
    )",
    "CREATE TABLE IF NOT EXISTS locations (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL,
        latitude TEXT NOT NULL,
        longitude TEXT NOT NULL,
        location_name TEXT
    )",
    "CREATE TABLE IF NOT EXISTS world_cities (
        city TEXT,
        city_ascii TEXT,
        lat TEXT,
        long TEXT,
        country TEXT,
        iso2 TEXT,
        iso3 TEXT
    )",
];

const COUNT_WORLD_CITIES: &str = "SELECT COUNT(*) FROM world_cities";

const ADD_USER_IF_NOT_EXISTS: &str = "
    INSERT INTO users (user_id, username, first_name, last_name, language_code, is_bot)
    VALUES ($1, $2, $3, $4, $5, $6)
    ON CONFLICT (user_id) DO NOTHING";

const ADD_LOCATION_BY_COORDINATES: &str = "
    INSERT INTO locations (user_id, latitude, longitude)
    VALUES ($1, $2, $3)";

const GET_MOST_RECENT_LOCATION: &str = "
    SELECT id, user_id, latitude, longitude, location_name
    FROM locations
    WHERE user_id = $1
    ORDER BY id DESC
    LIMIT 1";

const SAVE_LOCATION_NAME: &str = "
    UPDATE locations
    SET location_name = $2
    WHERE id = (SELECT id FROM locations WHERE user_id = $1 ORDER BY id DESC LIMIT 1)";

const GET_COORDINATES_BY_CITY_NAME: &str = "
    SELECT lat, long
    FROM world_cities
    WHERE lower(city_ascii) = $1
    LIMIT 1";

#[derive(Debug, sqlx::FromRow)]
struct LocationRow {
    id: i64,
    user_id: i64,
    latitude: String,
    longitude: String,
    location_name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct WorldCityRow {
    lat: String,
    long: String,
}

// COPY не принимает параметры: путь экранируется как строковый литерал
fn copy_world_cities(path: &str) -> String {
    format!(
        "COPY world_cities FROM '{}' DELIMITER ',' CSV HEADER",
        path.replace('\'', "''")
    )
}

fn parse_coordinate(raw: &str) -> Result<f64, StorageError> {
    raw.trim()
        .parse()
        .map_err(|_| StorageError::BadCoordinate(raw.to_string()))
}

impl LocationRow {
    fn into_user_coordinates(self) -> Result<UserCoordinates, StorageError> {
        Ok(UserCoordinates {
            location_id: self.id,
            user_id: self.user_id,
            coordinates: Coordinates {
                latitude: parse_coordinate(&self.latitude)?,
                longitude: parse_coordinate(&self.longitude)?,
            },
            location_name: self.location_name,
        })
    }
}

impl WorldCityRow {
    fn into_coordinates(self) -> Result<Coordinates, StorageError> {
        Ok(Coordinates {
            latitude: parse_coordinate(&self.lat)?,
            longitude: parse_coordinate(&self.long)?,
        })
    }
}

/// Хранилище пользователей и их геопозиций в Postgres.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Создаёт таблицы, если их ещё нет. Справочник `world_cities` заполняется отдельно.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Схема базы данных готова");
        Ok(())
    }

    /// Заполняет пустой `world_cities` из CSV-файла на сервере базы данных.
    /// Уже заполненный справочник не трогаем.
    pub async fn seed_world_cities(&self, path: &str) -> Result<(), StorageError> {
        let count: i64 = sqlx::query_scalar(COUNT_WORLD_CITIES)
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            debug!("Справочник городов уже заполнен: {} строк", count);
            return Ok(());
        }

        let copy = copy_world_cities(path);
        let result = (&self.pool).execute(copy.as_str()).await?;
        info!("Загружено городов из {}: {}", path, result.rows_affected());
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStorage {
    async fn add_user_if_not_exists(&self, user: &UserProfile) -> Result<(), StorageError> {
        debug!("Добавляю пользователя {} в базу", user.user_id);
        let result = sqlx::query(ADD_USER_IF_NOT_EXISTS)
            .bind(user.user_id)
            .bind(&user.username)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.language_code)
            .bind(user.is_bot)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!("Пользователь {} уже есть в базе", user.user_id);
        }
        Ok(())
    }
}

#[async_trait]
impl LocationStore for PgStorage {
    async fn most_recent_location(&self, user_id: i64) -> Result<UserCoordinates, StorageError> {
        debug!("Читаю последнюю геопозицию пользователя {}", user_id);
        let row: Option<LocationRow> = sqlx::query_as(GET_MOST_RECENT_LOCATION)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(StorageError::NoLocation(user_id))?
            .into_user_coordinates()
    }

    async fn add_location_by_coordinates(
        &self,
        user_id: i64,
        coordinates: Coordinates,
    ) -> Result<(), StorageError> {
        debug!(
            "Сохраняю геопозицию пользователя {}: {}, {}",
            user_id, coordinates.latitude, coordinates.longitude
        );
        sqlx::query(ADD_LOCATION_BY_COORDINATES)
            .bind(user_id)
            .bind(coordinates.latitude.to_string())
            .bind(coordinates.longitude.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_location_name(&self, user_id: i64, name: &str) -> Result<(), StorageError> {
        debug!("Называю последнюю геопозицию пользователя {}: {}", user_id, name);
        sqlx::query(SAVE_LOCATION_NAME)
            .bind(user_id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn coordinates_by_city_name(
        &self,
        name: &str,
    ) -> Result<Option<Coordinates>, StorageError> {
        debug!("Ищу координаты города {}", name);
        let row: Option<WorldCityRow> = sqlx::query_as(GET_COORDINATES_BY_CITY_NAME)
            .bind(name.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        row.map(WorldCityRow::into_coordinates).transpose()
    }
}
