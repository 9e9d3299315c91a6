use crate::config::Config;
use crate::service::MessageService;
use crate::storage::PgStorage;
use crate::telegram::TelegramReplier;
use crate::weather::WeatherClient;
use clap::Parser;
use dotenv::dotenv;
use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use teloxide::utils::command::BotCommands;

mod config;
mod emoji;
mod error;
mod formatter;
mod report;
mod service;
mod storage;
mod telegram;
mod utils;
mod weather;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
enum Command {
    #[command(description = "show the main menu")]
    Start,
    #[command(description = "hide the menu")]
    Stop,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    // Устанавливаем уровень логирования на info, если не задан
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();
    info!("Запуск бота прогноза погоды...");

    // Флаги, затем переменные окружения; при ошибке clap печатает справку
    let config = Config::parse();

    let storage = match PgStorage::connect(&config.database_url).await {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            error!("Не удалось подключиться к базе данных: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = storage.migrate().await {
        error!("Не удалось подготовить схему базы данных: {}", e);
        std::process::exit(1);
    }
    if let Some(path) = &config.world_cities_csv {
        if let Err(e) = storage.seed_world_cities(path).await {
            error!("Не удалось загрузить справочник городов из {}: {}", path, e);
            std::process::exit(1);
        }
    }

    let bot = Bot::new(&config.bot_token);

    info!("Настраиваю командную панель бота...");
    match bot.set_my_commands(Command::bot_commands()).await {
        Ok(_) => info!("Командная панель бота успешно обновлена"),
        Err(e) => warn!("Не удалось установить команды бота: {}", e),
    }

    let service = Arc::new(MessageService::new(
        storage.clone(),
        storage,
        Arc::new(WeatherClient::new(
            config.weather_api_key.clone(),
            config.language.clone(),
        )),
        Arc::new(TelegramReplier::new(bot.clone())),
    ));

    // Сообщения одного чата обрабатываются по очереди, разные чаты параллельно
    let handler = Update::filter_message().endpoint(handle_message);
    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![service])
        .enable_ctrlc_handler()
        .build();

    match config.webhook_url {
        Some(url) => {
            let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
            info!("Слушаю webhook {} на порту {}", url, config.port);
            let listener = match webhooks::axum(bot, webhooks::Options::new(addr, url)).await {
                Ok(listener) => listener,
                Err(e) => {
                    error!("Не удалось запустить webhook: {}", e);
                    std::process::exit(1);
                }
            };
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("Ошибка в слушателе обновлений"),
                )
                .await;
        }
        None => {
            // Удаляем webhook перед запуском бота, чтобы избежать конфликта с getUpdates
            match bot.delete_webhook().await {
                Ok(_) => info!("Webhook успешно удален"),
                Err(e) => error!("Ошибка при удалении webhook: {}", e),
            }
            info!("Бот готов к работе!");
            dispatcher.dispatch().await;
        }
    }

    info!("Бот остановлен");
}

async fn handle_message(msg: Message, service: Arc<MessageService>) -> ResponseResult<()> {
    let incoming = telegram::incoming(&msg);
    if let Err(e) = service.handle(&incoming).await {
        error!("Ошибка обработки сообщения в чате {}: {}", incoming.chat_id, e);
    }
    Ok(())
}
