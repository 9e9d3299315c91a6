// Связка с Telegram: перевод сообщений teloxide во входящие и отправка ответов
use crate::error::ReplyError;
use crate::service::{Coordinates, Incoming, Replier, UserProfile};
use crate::utils::Keyboard;
use async_trait::async_trait;
use log::{debug, warn};
use teloxide::prelude::*;
use teloxide::types::{
    ButtonRequest, KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup, User,
};

pub struct TelegramReplier {
    bot: Bot,
}

impl TelegramReplier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn reply_markup(keyboard: Keyboard) -> ReplyMarkup {
    match keyboard.rows() {
        Some(rows) => {
            let rows = rows.into_iter().map(|row| {
                row.into_iter()
                    .map(|button| {
                        let key = KeyboardButton::new(button.label);
                        if button.request_location {
                            key.request(ButtonRequest::Location)
                        } else {
                            key
                        }
                    })
                    .collect::<Vec<_>>()
            });
            ReplyMarkup::Keyboard(KeyboardMarkup::new(rows))
        }
        None => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
    }
}

#[async_trait]
impl Replier for TelegramReplier {
    async fn send(&self, chat_id: i64, text: &str, keyboard: Keyboard) -> Result<(), ReplyError> {
        debug!("Отправляю ответ в чат {} с клавиатурой {:?}", chat_id, keyboard);
        self.bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(reply_markup(keyboard))
            .await?;
        Ok(())
    }
}

fn user_profile(user: &User) -> Option<UserProfile> {
    let user_id = match i64::try_from(user.id.0) {
        Ok(id) => id,
        Err(_) => {
            warn!("Идентификатор пользователя {} не помещается в i64", user.id.0);
            return None;
        }
    };

    Some(UserProfile {
        user_id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        language_code: user.language_code.clone(),
        is_bot: user.is_bot,
    })
}

/// Переводит сообщение Telegram во входящее сообщение бота.
pub fn incoming(msg: &Message) -> Incoming {
    Incoming {
        chat_id: msg.chat.id.0,
        user: msg.from().and_then(user_profile),
        text: msg.text().map(str::to_string),
        location: msg.location().map(|location| Coordinates {
            latitude: location.latitude,
            longitude: location.longitude,
        }),
    }
}
