// Тексты кнопок и ответов бота, а также вспомогательные функции для них
use rand::seq::SliceRandom;

pub const START: &str = "/start";
pub const STOP: &str = "/stop";
pub const AT_MY_LOCATION: &str = "Weather at my location";
pub const ELSEWHERE: &str = "Weather elsewhere";
pub const BACK_TO_MAIN: &str = "< Back";
pub const BACK_TO_PERIOD: &str = "<< Back";
pub const BY_HOURS: &str = "By Hours";
pub const BY_DAYS: &str = "By Days";
pub const NOW: &str = "Now";

pub const DAY_PERIODS: [u32; 5] = [3, 5, 7, 10, 16];
pub const HOUR_PERIODS: [u32; 5] = [24, 48, 72, 96, 120];

pub const DEFAULT_MESSAGE: &str =
    "Hi! I can tell you what the weather is like. Share your location or name a place to begin.";
pub const END: &str = "Bye! Send /start whenever you need a forecast again.";
pub const CHOOSE_LOCATION: &str = "Where would you like to know the weather?";
pub const CHOOSE_PERIOD_TYPE: &str = "Would you like the forecast by hours, by days or right now?";
pub const CHOOSE_PERIOD: &str = "Choose the period.";
pub const COORDS_ACCEPTED: &str = "Location accepted. What forecast would you like?";
pub const DIFF_PLACE_ACCEPTED: &str = "Type the name of the city you are interested in.";
pub const TRY_AGAIN: &str = "Sorry, I couldn't find that place. Check the spelling and try again.";
pub const UNKNOWN: &str = "Sorry, I don't understand. Please use the buttons below.";

pub const SAYINGS: [&str; 6] = [
    "There is no such thing as bad weather, only unsuitable clothing.",
    "Red sky at night, sailor's delight.",
    "Whether the weather be fine, or whether the weather be not, we'll weather the weather, whatever the weather.",
    "Everybody talks about the weather, but nobody does anything about it.",
    "Sunshine is delicious, rain is refreshing, wind braces us up, snow is exhilarating.",
    "Climate is what we expect, weather is what we get.",
];

/// Клавиатура, которая прикрепляется к ответу. По ней пользователь видит,
/// на каком экране меню он находится.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    Main,
    Period,
    Days,
    Hours,
    BackToMain,
    Hidden,
}

/// Кнопка клавиатуры: текст и признак запроса геопозиции.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub request_location: bool,
}

impl Button {
    fn text(label: &str) -> Self {
        Button {
            label: label.to_string(),
            request_location: false,
        }
    }

    fn location(label: &str) -> Self {
        Button {
            label: label.to_string(),
            request_location: true,
        }
    }
}

impl Keyboard {
    /// Ряды кнопок; `None` означает, что клавиатуру нужно скрыть.
    pub fn rows(self) -> Option<Vec<Vec<Button>>> {
        let rows = match self {
            Keyboard::Main => vec![
                vec![Button::location(AT_MY_LOCATION)],
                vec![Button::text(ELSEWHERE)],
            ],
            Keyboard::Period => vec![
                vec![Button::text(BY_HOURS), Button::text(BY_DAYS)],
                vec![Button::text(NOW), Button::text(BACK_TO_MAIN)],
            ],
            Keyboard::Days => period_rows(&DAY_PERIODS, days_label),
            Keyboard::Hours => period_rows(&HOUR_PERIODS, hours_label),
            Keyboard::BackToMain => vec![vec![Button::text(BACK_TO_MAIN)]],
            Keyboard::Hidden => return None,
        };
        Some(rows)
    }
}

// Два ряда по три кнопки, последняя ведёт назад к выбору типа прогноза
fn period_rows(periods: &[u32], label: fn(u32) -> String) -> Vec<Vec<Button>> {
    let mut buttons: Vec<Button> = periods.iter().map(|&n| Button::text(&label(n))).collect();
    buttons.push(Button::text(BACK_TO_PERIOD));
    buttons.chunks(3).map(|chunk| chunk.to_vec()).collect()
}

pub fn days_label(days: u32) -> String {
    format!("{} days", days)
}

pub fn hours_label(hours: u32) -> String {
    format!("{} hours", hours)
}

/// Число из первого слова текста кнопки: "96 hours" -> 96.
pub fn extract_numerals(text: &str) -> Option<u32> {
    text.split_whitespace().next()?.parse().ok()
}

pub fn pick_a_saying() -> &'static str {
    SAYINGS.choose(&mut rand::thread_rng()).copied().unwrap_or_default()
}
