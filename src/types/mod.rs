//! Telegram entity models.
//!
//! Plain data records decoded from webhook payloads and API results.

mod keyboard;
mod media;
mod message;
mod update;
mod user;

pub use keyboard::{
    ForceReply, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, ReplyKeyboardMarkup,
    ReplyKeyboardRemove, ReplyMarkup,
};
pub use media::{
    Animation, Audio, Document, Media, PhotoSize, Sticker, StickerType, Video, VideoNote, Voice,
};
pub use message::Message;
pub use update::{CallbackQuery, InlineQuery, Update, UpdateKind};
pub use user::{Chat, ChatType, User};
