//! Message model.
//!
//! On the wire each media kind is its own optional key; here they collapse
//! into a single [`Media`] value.

use serde::{Deserialize, Serialize};

use super::keyboard::InlineKeyboardMarkup;
use super::media::{Animation, Audio, Document, Media, PhotoSize, Sticker, Video, VideoNote, Voice};
use super::user::{Chat, User};

/// A message received from Telegram.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMessage", into = "RawMessage")]
pub struct Message {
    pub message_id: i64,

    /// Sender; absent for messages sent on behalf of channels.
    pub from: Option<User>,

    pub chat: Chat,

    /// Unix time the message was sent.
    pub date: i64,

    /// Text of a text message; empty for media and service messages.
    pub text: String,

    pub caption: Option<String>,

    pub reply_to_message: Option<Box<Message>>,

    pub reply_markup: Option<InlineKeyboardMarkup>,

    pub media: Option<Media>,
}

impl Message {
    pub fn chat_id(&self) -> i64 {
        self.chat.id
    }

    pub fn user_id(&self) -> Option<i64> {
        self.from.as_ref().map(|u| u.id)
    }

    pub fn username(&self) -> Option<&str> {
        self.from.as_ref().and_then(|u| u.username.as_deref())
    }

    /// Text if present, otherwise the media caption.
    pub fn text_or_caption(&self) -> Option<&str> {
        if !self.text.is_empty() {
            Some(&self.text)
        } else {
            self.caption.as_deref()
        }
    }

    pub fn is_command(&self) -> bool {
        self.text.starts_with('/')
    }
}

#[derive(Serialize, Deserialize)]
struct RawMessage {
    #[serde(default)]
    message_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<User>,
    chat: Chat,
    #[serde(default)]
    date: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reply_to_message: Option<Box<Message>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    photo: Option<Vec<PhotoSize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video: Option<Video>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    voice: Option<Voice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    animation: Option<Animation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    document: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sticker: Option<Sticker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio: Option<Audio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video_note: Option<VideoNote>,
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        // Animations also carry a `document` for older clients, so they are
        // checked first.
        let media = raw
            .photo
            .filter(|sizes| !sizes.is_empty())
            .map(Media::Photo)
            .or(raw.video.map(Media::Video))
            .or(raw.voice.map(Media::Voice))
            .or(raw.animation.map(Media::Animation))
            .or(raw.document.map(Media::Document))
            .or(raw.sticker.map(Media::Sticker))
            .or(raw.audio.map(Media::Audio))
            .or(raw.video_note.map(Media::VideoNote));

        Self {
            message_id: raw.message_id,
            from: raw.from,
            chat: raw.chat,
            date: raw.date,
            text: raw.text,
            caption: raw.caption,
            reply_to_message: raw.reply_to_message,
            reply_markup: raw.reply_markup,
            media,
        }
    }
}

impl From<Message> for RawMessage {
    fn from(msg: Message) -> Self {
        let mut raw = RawMessage {
            message_id: msg.message_id,
            from: msg.from,
            chat: msg.chat,
            date: msg.date,
            text: msg.text,
            caption: msg.caption,
            reply_to_message: msg.reply_to_message,
            reply_markup: msg.reply_markup,
            photo: None,
            video: None,
            voice: None,
            animation: None,
            document: None,
            sticker: None,
            audio: None,
            video_note: None,
        };

        match msg.media {
            Some(Media::Photo(sizes)) => raw.photo = Some(sizes),
            Some(Media::Video(v)) => raw.video = Some(v),
            Some(Media::Voice(v)) => raw.voice = Some(v),
            Some(Media::Document(d)) => raw.document = Some(d),
            Some(Media::Sticker(s)) => raw.sticker = Some(s),
            Some(Media::Animation(a)) => raw.animation = Some(a),
            Some(Media::Audio(a)) => raw.audio = Some(a),
            Some(Media::VideoNote(v)) => raw.video_note = Some(v),
            None => {}
        }

        raw
    }
}
