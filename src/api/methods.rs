//! Outbound Bot API methods.

use std::path::Path;

use reqwest::StatusCode;
use serde_json::json;
use tracing::debug;

use super::params::ParamBuilder;
use super::requests::*;
use super::Bot;
use crate::error::BotError;
use crate::types::{Message, User};

impl Bot {
    // Webhook management

    /// Register `url` as the webhook.
    pub async fn set_webhook(&self, url: impl Into<String>) -> Result<(), BotError> {
        self.set_webhook_with(&SetWebhookRequest {
            url: url.into(),
            ..Default::default()
        })
        .await
    }

    pub async fn set_webhook_with(&self, req: &SetWebhookRequest) -> Result<(), BotError> {
        self.execute("setWebhook", req).await
    }

    pub async fn delete_webhook(&self) -> Result<(), BotError> {
        self.execute("deleteWebhook", &json!({})).await
    }

    pub async fn get_webhook_info(&self) -> Result<WebhookInfo, BotError> {
        self.call("getWebhookInfo", &json!({})).await
    }

    // Bot identity and lifecycle

    pub async fn get_me(&self) -> Result<User, BotError> {
        self.call("getMe", &json!({})).await
    }

    /// Log out from the cloud Bot API server before moving to a local one.
    pub async fn log_out(&self) -> Result<(), BotError> {
        self.execute("logOut", &json!({})).await
    }

    /// Close the bot instance before moving it between local servers.
    pub async fn close(&self) -> Result<(), BotError> {
        self.execute("close", &json!({})).await
    }

    // Messages

    pub async fn send_message(&self, chat_id: i64, text: impl Into<String>) -> Result<Message, BotError> {
        self.send_message_with(&SendMessageRequest::new(chat_id, text))
            .await
    }

    pub async fn send_message_with(&self, req: &SendMessageRequest) -> Result<Message, BotError> {
        if req.text.is_empty() {
            return Err(BotError::new(StatusCode::BAD_REQUEST, "Message text is empty"));
        }
        self.call("sendMessage", req).await
    }

    pub async fn forward_message(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
    ) -> Result<Message, BotError> {
        self.forward_message_with(&ForwardMessageRequest {
            chat_id,
            from_chat_id,
            message_id,
            ..Default::default()
        })
        .await
    }

    pub async fn forward_message_with(&self, req: &ForwardMessageRequest) -> Result<Message, BotError> {
        self.call("forwardMessage", req).await
    }

    pub async fn forward_messages(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_ids: Vec<i64>,
    ) -> Result<Vec<MessageId>, BotError> {
        self.forward_messages_with(&ForwardMessagesRequest {
            chat_id,
            from_chat_id,
            message_ids,
            ..Default::default()
        })
        .await
    }

    pub async fn forward_messages_with(
        &self,
        req: &ForwardMessagesRequest,
    ) -> Result<Vec<MessageId>, BotError> {
        self.call("forwardMessages", req).await
    }

    pub async fn copy_message(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
    ) -> Result<MessageId, BotError> {
        self.copy_message_with(&CopyMessageRequest {
            chat_id,
            from_chat_id,
            message_id,
            ..Default::default()
        })
        .await
    }

    pub async fn copy_message_with(&self, req: &CopyMessageRequest) -> Result<MessageId, BotError> {
        self.call("copyMessage", req).await
    }

    pub async fn copy_messages(
        &self,
        chat_id: i64,
        from_chat_id: i64,
        message_ids: Vec<i64>,
    ) -> Result<Vec<MessageId>, BotError> {
        self.copy_messages_with(&CopyMessagesRequest {
            chat_id,
            from_chat_id,
            message_ids,
            ..Default::default()
        })
        .await
    }

    pub async fn copy_messages_with(
        &self,
        req: &CopyMessagesRequest,
    ) -> Result<Vec<MessageId>, BotError> {
        self.call("copyMessages", req).await
    }

    pub async fn edit_message_text(&self, req: &EditMessageTextRequest) -> Result<(), BotError> {
        self.execute("editMessageText", req).await
    }

    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), BotError> {
        self.execute("deleteMessage", &DeleteMessageRequest { chat_id, message_id })
            .await
    }

    pub async fn send_chat_action(&self, chat_id: i64, action: ChatAction) -> Result<(), BotError> {
        self.execute("sendChatAction", &SendChatActionRequest { chat_id, action })
            .await
    }

    pub async fn answer_callback_query(&self, req: &AnswerCallbackQueryRequest) -> Result<(), BotError> {
        self.execute("answerCallbackQuery", req).await
    }

    // Media

    /// Send a photo by file id or URL.
    pub async fn send_photo(&self, req: &SendPhotoRequest) -> Result<Message, BotError> {
        self.call("sendPhoto", req).await
    }

    /// Upload a photo from a local file. `req.photo` is ignored.
    pub async fn send_photo_file(
        &self,
        req: &SendPhotoRequest,
        path: impl AsRef<Path>,
    ) -> Result<Message, BotError> {
        let path = path.as_ref();
        debug!("Uploading photo {} to chat {}", path.display(), req.chat_id);

        let fields = ParamBuilder::from_request(req)
            .map_err(|e| {
                BotError::with_source(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to encode request parameters",
                    e,
                )
            })?
            .remove("photo")
            .into_form_fields();

        self.call_multipart("sendPhoto", fields, "photo", path).await
    }

    pub async fn send_audio(&self, req: &SendAudioRequest) -> Result<Message, BotError> {
        self.call("sendAudio", req).await
    }

    pub async fn send_video(&self, req: &SendVideoRequest) -> Result<Message, BotError> {
        self.call("sendVideo", req).await
    }

    pub async fn send_document(&self, req: &SendDocumentRequest) -> Result<Message, BotError> {
        self.call("sendDocument", req).await
    }

    pub async fn send_animation(&self, req: &SendAnimationRequest) -> Result<Message, BotError> {
        self.call("sendAnimation", req).await
    }

    pub async fn send_voice(&self, req: &SendVoiceRequest) -> Result<Message, BotError> {
        self.call("sendVoice", req).await
    }

    pub async fn send_video_note(&self, req: &SendVideoNoteRequest) -> Result<Message, BotError> {
        self.call("sendVideoNote", req).await
    }
}
