//! Messages exchanged with the content surface.
//!
//! The content side posts JSON envelopes of the form
//! `{"channel": "...", "id": 7, "payload": ...}`. `id` is present only on
//! request/response channels; the matching [`Reply`] carries it back.

use crate::error::{Result, ShellError};
use crate::geometry::{Bounds, ClipRect, LogicalSize, ScreenPoint};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CH_RESIZE: &str = "resize-to-webamp";
pub const CH_SET_SCALE: &str = "set-scale";
pub const CH_MINIMIZE: &str = "minimize";
pub const CH_CLOSE: &str = "close";
pub const CH_THUMBNAIL_CLIP: &str = "setThumbnailClip";
pub const CH_GET_BOUNDS: &str = "getBounds";
pub const CH_GET_CURSOR: &str = "getCursorScreenPoint";
pub const CH_DRAG_WINDOW: &str = "drag-window";
pub const CH_DOCUMENT_READY: &str = "document-ready";
pub const CH_READY_TO_SHOW: &str = "ready-to-show";
pub const CH_CONSOLE: &str = "console";

#[derive(Debug, Deserialize)]
struct Envelope {
    channel: String,
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    payload: Value,
}

/// Request identifier for request/response channels.
pub type RequestId = u64;

/// A request from the embedded UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentMessage {
    ResizeToWebamp(LogicalSize),
    SetScale { id: RequestId, value: Value },
    Minimize,
    Close,
    SetThumbnailClip(ClipRect),
    GetBounds { id: RequestId },
    GetCursorScreenPoint { id: RequestId },
    DragWindow,
    Console(ConsoleEntry),
}

/// Document lifecycle signals raised by the bridge script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeSignal {
    DocumentReady,
    ReadyToShow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Message(ContentMessage),
    Signal(BridgeSignal),
}

/// A console line forwarded from the content surface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConsoleEntry {
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub line: u32,
}

impl ConsoleEntry {
    pub fn log_level(&self) -> log::Level {
        match self.level.as_str() {
            "error" => log::Level::Error,
            "warn" | "warning" => log::Level::Warn,
            "debug" => log::Level::Debug,
            "trace" => log::Level::Trace,
            _ => log::Level::Info,
        }
    }
}

impl Inbound {
    /// Decode one posted envelope.
    pub fn parse(raw: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(raw)?;
        let Envelope {
            channel,
            id,
            payload,
        } = envelope;

        let require_id = |channel: &str| {
            id.ok_or_else(|| ShellError::InvalidMessage(format!("`{channel}` needs a request id")))
        };

        let inbound = match channel.as_str() {
            CH_RESIZE => {
                let size: LogicalSize = decode_payload(&channel, payload)?;
                Inbound::Message(ContentMessage::ResizeToWebamp(size))
            }
            CH_SET_SCALE => Inbound::Message(ContentMessage::SetScale {
                id: require_id(&channel)?,
                value: payload,
            }),
            CH_MINIMIZE => Inbound::Message(ContentMessage::Minimize),
            CH_CLOSE => Inbound::Message(ContentMessage::Close),
            CH_THUMBNAIL_CLIP => {
                let clip: ClipRect = decode_payload(&channel, payload)?;
                Inbound::Message(ContentMessage::SetThumbnailClip(clip))
            }
            CH_GET_BOUNDS => Inbound::Message(ContentMessage::GetBounds {
                id: require_id(&channel)?,
            }),
            CH_GET_CURSOR => Inbound::Message(ContentMessage::GetCursorScreenPoint {
                id: require_id(&channel)?,
            }),
            CH_DRAG_WINDOW => Inbound::Message(ContentMessage::DragWindow),
            CH_CONSOLE => {
                let entry: ConsoleEntry = decode_payload(&channel, payload)?;
                Inbound::Message(ContentMessage::Console(entry))
            }
            CH_DOCUMENT_READY => Inbound::Signal(BridgeSignal::DocumentReady),
            CH_READY_TO_SHOW => Inbound::Signal(BridgeSignal::ReadyToShow),
            _ => return Err(ShellError::UnknownChannel(channel.clone())),
        };
        Ok(inbound)
    }
}

fn decode_payload<T: for<'de> Deserialize<'de>>(channel: &str, payload: Value) -> Result<T> {
    serde_json::from_value(payload)
        .map_err(|err| ShellError::InvalidMessage(format!("`{channel}` payload: {err}")))
}

/// Result of a `set-scale` request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl ScaleReply {
    pub fn accepted(scale: f64) -> Self {
        Self {
            ok: true,
            scale: Some(scale),
        }
    }

    pub fn rejected() -> Self {
        Self {
            ok: false,
            scale: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyBody {
    Scale(ScaleReply),
    Bounds(Bounds),
    Point(ScreenPoint),
    Error { error: String },
}

/// Response to a request/response channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub id: RequestId,
    pub result: ReplyBody,
}

impl Reply {
    pub fn new(id: RequestId, result: ReplyBody) -> Self {
        Self { id, result }
    }

    pub fn error(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(
            id,
            ReplyBody::Error {
                error: message.into(),
            },
        )
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
