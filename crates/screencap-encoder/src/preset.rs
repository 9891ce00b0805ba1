//! Static container/codec presets.

use std::fmt;

use serde::{Deserialize, Serialize};

use screencap_ipc::{PresetInfo, QualityTier};

/// The closed set of container/codec combinations the recorder knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresetKind {
    /// WebM container, VP9 video.
    WebmVp9,

    /// WebM container, VP8 video.
    WebmVp8,

    /// MP4 container, H.264 video.
    Mp4H264,
}

impl PresetKind {
    /// Every preset, in picker order.
    pub const ALL: [PresetKind; 3] = [Self::WebmVp9, Self::WebmVp8, Self::Mp4H264];

    /// Stable string key.
    pub fn key(self) -> &'static str {
        match self {
            Self::WebmVp9 => "webm-vp9",
            Self::WebmVp8 => "webm-vp8",
            Self::Mp4H264 => "mp4-h264",
        }
    }

    /// Look up a preset by key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// The full preset description.
    pub fn preset(self) -> FormatPreset {
        match self {
            Self::WebmVp9 => FormatPreset {
                kind: self,
                mime_type: "video/webm; codecs=vp9",
                extension: "webm",
                base_bitrate: 2_500_000,
                display_name: "WebM (VP9)",
            },
            Self::WebmVp8 => FormatPreset {
                kind: self,
                mime_type: "video/webm; codecs=vp8",
                extension: "webm",
                base_bitrate: 2_000_000,
                display_name: "WebM (VP8)",
            },
            Self::Mp4H264 => FormatPreset {
                kind: self,
                mime_type: "video/mp4; codecs=avc1",
                extension: "mp4",
                base_bitrate: 3_000_000,
                display_name: "MP4 (H.264)",
            },
        }
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A named container + codec + baseline bitrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatPreset {
    pub kind: PresetKind,

    /// Container and codec, as passed to the encoder.
    pub mime_type: &'static str,

    /// File extension without the dot.
    pub extension: &'static str,

    /// Bitrate at Medium quality, in bits per second.
    pub base_bitrate: u32,

    pub display_name: &'static str,
}

impl FormatPreset {
    /// Stable string key.
    pub fn key(&self) -> &'static str {
        self.kind.key()
    }

    /// Summary for the UI.
    pub fn info(&self) -> PresetInfo {
        PresetInfo {
            key: self.key().to_string(),
            display_name: self.display_name.to_string(),
            extension: self.extension.to_string(),
        }
    }
}

/// A concrete encoder configuration derived from a preset and a quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    pub preset: FormatPreset,
    pub quality: QualityTier,

    /// Target bitrate in bits per second.
    pub bitrate: u32,
}

impl EncoderConfig {
    /// Derive the bitrate for `preset` at `quality`.
    ///
    /// This does not check runtime capability; use
    /// [`CaptureFormatRegistry::resolve`](crate::CaptureFormatRegistry::resolve) for that.
    pub fn new(preset: FormatPreset, quality: QualityTier) -> Self {
        Self {
            preset,
            quality,
            bitrate: quality.apply(preset.base_bitrate),
        }
    }

    /// The settings handed to the encoder factory.
    pub fn settings(&self) -> EncoderSettings {
        EncoderSettings {
            mime_type: self.preset.mime_type.to_string(),
            bitrate: self.bitrate,
        }
    }
}

/// Settings passed to [`EncoderFactory::construct`](crate::EncoderFactory::construct).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    pub mime_type: String,

    /// Video bits per second.
    pub bitrate: u32,
}
