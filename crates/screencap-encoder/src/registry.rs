//! Runtime-filtered view over the preset table.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, instrument, warn};

use screencap_ipc::QualityTier;

use crate::preset::{EncoderConfig, FormatPreset, PresetKind};
use crate::{EncoderCapability, EncoderError, EncoderResult};

/// Fallback priority, most widely encodable first.
pub const FALLBACK_ORDER: [PresetKind; 2] = [PresetKind::WebmVp8, PresetKind::WebmVp9];

/// Declares the supported presets and resolves user choices into
/// [`EncoderConfig`]s.
pub struct CaptureFormatRegistry {
    capability: Box<dyn EncoderCapability>,
}

impl CaptureFormatRegistry {
    /// Create a registry that filters presets through `capability`.
    pub fn new(capability: Box<dyn EncoderCapability>) -> Self {
        Self { capability }
    }

    /// Presets the runtime reports as encodable, in table order.
    pub fn available_presets(&self) -> Vec<FormatPreset> {
        PresetKind::ALL
            .into_iter()
            .map(PresetKind::preset)
            .filter(|preset| self.is_supported(preset))
            .collect()
    }

    /// Resolve a preset key and quality tier into an encoder configuration.
    #[instrument(name = "resolve_preset", skip(self))]
    pub fn resolve(&self, key: &str, quality: QualityTier) -> EncoderResult<EncoderConfig> {
        let preset = PresetKind::from_key(key)
            .map(PresetKind::preset)
            .filter(|preset| self.is_supported(preset))
            .ok_or_else(|| EncoderError::UnknownPreset(key.to_string()))?;

        let config = EncoderConfig::new(preset, quality);
        debug!(bitrate = config.bitrate, "Preset resolved");
        Ok(config)
    }

    /// The fallback priority list.
    pub fn fallback_order(&self) -> &'static [PresetKind] {
        &FALLBACK_ORDER
    }

    /// First fallback entry that differs from `rejected` and resolves on
    /// this runtime, at the same quality tier.
    pub fn fallback_for(&self, rejected: PresetKind, quality: QualityTier) -> Option<EncoderConfig> {
        self.fallback_order()
            .iter()
            .filter(|kind| **kind != rejected)
            .find_map(|kind| self.resolve(kind.key(), quality).ok())
    }

    /// Whether the runtime reports `kind` as encodable.
    pub fn supports(&self, kind: PresetKind) -> bool {
        self.is_supported(&kind.preset())
    }

    fn is_supported(&self, preset: &FormatPreset) -> bool {
        let capability = &self.capability;
        match catch_unwind(AssertUnwindSafe(|| capability.is_supported(preset.mime_type))) {
            Ok(supported) => supported,
            Err(_) => {
                warn!(
                    mime_type = preset.mime_type,
                    "Capability check panicked, treating preset as unsupported"
                );
                false
            }
        }
    }
}
