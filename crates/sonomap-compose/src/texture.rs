//! Texture injection
//!
//! Scatterer speckle is not layered. It is blended straight into one channel
//! of a layer before that layer is registered, typically
//! `rho -= pattern * contrast` on the background. Unlike composition this
//! adds to the existing values instead of replacing them.

use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use sonomap_core::{Channel, ChannelSet, DomainError, MaterialLayer, Result, Shape};
use tracing::debug;

/// How a pattern combines with the target channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureBlend {
    /// `target -= pattern * contrast`
    #[default]
    Subtract,
    /// `target += pattern * contrast`
    Add,
}

/// Direct blend of a pattern into one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureInjection {
    pub channel: Channel,
    /// Scale applied to the pattern, e.g. 0.035 for 3.5% density variation
    pub contrast: f64,
    #[serde(default)]
    pub blend: TextureBlend,
}

impl TextureInjection {
    /// Subtractive density texture, the usual scatterer setup
    pub fn density(contrast: f64) -> Self {
        Self {
            channel: Channel::Rho,
            contrast,
            blend: TextureBlend::Subtract,
        }
    }

    /// Set blend mode
    pub fn with_blend(mut self, blend: TextureBlend) -> Self {
        self.blend = blend;
        self
    }

    /// Blend `pattern` into the target channel set
    pub fn apply(&self, target: &mut ChannelSet, pattern: &Array2<f64>) -> Result<()> {
        if self.channel.is_binary() {
            return Err(DomainError::config(format!(
                "Cannot inject texture into binary channel {}",
                self.channel
            )));
        }
        if !self.contrast.is_finite() {
            return Err(DomainError::config(format!(
                "Texture contrast must be finite, got {}",
                self.contrast
            )));
        }
        target.shape().ensure_matches(Shape::of(pattern))?;

        let scale = match self.blend {
            TextureBlend::Subtract => -self.contrast,
            TextureBlend::Add => self.contrast,
        };
        Zip::from(target.get_mut(self.channel))
            .and(pattern)
            .for_each(|dst, &p| *dst += p * scale);

        debug!(
            channel = %self.channel,
            contrast = self.contrast,
            blend = ?self.blend,
            "Injected texture"
        );
        Ok(())
    }

    /// Blend `pattern` into a layer that has not been registered yet
    pub fn apply_to_layer(&self, layer: &mut MaterialLayer, pattern: &Array2<f64>) -> Result<()> {
        self.apply(layer.channels_mut(), pattern)
    }
}
