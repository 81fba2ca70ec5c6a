use pigment_shading::{AddressMode, FilterMode, FragmentVariant};

/// How shaded pixels are combined with the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Pick from the variant, see [`BlendMode::for_variant`].
    #[default]
    Auto,
    /// Colors already carry their alpha (egui output).
    Premultiplied,
    /// Classic `src * a + dst * (1 - a)`.
    Straight,
    /// Overwrite the target. Integer targets always use this.
    Replace,
}

impl BlendMode {
    /// Blend that matches what `variant` writes.
    ///
    /// The coverage path scales only alpha and leaves RGB at full strength, so its output is
    /// straight alpha. Gamma keeps the premultiplied vertex colors as they are.
    pub fn for_variant(variant: FragmentVariant) -> Self {
        match variant {
            FragmentVariant::Passthrough => Self::Replace,
            FragmentVariant::Gamma => Self::Premultiplied,
            FragmentVariant::Coverage | FragmentVariant::ModeBranch => Self::Straight,
        }
    }

    pub(crate) fn to_wgpu(self) -> Option<wgpu::BlendState> {
        match self {
            Self::Auto => None,
            Self::Premultiplied => Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
            Self::Straight => Some(wgpu::BlendState::ALPHA_BLENDING),
            Self::Replace => None,
        }
    }
}

/// Renderer configuration.
///
/// ```ignore
/// let config = RendererConfig {
///     variant: FragmentVariant::Coverage,
///     ..Default::default()
/// };
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RendererConfig {
    /// Pixel-stage variant; selects shader, vertex layout and bind groups.
    pub variant: FragmentVariant,
    /// Format of the render target.
    ///
    /// The float variants gamma-encode in the shader, so this should be a linear-storage
    /// (`*Unorm`) format. The passthrough variant needs an integer format.
    pub output_format: wgpu::TextureFormat,
    pub blend: BlendMode,
    pub filter: FilterMode,
    pub address_mode: AddressMode,
    /// Clear the target before drawing. `None` draws over existing content.
    pub clear_color: Option<wgpu::Color>,
    pub initial_vertex_capacity: usize,
    pub initial_index_capacity: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            variant: FragmentVariant::ModeBranch,
            output_format: wgpu::TextureFormat::Rgba8Unorm,
            blend: BlendMode::Auto,
            filter: FilterMode::Linear,
            address_mode: AddressMode::ClampToEdge,
            clear_color: None,
            initial_vertex_capacity: 1024,
            initial_index_capacity: 2048,
        }
    }
}

impl RendererConfig {
    /// Integer passthrough into an `Rgba8Uint` target, for picking buffers.
    pub fn id_buffer() -> Self {
        Self {
            variant: FragmentVariant::Passthrough,
            output_format: wgpu::TextureFormat::Rgba8Uint,
            blend: BlendMode::Replace,
            clear_color: Some(wgpu::Color::TRANSPARENT),
            ..Default::default()
        }
    }

    pub(crate) fn load_op(&self) -> wgpu::LoadOp<wgpu::Color> {
        match self.clear_color {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        }
    }

    /// Blend state actually used by the pipeline.
    pub(crate) fn blend_state(&self) -> Option<wgpu::BlendState> {
        if self.variant.packed_color() {
            return None;
        }
        match self.blend {
            BlendMode::Auto => BlendMode::for_variant(self.variant).to_wgpu(),
            blend => blend.to_wgpu(),
        }
    }

    /// Log configuration combinations that render but look wrong.
    pub(crate) fn warn_on_mismatch(&self) {
        if self.variant.packed_color() {
            if !is_uint_format(self.output_format) {
                log::warn!(
                    "passthrough variant writes integer colors, but the target is {:?}",
                    self.output_format
                );
            }
        } else if self.output_format.is_srgb() {
            log::warn!(
                "{} variant gamma-encodes in the shader; the sRGB target {:?} will encode twice",
                self.variant.name(),
                self.output_format
            );
        }
    }
}

pub(crate) fn is_uint_format(format: wgpu::TextureFormat) -> bool {
    matches!(
        format.sample_type(None, None),
        Some(wgpu::TextureSampleType::Uint)
    )
}

pub(crate) fn to_wgpu_filter(filter: FilterMode) -> wgpu::FilterMode {
    match filter {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}

pub(crate) fn to_wgpu_address_mode(mode: AddressMode) -> wgpu::AddressMode {
    match mode {
        AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        AddressMode::Repeat => wgpu::AddressMode::Repeat,
        AddressMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
    }
}
