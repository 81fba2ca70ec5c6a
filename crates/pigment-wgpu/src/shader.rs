use pigment_shading::FragmentVariant;

pub const VERTEX_ENTRY_POINT: &str = "vs_main";
pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";

/// WGSL source of the shader pair implementing `variant`.
pub fn shader_source(variant: FragmentVariant) -> &'static str {
    match variant {
        FragmentVariant::Passthrough => include_str!("shaders/passthrough.wgsl"),
        FragmentVariant::Gamma => include_str!("shaders/gamma.wgsl"),
        FragmentVariant::Coverage => include_str!("shaders/coverage.wgsl"),
        FragmentVariant::ModeBranch => include_str!("shaders/mode.wgsl"),
    }
}

pub fn create_shader_module(
    device: &wgpu::Device,
    variant: FragmentVariant,
) -> wgpu::ShaderModule {
    let label = format!("Pigment {} Shader", variant.name());
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&label),
        source: wgpu::ShaderSource::Wgsl(shader_source(variant).into()),
    })
}
