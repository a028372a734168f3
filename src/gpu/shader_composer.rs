use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
    ShaderType,
};

use crate::error::GlobeError;

/// Shared module definition.
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

/// Registered in dependency order.
const MODULES: &[ModuleDef] = &[
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/fullscreen.wgsl"),
        file_path: "modules/fullscreen.wgsl",
    },
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/camera.wgsl"),
        file_path: "modules/camera.wgsl",
    },
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/lighting.wgsl"),
        file_path: "modules/lighting.wgsl",
    },
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/mesh.wgsl"),
        file_path: "modules/mesh.wgsl",
    },
];

/// The top-level shaders the renderer builds pipelines from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shader {
    /// Lit, shadow-receiving geometry into the HDR target.
    Mesh,
    /// Depth-only pass from the key light.
    Shadow,
    /// HDR resolve: exposure, tone mapping, color encoding.
    Composite,
}

impl Shader {
    /// Every shader, for validation.
    pub const ALL: [Self; 3] = [Self::Mesh, Self::Shadow, Self::Composite];

    fn source(self) -> &'static str {
        match self {
            Self::Mesh => include_str!("../../assets/shaders/mesh.wgsl"),
            Self::Shadow => include_str!("../../assets/shaders/shadow.wgsl"),
            Self::Composite => {
                include_str!("../../assets/shaders/composite.wgsl")
            }
        }
    }

    fn file_path(self) -> &'static str {
        match self {
            Self::Mesh => "mesh.wgsl",
            Self::Shadow => "shadow.wgsl",
            Self::Composite => "composite.wgsl",
        }
    }
}

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Pre-loads the shared WGSL modules at construction time. Consuming shaders
/// use `#import orbis::module_name` to pull in shared code. The composer
/// produces `naga::Module` IR directly, skipping WGSL re-parse at runtime.
pub struct ShaderComposer {
    composer: Composer,
}

impl ShaderComposer {
    /// Composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// [`GlobeError::Shader`] if a shared module fails to parse.
    pub fn new() -> Result<Self, GlobeError> {
        let mut composer = Composer::default();
        for m in MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    GlobeError::Shader(format!(
                        "failed to register module '{}': {e:?}",
                        m.file_path
                    ))
                })?;
        }
        Ok(Self { composer })
    }

    /// Compose `shader` into a `wgpu::ShaderModule` ready for pipeline
    /// creation.
    ///
    /// # Errors
    ///
    /// [`GlobeError::Shader`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        shader: Shader,
    ) -> Result<wgpu::ShaderModule, GlobeError> {
        let naga_module = self.compose_naga(shader)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.file_path()),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose `shader` into a `naga::Module` without a GPU device.
    ///
    /// # Errors
    ///
    /// [`GlobeError::Shader`] if composition fails.
    pub fn compose_naga(
        &mut self,
        shader: Shader,
    ) -> Result<naga::Module, GlobeError> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source: shader.source(),
                file_path: shader.file_path(),
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| {
                GlobeError::Shader(format!(
                    "failed to compose '{}': {e}",
                    shader.file_path()
                ))
            })
    }
}
