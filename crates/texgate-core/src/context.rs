//! Context
//!
//! One logical session: configuration, capability table, extension gate, object namespaces
//! and bindings. Entry points validate against a read-only view first and commit only when
//! every check passed. Each failure is returned and also latched in the sticky error slot,
//! like `glGetError`.

use ahash::{AHashMap, AHashSet};
use glam::Vec2;

use crate::caps::CapabilityTable;
use crate::config::{ConfigError, ContextConfig, Limits};
use crate::enums::{AttachmentPoint, IntegerCap, LevelParameter, TextureParameter, TextureTarget};
use crate::extensions::ExtensionGate;
use crate::format::InternalFormat;
use crate::framebuffer::{Framebuffer, FramebufferId, FramebufferStatus};
use crate::sample_pattern;
use crate::texture::{Texture, TextureId};
use crate::validation::{AttachEntry, BindPlan, StorageArgs, StorageEntry, Validator};
use crate::{GlError, GlResult};

/// A validation context
pub struct Context {
    config: ContextConfig,
    caps: CapabilityTable,
    extensions: ExtensionGate,
    /// Generated, not yet deleted
    texture_names: AHashSet<TextureId>,
    /// Created on first bind
    textures: AHashMap<TextureId, Texture>,
    texture_bindings: AHashMap<TextureTarget, TextureId>,
    framebuffers: AHashMap<FramebufferId, Framebuffer>,
    draw_framebuffer: Option<FramebufferId>,
    /// `None` once the name space is used up
    next_texture: Option<u32>,
    next_framebuffer: Option<u32>,
    error: Option<GlError>,
}

impl Context {
    /// Create a context. The capability table is built here and never changes.
    pub fn new(config: ContextConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let caps = CapabilityTable::from_limits(&config.limits, &config.sample_count_overrides);
        for target in CapabilityTable::TARGETS {
            for violation in caps.subset_violations(target) {
                log::warn!(
                    "Sample counts of {:?} are not a subset of {:?} for {:?}: {} is missing",
                    violation.smaller,
                    violation.larger,
                    target,
                    violation.missing
                );
            }
        }

        let extensions = ExtensionGate::new(
            config.client_version,
            &config.supported_extensions,
            config.webgl_compatibility,
        );

        log::info!(
            "Created {} context (webgl: {}, extensions: {:?})",
            config.client_version,
            config.webgl_compatibility,
            extensions.enabled_names()
        );

        Ok(Self {
            config,
            caps,
            extensions,
            texture_names: AHashSet::new(),
            textures: AHashMap::new(),
            texture_bindings: AHashMap::new(),
            framebuffers: AHashMap::new(),
            draw_framebuffer: None,
            next_texture: Some(1),
            next_framebuffer: Some(1),
            error: None,
        })
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn limits(&self) -> &Limits {
        &self.config.limits
    }

    pub fn caps(&self) -> &CapabilityTable {
        &self.caps
    }

    pub fn extensions(&self) -> &ExtensionGate {
        &self.extensions
    }

    /// Live texture object
    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(&id)
    }

    /// Live framebuffer object
    pub fn framebuffer(&self, id: FramebufferId) -> Option<&Framebuffer> {
        self.framebuffers.get(&id)
    }

    /// Texture currently bound to `target`
    pub fn bound_texture(&self, target: TextureTarget) -> Option<TextureId> {
        self.texture_bindings.get(&target).copied()
    }

    pub fn draw_framebuffer(&self) -> Option<FramebufferId> {
        self.draw_framebuffer
    }

    /// Oldest error not yet taken, clearing it
    pub fn take_error(&mut self) -> Option<GlError> {
        self.error.take()
    }

    fn validator(&self) -> Validator<'_> {
        Validator {
            limits: &self.config.limits,
            caps: &self.caps,
            gate: &self.extensions,
            texture_names: &self.texture_names,
            textures: &self.textures,
            bindings: &self.texture_bindings,
            framebuffers: &self.framebuffers,
        }
    }

    fn record<T>(&mut self, result: GlResult<T>) -> GlResult<T> {
        if let Err(err) = &result {
            log::trace!("{}", err);
            if self.error.is_none() {
                self.error = Some(err.clone());
            }
        }
        result
    }

    // Extensions

    pub fn extension_requestable(&self, name: &str) -> bool {
        self.extensions.requestable(name)
    }

    pub fn extension_enabled(&self, name: &str) -> bool {
        self.extensions.enabled(name)
    }

    /// `RequestExtensionANGLE`
    pub fn request_extension(&mut self, name: &str) -> GlResult<()> {
        let result = self.extensions.request(name);
        self.record(result)
    }

    // Queries

    /// Largest sample count for (target, format)
    pub fn query_max_samples(
        &mut self,
        target: TextureTarget,
        internal_format: InternalFormat,
    ) -> GlResult<u32> {
        let result = self
            .validator()
            .sample_counts(target, internal_format)
            .and_then(|counts| {
                counts.first().copied().ok_or_else(|| {
                    GlError::invalid_enum(format!("{:?} has no sample counts", internal_format))
                })
            });
        self.record(result)
    }

    /// All supported sample counts for (target, format), descending
    pub fn query_sample_counts(
        &mut self,
        target: TextureTarget,
        internal_format: InternalFormat,
    ) -> GlResult<Vec<u32>> {
        let result = self
            .validator()
            .sample_counts(target, internal_format)
            .map(<[u32]>::to_vec);
        self.record(result)
    }

    /// Integer implementation limit
    pub fn query_integer_cap(&mut self, cap: IntegerCap) -> GlResult<i32> {
        let result = self.validator().integer_cap(cap);
        self.record(result)
    }

    // Textures

    /// Reserve texture names. Names are never reused; once they run out, fewer than
    /// `count` are returned.
    pub fn gen_textures(&mut self, count: usize) -> Vec<TextureId> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(id) = self.next_texture.and_then(TextureId::new) else {
                log::warn!("Texture names exhausted");
                break;
            };
            self.texture_names.insert(id);
            ids.push(id);
            self.next_texture = self.next_texture.and_then(|raw| raw.checked_add(1));
        }
        ids
    }

    /// Delete textures. Bindings to them are reset; framebuffer attachments are left dangling.
    pub fn delete_textures(&mut self, ids: &[TextureId]) {
        for id in ids {
            if !self.texture_names.remove(id) {
                continue;
            }
            self.textures.remove(id);
            self.texture_bindings.retain(|_, bound| bound != id);
            log::debug!("Deleted texture {}", id.raw());
        }
    }

    /// Bind a texture, creating the object on first bind
    pub fn bind_texture(&mut self, target: TextureTarget, id: Option<TextureId>) -> GlResult<()> {
        let result = self.validator().bind_texture(target, id);
        let plan = self.record(result)?;

        match plan {
            BindPlan::Unbind => {
                self.texture_bindings.remove(&target);
            }
            BindPlan::Bind(id) => {
                self.texture_bindings.insert(target, id);
            }
            BindPlan::Create(id) => {
                self.textures.insert(id, Texture::new(id, target));
                self.texture_bindings.insert(target, id);
                log::debug!("Created texture {} as {:?}", id.raw(), target);
            }
        }
        Ok(())
    }

    /// `TexStorage2DMultisample`
    pub fn tex_storage_2d_multisample(
        &mut self,
        target: TextureTarget,
        samples: i32,
        internal_format: InternalFormat,
        width: i32,
        height: i32,
        fixed_sample_locations: bool,
    ) -> GlResult<()> {
        let args = StorageArgs {
            samples,
            internal_format,
            width,
            height,
            depth: 1,
            fixed_sample_locations,
        };
        self.tex_storage(StorageEntry::Storage2D, target, args)
    }

    /// `TexStorage3DMultisample` for multisample array textures
    #[allow(clippy::too_many_arguments)]
    pub fn tex_storage_3d_multisample(
        &mut self,
        target: TextureTarget,
        samples: i32,
        internal_format: InternalFormat,
        width: i32,
        height: i32,
        layers: i32,
        fixed_sample_locations: bool,
    ) -> GlResult<()> {
        let args = StorageArgs {
            samples,
            internal_format,
            width,
            height,
            depth: layers,
            fixed_sample_locations,
        };
        self.tex_storage(StorageEntry::Storage3D, target, args)
    }

    fn tex_storage(
        &mut self,
        entry: StorageEntry,
        target: TextureTarget,
        args: StorageArgs,
    ) -> GlResult<()> {
        let result = self.validator().tex_storage_multisample(entry, target, args);
        let plan = self.record(result)?;

        let texture = self
            .textures
            .get_mut(&plan.texture)
            .ok_or_else(|| GlError::invalid_operation("bound texture vanished"))?;
        texture.commit_storage(plan.storage)
    }

    /// `TexImage3D` for mutable array and 3D textures
    pub fn tex_image_3d(
        &mut self,
        target: TextureTarget,
        level: i32,
        internal_format: InternalFormat,
        width: i32,
        height: i32,
        depth: i32,
    ) -> GlResult<()> {
        let result = self
            .validator()
            .tex_image_3d(target, level, internal_format, width, height, depth);
        let plan = self.record(result)?;

        let texture = self
            .textures
            .get_mut(&plan.texture)
            .ok_or_else(|| GlError::invalid_operation("bound texture vanished"))?;
        texture.set_image(plan.level, plan.storage)
    }

    /// `TexParameteri`
    pub fn set_texture_parameter(
        &mut self,
        target: TextureTarget,
        pname: TextureParameter,
        value: i32,
    ) -> GlResult<()> {
        let result = self.validator().set_texture_parameter(target, pname, value);
        let plan = self.record(result)?;

        if let Some(texture) = self.textures.get_mut(&plan.texture) {
            texture.set_parameter(plan.pname, plan.value);
        }
        Ok(())
    }

    /// `GetTexParameteriv`
    pub fn get_texture_parameter(
        &mut self,
        target: TextureTarget,
        pname: TextureParameter,
    ) -> GlResult<i32> {
        let result = self.validator().texture_parameter(target, pname);
        self.record(result)
    }

    /// `GetTexLevelParameteriv`
    pub fn get_texture_level_parameter(
        &mut self,
        target: TextureTarget,
        level: i32,
        pname: LevelParameter,
    ) -> GlResult<i32> {
        let result = self.validator().texture_level_parameter(target, level, pname);
        self.record(result)
    }

    // Framebuffers

    /// Reserve and create framebuffer objects. Stops early once names run out.
    pub fn gen_framebuffers(&mut self, count: usize) -> Vec<FramebufferId> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(id) = self.next_framebuffer.and_then(FramebufferId::new) else {
                log::warn!("Framebuffer names exhausted");
                break;
            };
            self.framebuffers.insert(id, Framebuffer::new(id));
            ids.push(id);
            self.next_framebuffer = self.next_framebuffer.and_then(|raw| raw.checked_add(1));
        }
        ids
    }

    /// Delete framebuffers; the draw binding falls back to the default framebuffer
    pub fn delete_framebuffers(&mut self, ids: &[FramebufferId]) {
        for id in ids {
            if self.framebuffers.remove(id).is_some() && self.draw_framebuffer == Some(*id) {
                self.draw_framebuffer = None;
            }
        }
    }

    /// Bind the draw framebuffer; `None` selects the default framebuffer
    pub fn bind_draw_framebuffer(&mut self, id: Option<FramebufferId>) -> GlResult<()> {
        let result = match id {
            Some(id) if !self.framebuffers.contains_key(&id) => Err(GlError::invalid_operation(
                format!("framebuffer {} does not exist", id.raw()),
            )),
            _ => Ok(()),
        };
        self.record(result)?;
        self.draw_framebuffer = id;
        Ok(())
    }

    /// Attach a whole level of a 2D or 2D multisample texture; `None` detaches
    pub fn framebuffer_texture(
        &mut self,
        framebuffer: FramebufferId,
        point: AttachmentPoint,
        texture: Option<TextureId>,
        level: i32,
    ) -> GlResult<()> {
        self.attach(AttachEntry::Texture, framebuffer, point, texture, level)
    }

    /// Attach one layer of an array or 3D texture; `None` detaches
    pub fn framebuffer_texture_layer(
        &mut self,
        framebuffer: FramebufferId,
        point: AttachmentPoint,
        texture: Option<TextureId>,
        level: i32,
        layer: i32,
    ) -> GlResult<()> {
        self.attach(
            AttachEntry::TextureLayer { layer },
            framebuffer,
            point,
            texture,
            level,
        )
    }

    fn attach(
        &mut self,
        entry: AttachEntry,
        framebuffer: FramebufferId,
        point: AttachmentPoint,
        texture: Option<TextureId>,
        level: i32,
    ) -> GlResult<()> {
        let result = self
            .validator()
            .attach_texture(entry, framebuffer, point, texture, level);
        let plan = self.record(result)?;

        let framebuffer = self
            .framebuffers
            .get_mut(&plan.framebuffer)
            .ok_or_else(|| GlError::invalid_operation("framebuffer vanished"))?;
        match plan.attachment {
            Some(attachment) => framebuffer.attach(plan.point, attachment),
            None => framebuffer.detach(plan.point),
        }
        Ok(())
    }

    /// `CheckFramebufferStatus`
    pub fn check_framebuffer_status(
        &mut self,
        framebuffer: FramebufferId,
    ) -> GlResult<FramebufferStatus> {
        let result = self.validator().framebuffer_status(framebuffer);
        self.record(result)
    }

    /// `GetMultisamplefv(SAMPLE_POSITION, index)` for the draw framebuffer
    pub fn query_sample_position(&mut self, index: i32) -> GlResult<Vec2> {
        let result = self
            .validator()
            .draw_samples(
                self.draw_framebuffer,
                self.config.default_framebuffer_samples,
            )
            .and_then(|samples| {
                u32::try_from(index)
                    .ok()
                    .and_then(|index| sample_pattern::sample_position(samples, index))
                    .ok_or_else(|| {
                        GlError::invalid_value(format!(
                            "sample index {index} is outside [0, {samples})"
                        ))
                    })
            });
        self.record(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiVersion;
    use crate::framebuffer::IncompleteReason;
    use crate::ErrorKind;

    const ARRAY_EXT: &str = "GL_ANGLE_texture_multisample_array";
    const MS: TextureTarget = TextureTarget::Texture2DMultisample;
    const MS_ARRAY: TextureTarget = TextureTarget::Texture2DMultisampleArray;

    fn context(config: ContextConfig) -> Context {
        Context::new(config).unwrap()
    }

    fn bound(ctx: &mut Context, target: TextureTarget) -> TextureId {
        let id = ctx.gen_textures(1)[0];
        ctx.bind_texture(target, Some(id)).unwrap();
        id
    }

    fn webgl_with_array() -> Context {
        let mut ctx = context(ContextConfig::es31_webgl());
        assert!(ctx.extension_requestable(ARRAY_EXT));
        ctx.request_extension(ARRAY_EXT).unwrap();
        assert!(ctx.extension_enabled(ARRAY_EXT));
        ctx
    }

    fn kind<T: std::fmt::Debug>(result: GlResult<T>) -> ErrorKind {
        result.unwrap_err().kind()
    }

    #[test]
    fn test_max_samples_query_per_version() {
        let mut es30 = context(ContextConfig::es3_opengl());
        assert_eq!(kind(es30.query_max_samples(MS, InternalFormat::R8)), ErrorKind::Enum);
        assert_eq!(es30.take_error().map(|e| e.kind()), Some(ErrorKind::Enum));
        assert!(es30.take_error().is_none());

        let mut es31 = context(ContextConfig::es31_d3d11());
        let max_r8 = es31.query_max_samples(MS, InternalFormat::R8).unwrap();
        let color = es31.query_integer_cap(IntegerCap::MaxColorTextureSamples).unwrap();
        let max = es31.query_integer_cap(IntegerCap::MaxSamples).unwrap();
        assert!(max_r8 as i32 >= color.min(max));
        assert!(es31.take_error().is_none());
    }

    #[test]
    fn test_every_supported_pair_has_sane_maximum() {
        for config in [ContextConfig::es31_d3d11(), ContextConfig::es31_opengl()] {
            let mut ctx = context(config);
            for target in [MS, MS_ARRAY] {
                for format in InternalFormat::ALL.into_iter().filter(|f| f.is_renderable()) {
                    let max = ctx.query_max_samples(target, format).unwrap();
                    assert!(max >= 1);
                    assert!(max < i32::MAX as u32);
                }
            }
        }
    }

    #[test]
    fn test_sample_capability_floors() {
        let mut ctx = context(ContextConfig::es31_d3d11());
        for cap in [
            IntegerCap::MaxIntegerSamples,
            IntegerCap::MaxColorTextureSamples,
            IntegerCap::MaxDepthTextureSamples,
        ] {
            let value = ctx.query_integer_cap(cap).unwrap();
            assert!(value >= 1);
            assert_ne!(value, i32::MAX);
        }

        let mut es30 = context(ContextConfig::es3_opengl());
        assert_eq!(
            kind(es30.query_integer_cap(IntegerCap::MaxDepthTextureSamples)),
            ErrorKind::Enum
        );
        assert!(es30.query_integer_cap(IntegerCap::MaxArrayTextureLayers).is_ok());
    }

    #[test]
    fn test_storage_2d_depends_on_version() {
        // ES 3.0: the target does not exist
        let mut es30 = context(ContextConfig::es3_opengl());
        let tex = es30.gen_textures(1)[0];
        assert_eq!(kind(es30.bind_texture(MS, Some(tex))), ErrorKind::Enum);
        assert_eq!(
            kind(es30.tex_storage_2d_multisample(MS, 1, InternalFormat::Rgba8, 1, 1, false)),
            ErrorKind::Enum
        );

        // ES 3.1: first call succeeds, the identical second one does not
        let mut es31 = context(ContextConfig::es31_d3d11());
        bound(&mut es31, MS);
        es31.tex_storage_2d_multisample(MS, 1, InternalFormat::Rgba8, 1, 1, false)
            .unwrap();
        assert_eq!(es31.get_texture_parameter(MS, TextureParameter::ImmutableFormat), Ok(1));
        assert_eq!(
            kind(es31.tex_storage_2d_multisample(MS, 1, InternalFormat::Rgba8, 1, 1, false)),
            ErrorKind::Operation
        );
    }

    #[test]
    fn test_attach_without_object_is_operation() {
        // On ES 3.0 the bind fails, so the name never becomes an object
        let mut ctx = context(ContextConfig::es3_opengl());
        let tex = ctx.gen_textures(1)[0];
        let fb = ctx.gen_framebuffers(1)[0];
        let _ = ctx.bind_texture(MS, Some(tex));
        assert_eq!(
            kind(ctx.framebuffer_texture(fb, AttachmentPoint::Color(0), Some(tex), 0)),
            ErrorKind::Operation
        );
    }

    #[test]
    fn test_storage_2d_parameter_validation() {
        let mut ctx = context(ContextConfig::es31_d3d11());
        bound(&mut ctx, MS);
        ctx.tex_storage_2d_multisample(MS, 1, InternalFormat::Rgba8, 1, 1, false)
            .unwrap();

        let max_size = ctx.query_integer_cap(IntegerCap::MaxTextureSize).unwrap();
        let max_samples = ctx.query_max_samples(MS, InternalFormat::R8).unwrap() as i32;

        bound(&mut ctx, MS);
        let rgba8 = InternalFormat::Rgba8;
        let cases = [
            (TextureTarget::Texture2D, 1, rgba8, 1, 1, ErrorKind::Enum),
            (MS, 1, rgba8, 0, 0, ErrorKind::Value),
            (MS, 1, rgba8, max_size + 1, 1, ErrorKind::Value),
            (MS, max_samples + 1, rgba8, 1, 1, ErrorKind::Operation),
            (MS, 0, rgba8, 1, 1, ErrorKind::Value),
            (MS, 1, InternalFormat::Rgba, 0, 0, ErrorKind::Value),
        ];
        for (target, samples, format, width, height, expected) in cases {
            let result = ctx.tex_storage_2d_multisample(target, samples, format, width, height, false);
            assert_eq!(kind(result), expected, "{target:?} {samples} {format:?} {width}x{height}");
        }

        ctx.bind_texture(MS, None).unwrap();
        assert_eq!(
            kind(ctx.tex_storage_2d_multisample(MS, 1, rgba8, 1, 1, false)),
            ErrorKind::Operation
        );
    }

    #[test]
    fn test_failed_allocation_changes_nothing() {
        let mut ctx = context(ContextConfig::es31_d3d11());
        let tex = bound(&mut ctx, MS);

        assert_eq!(
            kind(ctx.tex_storage_2d_multisample(MS, 4, InternalFormat::Rgba8, 0, 16, true)),
            ErrorKind::Value
        );
        let texture = ctx.texture(tex).unwrap();
        assert!(!texture.is_immutable());
        assert!(texture.image(0).is_none());
        assert_eq!(
            ctx.get_texture_level_parameter(MS, 0, LevelParameter::Width),
            Ok(0)
        );
    }

    #[test]
    fn test_immutable_fields_are_frozen() {
        let mut ctx = webgl_with_array();
        let tex = bound(&mut ctx, MS_ARRAY);
        ctx.tex_storage_3d_multisample(MS_ARRAY, 2, InternalFormat::Rgba8, 8, 4, 2, true)
            .unwrap();
        let before = *ctx.texture(tex).unwrap().image(0).unwrap();

        let attempts = [
            (2, InternalFormat::Rgba8, 8, 4, 2),
            (4, InternalFormat::DepthComponent24, 16, 16, 3),
            (1, InternalFormat::R8, 1, 1, 1),
        ];
        for (samples, format, width, height, layers) in attempts {
            assert_eq!(
                kind(ctx.tex_storage_3d_multisample(MS_ARRAY, samples, format, width, height, layers, false)),
                ErrorKind::Operation
            );
        }
        assert_eq!(*ctx.texture(tex).unwrap().image(0).unwrap(), before);
    }

    #[test]
    fn test_array_gate_without_extension() {
        let mut ctx = context(ContextConfig::es31_webgl());
        let tex = ctx.gen_textures(1)[0];

        assert_eq!(
            kind(ctx.query_max_samples(MS_ARRAY, InternalFormat::Rgba8)),
            ErrorKind::Enum
        );
        assert_eq!(kind(ctx.bind_texture(MS_ARRAY, Some(tex))), ErrorKind::Enum);

        // Valid or not, the other arguments are never looked at
        for (samples, width) in [(2, 1), (0, 0)] {
            assert_eq!(
                kind(ctx.tex_storage_3d_multisample(MS_ARRAY, samples, InternalFormat::Rgba8, width, 1, 1, true)),
                ErrorKind::Enum
            );
        }
        assert_eq!(
            kind(ctx.set_texture_parameter(MS_ARRAY, TextureParameter::BaseLevel, 0)),
            ErrorKind::Enum
        );
    }

    #[test]
    fn test_array_sample_queries_with_extension() {
        let mut ctx = webgl_with_array();
        let rgba8 = ctx.query_max_samples(MS_ARRAY, InternalFormat::Rgba8).unwrap() as i32;
        let depth = ctx
            .query_max_samples(MS_ARRAY, InternalFormat::DepthComponent24)
            .unwrap() as i32;
        let color_cap = ctx.query_integer_cap(IntegerCap::MaxColorTextureSamples).unwrap();
        let depth_cap = ctx.query_integer_cap(IntegerCap::MaxDepthTextureSamples).unwrap();
        let max = ctx.query_integer_cap(IntegerCap::MaxSamples).unwrap();

        assert!(rgba8 >= color_cap.min(max));
        assert!(depth >= depth_cap.min(max));
        assert_eq!(
            ctx.query_sample_counts(MS_ARRAY, InternalFormat::Rgba8).unwrap()[0] as i32,
            rgba8
        );
    }

    #[test]
    fn test_tex_image_3d_rejects_multisample_array() {
        let mut ctx = webgl_with_array();
        bound(&mut ctx, MS_ARRAY);
        assert_eq!(
            kind(ctx.tex_image_3d(MS_ARRAY, 0, InternalFormat::Rgba8, 1, 1, 1)),
            ErrorKind::Enum
        );
    }

    #[test]
    fn test_invalid_storage_3d_arguments() {
        let mut ctx = webgl_with_array();
        bound(&mut ctx, MS_ARRAY);
        let rgba8 = InternalFormat::Rgba8;

        let cases = [
            (MS, 2, rgba8, 1, 1, 1, ErrorKind::Enum),
            (MS, 2, rgba8, 0, 1, 1, ErrorKind::Enum),
            (MS_ARRAY, 0, rgba8, 1, 1, 1, ErrorKind::Value),
            (MS_ARRAY, 2, InternalFormat::Rgba, 1, 1, 1, ErrorKind::Value),
            (MS_ARRAY, 2, rgba8, 0, 1, 1, ErrorKind::Value),
            (MS_ARRAY, 2, rgba8, 1, 0, 1, ErrorKind::Value),
            (MS_ARRAY, 2, rgba8, 1, 1, 0, ErrorKind::Value),
        ];
        for (target, samples, format, width, height, layers, expected) in cases {
            let result =
                ctx.tex_storage_3d_multisample(target, samples, format, width, height, layers, true);
            assert_eq!(kind(result), expected, "{target:?} {samples} {format:?} {width}x{height}x{layers}");
        }
        assert!(!ctx.texture(ctx.bound_texture(MS_ARRAY).unwrap()).unwrap().is_immutable());
    }

    #[test]
    fn test_multisample_array_parameters() {
        let mut ctx = webgl_with_array();
        bound(&mut ctx, MS_ARRAY);

        let sampler_params = [
            (TextureParameter::MinFilter, 0x2600),
            (TextureParameter::MagFilter, 0x2600),
            (TextureParameter::WrapS, 0x812F),
            (TextureParameter::WrapT, 0x812F),
            (TextureParameter::WrapR, 0x812F),
            (TextureParameter::MinLod, 0),
            (TextureParameter::MaxLod, 0),
            (TextureParameter::CompareMode, 0),
            (TextureParameter::CompareFunc, 0x0207),
        ];
        for (pname, value) in sampler_params {
            assert_eq!(
                kind(ctx.set_texture_parameter(MS_ARRAY, pname, value)),
                ErrorKind::Enum,
                "{pname:?}"
            );
        }

        assert_eq!(
            kind(ctx.set_texture_parameter(MS_ARRAY, TextureParameter::BaseLevel, 1)),
            ErrorKind::Operation
        );
        // Negative levels are a value error before the multisample base-level rule
        assert_eq!(
            kind(ctx.set_texture_parameter(MS_ARRAY, TextureParameter::BaseLevel, -1)),
            ErrorKind::Value
        );
        ctx.set_texture_parameter(MS_ARRAY, TextureParameter::BaseLevel, 0)
            .unwrap();
        ctx.set_texture_parameter(MS_ARRAY, TextureParameter::MaxLevel, 4)
            .unwrap();
        assert_eq!(
            ctx.get_texture_parameter(MS_ARRAY, TextureParameter::MaxLevel),
            Ok(4)
        );
    }

    #[test]
    fn test_sampler_parameters_rejected_regardless_of_state() {
        let mut ctx = webgl_with_array();
        // Nothing bound yet
        assert_eq!(
            kind(ctx.set_texture_parameter(MS_ARRAY, TextureParameter::MinFilter, 0x2600)),
            ErrorKind::Enum
        );

        bound(&mut ctx, MS_ARRAY);
        ctx.tex_storage_3d_multisample(MS_ARRAY, 2, InternalFormat::Rgba8, 4, 4, 2, true)
            .unwrap();
        assert_eq!(
            kind(ctx.set_texture_parameter(MS_ARRAY, TextureParameter::MinFilter, 0x2600)),
            ErrorKind::Enum
        );
    }

    #[test]
    fn test_storage_3d_level_parameters() {
        let mut ctx = webgl_with_array();
        let max_rgba8 = ctx.query_max_samples(MS_ARRAY, InternalFormat::Rgba8).unwrap() as i32;
        bound(&mut ctx, MS_ARRAY);
        ctx.tex_storage_3d_multisample(MS_ARRAY, max_rgba8, InternalFormat::Rgba8, 8, 4, 2, true)
            .unwrap();

        let query = |ctx: &mut Context, pname| ctx.get_texture_level_parameter(MS_ARRAY, 0, pname);
        assert_eq!(query(&mut ctx, LevelParameter::Width), Ok(8));
        assert_eq!(query(&mut ctx, LevelParameter::Height), Ok(4));
        assert_eq!(query(&mut ctx, LevelParameter::Depth), Ok(2));
        assert_eq!(query(&mut ctx, LevelParameter::Samples), Ok(max_rgba8));
        assert_eq!(query(&mut ctx, LevelParameter::FixedSampleLocations), Ok(1));
        assert_eq!(
            query(&mut ctx, LevelParameter::InternalFormat),
            Ok(InternalFormat::Rgba8.raw() as i32)
        );
        assert!(ctx.take_error().is_none());
    }

    #[test]
    fn test_framebuffer_texture_layer_arguments() {
        let mut ctx = webgl_with_array();
        let max_rgba8 = ctx.query_max_samples(MS_ARRAY, InternalFormat::Rgba8).unwrap() as i32;
        let max_layers = ctx.query_integer_cap(IntegerCap::MaxArrayTextureLayers).unwrap();
        let tex = bound(&mut ctx, MS_ARRAY);
        ctx.tex_storage_3d_multisample(MS_ARRAY, max_rgba8, InternalFormat::Rgba8, 4, 4, 2, true)
            .unwrap();
        let fb = ctx.gen_framebuffers(1)[0];
        let color0 = AttachmentPoint::Color(0);

        for (level, layer) in [(1, 0), (-1, 0), (0, -1), (0, max_layers)] {
            assert_eq!(
                kind(ctx.framebuffer_texture_layer(fb, color0, Some(tex), level, layer)),
                ErrorKind::Value,
                "level {level} layer {layer}"
            );
        }
        assert!(ctx.framebuffer(fb).unwrap().attachment(color0).is_none());

        // Legal at attach time; only the completeness check looks at the texture's layers
        ctx.framebuffer_texture_layer(fb, color0, Some(tex), 0, max_layers - 1)
            .unwrap();
        assert!(matches!(
            ctx.check_framebuffer_status(fb),
            Ok(FramebufferStatus::Incomplete(IncompleteReason::LayerOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_attach_call_must_match_target() {
        let mut ctx = webgl_with_array();
        let array_tex = bound(&mut ctx, MS_ARRAY);
        let ms_tex = bound(&mut ctx, MS);
        let fb = ctx.gen_framebuffers(1)[0];
        let color0 = AttachmentPoint::Color(0);

        assert_eq!(
            kind(ctx.framebuffer_texture(fb, color0, Some(array_tex), 0)),
            ErrorKind::Operation
        );
        assert_eq!(
            kind(ctx.framebuffer_texture_layer(fb, color0, Some(ms_tex), 0, 0)),
            ErrorKind::Operation
        );
        assert_eq!(
            kind(ctx.framebuffer_texture(fb, AttachmentPoint::Color(8), Some(ms_tex), 0)),
            ErrorKind::Operation
        );
        let missing = FramebufferId::new(99).unwrap();
        assert_eq!(
            kind(ctx.framebuffer_texture(missing, color0, Some(ms_tex), 0)),
            ErrorKind::Operation
        );
    }

    #[test]
    fn test_framebuffer_completeness_with_depth_attachments() {
        let mut ctx = webgl_with_array();
        let formats = [
            InternalFormat::Rgba8,
            InternalFormat::DepthComponent24,
            InternalFormat::Depth24Stencil8,
        ];
        let samples = ctx.caps().common_max_samples(MS_ARRAY, &formats).unwrap() as i32;
        let fb = ctx.gen_framebuffers(1)[0];

        let color = bound(&mut ctx, MS_ARRAY);
        ctx.tex_storage_3d_multisample(MS_ARRAY, samples, InternalFormat::Rgba8, 4, 4, 2, true)
            .unwrap();
        ctx.framebuffer_texture_layer(fb, AttachmentPoint::Color(0), Some(color), 0, 0)
            .unwrap();
        assert_eq!(ctx.check_framebuffer_status(fb), Ok(FramebufferStatus::Complete));

        let depth = bound(&mut ctx, MS_ARRAY);
        ctx.tex_storage_3d_multisample(MS_ARRAY, samples, InternalFormat::DepthComponent24, 4, 4, 2, true)
            .unwrap();
        ctx.framebuffer_texture_layer(fb, AttachmentPoint::Depth, Some(depth), 0, 0)
            .unwrap();
        assert_eq!(ctx.check_framebuffer_status(fb), Ok(FramebufferStatus::Complete));

        let depth_stencil = bound(&mut ctx, MS_ARRAY);
        ctx.tex_storage_3d_multisample(MS_ARRAY, samples, InternalFormat::Depth24Stencil8, 4, 4, 2, true)
            .unwrap();
        ctx.framebuffer_texture_layer(fb, AttachmentPoint::DepthStencil, Some(depth_stencil), 0, 0)
            .unwrap();
        assert_eq!(ctx.check_framebuffer_status(fb), Ok(FramebufferStatus::Complete));
        assert!(ctx.take_error().is_none());
    }

    #[test]
    fn test_color_image_on_depth_point_is_incomplete() {
        let mut ctx = context(ContextConfig::es31_d3d11());
        let tex = bound(&mut ctx, MS);
        ctx.tex_storage_2d_multisample(MS, 4, InternalFormat::Rgba8, 4, 4, true)
            .unwrap();
        let fb = ctx.gen_framebuffers(1)[0];
        ctx.framebuffer_texture(fb, AttachmentPoint::Depth, Some(tex), 0)
            .unwrap();

        let status = ctx.check_framebuffer_status(fb).unwrap();
        assert_eq!(
            status,
            FramebufferStatus::Incomplete(IncompleteReason::IncompatibleFormat {
                point: AttachmentPoint::Depth,
                format: InternalFormat::Rgba8,
            })
        );
        assert_eq!(status.code(), 0x8CD6);
        assert!(ctx.take_error().is_none());
    }

    #[test]
    fn test_texture_names_are_not_reissued_after_exhaustion() {
        let mut ctx = context(ContextConfig::es31_d3d11());
        ctx.next_texture = Some(u32::MAX - 1);

        let ids = ctx.gen_textures(4);
        assert_eq!(
            ids.iter().map(|id| id.raw()).collect::<Vec<_>>(),
            vec![u32::MAX - 1, u32::MAX]
        );
        assert!(ctx.gen_textures(1).is_empty());
        assert!(!ctx.texture_names.iter().any(|id| id.raw() == 1));
    }

    #[test]
    fn test_framebuffer_names_are_not_reissued_after_exhaustion() {
        let mut ctx = context(ContextConfig::es31_d3d11());
        let first = ctx.gen_framebuffers(1)[0];
        ctx.next_framebuffer = Some(u32::MAX);

        let ids = ctx.gen_framebuffers(3);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].raw(), u32::MAX);
        assert!(ctx.gen_framebuffers(2).is_empty());
        assert_eq!(first.raw(), 1);
        assert_eq!(ctx.framebuffers.len(), 2);
    }

    #[test]
    fn test_deleted_texture_leaves_dangling_attachment() {
        let mut ctx = webgl_with_array();
        let tex = bound(&mut ctx, MS_ARRAY);
        ctx.tex_storage_3d_multisample(MS_ARRAY, 2, InternalFormat::Rgba8, 4, 4, 2, true)
            .unwrap();
        let fb = ctx.gen_framebuffers(1)[0];
        ctx.framebuffer_texture_layer(fb, AttachmentPoint::Color(0), Some(tex), 0, 1)
            .unwrap();

        ctx.delete_textures(&[tex]);
        assert_eq!(ctx.bound_texture(MS_ARRAY), None);
        assert!(ctx.framebuffer(fb).unwrap().attachment(AttachmentPoint::Color(0)).is_some());
        assert_eq!(
            ctx.check_framebuffer_status(fb),
            Ok(FramebufferStatus::Incomplete(IncompleteReason::DeletedTexture {
                point: AttachmentPoint::Color(0),
                texture: tex,
            }))
        );

        // The name is gone for good
        assert_eq!(kind(ctx.bind_texture(MS_ARRAY, Some(tex))), ErrorKind::Operation);
        assert!(!ctx.gen_textures(4).contains(&tex));

        // Detaching clears the slot
        ctx.framebuffer_texture_layer(fb, AttachmentPoint::Color(0), None, 0, 0)
            .unwrap();
        assert_eq!(
            ctx.check_framebuffer_status(fb),
            Ok(FramebufferStatus::Incomplete(IncompleteReason::MissingAttachment))
        );
    }

    #[test]
    fn test_sample_positions_follow_standard_pattern() {
        let mut ctx = context(ContextConfig::es31_d3d11());
        let max_samples = ctx.query_integer_cap(IntegerCap::MaxSamples).unwrap();
        let fb = ctx.gen_framebuffers(1)[0];
        ctx.bind_draw_framebuffer(Some(fb)).unwrap();

        for samples in 1..=max_samples {
            let tex = bound(&mut ctx, MS);
            ctx.tex_storage_2d_multisample(MS, samples, InternalFormat::Rgba8, 1, 1, true)
                .unwrap();
            ctx.framebuffer_texture(fb, AttachmentPoint::Color(0), Some(tex), 0)
                .unwrap();
            assert_eq!(ctx.check_framebuffer_status(fb), Ok(FramebufferStatus::Complete));

            for index in 0..samples {
                let position = ctx.query_sample_position(index).unwrap();
                assert_eq!(
                    Some(position),
                    sample_pattern::sample_position(samples as u32, index as u32)
                );
            }
            assert_eq!(kind(ctx.query_sample_position(samples)), ErrorKind::Value);
            assert_eq!(kind(ctx.query_sample_position(-1)), ErrorKind::Value);
        }

        // Four samples use the four-sample pattern
        let tex = bound(&mut ctx, MS);
        ctx.tex_storage_2d_multisample(MS, 4, InternalFormat::Rgba8, 1, 1, true)
            .unwrap();
        ctx.framebuffer_texture(fb, AttachmentPoint::Color(0), Some(tex), 0)
            .unwrap();
        assert_eq!(ctx.query_sample_position(1), Ok(Vec2::new(0.875, 0.375)));
    }

    #[test]
    fn test_sample_position_on_default_and_incomplete_framebuffers() {
        let mut ctx = context(ContextConfig::es31_d3d11());
        // Single-sampled default framebuffer
        assert_eq!(kind(ctx.query_sample_position(0)), ErrorKind::Value);

        let fb = ctx.gen_framebuffers(1)[0];
        ctx.bind_draw_framebuffer(Some(fb)).unwrap();
        assert_eq!(kind(ctx.query_sample_position(0)), ErrorKind::Operation);

        ctx.delete_framebuffers(&[fb]);
        assert_eq!(ctx.draw_framebuffer(), None);
        assert_eq!(kind(ctx.bind_draw_framebuffer(Some(fb))), ErrorKind::Operation);
    }

    #[test]
    fn test_sticky_error_keeps_first() {
        let mut ctx = context(ContextConfig::es3_opengl());
        let _ = ctx.query_max_samples(MS, InternalFormat::Rgba8);
        let _ = ctx.tex_storage_2d_multisample(TextureTarget::Texture2D, 0, InternalFormat::Rgba8, 1, 1, false);
        assert_eq!(ctx.take_error().map(|e| e.kind()), Some(ErrorKind::Enum));
        assert!(ctx.take_error().is_none());
    }

    #[test]
    fn test_mutable_array_texture_completeness() {
        let mut ctx = context(ContextConfig::es31_d3d11());
        let tex = bound(&mut ctx, TextureTarget::Texture2DArray);
        let fb = ctx.gen_framebuffers(1)[0];

        ctx.framebuffer_texture_layer(fb, AttachmentPoint::Color(0), Some(tex), 1, 0)
            .unwrap();
        assert!(matches!(
            ctx.check_framebuffer_status(fb),
            Ok(FramebufferStatus::Incomplete(IncompleteReason::MissingImage { level: 1, .. }))
        ));

        ctx.tex_image_3d(TextureTarget::Texture2DArray, 1, InternalFormat::Rgba8, 4, 4, 2)
            .unwrap();
        assert_eq!(ctx.check_framebuffer_status(fb), Ok(FramebufferStatus::Complete));
        assert_eq!(
            ctx.get_texture_parameter(TextureTarget::Texture2DArray, TextureParameter::ImmutableFormat),
            Ok(0)
        );
    }

    #[test]
    fn test_subset_violation_does_not_block_context() {
        let mut config = ContextConfig::es31_d3d11();
        config.sample_count_overrides.push(crate::config::SampleCountOverride {
            target: MS,
            format: InternalFormat::R8,
            counts: vec![3, 1],
        });
        let mut ctx = context(config);
        assert_eq!(ctx.query_sample_counts(MS, InternalFormat::R8), Ok(vec![3, 1]));
        assert!(!ctx.caps().subset_violations(MS).is_empty());
        assert_eq!(ctx.extensions().version(), ApiVersion::ES_3_1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ContextConfig::es31_d3d11();
        config.limits.max_samples = 0;
        assert!(Context::new(config).is_err());
    }
}
