//! Call script replay
//!
//! A script is a JSON array of calls, each an object tagged by `"call"`. Object names in a
//! script are raw GL names; 0 means "none" (unbind, detach, default framebuffer).

use std::fmt;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use texgate_core::{
    AttachmentPoint, Context, ContextConfig, FramebufferId, FramebufferStatus, GlError, GlResult,
    IntegerCap, InternalFormat, LevelParameter, TextureId, TextureParameter, TextureTarget,
};

fn default_true() -> bool {
    true
}

/// One scripted API call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Call {
    RequestExtension {
        name: String,
    },
    GenTextures {
        count: usize,
    },
    DeleteTextures {
        textures: Vec<u32>,
    },
    BindTexture {
        target: TextureTarget,
        texture: u32,
    },
    GenFramebuffers {
        count: usize,
    },
    DeleteFramebuffers {
        framebuffers: Vec<u32>,
    },
    BindDrawFramebuffer {
        framebuffer: u32,
    },
    QueryMaxSamples {
        target: TextureTarget,
        format: InternalFormat,
    },
    QuerySampleCounts {
        target: TextureTarget,
        format: InternalFormat,
    },
    QueryIntegerCap {
        cap: IntegerCap,
    },
    #[serde(rename = "tex_storage_2d_multisample")]
    TexStorage2DMultisample {
        target: TextureTarget,
        samples: i32,
        format: InternalFormat,
        width: i32,
        height: i32,
        #[serde(default = "default_true")]
        fixed_sample_locations: bool,
    },
    #[serde(rename = "tex_storage_3d_multisample")]
    TexStorage3DMultisample {
        target: TextureTarget,
        samples: i32,
        format: InternalFormat,
        width: i32,
        height: i32,
        layers: i32,
        #[serde(default = "default_true")]
        fixed_sample_locations: bool,
    },
    #[serde(rename = "tex_image_3d")]
    TexImage3D {
        target: TextureTarget,
        level: i32,
        format: InternalFormat,
        width: i32,
        height: i32,
        depth: i32,
    },
    TexParameter {
        target: TextureTarget,
        pname: TextureParameter,
        value: i32,
    },
    GetTexParameter {
        target: TextureTarget,
        pname: TextureParameter,
    },
    GetTexLevelParameter {
        target: TextureTarget,
        level: i32,
        pname: LevelParameter,
    },
    FramebufferTexture {
        framebuffer: u32,
        attachment: AttachmentPoint,
        texture: u32,
        #[serde(default)]
        level: i32,
    },
    FramebufferTextureLayer {
        framebuffer: u32,
        attachment: AttachmentPoint,
        texture: u32,
        #[serde(default)]
        level: i32,
        layer: i32,
    },
    CheckFramebufferStatus {
        framebuffer: u32,
    },
    GetSamplePosition {
        index: i32,
    },
}

/// Outcome of one replayed call
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub index: usize,
    pub call: Call,
    pub result: GlResult<Value>,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = serde_json::to_value(&self.call)
            .ok()
            .and_then(|value| value["call"].as_str().map(str::to_owned))
            .unwrap_or_default();
        match &self.result {
            Ok(Value::Null) => write!(f, "[{}] {}: ok", self.index, name),
            Ok(value) => write!(f, "[{}] {}: {}", self.index, name, value),
            Err(err) => write!(f, "[{}] {}: {} (0x{:04X})", self.index, name, err, err.code()),
        }
    }
}

/// Parse a script
pub fn parse_script(text: &str) -> Result<Vec<Call>> {
    serde_json::from_str(text).context("failed to parse call script")
}

/// Run calls in order against a fresh context. Call errors are recorded, not fatal.
pub fn run(config: ContextConfig, calls: &[Call]) -> Result<Vec<Step>> {
    let mut ctx = Context::new(config)?;
    let steps = calls
        .iter()
        .enumerate()
        .map(|(index, call)| {
            let result = apply(&mut ctx, call);
            if let Err(err) = &result {
                log::debug!("Call {} failed: {}", index, err);
            }
            Step {
                index,
                call: call.clone(),
                result,
            }
        })
        .collect();
    Ok(steps)
}

fn framebuffer(raw: u32) -> GlResult<FramebufferId> {
    FramebufferId::new(raw).ok_or_else(|| {
        GlError::InvalidOperation("the default framebuffer has no texture attachments".into())
    })
}

/// Apply one call, returning its result as JSON
pub fn apply(ctx: &mut Context, call: &Call) -> GlResult<Value> {
    let value = match *call {
        Call::RequestExtension { ref name } => {
            ctx.request_extension(name)?;
            Value::Null
        }
        Call::GenTextures { count } => {
            let ids: Vec<u32> = ctx.gen_textures(count).into_iter().map(TextureId::raw).collect();
            json!(ids)
        }
        Call::DeleteTextures { ref textures } => {
            let ids: Vec<TextureId> = textures.iter().filter_map(|&raw| TextureId::new(raw)).collect();
            ctx.delete_textures(&ids);
            Value::Null
        }
        Call::BindTexture { target, texture } => {
            ctx.bind_texture(target, TextureId::new(texture))?;
            Value::Null
        }
        Call::GenFramebuffers { count } => {
            let ids: Vec<u32> = ctx
                .gen_framebuffers(count)
                .into_iter()
                .map(FramebufferId::raw)
                .collect();
            json!(ids)
        }
        Call::DeleteFramebuffers { ref framebuffers } => {
            let ids: Vec<FramebufferId> = framebuffers
                .iter()
                .filter_map(|&raw| FramebufferId::new(raw))
                .collect();
            ctx.delete_framebuffers(&ids);
            Value::Null
        }
        Call::BindDrawFramebuffer { framebuffer } => {
            ctx.bind_draw_framebuffer(FramebufferId::new(framebuffer))?;
            Value::Null
        }
        Call::QueryMaxSamples { target, format } => json!(ctx.query_max_samples(target, format)?),
        Call::QuerySampleCounts { target, format } => {
            json!(ctx.query_sample_counts(target, format)?)
        }
        Call::QueryIntegerCap { cap } => json!(ctx.query_integer_cap(cap)?),
        Call::TexStorage2DMultisample {
            target,
            samples,
            format,
            width,
            height,
            fixed_sample_locations,
        } => {
            ctx.tex_storage_2d_multisample(
                target,
                samples,
                format,
                width,
                height,
                fixed_sample_locations,
            )?;
            Value::Null
        }
        Call::TexStorage3DMultisample {
            target,
            samples,
            format,
            width,
            height,
            layers,
            fixed_sample_locations,
        } => {
            ctx.tex_storage_3d_multisample(
                target,
                samples,
                format,
                width,
                height,
                layers,
                fixed_sample_locations,
            )?;
            Value::Null
        }
        Call::TexImage3D {
            target,
            level,
            format,
            width,
            height,
            depth,
        } => {
            ctx.tex_image_3d(target, level, format, width, height, depth)?;
            Value::Null
        }
        Call::TexParameter {
            target,
            pname,
            value,
        } => {
            ctx.set_texture_parameter(target, pname, value)?;
            Value::Null
        }
        Call::GetTexParameter { target, pname } => json!(ctx.get_texture_parameter(target, pname)?),
        Call::GetTexLevelParameter {
            target,
            level,
            pname,
        } => json!(ctx.get_texture_level_parameter(target, level, pname)?),
        Call::FramebufferTexture {
            framebuffer: fb,
            attachment,
            texture,
            level,
        } => {
            ctx.framebuffer_texture(framebuffer(fb)?, attachment, TextureId::new(texture), level)?;
            Value::Null
        }
        Call::FramebufferTextureLayer {
            framebuffer: fb,
            attachment,
            texture,
            level,
            layer,
        } => {
            ctx.framebuffer_texture_layer(
                framebuffer(fb)?,
                attachment,
                TextureId::new(texture),
                level,
                layer,
            )?;
            Value::Null
        }
        Call::CheckFramebufferStatus { framebuffer: fb } => {
            // The default framebuffer is always complete
            let status = match FramebufferId::new(fb) {
                Some(id) => ctx.check_framebuffer_status(id)?,
                None => FramebufferStatus::Complete,
            };
            json!({
                "code": status.code(),
                "complete": status.is_complete(),
                "detail": format!("{:?}", status),
            })
        }
        Call::GetSamplePosition { index } => {
            let position = ctx.query_sample_position(index)?;
            json!([position.x, position.y])
        }
    };
    Ok(value)
}
