//! Internal formats
//!
//! Sized and unsized internal formats and the properties the validator cares about.

use bitflags::bitflags;

use crate::enums::gl_enum;

/// Raw internal format values
pub mod gl {
    pub const R8: u32 = 0x8229;
    pub const RG8: u32 = 0x822B;
    pub const RGB8: u32 = 0x8051;
    pub const RGBA8: u32 = 0x8058;
    pub const SRGB8_ALPHA8: u32 = 0x8C43;
    pub const RGB565: u32 = 0x8D62;
    pub const RGBA4: u32 = 0x8056;
    pub const RGB5_A1: u32 = 0x8057;
    pub const RGB10_A2: u32 = 0x8059;
    pub const R16F: u32 = 0x822D;
    pub const RGBA16F: u32 = 0x881A;
    pub const R32F: u32 = 0x822E;
    pub const RGBA32F: u32 = 0x8814;
    pub const R8I: u32 = 0x8231;
    pub const R8UI: u32 = 0x8232;
    pub const R32I: u32 = 0x8235;
    pub const R32UI: u32 = 0x8236;
    pub const RGBA8I: u32 = 0x8D8E;
    pub const RGBA8UI: u32 = 0x8D7C;
    pub const RGBA32I: u32 = 0x8D82;
    pub const RGBA32UI: u32 = 0x8D70;
    pub const DEPTH_COMPONENT16: u32 = 0x81A5;
    pub const DEPTH_COMPONENT24: u32 = 0x81A6;
    pub const DEPTH_COMPONENT32F: u32 = 0x8CAC;
    pub const DEPTH24_STENCIL8: u32 = 0x88F0;
    pub const DEPTH32F_STENCIL8: u32 = 0x8CAD;
    pub const STENCIL_INDEX8: u32 = 0x8D48;

    pub const RED: u32 = 0x1903;
    pub const RG: u32 = 0x8227;
    pub const RGB: u32 = 0x1907;
    pub const RGBA: u32 = 0x1908;
    pub const ALPHA: u32 = 0x1906;
    pub const LUMINANCE: u32 = 0x1909;
    pub const LUMINANCE_ALPHA: u32 = 0x190A;
    pub const DEPTH_COMPONENT: u32 = 0x1902;
    pub const DEPTH_STENCIL: u32 = 0x84F9;
}

gl_enum! {
    /// Texture internal formats
    pub enum InternalFormat {
        R8 = gl::R8,
        Rg8 = gl::RG8,
        Rgb8 = gl::RGB8,
        Rgba8 = gl::RGBA8,
        Srgb8Alpha8 = gl::SRGB8_ALPHA8,
        Rgb565 = gl::RGB565,
        Rgba4 = gl::RGBA4,
        Rgb5A1 = gl::RGB5_A1,
        Rgb10A2 = gl::RGB10_A2,
        R16F = gl::R16F,
        Rgba16F = gl::RGBA16F,
        R32F = gl::R32F,
        Rgba32F = gl::RGBA32F,
        R8I = gl::R8I,
        R8UI = gl::R8UI,
        R32I = gl::R32I,
        R32UI = gl::R32UI,
        Rgba8I = gl::RGBA8I,
        Rgba8UI = gl::RGBA8UI,
        Rgba32I = gl::RGBA32I,
        Rgba32UI = gl::RGBA32UI,
        DepthComponent16 = gl::DEPTH_COMPONENT16,
        DepthComponent24 = gl::DEPTH_COMPONENT24,
        DepthComponent32F = gl::DEPTH_COMPONENT32F,
        Depth24Stencil8 = gl::DEPTH24_STENCIL8,
        Depth32FStencil8 = gl::DEPTH32F_STENCIL8,
        StencilIndex8 = gl::STENCIL_INDEX8,
        Red = gl::RED,
        Rg = gl::RG,
        Rgb = gl::RGB,
        Rgba = gl::RGBA,
        Alpha = gl::ALPHA,
        Luminance = gl::LUMINANCE,
        LuminanceAlpha = gl::LUMINANCE_ALPHA,
        DepthComponent = gl::DEPTH_COMPONENT,
        DepthStencil = gl::DEPTH_STENCIL,
    }
}

bitflags! {
    /// Format properties
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FormatFlags: u32 {
        const SIZED = 1 << 0;
        const COLOR_RENDERABLE = 1 << 1;
        const DEPTH = 1 << 2;
        const STENCIL = 1 << 3;
        const INTEGER = 1 << 4;
        const FLOAT = 1 << 5;
    }
}

/// Capability category a format's sample limit derives from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatCategory {
    /// Normalized fixed-point color
    Color,
    /// Signed or unsigned integer color
    Integer,
    /// Depth and/or stencil
    DepthStencil,
}

impl InternalFormat {
    /// Every known format, sized ones first
    pub const ALL: [InternalFormat; 36] = [
        InternalFormat::R8,
        InternalFormat::Rg8,
        InternalFormat::Rgb8,
        InternalFormat::Rgba8,
        InternalFormat::Srgb8Alpha8,
        InternalFormat::Rgb565,
        InternalFormat::Rgba4,
        InternalFormat::Rgb5A1,
        InternalFormat::Rgb10A2,
        InternalFormat::R16F,
        InternalFormat::Rgba16F,
        InternalFormat::R32F,
        InternalFormat::Rgba32F,
        InternalFormat::R8I,
        InternalFormat::R8UI,
        InternalFormat::R32I,
        InternalFormat::R32UI,
        InternalFormat::Rgba8I,
        InternalFormat::Rgba8UI,
        InternalFormat::Rgba32I,
        InternalFormat::Rgba32UI,
        InternalFormat::DepthComponent16,
        InternalFormat::DepthComponent24,
        InternalFormat::DepthComponent32F,
        InternalFormat::Depth24Stencil8,
        InternalFormat::Depth32FStencil8,
        InternalFormat::StencilIndex8,
        InternalFormat::Red,
        InternalFormat::Rg,
        InternalFormat::Rgb,
        InternalFormat::Rgba,
        InternalFormat::Alpha,
        InternalFormat::Luminance,
        InternalFormat::LuminanceAlpha,
        InternalFormat::DepthComponent,
        InternalFormat::DepthStencil,
    ];

    /// Property flags
    pub fn flags(self) -> FormatFlags {
        use InternalFormat::*;

        let sized_color = FormatFlags::SIZED | FormatFlags::COLOR_RENDERABLE;
        match self {
            R8 | Rg8 | Rgb8 | Rgba8 | Srgb8Alpha8 | Rgb565 | Rgba4 | Rgb5A1 | Rgb10A2 => {
                sized_color
            }
            // Float color needs EXT_color_buffer_float to be renderable
            R16F | Rgba16F | R32F | Rgba32F => FormatFlags::SIZED | FormatFlags::FLOAT,
            R8I | R8UI | R32I | R32UI | Rgba8I | Rgba8UI | Rgba32I | Rgba32UI => {
                sized_color | FormatFlags::INTEGER
            }
            DepthComponent16 | DepthComponent24 => FormatFlags::SIZED | FormatFlags::DEPTH,
            DepthComponent32F => FormatFlags::SIZED | FormatFlags::DEPTH | FormatFlags::FLOAT,
            Depth24Stencil8 => FormatFlags::SIZED | FormatFlags::DEPTH | FormatFlags::STENCIL,
            Depth32FStencil8 => {
                FormatFlags::SIZED | FormatFlags::DEPTH | FormatFlags::STENCIL | FormatFlags::FLOAT
            }
            StencilIndex8 => FormatFlags::SIZED | FormatFlags::STENCIL,
            Red | Rg | Rgb | Rgba | Alpha | Luminance | LuminanceAlpha => FormatFlags::empty(),
            DepthComponent => FormatFlags::DEPTH,
            DepthStencil => FormatFlags::DEPTH | FormatFlags::STENCIL,
        }
    }

    /// Whether the format names an exact storage layout
    pub fn is_sized(self) -> bool {
        self.flags().contains(FormatFlags::SIZED)
    }

    /// Whether the format can back a framebuffer attachment
    pub fn is_renderable(self) -> bool {
        let flags = self.flags();
        flags.contains(FormatFlags::SIZED)
            && flags.intersects(
                FormatFlags::COLOR_RENDERABLE | FormatFlags::DEPTH | FormatFlags::STENCIL,
            )
    }

    /// Sample-limit category, for renderable formats only
    pub fn category(self) -> Option<FormatCategory> {
        if !self.is_renderable() {
            return None;
        }
        let flags = self.flags();
        if flags.intersects(FormatFlags::DEPTH | FormatFlags::STENCIL) {
            Some(FormatCategory::DepthStencil)
        } else if flags.contains(FormatFlags::INTEGER) {
            Some(FormatCategory::Integer)
        } else {
            Some(FormatCategory::Color)
        }
    }
}
