//! Graphics binary interface constants
//!
//! Two microcode families are understood. The legacy Fast3D (F3D) encoding and the newer
//! F3DEX2 encoding share the RDP command bytes (0xE4-0xFF, plus 0xF0) but place the RSP
//! commands at different bytes and lay several of their fields out differently.
//!
//! The opcode constants below are the raw command bytes, i.e. the top byte of `w0`.
//! Code that needs to be variant independent should go through [`Opcode`] instead.

use crate::config::Microcode;

/// Every command known to either microcode.
///
/// Not every opcode exists in every variant: `Sprite2dBase` and `RdpHalfCont` are F3D only,
/// the quad/tri2/special/DMA commands are F3DEX2 only. [`Opcode::code`] returns `None` for
/// a command that the given variant does not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // RSP commands
    SpNoop,
    Noop,
    Mtx,
    MoveMem,
    Vtx,
    ModifyVtx,
    Dl,
    BranchZ,
    EndDl,
    Sprite2dBase,
    Tri1,
    Tri2,
    Quad,
    Line3d,
    CullDl,
    PopMtx,
    MoveWord,
    Texture,
    SetOtherModeH,
    SetOtherModeL,
    SetGeometryMode,
    ClearGeometryMode,
    GeometryMode,
    RdpHalf1,
    RdpHalf2,
    RdpHalfCont,
    Special1,
    Special2,
    Special3,
    DmaIo,
    LoadUcode,

    // RDP commands
    SetCImg,
    SetZImg,
    SetTImg,
    SetCombine,
    SetEnvColor,
    SetPrimColor,
    SetBlendColor,
    SetFogColor,
    SetFillColor,
    FillRect,
    SetTile,
    LoadTile,
    LoadBlock,
    SetTileSize,
    LoadTlut,
    RdpSetOtherMode,
    SetPrimDepth,
    SetScissor,
    SetConvert,
    SetKeyR,
    SetKeyGB,
    RdpFullSync,
    RdpTileSync,
    RdpPipeSync,
    RdpLoadSync,
    TexRectFlip,
    TexRect,
}

/// RDP command bytes, identical for both microcode families
pub mod rdp {
    pub const G_SETCIMG: u8 = 0xFF;
    pub const G_SETZIMG: u8 = 0xFE;
    pub const G_SETTIMG: u8 = 0xFD;
    pub const G_SETCOMBINE: u8 = 0xFC;
    pub const G_SETENVCOLOR: u8 = 0xFB;
    pub const G_SETPRIMCOLOR: u8 = 0xFA;
    pub const G_SETBLENDCOLOR: u8 = 0xF9;
    pub const G_SETFOGCOLOR: u8 = 0xF8;
    pub const G_SETFILLCOLOR: u8 = 0xF7;
    pub const G_FILLRECT: u8 = 0xF6;
    pub const G_SETTILE: u8 = 0xF5;
    pub const G_LOADTILE: u8 = 0xF4;
    pub const G_LOADBLOCK: u8 = 0xF3;
    pub const G_SETTILESIZE: u8 = 0xF2;
    pub const G_LOADTLUT: u8 = 0xF0;
    pub const G_RDPSETOTHERMODE: u8 = 0xEF;
    pub const G_SETPRIMDEPTH: u8 = 0xEE;
    pub const G_SETSCISSOR: u8 = 0xED;
    pub const G_SETCONVERT: u8 = 0xEC;
    pub const G_SETKEYR: u8 = 0xEB;
    pub const G_SETKEYGB: u8 = 0xEA;
    pub const G_RDPFULLSYNC: u8 = 0xE9;
    pub const G_RDPTILESYNC: u8 = 0xE8;
    pub const G_RDPPIPESYNC: u8 = 0xE7;
    pub const G_RDPLOADSYNC: u8 = 0xE6;
    pub const G_TEXRECTFLIP: u8 = 0xE5;
    pub const G_TEXRECT: u8 = 0xE4;
}

/// Legacy Fast3D command bytes and flag values
pub mod f3d {
    pub const G_SPNOOP: u8 = 0x00;
    pub const G_MTX: u8 = 0x01;
    pub const G_MOVEMEM: u8 = 0x03;
    pub const G_VTX: u8 = 0x04;
    pub const G_DL: u8 = 0x06;
    pub const G_SPRITE2D_BASE: u8 = 0x09;

    pub const G_TRI1: u8 = 0xBF;
    pub const G_CULLDL: u8 = 0xBE;
    pub const G_POPMTX: u8 = 0xBD;
    pub const G_MOVEWORD: u8 = 0xBC;
    pub const G_TEXTURE: u8 = 0xBB;
    pub const G_SETOTHERMODE_H: u8 = 0xBA;
    pub const G_SETOTHERMODE_L: u8 = 0xB9;
    pub const G_ENDDL: u8 = 0xB8;
    pub const G_SETGEOMETRYMODE: u8 = 0xB7;
    pub const G_CLEARGEOMETRYMODE: u8 = 0xB6;
    pub const G_LINE3D: u8 = 0xB5;
    pub const G_RDPHALF_1: u8 = 0xB4;
    pub const G_RDPHALF_2: u8 = 0xB3;
    pub const G_RDPHALF_CONT: u8 = 0xB2;
    pub const G_NOOP: u8 = 0xC0;

    pub const G_MTX_PROJECTION: u32 = 0x01;
    pub const G_MTX_LOAD: u32 = 0x02;
    pub const G_MTX_PUSH: u32 = 0x04;

    pub const G_MV_VIEWPORT: u32 = 0x80;
    pub const G_MV_LOOKATY: u32 = 0x82;
    pub const G_MV_LOOKATX: u32 = 0x84;
    pub const G_MV_L0: u32 = 0x86;
    pub const G_MV_L7: u32 = 0x94;
    pub const G_MV_TXTATT: u32 = 0x96;
    pub const G_MV_MATRIX_2: u32 = 0x98;
    pub const G_MV_MATRIX_3: u32 = 0x9A;
    pub const G_MV_MATRIX_4: u32 = 0x9C;
    pub const G_MV_MATRIX_1: u32 = 0x9E;

    pub const G_MW_POINTS: u32 = 0x0C;

    /// Vertex indices in triangle commands are premultiplied by this
    pub const VERTEX_INDEX_SCALE: u32 = 10;
    /// Vertex indices in cull commands are premultiplied by this
    pub const CULL_INDEX_SCALE: u32 = 40;
}

/// F3DEX2 command bytes and flag values
pub mod f3dex2 {
    pub const G_NOOP: u8 = 0x00;
    pub const G_VTX: u8 = 0x01;
    pub const G_MODIFYVTX: u8 = 0x02;
    pub const G_CULLDL: u8 = 0x03;
    pub const G_BRANCH_Z: u8 = 0x04;
    pub const G_TRI1: u8 = 0x05;
    pub const G_TRI2: u8 = 0x06;
    pub const G_QUAD: u8 = 0x07;
    pub const G_LINE3D: u8 = 0x08;

    pub const G_SPECIAL_3: u8 = 0xD3;
    pub const G_SPECIAL_2: u8 = 0xD4;
    pub const G_SPECIAL_1: u8 = 0xD5;
    pub const G_DMA_IO: u8 = 0xD6;
    pub const G_TEXTURE: u8 = 0xD7;
    pub const G_POPMTX: u8 = 0xD8;
    pub const G_GEOMETRYMODE: u8 = 0xD9;
    pub const G_MTX: u8 = 0xDA;
    pub const G_MOVEWORD: u8 = 0xDB;
    pub const G_MOVEMEM: u8 = 0xDC;
    pub const G_LOAD_UCODE: u8 = 0xDD;
    pub const G_DL: u8 = 0xDE;
    pub const G_ENDDL: u8 = 0xDF;
    pub const G_SPNOOP: u8 = 0xE0;
    pub const G_RDPHALF_1: u8 = 0xE1;
    pub const G_SETOTHERMODE_L: u8 = 0xE2;
    pub const G_SETOTHERMODE_H: u8 = 0xE3;
    pub const G_RDPHALF_2: u8 = 0xF1;

    // The push bit is stored inverted in the command
    pub const G_MTX_PUSH: u32 = 0x01;
    pub const G_MTX_LOAD: u32 = 0x02;
    pub const G_MTX_PROJECTION: u32 = 0x04;

    pub const G_MV_MMTX: u32 = 2;
    pub const G_MV_PMTX: u32 = 6;
    pub const G_MV_VIEWPORT: u32 = 8;
    pub const G_MV_LIGHT: u32 = 10;
    pub const G_MV_POINT: u32 = 12;
    pub const G_MV_MATRIX: u32 = 14;

    pub const G_MW_FORCEMTX: u32 = 0x0C;

    pub const VERTEX_INDEX_SCALE: u32 = 2;
    pub const CULL_INDEX_SCALE: u32 = 2;
}

// Shared between both variants
pub const G_DL_PUSH: u32 = 0x00;
pub const G_DL_NOPUSH: u32 = 0x01;

pub const G_MW_MATRIX: u32 = 0x00;
pub const G_MW_NUMLIGHT: u32 = 0x02;
pub const G_MW_CLIP: u32 = 0x04;
pub const G_MW_SEGMENT: u32 = 0x06;
pub const G_MW_FOG: u32 = 0x08;
pub const G_MW_LIGHTCOL: u32 = 0x0A;
pub const G_MW_PERSPNORM: u32 = 0x0E;

/// `G_MTX_MODELVIEW` selector accepted by the legacy pop command
pub const G_MTX_MODELVIEW: u32 = 0x00;

/// Byte size of a `Vtx` record
pub const VERTEX_SIZE: u32 = 16;
/// Byte size of a `Vp` record
pub const VIEWPORT_SIZE: u32 = 16;
/// Byte size of a `Light` record
pub const LIGHT_SIZE: u32 = 16;
/// Byte size of a `uSprite` record
pub const SPRITE_SIZE: u32 = 24;

const RDP_CODES: &[(u8, Opcode)] = &[
    (rdp::G_SETCIMG, Opcode::SetCImg),
    (rdp::G_SETZIMG, Opcode::SetZImg),
    (rdp::G_SETTIMG, Opcode::SetTImg),
    (rdp::G_SETCOMBINE, Opcode::SetCombine),
    (rdp::G_SETENVCOLOR, Opcode::SetEnvColor),
    (rdp::G_SETPRIMCOLOR, Opcode::SetPrimColor),
    (rdp::G_SETBLENDCOLOR, Opcode::SetBlendColor),
    (rdp::G_SETFOGCOLOR, Opcode::SetFogColor),
    (rdp::G_SETFILLCOLOR, Opcode::SetFillColor),
    (rdp::G_FILLRECT, Opcode::FillRect),
    (rdp::G_SETTILE, Opcode::SetTile),
    (rdp::G_LOADTILE, Opcode::LoadTile),
    (rdp::G_LOADBLOCK, Opcode::LoadBlock),
    (rdp::G_SETTILESIZE, Opcode::SetTileSize),
    (rdp::G_LOADTLUT, Opcode::LoadTlut),
    (rdp::G_RDPSETOTHERMODE, Opcode::RdpSetOtherMode),
    (rdp::G_SETPRIMDEPTH, Opcode::SetPrimDepth),
    (rdp::G_SETSCISSOR, Opcode::SetScissor),
    (rdp::G_SETCONVERT, Opcode::SetConvert),
    (rdp::G_SETKEYR, Opcode::SetKeyR),
    (rdp::G_SETKEYGB, Opcode::SetKeyGB),
    (rdp::G_RDPFULLSYNC, Opcode::RdpFullSync),
    (rdp::G_RDPTILESYNC, Opcode::RdpTileSync),
    (rdp::G_RDPPIPESYNC, Opcode::RdpPipeSync),
    (rdp::G_RDPLOADSYNC, Opcode::RdpLoadSync),
    (rdp::G_TEXRECTFLIP, Opcode::TexRectFlip),
    (rdp::G_TEXRECT, Opcode::TexRect),
];

const F3D_CODES: &[(u8, Opcode)] = &[
    (f3d::G_SPNOOP, Opcode::SpNoop),
    (f3d::G_MTX, Opcode::Mtx),
    (f3d::G_MOVEMEM, Opcode::MoveMem),
    (f3d::G_VTX, Opcode::Vtx),
    (f3d::G_DL, Opcode::Dl),
    (f3d::G_SPRITE2D_BASE, Opcode::Sprite2dBase),
    (f3d::G_TRI1, Opcode::Tri1),
    (f3d::G_CULLDL, Opcode::CullDl),
    (f3d::G_POPMTX, Opcode::PopMtx),
    (f3d::G_MOVEWORD, Opcode::MoveWord),
    (f3d::G_TEXTURE, Opcode::Texture),
    (f3d::G_SETOTHERMODE_H, Opcode::SetOtherModeH),
    (f3d::G_SETOTHERMODE_L, Opcode::SetOtherModeL),
    (f3d::G_ENDDL, Opcode::EndDl),
    (f3d::G_SETGEOMETRYMODE, Opcode::SetGeometryMode),
    (f3d::G_CLEARGEOMETRYMODE, Opcode::ClearGeometryMode),
    (f3d::G_LINE3D, Opcode::Line3d),
    (f3d::G_RDPHALF_1, Opcode::RdpHalf1),
    (f3d::G_RDPHALF_2, Opcode::RdpHalf2),
    (f3d::G_RDPHALF_CONT, Opcode::RdpHalfCont),
    (f3d::G_NOOP, Opcode::Noop),
];

const F3DEX2_CODES: &[(u8, Opcode)] = &[
    (f3dex2::G_NOOP, Opcode::Noop),
    (f3dex2::G_VTX, Opcode::Vtx),
    (f3dex2::G_MODIFYVTX, Opcode::ModifyVtx),
    (f3dex2::G_CULLDL, Opcode::CullDl),
    (f3dex2::G_BRANCH_Z, Opcode::BranchZ),
    (f3dex2::G_TRI1, Opcode::Tri1),
    (f3dex2::G_TRI2, Opcode::Tri2),
    (f3dex2::G_QUAD, Opcode::Quad),
    (f3dex2::G_LINE3D, Opcode::Line3d),
    (f3dex2::G_SPECIAL_3, Opcode::Special3),
    (f3dex2::G_SPECIAL_2, Opcode::Special2),
    (f3dex2::G_SPECIAL_1, Opcode::Special1),
    (f3dex2::G_DMA_IO, Opcode::DmaIo),
    (f3dex2::G_TEXTURE, Opcode::Texture),
    (f3dex2::G_POPMTX, Opcode::PopMtx),
    (f3dex2::G_GEOMETRYMODE, Opcode::GeometryMode),
    (f3dex2::G_MTX, Opcode::Mtx),
    (f3dex2::G_MOVEWORD, Opcode::MoveWord),
    (f3dex2::G_MOVEMEM, Opcode::MoveMem),
    (f3dex2::G_LOAD_UCODE, Opcode::LoadUcode),
    (f3dex2::G_DL, Opcode::Dl),
    (f3dex2::G_ENDDL, Opcode::EndDl),
    (f3dex2::G_SPNOOP, Opcode::SpNoop),
    (f3dex2::G_RDPHALF_1, Opcode::RdpHalf1),
    (f3dex2::G_SETOTHERMODE_L, Opcode::SetOtherModeL),
    (f3dex2::G_SETOTHERMODE_H, Opcode::SetOtherModeH),
    (f3dex2::G_RDPHALF_2, Opcode::RdpHalf2),
];

/// All `(byte, opcode)` pairs of a microcode variant, RSP commands first
pub fn opcode_codes(microcode: Microcode) -> impl Iterator<Item = &'static (u8, Opcode)> {
    let rsp = match microcode {
        Microcode::F3d => F3D_CODES,
        Microcode::F3dex2 => F3DEX2_CODES,
    };
    rsp.iter().chain(RDP_CODES.iter())
}

impl Opcode {
    /// The command byte for this opcode in the given variant
    pub fn code(self, microcode: Microcode) -> Option<u8> {
        opcode_codes(microcode)
            .find(|(_, op)| *op == self)
            .map(|(code, _)| *code)
    }

    /// The GBI name of the command
    pub fn name(self) -> &'static str {
        match self {
            Opcode::SpNoop => "G_SPNOOP",
            Opcode::Noop => "G_NOOP",
            Opcode::Mtx => "G_MTX",
            Opcode::MoveMem => "G_MOVEMEM",
            Opcode::Vtx => "G_VTX",
            Opcode::ModifyVtx => "G_MODIFYVTX",
            Opcode::Dl => "G_DL",
            Opcode::BranchZ => "G_BRANCH_Z",
            Opcode::EndDl => "G_ENDDL",
            Opcode::Sprite2dBase => "G_SPRITE2D_BASE",
            Opcode::Tri1 => "G_TRI1",
            Opcode::Tri2 => "G_TRI2",
            Opcode::Quad => "G_QUAD",
            Opcode::Line3d => "G_LINE3D",
            Opcode::CullDl => "G_CULLDL",
            Opcode::PopMtx => "G_POPMTX",
            Opcode::MoveWord => "G_MOVEWORD",
            Opcode::Texture => "G_TEXTURE",
            Opcode::SetOtherModeH => "G_SETOTHERMODE_H",
            Opcode::SetOtherModeL => "G_SETOTHERMODE_L",
            Opcode::SetGeometryMode => "G_SETGEOMETRYMODE",
            Opcode::ClearGeometryMode => "G_CLEARGEOMETRYMODE",
            Opcode::GeometryMode => "G_GEOMETRYMODE",
            Opcode::RdpHalf1 => "G_RDPHALF_1",
            Opcode::RdpHalf2 => "G_RDPHALF_2",
            Opcode::RdpHalfCont => "G_RDPHALF_CONT",
            Opcode::Special1 => "G_SPECIAL_1",
            Opcode::Special2 => "G_SPECIAL_2",
            Opcode::Special3 => "G_SPECIAL_3",
            Opcode::DmaIo => "G_DMA_IO",
            Opcode::LoadUcode => "G_LOAD_UCODE",
            Opcode::SetCImg => "G_SETCIMG",
            Opcode::SetZImg => "G_SETZIMG",
            Opcode::SetTImg => "G_SETTIMG",
            Opcode::SetCombine => "G_SETCOMBINE",
            Opcode::SetEnvColor => "G_SETENVCOLOR",
            Opcode::SetPrimColor => "G_SETPRIMCOLOR",
            Opcode::SetBlendColor => "G_SETBLENDCOLOR",
            Opcode::SetFogColor => "G_SETFOGCOLOR",
            Opcode::SetFillColor => "G_SETFILLCOLOR",
            Opcode::FillRect => "G_FILLRECT",
            Opcode::SetTile => "G_SETTILE",
            Opcode::LoadTile => "G_LOADTILE",
            Opcode::LoadBlock => "G_LOADBLOCK",
            Opcode::SetTileSize => "G_SETTILESIZE",
            Opcode::LoadTlut => "G_LOADTLUT",
            Opcode::RdpSetOtherMode => "G_RDPSETOTHERMODE",
            Opcode::SetPrimDepth => "G_SETPRIMDEPTH",
            Opcode::SetScissor => "G_SETSCISSOR",
            Opcode::SetConvert => "G_SETCONVERT",
            Opcode::SetKeyR => "G_SETKEYR",
            Opcode::SetKeyGB => "G_SETKEYGB",
            Opcode::RdpFullSync => "G_RDPFULLSYNC",
            Opcode::RdpTileSync => "G_RDPTILESYNC",
            Opcode::RdpPipeSync => "G_RDPPIPESYNC",
            Opcode::RdpLoadSync => "G_RDPLOADSYNC",
            Opcode::TexRectFlip => "G_TEXRECTFLIP",
            Opcode::TexRect => "G_TEXRECT",
        }
    }
}

/// Bits a matrix command may set once decoded
pub const G_MTX_VALID_MASK: u32 = 0x07;

/// Matrix command flags, independent of how the microcode encodes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatrixFlags {
    pub projection: bool,
    pub load: bool,
    pub push: bool,
}

impl MatrixFlags {
    /// Decode the raw flag byte of a matrix command. Bits outside
    /// [`G_MTX_VALID_MASK`] are ignored here and must be checked by the caller.
    pub fn decode(microcode: Microcode, raw: u32) -> Self {
        match microcode {
            Microcode::F3d => MatrixFlags {
                projection: raw & f3d::G_MTX_PROJECTION != 0,
                load: raw & f3d::G_MTX_LOAD != 0,
                push: raw & f3d::G_MTX_PUSH != 0,
            },
            Microcode::F3dex2 => {
                let raw = raw ^ f3dex2::G_MTX_PUSH;
                MatrixFlags {
                    projection: raw & f3dex2::G_MTX_PROJECTION != 0,
                    load: raw & f3dex2::G_MTX_LOAD != 0,
                    push: raw & f3dex2::G_MTX_PUSH != 0,
                }
            }
        }
    }

    /// The flag byte as stored in the command
    pub fn encode(self, microcode: Microcode) -> u32 {
        let (projection, load, push) = match microcode {
            Microcode::F3d => (f3d::G_MTX_PROJECTION, f3d::G_MTX_LOAD, f3d::G_MTX_PUSH),
            Microcode::F3dex2 => (
                f3dex2::G_MTX_PROJECTION,
                f3dex2::G_MTX_LOAD,
                f3dex2::G_MTX_PUSH,
            ),
        };

        let mut raw = 0;
        if self.projection {
            raw |= projection;
        }
        if self.load {
            raw |= load;
        }
        if self.push {
            raw |= push;
        }

        match microcode {
            Microcode::F3d => raw,
            Microcode::F3dex2 => raw ^ f3dex2::G_MTX_PUSH,
        }
    }
}

/// Name of a move-word index, if the index is one the microcode defines
pub fn move_word_name(microcode: Microcode, index: u32) -> Option<&'static str> {
    let name = match index {
        G_MW_MATRIX => "G_MW_MATRIX",
        G_MW_NUMLIGHT => "G_MW_NUMLIGHT",
        G_MW_CLIP => "G_MW_CLIP",
        G_MW_SEGMENT => "G_MW_SEGMENT",
        G_MW_FOG => "G_MW_FOG",
        G_MW_LIGHTCOL => "G_MW_LIGHTCOL",
        G_MW_PERSPNORM => "G_MW_PERSPNORM",
        0x0C => match microcode {
            Microcode::F3d => "G_MW_POINTS",
            Microcode::F3dex2 => "G_MW_FORCEMTX",
        },
        _ => return None,
    };
    Some(name)
}
