//! 颜色量化表与默认调色板数据
//! 数值取自 MSX2 VDP 的硬件输出电平

/// 3 位颜色分量 → 8 位
pub const COLOR_3BITS: [u8; 8] = [0x00, 0x24, 0x49, 0x6d, 0x92, 0xb6, 0xdb, 0xff];

/// 2 位颜色分量 → 8 位 (SCREEN 8 的蓝色)
pub const COLOR_2BITS: [u8; 4] = [0x00, 0x55, 0xaa, 0xff];

/// 5 位颜色分量 → 8 位 (YJK/YAE)
pub const COLOR_5BITS: [u8; 32] = [
    0, 8, 16, 24, 33, 41, 49, 57, //
    66, 74, 82, 90, 99, 107, 115, 123, //
    132, 140, 148, 156, 165, 173, 181, 189, //
    198, 206, 214, 222, 231, 239, 247, 255,
];

/// 调色板原始字节长度 (16 色 × 2 字节)
pub const PALETTE_BYTES: usize = 32;

/// MSX2 开机默认调色板 (VDP 调色板寄存器格式)
pub const DEFAULT_PALETTE_BYTES: [u8; PALETTE_BYTES] = [
    0x00, 0x00, 0x00, 0x00, 0x11, 0x06, 0x33, 0x07, //
    0x17, 0x01, 0x27, 0x03, 0x51, 0x01, 0x27, 0x06, //
    0x71, 0x01, 0x73, 0x03, 0x61, 0x06, 0x64, 0x06, //
    0x11, 0x04, 0x65, 0x02, 0x55, 0x05, 0x77, 0x07,
];
