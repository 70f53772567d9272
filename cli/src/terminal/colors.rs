use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 0x8a, g: 0xdc, b: 0xff };
pub const ACCENT: Color = Color::TrueColor { r: 0xff, g: 0xb8, b: 0x6c };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const IPV4_ADDR: Color = Color::TrueColor { r: 0x7f, g: 0xe0, b: 0x9a };
pub const IPV4_PREFIX: Color = Color::TrueColor { r: 0x4e, g: 0xa8, b: 0x6a };
pub const MAC_ADDR: Color = Color::TrueColor { r: 0xd6, g: 0x9c, b: 0xf5 };
pub const VENDOR: Color = Color::TrueColor { r: 0xf1, g: 0xfa, b: 0x8c };

pub const PORT: Color = Color::TrueColor { r: 0x8b, g: 0xe9, b: 0xfd };
pub const SERVICE: Color = Color::TrueColor { r: 0xff, g: 0x79, b: 0xc6 };
pub const TLS: Color = Color::Green;
pub const HTTP: Color = Color::Yellow;
pub const FAILURE: Color = Color::Red;
