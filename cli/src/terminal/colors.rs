use colored::Color;

pub const PRIMARY: Color = Color::BrightBlue;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const IPV4_ADDR: Color = Color::BrightBlue;
pub const MAC_ADDR: Color = Color::Yellow;

pub const PORT_OPEN: Color = Color::BrightGreen;
pub const PORT_CLOSED: Color = Color::Red;
pub const PORT_FILTERED: Color = Color::BrightBlack;
