use bevy::color::Color;

pub const CORAL_PALETTE: [Color; 4] = [
    Color::srgb(1.0, 0.4, 0.6),
    Color::srgb(0.6, 0.3, 0.8),
    Color::srgb(1.0, 0.6, 0.2),
    Color::srgb(0.3, 0.8, 0.7),
];

pub const BOTTLE_PALETTE: [Color; 3] = [
    Color::srgb(0.2, 0.7, 0.9),
    Color::srgb(0.3, 0.9, 0.4),
    Color::srgb(0.9, 0.9, 0.95),
];
pub const BOTTLE_CAP_COLOUR: Color = Color::srgb(0.2, 0.4, 0.8);
pub const BOTTLE_ALPHA: f32 = 0.7;

pub const FISH_PALETTE: [Color; 4] = [
    Color::srgb(1.0, 0.8, 0.1),
    Color::srgb(1.0, 0.4, 0.2),
    Color::srgb(0.3, 0.7, 1.0),
    Color::srgb(0.9, 0.3, 0.6),
];

pub const TURTLE_PALETTE: [Color; 1] = [Color::srgb(0.2, 0.55, 0.35)];

/// Emissive strength relative to the diffuse colour.
pub const CORAL_EMISSIVE_SCALE: f32 = 0.2;
pub const FISH_EMISSIVE_SCALE: f32 = 0.15;
pub const TURTLE_EMISSIVE_SCALE: f32 = 0.27;

pub const MARKER_GLOW: Color = Color::srgb(0.2, 0.8, 1.0);

pub const WATER_COLOUR: Color = Color::srgba(0.2, 0.6, 0.85, 0.5);
pub const SEAFLOOR_COLOUR: Color = Color::srgb(0.45, 0.38, 0.28);
pub const SKY_COLOUR: Color = Color::srgb(0.15, 0.4, 0.6);
pub const CLEAR_COLOUR: Color = Color::srgb(0.15, 0.45, 0.65);
pub const FOG_COLOUR: Color = Color::srgb(0.2, 0.5, 0.7);
