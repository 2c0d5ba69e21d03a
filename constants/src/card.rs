use bevy::prelude::*;

/// Card body dimensions (width, height, depth).
pub const CARD_SIZE: Vec3 = Vec3::new(2.8, 1.6, 0.2);

/// Appearance parameters for one visual style of a card.
#[derive(Clone, Copy)]
pub struct CardStyleParams {
    pub base_color: Color,
    pub emissive_color: LinearRgba,
    pub emissive_intensity: f32,
    pub transmission: f32,
}

/// Active (not yet completed) card look: cool glass with a faint inner glow.
pub const ACTIVE_STYLE: CardStyleParams = CardStyleParams {
    base_color: Color::srgb(0.53, 0.80, 1.0),
    emissive_color: LinearRgba::rgb(0.0, 0.13, 0.27),
    emissive_intensity: 0.3,
    transmission: 0.85,
};

/// Completed card look: darkened, nearly opaque, glow almost out.
pub const COMPLETED_STYLE: CardStyleParams = CardStyleParams {
    base_color: Color::srgb(0.2, 0.27, 0.33),
    emissive_color: LinearRgba::rgb(0.0, 0.13, 0.27),
    emissive_intensity: 0.05,
    transmission: 0.3,
};

/// Emissive level a freshly spawned card flares at before settling.
pub const SPAWN_EMISSIVE: f32 = 2.0;

/// Emissive spike at the peak of the completion flash.
pub const COMPLETE_EMISSIVE_PEAK: f32 = 3.0;

/// Emissive lift applied while a card is hovered.
pub const HOVER_EMISSIVE: f32 = 0.8;
