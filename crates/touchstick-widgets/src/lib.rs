//! egui presentation adapter for touchstick virtual joysticks.
//!
//! - **Joystick**: track and handle painting, drag capture, release animation
//!
//! The joystick logic itself lives in `touchstick-core`; this crate only maps
//! egui pointer input onto a [`touchstick_core::JoystickSession`] and draws
//! the result.

pub mod joystick;

pub use joystick::{JoystickStyle, JoystickWidget};

/// Standard sizing constants used across widgets.
pub mod sizing {
    /// Smallest area a joystick will allocate
    pub const SMALL: f32 = 20.0;
}

/// Standard colors used across widgets.
pub mod theme {
    use egui::Color32;

    /// Border color
    pub const BORDER: Color32 = Color32::from_rgb(220, 220, 220);
    /// Active handle color (blue)
    pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
    /// Track background
    pub const TRACK_BG: Color32 = Color32::from_rgba_premultiplied(240, 240, 244, 240);
}
