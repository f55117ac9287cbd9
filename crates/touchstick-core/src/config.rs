//! Joystick configuration: raw options and the validated config built from them.

use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

use crate::constraint::{JoystickShape, ShapeConstraint};
use crate::error::{ConfigError, ConfigResult};

/// Handle width and height used when none is configured.
pub const DEFAULT_HANDLE_SIZE: f64 = 30.0;

/// Unvalidated option bag, as a host application would describe a joystick.
///
/// Field names follow the host-facing option names (`neutralPointX`,
/// `isSticky`, ...) when (de)serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JoystickOptions {
    pub shape: Option<JoystickShape>,
    pub length: Option<f64>,
    pub neutral_point_x: f64,
    pub neutral_point_y: f64,
    pub is_sticky: bool,
    pub sticky_x: f64,
    pub sticky_y: f64,
    pub handle_width: Option<f64>,
    pub handle_height: Option<f64>,
}

impl JoystickOptions {
    /// Parse options from JSON.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the options into a config.
    pub fn build(&self) -> ConfigResult<JoystickConfig> {
        let shape = self.shape.ok_or(ConfigError::MissingShape)?;
        let length = self.length.ok_or(ConfigError::MissingLength)?;

        let mut config = JoystickConfig::new(shape, length)?
            .with_neutral_point(Point::new(self.neutral_point_x, self.neutral_point_y))?
            .with_handle_size(Size::new(
                self.handle_width.unwrap_or(DEFAULT_HANDLE_SIZE),
                self.handle_height.unwrap_or(DEFAULT_HANDLE_SIZE),
            ))?;
        if self.is_sticky {
            config = config.with_sticky(Vec2::new(self.sticky_x, self.sticky_y))?;
        }
        Ok(config)
    }
}

impl TryFrom<&JoystickOptions> for JoystickConfig {
    type Error = ConfigError;

    fn try_from(options: &JoystickOptions) -> ConfigResult<Self> {
        options.build()
    }
}

/// Validated, immutable joystick configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct JoystickConfig {
    constraint: ShapeConstraint,
    neutral_point: Point,
    handle_size: Size,
    sticky: Option<Vec2>,
}

impl JoystickConfig {
    /// Create a config for the given shape and radius / half-range.
    pub fn new(shape: JoystickShape, length: f64) -> ConfigResult<Self> {
        if !length.is_finite() || length <= 0.0 {
            return Err(ConfigError::InvalidLength(length));
        }
        Ok(Self {
            constraint: shape.constraint(length),
            neutral_point: Point::ZERO,
            handle_size: Size::new(DEFAULT_HANDLE_SIZE, DEFAULT_HANDLE_SIZE),
            sticky: None,
        })
    }

    /// Parse and validate a config from JSON options.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        JoystickOptions::from_json(json)?.build()
    }

    /// Set the neutral point (center of the widget in host coordinates).
    pub fn with_neutral_point(mut self, point: Point) -> ConfigResult<Self> {
        if !point.is_finite() {
            return Err(ConfigError::InvalidNeutralPoint);
        }
        self.neutral_point = point;
        Ok(self)
    }

    /// Set the handle size used for hit testing and drawing.
    pub fn with_handle_size(mut self, size: Size) -> ConfigResult<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(size.width) || !valid(size.height) {
            return Err(ConfigError::InvalidHandleSize {
                width: size.width,
                height: size.height,
            });
        }
        self.handle_size = size;
        Ok(self)
    }

    /// Enable sticky mode: the handle snaps to `target` on release.
    pub fn with_sticky(mut self, target: Vec2) -> ConfigResult<Self> {
        if !target.is_finite() || !self.constraint.admits(target) {
            return Err(ConfigError::StickyOutOfBounds {
                x: target.x,
                y: target.y,
            });
        }
        self.sticky = Some(target);
        Ok(self)
    }

    pub fn shape(&self) -> JoystickShape {
        self.constraint.shape()
    }

    pub fn length(&self) -> f64 {
        self.constraint.length()
    }

    pub fn constraint(&self) -> ShapeConstraint {
        self.constraint
    }

    pub fn neutral_point(&self) -> Point {
        self.neutral_point
    }

    pub fn handle_size(&self) -> Size {
        self.handle_size
    }

    /// Sticky target, if sticky mode is enabled.
    pub fn sticky_target(&self) -> Option<Vec2> {
        self.sticky
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky.is_some()
    }

    /// Convert back to the option bag form.
    pub fn to_options(&self) -> JoystickOptions {
        let sticky = self.sticky.unwrap_or(Vec2::ZERO);
        JoystickOptions {
            shape: Some(self.shape()),
            length: Some(self.length()),
            neutral_point_x: self.neutral_point.x,
            neutral_point_y: self.neutral_point.y,
            is_sticky: self.sticky.is_some(),
            sticky_x: sticky.x,
            sticky_y: sticky.y,
            handle_width: Some(self.handle_size.width),
            handle_height: Some(self.handle_size.height),
        }
    }
}
