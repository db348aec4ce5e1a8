//! Light component.

use crate::{Entity, SceneError};

/// Kind of light. Stored as an `i32` tag in scene files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LightType {
    #[default]
    Directional = 0,
}

impl LightType {
    pub fn tag(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for LightType {
    type Error = SceneError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(LightType::Directional),
            other => Err(SceneError::UnknownLightType(other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Light {
    pub entity: Entity,
    pub light_type: LightType,
}

impl Light {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            light_type: LightType::Directional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_type_tags() {
        assert_eq!(LightType::Directional.tag(), 0);
        assert_eq!(LightType::try_from(0).unwrap(), LightType::Directional);
        assert!(matches!(
            LightType::try_from(7),
            Err(SceneError::UnknownLightType(7))
        ));
    }
}
