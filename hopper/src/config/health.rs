use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthConfig {
    pub max_hp: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { max_hp: 3 }
    }
}

impl HealthConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_hp == 0 {
            return Err(ConfigError::ZeroMaxHp);
        }
        Ok(())
    }
}
