use crate::Error;

/// Largest vertex count whose quad triangulation (6 indices per 4 vertices) still addresses a
/// 16-bit index range.
pub const DEFAULT_MAX_VERTICES: usize = 10920;

pub const DEFAULT_Z_OFFSET: f32 = 0.1;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct BatcherConfig {
    pub max_vertices: usize,
    pub two_color_tint: bool,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            max_vertices: DEFAULT_MAX_VERTICES,
            two_color_tint: true,
        }
    }
}

impl BatcherConfig {
    pub fn max_indices(&self) -> usize {
        self.max_vertices * 3
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_vertices == 0 {
            return Err(Error::invalid_value("max_vertices must be greater than zero"));
        }
        // Indices are stored as u32 and offset by the running vertex cursor.
        if u32::try_from(self.max_vertices.saturating_mul(3)).is_err() {
            return Err(Error::invalid_value(format!(
                "max_vertices {} does not fit 32-bit indices",
                self.max_vertices
            )));
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SkeletonMeshConfig {
    pub batcher: BatcherConfig,
    /// Depth added after every attachment so later slots draw in front.
    pub z_offset: f32,
}

impl Default for SkeletonMeshConfig {
    fn default() -> Self {
        Self {
            batcher: BatcherConfig::default(),
            z_offset: DEFAULT_Z_OFFSET,
        }
    }
}

impl SkeletonMeshConfig {
    pub fn validate(&self) -> Result<(), Error> {
        self.batcher.validate()?;
        if !self.z_offset.is_finite() {
            return Err(Error::invalid_value(format!(
                "z_offset must be finite, got {}",
                self.z_offset
            )));
        }
        Ok(())
    }

    #[cfg(feature = "json")]
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(input).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}
