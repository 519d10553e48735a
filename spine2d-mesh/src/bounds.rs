use crate::Error;

#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Axis-aligned box around `points`, or `None` when there are no points.
    pub fn from_points(points: &[[f32; 2]]) -> Option<Self> {
        let mut acc = MinMax::default();
        for &p in points {
            acc.add(p);
        }
        acc.bounds()
    }

    pub fn union(&self, other: &Self) -> Self {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    fn finite_or_zero(self) -> Self {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if finite {
            self
        } else {
            Self::ZERO
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct MinMax {
    min: [f32; 2],
    max: [f32; 2],
}

impl Default for MinMax {
    fn default() -> Self {
        Self {
            min: [f32::INFINITY; 2],
            max: [f32::NEG_INFINITY; 2],
        }
    }
}

impl MinMax {
    fn add(&mut self, p: [f32; 2]) {
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    fn bounds(&self) -> Option<Bounds> {
        if self.min[0] > self.max[0] || self.min[1] > self.max[1] {
            return None;
        }
        Some(Bounds::new(
            self.min[0],
            self.min[1],
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
        ))
    }
}

/// Pose access a bounds provider needs from the skeleton runtime.
///
/// Implementations are expected to work on a scratch skeleton, since providers freely change
/// skins and pose.
pub trait PoseSampler {
    fn set_to_setup_pose(&mut self);

    /// Combines the named skins into the active skin. An empty list leaves the skin unchanged.
    fn set_skins(&mut self, skins: &[&str]) -> Result<(), Error>;

    fn animation_duration(&self, name: &str) -> Option<f32>;

    /// Poses the skeleton with `name` at `time` seconds, on top of the setup pose.
    fn apply_animation(&mut self, name: &str, time: f32) -> Result<(), Error>;

    fn update_world_transform(&mut self);

    /// Appends the world-space vertices of every visible attachment. With `clipping`, vertices are
    /// clipped by active clipping attachments first.
    fn world_vertices(&self, clipping: bool, out: &mut Vec<[f32; 2]>);
}

/// Sizing policy for a skeleton's scene node.
pub trait BoundsProvider {
    fn calculate_bounds(&self, sampler: &mut dyn PoseSampler) -> Result<Bounds, Error>;
}

/// Always reports the same rectangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AabbRectangleBoundsProvider {
    pub bounds: Bounds,
}

impl AabbRectangleBoundsProvider {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            bounds: Bounds::new(x, y, width, height),
        }
    }
}

impl BoundsProvider for AabbRectangleBoundsProvider {
    fn calculate_bounds(&self, _sampler: &mut dyn PoseSampler) -> Result<Bounds, Error> {
        Ok(self.bounds)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SetupPoseBoundsProvider {
    pub clipping: bool,
}

impl BoundsProvider for SetupPoseBoundsProvider {
    fn calculate_bounds(&self, sampler: &mut dyn PoseSampler) -> Result<Bounds, Error> {
        sampler.set_to_setup_pose();
        sampler.update_world_transform();
        let mut points = Vec::new();
        sampler.world_vertices(self.clipping, &mut points);
        Ok(Bounds::from_points(&points)
            .unwrap_or(Bounds::ZERO)
            .finite_or_zero())
    }
}

pub const DEFAULT_TIME_STEP: f32 = 0.05;
/// Upper bound on poses sampled for one animation.
pub const MAX_BOUNDS_SAMPLES: usize = 100_000;

/// Union of the skeleton's bounds over every sampled frame of one animation.
#[derive(Clone, Debug, PartialEq)]
pub struct SkinsAndAnimationBoundsProvider {
    pub animation: Option<String>,
    pub skins: Vec<String>,
    pub time_step: f32,
    pub clipping: bool,
}

impl Default for SkinsAndAnimationBoundsProvider {
    fn default() -> Self {
        Self {
            animation: None,
            skins: Vec::new(),
            time_step: DEFAULT_TIME_STEP,
            clipping: false,
        }
    }
}

impl SkinsAndAnimationBoundsProvider {
    pub fn new(animation: Option<&str>, skins: &[&str]) -> Self {
        Self {
            animation: animation.map(str::to_string),
            skins: skins.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    fn sample_times(&self, duration: f32) -> Result<Vec<f32>, Error> {
        let steps = (duration.max(0.0) / self.time_step).ceil();
        if steps >= MAX_BOUNDS_SAMPLES as f32 {
            return Err(Error::invalid_value(format!(
                "time_step {} over {duration}s exceeds {MAX_BOUNDS_SAMPLES} samples",
                self.time_step
            )));
        }
        let mut times: Vec<f32> = (0..steps as usize)
            .map(|i| i as f32 * self.time_step)
            .filter(|&t| t < duration)
            .collect();
        times.push(duration.max(0.0));
        Ok(times)
    }
}

impl BoundsProvider for SkinsAndAnimationBoundsProvider {
    fn calculate_bounds(&self, sampler: &mut dyn PoseSampler) -> Result<Bounds, Error> {
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(Error::invalid_value(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }

        if !self.skins.is_empty() {
            let skins: Vec<&str> = self.skins.iter().map(String::as_str).collect();
            sampler.set_skins(&skins)?;
        }

        let Some(animation) = self.animation.as_deref() else {
            return SetupPoseBoundsProvider {
                clipping: self.clipping,
            }
            .calculate_bounds(sampler);
        };

        let duration = sampler
            .animation_duration(animation)
            .ok_or_else(|| Error::UnknownAnimation {
                name: animation.to_string(),
            })?;
        if !duration.is_finite() {
            return Err(Error::invalid_value(format!(
                "animation '{animation}' has non-finite duration {duration}"
            )));
        }

        let mut acc = MinMax::default();
        let mut points = Vec::new();
        let times = self.sample_times(duration)?;
        for &time in &times {
            sampler.set_to_setup_pose();
            sampler.apply_animation(animation, time)?;
            sampler.update_world_transform();
            points.clear();
            sampler.world_vertices(self.clipping, &mut points);
            for &p in &points {
                acc.add(p);
            }
        }

        let bounds = acc.bounds().unwrap_or(Bounds::ZERO).finite_or_zero();
        log::debug!(
            "bounds of '{animation}' over {} samples: {:?}",
            times.len(),
            bounds
        );
        Ok(bounds)
    }
}
