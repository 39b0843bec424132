/// Parameters of a turbulence-driven displacement filter.
///
/// Pointer speed kicks a target scale which then relaxes towards zero; the
/// applied scale eases after the target and is capped. The noise base
/// frequency may breathe with a slow sinusoid of elapsed time.
#[derive(Debug, Clone, PartialEq)]
pub struct Displacement {
    /// Scale the filter eases towards.
    pub target_scale: f32,
    /// Scale currently applied.
    pub scale: f32,
    /// Noise base frequency currently applied.
    pub base_frequency: f32,
    options: DisplacementOptions,
}

/// Tuning constants for [`Displacement`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacementOptions {
    /// Scale applied as soon as the pointer moves at all.
    pub base_scale: f32,
    /// Scale added per pixel of pointer speed.
    pub speed_gain: f32,
    /// Maximum scale added by speed.
    pub speed_cap: f32,
    /// Per-tick multiplier pulling the target back to rest.
    pub decay: f32,
    /// Fraction of the remaining distance covered per tick.
    pub follow: f32,
    /// Upper bound of the applied scale.
    pub max_scale: f32,
    /// Resting noise base frequency.
    pub base_frequency: f32,
    /// Amplitude of the base frequency oscillation.
    pub frequency_wobble: f32,
}

impl Default for DisplacementOptions {
    fn default() -> Self {
        Self {
            base_scale: 15.0,
            speed_gain: 0.8,
            speed_cap: 35.0,
            decay: 0.95,
            follow: 0.1,
            max_scale: 30.0,
            base_frequency: 0.015,
            frequency_wobble: 0.0,
        }
    }
}

impl Displacement {
    /// Constructs a displacement at its resting scale.
    pub fn new(options: DisplacementOptions) -> Self {
        Self {
            target_scale: 10.0,
            scale: 10.0,
            base_frequency: options.base_frequency,
            options,
        }
    }

    /// Kicks the target scale from a pointer speed sample.
    pub fn kick(&mut self, speed: f32) {
        let o = &self.options;
        self.target_scale = o.base_scale + (speed * o.speed_gain).min(o.speed_cap);
    }

    /// Advances one tick at `time` seconds and returns the scale to apply.
    pub fn tick(&mut self, time: f32) -> f32 {
        let o = &self.options;
        self.target_scale *= o.decay;
        self.scale += (self.target_scale - self.scale) * o.follow;
        self.base_frequency = o.base_frequency + (time * 0.5).sin() * o.frequency_wobble;
        self.applied_scale()
    }

    /// Returns the capped scale.
    pub fn applied_scale(&self) -> f32 {
        self.scale.min(self.options.max_scale)
    }
}

impl Default for Displacement {
    fn default() -> Self {
        Self::new(DisplacementOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kick_is_capped() {
        let mut d = Displacement::default();
        d.kick(10.0);
        assert_eq!(d.target_scale, 23.0);
        d.kick(1000.0);
        assert_eq!(d.target_scale, 50.0);
    }

    #[test]
    fn test_scale_relaxes_and_is_capped() {
        let mut d = Displacement::default();
        d.kick(1000.0);
        let applied: Vec<f32> = (0..200).map(|i| d.tick(i as f32 / 60.0)).collect();
        assert!(applied.iter().all(|s| *s <= 30.0));
        assert!(applied[199] < 0.5);
        assert!(applied[5] > applied[0]);
    }

    #[test]
    fn test_frequency_wobble() {
        let mut d = Displacement::new(DisplacementOptions {
            frequency_wobble: 0.005,
            ..Default::default()
        });
        d.tick(0.0);
        assert_eq!(d.base_frequency, 0.015);
        d.tick(std::f32::consts::PI);
        assert!((d.base_frequency - 0.02).abs() < 1e-6);
    }
}
