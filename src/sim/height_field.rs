use glam::Vec2;

/// A double-buffered grid of scalar heights advanced by a damped discrete
/// wave equation.
///
/// Each [`step`](HeightField::step) computes, for every cell,
///
/// ```text
/// next = (average_of_4_neighbours(current) * 2 - previous) * damping
/// ```
///
/// writing `next` over `previous` and then swapping the two buffers, so a
/// step never reads a value it has already written. Neighbours past the
/// border are clamped to the edge cell.
#[derive(Debug, Clone)]
pub struct HeightField {
    width: usize,
    height: usize,
    current: Vec<f32>,
    previous: Vec<f32>,
    damping: f32,
}

impl HeightField {
    /// Constructs a flat field of the given size.
    pub fn new(width: usize, height: usize, damping: f32) -> Self {
        Self {
            width,
            height,
            current: vec![0.0; width * height],
            previous: vec![0.0; width * height],
            damping,
        }
    }

    /// Returns the field width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the field height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the damping multiplier applied every step.
    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Returns the current heights, row-major.
    pub fn heights(&self) -> &[f32] {
        &self.current
    }

    /// Returns the current height at the given cell, if it exists.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        (x < self.width && y < self.height).then(|| self.current[y * self.width + x])
    }

    /// Reallocates both buffers for the new size and flattens the field.
    ///
    /// Previous state is discarded rather than resampled.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.current = vec![0.0; width * height];
        self.previous = vec![0.0; width * height];
    }

    /// Flattens the field without reallocating.
    pub fn reset(&mut self) {
        self.current.fill(0.0);
        self.previous.fill(0.0);
    }

    /// Adds a cone-shaped displacement centered at `center`.
    ///
    /// `center` and `radius` are in normalized field coordinates (`0.0..=1.0`
    /// on both axes); `aspect` stretches the x distance so the brush stays
    /// round on non-square viewports. The added height falls off linearly
    /// from `force` at the center to zero at `radius`.
    pub fn disturb(&mut self, center: Vec2, radius: f32, force: f32, aspect: f32) {
        if self.width == 0 || self.height == 0 || radius <= 0.0 {
            return;
        }

        let (w, h) = (self.width as f32, self.height as f32);
        let reach_x = (radius / aspect.max(f32::EPSILON) * w).ceil() as isize + 1;
        let reach_y = (radius * h).ceil() as isize + 1;
        let cx = (center.x * w) as isize;
        let cy = (center.y * h) as isize;

        let xs = (cx - reach_x).max(0)..(cx + reach_x).min(self.width as isize);
        let ys = (cy - reach_y).max(0)..(cy + reach_y).min(self.height as isize);
        for y in ys {
            for x in xs.clone() {
                let uv = Vec2::new((x as f32 + 0.5) / w, (y as f32 + 0.5) / h);
                let diff = (uv - center) * Vec2::new(aspect, 1.0);
                let dist = diff.length();
                if dist < radius {
                    self.current[y as usize * self.width + x as usize] +=
                        force * (1.0 - dist / radius);
                }
            }
        }
    }

    /// Advances the field by one step.
    pub fn step(&mut self) {
        self.step_inner(|_, _| 0.0);
    }

    /// Advances the field by one step, adding a slowly moving interference
    /// pattern of the given amplitude so the surface never settles.
    pub fn step_with_ambient(&mut self, amplitude: f32, time: f32) {
        if amplitude == 0.0 {
            return self.step();
        }
        let (w, h) = (self.width as f32, self.height as f32);
        self.step_inner(|x, y| {
            let u = (x as f32 + 0.5) / w;
            let v = (y as f32 + 0.5) / h;
            (u * 10.0 + time * 2.0).sin() * (v * 10.0 + time * 1.5).cos() * amplitude
        });
    }

    fn step_inner(&mut self, mut ambient: impl FnMut(usize, usize) -> f32) {
        let (w, h) = (self.width, self.height);
        if w == 0 || h == 0 {
            return;
        }

        let current = &self.current;
        let previous = &mut self.previous;
        for y in 0..h {
            let up = y.saturating_sub(1) * w;
            let down = (y + 1).min(h - 1) * w;
            let row = y * w;
            for x in 0..w {
                let left = x.saturating_sub(1);
                let right = (x + 1).min(w - 1);
                let average = (current[row + left]
                    + current[row + right]
                    + current[up + x]
                    + current[down + x])
                    * 0.25;

                let i = row + x;
                previous[i] = (average * 2.0 - previous[i]) * self.damping + ambient(x, y);
            }
        }

        std::mem::swap(&mut self.current, &mut self.previous);
    }

    /// Returns the sum of squared heights.
    pub fn energy(&self) -> f64 {
        self.current.iter().map(|h| (*h as f64) * (*h as f64)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disturbed(size: usize, damping: f32) -> HeightField {
        let mut field = HeightField::new(size, size, damping);
        field.disturb(Vec2::splat(0.5), 0.1, 0.1, 1.0);
        field
    }

    #[test]
    fn test_disturb_falls_off_linearly() {
        let field = disturbed(64, 0.96);
        let center = field.get(32, 32).unwrap();
        let near = field.get(35, 32).unwrap();
        assert!(center > near && near > 0.0);
        assert!(center <= 0.1);
        assert_eq!(field.get(0, 0), Some(0.0));
        assert_eq!(field.get(32, 40), Some(0.0));
        assert_eq!(field.get(64, 0), None);
    }

    #[test]
    fn test_step_matches_formula() {
        let mut field = HeightField::new(3, 3, 0.5);
        field.current[4] = 1.0;
        field.step();
        // center: neighbours are flat, previous is flat
        assert_eq!(field.get(1, 1), Some(0.0));
        // edge cell (1, 0): neighbours (0,0), (2,0), (1,0) clamped, (1,1)
        assert_eq!(field.get(1, 0), Some((0.25 * 2.0) * 0.5));
        // the old state moved to `previous`
        assert_eq!(field.previous[4], 1.0);
    }

    #[test]
    fn test_energy_stays_bounded_and_decays() {
        let mut field = disturbed(48, 0.96);
        let initial = field.energy();
        assert!(initial > 0.0);

        let energies: Vec<f64> = (0..320)
            .map(|_| {
                field.step();
                field.energy()
            })
            .collect();

        assert!(energies.iter().all(|e| e.is_finite() && *e <= initial * 26.0));

        let window_peaks: Vec<f64> = energies
            .chunks(32)
            .map(|w| w.iter().cloned().fold(0.0, f64::max))
            .collect();
        for pair in window_peaks.windows(3) {
            assert!(pair[2] < pair[0], "{window_peaks:?}");
        }
        assert!(*energies.last().unwrap() < initial * 1e-3);
    }

    #[test]
    fn test_undamped_flat_field_stays_flat() {
        let mut field = HeightField::new(16, 8, 1.0);
        for _ in 0..10 {
            field.step();
        }
        assert_eq!(field.energy(), 0.0);
    }

    #[test]
    fn test_resize_resets_in_both_directions() {
        let mut field = disturbed(32, 0.96);
        field.resize(64, 16);
        assert_eq!((field.width(), field.height()), (64, 16));
        assert_eq!(field.heights().len(), 64 * 16);
        assert_eq!(field.energy(), 0.0);

        field.disturb(Vec2::splat(0.5), 0.2, 0.1, 4.0);
        field.resize(8, 8);
        assert_eq!(field.heights().len(), 64);
        assert_eq!(field.energy(), 0.0);
        field.step();

        field.resize(0, 0);
        field.step();
        field.disturb(Vec2::splat(0.5), 0.2, 0.1, 1.0);
        assert_eq!(field.energy(), 0.0);
    }

    #[test]
    fn test_center_impulse_on_512_grid_fades() {
        let mut field = HeightField::new(512, 512, 0.96);
        field.disturb(Vec2::splat(0.5), 0.1, 0.1, 1.0);

        let mut peak = (field.energy(), 0);
        let mut last = 0.0;
        for tick in 1..=200 {
            field.step();
            last = field.energy();
            if last > peak.0 {
                peak = (last, tick);
            }
        }

        assert!(peak.1 <= 10, "peak reached at tick {}", peak.1);
        assert!(last < peak.0 * 0.01);
    }
}
