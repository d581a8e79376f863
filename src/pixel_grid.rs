/// A 2D grid of samples with clamped (non-wrapping) edges.
///
/// Row 0 is the top row of the source image.
#[derive(Clone, Debug)]
pub struct PixelGrid<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> PixelGrid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> PixelGrid<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wrap row-major data. Returns None if the length does not match.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self { width, height, data })
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Get a cell with coordinates clamped to the grid (edge extend).
    pub fn get_clamped(&self, x: i64, y: i64) -> &T {
        let cx = x.clamp(0, self.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.height as i64 - 1) as usize;
        self.get(cx, cy)
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }
}

impl PixelGrid<f32> {
    /// Bilinear sample in pixel space; (0.5, 0.5) is the centre of the top-left pixel.
    /// Samples outside the grid take the nearest edge value.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> f32 {
        let px = x - 0.5;
        let py = y - 0.5;
        let x0 = px.floor() as i64;
        let y0 = py.floor() as i64;
        let fx = px - px.floor();
        let fy = py - py.floor();

        let v00 = *self.get_clamped(x0, y0);
        let v10 = *self.get_clamped(x0 + 1, y0);
        let v01 = *self.get_clamped(x0, y0 + 1);
        let v11 = *self.get_clamped(x0 + 1, y0 + 1);

        let v0 = v00 * (1.0 - fx) + v10 * fx;
        let v1 = v01 * (1.0 - fx) + v11 * fx;
        v0 * (1.0 - fy) + v1 * fy
    }

    /// Minimum and maximum value in the grid.
    pub fn range(&self) -> (f32, f32) {
        let mut min_v = f32::MAX;
        let mut max_v = f32::MIN;
        for &v in &self.data {
            if v < min_v {
                min_v = v;
            }
            if v > max_v {
                max_v = v;
            }
        }
        (min_v, max_v)
    }
}
