/// Indexed-color pixel buffer: one palette index per pixel, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Unpainted raster (every pixel at index 0).
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Color index at `(x, y)`, if inside the raster.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        (x < self.width && y < self.height).then(|| self.pixels[self.offset(x, y)])
    }

    /// Overwrite the pixel at `(x, y)`; the caller guarantees the coordinate is in bounds.
    pub fn paint(&mut self, x: u32, y: u32, color: u8) {
        debug_assert!(x < self.width && y < self.height);
        let i = self.offset(x, y);
        self.pixels[i] = color;
    }

    /// Resize to at least the current dimensions, keeping existing content at the same
    /// offsets and leaving newly exposed pixels at index 0.
    pub fn grow_to(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(self.width), height.max(self.height));
        if (width, height) == (self.width, self.height) {
            return;
        }
        let mut next = vec![0u8; width as usize * height as usize];
        let row = self.width as usize;
        for (dst, src) in next
            .chunks_exact_mut(width as usize)
            .zip(self.pixels.chunks_exact(row))
        {
            dst[..row].copy_from_slice(src);
        }
        self.pixels = next;
        self.width = width;
        self.height = height;
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
