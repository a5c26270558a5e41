//! Persistent RGB framebuffer with terminal half-block encoding.
//!
//! The canvas is never cleared between frames. Each frame starts with a
//! translucent wash toward the background color, so whatever was drawn on
//! earlier frames fades out over time and leaves trails behind moving dots.
//! Two vertical pixels share one terminal cell: the upper pixel is the cell
//! background, the lower one the foreground of a `▄` glyph.

use crate::color::{self, Rgb};
use std::io::{self, Write};

pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
    background: Rgb,
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width * height],
            background,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Resizes the pixel grid. Previous content is dropped.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, self.background);
    }

    /// Blends every pixel toward the background by `alpha / 255`.
    pub fn wash(&mut self, alpha: u8) {
        let t = alpha as f32 / 255.0;
        let bg = self.background;
        for pixel in &mut self.pixels {
            let washed = color::blend(*pixel, bg, t);
            // Rounding can stall one step short of the background forever
            *pixel = if washed == *pixel { bg } else { washed };
        }
    }

    /// Alpha-blends `rgb` onto the pixel at (`x`, `y`). Off-canvas points are ignored.
    pub fn plot(&mut self, x: f32, y: f32, rgb: Rgb, alpha: f32) {
        if !(x >= 0.0 && y >= 0.0) {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        self.pixels[idx] = color::blend(self.pixels[idx], rgb, alpha);
    }

    /// Encodes the frame as ANSI true-color half blocks, cursor homed first.
    pub fn write_ansi(&self, out: &mut Vec<u8>) -> io::Result<()> {
        out.extend_from_slice(b"\x1b[H");

        let mut prev_top: Option<Rgb> = None;
        let mut prev_bot: Option<Rgb> = None;

        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let top = self.pixels[y * self.width + x];
                let bot = if y + 1 < self.height {
                    self.pixels[(y + 1) * self.width + x]
                } else {
                    self.background
                };

                // Only emit color codes if changed
                if prev_top != Some(top) {
                    write!(out, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = Some(top);
                }
                if prev_bot != Some(bot) {
                    write!(out, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = Some(bot);
                }
                out.extend_from_slice("▄".as_bytes());
            }
            out.extend_from_slice(b"\x1b[0m");
            prev_top = None;
            prev_bot = None;
            if y + 2 < self.height {
                out.extend_from_slice(b"\r\n");
            }
        }
        Ok(())
    }
}
