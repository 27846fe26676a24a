//! Reference terrain implementations.
//!
//! [`CorridorTerrain`] scrolls rows of one or two walkable corridors; during
//! a boss encounter it switches to full-width rows so the arena is solid
//! ground.  [`OpenGround`] is safe everywhere and is what headless runs use.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::Rng;

use crate::collab::Terrain;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corridor {
    pub x: f32,
    pub w: f32,
}

#[derive(Clone, Debug)]
pub struct Row {
    /// Row center.
    pub y: f32,
    pub h: f32,
    pub corridors: Vec<Corridor>,
}

impl Row {
    fn is_full(&self, w: f32) -> bool {
        self.corridors.iter().any(|c| c.x <= 0.0 && c.x + c.w >= w)
    }
}

#[derive(Clone, Debug)]
pub struct CorridorTerrain {
    w: f32,
    h: f32,
    row_h: f32,
    gap_min: f32,
    gap_max: f32,
    path_w_min: f32,
    path_w_max: f32,
    start_safe_rows: usize,
    full_mode: bool,
    generating: bool,
    /// Bottom row first; the back is the top-most row.
    rows: VecDeque<Row>,
}

impl CorridorTerrain {
    pub fn new(w: f32, h: f32, row_h: f32) -> Self {
        Self {
            w,
            h,
            row_h: row_h.max(1.0),
            gap_min: 50.0,
            gap_max: 200.0,
            path_w_min: 300.0,
            path_w_max: 800.0,
            start_safe_rows: 3,
            full_mode: false,
            generating: true,
            rows: VecDeque::new(),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    fn top_y(&self) -> f32 {
        self.rows.back().map_or(self.h, |r| r.y)
    }

    fn push_row(&mut self, y: f32, full: bool, rng: &mut StdRng) {
        let corridors = if full {
            vec![Corridor { x: 0.0, w: self.w }]
        } else {
            let gap = rng.gen_range(self.gap_min..=self.gap_max).round();
            let w1 = rng.gen_range(self.path_w_min..=self.path_w_max).round();
            let w2 = rng.gen_range(self.path_w_min..=self.path_w_max).round();
            let slack = (self.w - (w1 + gap + w2)).max(0.0);
            let start = (rng.gen::<f32>() * slack).round();
            vec![
                Corridor { x: start, w: w1 },
                Corridor { x: start + w1 + gap, w: w2 },
            ]
        };
        self.rows.push_back(Row { y, h: self.row_h, corridors });
    }

    fn fill_top(&mut self, rng: &mut StdRng) {
        let mut guard = 0;
        while self.top_y() > -self.row_h / 2.0 && guard < 200 {
            let y = self.top_y() - self.row_h;
            let full = self.full_mode;
            self.push_row(y, full, rng);
            guard += 1;
        }
    }
}

impl Terrain for CorridorTerrain {
    fn is_safe(&self, x: f32, y: f32) -> bool {
        self.rows
            .iter()
            .find(|r| y >= r.y - r.h / 2.0 && y <= r.y + r.h / 2.0)
            .map_or(false, |r| r.corridors.iter().any(|c| x >= c.x && x <= c.x + c.w))
    }

    fn set_full_mode(&mut self, on: bool) {
        if self.full_mode != on {
            log::debug!("terrain full mode {}", if on { "on" } else { "off" });
        }
        self.full_mode = on;
        if on {
            // Rows not yet on screen are rebuilt; visible ones scroll out.
            let w = self.w;
            for r in self.rows.iter_mut().filter(|r| r.y + r.h / 2.0 < 0.0) {
                r.corridors = vec![Corridor { x: 0.0, w }];
            }
        }
    }

    fn set_generation_enabled(&mut self, on: bool) {
        self.generating = on;
    }

    fn is_cleared(&self) -> bool {
        self.full_mode
            && self
                .rows
                .iter()
                .filter(|r| r.y + r.h / 2.0 >= 0.0 && r.y - r.h / 2.0 <= self.h)
                .all(|r| r.is_full(self.w))
    }

    fn advance(&mut self, dy: f32, rng: &mut StdRng) {
        for r in self.rows.iter_mut() {
            r.y += dy;
        }
        while self
            .rows
            .front()
            .map_or(false, |r| r.y - r.h / 2.0 > self.h + 4.0)
        {
            self.rows.pop_front();
        }
        if self.generating {
            self.fill_top(rng);
        }
    }

    fn reset(&mut self, rng: &mut StdRng) {
        self.rows.clear();
        self.full_mode = false;
        self.generating = true;
        let mut y = self.h + self.row_h / 2.0;
        for i in 0..20 {
            self.push_row(y, i < self.start_safe_rows, rng);
            y -= self.row_h;
        }
    }
}

/// Terrain that is walkable everywhere and always counts as cleared.
#[derive(Clone, Debug, Default)]
pub struct OpenGround {
    full_mode: bool,
}

impl OpenGround {
    pub fn full_mode(&self) -> bool {
        self.full_mode
    }
}

impl Terrain for OpenGround {
    fn is_safe(&self, _x: f32, _y: f32) -> bool {
        true
    }

    fn set_full_mode(&mut self, on: bool) {
        self.full_mode = on;
    }

    fn set_generation_enabled(&mut self, _on: bool) {}

    fn is_cleared(&self) -> bool {
        true
    }

    fn advance(&mut self, _dy: f32, _rng: &mut StdRng) {}

    fn reset(&mut self, _rng: &mut StdRng) {
        self.full_mode = false;
    }
}

