//! Nearest-match lookup tables for spot, RAL and CSS colour recipes.
//!
//! The built-in tables are compact approximations. They are good enough to
//! label swatches; callers needing a licensed spot library can supply their
//! own [`ColorTable`].

use once_cell::sync::Lazy;
use std::collections::HashMap;

type Rgb = (u8, u8, u8);

/// Lookup capability used by [`crate::Color`] for recipes it cannot derive.
pub trait ColorTable {
    fn spot_rgb(&self, spot: u32) -> Option<Rgb>;
    fn ral_rgb(&self, code: u32) -> Option<Rgb>;
    /// `name` is already lowercased.
    fn name_rgb(&self, name: &str) -> Option<Rgb>;
    fn nearest_spot(&self, rgb: Rgb) -> u32;
    fn nearest_ral(&self, rgb: Rgb) -> u32;
    fn nearest_name(&self, rgb: Rgb) -> &str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTable;

const SPOT_COLORS: &[(u32, Rgb)] = &[
    (100, (246, 235, 97)),
    (123, (255, 199, 44)),
    (130, (242, 169, 0)),
    (139, (175, 109, 4)),
    (157, (237, 160, 79)),
    (185, (228, 0, 43)),
    (200, (186, 12, 47)),
    (237, (229, 109, 177)),
    (278, (139, 184, 232)),
    (286, (0, 51, 160)),
    (300, (0, 94, 184)),
    (320, (0, 156, 166)),
    (347, (0, 154, 68)),
    (373, (233, 236, 107)),
    (375, (151, 215, 0)),
    (421, (178, 180, 178)),
    (422, (158, 162, 162)),
    (425, (84, 88, 90)),
    (473, (244, 195, 164)),
    (476, (78, 54, 41)),
    (480, (211, 191, 183)),
    (485, (218, 41, 28)),
    (1405, (110, 76, 30)),
    (2685, (51, 0, 114)),
    (7541, (217, 225, 226)),
];

const RAL_COLORS: &[(u32, Rgb)] = &[
    (1003, (249, 168, 0)),
    (1015, (230, 210, 181)),
    (1021, (238, 201, 0)),
    (2004, (244, 70, 17)),
    (3000, (167, 41, 32)),
    (3020, (204, 6, 5)),
    (4005, (108, 70, 117)),
    (5002, (32, 33, 79)),
    (5012, (59, 131, 189)),
    (5015, (34, 113, 179)),
    (6018, (87, 166, 57)),
    (6005, (47, 69, 56)),
    (7016, (41, 49, 51)),
    (7035, (215, 215, 215)),
    (7040, (157, 161, 170)),
    (8017, (69, 50, 46)),
    (9003, (244, 244, 244)),
    (9005, (10, 10, 10)),
    (9010, (255, 255, 255)),
];

const CSS_COLORS: &[(&str, Rgb)] = &[
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("gray", (128, 128, 128)),
    ("silver", (192, 192, 192)),
    ("dimgray", (105, 105, 105)),
    ("lightgray", (211, 211, 211)),
    ("red", (255, 0, 0)),
    ("maroon", (128, 0, 0)),
    ("darkred", (139, 0, 0)),
    ("crimson", (220, 20, 60)),
    ("salmon", (250, 128, 114)),
    ("pink", (255, 192, 203)),
    ("hotpink", (255, 105, 180)),
    ("orange", (255, 165, 0)),
    ("darkorange", (255, 140, 0)),
    ("coral", (255, 127, 80)),
    ("gold", (255, 215, 0)),
    ("yellow", (255, 255, 0)),
    ("khaki", (240, 230, 140)),
    ("beige", (245, 245, 220)),
    ("tan", (210, 180, 140)),
    ("peru", (205, 133, 63)),
    ("chocolate", (210, 105, 30)),
    ("saddlebrown", (139, 69, 19)),
    ("brown", (165, 42, 42)),
    ("olive", (128, 128, 0)),
    ("lime", (0, 255, 0)),
    ("green", (0, 128, 0)),
    ("darkgreen", (0, 100, 0)),
    ("seagreen", (46, 139, 87)),
    ("yellowgreen", (154, 205, 50)),
    ("teal", (0, 128, 128)),
    ("cyan", (0, 255, 255)),
    ("turquoise", (64, 224, 208)),
    ("skyblue", (135, 206, 235)),
    ("steelblue", (70, 130, 180)),
    ("blue", (0, 0, 255)),
    ("navy", (0, 0, 128)),
    ("royalblue", (65, 105, 225)),
    ("purple", (128, 0, 128)),
    ("indigo", (75, 0, 130)),
    ("violet", (238, 130, 238)),
    ("magenta", (255, 0, 255)),
    ("lavender", (230, 230, 250)),
    ("darkslategray", (47, 79, 79)),
];

static CSS_INDEX: Lazy<HashMap<&'static str, Rgb>> =
    Lazy::new(|| CSS_COLORS.iter().copied().collect());

fn distance((r1, g1, b1): Rgb, (r2, g2, b2): Rgb) -> u32 {
    let d = |a: u8, b: u8| (a as i32 - b as i32).pow(2) as u32;
    d(r1, r2) + d(g1, g2) + d(b1, b2)
}

fn nearest<K: Copy>(entries: &[(K, Rgb)], rgb: Rgb) -> K {
    entries
        .iter()
        .min_by_key(|(_, candidate)| distance(*candidate, rgb))
        .map(|(key, _)| *key)
        .unwrap_or(entries[0].0)
}

impl ColorTable for BuiltinTable {
    fn spot_rgb(&self, spot: u32) -> Option<Rgb> {
        SPOT_COLORS.iter().find(|(n, _)| *n == spot).map(|(_, rgb)| *rgb)
    }

    fn ral_rgb(&self, code: u32) -> Option<Rgb> {
        RAL_COLORS.iter().find(|(n, _)| *n == code).map(|(_, rgb)| *rgb)
    }

    fn name_rgb(&self, name: &str) -> Option<Rgb> {
        CSS_INDEX.get(name).copied()
    }

    fn nearest_spot(&self, rgb: Rgb) -> u32 {
        nearest(SPOT_COLORS, rgb)
    }

    fn nearest_ral(&self, rgb: Rgb) -> u32 {
        nearest(RAL_COLORS, rgb)
    }

    fn nearest_name(&self, rgb: Rgb) -> &str {
        nearest(CSS_COLORS, rgb)
    }
}
