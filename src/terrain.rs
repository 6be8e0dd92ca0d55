//! Procedural terrain generation: layered value noise ranked into biome
//! quotas. `generate` is a pure function of its arguments; the same seed
//! always yields bit-identical elevation, moisture, and biome arrays.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::faction::seed_points_for;
use crate::world::{Biome, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiomeMode {
    Normal,
    Plain,
    Sea,
    Mountain,
    Forest,
}

/// Target biome shares for a generation mode; clamped and renormalized
/// before use.
#[derive(Debug, Clone, Copy)]
pub struct BiomePercents {
    pub grass: f64,
    pub forest: f64,
    pub water: f64,
    pub mountain: f64,
}

pub fn biome_percents(mode: BiomeMode) -> BiomePercents {
    match mode {
        BiomeMode::Plain => BiomePercents {
            grass: 0.8,
            forest: 0.1,
            water: 0.08,
            mountain: 0.02,
        },
        BiomeMode::Sea => BiomePercents {
            grass: 0.18,
            forest: 0.1,
            water: 0.7,
            mountain: 0.02,
        },
        BiomeMode::Forest => BiomePercents {
            grass: 0.16,
            forest: 0.75,
            water: 0.07,
            mountain: 0.02,
        },
        BiomeMode::Mountain => BiomePercents {
            grass: 0.25,
            forest: 0.14,
            water: 0.11,
            mountain: 0.5,
        },
        BiomeMode::Normal => BiomePercents {
            grass: 0.45,
            forest: 0.25,
            water: 0.2,
            mountain: 0.05,
        },
    }
}

pub fn normalize_percents(p: BiomePercents) -> BiomePercents {
    let g = p.grass.clamp(0.0, 1.0);
    let f = p.forest.clamp(0.0, 1.0);
    let w = p.water.clamp(0.0, 1.0);
    let m = p.mountain.clamp(0.0, 1.0);
    let s = g + f + w + m;
    if s <= 0.0 {
        return BiomePercents {
            grass: 1.0,
            forest: 0.0,
            water: 0.0,
            mountain: 0.0,
        };
    }
    BiomePercents {
        grass: g / s,
        forest: f / s,
        water: w / s,
        mountain: m / s,
    }
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

fn bilerp(a00: f64, a10: f64, a01: f64, a11: f64, tx: f64, ty: f64) -> f64 {
    let a0 = a00 * (1.0 - tx) + a10 * tx;
    let a1 = a01 * (1.0 - tx) + a11 * tx;
    a0 * (1.0 - ty) + a1 * ty
}

/// Deterministic 2D value noise keyed by a 64-bit seed. Lattice values come
/// from an integer hash, so there is no RNG state to thread.
#[derive(Debug, Clone, Copy)]
pub struct NoiseField {
    seed: u64,
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Pseudo-random value in [0, 1) at an integer lattice point.
    fn lattice(&self, x: i64, y: i64) -> f64 {
        let mut h = self.seed
            ^ (x as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ (y as u64).wrapping_mul(0xc2b2_ae3d_27d4_eb4f);
        h ^= h >> 33;
        h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
        h ^= h >> 33;
        h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
        h ^= h >> 33;
        (h >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Bilinear value noise with a smoothstep kernel between the four
    /// surrounding lattice values.
    pub fn value_noise(&self, x: f64, y: f64) -> f64 {
        let xi = x.floor();
        let yi = y.floor();
        let sx = smoothstep(x - xi);
        let sy = smoothstep(y - yi);
        let xi = xi as i64;
        let yi = yi as i64;
        let x1 = self.lattice(xi, yi) * (1.0 - sx) + self.lattice(xi + 1, yi) * sx;
        let x2 = self.lattice(xi, yi + 1) * (1.0 - sx) + self.lattice(xi + 1, yi + 1) * sx;
        x1 * (1.0 - sy) + x2 * sy
    }

    /// Fractal Brownian motion: octaves at x1.9 frequency and x0.5
    /// amplitude, normalized by total amplitude.
    pub fn fbm(&self, mut x: f64, mut y: f64, octaves: u32) -> f64 {
        let mut sum = 0.0;
        let mut amp = 1.0;
        let mut total = 0.0;
        for _ in 0..octaves {
            sum += self.value_noise(x, y) * amp;
            total += amp;
            x *= 1.9;
            y *= 1.9;
            amp *= 0.5;
        }
        sum / total
    }
}

struct Fields {
    elevation: Vec<f64>,
    moisture: Vec<f64>,
}

/// One offset elevation/moisture field pair over the whole grid.
fn fields(noise: &NoiseField, w: u32, h: u32, ox: f64, oy: f64) -> Fields {
    let n = (w * h) as usize;
    let mut elevation = vec![0.0; n];
    let mut moisture = vec![0.0; n];
    for y in 0..h {
        for x in 0..w {
            let nx = (x as f64 + ox) * 0.065;
            let ny = (y as f64 + oy) * 0.065;
            let base = noise.fbm(nx, ny, 4);
            let ridged = (noise.fbm(nx * 2.0 + 5.0, ny * 0.7 - 3.0, 3) - 0.5).abs();
            let k = (y * w + x) as usize;
            elevation[k] = (base * 0.8 + ridged * 0.6).clamp(0.0, 1.0);
            moisture[k] = noise.fbm(nx + 12.3, ny - 7.7, 4);
        }
    }
    Fields {
        elevation,
        moisture,
    }
}

/// Mark a disk of guaranteed land around a capital, blended into a fuzzy
/// ring by noise, so no capital ends up on a one-tile islet.
fn carve_capital_mask(noise: &NoiseField, world: &World, cx: u32, cy: u32, mask: &mut [bool]) {
    let w = world.width() as i64;
    let h = world.height() as i64;
    let longest = w.max(h);
    let r0 = 1.35;
    let r1 = if longest >= 48 {
        2.2
    } else if longest >= 32 {
        2.0
    } else {
        1.8
    };
    let (cx, cy) = (cx as i64, cy as i64);
    let x0 = (cx - r1 as i64 - 2).max(1);
    let x1 = (cx + r1 as i64 + 2).min(w - 2);
    let y0 = (cy - r1 as i64 - 2).max(1);
    let y1 = (cy + r1 as i64 + 2).min(h - 2);
    for gy in y0..=y1 {
        for gx in x0..=x1 {
            let dx = (gx - cx) as f64;
            let dy = (gy - cy) as f64;
            let r = (dx * dx + dy * dy).sqrt();
            let k = world.idx(gx as u32, gy as u32);
            if r <= r0 {
                mask[k] = true;
            } else if r < r1 {
                let n = noise.fbm(
                    (gx as f64 * 1.7 + 13.1) * 0.9,
                    (gy as f64 * 1.7 - 9.2) * 0.9,
                    3,
                );
                let edge = ((r1 - r) / (r1 - r0)).clamp(0.0, 1.0);
                if n > 0.58 - 0.32 * edge {
                    mask[k] = true;
                }
            }
        }
    }
    // The capital footprint itself is always land.
    for oy in 0..=1 {
        for ox in 0..=1 {
            let gx = cx + ox;
            let gy = cy + oy;
            if gx > 0 && gy > 0 && gx < w && gy < h {
                mask[world.idx(gx as u32, gy as u32)] = true;
            }
        }
    }
}

/// Assign the top `count` unassigned tiles by score to a biome. Ties break
/// by tile index, keeping the assignment fully deterministic.
fn take_top(
    world: &mut World,
    taken: &mut [bool],
    count: usize,
    score: impl Fn(&World, usize) -> f64,
    biome: Biome,
    forbid: Option<&[bool]>,
) -> usize {
    if count == 0 {
        return 0;
    }
    let mut candidates: Vec<(usize, f64)> = (0..world.tile_count())
        .filter(|&k| !taken[k] && forbid.map_or(true, |f| !f[k]))
        .map(|k| (k, score(world, k)))
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    let limit = count.min(candidates.len());
    for &(k, _) in &candidates[..limit] {
        world.biome[k] = biome;
        taken[k] = true;
    }
    limit
}

/// Generate a world: elevation and moisture from four quadrant-offset noise
/// fields blended with per-axis smoothstep weights, then biomes assigned by
/// ranked quotas (water, then mountain, then forest; the rest grass). The
/// capital sites are derived from the seed and stored on the world for the
/// faction seeder.
pub fn generate(width: u32, height: u32, mode: BiomeMode, seed: u64) -> World {
    let mut world = World::new(width, height);
    let noise = NoiseField::new(seed);

    let mut site_rng = ChaCha8Rng::seed_from_u64(seed);
    world.capital_sites = seed_points_for(width, height, &mut site_rng);

    // Quadrant fields with seed-derived offsets; blending across the grid
    // avoids a visible seam at a single noise origin.
    let offset = |mul: u64, modulo: u64, add: f64| ((seed.wrapping_mul(mul)) % modulo) as f64 + add;
    let q_tl = fields(&noise, width, height, offset(1, 211, 7.0), offset(13, 223, 11.0));
    let q_tr = fields(&noise, width, height, offset(7, 239, 37.0), offset(17, 227, 23.0));
    let q_bl = fields(&noise, width, height, offset(5, 251, 41.0), offset(19, 241, 31.0));
    let q_br = fields(&noise, width, height, offset(11, 257, 61.0), offset(23, 263, 29.0));

    for y in 0..height {
        let ty = smoothstep(y as f64 / (height - 1).max(1) as f64);
        for x in 0..width {
            let tx = smoothstep(x as f64 / (width - 1).max(1) as f64);
            let k = world.idx(x, y);
            world.elevation[k] = bilerp(
                q_tl.elevation[k],
                q_tr.elevation[k],
                q_bl.elevation[k],
                q_br.elevation[k],
                tx,
                ty,
            );
            world.moisture[k] = bilerp(
                q_tl.moisture[k],
                q_tr.moisture[k],
                q_bl.moisture[k],
                q_br.moisture[k],
                tx,
                ty,
            );
        }
    }

    let mut water_forbid = vec![false; world.tile_count()];
    let sites = world.capital_sites.clone();
    for site in &sites {
        carve_capital_mask(&noise, &world, site.x, site.y, &mut water_forbid);
    }

    let p = normalize_percents(biome_percents(mode));
    let n = world.tile_count() as f64;
    let n_water = (p.water * n).round() as usize;
    let n_mountain = (p.mountain * n).round() as usize;
    let n_forest = (p.forest * n).round() as usize;

    let mut taken = vec![false; world.tile_count()];
    take_top(
        &mut world,
        &mut taken,
        n_water,
        |w, k| (1.0 - w.elevation[k]) * 0.65 + w.moisture[k].max(0.0) * 0.35,
        Biome::Lake,
        Some(&water_forbid),
    );
    take_top(
        &mut world,
        &mut taken,
        n_mountain,
        |w, k| w.elevation[k],
        Biome::Mountain,
        None,
    );
    take_top(
        &mut world,
        &mut taken,
        n_forest,
        |w, k| w.moisture[k],
        Biome::Forest,
        None,
    );
    // Everything unassigned stays grass (the World default).

    world
}
