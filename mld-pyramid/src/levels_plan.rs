/// Configuration for one pyramid build: `S` slice size, `F` downsample
/// factor between adjacent levels, `M` minimum record count below which no
/// further level is built.
#[derive(Debug, Clone, Copy)]
pub struct PyramidConfig {
    pub number_per_slice: usize,
    pub downsample_level_factor: usize,
    pub minimum_number_level: u64,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            number_per_slice: 100_000,
            downsample_level_factor: 100,
            minimum_number_level: 600,
        }
    }
}

impl PyramidConfig {
    pub fn new(number_per_slice: usize, downsample_level_factor: usize, minimum_number_level: u64) -> Self {
        assert!(downsample_level_factor > 1, "downsample factor must exceed 1");
        Self {
            number_per_slice,
            downsample_level_factor,
            minimum_number_level,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LevelPlan {
    pub name: String,
    pub number: u64,
    pub number_slices: u64,
    pub frequency: f64,
}

/// Plans the level ladder for one file: level 0 always exists, further
/// levels are emitted while their predecessor still holds at least `M`
/// records once divided by `F`.
pub fn levels_plan(raw_number: u64, start: i64, end: i64, cfg: &PyramidConfig) -> Vec<LevelPlan> {
    let mut plans = Vec::new();
    let mut count = raw_number;
    let mut index = 0u64;
    loop {
        let number_slices = if count == 0 {
            0
        } else {
            (count + cfg.number_per_slice as u64 - 1) / cfg.number_per_slice as u64
        };
        let frequency = if end == start { 0.0 } else { count as f64 / (end - start) as f64 };
        plans.push(LevelPlan {
            name: format!("level{index}"),
            number: count,
            number_slices,
            frequency,
        });
        let next = count / cfg.downsample_level_factor as u64;
        if next < cfg.minimum_number_level {
            break;
        }
        count = next;
        index += 1;
    }
    plans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_level_zero_even_below_minimum() {
        let cfg = PyramidConfig::new(100_000, 100, 600);
        let plans = levels_plan(500, 0, 1000, &cfg);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].name, "level0");
        assert_eq!(plans[0].number, 500);
    }

    #[test]
    fn stops_once_minimum_reached() {
        let cfg = PyramidConfig::new(100_000, 100, 600);
        let plans = levels_plan(7_200_000, 0, 7_200_000_000, &cfg);
        let numbers: Vec<u64> = plans.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![7_200_000, 72_000, 720]);
    }

    #[test]
    fn degenerate_time_range_has_zero_frequency() {
        let cfg = PyramidConfig::default();
        let plans = levels_plan(100, 5, 5, &cfg);
        assert_eq!(plans[0].frequency, 0.0);
    }
}
