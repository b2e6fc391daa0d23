use anyhow::{Result, anyhow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::fpl_fetch::HistoryEntry;
use crate::pipeline::HistorySource;

const FIRST_NAMES: [&str; 6] = ["Alex", "Sam", "Jordan", "Riley", "Casey", "Morgan"];
const LAST_NAMES: [&str; 6] = ["Hale", "Moss", "Quinn", "Vale", "Noor", "Park"];

/// Offline source with reproducible synthetic seasons, seeded by team id.
///
/// Team id 0 behaves like an unknown entry, and ids divisible by 97 have no
/// manager name so the fallback label shows up.
#[derive(Debug, Clone, Copy)]
pub struct DemoSource {
    pub current_week: u32,
}

impl Default for DemoSource {
    fn default() -> Self {
        Self { current_week: 20 }
    }
}

impl DemoSource {
    pub fn new(current_week: u32) -> Self {
        Self {
            current_week: current_week.max(1),
        }
    }

    fn rng(team_id: u32) -> StdRng {
        StdRng::seed_from_u64(0x0f91_u64 ^ u64::from(team_id).wrapping_mul(0x9e37_79b9))
    }
}

impl HistorySource for DemoSource {
    fn history(&self, team_id: u32) -> Result<Vec<HistoryEntry>> {
        if team_id == 0 {
            return Ok(Vec::new());
        }
        let mut rng = Self::rng(team_id);
        let start = rng.gen_range(1..=3).min(self.current_week);
        let skill = rng.gen_range(45.0..62.0_f64);

        let mut total = 0i64;
        let mut out = Vec::new();
        for event in start..=self.current_week {
            let swing = rng.gen_range(-22.0..28.0_f64);
            let hit = if rng.gen_bool(0.15) { 4 } else { 0 };
            let points = ((skill + swing).round() as i64).max(8) - hit;
            total += points;
            let mut entry = HistoryEntry::new(event, points, total);
            entry.event_transfers_cost = hit;
            entry.points_on_bench = rng.gen_range(0..15);
            out.push(entry);
        }
        Ok(out)
    }

    fn manager_name(&self, team_id: u32) -> Result<Option<String>> {
        if team_id == 0 {
            return Err(anyhow!("entry {team_id} not found"));
        }
        if team_id % 97 == 0 {
            return Ok(None);
        }
        let mut rng = Self::rng(team_id.rotate_left(7));
        let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
        let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
        Ok(Some(format!("{first} {last}")))
    }
}
