//! Decision statistics over a run

use crate::decision::Action;

/// Per-action tick and bout tracker, plus chase planning effort
///
/// A bout is a run of consecutive ticks spent in one action.
#[derive(Debug, Clone, Default)]
pub struct TickStats {
    total_ticks: u64,
    /// Ticks spent in each action, indexed by [`Action::index`]
    actions: [u64; 4],
    /// Bouts started in each action
    bouts: [u64; 4],
    /// Longest bout seen for each action
    longest: [u64; 4],
    /// Action of the running bout and its length so far
    current: Option<(Action, u64)>,
    plans: u64,
    explored: u64,
}

impl TickStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the action chosen for one tick
    pub fn record_tick(&mut self, action: Action) {
        self.total_ticks += 1;
        self.actions[action.index()] += 1;

        let run = match self.current {
            Some((running, length)) if running == action => length + 1,
            _ => {
                self.bouts[action.index()] += 1;
                1
            }
        };
        self.current = Some((action, run));
        let longest = &mut self.longest[action.index()];
        *longest = (*longest).max(run);
    }

    /// Record one chase plan and the nodes its search explored
    pub fn record_plan(&mut self, explored: usize) {
        self.plans += 1;
        self.explored += explored as u64;
    }

    /// Total ticks recorded
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Ticks spent in `action`
    pub fn ticks_in(&self, action: Action) -> u64 {
        self.actions[action.index()]
    }

    /// Bouts of `action` started so far
    pub fn bouts(&self, action: Action) -> u64 {
        self.bouts[action.index()]
    }

    /// Longest bout of `action`, in ticks
    pub fn longest_bout(&self, action: Action) -> u64 {
        self.longest[action.index()]
    }

    /// Mean bout length of `action`, or 0 if it never ran
    pub fn mean_bout(&self, action: Action) -> f32 {
        match self.bouts(action) {
            0 => 0.0,
            bouts => self.ticks_in(action) as f32 / bouts as f32,
        }
    }

    /// Chase routes planned
    pub fn plans(&self) -> u64 {
        self.plans
    }

    /// Mean nodes explored per chase plan
    pub fn mean_explored(&self) -> f32 {
        if self.plans == 0 {
            0.0
        } else {
            self.explored as f32 / self.plans as f32
        }
    }

    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        let histogram = Action::ALL
            .iter()
            .map(|&action| {
                format!(
                    "{action}: {} ({} bouts, longest {})",
                    self.ticks_in(action),
                    self.bouts(action),
                    self.longest_bout(action)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Ticks: {} | Plans: {} (explored {:.1} avg) | {histogram}",
            self.total_ticks,
            self.plans,
            self.mean_explored()
        )
    }
}
