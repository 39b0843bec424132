//! Remembers returning visitors.
//!
//! [`VisitMemory`] keeps a small JSON record in a [`KeyValueStore`]: how
//! many separate visits there were, how long the page has been open in
//! total and which images were opened. Nothing runs until
//! [`init`](VisitMemory::init) is called.

use std::{cell::RefCell, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::{
    effects::{EffectConfig, Palette},
    error::Error,
    host::Host,
    storage::KeyValueStore,
    theme::Theme,
};

/// Storage key of the visit record.
pub const MEMORY_KEY: &str = "TEMPORAL_STATE_V110";

/// Gap after which a page load counts as a new visit.
pub const NEW_VISIT_AFTER_MS: f64 = 10.0 * 60.0 * 1000.0;

/// Period of the heartbeat that accumulates open time.
pub const HEARTBEAT_MS: u32 = 5000;

/// The persisted visit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitState {
    /// Number of visits separated by more than ten minutes.
    pub visit_count: u32,
    /// Time of the last page load, in milliseconds since the epoch.
    pub last_visit: f64,
    /// Seconds the page has been open, across visits.
    pub total_time: u64,
    /// Sources of every image opened so far.
    pub visited_images: Vec<String>,
    /// Ten points per distinct opened image.
    pub interaction_score: u32,
}

impl VisitState {
    /// A fresh record for a first visit at `now`.
    pub fn new(now: f64) -> Self {
        Self {
            visit_count: 0,
            last_visit: now,
            total_time: 0,
            visited_images: Vec::new(),
            interaction_score: 0,
        }
    }
}

/// Tracks visits with a store and a host timer.
pub struct VisitMemory<S, H: Host> {
    store: S,
    host: H,
    state: Rc<RefCell<VisitState>>,
    heartbeat: Option<H::Timer>,
}

impl<S, H: Host> std::fmt::Debug for VisitMemory<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisitMemory")
            .field("state", &self.state.borrow())
            .field("running", &self.heartbeat.is_some())
            .finish()
    }
}

impl<S, H> VisitMemory<S, H>
where
    S: KeyValueStore + Clone + 'static,
    H: Host,
{
    /// Constructs an idle tracker.
    pub fn new(store: S, host: H) -> Self {
        Self {
            store,
            host,
            state: Rc::new(RefCell::new(VisitState::new(0.0))),
            heartbeat: None,
        }
    }

    /// Loads the record, counts this visit and starts the heartbeat.
    ///
    /// A missing or unreadable record starts over. Calling `init` while the
    /// heartbeat runs does nothing.
    pub fn init(&mut self, now: f64) -> Result<(), Error> {
        if self.heartbeat.is_some() {
            return Ok(());
        }

        let mut state = load(&self.store, now);
        if now - state.last_visit > NEW_VISIT_AFTER_MS {
            state.visit_count += 1;
        }
        state.last_visit = now;
        save(&self.store, &state)?;
        log::info!(
            "visit {} with chaos factor {}",
            state.visit_count,
            chaos_factor(&state)
        );
        *self.state.borrow_mut() = state;

        let store = self.store.clone();
        let weak = Rc::downgrade(&self.state);
        self.heartbeat = Some(self.host.every(
            HEARTBEAT_MS,
            Box::new(move || {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let mut state = state.borrow_mut();
                state.total_time += (HEARTBEAT_MS / 1000) as u64;
                if let Err(e) = save(&store, &state) {
                    log::warn!("failed to save visit memory: {e}");
                }
            }),
        )?);
        Ok(())
    }

    /// Stops the heartbeat. Calling `dispose` twice is safe.
    pub fn dispose(&mut self) {
        self.heartbeat = None;
    }

    /// Returns `true` while the heartbeat runs.
    pub fn is_running(&self) -> bool {
        self.heartbeat.is_some()
    }

    /// Returns a copy of the record.
    pub fn state(&self) -> VisitState {
        self.state.borrow().clone()
    }

    /// Grows with every visit, from `1.0` up to `2.0`.
    pub fn chaos_factor(&self) -> f32 {
        chaos_factor(&self.state.borrow())
    }

    /// Grows with total open time, from `0.0` to `1.0` after twenty minutes.
    pub fn time_shift(&self) -> f32 {
        time_shift(&self.state.borrow())
    }

    /// Returns a function that adjusts effects to the live record, for
    /// [`Stage::tune`](crate::Stage::tune).
    ///
    /// Returning visitors get up to twice as many galaxy stars, and the
    /// galaxy's colors turn by up to 60 degrees of hue with the time spent
    /// on the page. Other themes are left as they are.
    pub fn tuner(&self) -> impl Fn(Theme, EffectConfig) -> EffectConfig + 'static {
        let state = Rc::clone(&self.state);
        move |theme, config| tune(&state.borrow(), theme, config)
    }

    /// Records that the image at `src` was opened.
    ///
    /// Returns `true` the first time an image is seen.
    pub fn mark_image_visited(&mut self, src: &str) -> Result<bool, Error> {
        let mut state = self.state.borrow_mut();
        if state.visited_images.iter().any(|s| s == src) {
            return Ok(false);
        }
        state.visited_images.push(src.to_string());
        state.interaction_score += 10;
        save(&self.store, &state)?;
        Ok(true)
    }
}

fn chaos_factor(state: &VisitState) -> f32 {
    (1.0 + state.visit_count as f32 * 0.1).min(2.0)
}

fn time_shift(state: &VisitState) -> f32 {
    (state.total_time as f32 / 1200.0).min(1.0)
}

fn tune(state: &VisitState, theme: Theme, config: EffectConfig) -> EffectConfig {
    if theme != Theme::Galaxy {
        return config;
    }
    let degrees = time_shift(state) * 60.0;
    let palette = Palette {
        primary: config.palette.primary.rotate_hue(degrees),
        secondary: config.palette.secondary.rotate_hue(degrees),
        accent: config.palette.accent.rotate_hue(degrees),
        ..config.palette
    };
    let stars = (config.particle_count as f32 * chaos_factor(state)).round() as usize;
    config.particle_count(stars).palette(palette)
}

fn load(store: &impl KeyValueStore, now: f64) -> VisitState {
    match store.get(MEMORY_KEY) {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
            log::warn!("discarding malformed visit memory: {e}");
            VisitState::new(now)
        }),
        Ok(None) => VisitState::new(now),
        Err(e) => {
            log::warn!("failed to read visit memory: {e}");
            VisitState::new(now)
        }
    }
}

fn save(store: &impl KeyValueStore, state: &VisitState) -> Result<(), Error> {
    store.set(MEMORY_KEY, &serde_json::to_string(state)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        host::testing::TestHost,
        storage::MemoryStore,
        theme::{GALAXY, LIQUID},
    };

    const MINUTE: f64 = 60_000.0;

    fn memory(store: &MemoryStore, host: &TestHost) -> VisitMemory<MemoryStore, TestHost> {
        VisitMemory::new(store.clone(), host.clone())
    }

    fn stored(store: &MemoryStore) -> VisitState {
        serde_json::from_str(&store.get(MEMORY_KEY).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn test_first_visit_starts_fresh() {
        let store = MemoryStore::new();
        let host = TestHost::default();
        let mut memory = memory(&store, &host);
        memory.init(1000.0).unwrap();

        assert_eq!(stored(&store), VisitState::new(1000.0));
        assert_eq!(memory.chaos_factor(), 1.0);
        assert_eq!(memory.time_shift(), 0.0);
        assert!(memory.is_running());
    }

    #[test]
    fn test_visits_count_after_ten_minutes() {
        let store = MemoryStore::new();
        let host = TestHost::default();

        let mut first = memory(&store, &host);
        first.init(0.0).unwrap();
        first.dispose();

        let mut soon = memory(&store, &host);
        soon.init(5.0 * MINUTE).unwrap();
        assert_eq!(soon.state().visit_count, 0);
        soon.dispose();

        let mut later = memory(&store, &host);
        later.init(16.0 * MINUTE).unwrap();
        assert_eq!(later.state().visit_count, 1);
        assert_eq!(stored(&store).last_visit, 16.0 * MINUTE);
        assert!((later.chaos_factor() - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_malformed_state_is_replaced() {
        let store = MemoryStore::new();
        store.set(MEMORY_KEY, "{not json").unwrap();
        let host = TestHost::default();
        let mut memory = memory(&store, &host);
        memory.init(42.0).unwrap();
        assert_eq!(stored(&store), VisitState::new(42.0));
    }

    #[test]
    fn test_heartbeat_accumulates_until_disposed() {
        let store = MemoryStore::new();
        let host = TestHost::default();
        let mut memory = memory(&store, &host);
        memory.init(0.0).unwrap();
        memory.init(0.0).unwrap();
        assert_eq!(host.timer_count(), 1);

        host.advance_timers(60_000);
        assert_eq!(memory.state().total_time, 60);
        assert_eq!(stored(&store).total_time, 60);
        assert_eq!(memory.time_shift(), 0.05);

        memory.dispose();
        memory.dispose();
        assert_eq!(host.timer_count(), 0);
        host.advance_timers(60_000);
        assert_eq!(stored(&store).total_time, 60);
    }

    #[test]
    fn test_images_score_once() {
        let store = MemoryStore::new();
        let host = TestHost::default();
        let mut memory = memory(&store, &host);
        memory.init(0.0).unwrap();

        assert!(memory.mark_image_visited("/assets/cert_aws.png").unwrap());
        assert!(!memory.mark_image_visited("/assets/cert_aws.png").unwrap());
        assert!(memory.mark_image_visited("/assets/cert_udemy.png").unwrap());
        assert_eq!(stored(&store).interaction_score, 20);
        assert_eq!(stored(&store).visited_images.len(), 2);
    }

    #[test]
    fn test_chaos_factor_caps() {
        let store = MemoryStore::new();
        let mut state = VisitState::new(0.0);
        state.visit_count = 40;
        state.total_time = 10_000;
        store
            .set(MEMORY_KEY, &serde_json::to_string(&state).unwrap())
            .unwrap();
        let mut memory = memory(&store, &TestHost::default());
        memory.init(1.0).unwrap();
        assert_eq!(memory.chaos_factor(), 2.0);
        assert_eq!(memory.time_shift(), 1.0);
    }

    #[test]
    fn test_tuner_scales_galaxy_with_visits() {
        let store = MemoryStore::new();
        let mut state = VisitState::new(0.0);
        state.visit_count = 5;
        state.total_time = 600;
        store
            .set(MEMORY_KEY, &serde_json::to_string(&state).unwrap())
            .unwrap();
        let host = TestHost::default();
        let mut memory = memory(&store, &host);
        memory.init(1.0).unwrap();
        let tune = memory.tuner();

        let galaxy = tune(Theme::Galaxy, GALAXY);
        assert_eq!(galaxy.particle_count, 12_000);
        assert_eq!(galaxy.palette.background, GALAXY.palette.background);
        assert_eq!(
            galaxy.palette.primary,
            GALAXY.palette.primary.rotate_hue(30.0)
        );
        assert_ne!(galaxy.palette.secondary, GALAXY.palette.secondary);
        assert_eq!(tune(Theme::Liquid, LIQUID), LIQUID);

        host.advance_timers(600_000);
        let later = tune(Theme::Galaxy, GALAXY);
        assert_eq!(later.palette.primary, GALAXY.palette.primary.rotate_hue(60.0));
    }

    #[test]
    fn test_record_uses_camel_case_keys() {
        let json = serde_json::to_string(&VisitState::new(1.0)).unwrap();
        assert!(json.contains("\"visitCount\":0"));
        assert!(json.contains("\"visitedImages\":[]"));
    }
}
