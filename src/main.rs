//! Echo Path entry point
//!
//! The browser build is driven through `echo_path::platform::web::WebGame`.
//! Natively this runs a headless session: it generates a campaign, logs a
//! summary of it and plays a short scripted run against an in-memory store.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    log::info!("Echo Path (native) starting with seed {}", seed);

    native::summarize_campaign(seed);
    native::demo_run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use echo_path::consts::SIM_DT;
    use echo_path::persistence::{MemoryStore, ProfileRecord};
    use echo_path::sim::{Campaign, GameState, InputEvent};
    use echo_path::{Session, Tuning};

    /// Log per-band stage statistics
    pub fn summarize_campaign(seed: u64) {
        let tuning = Tuning::default();
        let campaign = Campaign::generate(seed, &tuning.generator);

        for band in campaign.levels().chunks(25) {
            let (Some(first), Some(last)) = (band.first(), band.last()) else {
                continue;
            };
            let walls: usize = band.iter().map(|l| l.interior_walls().len()).sum();
            let movers: usize = band.iter().map(|l| l.moving_walls.len()).sum();
            let coins: usize = band.iter().map(|l| l.coins.len()).sum();
            let fallbacks = band.iter().filter(|l| l.key_fallback).count();
            let busiest = band.iter().map(|l| l.entity_count()).max().unwrap_or(0);
            log::info!(
                "Stages {:>3}-{:>3}: {:>4} walls, {:>3} movers, {:>3} coins, {} key fallbacks, at most {} entities per tick",
                first.id + 1,
                last.id + 1,
                walls,
                movers,
                coins,
                fallbacks,
                busiest
            );
        }
    }

    /// Ping around the first stage, then walk straight at the key
    pub fn demo_run(seed: u64) {
        let state = GameState::new(seed, Tuning::default());
        let mut session = Session::new(state, MemoryStore::new(), "local");

        session.boot();
        if let Err(e) = session.save_profile(ProfileRecord::new("Local Player")) {
            log::error!("Profile setup failed: {}", e);
            return;
        }
        session.start_run();

        let level = session.state().level().clone();
        for target in [level.key, level.end, level.start] {
            session.push_input(InputEvent::PointerDown(target));
            session.push_input(InputEvent::PointerUp);
            for _ in 0..45 {
                session.update(SIM_DT);
            }
            let snap = session.snapshot();
            log::info!(
                "Ping at ({:.0}, {:.0}): {} visible, {} echoes left",
                target.x,
                target.y,
                snap.entities.len(),
                snap.echoes
            );
        }

        // Drag along a straight line from start to key
        session.push_input(InputEvent::PointerDown(level.start));
        let steps = 120;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            session.push_input(InputEvent::PointerMove(level.start.lerp(level.key, t)));
            session.update(SIM_DT);
            if session.state().player.has_key || !session.state().phase.is_running() {
                break;
            }
        }
        session.push_input(InputEvent::PointerUp);
        session.update(SIM_DT);

        for event in session.drain_events() {
            log::debug!("{:?}", event);
        }

        let player = &session.state().player;
        log::info!(
            "Demo finished in {:?}: stage {}, lives {}, key {}, score {}",
            session.phase(),
            session.state().level_index + 1,
            player.lives,
            player.has_key,
            player.score
        );
    }
}
