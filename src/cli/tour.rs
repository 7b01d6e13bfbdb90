//! Scripted experience walkthrough
//!
//! Chooses a track, mounts the timed collaborators and prints each view as
//! the controller advances. `--back-after-ms` abandons the track midway.

use crate::server::load_config;
use anyhow::{Context, Result};
use folio_core::{Cast, ExperienceDriver, Scene, Track, Transition};
use std::time::Duration;

fn describe(scene: &Scene) -> String {
    match scene {
        Scene::Landing => "Landing: choose tech or space".to_string(),
        Scene::BootSequence => "Tech: boot sequence running".to_string(),
        Scene::TechSections { sections } => format!("Tech: {:?}", sections),
        Scene::EntryGate => "Space: INITIALIZE SYSTEM".to_string(),
        Scene::WarpDrive => "Space: warp travel".to_string(),
        Scene::SpaceSections { sections, anchors } => {
            format!("Space: {:?} (navigator {:?})", sections, anchors)
        }
    }
}

fn report(driver: &ExperienceDriver, transition: Transition) {
    println!("  {:?}", transition);
    println!("{}", describe(&driver.controller().scene()));
}

pub async fn run(track: &str, back_after_ms: Option<u64>) -> Result<()> {
    let track: Track = track.parse()?;
    let config = load_config().context("Failed to load configuration")?;
    let mut driver = ExperienceDriver::new(Cast::standard(&config.experience.timings()));

    println!("{}", describe(&driver.controller().scene()));
    let transition = driver.choose(track);
    report(&driver, transition);

    match back_after_ms {
        None => {
            for transition in driver.settle().await? {
                report(&driver, transition);
            }
        }
        Some(ms) => {
            let deadline = tokio::time::sleep(Duration::from_millis(ms));
            tokio::pin!(deadline);
            loop {
                tokio::select! {
                    _ = &mut deadline => {
                        let transition = driver.back();
                        report(&driver, transition);
                        break;
                    }
                    step = driver.step() => match step? {
                        Some(transition) => report(&driver, transition),
                        None => break,
                    },
                }
            }
        }
    }

    println!("Visited: {:?}", driver.controller().visited());
    Ok(())
}
