use log::info;
use rand::Rng;
use std::env;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use vitals_ring::{
    AbilityState, Color, DisplayError, RingConfig, VitalsCommand, VitalsRing, VitalsSnapshot,
};

fn main() -> Result<(), DisplayError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse --size / --radius / --title from the command line
    let mut buffer_size = 512usize;
    let mut ring_radius = 110.0f32;
    let mut title = "vitals-ring demo".to_string();
    let mut args = env::args().peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--size" => {
                if let Some(value) = args.next().and_then(|v| v.parse().ok()) {
                    buffer_size = value;
                }
            }
            "--radius" => {
                if let Some(value) = args.next().and_then(|v| v.parse().ok()) {
                    ring_radius = value;
                }
            }
            "--title" => {
                if let Some(value) = args.next() {
                    title = value;
                }
            }
            _ => {}
        }
    }

    let config = RingConfig::builder()
        .buffer_size(buffer_size)
        .ring_radius(ring_radius)
        .ring_thickness(16.0)
        .title(title)
        .build();

    let (sender, receiver) = mpsc::channel();

    // Simulated player: health wanders, shield flickers, abilities burn
    // stocks and recharge on their cooldowns.
    thread::spawn(move || {
        let mut rng = rand::rng();
        let mut snapshot = VitalsSnapshot {
            health_pct: 1.0,
            shield_pct: 0.6,
            barrier_pct: 0.0,
            abilities: vec![
                AbilityState {
                    cooldown_fraction: 0.0,
                    stock: 1,
                    max_stock: 1,
                    label: "secondary".to_string(),
                    color: Color::CYAN,
                },
                AbilityState {
                    cooldown_fraction: 0.0,
                    stock: 3,
                    max_stock: 3,
                    label: "utility".to_string(),
                    color: Color::CYAN,
                },
                AbilityState {
                    cooldown_fraction: 0.0,
                    stock: 1,
                    max_stock: 1,
                    label: "special".to_string(),
                    color: Color::CYAN,
                },
                AbilityState {
                    cooldown_fraction: 0.0,
                    stock: 1,
                    max_stock: 1,
                    label: "equipment".to_string(),
                    color: Color::new(1.0, 0.4, 0.0, 1.0),
                },
            ],
        };

        loop {
            snapshot.health_pct =
                (snapshot.health_pct + rng.random_range(-0.06..0.04)).clamp(0.05, 1.0);
            snapshot.shield_pct =
                (snapshot.shield_pct + rng.random_range(-0.05..0.05)).clamp(0.0, 1.0);

            if snapshot.barrier_pct > 0.0 {
                snapshot.barrier_pct = (snapshot.barrier_pct - 0.02).max(0.0);
            } else if rng.random_range(0.0..1.0) < 0.01 {
                snapshot.barrier_pct = rng.random_range(0.3..1.0);
            }

            for ability in &mut snapshot.abilities {
                if ability.cooldown_fraction > 0.0 {
                    ability.cooldown_fraction = (ability.cooldown_fraction - 0.04).max(0.0);
                    if ability.cooldown_fraction == 0.0 && ability.stock < ability.max_stock {
                        ability.stock += 1;
                        if ability.stock < ability.max_stock {
                            ability.cooldown_fraction = 1.0;
                        }
                    }
                } else if ability.stock > 0 && rng.random_range(0.0..1.0) < 0.03 {
                    ability.stock -= 1;
                    ability.cooldown_fraction = 1.0;
                }
            }

            if sender.send(VitalsCommand::SetVitals(snapshot.clone())).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(100));
        }
    });

    info!("starting simulated vitals feed");
    let mut ring = VitalsRing::new(config);
    ring.show_with_commands(receiver)
}
