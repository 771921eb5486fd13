use rand::Rng;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use vitals_ring::{
    AbilityState, Color, DisplayError, PaintMode, RingConfig, VitalsCommand, VitalsRing,
};

fn main() -> Result<(), DisplayError> {
    env_logger::init();

    // Customize the overlay through the generated builder, including the
    // compositing paint mode for overlapping translucent arcs.
    let config = RingConfig::builder()
        .buffer_size(640)
        .ring_radius(140.0)
        .ring_thickness(24.0)
        .segment_gap_degrees(14.0)
        .paint_mode(PaintMode::Blend)
        .title("command stream".to_string())
        .build();

    let (sender, receiver) = mpsc::channel();

    // Feed random vitals over the channel from a separate thread
    thread::spawn(move || {
        let mut rng = rand::rng();
        loop {
            let commands = [
                VitalsCommand::SetHealth(rng.random_range(0.0..1.0)),
                VitalsCommand::SetShield(rng.random_range(0.0..1.0)),
                VitalsCommand::SetAbilities(vec![AbilityState {
                    cooldown_fraction: rng.random_range(0.0..1.0),
                    stock: rng.random_range(0..4),
                    max_stock: 3,
                    label: "utility".to_string(),
                    color: Color::CYAN,
                }]),
            ];

            // Send all commands, break if any fail
            if commands.iter().any(|cmd| sender.send(cmd.clone()).is_err()) {
                break;
            }

            thread::sleep(Duration::from_millis(250));
        }
    });

    println!("Displaying a vitals ring fed by random commands:");
    println!("- health and shield arcs change every 250ms");
    println!("- one three-stock ability cycles its cooldown");
    println!("Press Ctrl+C to exit");

    let mut ring = VitalsRing::new(config);
    ring.show_with_commands(receiver)
}
