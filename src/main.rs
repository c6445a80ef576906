use bevy::prelude::*;
use clap::Parser;
use quick_heist::{HeistPlugin, HeistSettings, RoundTarget};

/// Two players, one diamond: grab it first when the glass drops.
#[derive(Parser, Debug)]
#[command(name = "quick-heist", version, about)]
struct Cli {
    /// Rounds per game: 3, 5, 7 or 10.
    #[arg(long, default_value_t = RoundTarget::Five)]
    rounds: RoundTarget,
    /// Seed the unlock delays for a repeatable game.
    #[arg(long)]
    seed: Option<u64>,
    /// Start with the background loop muted.
    #[arg(long)]
    muted: bool,
    /// Play without any sound cues.
    #[arg(long)]
    no_audio: bool,
}

fn main() {
    let cli = Cli::parse();
    let settings = HeistSettings {
        rounds: cli.rounds,
        seed: cli.seed,
        audio: !cli.no_audio,
        muted: cli.muted,
        ..default()
    };

    App::new()
        .insert_resource(settings)
        .add_plugins((
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Quick Heist".into(),
                        resolution: (1280., 720.).into(),
                        resizable: true,
                        fit_canvas_to_parent: true,
                        ..default()
                    }),
                    ..default()
                }),
            HeistPlugin,
        ))
        .run();
}
