use bevy::prelude::*;

use crate::events::{EarlyPressCue, GrabCue, UnlockCue};
use crate::plugin::HeistRuntime;
use crate::types::{Outcome, Player, Screen};

const RED: Color = Color::srgb(0.86, 0.22, 0.27);
const BLUE: Color = Color::srgb(0.2, 0.45, 0.9);
const GOLD: Color = Color::srgb(1.0, 0.84, 0.3);
const DIM: Color = Color::srgb(0.6, 0.6, 0.65);

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HelpVisible>()
            .init_resource::<StatusLine>()
            .add_systems(Startup, setup_mute_label)
            .add_systems(OnEnter(Screen::Menu), spawn_menu)
            .add_systems(OnExit(Screen::Menu), despawn_all::<MenuRoot>)
            .add_systems(OnEnter(Screen::Playing), spawn_game_hud)
            .add_systems(OnExit(Screen::GameOver), despawn_all::<GameHudRoot>)
            .add_systems(OnEnter(Screen::GameOver), spawn_restart_hint)
            .add_systems(Update, (
                toggle_help.run_if(in_state(Screen::Menu)),
                update_menu,
                update_scores,
                update_status,
                update_mute_label,
            ));
    }
}

/// "How to Play" panel on the menu.
#[derive(Resource, Default)]
pub struct HelpVisible(pub bool);

#[derive(Resource, Default)]
struct StatusLine(String);

#[derive(Component)]
struct MenuRoot;

#[derive(Component)]
struct RoundsLabel;

#[derive(Component)]
struct HelpPanel;

/// Scoreboard and round info; lives from the first round until restart.
#[derive(Component)]
struct GameHudRoot;

#[derive(Component)]
struct ScoreText(Player);

#[derive(Component)]
struct RoundText;

#[derive(Component)]
struct StatusText;

#[derive(Component)]
struct MuteLabel;

fn text(value: impl Into<String>, size: f32, color: Color) -> TextBundle {
    TextBundle::from_section(value, TextStyle { font_size: size, color, ..default() })
        .with_text_justify(JustifyText::Center)
}

fn column() -> NodeBundle {
    NodeBundle {
        style: Style {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            row_gap: Val::Px(14.0),
            ..default()
        },
        ..default()
    }
}

const HELP_LINES: [&str; 5] = [
    "The diamond is locked in a glass box.",
    "When the glass is removed, the first player to react wins.",
    "\"A\" for Red Player, \"L\" for Blue Player.",
    "The game continues for the selected number of rounds.",
    "The player with the most diamonds at the end wins!",
];

fn spawn_menu(mut commands: Commands, help: Res<HelpVisible>) {
    commands.spawn((column(), MenuRoot)).with_children(|root| {
        root.spawn(text("Quick Heist", 72.0, GOLD));
        root.spawn(text("\"Blink and You Lose\"", 32.0, Color::WHITE));
        root.spawn(text("H: How to Play", 22.0, DIM));
        let vis = if help.0 { Visibility::Inherited } else { Visibility::Hidden };
        root.spawn((NodeBundle {
            style: Style { flex_direction: FlexDirection::Column, align_items: AlignItems::Center, ..default() },
            visibility: vis,
            ..default()
        }, HelpPanel)).with_children(|panel| {
            for line in HELP_LINES {
                panel.spawn(text(line, 20.0, Color::WHITE));
            }
        });
        root.spawn((text("", 30.0, Color::WHITE), RoundsLabel));
        root.spawn(text("Enter: Play", 28.0, GOLD));
    });
}

fn toggle_help(
    keys: Res<ButtonInput<KeyCode>>,
    mut help: ResMut<HelpVisible>,
    mut q: Query<&mut Visibility, With<HelpPanel>>,
) {
    if !keys.just_pressed(KeyCode::KeyH) { return; }
    help.0 = !help.0;
    for mut vis in q.iter_mut() {
        *vis = if help.0 { Visibility::Inherited } else { Visibility::Hidden };
    }
}

fn update_menu(rt: Res<HeistRuntime>, mut q: Query<&mut Text, With<RoundsLabel>>) {
    let target = rt.machine.session().round_target;
    for mut t in q.iter_mut() {
        t.sections[0].value = format!("Select Rounds:  < {} >", target);
    }
}

fn score_box(parent: &mut ChildBuilder, player: Player, color: Color) {
    parent.spawn(NodeBundle {
        style: Style {
            width: Val::Px(120.0),
            height: Val::Px(90.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        background_color: BackgroundColor(color),
        ..default()
    }).with_children(|b| {
        b.spawn((text("0", 56.0, Color::WHITE), ScoreText(player)));
    });
}

fn spawn_game_hud(mut commands: Commands, existing: Query<Entity, With<GameHudRoot>>, mut status: ResMut<StatusLine>) {
    if !existing.is_empty() { return; }
    status.0 = "Wait for the glass to drop...".into();
    commands.spawn((NodeBundle {
        style: Style {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::SpaceBetween,
            padding: UiRect::all(Val::Px(24.0)),
            ..default()
        },
        ..default()
    }, GameHudRoot)).with_children(|root| {
        root.spawn(NodeBundle {
            style: Style { column_gap: Val::Px(40.0), ..default() },
            ..default()
        }).with_children(|row| {
            score_box(row, Player::Red, RED);
            score_box(row, Player::Blue, BLUE);
        });
        root.spawn(NodeBundle {
            style: Style { flex_direction: FlexDirection::Column, align_items: AlignItems::Center, row_gap: Val::Px(8.0), ..default() },
            ..default()
        }).with_children(|col| {
            col.spawn((text("", 28.0, Color::WHITE), RoundText));
            col.spawn((text("", 24.0, DIM), StatusText));
        });
    });
}

fn spawn_restart_hint(mut commands: Commands, rt: Res<HeistRuntime>, q: Query<Entity, With<GameHudRoot>>) {
    let Some(outcome) = rt.machine.outcome() else { return };
    let Ok(root) = q.get_single() else { return };
    commands.entity(root).with_children(|root| {
        root.spawn(text("R: Restart", 26.0, GOLD));
    });
    debug!("restart hint shown after {}", outcome);
}

pub(crate) fn player_color(player: Player) -> Color {
    match player {
        Player::Red => RED,
        Player::Blue => BLUE,
    }
}

pub(crate) fn outcome_color(outcome: Outcome) -> Color {
    match outcome {
        Outcome::RedWins => RED,
        Outcome::BlueWins => BLUE,
        Outcome::Tie => GOLD,
    }
}

fn update_scores(
    rt: Res<HeistRuntime>,
    mut scores: Query<(&ScoreText, &mut Text), Without<RoundText>>,
    mut rounds: Query<&mut Text, With<RoundText>>,
) {
    let s = rt.machine.session();
    for (who, mut t) in scores.iter_mut() {
        t.sections[0].value = s.score(who.0).to_string();
    }
    for mut t in rounds.iter_mut() {
        t.sections[0].value = if s.over {
            format!("Rounds played: {}", s.current_round)
        } else {
            format!("Round: {} / {}", s.current_round + 1, s.round_target)
        };
    }
}

fn update_status(
    mut status: ResMut<StatusLine>,
    mut unlocks: EventReader<UnlockCue>,
    mut grabs: EventReader<GrabCue>,
    mut early: EventReader<EarlyPressCue>,
    mut q: Query<&mut Text, With<StatusText>>,
) {
    for _ in unlocks.read() {
        status.0 = "GRAB IT!".into();
    }
    for e in early.read() {
        status.0 = format!("{} jumped the gun!", e.player);
    }
    for e in grabs.read() {
        status.0 = format!("{} grabbed it in {} ms", e.player, e.reaction_ms);
    }
    if !status.is_changed() { return; }
    for mut t in q.iter_mut() {
        t.sections[0].value.clone_from(&status.0);
    }
}

fn setup_mute_label(mut commands: Commands) {
    commands.spawn((
        text("", 18.0, DIM).with_style(Style {
            position_type: PositionType::Absolute,
            right: Val::Px(12.0),
            bottom: Val::Px(8.0),
            ..default()
        }),
        MuteLabel,
    ));
}

fn update_mute_label(rt: Res<HeistRuntime>, mut q: Query<&mut Text, With<MuteLabel>>) {
    let label = if rt.machine.mix().muted { "M: unmute (muted)" } else { "M: mute" };
    for mut t in q.iter_mut() {
        if t.sections[0].value != label {
            t.sections[0].value = label.to_string();
        }
    }
}

fn despawn_all<T: Component>(mut commands: Commands, q: Query<Entity, With<T>>) {
    for e in q.iter() {
        commands.entity(e).despawn_recursive();
    }
}
