use bevy::prelude::*;
use bevy_tweening::lens::*;
use bevy_tweening::*;
use std::f32::consts::FRAC_PI_4;
use std::time::Duration;

use crate::events::{EarlyPressCue, GameOverCue, GrabCue, UnlockCue};
use crate::hud::{outcome_color, player_color};
use crate::types::Screen;

const DIAMOND_SIZE: f32 = 120.0;
const UNLOCKED_SCALE: f32 = 1.3;
const LOCKED_COLOR: Color = Color::srgb(0.45, 0.47, 0.52);
const UNLOCKED_COLOR: Color = Color::srgb(0.55, 0.9, 1.0);
const GLASS_COLOR: Color = Color::srgba(0.8, 0.9, 1.0, 0.25);
const SHAKE_MS: u64 = 180;

pub struct VisualsPlugin;

impl Plugin for VisualsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(TweeningPlugin)
            .add_systems(OnEnter(Screen::Playing), spawn_diamond)
            .add_systems(OnExit(Screen::Playing), despawn_diamond)
            .add_systems(OnExit(Screen::GameOver), despawn_banner)
            .add_systems(Update, (
                handle_unlock,
                handle_grab,
                handle_early_press,
                handle_game_over,
                update_shake,
            ));
    }
}

#[derive(Component)]
struct Diamond;

/// Glass box drawn over the diamond while it is locked.
#[derive(Component)]
struct Glass;

#[derive(Component)]
struct ResultBanner;

#[derive(Component)]
struct Shake {
    remaining_ms: u64,
    origin: Vec3,
}

fn spawn_diamond(mut commands: Commands, existing: Query<Entity, With<Diamond>>) {
    if !existing.is_empty() { return; }
    commands.spawn((SpriteBundle {
        sprite: Sprite {
            color: LOCKED_COLOR,
            custom_size: Some(Vec2::splat(DIAMOND_SIZE)),
            ..default()
        },
        transform: Transform::from_xyz(0.0, 0.0, 1.0).with_rotation(Quat::from_rotation_z(FRAC_PI_4)),
        ..default()
    }, Diamond));
    commands.spawn((SpriteBundle {
        sprite: Sprite {
            color: GLASS_COLOR,
            custom_size: Some(Vec2::splat(DIAMOND_SIZE * 1.8)),
            ..default()
        },
        transform: Transform::from_xyz(0.0, 0.0, 2.0),
        ..default()
    }, Glass));
}

fn despawn_diamond(mut commands: Commands, q: Query<Entity, Or<(With<Diamond>, With<Glass>)>>) {
    for e in q.iter() {
        commands.entity(e).despawn_recursive();
    }
}

fn despawn_banner(mut commands: Commands, q: Query<Entity, With<ResultBanner>>) {
    for e in q.iter() {
        commands.entity(e).despawn_recursive();
    }
}

fn scale_tween(start: f32, end: f32, ms: u64) -> Tween<Transform> {
    Tween::new(
        EaseFunction::QuadraticOut,
        Duration::from_millis(ms),
        TransformScaleLens { start: Vec3::splat(start), end: Vec3::splat(end) },
    )
}

fn handle_unlock(
    mut commands: Commands,
    mut unlocks: EventReader<UnlockCue>,
    mut diamonds: Query<(Entity, &mut Sprite), With<Diamond>>,
    mut glass: Query<&mut Visibility, With<Glass>>,
) {
    if unlocks.read().last().is_none() { return; }
    for (e, mut sprite) in diamonds.iter_mut() {
        sprite.color = UNLOCKED_COLOR;
        commands.entity(e).insert(Animator::new(scale_tween(1.0, UNLOCKED_SCALE, 300)));
    }
    for mut vis in glass.iter_mut() {
        *vis = Visibility::Hidden;
    }
}

/// Relocks the diamond for the next round.
fn handle_grab(
    mut commands: Commands,
    mut grabs: EventReader<GrabCue>,
    mut diamonds: Query<(Entity, &mut Sprite), With<Diamond>>,
    mut glass: Query<&mut Visibility, With<Glass>>,
) {
    let Some(grab) = grabs.read().last() else { return };
    for (e, mut sprite) in diamonds.iter_mut() {
        sprite.color = player_color(grab.player);
        commands.entity(e).insert(Animator::new(scale_tween(UNLOCKED_SCALE, 1.0, 250)));
    }
    for mut vis in glass.iter_mut() {
        *vis = Visibility::Inherited;
    }
}

fn handle_early_press(
    mut commands: Commands,
    mut early: EventReader<EarlyPressCue>,
    glass: Query<(Entity, &Transform), (With<Glass>, Without<Shake>)>,
) {
    if early.read().last().is_none() { return; }
    for (e, t) in glass.iter() {
        commands.entity(e).insert(Shake { remaining_ms: SHAKE_MS, origin: t.translation });
    }
}

fn update_shake(
    mut commands: Commands,
    time: Res<Time>,
    mut q: Query<(Entity, &mut Shake, &mut Transform), With<Glass>>,
) {
    let dt_ms = (time.delta_seconds_f64() * 1000.0) as u64;
    for (e, mut shake, mut t) in q.iter_mut() {
        shake.remaining_ms = shake.remaining_ms.saturating_sub(dt_ms);
        if shake.remaining_ms == 0 {
            t.translation = shake.origin;
            commands.entity(e).remove::<Shake>();
        } else {
            let offset = (shake.remaining_ms as f32 * 0.35).sin() * 6.0;
            t.translation = shake.origin + Vec3::new(offset, 0.0, 0.0);
        }
    }
}

fn handle_game_over(mut commands: Commands, mut overs: EventReader<GameOverCue>) {
    let Some(over) = overs.read().last() else { return };
    let label = match over.outcome.winner() {
        Some(p) => format!("{} Won!", p),
        None => "It's a Tie!".to_string(),
    };
    commands.spawn((
        Text2dBundle {
            text: Text::from_section(label, TextStyle {
                font_size: 84.0,
                color: outcome_color(over.outcome),
                ..default()
            }).with_justify(JustifyText::Center),
            transform: Transform::from_xyz(0.0, 0.0, 5.0).with_scale(Vec3::ZERO),
            ..default()
        },
        Animator::new(scale_tween(0.0, 1.0, 500)),
        ResultBanner,
    ));
}
