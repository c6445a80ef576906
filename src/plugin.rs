use bevy::app::AppExit;
use bevy::ecs::system::SystemParam;
use bevy::input::keyboard::KeyboardInput;
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy_kira_audio::prelude::{AudioSource as KiraAudioSource, *};

use crate::audio::{AudioCues, AudioMix};
use crate::config::HeistSettings;
use crate::events::{EarlyPressCue, GameOverCue, GrabCue, UnlockCue};
use crate::logging::MatchLog;
use crate::state_machine::GameMachine;
use crate::types::{Cue, PressResult, RoundTarget, Screen};
use crate::{hud, visuals};

#[derive(Resource)]
pub struct HeistRuntime {
    pub machine: GameMachine,
}

/// Kira channel dedicated to the background loop so its volume can change
/// without touching the one-shot cues.
#[derive(Resource)]
pub struct MusicChannel;

pub struct HeistPlugin;

impl Plugin for HeistPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HeistSettings>()
            .insert_resource(ClearColor(Color::srgb(0.07, 0.07, 0.09)))
            .init_state::<Screen>()
            .add_event::<UnlockCue>()
            .add_event::<GrabCue>()
            .add_event::<EarlyPressCue>()
            .add_event::<GameOverCue>()
            .add_plugins(bevy_kira_audio::AudioPlugin)
            .add_audio_channel::<MusicChannel>()
            .add_plugins((hud::HudPlugin, visuals::VisualsPlugin))
            .add_systems(Startup, (setup, setup_audio))
            .add_systems(Update, (
                menu_input.run_if(in_state(Screen::Menu)),
                game_over_input.run_if(in_state(Screen::GameOver)),
                // Keys queued this frame are judged against the gate as it
                // stood before this frame's timer poll.
                read_player_keys,
                advance_timer.run_if(in_state(Screen::Playing)),
                toggle_mute,
                sync_screen,
            ).chain())
            .add_systems(Last, teardown_on_exit);
    }
}

pub(crate) fn now_ms(time: &Time) -> u64 { (time.elapsed_seconds_f64() * 1000.0) as u64 }

fn setup(mut commands: Commands, settings: Res<HeistSettings>) {
    commands.spawn(Camera2dBundle::default());
    let mut machine = GameMachine::with_timing(&settings.timing, settings.seed);
    machine.select_rounds(settings.rounds);
    machine.set_mix(AudioMix { muted: settings.muted, level: settings.loop_volume });
    commands.insert_resource(HeistRuntime { machine });
}

#[derive(Resource, Default)]
pub(crate) struct AudioHandles {
    background: Option<Handle<KiraAudioSource>>,
    grab: Option<Handle<KiraAudioSource>>,
    fail: Option<Handle<KiraAudioSource>>,
    win: Option<Handle<KiraAudioSource>>,
}

impl AudioHandles {
    fn for_cue(&self, cue: Cue) -> Option<&Handle<KiraAudioSource>> {
        match cue {
            Cue::Grab => self.grab.as_ref(),
            Cue::Fail => self.fail.as_ref(),
            Cue::Win => self.win.as_ref(),
        }
    }
}

fn setup_audio(mut commands: Commands, assets: Res<AssetServer>, settings: Res<HeistSettings>) {
    if !settings.audio {
        info!("sound cues disabled");
        commands.insert_resource(AudioHandles::default());
        return;
    }
    // Missing files are fine: that cue just stays silent.
    let base = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
    let load_if_exists = |rel: &str| -> Option<Handle<KiraAudioSource>> {
        if base.join(rel).exists() {
            Some(assets.load::<KiraAudioSource>(rel.to_string()))
        } else {
            warn!("audio asset {} not found, cue will be silent", rel);
            None
        }
    };
    commands.insert_resource(AudioHandles {
        background: load_if_exists("audio/background.ogg"),
        grab: load_if_exists("audio/grab.ogg"),
        fail: load_if_exists("audio/fail.ogg"),
        win: load_if_exists("audio/win.ogg"),
    });
}

/// Kira-backed cue output for one system run.
#[derive(SystemParam)]
pub(crate) struct CueOutput<'w> {
    audio: Res<'w, Audio>,
    music: Res<'w, AudioChannel<MusicChannel>>,
    handles: Res<'w, AudioHandles>,
}

impl AudioCues for CueOutput<'_> {
    fn play_cue(&mut self, cue: Cue) {
        if let Some(h) = self.handles.for_cue(cue) {
            self.audio.play(h.clone());
        }
    }

    fn start_loop(&mut self, volume: f32) {
        if let Some(bg) = &self.handles.background {
            self.music.stop();
            self.music.play(bg.clone()).looped().with_volume(volume as f64);
        }
    }

    fn set_loop_volume(&mut self, volume: f32) {
        self.music.set_volume(volume as f64);
    }

    fn stop_loop(&mut self) {
        self.music.stop();
    }
}

fn menu_input(
    mut rt: ResMut<HeistRuntime>,
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut cues: CueOutput,
) {
    let current = rt.machine.session().round_target;
    let digits = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4];
    let mut selected = None;
    if keys.just_pressed(KeyCode::ArrowLeft) { selected = Some(current.prev()); }
    if keys.just_pressed(KeyCode::ArrowRight) { selected = Some(current.next()); }
    for (i, key) in digits.iter().enumerate() {
        if keys.just_pressed(*key) { selected = Some(RoundTarget::ALL[i]); }
    }
    if let Some(target) = selected {
        rt.machine.select_rounds(target);
        debug!("rounds selected: {}", target);
    }

    if keys.just_pressed(KeyCode::Enter) || keys.just_pressed(KeyCode::Space) {
        rt.machine.start(now_ms(&time), &mut cues);
    }
}

fn game_over_input(mut rt: ResMut<HeistRuntime>, keys: Res<ButtonInput<KeyCode>>, mut cues: CueOutput) {
    if keys.just_pressed(KeyCode::KeyR) || keys.just_pressed(KeyCode::Enter) {
        rt.machine.restart(&mut cues);
    }
}

fn advance_timer(mut rt: ResMut<HeistRuntime>, time: Res<Time>, mut unlock_tx: EventWriter<UnlockCue>) {
    if rt.machine.tick(now_ms(&time)) {
        unlock_tx.send(UnlockCue);
    }
}

fn key_char(code: KeyCode) -> Option<char> {
    match code {
        KeyCode::KeyA => Some('a'),
        KeyCode::KeyL => Some('l'),
        _ => None,
    }
}

/// Keyboard events are read in delivery order; the machine's own listener
/// drops everything outside play.
fn read_player_keys(
    mut rt: ResMut<HeistRuntime>,
    mut keyboard: EventReader<KeyboardInput>,
    time: Res<Time>,
    mut cues: CueOutput,
    mut grab_tx: EventWriter<GrabCue>,
    mut early_tx: EventWriter<EarlyPressCue>,
    mut over_tx: EventWriter<GameOverCue>,
) {
    let now = now_ms(&time);
    for ev in keyboard.read() {
        if ev.state != ButtonState::Pressed { continue; }
        let Some(c) = key_char(ev.key_code) else { continue };
        match rt.machine.key(c, now, &mut cues) {
            PressResult::Accepted { player, reaction_ms } => {
                grab_tx.send(GrabCue { player, reaction_ms });
                if let Some(outcome) = rt.machine.outcome() {
                    over_tx.send(GameOverCue { outcome });
                    log_match(&rt.machine);
                }
            }
            PressResult::TooEarly { player } => { early_tx.send(EarlyPressCue { player }); }
            PressResult::Ignored => {}
        }
    }
}

fn log_match(machine: &GameMachine) {
    match MatchLog::from_machine(machine).and_then(|log| log.to_json()) {
        Ok(json) => info!(match_log = %json, "match finished"),
        Err(e) => warn!("could not build match log: {}", e),
    }
}

fn toggle_mute(mut rt: ResMut<HeistRuntime>, keys: Res<ButtonInput<KeyCode>>, mut cues: CueOutput) {
    if keys.just_pressed(KeyCode::KeyM) {
        rt.machine.toggle_mute(&mut cues);
    }
}

fn sync_screen(rt: Res<HeistRuntime>, state: Res<State<Screen>>, mut next: ResMut<NextState<Screen>>) {
    let screen = rt.machine.screen();
    if *state.get() != screen {
        next.set(screen);
    }
}

fn teardown_on_exit(mut exits: EventReader<AppExit>, mut rt: ResMut<HeistRuntime>, mut cues: CueOutput) {
    if exits.read().next().is_some() {
        rt.machine.teardown(&mut cues);
    }
}
