//! Encounter plugin: drives waves, the boss fight and level completion.
//!
//! ```text
//! OnEnter(InGame)   begin_encounter   reseed GameRng, build the director from LevelConfig
//! FixedPostUpdate   run_encounter     (CoreSet::Encounter, after kills are resolved)
//!   Killed / EntityDespawned -> wave bookkeeping
//!   BossDefeated             -> boss slot
//!   director.tick            -> spawn_enemy / spawn_boss through SpawnHost
//!   EncounterProgress        -> anyone interested (HUD, audio)
//!   LevelComplete            -> LevelCompleted + GameState::LevelComplete
//! OnExit(InGame)    end_encounter
//! ```

pub mod director;

use bevy::ecs::message::{Message, MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::common::config::LevelConfig;
use crate::common::error::ConfigurationError;
use crate::common::rng::GameRng;
use crate::common::schedule::CoreSet;
use crate::common::state::GameState;
use crate::plugins::boss::{spawn_boss, BossDefeated};
use crate::plugins::combat::messages::{EntityDespawned, Killed};
use crate::plugins::enemies::{spawn_enemy, EnemyTemplates};

use director::{EncounterDirector, EncounterDirectorState, EncounterEvent, EncounterHost};

/// The running encounter for the current level.
#[derive(Resource, Debug)]
pub struct Encounter {
    director: EncounterDirector<Entity>,
    events: Vec<EncounterEvent>,
}

impl Encounter {
    pub fn new(director: EncounterDirector<Entity>) -> Self {
        Self {
            director,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> EncounterDirectorState {
        self.director.state()
    }

    #[inline]
    pub fn director(&self) -> &EncounterDirector<Entity> {
        &self.director
    }
}

/// A director milestone, in the order it happened.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct EncounterProgress(pub EncounterEvent);

/// Written once per level, when the director reaches `LevelComplete`.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelCompleted;

pub fn plugin(app: &mut App) {
    app.add_message::<EncounterProgress>()
        .add_message::<LevelCompleted>();

    app.add_systems(OnEnter(GameState::InGame), begin_encounter);
    app.add_systems(OnExit(GameState::InGame), end_encounter);

    app.add_systems(
        FixedPostUpdate,
        run_encounter
            .in_set(CoreSet::Encounter)
            .run_if(resource_exists::<Encounter>),
    );
}

fn begin_encounter(mut commands: Commands, config: Res<LevelConfig>) {
    info!(
        "level `{}`: {} wave(s), boss {:?}",
        config.name,
        config.waves.len(),
        config.boss
    );

    commands.insert_resource(GameRng::seeded(config.rng_seed));
    commands.insert_resource(Encounter::new(EncounterDirector::new(
        config.timings,
        config.waves.clone(),
    )));
}

fn end_encounter(mut commands: Commands) {
    commands.remove_resource::<Encounter>();
}

/// Spawns on behalf of the director.
struct SpawnHost<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    config: &'a LevelConfig,
    templates: &'a EnemyTemplates,
    rng: &'a mut GameRng,
}

impl EncounterHost<Entity> for SpawnHost<'_, '_, '_> {
    fn spawn_enemy(&mut self, template: &str) -> Result<Entity, ConfigurationError> {
        let position = self.config.spawn_lane.sample(self.rng);
        spawn_enemy(self.commands, self.templates, template, position)
    }

    fn spawn_boss(&mut self) -> Result<Entity, ConfigurationError> {
        let id = self.config.boss.ok_or(ConfigurationError::MissingBoss)?;
        Ok(spawn_boss(
            self.commands,
            id,
            self.config.boss_spawn(),
            self.config.boss_entry_point(),
            self.config.battle_area.rect(),
        ))
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run_encounter(
    time: Res<Time>,
    mut commands: Commands,
    config: Res<LevelConfig>,
    templates: Res<EnemyTemplates>,
    mut rng: ResMut<GameRng>,
    mut encounter: ResMut<Encounter>,
    mut killed: MessageReader<Killed>,
    mut despawned: MessageReader<EntityDespawned>,
    mut boss_defeated: MessageReader<BossDefeated>,
    mut progress: MessageWriter<EncounterProgress>,
    mut completed: MessageWriter<LevelCompleted>,
    mut next: ResMut<NextState<GameState>>,
    live: Query<()>,
) {
    let Encounter { director, events } = &mut *encounter;

    // A kill counts against the wave in the tick it happens, not when the corpse is removed.
    for kill in killed.read() {
        director.notify_despawned(kill.entity);
    }
    for gone in despawned.read() {
        director.notify_despawned(gone.entity);
    }
    for defeat in boss_defeated.read() {
        director.notify_boss_defeated(defeat.boss);
    }

    director.retain_live(|e| live.contains(e));

    let mut host = SpawnHost {
        commands: &mut commands,
        config: &config,
        templates: &templates,
        rng: &mut rng,
    };
    director.tick(time.delta_secs(), &mut host, events);

    for event in events.drain(..) {
        progress.write(EncounterProgress(event));
        if event == EncounterEvent::LevelComplete {
            completed.write(LevelCompleted);
            next.set(GameState::LevelComplete);
        }
    }
}
