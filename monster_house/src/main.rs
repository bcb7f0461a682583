//! Monster House demo
//!
//! Loads a moon base scene description and runs it headless: the player walks
//! a slow circle around the house, jumps every couple of seconds and switches
//! camera mode after every third landing. Camera placement and the render
//! list are written to the log.
//!
//! Usage: `monster_house [scene.ron|scene.toml] [engine.toml]`

use std::path::PathBuf;

use scene_engine::foundation::logging;
use scene_engine::foundation::math::matrix_translation;
use scene_engine::prelude::*;

/// Seconds between jump attempts
const JUMP_INTERVAL: f32 = 2.0;

/// Radius of the player's walk around the origin
const WALK_RADIUS: f32 = 25.0;

/// Radians per second along the walk
const WALK_SPEED: f32 = 0.2;

/// Log the camera and render list every this many frames
const REPORT_EVERY: u64 = 60;

struct MonsterHouse {
    scene_path: PathBuf,
    camera: Option<CameraRig>,
    lights: Vec<(String, LightHandle)>,
    walk_angle: f32,
    since_jump: f32,
    jumps: u32,
    was_airborne: bool,
    landings: u32,
}

impl MonsterHouse {
    fn new(scene_path: PathBuf) -> Self {
        Self {
            scene_path,
            camera: None,
            lights: Vec::new(),
            walk_angle: 0.0,
            since_jump: 0.0,
            jumps: 0,
            was_airborne: false,
            landings: 0,
        }
    }

    fn camera_mut(&mut self) -> Result<&mut CameraRig, AppError> {
        self.camera
            .as_mut()
            .ok_or_else(|| AppError::Custom("camera used before initialization".to_string()))
    }

    fn walk(&mut self, delta_time: f32) -> Result<(), AppError> {
        self.walk_angle = (self.walk_angle + WALK_SPEED * delta_time) % std::f32::consts::TAU;
        let (sin, cos) = self.walk_angle.sin_cos();
        let position = Vec3::new(WALK_RADIUS * cos, 0.0, WALK_RADIUS * sin);
        // Tangent of the walk circle, looking along the direction of travel
        let forward = Vec3::new(-sin, 0.0, cos);

        let camera = self.camera_mut()?;
        camera.set_player_position(position)?;
        camera.set_forward(forward)?;
        Ok(())
    }
}

impl Application for MonsterHouse {
    fn initialize(&mut self) -> Result<Scene, AppError> {
        log::info!("Loading scene from {}", self.scene_path.display());
        let config = SceneConfig::load_from_file(&self.scene_path)?;
        let built = config.build()?;

        let mut lights: Vec<(String, LightHandle)> = built.lights.into_iter().collect();
        lights.sort_by_key(|(_, handle)| handle.index());
        for (name, handle) in &lights {
            let global = built.scene.lights().is_global(*handle)?;
            log::info!("Light #{} '{}'{}", handle.index(), name, if global { " (global)" } else { "" });
        }

        self.lights = lights;
        self.camera = Some(built.camera);
        Ok(built.scene)
    }

    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
        self.walk(delta_time)?;

        let scene = engine.scene_mut();
        let airborne = scene.integrator().is_airborne();
        if self.was_airborne && !airborne {
            self.landings += 1;
            log::info!("Landed (#{})", self.landings);
            if self.landings % 3 == 0 {
                self.camera_mut()?.toggle_mode();
            }
        }
        self.was_airborne = airborne;

        self.since_jump += delta_time;
        if self.since_jump >= JUMP_INTERVAL {
            self.since_jump = 0.0;
            if scene.request_jump() {
                self.jumps += 1;
                log::info!("Jump #{}", self.jumps);
            } else {
                log::warn!("Jump request ignored: still airborne");
            }
        }
        Ok(())
    }

    fn render(&mut self, engine: &Engine) -> Result<(), AppError> {
        let scene = engine.scene();
        let offset = scene.current_offset();
        let Some(camera) = self.camera.as_ref() else {
            return Ok(());
        };

        if scene.frame_count() % REPORT_EVERY != 0 {
            return Ok(());
        }

        log::info!(
            "Frame {}: {:?} camera eye {:?}, jump offset {:.2}",
            scene.frame_count(),
            camera.mode(),
            camera.eye(offset),
            offset
        );
        for item in scene.render_items() {
            let lights = scene.resolve_lights(&item)?;
            let names: Vec<&str> = lights
                .iter()
                .filter_map(|handle| {
                    self.lights
                        .iter()
                        .find(|(_, known)| known == handle)
                        .map(|(name, _)| name.as_str())
                })
                .collect();
            log::debug!(
                "  {} [{}] at {:?} lit by {:?}",
                item.leaf.name,
                item.leaf.asset,
                matrix_translation(&item.world),
                names
            );
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        let scene = engine.scene();
        log::info!(
            "Monster House finished: {} frame(s), {:.1}s, {} jump(s), {} landing(s)",
            scene.frame_count(),
            scene.elapsed(),
            self.jumps,
            self.landings
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let mut args = std::env::args().skip(1);
    let scene_path = args.next().map_or_else(|| manifest_dir.join("scene.ron"), PathBuf::from);
    let engine_path = args.next().map_or_else(|| manifest_dir.join("engine.toml"), PathBuf::from);

    let engine_config = if engine_path.exists() {
        EngineConfig::load_from_file(&engine_path)?
    } else {
        log::warn!("No engine config at {}, using defaults", engine_path.display());
        EngineConfig {
            run_seconds: Some(12.0),
            ..Default::default()
        }
    };

    log::info!("Starting Monster House demo");
    let mut app = MonsterHouse::new(scene_path);
    Engine::run(engine_config, &mut app)?;
    Ok(())
}
