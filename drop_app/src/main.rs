//! Sphere drop demo
//!
//! Headless run of the physics core: a floor grid and a tilted ramp are
//! baked into static geometry, a handful of spheres are dropped on them and
//! the scene is stepped from a fixed-timestep frame loop fed with uneven
//! frame times. Pass a `.toml` or `.ron` physics config path to override the
//! defaults.

use rust_physics::config::{Config, PhysicsConfig};
use rust_physics::foundation::logging;
use rust_physics::foundation::math::{Mat4, Mat4Ext, Transform, Vec3};
use rust_physics::foundation::time::{FixedTimestep, Timer};
use rust_physics::physics::{physics_step, BodyKey, StaticGeometry};
use rust_physics::scene::{Mesh, PhysicsScene};
use rust_physics::spatial::Ray;

const FRAMES: usize = 600;
const REPORT_EVERY: usize = 60;

// Simulated frame times, including one long hitch.
const FRAME_TIMES: [f32; 8] = [1.0 / 60.0, 1.0 / 45.0, 1.0 / 75.0, 1.0 / 60.0, 1.0 / 30.0, 1.0 / 60.0, 1.0 / 90.0, 0.2];

struct DropDemo {
    scenes: Vec<PhysicsScene>,
    balls: Vec<BodyKey>,
    clock: FixedTimestep,
}

impl DropDemo {
    fn new(config: PhysicsConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let clock = FixedTimestep::new(config.timestep.fixed_dt, config.timestep.max_ticks_per_frame);
        let mut scene = PhysicsScene::with_config(config);

        log::info!("Baking static geometry...");
        scene.add_geometry(StaticGeometry::from_mesh(&Mesh::grid(40.0, 16), &Mat4::identity())?);
        let ramp = Transform::from_position(Vec3::new(8.0, 2.0, 0.0)).to_matrix() * Mat4::rotation_z(0.35);
        scene.add_geometry(StaticGeometry::from_mesh(&Mesh::grid(8.0, 4), &ramp)?);

        let mut balls = Vec::new();
        for (i, radius) in [0.5, 0.75, 1.0, 1.25, 0.4].into_iter().enumerate() {
            let key = scene.create_body(Vec3::new(4.0 + i as f32 * 2.0, 6.0 + i as f32, -3.0 + i as f32 * 1.5));
            if let Some(body) = scene.body_mut(key) {
                body.set_radius(radius);
            }
            balls.push(key);
        }
        log::info!("Dropping {} spheres", balls.len());

        Ok(Self {
            scenes: vec![scene],
            balls,
            clock,
        })
    }

    fn run(&mut self) {
        let mut timer = Timer::new();
        let mut ticks = 0u64;

        for frame in 0..FRAMES {
            let frame_delta = FRAME_TIMES[frame % FRAME_TIMES.len()];
            for _ in 0..self.clock.advance(frame_delta) {
                physics_step(&mut self.scenes, self.clock.fixed_dt());
                ticks += 1;
            }

            if frame % REPORT_EVERY == 0 {
                self.report(frame);
            }
            timer.update();
        }

        self.report(FRAMES);
        log::info!(
            "Ran {ticks} ticks over {FRAMES} frames in {:.3}s wall time ({} resyncs)",
            timer.total_time(),
            self.clock.resync_count()
        );
    }

    fn report(&mut self, frame: usize) {
        let scene = &mut self.scenes[0];
        for (n, &key) in self.balls.iter().enumerate() {
            let Some(body) = scene.body(key) else { continue };
            let p = body.position();
            log::info!(
                "frame {frame:4} ball {n}: pos ({:7.3}, {:7.3}, {:7.3}) speed {:.4} contacts {}",
                p.x,
                p.y,
                p.z,
                body.velocity().magnitude(),
                body.contact_count()
            );
        }

        let probe = Ray::new(Vec3::new(8.0, 20.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        if let Some(hit) = scene.raycast(&probe) {
            log::debug!(
                "probe ray hit geometry {} triangle {} at {:.3}",
                hit.triangle.geometry.0,
                hit.triangle.index,
                hit.distance
            );
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading physics config from {path}");
            let config = PhysicsConfig::load_from_file(&path)?;
            config.validate()?;
            config
        }
        None => PhysicsConfig::default(),
    };

    println!("=== Sphere Drop Demo ===");
    println!("Set RUST_LOG=debug for octree and geometry details");
    println!();

    let mut demo = DropDemo::new(config)?;
    demo.run();
    Ok(())
}
