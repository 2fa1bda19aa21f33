//! Orbit demo application
//!
//! Headless driver for the scene core: builds a small solar-system style
//! hierarchy, attaches orbit scripts with sequencer-driven phases, and
//! ticks the scene at a fixed cadence while logging what happens.

use std::any::Any;
use std::sync::Arc;

use nova_engine::foundation::logging;
use nova_engine::prelude::*;

/// Script spinning its entity around the parent at a fixed angular speed
struct Orbiter {
    /// Radians per second
    angular_speed: f32,
    angle: f32,
    radius: f32,
}

impl Orbiter {
    fn new(radius: f32, angular_speed: f32) -> Self {
        Self {
            angular_speed,
            angle: 0.0,
            radius,
        }
    }
}

impl Script for Orbiter {
    fn start(&mut self, ctx: &mut ScriptCtx<'_>) {
        let name = ctx.entity.name().unwrap_or_default();
        log::info!("{name} entering orbit at radius {}", self.radius);

        // Announce again after two simulated seconds, off the tick thread.
        let label = name.clone();
        ctx.sequencer.enqueue(
            Task::new(move || log::info!("{label} completed its shakedown window"))
                .until(|t| t >= 2.0)
                .in_background(),
        );
    }

    fn update(&mut self, ctx: &mut ScriptCtx<'_>) {
        self.angle += self.angular_speed * ctx.delta;
        let position = Vec3::new(
            self.radius * self.angle.cos(),
            0.0,
            self.radius * self.angle.sin(),
        );
        ctx.entity.placement().with(|p| p.set_local_position(position));
    }

    fn instantiate(&self) -> Option<Box<dyn Script>> {
        Some(Box::new(Self::new(self.radius, self.angular_speed)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn unit_cube(name: &str) -> EntityRef {
    let mesh = Mesh::new(
        name,
        Aabb::from_center_extents(Vec3::zeros(), Vec3::new(0.5, 0.5, 0.5)),
    )
    .with_counts(24, 36);
    let material = Material::new(name).with_color(0.8, 0.7, 0.5).with_roughness(0.6);
    Entity::with_geometry(name, mesh, vec![material])
}

fn build_scene(
    registry: &SceneRegistry,
    layers: &LayerRegistry,
    settings: &SceneSettings,
) -> Arc<Scene> {
    let scene = Scene::new(settings);
    registry.install(Arc::clone(&scene));
    let celestial = layers.register("Celestial");

    // Viewpoint and key light.
    let camera = Entity::new("Main Camera");
    camera.set_tag(Tag::MainCamera);
    camera.add_component(Camera::new());
    camera
        .placement()
        .with(|p| p.set_local_position(Vec3::new(0.0, 6.0, -12.0)));
    scene.add_entity(&camera);

    let sun_light = Entity::new("Sun Light");
    sun_light.add_component(Light::directional().with_intensity(1.2));
    scene.add_entity(&sun_light);

    // Sun with two orbiting planets; the moon orbits the first planet.
    let sun = unit_cube("Sun");
    let planet = unit_cube("Planet");
    let moon = unit_cube("Moon");
    for body in [&sun, &planet, &moon] {
        body.set_layer(celestial);
    }
    planet.add_script(Orbiter::new(6.0, 0.8));
    moon.add_script(Orbiter::new(1.5, 2.5));
    sun.add_child(&planet);
    planet.add_child(&moon);
    scene.add_entity(&sun);

    // A second planet stamped from the first.
    let twin = planet.instantiate();
    twin.set_name("Planet Twin");
    sun.add_child(&twin);

    scene
}

fn main() {
    let settings = EngineSettings::load("engine.toml").unwrap_or_else(|error| {
        eprintln!("using default settings ({error})");
        EngineSettings::default()
    });
    logging::init_with_filter(&settings.log_filter);

    let registry = SceneRegistry::new();
    let layers = LayerRegistry::new();
    let scene = build_scene(&registry, &layers, &settings.scene);
    log::info!("scene built; driving 240 frames");

    let mut timer = Timer::new();
    let frame = 1.0_f64 / 60.0;
    let mut now = 0.0_f64;
    for _ in 0..240 {
        scene.pre_tick();
        scene.tick(now);
        scene.fixed_tick(settings.scene.fixed_timestep);
        now += frame;
        timer.update();
    }
    log::info!(
        "drove {} frames in {:.1} ms wall time",
        timer.frame_count(),
        timer.total_time() * 1000.0
    );

    let orbiters = scene.find_all(&SearchFilter::name_contains("Planet"));
    for entity in &orbiters {
        let position = entity.placement().with(Placement::world_position);
        log::info!(
            "{} finished at ({:.2}, {:.2}, {:.2})",
            entity.name().unwrap_or_default(),
            position.x,
            position.y,
            position.z
        );
    }

    let celestial_bodies = scene.find_all(&SearchFilter::any().on_layers(layers.mask_for("Celestial")));
    log::info!("{} celestial bodies in the scene", celestial_bodies.len());

    if let Some(camera) = scene.find(&SearchFilter::any().with_tag(Tag::MainCamera)) {
        log::info!("camera still registered: {}", camera.id());
    }

    registry.release(&scene);
    log::info!("shutdown complete");
}
