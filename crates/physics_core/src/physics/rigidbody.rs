//! Rigidbody component
//!
//! Per-entity dynamics state. Forces only change the velocity; the physics
//! world integrates it each tick and resolves contacts against the collider
//! registry.

use super::error::PhysicsError;
use crate::ecs::{Component, Entity};
use crate::foundation::math::{utils, Vec3};
use serde::{Deserialize, Serialize};

/// How a force passed to [`Rigidbody::add_force`] changes the velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForceMode {
    /// Continuous force, scaled by delta time and mass
    Force,
    /// Continuous acceleration, scaled by delta time
    Acceleration,
    /// Instant impulse, scaled by mass
    Impulse,
    /// Instant velocity change
    VelocityChange,
}

impl TryFrom<u8> for ForceMode {
    type Error = PhysicsError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Force),
            1 => Ok(Self::Acceleration),
            2 => Ok(Self::Impulse),
            3 => Ok(Self::VelocityChange),
            other => Err(PhysicsError::InvalidForceMode(other)),
        }
    }
}

impl From<ForceMode> for u8 {
    fn from(mode: ForceMode) -> Self {
        match mode {
            ForceMode::Force => 0,
            ForceMode::Acceleration => 1,
            ForceMode::Impulse => 2,
            ForceMode::VelocityChange => 3,
        }
    }
}

/// Contact handling during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CollisionDetectionMode {
    /// Move without contacts
    None,
    /// One contact pass per tick
    #[default]
    Discrete,
    /// Several sub-steps per tick
    Continuous,
}

/// Dynamics state of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct Rigidbody {
    /// Linear velocity
    pub velocity: Vec3,
    /// Contact handling mode
    pub collision_detection_mode: CollisionDetectionMode,
    /// Squared speed that wakes a sleeping body; its square root is the
    /// speed below which a moving body falls asleep
    pub sleep_threshold: f32,
    /// Linear drag coefficient
    pub drag: f32,
    /// Mass
    pub mass: f32,
    /// Whether gravity applies
    pub use_gravity: bool,
    /// Kinematic bodies move at their velocity and ignore forces
    pub is_kinematic: bool,

    owner: Entity,
    enabled: bool,
    is_sleeping: bool,
}

impl Rigidbody {
    /// Default value of [`Rigidbody::sleep_threshold`]
    pub const DEFAULT_SLEEP_THRESHOLD: f32 = 0.005;

    /// Create a rigidbody with default parameters
    pub fn new(owner: Entity) -> Self {
        Self {
            velocity: Vec3::zeros(),
            collision_detection_mode: CollisionDetectionMode::default(),
            sleep_threshold: Self::DEFAULT_SLEEP_THRESHOLD,
            drag: 0.0,
            mass: 1.0,
            use_gravity: true,
            is_kinematic: false,
            owner,
            enabled: true,
            is_sleeping: false,
        }
    }

    /// Builder pattern: set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder pattern: set the mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Builder pattern: set the drag
    pub fn with_drag(mut self, drag: f32) -> Self {
        self.drag = drag;
        self
    }

    /// Builder pattern: set the collision detection mode
    pub fn with_collision_detection_mode(mut self, mode: CollisionDetectionMode) -> Self {
        self.collision_detection_mode = mode;
        self
    }

    /// Builder pattern: toggle gravity
    pub fn with_gravity(mut self, use_gravity: bool) -> Self {
        self.use_gravity = use_gravity;
        self
    }

    /// Builder pattern: toggle kinematic motion
    pub fn with_kinematic(mut self, is_kinematic: bool) -> Self {
        self.is_kinematic = is_kinematic;
        self
    }

    /// Apply a force
    ///
    /// Does nothing while the component is disabled or the body is kinematic.
    /// The owner's active state lives in the scene and is not checked here;
    /// use [`PhysicsWorld::add_force`](crate::physics::PhysicsWorld::add_force)
    /// to also skip bodies whose entity is inactive.
    pub fn add_force(&mut self, force: Vec3, mode: ForceMode, delta_time: f32) {
        if !self.enabled || self.is_kinematic {
            return;
        }

        match mode {
            ForceMode::Force => self.velocity += force * delta_time / self.mass,
            ForceMode::Acceleration => self.velocity += force * delta_time,
            ForceMode::Impulse => self.velocity += force / self.mass,
            ForceMode::VelocityChange => self.velocity += force,
        }
    }

    /// Apply a force given as a raw mode code
    ///
    /// # Panics
    ///
    /// Panics when `code` does not name a [`ForceMode`].
    pub fn add_force_raw(&mut self, force: Vec3, code: u8, delta_time: f32) {
        match ForceMode::try_from(code) {
            Ok(mode) => self.add_force(force, mode, delta_time),
            Err(error) => {
                log::error!("{}", error);
                panic!("{error}");
            }
        }
    }

    /// Velocity attenuated by drag over `delta_time`
    ///
    /// Zero when `delta_time` is not positive. The stored velocity is not
    /// modified.
    pub fn dragged_velocity(&self, delta_time: f32) -> Vec3 {
        if delta_time > 0.0 {
            self.velocity * utils::clamp(1.0 - self.drag * delta_time, 0.0, 1.0)
        } else {
            Vec3::zeros()
        }
    }

    /// Stop integrating until woken up
    pub fn sleep(&mut self) {
        if !self.is_sleeping {
            log::trace!("Rigidbody on {} fell asleep", self.owner);
        }
        self.is_sleeping = true;
    }

    /// Resume integration
    pub fn wake_up(&mut self) {
        if self.is_sleeping {
            log::trace!("Rigidbody on {} woke up", self.owner);
        }
        self.is_sleeping = false;
    }

    /// Whether the body is asleep
    pub fn is_sleeping(&self) -> bool {
        self.is_sleeping
    }

    /// Owning entity
    pub fn entity(&self) -> Entity {
        self.owner
    }
}

impl Component for Rigidbody {
    fn owner(&self) -> Option<Entity> {
        Some(self.owner)
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_active(&mut self, active: bool) {
        self.enabled = active;
    }
}
