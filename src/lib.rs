//! Simulation core for a vertically scrolling walker shooter.
//!
//! The [`game::Game`] loop driver owns the [`world::World`] context and the
//! entity pools; presentation, audio, terrain and score storage are reached
//! through the traits in [`collab`].

pub mod beam;
pub mod bosses;
pub mod collab;
pub mod config;
pub mod entities;
pub mod fx;
pub mod game;
pub mod hostile;
pub mod pickups;
pub mod player;
pub mod projectiles;
pub mod score;
pub mod terrain;
pub mod turrets;
pub mod walkers;
pub mod world;
