//! Fixed-capacity entity storage for enemies and projectiles.

use glam::Vec2;
use yogo_core::{Direction, EnemySlot, ProjectileSlot};

/// Drifting square that walks in a single cardinal direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Enemy {
    pub(crate) position: Vec2,
    pub(crate) direction: Direction,
    pub(crate) alive: bool,
}

impl Enemy {
    const DORMANT: Self = Self {
        position: Vec2::ZERO,
        direction: Direction::East,
        alive: false,
    };
}

/// Fixed array of enemies allocated by a linear scan for a dead slot.
#[derive(Clone, Debug)]
pub(crate) struct EnemyPool {
    slots: Vec<Enemy>,
}

impl EnemyPool {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![Enemy::DORMANT; capacity],
        }
    }

    /// Activates the first dead slot, returning `None` when the pool is full.
    pub(crate) fn spawn(&mut self, position: Vec2, direction: Direction) -> Option<EnemySlot> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, enemy)| !enemy.alive)?;
        *slot = Enemy {
            position,
            direction,
            alive: true,
        };
        Some(EnemySlot::new(index as u32))
    }

    pub(crate) fn kill_all(&mut self) {
        for enemy in &mut self.slots {
            enemy.alive = false;
        }
    }

    pub(crate) fn slots(&self) -> &[Enemy] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Enemy] {
        &mut self.slots
    }

    pub(crate) fn alive_count(&self) -> usize {
        self.slots.iter().filter(|enemy| enemy.alive).count()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Bolt travelling in a straight line from the player's muzzle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Projectile {
    pub(crate) position: Vec2,
    /// Travel angle in degrees.
    pub(crate) angle: f32,
    pub(crate) alive: bool,
    /// Seconds since the projectile was fired.
    pub(crate) alive_time: f32,
}

impl Projectile {
    const DORMANT: Self = Self {
        position: Vec2::ZERO,
        angle: 0.0,
        alive: false,
        alive_time: 0.0,
    };

    /// Unit velocity along the travel angle.
    pub(crate) fn heading(&self) -> Vec2 {
        let radians = self.angle.to_radians();
        Vec2::new(radians.cos(), radians.sin())
    }
}

/// Ring of projectiles that overwrites the oldest entry once it wraps.
#[derive(Clone, Debug)]
pub(crate) struct ProjectileRing {
    slots: Vec<Projectile>,
    cursor: usize,
    count: usize,
}

impl ProjectileRing {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![Projectile::DORMANT; capacity],
            cursor: 0,
            count: 0,
        }
    }

    /// Writes a live projectile at the cursor and advances it.
    pub(crate) fn fire(&mut self, position: Vec2, angle: f32) -> Option<ProjectileSlot> {
        let capacity = self.slots.len();
        let slot = self.slots.get_mut(self.cursor)?;
        *slot = Projectile {
            position,
            angle,
            alive: true,
            alive_time: 0.0,
        };
        let written = ProjectileSlot::new(self.cursor as u32);
        self.cursor = (self.cursor + 1) % capacity;
        self.count = (self.count + 1).min(capacity);
        debug_assert!(self.cursor < capacity && self.count <= capacity);
        Some(written)
    }

    /// Deactivates every projectile without rewinding the cursor.
    pub(crate) fn kill_all(&mut self) {
        for projectile in &mut self.slots {
            projectile.alive = false;
        }
    }

    /// Slots that have been written at least once.
    pub(crate) fn written(&self) -> &[Projectile] {
        &self.slots[..self.count]
    }

    pub(crate) fn written_mut(&mut self) -> &mut [Projectile] {
        &mut self.slots[..self.count]
    }

    pub(crate) const fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) const fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enemy_spawn_reuses_first_dead_slot() {
        let mut pool = EnemyPool::with_capacity(3);
        assert_eq!(pool.spawn(Vec2::ZERO, Direction::East), Some(EnemySlot::new(0)));
        assert_eq!(pool.spawn(Vec2::ONE, Direction::West), Some(EnemySlot::new(1)));
        pool.slots_mut()[0].alive = false;
        assert_eq!(pool.spawn(Vec2::X, Direction::North), Some(EnemySlot::new(0)));
        assert_eq!(pool.slots()[0].direction, Direction::North);
        assert_eq!(pool.alive_count(), 2);
    }

    #[test]
    fn full_enemy_pool_drops_spawns() {
        let mut pool = EnemyPool::with_capacity(2);
        assert!(pool.spawn(Vec2::ZERO, Direction::East).is_some());
        assert!(pool.spawn(Vec2::ZERO, Direction::East).is_some());
        assert_eq!(pool.spawn(Vec2::ZERO, Direction::East), None);
        assert_eq!(pool.alive_count(), pool.capacity());
    }

    #[test]
    fn projectile_ring_wraps_and_saturates_count() {
        let mut ring = ProjectileRing::with_capacity(3);
        for expected in [0, 1, 2, 0, 1] {
            let slot = ring.fire(Vec2::ZERO, 0.0).expect("slot");
            assert_eq!(slot.get(), expected);
        }
        assert_eq!(ring.cursor(), 2);
        assert_eq!(ring.count(), 3);
        assert_eq!(ring.written().len(), 3);
    }

    #[test]
    fn ring_overwrites_live_projectiles() {
        let mut ring = ProjectileRing::with_capacity(2);
        let _ = ring.fire(Vec2::ZERO, 0.0);
        let _ = ring.fire(Vec2::ZERO, 90.0);
        let _ = ring.fire(Vec2::ONE, 180.0);
        let oldest = ring.written()[0];
        assert!(oldest.alive);
        assert_eq!(oldest.angle, 180.0);
        assert_eq!(oldest.position, Vec2::ONE);
    }

    #[test]
    fn kill_all_keeps_cursor() {
        let mut ring = ProjectileRing::with_capacity(4);
        let _ = ring.fire(Vec2::ZERO, 0.0);
        ring.kill_all();
        assert_eq!(ring.cursor(), 1);
        assert!(ring.written().iter().all(|projectile| !projectile.alive));
    }

    #[test]
    fn heading_follows_angle() {
        let projectile = Projectile {
            angle: 90.0,
            ..Projectile::DORMANT
        };
        let heading = projectile.heading();
        assert!(heading.x.abs() < 1e-6);
        assert!((heading.y - 1.0).abs() < 1e-6);
    }
}
