//! World-change notifications delivered to a creature by its host.
//!
//! None of them recompute a path; they only revalidate it and drop attack or
//! follow targets that left the creature's range or the world.

use tracing::trace;

use super::{set_follow_creature, validate_walk_path};
use crate::combat::set_attacked_creature;
use crate::types::{CreatureId, Position};
use crate::world::SimContext;

/// Whether `target` is inside the tracked area of `id`.
pub fn is_in_range(ctx: &SimContext<'_>, id: CreatureId, target: CreatureId) -> bool {
    match (ctx.world.position_of(id), ctx.world.position_of(target)) {
        (Some(from), Some(to)) => ctx.config.view_range.contains(from, to),
        _ => false,
    }
}

/// A tile near `id` changed (items added, removed or updated).
pub fn on_tile_update(ctx: &mut SimContext<'_>, id: CreatureId, _position: Position) {
    validate_walk_path(ctx, id);
}

/// `creature` appeared in view of `id`.
pub fn on_creature_appear(ctx: &mut SimContext<'_>, id: CreatureId, _creature: CreatureId) {
    validate_walk_path(ctx, id);
}

/// `creature` left the world or the view of `id`.
pub fn on_creature_disappear(ctx: &mut SimContext<'_>, id: CreatureId, creature: CreatureId) {
    validate_walk_path(ctx, id);
    forget(ctx, id, creature);
}

/// `creature` moved (possibly `id` itself).
///
/// An attack or follow target that is no longer in range is dropped; a
/// follow path is revalidated whenever either end moved.
pub fn on_creature_move(
    ctx: &mut SimContext<'_>,
    id: CreatureId,
    creature: CreatureId,
    _from: Position,
    _to: Position,
) {
    let Some(this) = ctx.live(id) else {
        return;
    };
    let follow = this.follow_creature();
    let attacked = this.attacked_creature();

    if let Some(follow) = follow.filter(|follow| *follow == creature || creature == id) {
        if !is_in_range(ctx, id, follow) {
            forget(ctx, id, follow);
        }
        validate_walk_path(ctx, id);
    }

    if let Some(attacked) = attacked.filter(|attacked| *attacked == creature || creature == id) {
        if !is_in_range(ctx, id, attacked) {
            forget(ctx, id, attacked);
        }
    }
}

fn forget(ctx: &mut SimContext<'_>, id: CreatureId, gone: CreatureId) {
    let Some(this) = ctx.live(id) else {
        return;
    };
    let attacked = this.attacked_creature() == Some(gone);
    let followed = this.follow_creature() == Some(gone);

    if attacked {
        trace!(target: "creature::movement", creature = %id, target = %gone, "attack target lost");
        set_attacked_creature(ctx, id, None);
    }
    if followed {
        trace!(target: "creature::movement", creature = %id, target = %gone, "follow target lost");
        set_follow_creature(ctx, id, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::internal_follow_creature;
    use crate::test_support::{MockWorld, TestEnv};

    const WATCHER: CreatureId = CreatureId(1);
    const TARGET: CreatureId = CreatureId(2);

    fn world() -> MockWorld {
        let mut world = MockWorld::new();
        world.spawn_generic(WATCHER, Position::new(0, 0), 100);
        world.spawn_generic(TARGET, Position::new(2, 0), 100);
        world
    }

    #[test]
    fn view_range_is_eight_by_six() {
        let mut world = world();
        let env = TestEnv::new();
        world.teleport(TARGET, Position::new(8, -6));
        let ctx = env.context(&mut world);
        assert!(is_in_range(&ctx, WATCHER, TARGET));
        drop(ctx);

        world.teleport(TARGET, Position::new(9, 0));
        let ctx = env.context(&mut world);
        assert!(!is_in_range(&ctx, WATCHER, TARGET));
    }

    #[test]
    fn target_leaving_range_clears_attack_and_follow() {
        let mut world = world();
        let env = TestEnv::new();
        let mut ctx = env.context(&mut world);
        set_attacked_creature(&mut ctx, WATCHER, Some(TARGET));
        internal_follow_creature(&mut ctx, WATCHER, Some(TARGET));
        drop(ctx);

        world.teleport(TARGET, Position::new(20, 0));
        let mut ctx = env.context(&mut world);
        on_creature_move(&mut ctx, WATCHER, TARGET, Position::new(2, 0), Position::new(20, 0));

        let watcher = ctx.live(WATCHER).expect("watcher");
        assert_eq!(watcher.attacked_creature(), None);
        assert_eq!(watcher.follow_creature(), None);
    }

    #[test]
    fn target_moving_within_range_only_revalidates() {
        let mut world = world();
        let env = TestEnv::new();
        let mut ctx = env.context(&mut world);
        internal_follow_creature(&mut ctx, WATCHER, Some(TARGET));
        drop(ctx);

        world.teleport(TARGET, Position::new(0, 3));
        let mut ctx = env.context(&mut world);
        on_creature_move(&mut ctx, WATCHER, TARGET, Position::new(2, 0), Position::new(0, 3));

        let watcher = ctx.live(WATCHER).expect("watcher");
        assert_eq!(watcher.follow_creature(), Some(TARGET));
        assert!(watcher.walk.update_follow);
    }

    #[test]
    fn disappearing_target_is_forgotten() {
        let mut world = world();
        let env = TestEnv::new();
        let mut ctx = env.context(&mut world);
        set_attacked_creature(&mut ctx, WATCHER, Some(TARGET));
        on_creature_disappear(&mut ctx, WATCHER, TARGET);
        assert_eq!(ctx.live(WATCHER).and_then(|c| c.attacked_creature()), None);
    }

    #[test]
    fn unrelated_move_is_ignored() {
        let mut world = world();
        world.spawn_generic(CreatureId(3), Position::new(5, 5), 100);
        let env = TestEnv::new();
        let mut ctx = env.context(&mut world);
        set_attacked_creature(&mut ctx, WATCHER, Some(TARGET));
        on_creature_move(
            &mut ctx,
            WATCHER,
            CreatureId(3),
            Position::new(5, 5),
            Position::new(40, 40),
        );
        assert_eq!(ctx.live(WATCHER).and_then(|c| c.attacked_creature()), Some(TARGET));
    }

    #[test]
    fn tile_update_marks_stale_follow_path() {
        let mut world = world();
        let env = TestEnv::new();
        let mut ctx = env.context(&mut world);
        internal_follow_creature(&mut ctx, WATCHER, Some(TARGET));
        on_tile_update(&mut ctx, WATCHER, Position::new(1, 0));
        assert!(!ctx.live(WATCHER).expect("watcher").walk.update_follow);
        drop(ctx);

        world.teleport(TARGET, Position::new(4, 0));
        let mut ctx = env.context(&mut world);
        on_tile_update(&mut ctx, WATCHER, Position::new(4, 0));
        assert!(ctx.live(WATCHER).expect("watcher").walk.update_follow);
    }

    #[test]
    fn appearing_creature_marks_stale_follow_path() {
        const STRANGER: CreatureId = CreatureId(3);
        let mut world = world();
        world.spawn_generic(STRANGER, Position::new(0, 5), 100);
        let env = TestEnv::new();
        let mut ctx = env.context(&mut world);
        internal_follow_creature(&mut ctx, WATCHER, Some(TARGET));
        drop(ctx);

        world.teleport(TARGET, Position::new(0, 4));
        let mut ctx = env.context(&mut world);
        on_creature_appear(&mut ctx, WATCHER, STRANGER);
        let watcher = ctx.live(WATCHER).expect("watcher");
        assert!(watcher.walk.update_follow);
        assert_eq!(watcher.follow_creature(), Some(TARGET));
    }
}
