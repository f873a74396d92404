//! Follow-target tracking.
//!
//! The follow path is recomputed lazily: world notifications only mark it
//! dirty (`update_follow`) and the next think-tick asks the path oracle again.

use tracing::{debug, warn};

use super::start_auto_walk;
use crate::config::GameConfig;
use crate::env::FindPathParams;
use crate::types::CreatureId;
use crate::world::SimContext;

fn follow_params(distance: u32) -> FindPathParams {
    FindPathParams::follow(distance, GameConfig::MAX_FOLLOW_SEARCH)
}

/// Updates the follow reference; `on_follow_creature` fires when it changes.
pub fn set_follow_creature(ctx: &mut SimContext<'_>, id: CreatureId, target: Option<CreatureId>) {
    let Some(creature) = ctx.creature_mut(id) else {
        return;
    };
    if creature.walk.follow == target {
        return;
    }
    creature.walk.follow = target;
    debug!(target: "creature::movement", creature = %id, follow = ?target, "follow target changed");

    if let Some(behavior) = ctx.behavior(id) {
        behavior.on_follow_creature(ctx, id, target);
    }
}

/// Follows `target` along a fresh path kept at the creature's follow distance.
///
/// Without a path (unreachable, out of search range, no path oracle, or the
/// target is gone) the follow reference is cleared and `false` returned.
/// `None` simply stops following. A removed creature follows nothing.
pub fn internal_follow_creature(
    ctx: &mut SimContext<'_>,
    id: CreatureId,
    target: Option<CreatureId>,
) -> bool {
    if !ctx.is_live(id) {
        return false;
    }
    let Some(target) = target else {
        set_follow_creature(ctx, id, None);
        return true;
    };
    let Some(creature) = ctx.creature_mut(id) else {
        return false;
    };
    creature.walk.path.clear();
    let distance = creature.walk.follow_distance;

    let endpoints = match (ctx.world.position_of(id), ctx.is_live(target)) {
        (Some(from), true) => ctx.world.position_of(target).map(|to| (from, to)),
        _ => None,
    };
    let found = endpoints.ok_or(None).and_then(|(from, to)| {
        let paths = ctx.env.paths().map_err(|_| None)?;
        paths
            .find_path(from, to, follow_params(distance))
            .map_err(Some)
    });

    match found {
        Ok(path) => {
            start_auto_walk(ctx, id, path);
            set_follow_creature(ctx, id, Some(target));
            true
        }
        Err(error) => {
            warn!(
                target: "creature::movement",
                creature = %id,
                follow = %target,
                error = ?error,
                "no path to follow target, following cleared"
            );
            set_follow_creature(ctx, id, None);
            false
        }
    }
}

/// Marks the follow path dirty if it no longer leads to the follow target.
pub fn validate_walk_path(ctx: &mut SimContext<'_>, id: CreatureId) {
    let Some(creature) = ctx.live(id) else {
        return;
    };
    if creature.walk.update_follow {
        return;
    }
    let Some(target) = creature.walk.follow else {
        return;
    };

    let (Some(from), Some(to)) = (ctx.world.position_of(id), ctx.world.position_of(target)) else {
        return;
    };
    let Ok(paths) = ctx.env.paths() else {
        return;
    };
    let valid = paths.is_path_valid(
        from,
        &creature.walk.path,
        to,
        follow_params(creature.walk.follow_distance),
    );

    if !valid {
        if let Some(creature) = ctx.creature_mut(id) {
            creature.walk.update_follow = true;
        }
    }
}
