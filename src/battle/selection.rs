//! Pending tile selection
//!
//! An ability or a move query may ask the player to pick one of a set of
//! tiles. The request is stored on the level and resolved once by
//! `choose_tile`; asking again or cancelling drops it with no side effects.

use tracing::{debug, warn};

use crate::battle::events::BattleEvent;
use crate::core::error::Result;
use crate::core::types::ActorId;
use crate::grid::{Coord, HighlightTag, Terrain};
use crate::session::Session;

/// What happens to the picked tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPurpose {
    /// Walk the requester there
    Move,
    /// L-shaped jump; counts one ability use
    Knight,
    /// Turn water into ice; counts one ability use
    Freeze,
    /// Put a teammate there
    Warp { target: ActorId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileRequest {
    pub requester: ActorId,
    pub tiles: Vec<Coord>,
    pub tag: HighlightTag,
    pub purpose: SelectionPurpose,
}

impl TileRequest {
    pub fn offers(&self, coord: Coord) -> bool {
        self.tiles.contains(&coord)
    }
}

impl Session {
    /// Highlight `tiles` and wait for a pick, replacing any older request
    pub fn request_tiles(
        &mut self,
        requester: ActorId,
        tiles: Vec<Coord>,
        tag: HighlightTag,
        purpose: SelectionPurpose,
    ) {
        self.cancel_selection();
        let Ok(level) = self.level_mut() else {
            return;
        };
        level.map.highlight(&tiles, tag);
        level.pending_selection = Some(TileRequest {
            requester,
            tiles: tiles.clone(),
            tag,
            purpose,
        });
        debug!("{} asked for one of {} tiles", requester, tiles.len());
        self.emit(BattleEvent::HighlightsRequested { tiles, tag });
    }

    pub fn pending_selection(&self) -> Option<&TileRequest> {
        self.level().ok().and_then(|l| l.pending_selection.as_ref())
    }

    /// True while `id` is waiting on a tile pick
    pub fn is_selecting(&self, id: ActorId) -> bool {
        self.pending_selection()
            .map(|r| r.requester == id)
            .unwrap_or(false)
    }

    /// Drop the pending request and its highlights
    pub fn cancel_selection(&mut self) -> bool {
        let Ok(level) = self.level_mut() else {
            return false;
        };
        if level.pending_selection.take().is_none() {
            return false;
        }
        level.map.clear_highlights();
        self.emit(BattleEvent::HighlightsCleared);
        true
    }

    /// Resolve the pending request with `coord`
    ///
    /// Returns `Ok(false)` when nothing is pending or the tile was not
    /// offered; the request stays pending in the latter case. A request
    /// whose unit can no longer act is dropped unresolved.
    pub fn choose_tile(&mut self, coord: Coord) -> Result<bool> {
        let done = self.resolve_selection(coord)?;
        self.pump_turns();
        Ok(done)
    }

    pub(crate) fn resolve_selection(&mut self, coord: Coord) -> Result<bool> {
        let request = match self.level()?.pending_selection.as_ref() {
            Some(request) if request.offers(coord) => request.clone(),
            Some(_) => {
                warn!("{} was not offered", coord);
                return Ok(false);
            }
            None => return Ok(false),
        };
        self.cancel_selection();

        let me = request.requester;
        if !self.can_act(me).unwrap_or(false) {
            warn!("{} can no longer pick a tile", me);
            return Ok(false);
        }
        let done = match request.purpose {
            SelectionPurpose::Move => self.walk(me, coord)?,
            SelectionPurpose::Knight => {
                self.move_to(me, coord);
                self.ability_used(me);
                true
            }
            SelectionPurpose::Freeze => {
                self.level_mut()?.map.set_terrain(coord, Terrain::Ice);
                self.ability_used(me);
                true
            }
            SelectionPurpose::Warp { target } => {
                self.move_to(target, coord);
                self.try_finishing(me);
                true
            }
        };
        Ok(done)
    }
}
