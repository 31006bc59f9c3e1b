//! Player-facing actions. Each wraps a pure domain transition in the
//! atomic commit loop and manages the transient held-card slot.

use tracing::{debug, info};

use super::{GameFlowService, HeldSlot};
use crate::domain::cards::Card;
use crate::domain::state::{GameId, GridPos, PlayerId};
use crate::domain::transitions;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::services::game_flow::MutationOutcome;

impl GameFlowService {
    /// Reserve the actor's held-card slot, rejecting a second in-flight or
    /// completed draw/pick.
    fn reserve_held(&self, game_id: GameId, player_id: PlayerId) -> Result<(), DomainError> {
        let mut held = self.held.lock();
        if held.contains_key(&(game_id, player_id)) {
            return Err(DomainError::validation(
                ValidationKind::AlreadyHolding,
                "player already holds a card",
            ));
        }
        held.insert((game_id, player_id), HeldSlot::Reserved);
        Ok(())
    }

    fn settle_reservation(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        drawn: Result<Card, DomainError>,
    ) -> Result<Card, DomainError> {
        let mut held = self.held.lock();
        match drawn {
            Ok(card) => {
                held.insert((game_id, player_id), HeldSlot::Card(card.clone()));
                Ok(card)
            }
            Err(err) => {
                held.remove(&(game_id, player_id));
                Err(err)
            }
        }
    }

    /// The card the actor must currently hold for a discard/replace.
    fn require_held(&self, game_id: GameId, player_id: PlayerId) -> Result<Card, DomainError> {
        match self.held.lock().get(&(game_id, player_id)) {
            Some(HeldSlot::Card(card)) => Ok(card.clone()),
            _ => Err(DomainError::validation(
                ValidationKind::NoHeldCard,
                "player holds no card to place",
            )),
        }
    }

    fn release_held(&self, game_id: GameId, player_id: PlayerId) {
        self.held.lock().remove(&(game_id, player_id));
    }

    /// Draw the deck head as the actor's held card.
    pub async fn draw_card(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<Card, DomainError> {
        debug!(%game_id, %player_id, "drawing from deck");
        self.reserve_held(game_id, player_id)?;
        let drawn = self
            .run_mutation(game_id, move |game| {
                transitions::draw_from_deck(game, player_id)
            })
            .await
            .map(|outcome| outcome.value);
        let card = self.settle_reservation(game_id, player_id, drawn)?;
        info!(%game_id, %player_id, card_id = %card.id, "card drawn");
        Ok(card)
    }

    /// Pick the discard head as the actor's held card.
    pub async fn pick_discard(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<Card, DomainError> {
        debug!(%game_id, %player_id, "picking from discard");
        self.reserve_held(game_id, player_id)?;
        let picked = self
            .run_mutation(game_id, move |game| {
                transitions::pick_from_discard(game, player_id)
            })
            .await
            .map(|outcome| outcome.value);
        let card = self.settle_reservation(game_id, player_id, picked)?;
        info!(%game_id, %player_id, card_id = %card.id, "card picked from discard");
        Ok(card)
    }

    /// Discard the held card directly.
    pub async fn discard_card(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<MutationOutcome<()>, DomainError> {
        let card = self.require_held(game_id, player_id)?;
        debug!(%game_id, %player_id, card_id = %card.id, "discarding held card");
        let outcome = self
            .run_mutation(game_id, move |game| {
                transitions::discard_held(game, player_id, card.clone())
            })
            .await?;
        self.release_held(game_id, player_id);
        info!(%game_id, %player_id, events = ?outcome.events, "held card discarded");
        Ok(outcome)
    }

    /// Replace one of the actor's own cells with the held card.
    pub async fn replace_card(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        pos: GridPos,
    ) -> Result<MutationOutcome<()>, DomainError> {
        let card = self.require_held(game_id, player_id)?;
        debug!(%game_id, %player_id, row = pos.row, col = pos.col, "replacing grid card");
        let outcome = self
            .run_mutation(game_id, move |game| {
                transitions::replace_at(game, player_id, pos, card.clone())
            })
            .await?;
        self.release_held(game_id, player_id);
        info!(%game_id, %player_id, events = ?outcome.events, "grid card replaced");
        Ok(outcome)
    }

    /// Resolve the pending ability.
    pub async fn resolve_ability(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        target: transitions::AbilityTarget,
    ) -> Result<MutationOutcome<()>, DomainError> {
        debug!(%game_id, %player_id, ?target, "resolving ability");
        let outcome = self
            .run_mutation(game_id, move |game| {
                transitions::resolve_ability(game, player_id, target)
            })
            .await?;
        info!(%game_id, %player_id, events = ?outcome.events, "ability resolved");
        Ok(outcome)
    }

    /// Recall: surrender own cards matching the discard head, out of turn.
    pub async fn recall(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        positions: Vec<GridPos>,
    ) -> Result<MutationOutcome<()>, DomainError> {
        debug!(%game_id, %player_id, count = positions.len(), "recalling matching cards");
        let outcome = self
            .run_mutation(game_id, move |game| {
                transitions::recall(game, player_id, &positions)
            })
            .await?;
        info!(%game_id, %player_id, "recall applied");
        Ok(outcome)
    }

    /// Call stop and schedule the single end-game run after the grace
    /// window.
    pub async fn call_stop(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<MutationOutcome<()>, DomainError> {
        let policy = self.config.stop_policy;
        let outcome = self
            .run_mutation(game_id, move |game| {
                transitions::call_stop(game, player_id, policy)
            })
            .await?;
        info!(%game_id, %player_id, "stop called; scheduling end-game");
        self.schedule_finish(game_id);
        Ok(outcome)
    }
}
