//! Room-side trick play: legality enforcement, trick resolution, belote
//! announcements.

use actix::prelude::*;

use crate::domain::{
    is_trump, nth_from, playable_cards, team_of, trick_points, trick_winner, Rank, Seat,
};
use crate::errors::GameError;
use crate::ws::protocol::ServerMsg;

use super::{Room, RoomPhase};

impl Room {
    pub(crate) fn on_play_card(&mut self, ctx: &mut Context<Self>, seat: Seat, card_index: usize) {
        if let Err(err) = self.apply_play(ctx, seat, card_index) {
            self.send_error(seat, err);
        }
    }

    pub(crate) fn apply_play(
        &mut self,
        ctx: &mut Context<Self>,
        seat: Seat,
        card_index: usize,
    ) -> Result<(), GameError> {
        let mut msgs: Vec<ServerMsg> = Vec::with_capacity(3);
        let trick_done = {
            let RoomPhase::Playing(play) = &mut self.phase else {
                return Err(GameError::PhaseMismatch);
            };
            let actor = nth_from(play.leader, play.plays.len() as u8);
            if seat != actor {
                return Err(GameError::OutOfTurn);
            }
            let hand = &self.seats[seat as usize].hand;
            if card_index >= hand.len() {
                return Err(GameError::BadCardIndex(card_index));
            }
            let legal = playable_cards(hand, &play.plays, play.contract.mode, seat);
            if !legal.contains(&card_index) {
                return Err(GameError::IllegalCard);
            }

            let card = self.seats[seat as usize].hand.remove(card_index);
            msgs.push(ServerMsg::CardPlayed {
                player_index: seat,
                card_index,
                card,
            });

            // Belote/rebelote on the trump King and Queen of the holding seat.
            if self.seats[seat as usize].has_belote
                && is_trump(card, play.contract.mode)
                && matches!(card.rank, Rank::King | Rank::Queen)
            {
                play.belote_shown += 1;
                msgs.push(if play.belote_shown == 1 {
                    ServerMsg::Belote { player_index: seat }
                } else {
                    ServerMsg::Rebelote { player_index: seat }
                });
            }

            play.plays.push((seat, card));
            play.fallen.push(card);

            if play.plays.len() == 4 {
                let winner =
                    trick_winner(&play.plays, play.contract.mode).expect("complete trick");
                let points = trick_points(&play.plays, play.contract.mode);
                let team = team_of(winner);
                play.points[team] += points;
                play.piles[team].extend(play.plays.iter().map(|&(_, c)| c));
                play.tricks_won[winner as usize] += 1;
                play.tricks_played += 1;
                play.plays.clear();
                play.leader = winner;
                msgs.push(ServerMsg::PliFinished {
                    winner_index: winner,
                    points,
                });
                Some((winner, play.tricks_played))
            } else {
                None
            }
        };

        for msg in &msgs {
            self.broadcast(msg);
        }

        match trick_done {
            Some((last_winner, 8)) => self.settle_round_end(ctx, last_winner),
            _ => {
                self.broadcast_game_state(false);
                self.advance(ctx);
            }
        }
        Ok(())
    }
}
