//! Randomized checks of the auction protocols.

use modern_art::catalog::{Artist, AuctionType, BID_INCREMENT, Card};
use modern_art::game::{ActionError, Auction, AuctionAction};
use proptest::prelude::*;

fn subject(auction_type: AuctionType) -> Card {
    Card {
        id: 1,
        artist: Artist::GreenTarou,
        auction_type,
    }
}

proptest! {
    /// The sealed winner always holds the highest bid, ties broken toward
    /// the earliest seat, and an all-zero round hands the card back to the
    /// seller for free.
    #[test]
    fn sealed_winner_has_the_highest_bid(
        num_players in 3usize..=5,
        seller_raw in 0usize..5,
        raw_bids in proptest::collection::vec(0u32..=100, 4),
    ) {
        let seller = seller_raw % num_players;
        let mut auction = Auction::new(
            AuctionType::Sealed,
            seller,
            subject(AuctionType::Sealed),
            None,
            num_players,
        );

        let mut submitted = Vec::new();
        let mut outcome = None;
        let mut bids = raw_bids.iter();
        for actor in (0..num_players).filter(|&i| i != seller) {
            let amount = bids.next().unwrap() * BID_INCREMENT;
            submitted.push((actor, amount));
            outcome = auction.process_action(actor, AuctionAction::Bid(amount)).unwrap();
        }

        let outcome = outcome.expect("resolves once every bidder submitted");
        let best = submitted.iter().map(|&(_, amount)| amount).max().unwrap();
        if best == 0 {
            prop_assert_eq!(outcome.winner, seller);
            prop_assert_eq!(outcome.price, 0);
        } else {
            let expected = submitted
                .iter()
                .find(|&&(_, amount)| amount == best)
                .unwrap()
                .0;
            prop_assert_eq!(outcome.winner, expected);
            prop_assert_eq!(outcome.price, best);
        }
    }

    /// Arbitrary open-auction scripts: rejected actions never mutate the
    /// auction, and any resolution pays exactly the standing high bid to
    /// the player who placed it.
    #[test]
    fn open_auction_scripts_stay_consistent(
        num_players in 3usize..=5,
        script in proptest::collection::vec((0usize..5, 0u32..50, any::<bool>()), 1..40),
    ) {
        let mut auction = Auction::new(
            AuctionType::Open,
            0,
            subject(AuctionType::Open),
            None,
            num_players,
        );
        let mut high: Option<(usize, u32)> = None;

        for (actor_raw, amount_raw, is_pass) in script {
            if auction.is_resolved() {
                break;
            }
            let actor = actor_raw % num_players;
            let amount = amount_raw * BID_INCREMENT;
            let action = if is_pass {
                AuctionAction::Pass
            } else {
                AuctionAction::Bid(amount)
            };
            let before = auction.clone();

            match auction.process_action(actor, action) {
                Ok(Some(outcome)) => {
                    if !is_pass {
                        high = Some((actor, amount));
                    }
                    match high {
                        Some((bidder, standing)) => {
                            prop_assert_eq!(outcome.winner, bidder);
                            prop_assert_eq!(outcome.price, standing);
                        }
                        None => {
                            prop_assert_eq!(outcome.winner, 0);
                            prop_assert_eq!(outcome.price, 0);
                        }
                    }
                }
                Ok(None) => {
                    if !is_pass {
                        high = Some((actor, amount));
                    }
                }
                Err(_) => prop_assert_eq!(&auction, &before),
            }
        }
    }

    /// Once around: every non-seller acts at most once and the auction
    /// resolves by the time the turn returns to the seller.
    #[test]
    fn once_around_gives_each_bidder_one_chance(
        num_players in 3usize..=5,
        choices in proptest::collection::vec((any::<bool>(), 1u32..10), 4),
    ) {
        let mut auction = Auction::new(
            AuctionType::OnceAround,
            0,
            subject(AuctionType::OnceAround),
            None,
            num_players,
        );
        let mut high: Option<(usize, u32)> = None;
        let mut actions = 0;
        let mut outcome = None;

        while outcome.is_none() {
            let actor = (0..num_players)
                .find(|&i| auction.can_act(i))
                .expect("unresolved auction always has an actor");
            let (wants_bid, step) = choices[actions % choices.len()];
            let action = if wants_bid {
                let amount = auction.current_bid() + step * BID_INCREMENT;
                high = Some((actor, amount));
                AuctionAction::Bid(amount)
            } else {
                AuctionAction::Pass
            };
            outcome = auction.process_action(actor, action).unwrap();
            actions += 1;
        }

        prop_assert!(actions <= num_players - 1);
        let outcome = outcome.unwrap();
        match high {
            Some((bidder, amount)) => {
                prop_assert_eq!(outcome.winner, bidder);
                prop_assert_eq!(outcome.price, amount);
            }
            None => {
                prop_assert_eq!(outcome.winner, 0);
                prop_assert_eq!(outcome.price, 0);
            }
        }
    }

    /// Fixed price: the first acceptor buys at the asked price; a full
    /// round of declines makes the seller buy it themselves.
    #[test]
    fn fixed_price_resolves_to_acceptor_or_seller(
        num_players in 3usize..=5,
        price_units in 1u32..50,
        declines in 0usize..4,
    ) {
        let price = price_units * BID_INCREMENT;
        let mut auction = Auction::new(
            AuctionType::FixedPrice,
            0,
            subject(AuctionType::FixedPrice),
            None,
            num_players,
        );
        prop_assert_eq!(auction.process_action(0, AuctionAction::SetPrice(price)).unwrap(), None);

        let declines = declines.min(num_players - 1);
        let mut outcome = None;
        for step in 0..num_players - 1 {
            let actor = step + 1;
            let action = if step < declines {
                AuctionAction::Pass
            } else {
                AuctionAction::Accept
            };
            outcome = auction.process_action(actor, action).unwrap();
            if outcome.is_some() {
                break;
            }
        }

        let outcome = outcome.expect("fixed price always resolves within one lap");
        prop_assert_eq!(outcome.price, price);
        if declines == num_players - 1 {
            prop_assert_eq!(outcome.winner, 0);
        } else {
            prop_assert_eq!(outcome.winner, declines + 1);
        }
    }

    /// Bids that are not multiples of the increment are always rejected.
    #[test]
    fn unrounded_amounts_never_land(
        num_players in 3usize..=5,
        offset in 1u32..1000,
    ) {
        let mut auction = Auction::new(
            AuctionType::Open,
            0,
            subject(AuctionType::Open),
            None,
            num_players,
        );
        prop_assert_eq!(
            auction.process_action(1, AuctionAction::Bid(5_000 + offset)),
            Err(ActionError::NotAMultiple)
        );
    }
}
