//! Currency and experience awards applied through `AwardService`.

use std::sync::Arc;

use ledger_core::{ActorId, ActorKind, ActorState, CurrencyBag, ItemKind, ItemState};
use ledger_runtime::{AwardTarget, EntityRepository, InMemoryRepository, LedgerRuntime};

fn party() -> Vec<ActorState> {
    let mut quartermaster = ActorState::new("quartermaster", "Quartermaster", ActorKind::Npc)
        .with_item(ItemState::new("chest", "Iron Chest", ItemKind::Container));
    quartermaster.currency.set("gp", 7);
    quartermaster.xp = 500;

    let mut fighter = ActorState::new("fighter", "Fighter", ActorKind::Character);
    fighter.xp = 100;
    let mut wizard = ActorState::new("wizard", "Wizard", ActorKind::Character);
    wizard.currency.set("cp", 150);
    let group = ActorState::new("band", "The Band", ActorKind::Group);

    quartermaster
        .item_mut(&"chest".into())
        .expect("chest exists")
        .currency
        .set("gp", 7);
    vec![quartermaster, fighter, wizard, group]
}

fn runtime() -> (Arc<InMemoryRepository>, LedgerRuntime) {
    let repo = Arc::new(InMemoryRepository::with_actors(party()));
    let runtime = LedgerRuntime::builder()
        .repository(repo.clone())
        .build()
        .unwrap();
    (repo, runtime)
}

async fn gold(repo: &InMemoryRepository, id: &str) -> i64 {
    repo.actor(&ActorId::from(id)).await.unwrap().currency.get("gp")
}

#[tokio::test]
async fn split_award_gives_the_remainder_to_earlier_recipients() {
    let (repo, runtime) = runtime();
    let recipients = [
        AwardTarget::actor("fighter"),
        AwardTarget::actor("wizard"),
        AwardTarget::actor("band"),
    ];

    let award = runtime
        .awards()
        .award_currency(&CurrencyBag::new().with("gp", 10), &recipients, false, None)
        .await
        .unwrap();

    assert_eq!(award.total("gp"), 10);
    assert_eq!(gold(&repo, "fighter").await, 4);
    assert_eq!(gold(&repo, "wizard").await, 3);
    assert_eq!(gold(&repo, "band").await, 3);
    // Untouched denominations are not written.
    let wizard = repo.actor(&ActorId::from("wizard")).await.unwrap();
    assert_eq!(wizard.currency.get("cp"), 150);
}

#[tokio::test]
async fn transfer_from_a_container_is_bounded_by_its_coins() {
    let (repo, runtime) = runtime();
    let chest = AwardTarget::item("quartermaster", "chest");
    let recipients = [AwardTarget::actor("fighter"), AwardTarget::actor("wizard")];

    let award = runtime
        .awards()
        .transfer_currency(&chest, &recipients, &CurrencyBag::new().with("gp", 20))
        .await
        .unwrap();

    assert_eq!(award.total("gp"), 7);
    assert_eq!(gold(&repo, "fighter").await, 4);
    assert_eq!(gold(&repo, "wizard").await, 3);

    let chest = repo
        .item(&ActorId::from("quartermaster"), &"chest".into())
        .await
        .unwrap();
    assert_eq!(chest.currency.get("gp"), 0);
    // The owner's own purse is a separate holder.
    assert_eq!(gold(&repo, "quartermaster").await, 7);
}

#[tokio::test]
async fn experience_skips_kinds_that_do_not_track_it() {
    let (repo, runtime) = runtime();
    let recipients = [
        ActorId::from("fighter"),
        ActorId::from("quartermaster"),
        ActorId::from("band"),
    ];

    let award = runtime
        .awards()
        .award_xp(300, &recipients, false, None)
        .await
        .unwrap();

    assert_eq!(award.per_destination, 150);
    let xp = |actor: ActorState| actor.xp;
    assert_eq!(xp(repo.actor(&recipients[0]).await.unwrap()), 250);
    assert_eq!(xp(repo.actor(&recipients[1]).await.unwrap()), 500);
    assert_eq!(xp(repo.actor(&recipients[2]).await.unwrap()), 150);
}

#[tokio::test]
async fn experience_drawn_from_an_origin_is_deducted() {
    let (repo, runtime) = runtime();
    let origin = ActorId::from("quartermaster");

    runtime
        .awards()
        .award_xp(100, &[ActorId::from("fighter"), ActorId::from("wizard")], true, Some(&origin))
        .await
        .unwrap();

    assert_eq!(repo.actor(&origin).await.unwrap().xp, 300);
    assert_eq!(repo.actor(&ActorId::from("fighter")).await.unwrap().xp, 200);
    assert_eq!(repo.actor(&ActorId::from("wizard")).await.unwrap().xp, 100);
}

#[tokio::test]
async fn conversion_rewrites_the_purse() {
    let (repo, runtime) = runtime();

    let converted = runtime
        .awards()
        .convert_currency(&AwardTarget::actor("wizard"))
        .await
        .unwrap();

    assert_eq!(converted.get("gp"), 1);
    assert_eq!(converted.get("ep"), 1);
    assert_eq!(converted.get("cp"), 0);
    let wizard = repo.actor(&ActorId::from("wizard")).await.unwrap();
    assert_eq!(wizard.currency, converted);
}
