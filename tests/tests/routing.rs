use domain::intent::{Intent, Slot};
use domain::outcome::Outcome;
use domain::ports::Clock;
use pretty_assertions::assert_eq;
use regex::Regex;
use rstest::rstest;
use tests::{Harness, CATALOG_JSON, TITLES};

#[rstest]
#[case("A Abelha", "Milton Célio de Oliveira Filho", "12/03/2021")]
#[case("A Baleia-azul", "Ana Lúcia Ribeiro", "05/08/2020")]
#[case("A Borboleta", "Carla Mendes", "20/10/2022")]
#[tokio::test]
async fn tell_me_about_returns_author_and_release_date(
    #[case] title: &str,
    #[case] author: &str,
    #[case] release_date: &str,
) {
    let harness = Harness::new();
    let result = harness.say(&format!("Tell me about {title}"), "s1").await;

    assert_eq!(result.intent, Intent::BookDetails);
    let Outcome::BookDetails(book) = result.outcome else {
        panic!("expected book details for {title}");
    };
    assert_eq!(book.title, title);
    assert_eq!(book.author, author);
    assert_eq!(book.release_date, release_date);
}

#[test]
fn fixture_titles_match_the_catalog() {
    for title in TITLES {
        assert!(CATALOG_JSON.contains(title));
    }
}

#[tokio::test]
async fn complete_support_request_opens_a_ticket() {
    let harness = Harness::new();
    let result = harness
        .say(
            "I need help with an order. name: Ana Souza; email: ana@example.com; subject: Late delivery; message: My order has not arrived yet.",
            "s1",
        )
        .await;

    assert_eq!(result.intent, Intent::SupportTicket);
    let Outcome::TicketOpened(ticket) = result.outcome else {
        panic!("expected an opened ticket");
    };
    assert!(Regex::new(r"^TCK-\d{14}$").unwrap().is_match(&ticket.id));
    assert_eq!(ticket.email, "ana@example.com");

    let stored = std::fs::read_to_string(harness.tickets_path()).unwrap();
    assert!(stored.contains(&ticket.id));
}

#[tokio::test]
async fn partial_support_request_asks_for_the_rest() {
    let harness = Harness::new();
    let result = harness.say("I need help, my email is ana@example.com", "s1").await;

    let Outcome::NeedsInput { intent, missing } = result.outcome else {
        panic!("expected a clarification request");
    };
    assert_eq!(intent, Intent::SupportTicket);
    assert_eq!(missing.as_slice(), &[Slot::Name, Slot::Subject, Slot::Message]);
    assert_eq!(std::fs::read_to_string(harness.tickets_path()).unwrap(), "[]");
}

#[tokio::test]
async fn pronoun_resolves_to_the_previous_book() {
    let harness = Harness::new();
    harness.say("Tell me about A Abelha", "s1").await;
    let result = harness.say("Where can I buy it?", "s1").await;

    assert_eq!(result.intent, Intent::StoreLookup);
    let Outcome::Stores(listing) = result.outcome else {
        panic!("expected stores");
    };
    assert_eq!(listing.title, "A Abelha");
}

#[rstest]
#[case("Where can I buy the book?")]
#[case("Where can I buy it online?")]
#[case("where can I buy a copy now please")]
#[tokio::test]
async fn generic_follow_up_uses_the_previous_book(#[case] follow_up: &str) {
    let harness = Harness::new();
    harness.say("Tell me about A Abelha", "s1").await;
    let result = harness.say(follow_up, "s1").await;

    assert_eq!(result.intent, Intent::StoreLookup);
    let Outcome::Stores(listing) = result.outcome else {
        panic!("expected stores for {follow_up:?}");
    };
    assert_eq!(listing.title, "A Abelha");
}

#[tokio::test]
async fn sessions_do_not_share_context() {
    let harness = Harness::new();
    harness.say("Tell me about A Abelha", "alice").await;
    harness.say("Where can I buy A Borboleta in Salvador?", "bob").await;

    let alice = harness.say("Where can I buy it?", "alice").await;
    let bob = harness.say("Where can I buy it?", "bob").await;
    let carol = harness.say("Where can I buy it?", "carol").await;

    let title = |outcome: &Outcome| match outcome {
        Outcome::Stores(listing) => Some(listing.title.clone()),
        _ => None,
    };
    assert_eq!(title(&alice.outcome).as_deref(), Some("A Abelha"));
    assert_eq!(title(&bob.outcome).as_deref(), Some("A Borboleta"));
    assert_eq!(carol.outcome, Outcome::NotFound { query: None });

    let now = harness.clock.now();
    let sessions = harness.router.sessions();
    assert_eq!(sessions.get("alice", now).unwrap().current_city, None);
    assert_eq!(sessions.get("bob", now).unwrap().current_city.as_deref(), Some("Salvador"));
}

#[tokio::test]
async fn unknown_turns_only_append_history() {
    let harness = Harness::new();
    harness.say("Where can I buy A Abelha in Curitiba?", "s1").await;
    let before = harness.router.sessions().get("s1", harness.clock.now()).unwrap();

    let result = harness.say("what a lovely day", "s1").await;
    assert_eq!(result.intent, Intent::Unknown);
    assert_eq!(result.outcome, Outcome::Help);

    let after = harness.router.sessions().get("s1", harness.clock.now()).unwrap();
    assert_eq!(after.current_book, before.current_book);
    assert_eq!(after.current_city, before.current_city);
    assert_eq!(after.history.len(), before.history.len() + 1);
    assert_eq!(after.history.last().unwrap().intent, Intent::Unknown);
}

#[tokio::test]
async fn store_lookup_without_city_lists_everything_online() {
    let harness = Harness::new();
    let result = harness.say("Where can I buy A Abelha?", "s1").await;

    let Outcome::Stores(listing) = result.outcome else {
        panic!("expected stores");
    };
    assert_eq!(listing.requested_city, None);
    assert_eq!(listing.online, vec!["Amazon".to_string(), "Elo Store".to_string()]);
    assert_eq!(listing.by_city.len(), 2);
}

#[tokio::test]
async fn store_lookup_in_a_city_keeps_the_online_list() {
    let harness = Harness::new();
    let result = harness.say("Where can I buy A Abelha in São Paulo?", "s1").await;

    let Outcome::Stores(listing) = result.outcome else {
        panic!("expected stores");
    };
    assert_eq!(listing.by_city.keys().collect::<Vec<_>>(), vec!["São Paulo"]);
    assert_eq!(listing.online.len(), 2);
    assert!(!listing.is_online_fallback());
}

#[tokio::test]
async fn city_without_stores_falls_back_to_online() {
    let harness = Harness::new();
    let result = harness.say("Where can I buy A Baleia-azul in Recife?", "s1").await;

    let Outcome::Stores(listing) = result.outcome else {
        panic!("expected stores");
    };
    assert!(listing.is_online_fallback());
    assert!(listing.by_city.is_empty());
    assert_eq!(listing.online, vec!["Amazon".to_string()]);
}

#[tokio::test]
async fn unknown_title_is_a_normal_outcome() {
    let harness = Harness::new();
    let result = harness.say("Tell me about \"Memórias Póstumas\"", "s1").await;
    assert_eq!(
        result.outcome,
        Outcome::NotFound {
            query: Some("Memórias Póstumas".into())
        }
    );
}
