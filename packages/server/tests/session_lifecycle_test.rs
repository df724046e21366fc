use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use mafia_server::models::color::Color;
use mafia_server::models::config::GameConfig;
use mafia_server::models::game::Lifecycle;
use mafia_server::models::user::{ServerMessage, Sound, User};
use mafia_server::services::session::{GameSession, Session};
use mafia_server::services::timer::PhaseAlarm;
use mafia_server::services::variants::{ClassicGame, OneDayGame};
use mafia_server::utils::test_setup::{
    drain, drain_text, setup_test_env, test_admin, test_user, ManualScheduler,
};

type Seats = Vec<(User, UnboundedReceiver<ServerMessage>)>;

fn classic_session() -> GameSession<ClassicGame> {
    GameSession::new(Uuid::new_v4(), "Game #1", ClassicGame::with_seed(1), GameConfig::debug())
}

fn seat_players(session: &mut dyn Session, names: &[&str]) -> Seats {
    names
        .iter()
        .map(|name| {
            let (user, rx) = test_user(name);
            session.add_user(user.clone()).unwrap();
            (user, rx)
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_countdown_starts_game_after_wait() {
    setup_test_env();
    let mut session = classic_session();
    let mut scheduler = ManualScheduler::default();
    let _seats = seat_players(&mut session, &["alice", "bob", "carol", "dave"]);

    session.tick(&mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::Starting);

    tokio::time::advance(Duration::from_secs(5)).await;
    session.tick(&mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::Starting);

    tokio::time::advance(GameConfig::debug().start_wait).await;
    session.tick(&mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::InPlay);
    assert_eq!(session.core().players.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_resets_when_players_leave() {
    let mut session = classic_session();
    let mut scheduler = ManualScheduler::default();
    let mut seats = seat_players(&mut session, &["alice", "bob", "carol", "dave"]);

    session.tick(&mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::Starting);

    session.kick("dave", &mut scheduler);
    session.tick(&mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::Waiting);
    assert!(drain_text(&mut seats[0].1)
        .iter()
        .any(|t| t.contains("countdown has been reset")));

    // time spent waiting does not count toward the next countdown
    tokio::time::advance(Duration::from_secs(60)).await;
    let (erin, _rx) = test_user("erin");
    session.add_user(erin).unwrap();
    session.tick(&mut scheduler);
    session.tick(&mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::Starting);
}

#[tokio::test(start_paused = true)]
async fn test_half_the_seats_voting_start_the_game() {
    let mut session = classic_session();
    let mut scheduler = ManualScheduler::default();
    let seats = seat_players(&mut session, &["alice", "bob", "carol", "dave"]);

    session.tick(&mut scheduler);
    session.receive(&seats[0].0, "/start", &mut scheduler);
    // a repeated vote still counts once
    session.receive(&seats[0].0, "/start", &mut scheduler);
    session.tick(&mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::Starting);

    session.receive(&seats[1].0, "/start", &mut scheduler);
    session.tick(&mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::InPlay);
}

#[tokio::test(start_paused = true)]
async fn test_admin_hold_pauses_countdown() {
    let mut session = classic_session();
    let mut scheduler = ManualScheduler::default();
    let (admin, _admin_rx) = test_admin("admin");
    session.add_user(admin.clone()).unwrap();
    let _seats = seat_players(&mut session, &["alice", "bob", "carol"]);

    session.tick(&mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::Starting);
    session.receive(&admin, "!hold", &mut scheduler);

    tokio::time::advance(Duration::from_secs(60)).await;
    session.tick(&mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::Starting);

    session.receive(&admin, "!release", &mut scheduler);
    tokio::time::advance(GameConfig::debug().start_wait).await;
    session.tick(&mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::InPlay);
}

#[tokio::test(start_paused = true)]
async fn test_non_admin_cannot_use_admin_commands() {
    let mut session = classic_session();
    let mut scheduler = ManualScheduler::default();
    let seats = seat_players(&mut session, &["alice", "bob", "carol", "dave"]);

    session.tick(&mut scheduler);
    // parsed as plain chat for a regular user
    session.receive(&seats[0].0, "!start", &mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::Starting);
    session.admin_receive(
        &seats[0].0,
        mafia_server::models::command::AdminCommand::Start,
        &mut scheduler,
    );
    assert_eq!(session.lifecycle(), Lifecycle::Starting);
}

#[tokio::test]
async fn test_full_session_starts_on_next_tick() {
    let mut session =
        GameSession::new(Uuid::new_v4(), "Game #2", OneDayGame::with_seed(3), GameConfig::debug());
    let mut scheduler = ManualScheduler::default();
    let names: Vec<String> = (0..10).map(|i| format!("p{}", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let _seats = seat_players(&mut session, &refs);

    let (late, _rx) = test_user("late");
    assert!(session.add_user(late).is_err());
    assert_eq!(session.players_wanted(), 0);

    session.tick(&mut scheduler);
    session.tick(&mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::InPlay);
}

#[test]
fn test_duplicate_name_is_rejected() {
    let mut session = classic_session();
    let _seats = seat_players(&mut session, &["alice"]);
    let (copy, _rx) = test_user("alice");
    assert!(session.add_user(copy).is_err());
    assert_eq!(session.summary().players, vec!["alice".to_string()]);
}

#[test]
fn test_leaving_before_start_frees_the_color() {
    let mut session = classic_session();
    let mut scheduler = ManualScheduler::default();
    let _seats = seat_players(&mut session, &["alice", "bob"]);
    let colors = session.username_color_pairs();
    assert_eq!(colors[0], ("alice".to_string(), Color::Red));

    session.kick("alice", &mut scheduler);
    assert!(!session.has_seat("alice"));

    let (carol, _rx) = test_user("carol");
    session.add_user(carol).unwrap();
    let carol_color = session
        .username_color_pairs()
        .into_iter()
        .find(|(name, _)| name == "carol")
        .map(|(_, color)| color);
    assert_eq!(carol_color, Some(Color::Red));
}

#[test]
fn test_pregame_chat_reaches_every_seat() {
    let mut session = classic_session();
    let mut scheduler = ManualScheduler::default();
    let mut seats = seat_players(&mut session, &["alice", "bob"]);
    drain(&mut seats[1].1);

    session.receive(&seats[0].0, "hello there", &mut scheduler);
    assert!(drain_text(&mut seats[1].1).contains(&"hello there".to_string()));
}

#[tokio::test]
async fn test_disconnect_in_play_keeps_seat_for_reconnect() {
    let mut session = classic_session();
    let mut scheduler = ManualScheduler::default();
    let mut seats = seat_players(&mut session, &["alice", "bob", "carol", "dave"]);
    session.tick(&mut scheduler);
    session.receive(&seats[0].0, "/start", &mut scheduler);
    session.receive(&seats[1].0, "/start", &mut scheduler);
    session.tick(&mut scheduler);
    assert!(session.in_play());

    let (latecomer, _late_rx) = test_user("zed");
    assert!(session.add_user(latecomer).is_err());

    session.disconnect("alice", &mut scheduler);
    assert!(session.has_ghost("alice"));
    assert!(session.in_play());
    drain(&mut seats[0].1);

    // the old connection no longer hears the game
    session.broadcast("still there?");
    assert!(drain_text(&mut seats[0].1).is_empty());

    let (alice_again, mut new_rx) = test_user("alice");
    assert!(session.reconnect(&alice_again));
    assert!(!session.has_ghost("alice"));
    let events = drain(&mut new_rx);
    assert!(events
        .iter()
        .any(|m| matches!(m, ServerMessage::Event(mafia_server::models::user::GameEvent::Role { .. }))));
    // reconnecting twice is a no-op
    assert!(!session.reconnect(&alice_again));

    drain(&mut seats[1].1);
    session.broadcast("welcome back");
    assert!(drain_text(&mut new_rx).contains(&"welcome back".to_string()));
}

#[tokio::test]
async fn test_everyone_leaving_ends_the_game() {
    let mut session = classic_session();
    let mut scheduler = ManualScheduler::default();
    let (admin, _admin_rx) = test_admin("admin");
    session.add_user(admin.clone()).unwrap();
    let _seats = seat_players(&mut session, &["alice", "bob", "carol"]);
    session.receive(&admin, "!start", &mut scheduler);
    assert!(session.in_play());

    for name in ["admin", "alice", "bob", "carol"] {
        session.disconnect(name, &mut scheduler);
    }
    assert_eq!(session.lifecycle(), Lifecycle::EndChat);

    let close = scheduler.last().unwrap();
    assert_eq!(close.phase, PhaseAlarm::CloseSession);
    session.fire_alarm(&close, &mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::Closed);
    // ghosts are not handed back to the lobby
    assert!(session.release_users().is_empty());
}

#[tokio::test]
async fn test_stale_alarm_is_ignored() {
    let mut session = classic_session();
    let mut scheduler = ManualScheduler::default();
    let (admin, _admin_rx) = test_admin("admin");
    session.add_user(admin.clone()).unwrap();
    let _seats = seat_players(&mut session, &["alice", "bob", "carol"]);
    session.receive(&admin, "!start", &mut scheduler);

    let night = scheduler.last().unwrap();
    assert_eq!(night.phase, PhaseAlarm::ResolveNight);
    session.fire_alarm(&night, &mut scheduler);
    let discussion = scheduler.last().unwrap();
    assert_eq!(discussion.phase, PhaseAlarm::EndDiscussion);

    // the night alarm already fired; delivering it again changes nothing
    session.fire_alarm(&night, &mut scheduler);
    assert_eq!(session.core().timer.pending(), Some(PhaseAlarm::EndDiscussion));
    assert_eq!(scheduler.last(), Some(discussion));
}

#[tokio::test]
async fn test_reconnect_under_other_case_rejoins_the_rooms() {
    let mut session = classic_session();
    let mut scheduler = ManualScheduler::default();
    let (admin, _admin_rx) = test_admin("admin");
    session.add_user(admin.clone()).unwrap();
    let mut seats = seat_players(&mut session, &["alice", "bob", "carol"]);
    session.receive(&admin, "!start", &mut scheduler);
    let night = scheduler.last().unwrap();
    session.fire_alarm(&night, &mut scheduler);
    assert_eq!(scheduler.last().unwrap().phase, PhaseAlarm::EndDiscussion);

    session.disconnect("alice", &mut scheduler);
    let (shouting, mut new_rx) = test_user("ALICE");
    assert!(session.has_ghost("ALICE"));
    assert!(session.reconnect(&shouting));
    assert_eq!(session.core().player("alice").unwrap().username(), "alice");
    drain(&mut new_rx);
    drain(&mut seats[1].1);

    session.receive(&seats[1].0, "morning all", &mut scheduler);
    assert!(drain_text(&mut new_rx).contains(&"morning all".to_string()));

    session.receive(&shouting, "I'm back", &mut scheduler);
    let replies = drain_text(&mut new_rx);
    assert!(!replies.contains(&"You cannot talk right now.".to_string()));
    assert!(drain_text(&mut seats[1].1).contains(&"I'm back".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_joining_during_countdown_gets_the_timer() {
    let mut session = classic_session();
    let mut scheduler = ManualScheduler::default();
    let _seats = seat_players(&mut session, &["alice", "bob", "carol", "dave"]);
    session.tick(&mut scheduler);
    assert_eq!(session.lifecycle(), Lifecycle::Starting);

    // back to exactly the minimum before the next tick notices the drop
    session.kick("dave", &mut scheduler);
    let (erin, mut erin_rx) = test_user("erin");
    session.add_user(erin).unwrap();
    assert_eq!(session.lifecycle(), Lifecycle::Starting);

    let remaining = drain(&mut erin_rx).into_iter().find_map(|m| match m {
        ServerMessage::SetTime { remaining_ms, .. } => Some(remaining_ms),
        _ => None,
    });
    assert_eq!(remaining, Some(GameConfig::debug().start_wait.as_millis() as u64));
}

#[tokio::test]
async fn test_disconnect_in_play_updates_everyone_elses_roster() {
    let mut session = classic_session();
    let mut scheduler = ManualScheduler::default();
    let (admin, _admin_rx) = test_admin("admin");
    session.add_user(admin.clone()).unwrap();
    let mut seats = seat_players(&mut session, &["alice", "bob", "carol"]);
    session.receive(&admin, "!start", &mut scheduler);
    drain(&mut seats[1].1);

    session.disconnect("alice", &mut scheduler);
    let messages = drain(&mut seats[1].1);
    assert!(messages
        .iter()
        .any(|m| matches!(m, ServerMessage::Sound { kind: Sound::Leave })));
    let roster = messages.iter().find_map(|m| match m {
        ServerMessage::LeftPanel { entries } => Some(entries.clone()),
        _ => None,
    });
    let roster = roster.unwrap();
    assert_eq!(roster.len(), 4);
    assert!(roster.iter().any(|e| e.text == "alice (disconnected)"));

    let (alice_again, _new_rx) = test_user("alice");
    assert!(session.reconnect(&alice_again));
    let roster = drain(&mut seats[1].1).into_iter().find_map(|m| match m {
        ServerMessage::LeftPanel { entries } => Some(entries),
        _ => None,
    });
    assert!(roster.unwrap().iter().any(|e| e.text == "alice"));
}
