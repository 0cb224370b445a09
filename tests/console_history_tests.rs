//! History buffer tests

use rust_secure_vlc_link::console::history::History;

#[test]
fn test_history_empty() {
    let mut history = History::new();
    assert!(history.get_prev().is_none());
    assert!(history.get_next().is_none());
    assert!(history.is_empty());
}

#[test]
fn test_history_push_and_recall() {
    let mut history = History::new();

    history.push("se -TX duffing 0.1 0.2 200 0.3 0.4 200");
    history.push("t hello");

    // Navigate back
    assert_eq!(history.get_prev(), Some("t hello"));
    assert_eq!(history.get_prev(), Some("se -TX duffing 0.1 0.2 200 0.3 0.4 200"));
    assert_eq!(history.get_prev(), Some("se -TX duffing 0.1 0.2 200 0.3 0.4 200")); // stays at oldest

    // Navigate forward
    assert_eq!(history.get_next(), Some("t hello"));
    assert_eq!(history.get_next(), None); // back to current input
}

#[test]
fn test_history_overflow() {
    let mut history = History::new();

    for cmd in ["cmd1", "cmd2", "cmd3", "cmd4", "cmd5"] {
        history.push(cmd);
    }

    // cmd1 fell off (4 entries max)
    assert_eq!(history.len(), 4);
    assert_eq!(history.get_prev(), Some("cmd5"));
    assert_eq!(history.get_prev(), Some("cmd4"));
    assert_eq!(history.get_prev(), Some("cmd3"));
    assert_eq!(history.get_prev(), Some("cmd2"));
    assert_eq!(history.get_prev(), Some("cmd2")); // oldest
}

#[test]
fn test_history_skips_repeat_of_newest() {
    let mut history = History::new();

    history.push("stats");
    history.push("stats");
    history.push("freq");
    history.push("stats");

    assert_eq!(history.len(), 3);
}

#[test]
fn test_history_reset_on_push() {
    let mut history = History::new();

    history.push("cmd1");
    history.push("cmd2");

    // Navigate back
    history.get_prev();

    // Push new command resets navigation
    history.push("cmd3");

    // Should start from newest
    assert_eq!(history.get_prev(), Some("cmd3"));
}
