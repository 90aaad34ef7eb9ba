use futures::StreamExt as _;
use pretty_assertions::assert_eq;
use test_log::test;

use super::*;

async fn collect(local: &Local, message: &str) -> Vec<Delta> {
    let cancel = CancellationToken::new();
    let mut stream = local.deltas(vec![], message, cancel).await.unwrap();

    let mut deltas = vec![];
    while let Some(delta) = stream.next().await {
        deltas.push(delta.unwrap());
    }

    deltas
}

#[test]
fn test_reply_for_matches_canned_table() {
    assert_eq!(
        reply_for("Tell me about yourself"),
        CANNED_REPLIES[0].1,
    );

    // Case-insensitive substring match.
    assert_eq!(
        reply_for("Hey, could you tell me about YOURSELF please?"),
        CANNED_REPLIES[0].1,
    );

    assert_eq!(
        reply_for("What's your experience with AI?"),
        CANNED_REPLIES[4].1,
    );
}

#[test]
fn test_reply_for_fallback() {
    assert_eq!(reply_for("xyzzy plugh"), FALLBACK_REPLY);
}

#[test]
fn test_tokenize_roundtrip() {
    let reply = CANNED_REPLIES[0].1;
    let tokens = tokenize(reply);

    assert_eq!(tokens.concat(), reply);

    // Runs strictly alternate between whitespace and non-whitespace.
    for window in tokens.windows(2) {
        assert_ne!(is_whitespace(window[0]), is_whitespace(window[1]));
    }
}

#[test(tokio::test(start_paused = true))]
async fn test_reveal_roundtrip() {
    let local = Local::default();
    let deltas = collect(&local, "Tell me about yourself").await;

    let text: String = deltas.iter().map(|d| d.fragment.as_str()).collect();
    assert_eq!(text, CANNED_REPLIES[0].1);
}

#[test(tokio::test(start_paused = true))]
async fn test_reveal_terminal_delta_is_last() {
    let local = Local::default();
    let deltas = collect(&local, "xyzzy plugh").await;

    let (last, rest) = deltas.split_last().unwrap();
    assert!(last.last);
    assert!(rest.iter().all(|d| !d.last));
}

#[test(tokio::test(start_paused = true))]
async fn test_reveal_never_yields_whitespace_only_fragments() {
    let local = Local::default();
    let deltas = collect(&local, "what are your core values?").await;

    for delta in deltas {
        assert!(!delta.fragment.is_empty());
        assert!(!is_whitespace(&delta.fragment), "fragment {:?}", delta.fragment);
    }
}

#[test(tokio::test(start_paused = true))]
async fn test_cancel_stops_reveal() {
    let local = Local::default();
    let cancel = CancellationToken::new();
    let mut stream = local
        .deltas(vec![], "Tell me about yourself", cancel.clone())
        .await
        .unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert!(!first.last);

    cancel.cancel();
    assert!(stream.next().await.is_none());
}
