// Ordering and cancellation behavior of the event queue, and the JSON shape
// of outward wire events.

use interview_agent::events::{channel, VoiceEvent};
use serde_json::json;

#[tokio::test]
async fn test_fifo_order() {
    let (queue, mut stream) = channel();

    for i in 0..100 {
        queue.push(i);
    }

    for i in 0..100 {
        assert_eq!(stream.next().await, Some(i));
    }
}

#[tokio::test]
async fn test_values_before_cancel_are_delivered() {
    let (queue, mut stream) = channel();

    queue.push(1);
    queue.push(2);
    queue.cancel();
    queue.push(3);

    assert_eq!(stream.next().await, Some(1));
    assert_eq!(stream.next().await, Some(2));
    assert_eq!(stream.next().await, None, "cancel ends the stream");
    assert_eq!(stream.next().await, None, "stream stays ended");
}

#[tokio::test]
async fn test_cancel_wakes_pending_consumer() {
    let (queue, mut stream) = channel::<u32>();

    let consumer = tokio::spawn(async move { stream.next().await });
    tokio::task::yield_now().await;

    queue.cancel();

    assert_eq!(consumer.await.unwrap(), None);
}

#[tokio::test]
async fn test_dropping_all_producers_ends_stream() {
    let (queue, mut stream) = channel();
    let clone = queue.clone();

    queue.push(7);
    drop(queue);
    drop(clone);

    assert_eq!(stream.next().await, Some(7));
    assert_eq!(stream.next().await, None);
}

#[tokio::test]
async fn test_cloned_producers_share_one_queue() {
    let (queue, mut stream) = channel();
    let other = queue.clone();

    queue.push("q1");
    other.push("o1");
    queue.push("q2");
    queue.cancel();

    assert_eq!(stream.next().await, Some("q1"));
    assert_eq!(stream.next().await, Some("o1"));
    assert_eq!(stream.next().await, Some("q2"));
    assert_eq!(stream.next().await, None);
}

#[test]
fn test_wire_events_are_tagged_snake_case() {
    let event = VoiceEvent::stt_output("hello world");
    let value = serde_json::to_value(&event).unwrap();

    assert_eq!(value["type"], "stt_output");
    assert_eq!(value["transcript"], "hello world");
    assert!(value["ts"].is_i64());
}

#[test]
fn test_tts_chunk_wire_shape() {
    let event = VoiceEvent::tts_chunk("QUJD", true);
    let value = serde_json::to_value(&event).unwrap();

    assert_eq!(value["type"], "tts_chunk");
    assert_eq!(value["audio"], "QUJD");
    assert_eq!(value["done"], true);
}

#[test]
fn test_tool_result_uses_camel_case_call_id() {
    let event = VoiceEvent::tool_result("call-1", "save_question", "Question logged successfully.");
    let value = serde_json::to_value(&event).unwrap();

    assert_eq!(value["type"], "tool_result");
    assert_eq!(value["toolCallId"], "call-1");
    assert_eq!(value["name"], "save_question");
}

#[test]
fn test_tool_call_carries_structured_args() {
    let event = VoiceEvent::tool_call("call-2", "save_feedback", json!({"score": 85}));
    let value = serde_json::to_value(&event).unwrap();

    assert_eq!(value["type"], "tool_call");
    assert_eq!(value["args"]["score"], 85);
}
