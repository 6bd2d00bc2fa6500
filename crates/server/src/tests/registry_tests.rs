use super::*;

#[test]
fn allocated_ids_are_unique_and_start_at_one() {
    let registry = ConnectionRegistry::new();
    assert_eq!(registry.allocate_id(), ConnectionId(1));
    assert_eq!(registry.allocate_id(), ConnectionId(2));
    assert_eq!(registry.allocate_id(), ConnectionId(3));
}

#[tokio::test]
async fn register_and_unregister_track_membership() {
    let registry = ConnectionRegistry::new();
    assert!(registry.is_empty().await);

    let (tx, _rx) = frame_channel();
    let id = registry.allocate_id();
    registry.register(id, Arc::new(tx)).await;
    assert_eq!(registry.len().await, 1);

    assert!(registry.unregister(id).await);
    assert!(!registry.unregister(id).await);
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn snapshot_is_unaffected_by_later_removal() {
    let registry = ConnectionRegistry::new();
    let (tx1, mut rx1) = frame_channel();
    let (tx2, _rx2) = frame_channel();
    let first = registry.allocate_id();
    let second = registry.allocate_id();
    registry.register(first, Arc::new(tx1)).await;
    registry.register(second, Arc::new(tx2)).await;

    let members = registry.snapshot().await;
    registry.unregister(first).await;
    assert_eq!(members.len(), 2);
    assert_eq!(registry.len().await, 1);

    let (_, channel) = members
        .iter()
        .find(|(id, _)| *id == first)
        .expect("first in snapshot");
    channel.send(Frame::from("hello")).expect("send");
    assert_eq!(rx1.recv().await.as_deref(), Some("hello"));
}

#[tokio::test]
async fn newer_frame_replaces_unread_one() {
    let (tx, mut rx) = frame_channel();
    let channel: Arc<dyn ClientChannel> = Arc::new(tx);
    for text in ["first", "second", "third"] {
        channel.send(Frame::from(text)).expect("send");
    }

    assert_eq!(rx.recv().await.as_deref(), Some("third"));
    assert!(rx.try_recv().is_none());
}

#[tokio::test]
async fn receiver_ends_when_sender_is_dropped() {
    let (tx, mut rx) = frame_channel();
    drop(tx);
    assert!(rx.recv().await.is_none());
}

#[test]
fn channel_reports_closed_after_receiver_drop() {
    let (tx, rx) = frame_channel();
    let channel: Arc<dyn ClientChannel> = Arc::new(tx);
    assert!(channel.is_open());

    drop(rx);
    assert!(!channel.is_open());
    assert!(matches!(
        channel.send(Frame::from("late")),
        Err(DeliveryError::Closed)
    ));
}
