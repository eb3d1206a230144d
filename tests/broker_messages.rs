//! Wire-format stability and queue-name parsing for the CLI's `--queue` argument (§4.F, §6).

use imageviewer_core::broker::{CollectionScanMessage, QueueName, ThumbnailGenerationMessage};
use imageviewer_core::domain::{CollectionId, ImageId, JobId};
use std::str::FromStr;

#[test]
fn every_queue_name_round_trips_through_its_wire_string() {
    for queue in QueueName::all() {
        let parsed = QueueName::from_str(queue.as_str()).unwrap();
        assert_eq!(parsed, *queue);
        assert_eq!(parsed.to_string(), queue.as_str());
    }
}

#[test]
fn unknown_queue_name_is_rejected() {
    assert!(QueueName::from_str("not.a.real.queue").is_err());
}

#[test]
fn collection_scan_message_round_trips_through_json() {
    let message = CollectionScanMessage {
        collection_id: CollectionId::new(),
        force_rescan: true,
    };
    let encoded = serde_json::to_vec(&message).unwrap();
    let decoded: CollectionScanMessage = serde_json::from_slice(&encoded).unwrap();
    assert_eq!(decoded.collection_id, message.collection_id);
    assert_eq!(decoded.force_rescan, message.force_rescan);
}

#[test]
fn thumbnail_generation_message_round_trips_through_json() {
    let message = ThumbnailGenerationMessage {
        image_id: ImageId::new(),
        collection_id: CollectionId::new(),
        image_path: "/archives/book.zip#page_001.jpg".into(),
        image_filename: "page_001.jpg".into(),
        width: 256,
        height: 256,
        job_id: JobId::new(),
    };
    let encoded = serde_json::to_vec(&message).unwrap();
    let decoded: ThumbnailGenerationMessage = serde_json::from_slice(&encoded).unwrap();
    assert_eq!(decoded.image_id, message.image_id);
    assert_eq!(decoded.image_path, message.image_path);
}
