//! Collection-level invariants across the add/clear/rescan lifecycle (§3, §8 cache-overflow and
//! rescan scenarios), exercised directly against the domain types without a live store.

use imageviewer_core::domain::{
    Collection, CollectionSettings, CollectionStatistics, CollectionType, EmbeddedCache,
    EmbeddedImage, EmbeddedThumbnail, ImageFormat, ImageId, LibraryId,
};

fn settings() -> CollectionSettings {
    CollectionSettings {
        thumbnail_width: 256,
        thumbnail_height: 256,
        cache_width: 1600,
        cache_height: 1600,
        quality: 85,
        enable_cache: true,
        auto_scan: true,
        preserve_original: true,
        format: ImageFormat::Jpeg,
    }
}

fn image(file_size: u64, deleted: bool) -> EmbeddedImage {
    EmbeddedImage {
        id: ImageId::new(),
        filename: "page_001.jpg".into(),
        relative_path: "/archives/book.zip#page_001.jpg".into(),
        file_size,
        width: 0,
        height: 0,
        format: ImageFormat::Jpeg,
        is_deleted: deleted,
    }
}

#[test]
fn freshly_created_collection_satisfies_its_own_invariant() {
    let collection = Collection::new(LibraryId::new(), "Test Set", "/archives/book.zip", CollectionType::Zip, settings());
    assert!(collection.invariants_hold());
    assert_eq!(collection.statistics, CollectionStatistics::default());
}

#[test]
fn soft_deleted_images_are_excluded_from_recomputed_totals() {
    let mut collection =
        Collection::new(LibraryId::new(), "Test Set", "/archives/book.zip", CollectionType::Zip, settings());
    collection.images.push(image(1_000, false));
    collection.images.push(image(2_000, true));

    let recomputed =
        CollectionStatistics::recompute(&collection.images, &collection.thumbnails, &collection.cache_images);

    assert_eq!(recomputed.total_items, 1);
    assert_eq!(recomputed.total_size, 1_000);
}

#[test]
fn stale_statistics_are_detected_by_invariants_hold() {
    let mut collection =
        Collection::new(LibraryId::new(), "Test Set", "/archives/book.zip", CollectionType::Zip, settings());
    collection.images.push(image(1_000, false));
    // Statistics were never updated to reflect the push above — simulates a crash between the
    // array write and the counter write.
    assert!(!collection.invariants_hold());
}

#[test]
fn clearing_derivatives_leaves_image_totals_untouched() {
    let mut collection =
        Collection::new(LibraryId::new(), "Test Set", "/archives/book.zip", CollectionType::Zip, settings());
    let img = image(1_000, false);
    let image_id = img.id;
    collection.images.push(img);
    collection.thumbnails.push(EmbeddedThumbnail {
        image_id,
        width: 256,
        height: 256,
        format: ImageFormat::Webp,
        quality: 85,
        storage_path: "/mnt/cache-a/col/thumb.webp".into(),
        file_size: 300,
        generated_at: chrono::Utc::now(),
    });
    collection.cache_images.push(EmbeddedCache {
        image_id,
        width: 1600,
        height: 1600,
        format: ImageFormat::Jpeg,
        quality: 85,
        storage_path: "/mnt/cache-a/col/cache.jpg".into(),
        file_size: 5_000,
        generated_at: chrono::Utc::now(),
    });
    collection.statistics =
        CollectionStatistics::recompute(&collection.images, &collection.thumbnails, &collection.cache_images);
    assert!(collection.invariants_hold());

    // What `clear_derivative_arrays` does at the domain level: empty the derivative arrays and
    // their counters, but never touch `images`.
    collection.thumbnails.clear();
    collection.cache_images.clear();
    collection.statistics.total_thumbnails = 0;
    collection.statistics.total_thumbnail_size = 0;
    collection.statistics.total_cache_files = 0;
    collection.statistics.total_cache_size = 0;

    assert_eq!(collection.images.len(), 1);
    assert!(collection.invariants_hold());
}
