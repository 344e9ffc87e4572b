use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use blogpad_core::db::open_db_in_memory;
use blogpad_core::{
    compress_image, BlogStore, ImageCodecError, SqliteRecordRepository, StoreError,
};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

const PREFIX: &str = "data:image/jpeg;base64,";

fn png_bytes(image: DynamicImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png).unwrap();
    cursor.into_inner()
}

/// Encodes `image` as JPEG and inserts an APP1 EXIF segment carrying
/// `orientation` right after the SOI marker.
fn jpeg_with_orientation(image: RgbImage, orientation: u16) -> Vec<u8> {
    let mut jpeg = Vec::new();
    image
        .write_with_encoder(image::codecs::jpeg::JpegEncoder::new(&mut jpeg))
        .unwrap();

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2a");
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x0112u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes());

    let mut app1 = vec![0xff, 0xe1];
    let length = (2 + 6 + tiff.len()) as u16;
    app1.extend_from_slice(&length.to_be_bytes());
    app1.extend_from_slice(b"Exif\x00\x00");
    app1.extend_from_slice(&tiff);

    assert_eq!(&jpeg[..2], &[0xff, 0xd8]);
    let mut tagged = jpeg[..2].to_vec();
    tagged.extend_from_slice(&app1);
    tagged.extend_from_slice(&jpeg[2..]);
    tagged
}

fn decode_uri(uri: &str) -> DynamicImage {
    let payload = uri.strip_prefix(PREFIX).expect("jpeg data uri prefix");
    let bytes = STANDARD.decode(payload).unwrap();
    let image = image::load_from_memory(&bytes).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    image
}

#[test]
fn wide_image_is_clamped_to_800_wide() {
    let source = RgbImage::from_pixel(1600, 800, Rgb([200, 40, 40]));
    let uri = compress_image(&png_bytes(DynamicImage::ImageRgb8(source))).unwrap();

    assert_eq!(decode_uri(&uri).dimensions(), (800, 400));
}

#[test]
fn tall_image_is_clamped_to_800_high() {
    let source = RgbImage::from_pixel(500, 1000, Rgb([10, 120, 220]));
    let uri = compress_image(&png_bytes(DynamicImage::ImageRgb8(source))).unwrap();

    assert_eq!(decode_uri(&uri).dimensions(), (400, 800));
}

#[test]
fn exif_rotated_photo_is_scaled_as_displayed() {
    // Stored landscape, tagged "rotate 90 CW": displayed as 800x1600.
    let source = RgbImage::from_pixel(1600, 800, Rgb([120, 60, 30]));
    let uri = compress_image(&jpeg_with_orientation(source, 6)).unwrap();

    assert_eq!(decode_uri(&uri).dimensions(), (400, 800));
}

#[test]
fn exif_upright_photo_keeps_stored_frame() {
    let source = RgbImage::from_pixel(1600, 800, Rgb([120, 60, 30]));
    let uri = compress_image(&jpeg_with_orientation(source, 1)).unwrap();

    assert_eq!(decode_uri(&uri).dimensions(), (800, 400));
}

#[test]
fn small_image_keeps_its_size() {
    let source = RgbImage::from_pixel(400, 300, Rgb([90, 90, 90]));
    let uri = compress_image(&png_bytes(DynamicImage::ImageRgb8(source))).unwrap();

    assert_eq!(decode_uri(&uri).dimensions(), (400, 300));
}

#[test]
fn transparent_input_is_flattened_to_jpeg() {
    let source = RgbaImage::from_pixel(32, 16, Rgba([0, 255, 0, 128]));
    let uri = compress_image(&png_bytes(DynamicImage::ImageRgba8(source))).unwrap();

    assert_eq!(decode_uri(&uri).dimensions(), (32, 16));
}

#[test]
fn truncated_png_is_a_decode_error() {
    let source = RgbImage::from_pixel(64, 64, Rgb([1, 2, 3]));
    let mut bytes = png_bytes(DynamicImage::ImageRgb8(source));
    bytes.truncate(bytes.len() / 2);

    let err = compress_image(&bytes).unwrap_err();
    assert!(matches!(err, ImageCodecError::Decode(_)));
}

#[test]
fn post_with_image_bytes_stores_compressed_uri() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let mut store = BlogStore::open(repo).unwrap();
    store
        .create_account("Ada", "ada@example.com", "engine1", "engine1")
        .unwrap();

    let bytes = png_bytes(DynamicImage::ImageRgb8(RgbImage::from_pixel(
        1200,
        900,
        Rgb([5, 5, 5]),
    )));
    let post = store
        .create_post_with_image("Photo", "With a picture", Some(bytes.as_slice()))
        .unwrap();

    assert!(post.image.starts_with(PREFIX));
    assert_eq!(decode_uri(&post.image).dimensions(), (800, 600));

    let plain = store
        .create_post_with_image("Plain", "No picture", None)
        .unwrap();
    assert!(plain.image.is_empty());
}

#[test]
fn undecodable_upload_aborts_post_creation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(&conn).unwrap();
    let mut store = BlogStore::open(repo).unwrap();
    store
        .create_account("Ada", "ada@example.com", "engine1", "engine1")
        .unwrap();
    let before = store.posts().len();

    let err = store
        .create_post_with_image("Photo", "Broken", Some(b"GIF89a garbage".as_slice()))
        .unwrap_err();
    assert!(matches!(err, StoreError::Decode(_)));
    assert_eq!(err.user_message(), "Error processing image");
    assert_eq!(store.posts().len(), before);
}
