//! Integration tests for the file-backed media cache and background preview
//! loading through a message list.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use predicates::prelude::*;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;

use cellchat::media::{MediaCache, MediaContainer, PreviewFetcher};
use cellchat::messages::{AttachmentMessage, MessageList};
use cellchat::model::content_uri::ContentUri;
use cellchat::model::event::AttachmentKind;
use cellchat::render::cells::UPPER_HALF;
use cellchat::render::wrap::wrap_text;
use cellchat::render::{ColorDepth, RenderPreferences};

fn png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(ImageBuffer::from_pixel(width, height, Rgba(pixel)))
        .write_to(&mut cursor, ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

fn ansi256() -> RenderPreferences {
    RenderPreferences {
        color_depth: ColorDepth::Ansi256,
        ..Default::default()
    }
}

#[test]
fn test_import_stores_blob_under_local_server() {
    let temp = TempDir::new().unwrap();
    let src = temp.child("holiday photo.png");
    src.write_binary(&png(4, 4, [255, 0, 0, 255])).unwrap();

    let cache = MediaCache::new("https://matrix.example.org", temp.child("cache").path());
    let uri = cache.import(src.path()).unwrap();

    assert_eq!(uri.to_string(), "mxc://local/holiday%20photo.png");
    temp.child("cache/media/local/holiday%20photo.png")
        .assert(predicate::path::is_file());

    let url = cache.download_url(&uri).unwrap();
    let expected = predicate::str::ends_with("/_matrix/media/r0/download/local/holiday%20photo.png");
    assert!(expected.eval(&url));
}

#[test]
fn test_download_reads_existing_blob() {
    let temp = TempDir::new().unwrap();
    temp.child("media/s/ab").write_binary(b"blob").unwrap();

    let cache = MediaCache::new("https://s", temp.path());
    assert_eq!(cache.download(&ContentUri::new("s", "ab")).unwrap(), b"blob");
    assert!(cache.download(&ContentUri::new("s", "missing")).is_err());
}

#[test]
fn test_attachment_from_imported_file() {
    let temp = TempDir::new().unwrap();
    let src = temp.child("report.pdf");
    src.write_binary(b"%PDF-1.7").unwrap();

    let cache = MediaCache::new("https://s", temp.child("cache").path());
    let event = cache.import_event(src.path()).unwrap();
    let mut msg = AttachmentMessage::new(PreviewFetcher::new(Arc::new(cache)), &event);

    assert_eq!(msg.kind(), AttachmentKind::Generic);
    assert_eq!(msg.notification_line(), "Sent a file");
    assert!(predicate::str::starts_with("report.pdf: https://s/").eval(&msg.plain_text()));

    // Nothing to preview for a generic file
    msg.fetch_preview();
    assert!(msg.bytes().is_none());
    assert!(msg.thumbnail_path().is_none());
}

#[test]
fn test_thumbnail_path_points_into_cache() {
    let temp = TempDir::new().unwrap();
    let src = temp.child("cat.png");
    src.write_binary(&png(2, 2, [0, 0, 255, 255])).unwrap();

    let cache = MediaCache::new("https://s", temp.child("cache").path());
    let event = cache.import_event(src.path()).unwrap();
    let msg = AttachmentMessage::new(PreviewFetcher::new(Arc::new(cache)), &event);

    let path = msg.thumbnail_path().unwrap();
    assert!(predicate::path::is_file().eval(path.as_path()));
    assert!(path.ends_with("media/local/cat.png"));
}

#[test]
fn test_message_list_loads_preview_in_background() {
    let temp = TempDir::new().unwrap();
    let src = temp.child("red.png");
    src.write_binary(&png(4, 4, [255, 0, 0, 255])).unwrap();

    let cache = MediaCache::new("https://s", temp.child("cache").path());
    let event = cache.import_event(src.path()).unwrap();

    let mut list = MessageList::new(PreviewFetcher::new(Arc::new(cache)), ansi256());
    list.set_width(80);
    let id = list.push_event(&event);

    // Fallback text until the download is applied
    let message = list.get(id).unwrap();
    assert_eq!(message.height(), wrap_text(&message.plain_text(), 80).len());
    assert_eq!(message.height(), 1);

    assert_eq!(list.request_previews(), 1);
    assert!(list.wait_for_preview(Duration::from_secs(5)));
    assert_eq!(list.pending_previews(), 0);

    // 4x4 image → 4 columns, 2 rows
    assert_eq!(list.get(id).unwrap().height(), 2);

    let mut buf = Buffer::empty(Rect::new(0, 0, 80, 2));
    list.draw(&mut buf, 0);
    assert_eq!(buf[(0, 0)].symbol(), UPPER_HALF);
    assert_eq!(buf[(0, 0)].fg, Color::Indexed(196));
    assert_eq!(buf[(3, 1)].bg, Color::Indexed(196));
    assert_eq!(buf[(4, 0)].symbol(), " ");
}

#[test]
fn test_missing_blob_keeps_fallback() {
    let temp = TempDir::new().unwrap();
    let cache = MediaCache::new("https://s", temp.path());

    let mut msg = AttachmentMessage::from_parts(
        PreviewFetcher::new(Arc::new(cache)),
        AttachmentKind::Image,
        "gone.png",
        ContentUri::new("s", "gone"),
        ContentUri::default(),
    );
    msg.fetch_preview();

    assert!(msg.bytes().is_none());
    let expected = wrap_text(&msg.plain_text(), 20);
    assert!(expected.len() > 1);

    let rows = msg.lay_out(ansi256(), 20);
    let texts: Vec<String> = rows.iter().map(|r| r.text()).collect();
    assert_eq!(texts, expected);
    assert!(predicate::str::starts_with("gone.png: https://s/").eval(&msg.plain_text()));
    assert_eq!(
        texts.concat().replace(' ', ""),
        msg.plain_text().replace(' ', "")
    );
}

#[test]
fn test_files_with_non_ascii_names_keep_their_own_blobs() {
    let temp = TempDir::new().unwrap();
    let cat = temp.child("猫.png");
    let dog = temp.child("犬.png");
    cat.write_binary(b"AAAA").unwrap();
    dog.write_binary(b"BBBB").unwrap();

    let cache = MediaCache::new("https://s", temp.child("cache").path());
    let cat_event = cache.import_event(cat.path()).unwrap();
    let dog_event = cache.import_event(dog.path()).unwrap();
    assert_ne!(cat_event.url, dog_event.url);

    let fetcher = PreviewFetcher::new(Arc::new(cache));

    let cat_msg = AttachmentMessage::new(fetcher.clone(), &cat_event);
    let dog_msg = AttachmentMessage::new(fetcher, &dog_event);
    assert_eq!(cat_msg.caption(), "猫.png");
    assert_eq!(
        cat_msg.fetcher().download(cat_msg.source()).unwrap(),
        b"AAAA"
    );
    assert_eq!(
        dog_msg.fetcher().download(dog_msg.source()).unwrap(),
        b"BBBB"
    );
}
