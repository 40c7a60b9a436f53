//! End-to-end integration tests for images-to-pdf.
//!
//! These drive the public API only: a `CaptureSession` fed by the synthetic
//! `PatternCamera`, in-memory images and files in a `TempDir`, with every
//! produced PDF re-parsed through lopdf.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use images_to_pdf::{
    assemble_pdf, content_dimensions, CameraStream, CaptureSession, DocumentState, FacingMode,
    ImageQueue, ImportSource, ItemError, Notice, Notifier, PageLayoutConfig, PatternCamera,
    SessionConfig, SessionError, SnapshotCamera, Tab,
};
use lopdf::{Document, Object};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

// ── Test helpers ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder(Mutex<Vec<Notice>>);

impl Recorder {
    fn notices(&self) -> Vec<Notice> {
        self.0.lock().unwrap().clone()
    }
}

impl Notifier for Recorder {
    fn notify(&self, notice: &Notice) {
        self.0.lock().unwrap().push(notice.clone());
    }
}

/// Route library logs to the test harness; `RUST_LOG=debug` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn session() -> (CaptureSession, Arc<Recorder>) {
    init_tracing();
    let rec = Arc::new(Recorder::default());
    let s = CaptureSession::new(SessionConfig::default()).with_notifier(rec.clone());
    (s, rec)
}

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// A single-colour PNG; compresses to a few KB at any size.
fn flat_png(w: u32, h: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([200, 200, 190])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn jpeg(w: u32, h: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([90, 60, 30])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .unwrap();
    buf
}

/// MediaBox `[x0 y0 x1 y1]` of every page, in page order.
fn media_boxes(bytes: &[u8]) -> Vec<[f64; 4]> {
    let doc = Document::load_mem(bytes).expect("output must be a valid PDF");
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_object(id).unwrap().as_dict().unwrap();
            let arr = page.get(b"MediaBox").unwrap().as_array().unwrap();
            let v: Vec<f64> = arr
                .iter()
                .map(|o| match o {
                    Object::Integer(i) => *i as f64,
                    Object::Real(r) => *r as f64,
                    other => panic!("unexpected MediaBox entry {other:?}"),
                })
                .collect();
            [v[0], v[1], v[2], v[3]]
        })
        .collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.01
}

// ── Import ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn import_caps_selection_at_ten_files() {
    let (mut s, rec) = session();
    let sources: Vec<ImportSource> = (0..12)
        .map(|i| ImportSource::memory(format!("img{i:02}.png"), png(20, 10)))
        .collect();

    let report = s.import_files(sources).await;
    assert_eq!(report.selected, 12);
    assert_eq!(report.truncated, 2);
    assert_eq!(report.imported, 10);
    assert_eq!(s.images().len(), 10);
    assert_eq!(s.image(9).unwrap().label, "img09.png");

    let notices = rec.notices();
    assert!(notices.contains(&Notice::TooManyFiles {
        selected: 12,
        limit: 10
    }));
    assert_eq!(
        notices.last(),
        Some(&Notice::Imported {
            imported: 10,
            skipped: 0
        })
    );
}

#[tokio::test]
async fn oversized_file_is_skipped_and_others_imported() {
    let (mut s, rec) = session();
    let sources = vec![
        ImportSource::memory("a.png", png(10, 10)),
        ImportSource::memory("huge.jpg", vec![0u8; 6 * 1024 * 1024]),
        ImportSource::memory("b.jpg", jpeg(12, 8)),
    ];

    let report = s.import_files(sources).await;
    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(
        &report.skipped[0],
        ItemError::FileTooLarge { name, .. } if name == "huge.jpg"
    ));
    let labels: Vec<&str> = s.images().iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["a.png", "b.jpg"]);
    assert!(rec
        .notices()
        .iter()
        .any(|n| matches!(n, Notice::FileSkipped { .. })));
}

#[tokio::test]
async fn undecodable_file_is_skipped() {
    let (mut s, _) = session();
    let report = s
        .import_files(vec![
            ImportSource::memory("notes.txt", b"just some text".to_vec()),
            ImportSource::memory("ok.png", png(5, 5)),
        ])
        .await;
    assert_eq!(report.imported, 1);
    assert!(matches!(report.skipped[0], ItemError::DecodeFailed { .. }));
}

#[tokio::test]
async fn large_image_is_downsampled_within_bound() {
    let (mut s, _) = session();
    let report = s
        .import_files(vec![ImportSource::memory("wide.png", flat_png(3600, 900))])
        .await;
    assert_eq!(report.downsampled, 1);
    let img = s.image(0).unwrap();
    assert_eq!((img.width, img.height), (1800, 450));

    // The stored bytes decode to the recorded dimensions.
    let decoded = image::load_from_memory(&img.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1800, 450));
}

#[tokio::test]
async fn import_from_disk_and_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let on_disk = dir.path().join("page.png");
    std::fs::write(&on_disk, png(40, 30)).unwrap();

    let (mut s, _) = session();
    let report = s
        .import_files(vec![on_disk.clone(), dir.path().join("missing.png")])
        .await;
    assert_eq!(report.imported, 1);
    assert_eq!(s.image(0).unwrap().label, "page.png");
    assert!(matches!(report.skipped[0], ItemError::ReadFailed { .. }));
}

// ── Assembly ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn page_count_and_order_match_queue() {
    let (mut s, _) = session();
    // Wide, tall and small images give distinct page sizes.
    s.import_files(vec![
        ImportSource::memory("wide", png(1000, 500)),
        ImportSource::memory("tall", png(300, 900)),
        ImportSource::memory("small", png(100, 50)),
        ImportSource::memory("square", png(600, 600)),
    ])
    .await;

    let doc = s.generate_document().await.unwrap().unwrap();
    assert_eq!(doc.page_count(), 4);

    let boxes = media_boxes(doc.bytes());
    assert_eq!(boxes.len(), 4);
    // wide: 752 x 376
    assert!(close(boxes[0][2], 792.0) && close(boxes[0][3], 436.0), "{boxes:?}");
    // tall: height-bound, 184 x 552
    assert!(close(boxes[1][2], 224.0) && close(boxes[1][3], 612.0), "{boxes:?}");
    // small: untouched, 100 x 50
    assert!(close(boxes[2][2], 140.0) && close(boxes[2][3], 110.0), "{boxes:?}");
    // square: 552 x 552
    assert!(close(boxes[3][2], 592.0) && close(boxes[3][3], 612.0), "{boxes:?}");

    let labels: Vec<&str> = doc.pages().iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["wide", "tall", "small", "square"]);
}

#[tokio::test]
async fn corrupt_image_in_queue_is_skipped() {
    let mut queue = ImageQueue::new();
    for i in 0..5 {
        queue.push(format!("p{i}"), 30, 20, png(30, 20));
    }
    queue.push("corrupt", 30, 20, b"\x89PNG broken".to_vec());

    let out = assemble_pdf(queue.as_slice(), &SessionConfig::default(), None)
        .await
        .unwrap();
    assert_eq!(out.pages.len(), 5);
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].name(), "corrupt");
    assert_eq!(media_boxes(&out.bytes).len(), 5);
}

#[tokio::test]
async fn footer_is_drawn_on_every_page() {
    let config = SessionConfig::builder()
        .footer_text("Scanned at the front desk")
        .build()
        .unwrap();
    let mut s = CaptureSession::new(config);
    s.import_files(vec![
        ImportSource::memory("a", png(10, 10)),
        ImportSource::memory("b", png(20, 10)),
    ])
    .await;
    let doc = s.generate_document().await.unwrap().unwrap();

    let parsed = Document::load_mem(doc.bytes()).unwrap();
    for page in 1..=2 {
        let text = parsed.extract_text(&[page]).unwrap();
        assert!(text.contains("Scanned at the front desk"), "page {page}: {text}");
    }
}

#[tokio::test]
async fn accented_footer_survives_extraction() {
    init_tracing();
    let config = SessionConfig::builder()
        .footer_text("Reçu März")
        .build()
        .unwrap();
    let mut s = CaptureSession::new(config);
    s.import_files(vec![ImportSource::memory("a", png(10, 10))])
        .await;
    let doc = assert_ok!(s.generate_document().await).unwrap();

    let parsed = Document::load_mem(doc.bytes()).unwrap();
    let text = parsed.extract_text(&[1]).unwrap();
    assert!(text.contains("Reçu März"), "got: {text}");
}

#[test]
fn content_dimensions_respect_bounds_and_aspect() {
    let layout = PageLayoutConfig::default();
    let sizes = [
        (1, 1),
        (752, 552),
        (753, 552),
        (752, 553),
        (4000, 10),
        (10, 4000),
        (1800, 1800),
        (1280, 720),
        (720, 1280),
        (3, 2000),
    ];
    for (w, h) in sizes {
        let (cw, ch) = content_dimensions(w, h, &layout);
        assert!(cw <= 752.0 + 1e-9 && ch <= 552.0 + 1e-9, "{w}x{h} → {cw}x{ch}");
        let expected = w as f64 / h as f64;
        assert!(
            ((cw / ch) - expected).abs() / expected < 1e-9,
            "{w}x{h} → {cw}x{ch}"
        );
    }
    // Within bounds: kept exactly.
    assert_eq!(content_dimensions(640, 480, &layout), (640.0, 480.0));
}

// ── Document lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn generate_on_empty_queue_changes_nothing() {
    let (mut s, rec) = session();
    assert!(s.generate_document().await.unwrap().is_none());
    assert!(matches!(s.document_state(), DocumentState::Idle));
    assert_eq!(rec.notices(), vec![Notice::EmptyQueue]);
}

#[tokio::test]
async fn regenerating_releases_previous_reference() {
    let (mut s, _) = session();
    s.import_files(vec![ImportSource::memory("a", png(10, 10))]).await;

    let first: PathBuf = s
        .generate_document()
        .await
        .unwrap()
        .unwrap()
        .preview_path()
        .unwrap()
        .to_path_buf();
    assert!(first.exists());

    let second: PathBuf = s
        .generate_document()
        .await
        .unwrap()
        .unwrap()
        .preview_path()
        .unwrap()
        .to_path_buf();
    assert!(!first.exists());
    assert!(second.exists());

    s.reset();
    assert!(!second.exists());
    assert!(s.images().is_empty());
}

#[tokio::test]
async fn export_is_noop_without_document_then_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let (mut s, rec) = session();
    assert!(s.export_document(dir.path()).await.unwrap().is_none());

    s.import_files(vec![ImportSource::memory("a", jpeg(16, 16))]).await;
    s.generate_document().await.unwrap();
    let path = s.export_document(dir.path()).await.unwrap().unwrap();
    assert_eq!(path, dir.path().join("images-to-pdf.pdf"));
    assert_eq!(media_boxes(&std::fs::read(&path).unwrap()).len(), 1);
    assert!(matches!(rec.notices().last(), Some(Notice::Exported { .. })));
}

#[tokio::test]
async fn data_uri_embeds_document() {
    let (mut s, _) = session();
    s.import_files(vec![ImportSource::memory("a", png(4, 4))]).await;
    let doc = s.generate_document().await.unwrap().unwrap();
    let uri = doc.data_uri();
    assert!(uri.starts_with("data:application/pdf;base64,JVBERi0"));
}

// ── Camera ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn capture_then_generate() {
    let cam = PatternCamera::new(640, 480);
    let (mut s, _) = session();
    s.start_camera(&cam).await.unwrap();
    assert!(s.camera_active());
    s.capture_frame().await.unwrap();
    s.capture_frame().await.unwrap();
    s.import_files(vec![ImportSource::memory("file", png(50, 100))])
        .await;

    let doc = s.generate_document().await.unwrap().unwrap();
    let labels: Vec<&str> = doc.pages().iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["camera-frame-1", "camera-frame-2", "file"]);
    assert_eq!(media_boxes(doc.bytes())[0], [0.0, 0.0, 680.0, 540.0]);
}

#[tokio::test]
async fn capture_before_start_is_frame_not_ready() {
    let (mut s, rec) = session();
    let err = s.capture_frame().await.unwrap_err();
    assert!(matches!(err, SessionError::FrameNotReady));
    assert!(s.images().is_empty());
    assert!(matches!(
        rec.notices().last(),
        Some(Notice::CaptureFailed { .. })
    ));
}

#[tokio::test]
async fn stop_camera_without_camera_is_noop() {
    let (mut s, rec) = session();
    assert!(!s.stop_camera());
    assert!(!s.stop_camera());
    assert!(rec.notices().is_empty());
}

#[tokio::test]
async fn stop_camera_releases_tracks() {
    let cam = PatternCamera::new(32, 32);
    let (mut s, rec) = session();
    s.start_camera(&cam).await.unwrap();
    assert_eq!(cam.live_streams(), 1);
    assert!(s.stop_camera());
    assert_eq!(cam.live_streams(), 0);
    assert!(!s.camera_active());
    assert_eq!(rec.notices().last(), Some(&Notice::CameraStopped));
}

#[tokio::test]
async fn falls_back_to_any_camera() {
    let cam = PatternCamera::new(32, 32).facing(FacingMode::User);
    let (mut s, _) = session();
    s.start_camera(&cam).await.unwrap();
    assert!(s.camera_active());
    assert_eq!(cam.open_attempts(), 2);
}

#[tokio::test]
async fn denied_camera_leaves_state_untouched() {
    let cam = PatternCamera::new(32, 32).denied();
    let (mut s, rec) = session();
    s.import_files(vec![ImportSource::memory("a", png(8, 8))]).await;
    s.generate_document().await.unwrap();

    let err = s.start_camera(&cam).await.unwrap_err();
    assert!(matches!(err, SessionError::PermissionDenied { .. }));
    // A refusal is final; no second prompt for another facing mode.
    assert_eq!(cam.open_attempts(), 1);
    assert!(!s.camera_active());
    assert_eq!(s.images().len(), 1);
    assert!(s.document_state().is_ready());
    assert_eq!(s.tab(), Tab::Gallery);
    assert!(!s.loading().camera);
    assert!(s.last_error().is_some());
    assert!(matches!(
        rec.notices().last(),
        Some(Notice::CameraUnavailable { .. })
    ));
}

#[tokio::test]
async fn denied_restart_keeps_running_camera() {
    let good = PatternCamera::new(16, 16);
    let (mut s, rec) = session();
    assert_ok!(s.start_camera(&good).await);

    let denied = PatternCamera::new(16, 16).denied();
    let err = assert_err!(s.start_camera(&denied).await);
    assert!(matches!(err, SessionError::PermissionDenied { .. }));
    assert!(matches!(
        rec.notices().last(),
        Some(Notice::CameraUnavailable { .. })
    ));

    assert!(s.camera_active());
    assert_eq!(good.live_streams(), 1);
    assert_eq!(s.tab(), Tab::Camera);
    assert_eq!(assert_ok!(s.capture_frame().await), 1);
}

#[tokio::test]
async fn stream_ending_mid_capture_stops_camera() {
    let cam = PatternCamera::new(16, 16).ends_after(2);
    let (mut s, _) = session();
    s.start_camera(&cam).await.unwrap();
    s.capture_frame().await.unwrap();
    s.capture_frame().await.unwrap();
    let err = s.capture_frame().await.unwrap_err();
    assert!(matches!(err, SessionError::CameraStopped));
    assert!(!s.camera_active());
    assert_eq!(s.images().len(), 2);
    assert_eq!(cam.live_streams(), 0);
}

#[tokio::test]
async fn leaving_camera_tab_releases_camera() {
    let cam = PatternCamera::new(16, 16);
    let (mut s, _) = session();
    s.start_camera(&cam).await.unwrap();
    assert_eq!(s.tab(), Tab::Camera);
    s.set_tab(Tab::Gallery);
    assert_eq!(cam.live_streams(), 0);
    assert!(!s.camera_active());
}

#[tokio::test]
async fn dropping_session_releases_camera() {
    let cam = PatternCamera::new(16, 16);
    {
        let (mut s, _) = session();
        s.start_camera(&cam).await.unwrap();
        assert_eq!(cam.live_streams(), 1);
    }
    assert_eq!(cam.live_streams(), 0);
}

#[tokio::test]
async fn snapshot_camera_capture() {
    let dir = tempfile::tempdir().unwrap();
    let frame = dir.path().join("frame.jpg");
    std::fs::write(&frame, jpeg(48, 32)).unwrap();

    let cam = SnapshotCamera::new(&frame);
    let (mut s, _) = session();
    s.start_camera(&cam).await.unwrap();
    s.capture_frame().await.unwrap();
    let img = s.image(0).unwrap();
    assert_eq!((img.width, img.height), (48, 32));

    // The stream reports its source for logs.
    let mut stream = images_to_pdf::CameraDevice::open(&cam, FacingMode::Any)
        .await
        .unwrap();
    assert_eq!(stream.label(), frame.display().to_string());
    stream.stop_tracks();
}
