use super::dispatch::{i16_to_f32, u16_to_f32, FrameDispatcher};
use super::{CaptureSettings, DEFAULT_FRAGMENT, DEFAULT_SAMPLE_RATE};
use crossbeam_channel::bounded;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn dispatcher_emits_fixed_blocks() {
    let (tx, rx) = bounded(8);
    let dropped = Arc::new(AtomicUsize::new(0));
    let mut dispatcher = FrameDispatcher::new(4, tx, dropped.clone());

    dispatcher.push(&[0.1f32, 0.2, 0.3], |s| s);
    assert!(rx.try_recv().is_err());
    assert_eq!(dispatcher.pending_len(), 3);

    dispatcher.push(&[0.4f32, 0.5, 0.6, 0.7, 0.8, 0.9], |s| s);
    assert_eq!(rx.try_recv().unwrap(), vec![0.1, 0.2, 0.3, 0.4]);
    assert_eq!(rx.try_recv().unwrap(), vec![0.5, 0.6, 0.7, 0.8]);
    assert!(rx.try_recv().is_err());
    assert_eq!(dispatcher.pending_len(), 1);
    assert_eq!(dropped.load(Ordering::Relaxed), 0);
}

#[test]
fn dispatcher_keeps_interleaved_channels_flat() {
    let (tx, rx) = bounded(2);
    let dropped = Arc::new(AtomicUsize::new(0));
    let mut dispatcher = FrameDispatcher::new(4, tx, dropped);
    dispatcher.push(&[1.0f32, -1.0, 0.5, -0.5], |s| s);
    assert_eq!(rx.try_recv().unwrap(), vec![1.0, -1.0, 0.5, -0.5]);
}

#[test]
fn dispatcher_counts_drops_when_channel_full() {
    let (tx, rx) = bounded(1);
    let dropped = Arc::new(AtomicUsize::new(0));
    let mut dispatcher = FrameDispatcher::new(2, tx, dropped.clone());
    dispatcher.push(&[0.0f32; 8], |s| s);
    assert_eq!(dropped.load(Ordering::Relaxed), 3);
    assert_eq!(rx.len(), 1);
}

#[test]
fn dispatcher_stops_after_disconnect() {
    let (tx, rx) = bounded(4);
    drop(rx);
    let dropped = Arc::new(AtomicUsize::new(0));
    let mut dispatcher = FrameDispatcher::new(2, tx, dropped.clone());
    dispatcher.push(&[0.0f32; 6], |s| s);
    dispatcher.push(&[0.0f32; 6], |s| s);
    assert_eq!(dispatcher.pending_len(), 0);
    assert_eq!(dropped.load(Ordering::Relaxed), 0);
}

#[test]
fn dispatcher_treats_zero_block_size_as_one() {
    let (tx, rx) = bounded(4);
    let dropped = Arc::new(AtomicUsize::new(0));
    let mut dispatcher = FrameDispatcher::new(0, tx, dropped);
    dispatcher.push(&[0.25f32, 0.5], |s| s);
    assert_eq!(rx.try_recv().unwrap(), vec![0.25]);
    assert_eq!(rx.try_recv().unwrap(), vec![0.5]);
}

#[test]
fn dispatcher_converts_integer_samples() {
    let (tx, rx) = bounded(2);
    let dropped = Arc::new(AtomicUsize::new(0));
    let mut dispatcher = FrameDispatcher::new(3, tx, dropped);
    dispatcher.push(&[i16::MIN, 0, 16_384], i16_to_f32);
    assert_eq!(rx.try_recv().unwrap(), vec![-1.0, 0.0, 0.5]);
}

#[test]
fn unsigned_samples_center_on_zero() {
    assert_eq!(u16_to_f32(32_768), 0.0);
    assert_eq!(u16_to_f32(0), -1.0);
    assert!((u16_to_f32(u16::MAX) - 1.0).abs() < 1e-4);
}

#[test]
fn default_settings_match_constants() {
    let settings = CaptureSettings::default();
    assert_eq!(settings.sample_rate, DEFAULT_SAMPLE_RATE);
    assert_eq!(settings.fragment, DEFAULT_FRAGMENT);
    assert_eq!(settings.channels, 1);
}

#[test]
fn buffer_frames_divide_fragment_by_channels() {
    let mono = CaptureSettings::default();
    assert_eq!(mono.buffer_frames(), DEFAULT_FRAGMENT as u32);

    let stereo = CaptureSettings {
        channels: 2,
        ..CaptureSettings::default()
    };
    assert_eq!(stereo.buffer_frames(), 1024);

    let wide = CaptureSettings {
        channels: 8,
        fragment: 4,
        ..CaptureSettings::default()
    };
    assert_eq!(wide.buffer_frames(), 1);
}
