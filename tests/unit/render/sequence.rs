use super::*;

#[test]
fn progress_cadence_is_every_tenth_and_last() {
    let reported = (0..25)
        .map(FrameIndex)
        .filter(|&i| is_progress_frame(i, 25))
        .map(|i| i.0)
        .collect::<Vec<_>>();
    assert_eq!(reported, vec![0, 10, 20, 24]);
}

#[test]
fn cancel_token_clones_share_state() {
    let a = CancelToken::new();
    let b = a.clone();
    assert!(!b.is_cancelled());
    a.cancel();
    assert!(b.is_cancelled());
}

#[test]
fn zero_threads_is_a_configuration_error() {
    assert!(matches!(
        build_thread_pool(Some(0)),
        Err(NetherError::Configuration(_))
    ));
    assert!(build_thread_pool(Some(1)).is_ok());
}

#[test]
fn chunk_size_zero_is_normalized() {
    assert_eq!(normalized_chunk_size(0), 1);
    assert_eq!(normalized_chunk_size(8), 8);
}

#[test]
fn io_errors_gain_frame_context() {
    let err = with_frame_context(
        NetherError::io("create", std::io::Error::other("denied")),
        FrameIndex(12),
        Path::new("frames/frame_0012.ppm"),
    );
    let msg = err.to_string();
    assert!(msg.contains("frame 12"), "{msg}");
    assert!(msg.contains("frame_0012.ppm"), "{msg}");
    assert!(msg.contains("denied"), "{msg}");

    let passthrough = with_frame_context(
        NetherError::configuration("x"),
        FrameIndex(0),
        Path::new("a"),
    );
    assert!(matches!(passthrough, NetherError::Configuration(_)));
}

#[test]
fn invalid_config_is_rejected_before_rendering() {
    let cfg = PipelineConfig {
        width: 0,
        ..PipelineConfig::default()
    };
    let err = render_all_with(
        &cfg,
        &RenderThreading::sequential(),
        &CancelToken::new(),
        &LogProgress,
    )
    .unwrap_err();
    assert!(matches!(err, NetherError::Configuration(_)));
}
