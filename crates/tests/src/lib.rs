//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 两台设备经 TCP / 内存流配对的端到端测试
//! - 配置文件驱动的完整流程

#[cfg(test)]
mod contract_tests {
    use contracts::{PairingConfig, PairingState};

    #[test]
    fn test_config_round_trip() {
        let config = PairingConfig::default();
        let toml = config_loader::ConfigLoader::to_toml(&config).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairing.toml");
        std::fs::write(&path, toml).unwrap();

        let loaded = config_loader::ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(loaded.protocol.top_bits, config.protocol.top_bits);
        assert_eq!(loaded.filter.kind, config.filter.kind);
        assert_eq!(
            loaded.collection.expected_samples(),
            config.collection.expected_samples()
        );
    }

    #[test]
    fn test_terminal_states() {
        for state in [
            PairingState::Secure,
            PairingState::Blocked,
            PairingState::Failed,
            PairingState::Errored,
        ] {
            assert!(state.is_terminal());
            assert!(!state.can_advance_to(PairingState::Collecting));
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::path::Path;

    use contracts::{Decision, PairingConfig, PairingState, SampleSource};
    use ingestion::{ChannelSource, RecordingSource, SyntheticWalker, WalkerConfig};
    use observability::PairingMetricsAggregator;
    use protocol::{LocalPipeline, PairingSession, PeerListener, StreamChannel};

    fn walker(seed: u64) -> SyntheticWalker {
        SyntheticWalker::new(
            format!("walker-{seed}"),
            WalkerConfig {
                seed,
                ..WalkerConfig::default()
            },
        )
    }

    /// Write `seconds` of walker samples as a `timestamp_ms,value` recording
    fn write_recording(path: &Path, seconds: usize) {
        let rate = 50.0;
        let samples = walker(11).generate(seconds * 50, rate);
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(file, "# timestamp_ms,value").unwrap();
        for (i, v) in samples.iter().enumerate() {
            writeln!(file, "{},{}", 1_700_000_000_000i64 + i as i64 * 20, v).unwrap();
        }
    }

    /// Two devices replaying the same recording pair over TCP
    #[tokio::test]
    async fn test_tcp_pairing_from_shared_recording() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk.csv");
        write_recording(&path, 40);

        let listener = PeerListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server_path = path.clone();
        let server = tokio::spawn(async move {
            let mut channel = listener.accept().await.unwrap();
            let mut source = RecordingSource::new(server_path);
            PairingSession::new(PairingConfig::default())
                .unwrap()
                .run(&mut source, &mut channel)
                .await
        });

        let mut channel = StreamChannel::connect(addr).await.unwrap();
        let mut source = RecordingSource::new(&path);
        let client = PairingSession::new(PairingConfig::default())
            .unwrap()
            .run(&mut source, &mut channel)
            .await;
        let server = server.await.unwrap();

        assert_eq!(client.samples, 900);
        assert_eq!(client.decision(), Decision::Secure, "{}", client.outcome);
        assert_eq!(server.decision(), Decision::Secure, "{}", server.outcome);
        assert_eq!(client.outcome.similarity, server.outcome.similarity);
        assert_eq!(client.outcome.aligned_bits, server.outcome.aligned_bits);
    }

    /// A live mpsc feed pairs with a device sampling the same walk
    #[tokio::test]
    async fn test_live_feed_pairs_with_synthetic_device() {
        let (tx, mut live) = ChannelSource::channel("imu", 256);
        let feeder = tokio::spawn(async move {
            for v in walker(5).generate(900, 50.0) {
                if tx.send(v).await.is_err() {
                    break;
                }
            }
        });

        let (a, b) = tokio::io::duplex(4096);
        let mut left_channel = StreamChannel::new("left", a);
        let mut right_channel = StreamChannel::new("right", b);
        let mut synthetic = walker(5);

        let (left, right) = tokio::join!(
            PairingSession::new(PairingConfig::default())
                .unwrap()
                .run(&mut live, &mut left_channel),
            PairingSession::new(PairingConfig::default())
                .unwrap()
                .run(&mut synthetic, &mut right_channel)
        );
        feeder.await.unwrap();

        assert_eq!(left.decision(), Decision::Secure, "{}", left.outcome);
        assert_eq!(right.decision(), Decision::Secure, "{}", right.outcome);
        assert_eq!(live.metrics().snapshot().samples_delivered, 900);
    }

    /// Band-pass configuration loaded from file drives both parties
    #[tokio::test]
    async fn test_band_pass_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[filter]
kind = "band_pass"
cutoff_hz = 0.5
band_high_hz = 11.5

[protocol]
top_bits = 16
similarity_threshold = 0.75
"#
        )
        .unwrap();
        let config = config_loader::ConfigLoader::load_from_path(file.path()).unwrap();

        let (a, b) = tokio::io::duplex(4096);
        let mut left_channel = StreamChannel::new("left", a);
        let mut right_channel = StreamChannel::new("right", b);
        let mut left_source = walker(9);
        let mut right_source = walker(9);

        let (left, right) = tokio::join!(
            PairingSession::new(config.clone())
                .unwrap()
                .run(&mut left_source, &mut left_channel),
            PairingSession::new(config)
                .unwrap()
                .run(&mut right_source, &mut right_channel)
        );
        assert_eq!(left.decision(), Decision::Secure, "{}", left.outcome);
        assert_eq!(right.outcome.similarity, Some(1.0));
    }

    /// Consecutive attempts restart from Idle on the same channel
    #[tokio::test]
    async fn test_repeated_attempts_share_channel() {
        let (a, b) = tokio::io::duplex(4096);
        let mut left_channel = StreamChannel::new("left", a);
        let mut right_channel = StreamChannel::new("right", b);
        let mut left_source = walker(2);
        let mut right_source = walker(2);
        let mut aggregator = PairingMetricsAggregator::new();

        for attempt in 1..=3u64 {
            let (left, right) = tokio::join!(
                PairingSession::new(PairingConfig::default())
                    .unwrap()
                    .with_attempt(attempt)
                    .run(&mut left_source, &mut left_channel),
                PairingSession::new(PairingConfig::default())
                    .unwrap()
                    .with_attempt(attempt)
                    .run(&mut right_source, &mut right_channel)
            );
            assert_eq!(left.transitions[0], PairingState::Idle);
            assert_eq!(left.decision(), right.decision());
            aggregator.update(&left.outcome, left.cycles, left.short_cycle_found, left.elapsed);
        }

        assert_eq!(aggregator.total_attempts, 3);
        assert_eq!(aggregator.count(Decision::Secure), 3);
    }

    /// Offline derivation agrees with what a session exchanges
    #[tokio::test]
    async fn test_offline_derivation_matches_session() {
        let config = PairingConfig::default();
        let samples = walker(4).collect(&config.collection).await.unwrap();
        let derivation = LocalPipeline::new(&config).unwrap().derive(&samples);

        let (a, b) = tokio::io::duplex(4096);
        let mut left_channel = StreamChannel::new("left", a);
        let mut right_channel = StreamChannel::new("right", b);
        let mut left_source = walker(4);
        let mut right_source = walker(4);
        let (left, _right) = tokio::join!(
            PairingSession::new(config.clone())
                .unwrap()
                .run(&mut left_source, &mut left_channel),
            PairingSession::new(config.clone())
                .unwrap()
                .run(&mut right_source, &mut right_channel)
        );

        let fingerprint = derivation.fingerprint.unwrap();
        assert_eq!(left.fingerprint_bits, fingerprint.len());
        assert_eq!(left.cycles, derivation.cycles);
        assert_eq!(left.half_cycle_period, derivation.half_cycle_period);
    }
}
