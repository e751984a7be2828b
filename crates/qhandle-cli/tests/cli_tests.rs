//! CLI command parsing and workflow tests.
//!
//! Tests cover argument parsing (via clap `try_parse_from`) and the
//! submit → handle file → get workflow the commands are built on.

// The CLI is a binary crate, so clap parsing is validated against a mirror
// of its argument structs, and the workflow through the library crates.

// ============================================================================
// Handle file workflow
// ============================================================================

mod handle_workflow {
    use std::sync::Arc;
    use std::time::Duration;

    use qhandle_adapter_mock::{MockPlatform, ResolveMode};
    use qhandle_future::{FutureHandle, HandleRecord, HandleStatus, Submitter};
    use qhandle_hal::{Counts, ExecutionPlatform, JobRequest, PlatformConfig, PlatformRegistry};

    const BELL: &str = "h q[0];\ncx q[0], q[1];\n";
    const FAST: Duration = Duration::from_millis(1);

    fn remote_mock() -> MockPlatform {
        MockPlatform::remote().with_name("lab")
    }

    #[tokio::test]
    async fn test_remote_submit_writes_pending_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");

        let submitter = Submitter::new(Arc::new(remote_mock())).with_poll_interval(FAST);
        assert!(submitter.is_remote());

        let handle = submitter.submit(&JobRequest::new(BELL, 2), 1000).await.unwrap();
        handle.save(&path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let record = HandleRecord::decode(&text).unwrap();
        assert_eq!(record.status(), HandleStatus::Pending);
        assert_eq!(&record.id, handle.id());
        assert_eq!(record.metadata.platform.as_deref(), Some("lab"));
        assert_eq!(record.metadata.shots, Some(1000));
        assert!(!text.contains("payload"));
    }

    #[tokio::test]
    async fn test_get_with_update_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        let platform = remote_mock();

        let submitter = Submitter::new(Arc::new(platform.clone())).with_poll_interval(FAST);
        let handle = submitter.submit(&JobRequest::new(BELL, 2), 1000).await.unwrap();
        handle.save(&path).await.unwrap();
        drop(handle);

        let counts: Counts = [("00", 500), ("11", 500)].into_iter().collect();
        let job_id = platform.job_ids().pop().unwrap();
        platform.complete(&job_id, counts.clone()).unwrap();

        // What `qhandle get FILE --update` does.
        let text = std::fs::read_to_string(&path).unwrap();
        let record = HandleRecord::decode(&text).unwrap();
        let resumed: Arc<dyn ExecutionPlatform> = Arc::new(platform.clone());
        let handle = FutureHandle::from_record(record, resumed, FAST).unwrap();
        assert_eq!(handle.get().await.unwrap(), counts);
        handle.save(&path).await.unwrap();

        // What `qhandle show FILE` then reads.
        let text = std::fs::read_to_string(&path).unwrap();
        let record = HandleRecord::decode(&text).unwrap();
        assert_eq!(record.status(), HandleStatus::Ready);
        assert!(text.contains("\"00\": 500"));
    }

    #[tokio::test]
    async fn test_get_times_out_on_pending_job() {
        let platform = remote_mock().with_mode(ResolveMode::Manual);
        let submitter = Submitter::new(Arc::new(platform)).with_poll_interval(FAST);
        let handle = submitter.submit(&JobRequest::new(BELL, 2), 10).await.unwrap();

        let outcome = tokio::time::timeout(Duration::from_millis(20), handle.get()).await;
        assert!(outcome.is_err());
        assert_eq!(handle.status(), HandleStatus::Pending);
    }

    #[tokio::test]
    async fn test_local_platform_from_registry_retrieves_inline() {
        let mut registry = PlatformRegistry::new();
        registry.register::<MockPlatform>("mock");

        let config = PlatformConfig::new("mock").with_extra("seed", serde_json::json!(42));
        let platform = registry.create("mock", config).unwrap();
        assert!(!platform.is_remote());

        let submitter = Submitter::new(platform);
        let handle = submitter.submit(&JobRequest::new(BELL, 3), 256).await.unwrap();
        let counts = handle.get().await.unwrap();
        assert_eq!(counts.total_shots(), 256);
        assert_eq!(counts.width(), Some(3));
    }

    #[tokio::test]
    async fn test_resume_on_other_platform_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");

        let submitter = Submitter::new(Arc::new(remote_mock()));
        let handle = submitter.submit(&JobRequest::new(BELL, 2), 100).await.unwrap();
        handle.save(&path).await.unwrap();

        let other: Arc<dyn ExecutionPlatform> = Arc::new(MockPlatform::remote());
        let result = FutureHandle::load(&path, other).await;
        assert!(result.is_err());
    }
}

// ============================================================================
// Clap argument parsing (test via try_parse_from on equivalent structs)
// ============================================================================

mod clap_parsing {
    use std::path::PathBuf;

    use clap::{Parser, Subcommand};

    // Mirror the CLI struct for testing (since main.rs is a binary)
    #[derive(Parser)]
    #[command(name = "qhandle")]
    struct TestCli {
        #[arg(short, long, action = clap::ArgAction::Count, global = true)]
        verbose: u8,

        #[arg(long, global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        command: TestCommands,
    }

    #[derive(Subcommand)]
    enum TestCommands {
        Submit {
            #[arg(short, long)]
            input: String,
            #[arg(short, long)]
            measured: u32,
            #[arg(short, long, default_value = "1000")]
            shots: u32,
            #[arg(short, long)]
            platform: Option<String>,
            #[arg(short, long, default_value = "job.json")]
            output: String,
            #[arg(long, default_value = "0")]
            qpu: usize,
            #[arg(long)]
            name: Option<String>,
        },
        Get {
            file: String,
            #[arg(short, long)]
            platform: Option<String>,
            #[arg(short, long, default_value = "3600")]
            timeout: u64,
            #[arg(short, long, default_value = "table")]
            format: String,
            #[arg(short, long)]
            update: bool,
        },
        Show {
            file: String,
            #[arg(short, long, default_value = "table")]
            format: String,
        },
        Platforms,
        Version,
    }

    // --- Submit command ---

    #[test]
    fn test_parse_submit_minimal() {
        let cli =
            TestCli::try_parse_from(["qhandle", "submit", "-i", "bell.qasm", "-m", "2"]).unwrap();
        match cli.command {
            TestCommands::Submit {
                input,
                measured,
                shots,
                platform,
                output,
                qpu,
                name,
            } => {
                assert_eq!(input, "bell.qasm");
                assert_eq!(measured, 2);
                assert_eq!(shots, 1000);
                assert!(platform.is_none());
                assert_eq!(output, "job.json");
                assert_eq!(qpu, 0);
                assert!(name.is_none());
            }
            _ => panic!("Expected Submit command"),
        }
    }

    #[test]
    fn test_parse_submit_with_all_args() {
        let cli = TestCli::try_parse_from([
            "qhandle",
            "submit",
            "--input",
            "ghz.qasm",
            "--measured",
            "5",
            "--shots",
            "4096",
            "--platform",
            "lab",
            "--output",
            "ghz.json",
            "--qpu",
            "3",
            "--name",
            "ghz5",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Submit {
                measured,
                shots,
                platform,
                output,
                qpu,
                name,
                ..
            } => {
                assert_eq!(measured, 5);
                assert_eq!(shots, 4096);
                assert_eq!(platform.as_deref(), Some("lab"));
                assert_eq!(output, "ghz.json");
                assert_eq!(qpu, 3);
                assert_eq!(name.as_deref(), Some("ghz5"));
            }
            _ => panic!("Expected Submit command"),
        }
    }

    #[test]
    fn test_parse_submit_missing_measured() {
        let result = TestCli::try_parse_from(["qhandle", "submit", "-i", "bell.qasm"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_submit_rejects_negative_shots() {
        let result = TestCli::try_parse_from([
            "qhandle", "submit", "-i", "bell.qasm", "-m", "2", "-s", "-5",
        ]);
        assert!(result.is_err());
    }

    // --- Get command ---

    #[test]
    fn test_parse_get_defaults() {
        let cli = TestCli::try_parse_from(["qhandle", "get", "job.json"]).unwrap();
        match cli.command {
            TestCommands::Get {
                file,
                platform,
                timeout,
                format,
                update,
            } => {
                assert_eq!(file, "job.json");
                assert!(platform.is_none());
                assert_eq!(timeout, 3600);
                assert_eq!(format, "table");
                assert!(!update);
            }
            _ => panic!("Expected Get command"),
        }
    }

    #[test]
    fn test_parse_get_with_options() {
        let cli = TestCli::try_parse_from([
            "qhandle", "get", "job.json", "-t", "30", "-f", "json", "--update", "-p", "lab",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Get {
                platform,
                timeout,
                format,
                update,
                ..
            } => {
                assert_eq!(platform.as_deref(), Some("lab"));
                assert_eq!(timeout, 30);
                assert_eq!(format, "json");
                assert!(update);
            }
            _ => panic!("Expected Get command"),
        }
    }

    #[test]
    fn test_parse_get_missing_file() {
        let result = TestCli::try_parse_from(["qhandle", "get"]);
        assert!(result.is_err());
    }

    // --- Show / platforms / version ---

    #[test]
    fn test_parse_show() {
        let cli = TestCli::try_parse_from(["qhandle", "show", "job.json"]).unwrap();
        assert!(matches!(cli.command, TestCommands::Show { ref file, .. } if file == "job.json"));
    }

    #[test]
    fn test_parse_platforms() {
        let cli = TestCli::try_parse_from(["qhandle", "platforms"]).unwrap();
        assert!(matches!(cli.command, TestCommands::Platforms));
    }

    #[test]
    fn test_parse_version() {
        let cli = TestCli::try_parse_from(["qhandle", "version"]).unwrap();
        assert!(matches!(cli.command, TestCommands::Version));
    }

    // --- Global flags ---

    #[test]
    fn test_parse_config_after_subcommand() {
        let cli =
            TestCli::try_parse_from(["qhandle", "platforms", "--config", "/etc/qhandle.yaml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/qhandle.yaml")));
    }

    #[test]
    fn test_parse_verbose_flag() {
        let cli = TestCli::try_parse_from(["qhandle", "-v", "version"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_parse_verbose_vvv() {
        let cli = TestCli::try_parse_from(["qhandle", "-vvv", "version"]).unwrap();
        assert_eq!(cli.verbose, 3);
    }

    // --- Error cases ---

    #[test]
    fn test_no_subcommand() {
        let result = TestCli::try_parse_from(["qhandle"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_subcommand() {
        let result = TestCli::try_parse_from(["qhandle", "foobar"]);
        assert!(result.is_err());
    }
}
